//! Wall-clock sampling, second-boundary detection, and label strings.

mod format;
mod sample;
mod tick;

pub use format::{LocaleFormatter, TimeFormatter};
pub use sample::TimeSample;
pub use tick::ClockTickDriver;
