//! Color model shared between the clock core and the renderers.

pub mod color;

pub use color::{Color, ColorParseError};
