use super::TimeSample;

/// Signals a label rebuild whenever the seconds field differs from the last
/// one observed.
///
/// Compares values, not elapsed time: a clock stepped backwards still
/// triggers as soon as the second changes, and any number of frames inside
/// one second trigger once.
#[derive(Debug, Default)]
pub struct ClockTickDriver {
    last_second: Option<u32>,
}

impl ClockTickDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_frame(&mut self, now: &TimeSample) -> bool {
        if self.last_second == Some(now.second) {
            return false;
        }
        self.last_second = Some(now.second);
        true
    }
}
