use crate::config::HourCycle;

use super::TimeSample;

/// Turns a sample into the two strings shown in the scene.
///
/// The core treats both strings as opaque text.
pub trait TimeFormatter {
    fn time_string(&self, sample: &TimeSample) -> String;
    fn date_string(&self, sample: &TimeSample) -> String;
}

/// English short-form formatter: `02:05:09 PM` and `Tue, Mar 4, 2025`.
#[derive(Debug, Copy, Clone, Default)]
pub struct LocaleFormatter {
    pub hour_cycle: HourCycle,
}

impl LocaleFormatter {
    pub fn new(hour_cycle: HourCycle) -> Self {
        Self { hour_cycle }
    }

    fn time_pattern(&self) -> &'static str {
        match self.hour_cycle {
            HourCycle::H12 => "%I:%M:%S %p",
            HourCycle::H24 => "%H:%M:%S",
        }
    }
}

impl TimeFormatter for LocaleFormatter {
    fn time_string(&self, sample: &TimeSample) -> String {
        match sample.to_naive() {
            Some(dt) => dt.format(self.time_pattern()).to_string(),
            None => format!(
                "{:02}:{:02}:{:02}",
                sample.hour, sample.minute, sample.second
            ),
        }
    }

    fn date_string(&self, sample: &TimeSample) -> String {
        match sample.to_naive() {
            Some(dt) => dt.format("%a, %b %-d, %Y").to_string(),
            None => format!(
                "{:?}, {}-{:02}-{:02}",
                sample.weekday, sample.year, sample.month, sample.day
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    fn sample(hour: u32, minute: u32, second: u32) -> TimeSample {
        TimeSample {
            hour,
            minute,
            second,
            weekday: Weekday::Tue,
            year: 2025,
            month: 3,
            day: 4,
        }
    }

    #[test]
    fn twelve_hour_time_is_zero_padded() {
        let f = LocaleFormatter::new(HourCycle::H12);
        assert_eq!(f.time_string(&sample(14, 5, 9)), "02:05:09 PM");
        assert_eq!(f.time_string(&sample(0, 0, 0)), "12:00:00 AM");
    }

    #[test]
    fn twenty_four_hour_time() {
        let f = LocaleFormatter::new(HourCycle::H24);
        assert_eq!(f.time_string(&sample(14, 5, 9)), "14:05:09");
    }

    #[test]
    fn short_date() {
        let f = LocaleFormatter::default();
        assert_eq!(f.date_string(&sample(14, 5, 9)), "Tue, Mar 4, 2025");
    }
}
