use chrono::{Datelike, Local, NaiveDate, NaiveDateTime, Timelike, Weekday};

/// Wall-clock fields captured at a single instant.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct TimeSample {
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
    pub weekday: Weekday,
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl TimeSample {
    /// Samples the local system clock.
    pub fn now() -> Self {
        Self::from_datetime(&Local::now())
    }

    pub fn from_datetime<T: Datelike + Timelike>(t: &T) -> Self {
        Self {
            hour: t.hour(),
            minute: t.minute(),
            // Leap seconds are reported as 59 + 1s of nanos; `second()` stays in 0..60.
            second: t.second(),
            weekday: t.weekday(),
            year: t.year(),
            month: t.month(),
            day: t.day(),
        }
    }

    /// `None` if the fields do not name a real calendar instant.
    pub fn to_naive(&self) -> Option<NaiveDateTime> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day)?.and_hms_opt(
            self.hour,
            self.minute,
            self.second,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_datetime_copies_fields() {
        let dt = NaiveDate::from_ymd_opt(2025, 3, 4)
            .and_then(|d| d.and_hms_opt(14, 5, 9))
            .unwrap();
        let s = TimeSample::from_datetime(&dt);
        assert_eq!((s.hour, s.minute, s.second), (14, 5, 9));
        assert_eq!((s.year, s.month, s.day), (2025, 3, 4));
        assert_eq!(s.weekday, Weekday::Tue);
        assert_eq!(s.to_naive(), Some(dt));
    }

    #[test]
    fn invalid_fields_have_no_naive_form() {
        let s = TimeSample {
            hour: 1,
            minute: 2,
            second: 3,
            weekday: Weekday::Mon,
            year: 2025,
            month: 2,
            day: 30,
        };
        assert_eq!(s.to_naive(), None);
    }
}
