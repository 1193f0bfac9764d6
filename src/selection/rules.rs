use chrono::{NaiveDateTime, NaiveTime};
use thiserror::Error;

pub const ALLOWED_DURATIONS: [u32; 3] = [60, 90, 120];
pub const DEFAULT_DURATION_MINUTES: u32 = 90;
pub const OPENING_HOUR: u32 = 6;
pub const CLOSING_HOUR: u32 = 21;
pub const EXTENDED_CLOSING_HOUR: u32 = 22;

#[derive(Debug, Error, PartialEq)]
pub enum RulesError {
    #[error("Duration must be 60, 90 or 120 minutes, got {0}")]
    InvalidDuration(u32),
    #[error("Closing hour must be 21 or 22, got {0}")]
    InvalidClosingHour(u32),
}

pub fn is_allowed_duration(minutes: u32) -> bool {
    ALLOWED_DURATIONS.contains(&minutes)
}

/// Whole minutes between two instants, rounded and never negative.
pub fn duration_minutes(start: NaiveDateTime, end: NaiveDateTime) -> u32 {
    let seconds = (end - start).num_seconds();
    if seconds <= 0 {
        return 0;
    }
    ((seconds + 30) / 60) as u32
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DurationPreference(u32);

impl DurationPreference {
    pub fn new(minutes: u32) -> Result<Self, RulesError> {
        if is_allowed_duration(minutes) {
            Ok(Self(minutes))
        } else {
            Err(RulesError::InvalidDuration(minutes))
        }
    }

    pub fn minutes(&self) -> u32 {
        self.0
    }

    pub fn as_duration(&self) -> chrono::Duration {
        chrono::Duration::minutes(i64::from(self.0))
    }
}

impl Default for DurationPreference {
    fn default() -> Self {
        Self(DEFAULT_DURATION_MINUTES)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkHours {
    open: NaiveTime,
    close: NaiveTime,
}

impl WorkHours {
    pub fn with_closing_hour(hour: u32) -> Result<Self, RulesError> {
        if hour != CLOSING_HOUR && hour != EXTENDED_CLOSING_HOUR {
            return Err(RulesError::InvalidClosingHour(hour));
        }
        Ok(Self {
            open: hour_of_day(OPENING_HOUR),
            close: hour_of_day(hour),
        })
    }

    pub fn open(&self) -> NaiveTime {
        self.open
    }

    pub fn close(&self) -> NaiveTime {
        self.close
    }

    pub fn contains(&self, start: NaiveDateTime, end: NaiveDateTime) -> bool {
        start <= end
            && start.date() == end.date()
            && start.time() >= self.open
            && end.time() <= self.close
    }
}

impl Default for WorkHours {
    fn default() -> Self {
        Self {
            open: hour_of_day(OPENING_HOUR),
            close: hour_of_day(CLOSING_HOUR),
        }
    }
}

fn hour_of_day(hour: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, 0, 0).unwrap_or(NaiveTime::MIN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    #[test]
    fn default_preference_is_ninety_minutes() {
        assert_eq!(DurationPreference::default().minutes(), 90);
    }

    #[test]
    fn preference_rejects_unlisted_duration() {
        assert_eq!(DurationPreference::new(45), Err(RulesError::InvalidDuration(45)));
        assert!(DurationPreference::new(120).is_ok());
    }

    #[test]
    fn duration_rounds_to_nearest_minute() {
        let start = at(9, 0);
        let end = start + chrono::Duration::seconds(59 * 60 + 40);

        assert_eq!(duration_minutes(start, end), 60);
    }

    #[test]
    fn negative_duration_floors_at_zero() {
        assert_eq!(duration_minutes(at(10, 0), at(9, 0)), 0);
    }

    #[test]
    fn range_ending_at_close_is_inside() {
        let hours = WorkHours::default();

        assert!(hours.contains(at(19, 30), at(21, 0)));
        assert!(hours.contains(at(6, 0), at(7, 0)));
    }

    #[test]
    fn range_past_close_is_outside() {
        let hours = WorkHours::default();

        assert!(!hours.contains(at(20, 30), at(22, 0)));
        assert!(!hours.contains(at(5, 30), at(7, 0)));
    }

    #[test]
    fn extended_closing_allows_until_ten() {
        let hours = WorkHours::with_closing_hour(22).unwrap();

        assert!(hours.contains(at(20, 30), at(22, 0)));
    }

    #[test]
    fn closing_hour_must_be_known() {
        assert_eq!(
            WorkHours::with_closing_hour(23),
            Err(RulesError::InvalidClosingHour(23))
        );
    }

    #[test]
    fn range_across_midnight_is_outside() {
        let hours = WorkHours::default();
        let start = at(20, 0);
        let end = start + chrono::Duration::hours(11);

        assert!(!hours.contains(start, end));
    }
}
