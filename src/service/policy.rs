use chrono::{NaiveDateTime, Timelike};
use serde::Serialize;
use utoipa::ToSchema;

/// Half-open `[open_hour, close_hour)` interval of wall-clock hours during
/// which attendance may be marked.
#[derive(Debug, Clone, Copy)]
pub struct AttendanceWindow {
    pub open_hour: u32,
    pub close_hour: u32,
}

impl Default for AttendanceWindow {
    fn default() -> Self {
        // school hours 8 AM to 3 PM
        Self {
            open_hour: 8,
            close_hour: 15,
        }
    }
}

impl AttendanceWindow {
    pub fn contains(&self, now: NaiveDateTime) -> bool {
        let hour = now.hour();
        self.open_hour <= hour && hour < self.close_hour
    }
}

/// Named subdivision of the school day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema, strum_macros::Display)]
pub enum Period {
    Morning,
    BeforeLunch,
    Lunch,
    AfterLunch,
    AfterSchool,
}

/// Fixed hour table; anything outside the configured ranges is AfterSchool.
pub fn current_period(now: NaiveDateTime) -> Period {
    match now.hour() {
        8 => Period::Morning,
        9..=11 => Period::BeforeLunch,
        12 => Period::Lunch,
        13..=14 => Period::AfterLunch,
        _ => Period::AfterSchool,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at_hour(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 1, 5)
            .unwrap()
            .and_hms_opt(hour, 30, 0)
            .unwrap()
    }

    #[test]
    fn default_window_is_eight_to_fifteen_half_open() {
        let window = AttendanceWindow::default();
        for hour in 0..24 {
            let expected = (8..15).contains(&hour);
            assert_eq!(
                window.contains(at_hour(hour)),
                expected,
                "hour {hour} misclassified"
            );
        }
    }

    #[test]
    fn close_hour_itself_is_outside() {
        let window = AttendanceWindow {
            open_hour: 8,
            close_hour: 15,
        };
        assert!(!window.contains(at_hour(15)));
        assert!(window.contains(at_hour(14)));
    }

    #[test]
    fn period_table() {
        assert_eq!(current_period(at_hour(8)), Period::Morning);
        assert_eq!(current_period(at_hour(9)), Period::BeforeLunch);
        assert_eq!(current_period(at_hour(11)), Period::BeforeLunch);
        assert_eq!(current_period(at_hour(12)), Period::Lunch);
        assert_eq!(current_period(at_hour(13)), Period::AfterLunch);
        assert_eq!(current_period(at_hour(14)), Period::AfterLunch);
        assert_eq!(current_period(at_hour(15)), Period::AfterSchool);
        assert_eq!(current_period(at_hour(7)), Period::AfterSchool);
        assert_eq!(current_period(at_hour(0)), Period::AfterSchool);
    }
}
