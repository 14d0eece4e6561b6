use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime};

const OPENING_HOUR: u32 = 9;
const CLOSING_HOUR: u32 = 18;

/// Bookable slot range: tomorrow, 09:00 to 18:00 inclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppointmentWindow {
    pub min: NaiveDateTime,
    pub max: NaiveDateTime,
}

impl AppointmentWindow {
    pub fn contains(&self, at: NaiveDateTime) -> bool {
        at >= self.min && at <= self.max
    }

    /// `min` attribute for a `datetime-local` input
    pub fn min_input_value(&self) -> String {
        self.min.format(DATETIME_LOCAL_FORMAT).to_string()
    }

    pub fn max_input_value(&self) -> String {
        self.max.format(DATETIME_LOCAL_FORMAT).to_string()
    }
}

pub const DATETIME_LOCAL_FORMAT: &str = "%Y-%m-%dT%H:%M";

pub fn appointment_window(today: NaiveDate) -> AppointmentWindow {
    let tomorrow = today.checked_add_days(Days::new(1)).unwrap_or(today);
    AppointmentWindow {
        min: tomorrow.and_time(NaiveTime::from_hms_opt(OPENING_HOUR, 0, 0).unwrap_or_default()),
        max: tomorrow.and_time(NaiveTime::from_hms_opt(CLOSING_HOUR, 0, 0).unwrap_or_default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_is_tomorrow_business_hours() {
        let today = NaiveDate::from_ymd_opt(2026, 12, 31).unwrap();
        let window = appointment_window(today);

        assert_eq!(window.min_input_value(), "2027-01-01T09:00");
        assert_eq!(window.max_input_value(), "2027-01-01T18:00");
    }

    #[test]
    fn test_contains_bounds() {
        let window = appointment_window(NaiveDate::from_ymd_opt(2026, 10, 16).unwrap());
        let at = |s: &str| NaiveDateTime::parse_from_str(s, DATETIME_LOCAL_FORMAT).unwrap();

        assert!(window.contains(at("2026-10-17T09:00")));
        assert!(window.contains(at("2026-10-17T18:00")));
        assert!(!window.contains(at("2026-10-17T18:01")));
        assert!(!window.contains(at("2026-10-16T12:00")));
    }
}
