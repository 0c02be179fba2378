//! Display formatting helpers shared by the view layer.

use chrono::NaiveDateTime;

/// Format an order timestamp the way the shop displays dates
/// (day-first, 24-hour clock).
#[must_use]
pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format("%d.%m.%Y, %H:%M:%S").to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_format_timestamp_day_first() {
        let ts = NaiveDateTime::parse_from_str("2024-03-01T12:30:05", "%Y-%m-%dT%H:%M:%S").unwrap();
        assert_eq!(format_timestamp(&ts), "01.03.2024, 12:30:05");
    }
}
