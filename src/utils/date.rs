use chrono::{DateTime, FixedOffset};

/// Formats an RFC 3339 timestamp as a display date in the institute's
/// timezone, e.g. "February 6, 2025". Falls back to the raw string when the
/// timestamp does not parse.
pub fn format_iso_date(iso_string: &str, zone: FixedOffset) -> String {
    if let Ok(datetime) = DateTime::parse_from_rfc3339(iso_string) {
        datetime.with_timezone(&zone).format("%B %-d, %Y").to_string()
    } else {
        iso_string.to_string()
    }
}

/// Short slot form from a pair of instants, e.g. "9 AM - 10 AM".
pub fn format_time_slot(start_iso: &str, end_iso: &str, zone: FixedOffset) -> String {
    match (
        DateTime::parse_from_rfc3339(start_iso),
        DateTime::parse_from_rfc3339(end_iso),
    ) {
        (Ok(start), Ok(end)) => format!(
            "{} - {}",
            start.with_timezone(&zone).format("%-I %p"),
            end.with_timezone(&zone).format("%-I %p")
        ),
        _ => format!("{} - {}", start_iso, end_iso),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ist() -> FixedOffset {
        FixedOffset::east_opt(5 * 3600 + 30 * 60).unwrap()
    }

    #[test]
    fn dates_render_in_institute_time() {
        // 20:00Z on the 5th is already the 6th in Kolkata
        assert_eq!(
            format_iso_date("2025-02-05T20:00:00Z", ist()),
            "February 6, 2025"
        );
    }

    #[test]
    fn bad_timestamps_fall_back_to_the_raw_string() {
        assert_eq!(format_iso_date("tomorrow", ist()), "tomorrow");
    }

    #[test]
    fn slot_form_uses_short_hours() {
        assert_eq!(
            format_time_slot(
                "2025-02-06T09:00:00+05:30",
                "2025-02-06T10:00:00+05:30",
                ist()
            ),
            "9 AM - 10 AM"
        );
    }
}
