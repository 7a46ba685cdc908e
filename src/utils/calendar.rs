use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::utils::time::to_ical_utc;

pub const CALENDAR_CONTENT_TYPE: &str = "text/calendar; method=REQUEST; charset=UTF-8";
pub const CALENDAR_FILENAME: &str = "interview.ics";

/// An interview invitation. Always one hour long, stored in UTC.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarEvent {
    pub uid: String,
    pub summary: String,
    pub description: String,
    pub location: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl CalendarEvent {
    pub fn interview(
        summary: impl Into<String>,
        description: impl Into<String>,
        location: impl Into<String>,
        start: DateTime<Utc>,
    ) -> Self {
        Self {
            uid: format!("{}@recruitment-pipeline", Uuid::new_v4()),
            summary: summary.into(),
            description: description.into(),
            location: location.into(),
            start,
            end: start + Duration::hours(1),
        }
    }

    /// Renders a single-event VCALENDAR with CRLF line endings.
    pub fn to_ics(&self, stamp: DateTime<Utc>) -> String {
        let lines = [
            "BEGIN:VCALENDAR".to_string(),
            "VERSION:2.0".to_string(),
            "PRODID:-//recruitment-pipeline//interviews//EN".to_string(),
            "METHOD:REQUEST".to_string(),
            "BEGIN:VEVENT".to_string(),
            format!("UID:{}", self.uid),
            format!("DTSTAMP:{}", to_ical_utc(stamp)),
            format!("DTSTART:{}", to_ical_utc(self.start)),
            format!("DTEND:{}", to_ical_utc(self.end)),
            format!("SUMMARY:{}", escape_text(&self.summary)),
            format!("DESCRIPTION:{}", escape_text(&self.description)),
            format!("LOCATION:{}", escape_text(&self.location)),
            "END:VEVENT".to_string(),
            "END:VCALENDAR".to_string(),
        ];
        let mut out = lines.join("\r\n");
        out.push_str("\r\n");
        out
    }
}

// RFC 5545 TEXT escaping.
fn escape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            ';' => out.push_str("\\;"),
            ',' => out.push_str("\\,"),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, TimeZone};

    #[test]
    fn interview_lasts_one_hour() {
        let start = Utc.with_ymd_and_hms(2026, 11, 2, 10, 0, 0).unwrap();
        let event = CalendarEvent::interview("HR Interview - Jane", "", "Head Office", start);
        assert_eq!(event.end - event.start, Duration::hours(1));
    }

    #[test]
    fn offset_start_times_render_in_utc() {
        let local = FixedOffset::east_opt(2 * 3600)
            .unwrap()
            .with_ymd_and_hms(2026, 11, 2, 12, 0, 0)
            .unwrap();
        let event = CalendarEvent::interview("s", "d", "l", local.with_timezone(&Utc));
        let ics = event.to_ics(Utc.with_ymd_and_hms(2026, 10, 19, 0, 0, 0).unwrap());
        assert!(ics.contains("DTSTART:20261102T100000Z\r\n"));
        assert!(ics.contains("DTEND:20261102T110000Z\r\n"));
    }

    #[test]
    fn text_fields_are_escaped() {
        let start = Utc.with_ymd_and_hms(2026, 11, 2, 10, 0, 0).unwrap();
        let event = CalendarEvent::interview("Tech; round, two", "line1\nline2", "Room 1", start);
        let ics = event.to_ics(start);
        assert!(ics.contains("SUMMARY:Tech\\; round\\, two"));
        assert!(ics.contains("DESCRIPTION:line1\\nline2"));
        assert!(ics.starts_with("BEGIN:VCALENDAR\r\n"));
        assert!(ics.ends_with("END:VCALENDAR\r\n"));
    }
}
