//! iCalendar rendering for reorder reminders.
//!
//! Produces a single all-day VEVENT with a one-day-before display alarm.
//! Output depends only on the event and the supplied creation stamp, so
//! identical inputs under a fixed clock render byte-identical files.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PRODUCT_ID: &str = "-//Peptide Calculator//EN";
pub const SUMMARY: &str = "Reorder Peptide Supply";

const LINE_END: &str = "\r\n";
const MAX_LINE_OCTETS: usize = 75;

/// Everything a reorder reminder shows
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ReminderEvent {
    /// Projected reorder day (the event date)
    pub reorder_date: NaiveDate,
    pub vial_mg: f64,
    pub dose_mcg: f64,
    pub days_of_supply: f64,
    pub schedule_name: String,
}

impl ReminderEvent {
    fn description(&self) -> String {
        format!(
            "Vial Size: {}mg\nCurrent Dose: {}mcg\nDays Supply: {:.1} days\nDosing Schedule: {}",
            self.vial_mg, self.dose_mcg, self.days_of_supply, self.schedule_name
        )
    }
}

/// Render the calendar record.
///
/// `stamp` is the creation moment (DTSTAMP) and is unrelated to the event
/// date, which always comes from `event.reorder_date`.
pub fn render_ics(event: &ReminderEvent, stamp: DateTime<Utc>, product_id: &str) -> String {
    let day = event.reorder_date.format("%Y%m%d").to_string();

    let lines = [
        "BEGIN:VCALENDAR".to_string(),
        "VERSION:2.0".to_string(),
        format!("PRODID:{}", product_id),
        "CALSCALE:GREGORIAN".to_string(),
        "METHOD:PUBLISH".to_string(),
        "BEGIN:VEVENT".to_string(),
        format!("DTSTART;VALUE=DATE:{}", day),
        format!("DTEND;VALUE=DATE:{}", day),
        format!("DTSTAMP:{}", stamp.format("%Y%m%dT%H%M%SZ")),
        format!("SUMMARY:{}", escape_text(SUMMARY)),
        format!("DESCRIPTION:{}", escape_text(&event.description())),
        "STATUS:CONFIRMED".to_string(),
        "SEQUENCE:0".to_string(),
        "BEGIN:VALARM".to_string(),
        "TRIGGER:-P1D".to_string(),
        "ACTION:DISPLAY".to_string(),
        format!("DESCRIPTION:{}", escape_text(&format!("Reminder: {}", SUMMARY))),
        "END:VALARM".to_string(),
        "END:VEVENT".to_string(),
        "END:VCALENDAR".to_string(),
    ];

    let mut out = String::new();
    for line in &lines {
        fold_line(line, &mut out);
    }
    out
}

/// Escape a TEXT property value (backslash, separators, newlines)
fn escape_text(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            ';' => escaped.push_str("\\;"),
            ',' => escaped.push_str("\\,"),
            '\n' => escaped.push_str("\\n"),
            '\r' => {}
            other => escaped.push(other),
        }
    }
    escaped
}

/// Append `line` folded to 75 octets, continuation lines led by a space
fn fold_line(line: &str, out: &mut String) {
    let mut budget = MAX_LINE_OCTETS;
    let mut used = 0;
    for c in line.chars() {
        let len = c.len_utf8();
        if used + len > budget {
            out.push_str(LINE_END);
            out.push(' ');
            // The leading space counts against the continuation line
            budget = MAX_LINE_OCTETS - 1;
            used = 0;
        }
        out.push(c);
        used += len;
    }
    out.push_str(LINE_END);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn event() -> ReminderEvent {
        ReminderEvent {
            reorder_date: NaiveDate::from_ymd_opt(2026, 11, 21).unwrap(),
            vial_mg: 10.0,
            dose_mcg: 250.0,
            days_of_supply: 40.0,
            schedule_name: "Once Daily".into(),
        }
    }

    fn stamp() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 9, 30, 0).unwrap()
    }

    fn unfold(ics: &str) -> String {
        ics.replace("\r\n ", "")
    }

    #[test]
    fn test_event_and_stamp_dates_are_distinct() {
        let ics = render_ics(&event(), stamp(), DEFAULT_PRODUCT_ID);
        assert!(ics.contains("DTSTART;VALUE=DATE:20261121\r\n"));
        assert!(ics.contains("DTEND;VALUE=DATE:20261121\r\n"));
        assert!(ics.contains("DTSTAMP:20261019T093000Z\r\n"));
    }

    #[test]
    fn test_structure() {
        let ics = render_ics(&event(), stamp(), DEFAULT_PRODUCT_ID);
        assert!(ics.starts_with("BEGIN:VCALENDAR\r\nVERSION:2.0\r\n"));
        assert!(ics.ends_with("END:VEVENT\r\nEND:VCALENDAR\r\n"));
        assert_eq!(ics.matches("BEGIN:VEVENT").count(), 1);
        assert!(ics.contains("STATUS:CONFIRMED\r\n"));
        assert!(ics.contains(
            "BEGIN:VALARM\r\nTRIGGER:-P1D\r\nACTION:DISPLAY\r\n"
        ));
        assert!(ics.contains("PRODID:-//Peptide Calculator//EN\r\n"));
    }

    #[test]
    fn test_description_embeds_supply_details() {
        let ics = unfold(&render_ics(&event(), stamp(), DEFAULT_PRODUCT_ID));
        assert!(ics.contains(
            "DESCRIPTION:Vial Size: 10mg\\nCurrent Dose: 250mcg\\nDays Supply: 40.0 days\\nDosing Schedule: Once Daily\r\n"
        ));
    }

    #[test]
    fn test_render_is_reproducible() {
        let a = render_ics(&event(), stamp(), DEFAULT_PRODUCT_ID);
        let b = render_ics(&event(), stamp(), DEFAULT_PRODUCT_ID);
        assert_eq!(a, b);
    }

    #[test]
    fn test_lines_are_folded() {
        let ics = render_ics(&event(), stamp(), DEFAULT_PRODUCT_ID);
        for line in ics.split("\r\n") {
            assert!(line.len() <= 75, "line too long: {:?}", line);
        }
    }

    #[test]
    fn test_escape_text() {
        assert_eq!(escape_text("a,b;c\\d\ne"), "a\\,b\\;c\\\\d\\ne");
    }
}
