//! iCalendar invite construction.
//!
//! Builds the minimal VCALENDAR/VEVENT attached to enrollment mails. Times
//! are written as floating local times on purpose: the club runs in one
//! place, and the scheduling layer is deliberately timezone-unaware.

use crate::entities::event_records::EventRecord;

/// Escapes a TEXT value per RFC 5545 (backslash, semicolon, comma, newline).
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

fn format_date(date: time::Date) -> String {
    format!(
        "{:04}{:02}{:02}",
        date.year(),
        u8::from(date.month()),
        date.day()
    )
}

fn format_date_time(date: time::Date, time_of_day: time::Time) -> String {
    format!(
        "{}T{:02}{:02}{:02}",
        format_date(date),
        time_of_day.hour(),
        time_of_day.minute(),
        time_of_day.second()
    )
}

/// Builds an iCalendar invite for the given event.
///
/// Events without a start time become whole-day entries. Events with a start
/// time but no end time default to one hour, rolling over midnight when
/// needed.
pub fn build_invite(event: &EventRecord) -> String {
    let mut lines: Vec<String> = vec![
        "BEGIN:VCALENDAR".to_string(),
        "VERSION:2.0".to_string(),
        "PRODID:-//stichtag//EN".to_string(),
        "CALSCALE:GREGORIAN".to_string(),
        "METHOD:PUBLISH".to_string(),
        "BEGIN:VEVENT".to_string(),
        format!("UID:{}@stichtag", event.event_id),
    ];

    let stamp = time::OffsetDateTime::now_utc();
    lines.push(format!(
        "DTSTAMP:{}Z",
        format_date_time(stamp.date(), stamp.time())
    ));

    match event.starts_at {
        None => {
            lines.push(format!(
                "DTSTART;VALUE=DATE:{}",
                format_date(event.event_date)
            ));
            let next = event.event_date.next_day().unwrap_or(event.event_date);
            lines.push(format!("DTEND;VALUE=DATE:{}", format_date(next)));
        }
        Some(start) => {
            lines.push(format!(
                "DTSTART:{}",
                format_date_time(event.event_date, start)
            ));
            let (end_date, end_time) = match event.ends_at {
                Some(end) => (event.event_date, end),
                None => {
                    let end = time::PrimitiveDateTime::new(event.event_date, start)
                        + time::Duration::HOUR;
                    (end.date(), end.time())
                }
            };
            lines.push(format!("DTEND:{}", format_date_time(end_date, end_time)));
        }
    }

    lines.push(format!("SUMMARY:{}", escape_text(&event.title)));
    if !event.description.is_empty() {
        lines.push(format!("DESCRIPTION:{}", escape_text(&event.description)));
    }
    if let Some(email) = &event.organizer_email {
        let name = event.organizer_name.as_deref().unwrap_or(email);
        lines.push(format!(
            "ORGANIZER;CN={}:mailto:{}",
            escape_text(name),
            email
        ));
    }

    lines.push("END:VEVENT".to_string());
    lines.push("END:VCALENDAR".to_string());

    let mut out = lines.join("\r\n");
    out.push_str("\r\n");
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn sample_event() -> EventRecord {
        let now = time::OffsetDateTime::now_utc();
        EventRecord {
            event_id: Uuid::new_v4(),
            title: "Summer hike".to_string(),
            event_date: time::Date::from_calendar_date(2026, time::Month::September, 12).unwrap(),
            starts_at: None,
            ends_at: None,
            description: "Day trip to the lake".to_string(),
            capacity: 20,
            deadline: None,
            organizer_name: Some("Anna".to_string()),
            organizer_email: Some("anna@example.org".to_string()),
            reward_score: 0,
            deadline_notified: false,
            created_at: time::PrimitiveDateTime::new(now.date(), now.time()),
        }
    }

    #[test]
    fn whole_day_event_uses_date_values() {
        let invite = build_invite(&sample_event());
        assert!(invite.contains("DTSTART;VALUE=DATE:20260912\r\n"));
        assert!(invite.contains("DTEND;VALUE=DATE:20260913\r\n"));
        assert!(invite.starts_with("BEGIN:VCALENDAR\r\n"));
        assert!(invite.ends_with("END:VCALENDAR\r\n"));
    }

    #[test]
    fn timed_event_defaults_to_one_hour() {
        let mut event = sample_event();
        event.starts_at = Some(time::Time::from_hms(18, 30, 0).unwrap());
        let invite = build_invite(&event);
        assert!(invite.contains("DTSTART:20260912T183000\r\n"));
        assert!(invite.contains("DTEND:20260912T193000\r\n"));
    }

    #[test]
    fn default_duration_rolls_over_midnight() {
        let mut event = sample_event();
        event.starts_at = Some(time::Time::from_hms(23, 30, 0).unwrap());
        let invite = build_invite(&event);
        assert!(invite.contains("DTEND:20260913T003000\r\n"));
    }

    #[test]
    fn explicit_end_time_wins_over_default() {
        let mut event = sample_event();
        event.starts_at = Some(time::Time::from_hms(9, 0, 0).unwrap());
        event.ends_at = Some(time::Time::from_hms(17, 0, 0).unwrap());
        let invite = build_invite(&event);
        assert!(invite.contains("DTEND:20260912T170000\r\n"));
    }

    #[test]
    fn text_values_are_escaped() {
        let mut event = sample_event();
        event.title = "Grill & chill; bring salads, please".to_string();
        event.description = "line one\nline two".to_string();
        let invite = build_invite(&event);
        assert!(invite.contains("SUMMARY:Grill & chill\\; bring salads\\, please\r\n"));
        assert!(invite.contains("DESCRIPTION:line one\\nline two\r\n"));
    }

    #[test]
    fn organizer_line_carries_name_and_address() {
        let invite = build_invite(&sample_event());
        assert!(invite.contains("ORGANIZER;CN=Anna:mailto:anna@example.org\r\n"));

        let mut nameless = sample_event();
        nameless.organizer_name = None;
        let invite = build_invite(&nameless);
        assert!(invite.contains("ORGANIZER;CN=anna@example.org:mailto:anna@example.org\r\n"));

        let mut plain = sample_event();
        plain.organizer_email = None;
        let invite = build_invite(&plain);
        assert!(!invite.contains("ORGANIZER"));
    }
}
