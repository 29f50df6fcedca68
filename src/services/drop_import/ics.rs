use std::io::BufReader;

use ical::parser::ical::component::IcalEvent;
use ical::property::Property;
use ical::IcalParser;

use super::utils::{has_extension, parse_ical_date, read_text_file, unescape_text};
use super::{
    DropPayload, ImportError, PayloadInterpreter, Representation, TimerDraft, MIME_CALENDAR,
};

const CALENDAR_MIMES: &[&str] = &[MIME_CALENDAR, "application/ics", "text/x-vcalendar"];

/// Build a draft from the first VEVENT of an iCalendar document.
///
/// SUMMARY becomes the title and DESCRIPTION the comment. The date comes from
/// DTSTART, or DTEND when the event has no start.
pub fn parse_calendar(content: &str) -> Result<TimerDraft, ImportError> {
    let content = wrap_bare_event(content).ok_or(ImportError::NotCalendar)?;
    let parser = IcalParser::new(BufReader::new(content.as_bytes()));

    for calendar in parser {
        let calendar = calendar.map_err(|err| ImportError::Parse(err.to_string()))?;
        if let Some(event) = calendar.events.first() {
            return Ok(draft_from_event(event));
        }
    }
    Err(ImportError::NoEvent)
}

// Some sources hand over a lone VEVENT without the VCALENDAR envelope
fn wrap_bare_event(content: &str) -> Option<String> {
    if content.contains("BEGIN:VCALENDAR") {
        Some(content.to_string())
    } else if content.contains("BEGIN:VEVENT") {
        Some(format!("BEGIN:VCALENDAR\r\nVERSION:2.0\r\n{}\r\nEND:VCALENDAR\r\n", content.trim()))
    } else {
        None
    }
}

fn draft_from_event(event: &IcalEvent) -> TimerDraft {
    let text = |name: &str| {
        find_property(event, name)
            .and_then(|p| p.value.as_deref())
            .map(|v| unescape_text(v).trim().to_string())
            .unwrap_or_default()
    };

    let end_date = ["DTSTART", "DTEND"]
        .iter()
        .filter_map(|name| find_property(event, name))
        .find_map(property_date);

    TimerDraft {
        title: text("SUMMARY"),
        comment: text("DESCRIPTION"),
        end_date,
    }
}

fn find_property<'a>(event: &'a IcalEvent, name: &str) -> Option<&'a Property> {
    event
        .properties
        .iter()
        .find(|p| p.name.eq_ignore_ascii_case(name))
}

fn property_date(property: &Property) -> Option<chrono::NaiveDate> {
    let value = property.value.as_deref()?;
    let param = |key: &str| {
        property.params.as_ref().and_then(|params| {
            params
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(key))
                .and_then(|(_, values)| values.first())
                .map(String::as_str)
        })
    };
    let is_date = param("VALUE").is_some_and(|v| v.eq_ignore_ascii_case("DATE"));
    parse_ical_date(value, is_date, param("TZID"))
}

/// A dropped `.ics` file, given as a path or a `file://` URL.
pub struct IcsFileInterpreter;

impl PayloadInterpreter for IcsFileInterpreter {
    fn name(&self) -> &'static str {
        "ics-file"
    }

    fn try_parse(&self, payload: &DropPayload) -> Option<TimerDraft> {
        payload.representations().find_map(|rep| {
            let path = rep.local_path()?;
            if !has_extension(&path, "ics") {
                return None;
            }
            let parsed = read_text_file(&path).and_then(|content| parse_calendar(&content));
            match parsed {
                Ok(draft) => Some(draft),
                Err(err) => {
                    log::warn!("Could not import {}: {}", path.display(), err);
                    None
                }
            }
        })
    }
}

/// Inline iCalendar data offered under a calendar MIME type.
pub struct CalendarMimeInterpreter;

impl CalendarMimeInterpreter {
    fn accepts(rep: &Representation) -> bool {
        CALENDAR_MIMES.iter().any(|mime| rep.has_mime(mime))
    }
}

impl PayloadInterpreter for CalendarMimeInterpreter {
    fn name(&self) -> &'static str {
        "calendar-mime"
    }

    fn try_parse(&self, payload: &DropPayload) -> Option<TimerDraft> {
        payload
            .representations()
            .filter(|rep| Self::accepts(rep))
            .find_map(|rep| {
                let parsed = rep.load_text().and_then(|content| parse_calendar(&content));
                match parsed {
                    Ok(draft) => Some(draft),
                    Err(err) => {
                        log::debug!("Calendar payload ({}) rejected: {}", rep.mime, err);
                        None
                    }
                }
            })
    }
}
