//! Turning external drag-and-drop and clipboard payloads into timer drafts.
//!
//! A [`DropPayload`] carries every representation the source offered. The
//! [`InterpreterChain`] asks each [`PayloadInterpreter`] in a fixed priority
//! order and keeps the first draft produced; an interpreter that cannot make
//! sense of its representation simply passes.

mod browser;
mod html;
mod ics;
mod text;
mod utils;

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use thiserror::Error;

pub use browser::BrowserCustomInterpreter;
pub use html::{strip_html, HtmlInterpreter};
pub use ics::{parse_calendar, CalendarMimeInterpreter, IcsFileInterpreter};
pub use text::{draft_from_text, find_date, PlainTextInterpreter, MAX_TITLE_CHARS};

pub const MIME_CALENDAR: &str = "text/calendar";
pub const MIME_HTML: &str = "text/html";
pub const MIME_PLAIN: &str = "text/plain";
pub const MIME_URI_LIST: &str = "text/uri-list";

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("failed to read {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("payload is not iCalendar data")]
    NotCalendar,
    #[error("calendar contains no event")]
    NoEvent,
    #[error("invalid iCalendar data: {0}")]
    Parse(String),
}

/// Title, comment and date pulled out of a dropped payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimerDraft {
    pub title: String,
    pub comment: String,
    pub end_date: Option<NaiveDate>,
}

impl TimerDraft {
    pub fn is_empty(&self) -> bool {
        self.title.trim().is_empty() && self.comment.trim().is_empty() && self.end_date.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadData {
    Text(String),
    Bytes(Vec<u8>),
    /// Local file reference, from a dropped file or a `file://` URL
    Path(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Representation {
    pub mime: String,
    pub data: PayloadData,
}

impl Representation {
    pub fn text(mime: impl Into<String>, text: impl Into<String>) -> Self {
        Self { mime: mime.into(), data: PayloadData::Text(text.into()) }
    }

    pub fn bytes(mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self { mime: mime.into(), data: PayloadData::Bytes(bytes) }
    }

    pub fn path(mime: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self { mime: mime.into(), data: PayloadData::Path(path.into()) }
    }

    /// True when the MIME type matches `mime` ignoring case and parameters
    /// such as `; charset=utf-8`.
    pub fn has_mime(&self, mime: &str) -> bool {
        self.base_mime().eq_ignore_ascii_case(mime)
    }

    pub fn base_mime(&self) -> &str {
        self.mime.split(';').next().unwrap_or_default().trim()
    }

    /// Local path referenced by this representation, if any.
    pub fn local_path(&self) -> Option<Cow<'_, Path>> {
        match &self.data {
            PayloadData::Path(path) => Some(Cow::Borrowed(path.as_path())),
            PayloadData::Text(text) => utils::file_url_to_path(text).map(Cow::Owned),
            PayloadData::Bytes(_) => None,
        }
    }

    /// Text content, reading the file for path representations.
    pub fn load_text(&self) -> Result<Cow<'_, str>, ImportError> {
        match &self.data {
            PayloadData::Text(text) => Ok(Cow::Borrowed(text.as_str())),
            PayloadData::Bytes(bytes) => Ok(Cow::Owned(utils::decode_text(bytes))),
            PayloadData::Path(path) => utils::read_text_file(path).map(Cow::Owned),
        }
    }
}

/// Everything one drop (or paste) offered, in the order the source listed it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DropPayload {
    representations: Vec<Representation>,
}

impl DropPayload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, representation: Representation) -> Self {
        self.push(representation);
        self
    }

    pub fn push(&mut self, representation: Representation) {
        self.representations.push(representation);
    }

    pub fn is_empty(&self) -> bool {
        self.representations.is_empty()
    }

    pub fn representations(&self) -> impl Iterator<Item = &Representation> {
        self.representations.iter()
    }

    pub fn with_mime<'a>(&'a self, mime: &'a str) -> impl Iterator<Item = &'a Representation> {
        self.representations.iter().filter(move |rep| rep.has_mime(mime))
    }
}

pub trait PayloadInterpreter {
    fn name(&self) -> &'static str;

    fn try_parse(&self, payload: &DropPayload) -> Option<TimerDraft>;
}

/// Interpreters tried in order; the first draft wins.
pub struct InterpreterChain {
    interpreters: Vec<Box<dyn PayloadInterpreter>>,
}

impl InterpreterChain {
    pub fn new(interpreters: Vec<Box<dyn PayloadInterpreter>>) -> Self {
        Self { interpreters }
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.interpreters.iter().map(|i| i.name()).collect()
    }

    pub fn interpret(&self, payload: &DropPayload) -> Option<TimerDraft> {
        if payload.is_empty() {
            return None;
        }
        for interpreter in &self.interpreters {
            if let Some(draft) = interpreter.try_parse(payload) {
                log::info!(
                    "Drop payload interpreted by {}: '{}' ({:?})",
                    interpreter.name(),
                    draft.title,
                    draft.end_date
                );
                return Some(draft);
            }
            log::debug!("{} could not interpret drop payload", interpreter.name());
        }
        log::info!("No interpreter accepted the drop payload");
        None
    }
}

impl Default for InterpreterChain {
    fn default() -> Self {
        Self::new(vec![
            Box::new(IcsFileInterpreter),
            Box::new(CalendarMimeInterpreter),
            Box::new(BrowserCustomInterpreter),
            Box::new(HtmlInterpreter),
            Box::new(PlainTextInterpreter),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const CALENDAR: &str = "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nBEGIN:VEVENT\r\n\
SUMMARY:Launch\r\nDTSTART;VALUE=DATE:20270115\r\nEND:VEVENT\r\nEND:VCALENDAR\r\n";

    #[test]
    fn default_chain_order() {
        assert_eq!(
            InterpreterChain::default().names(),
            vec!["ics-file", "calendar-mime", "browser-custom", "html", "plain-text"]
        );
    }

    #[test]
    fn calendar_beats_plain_text() {
        let payload = DropPayload::new()
            .with(Representation::text(MIME_PLAIN, "Something else 2030-01-01"))
            .with(Representation::text(MIME_CALENDAR, CALENDAR));

        let draft = InterpreterChain::default().interpret(&payload).unwrap();
        assert_eq!(draft.title, "Launch");
        assert_eq!(draft.end_date, NaiveDate::from_ymd_opt(2027, 1, 15));
    }

    #[test]
    fn broken_calendar_falls_through_to_text() {
        let payload = DropPayload::new()
            .with(Representation::text(MIME_CALENDAR, "BEGIN:VCALENDAR\r\nEND:VCALENDAR\r\n"))
            .with(Representation::text(MIME_PLAIN, "Dentist\n12.03.2027"));

        let draft = InterpreterChain::default().interpret(&payload).unwrap();
        assert_eq!(draft.title, "Dentist");
        assert_eq!(draft.end_date, NaiveDate::from_ymd_opt(2027, 3, 12));
    }

    #[test]
    fn dragged_link_does_not_preempt_html() {
        let payload = DropPayload::new()
            .with(Representation::text(
                "text/x-moz-url",
                "https://example.com/{\"title\":\"Wrong\",\"date\":\"2027-02-02\"}\nLink",
            ))
            .with(Representation::text(MIME_HTML, "<b>Concert</b><br>July 4, 2027"));

        let draft = InterpreterChain::default().interpret(&payload).unwrap();
        assert_eq!(draft.title, "Concert");
        assert_eq!(draft.end_date, NaiveDate::from_ymd_opt(2027, 7, 4));
    }

    #[test]
    fn empty_payload_yields_nothing() {
        assert_eq!(InterpreterChain::default().interpret(&DropPayload::new()), None);
    }

    #[test]
    fn mime_parameters_are_ignored() {
        let rep = Representation::text("text/HTML; charset=utf-8", "<b>x</b>");
        assert!(rep.has_mime(MIME_HTML));
    }
}
