//! OS drops and clipboard paste, fed through the drop-import chain.

use super::CountdownApp;
use crate::services::drop_import::{
    DropPayload, Representation, TimerDraft, MIME_CALENDAR, MIME_HTML, MIME_PLAIN, MIME_URI_LIST,
};

impl CountdownApp {
    pub(super) fn handle_file_drops(&mut self, ctx: &egui::Context) {
        let payloads: Vec<DropPayload> = ctx.input(|i| {
            i.raw
                .dropped_files
                .iter()
                .map(payload_from_dropped_file)
                .filter(|payload| !payload.is_empty())
                .collect()
        });

        for payload in payloads {
            self.import_payload(&payload, "drop");
        }
    }

    /// Paste outside a text field counts as dropping the clipboard text.
    pub(super) fn handle_paste(&mut self, ctx: &egui::Context) {
        if ctx.memory(|m| m.focused().is_some()) {
            return;
        }
        let pasted: Vec<String> = ctx.input(|i| {
            i.events
                .iter()
                .filter_map(|event| match event {
                    egui::Event::Paste(text) => Some(text.clone()),
                    _ => None,
                })
                .collect()
        });

        for text in pasted {
            self.import_payload(&payload_from_text(&text), "paste");
        }
    }

    fn import_payload(&mut self, payload: &DropPayload, source: &str) {
        match self.drop_chain.interpret(payload) {
            Some(draft) => self.add_timer_from_draft(draft, source),
            None => {
                log::warn!("Nothing usable in {} payload", source);
                self.toasts
                    .warning("Could not find an event or text to create a timer from");
            }
        }
    }

    fn add_timer_from_draft(&mut self, draft: TimerDraft, source: &str) {
        let TimerDraft {
            title,
            comment,
            end_date,
        } = draft;
        let id = self.add_timer(Some(title), end_date, Some(comment));
        let title = self
            .service
            .timer(&id)
            .map(|config| config.title.clone())
            .unwrap_or_default();
        log::info!("Created timer {} from {}", id, source);
        self.toasts.success(format!("Added \"{}\"", title));
    }
}

/// Wrap raw text in the representations it plausibly is.
pub(super) fn payload_from_text(text: &str) -> DropPayload {
    let trimmed = text.trim_start();
    let mut payload = DropPayload::new();

    if trimmed.starts_with("BEGIN:VCALENDAR") || trimmed.starts_with("BEGIN:VEVENT") {
        payload.push(Representation::text(MIME_CALENDAR, text));
    }
    if trimmed.starts_with("file://") {
        payload.push(Representation::text(MIME_URI_LIST, text));
    }
    if looks_like_html(trimmed) {
        payload.push(Representation::text(MIME_HTML, text));
    }
    payload.push(Representation::text(MIME_PLAIN, text));
    payload
}

fn looks_like_html(text: &str) -> bool {
    let head = text.get(..text.len().min(512)).unwrap_or(text).to_ascii_lowercase();
    head.starts_with('<')
        && ["<html", "<body", "<div", "<p", "<span", "<a ", "<!doctype", "<meta"]
            .iter()
            .any(|tag| head.contains(tag))
}

/// A dropped file arrives as a path, as in-memory bytes, or both.
pub(super) fn payload_from_dropped_file(file: &egui::DroppedFile) -> DropPayload {
    let mut payload = DropPayload::new();
    let mime = file.mime.as_str();

    if let Some(path) = &file.path {
        payload.push(Representation::path(mime, path.clone()));
    }
    if let Some(bytes) = &file.bytes {
        let mime = if mime.is_empty() && file.name.to_ascii_lowercase().ends_with(".ics") {
            MIME_CALENDAR
        } else {
            mime
        };
        payload.push(Representation::bytes(mime, bytes.to_vec()));
    }
    payload
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::drop_import::InterpreterChain;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    #[test]
    fn plain_text_gets_one_representation() {
        let payload = payload_from_text("Dentist 2027-03-04");
        let mimes: Vec<&str> = payload.representations().map(|r| r.mime.as_str()).collect();
        assert_eq!(mimes, vec![MIME_PLAIN]);
    }

    #[test]
    fn calendar_text_is_offered_as_calendar_first() {
        let payload = payload_from_text("BEGIN:VCALENDAR\nEND:VCALENDAR\n");
        let mimes: Vec<&str> = payload.representations().map(|r| r.mime.as_str()).collect();
        assert_eq!(mimes, vec![MIME_CALENDAR, MIME_PLAIN]);
    }

    #[test]
    fn html_and_uri_lists_are_recognised() {
        let html = payload_from_text("<div><b>Launch</b></div>");
        assert!(html.with_mime(MIME_HTML).next().is_some());

        let uri = payload_from_text("file:///tmp/event.ics");
        assert!(uri.with_mime(MIME_URI_LIST).next().is_some());
    }

    #[test]
    fn pasted_calendar_becomes_a_draft() {
        let text = "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nBEGIN:VEVENT\r\nUID:1\r\n\
                    SUMMARY:Board meeting\r\nDTSTART;VALUE=DATE:20270210\r\n\
                    END:VEVENT\r\nEND:VCALENDAR\r\n";
        let draft = InterpreterChain::default()
            .interpret(&payload_from_text(text))
            .expect("calendar draft");
        assert_eq!(draft.title, "Board meeting");
        assert_eq!(draft.end_date, NaiveDate::from_ymd_opt(2027, 2, 10));
    }

    #[test]
    fn dropped_bytes_keep_their_mime() {
        let file = egui::DroppedFile {
            name: "invite.ics".to_string(),
            bytes: Some(std::sync::Arc::from(&b"BEGIN:VCALENDAR"[..])),
            ..Default::default()
        };
        let payload = payload_from_dropped_file(&file);
        let mimes: Vec<&str> = payload.representations().map(|r| r.mime.as_str()).collect();
        assert_eq!(mimes, vec![MIME_CALENDAR]);
    }

    #[test]
    fn dropped_path_is_kept() {
        let file = egui::DroppedFile {
            path: Some("/tmp/a.ics".into()),
            ..Default::default()
        };
        let payload = payload_from_dropped_file(&file);
        assert_eq!(payload.representations().count(), 1);
    }
}
