use serde_json::{Map, Value};

use super::html::draft_from_html;
use super::text::{find_date, MAX_TITLE_CHARS};
use super::utils::decode_text;
use super::{DropPayload, PayloadData, PayloadInterpreter, Representation, TimerDraft};

const TITLE_KEYS: &[&str] = &["title", "summary", "subject"];
const COMMENT_KEYS: &[&str] = &["description", "body", "notes"];
const DATE_KEYS: &[&str] = &["end", "start", "date", "dateTime"];

/// Upper bound on `{` positions tried for an embedded JSON object.
const MAX_JSON_STARTS: usize = 64;

/// Private clipboard formats browsers use for page-defined data. Ordinary
/// `x-` types such as `text/x-moz-url` are left to the later interpreters.
fn is_browser_custom(rep: &Representation) -> bool {
    let mime = rep.base_mime().to_ascii_lowercase();
    mime == "chromium/x-web-custom-data"
        || mime == "application/x-moz-custom-clipdata"
        || mime.contains("/vnd.")
}

fn payload_text(rep: &Representation) -> Option<String> {
    match &rep.data {
        PayloadData::Bytes(bytes) => Some(decode_text(bytes)),
        PayloadData::Text(text) => Some(text.clone()),
        PayloadData::Path(_) => None,
    }
}

/// First JSON object embedded anywhere in `text`.
fn first_json_object(text: &str) -> Option<Map<String, Value>> {
    text.match_indices('{')
        .take(MAX_JSON_STARTS)
        .find_map(|(start, _)| {
            let mut stream = serde_json::Deserializer::from_str(&text[start..]).into_iter::<Value>();
            match stream.next() {
                Some(Ok(Value::Object(map))) => Some(map),
                _ => None,
            }
        })
}

fn string_field(map: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match map.get(*key) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    })
}

// Date values are either strings or objects such as {"dateTime": "..."}
fn date_field(map: &Map<String, Value>) -> Option<chrono::NaiveDate> {
    DATE_KEYS.iter().find_map(|key| match map.get(*key)? {
        Value::String(s) => find_date(s),
        Value::Object(inner) => date_field(inner),
        _ => None,
    })
}

fn draft_from_json(map: &Map<String, Value>) -> Option<TimerDraft> {
    let title = string_field(map, TITLE_KEYS);
    let end_date = date_field(map);
    if title.is_none() && end_date.is_none() {
        return None;
    }
    Some(TimerDraft {
        title: title
            .map(|t| t.chars().take(MAX_TITLE_CHARS).collect())
            .unwrap_or_default(),
        comment: string_field(map, COMMENT_KEYS).unwrap_or_default(),
        end_date,
    })
}

/// Vendor clipboard formats browsers use for calendar web apps.
///
/// The payload is decoded as UTF-8 or UTF-16LE; an embedded JSON object is
/// preferred, otherwise the text is treated as HTML.
pub struct BrowserCustomInterpreter;

impl PayloadInterpreter for BrowserCustomInterpreter {
    fn name(&self) -> &'static str {
        "browser-custom"
    }

    fn try_parse(&self, payload: &DropPayload) -> Option<TimerDraft> {
        payload
            .representations()
            .filter(|rep| is_browser_custom(rep))
            .find_map(|rep| {
                let text = payload_text(rep)?;
                let draft = first_json_object(&text)
                    .and_then(|map| draft_from_json(&map))
                    .or_else(|| draft_from_html(&text));
                if draft.is_none() {
                    log::debug!("Browser payload {} held nothing usable", rep.mime);
                }
                draft
            })
    }
}
