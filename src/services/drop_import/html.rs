use std::sync::OnceLock;

use regex::{Captures, Regex};

use super::text::draft_from_text;
use super::{DropPayload, PayloadInterpreter, TimerDraft, MIME_HTML};

static HIDDEN: OnceLock<Option<Regex>> = OnceLock::new();
static BREAKS: OnceLock<Option<Regex>> = OnceLock::new();
static TAGS: OnceLock<Option<Regex>> = OnceLock::new();
static ENTITIES: OnceLock<Option<Regex>> = OnceLock::new();

fn cached(cell: &'static OnceLock<Option<Regex>>, pattern: &str) -> Option<&'static Regex> {
    cell.get_or_init(|| match Regex::new(pattern) {
        Ok(regex) => Some(regex),
        Err(err) => {
            log::error!("Invalid HTML pattern {}: {}", pattern, err);
            None
        }
    })
    .as_ref()
}

fn replace_all(text: String, regex: Option<&Regex>, with: &str) -> String {
    match regex {
        Some(regex) => regex.replace_all(&text, with).into_owned(),
        None => text,
    }
}

// Windows puts a CF_HTML header in front of the markup
fn fragment(html: &str) -> &str {
    let start = html
        .find("<!--StartFragment-->")
        .map(|i| i + "<!--StartFragment-->".len())
        .unwrap_or(0);
    let end = html[start..]
        .find("<!--EndFragment-->")
        .map(|i| start + i)
        .unwrap_or(html.len());
    &html[start..end]
}

fn decode_entity(caps: &Captures<'_>) -> String {
    let entity = &caps[1];
    let decoded = if let Some(hex) = entity.strip_prefix("#x").or_else(|| entity.strip_prefix("#X")) {
        u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
    } else if let Some(dec) = entity.strip_prefix('#') {
        dec.parse().ok().and_then(char::from_u32)
    } else {
        match entity {
            "amp" => Some('&'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            "nbsp" => Some(' '),
            "ndash" => Some('–'),
            "mdash" => Some('—'),
            _ => None,
        }
    };
    decoded
        .map(String::from)
        .unwrap_or_else(|| caps[0].to_string())
}

/// Reduce HTML markup to text lines: block elements become line breaks,
/// remaining tags are dropped and character entities decoded.
pub fn strip_html(html: &str) -> String {
    let text = fragment(html).replace("\r\n", "\n");
    let text = replace_all(
        text,
        cached(&HIDDEN, r"(?is)<!--.*?-->|<(?:script|style|head)\b[^>]*>.*?</(?:script|style|head)\s*>"),
        "",
    );
    let text = replace_all(
        text,
        cached(&BREAKS, r"(?i)<\s*(?:br|/?p|/?div|/?li|/?tr|/?h[1-6]|/?table)\b[^>]*>"),
        "\n",
    );
    let text = replace_all(text, cached(&TAGS, r"(?s)<[^>]*>"), "");

    match cached(&ENTITIES, r"&(#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[a-zA-Z]{2,8});") {
        Some(regex) => regex.replace_all(&text, decode_entity).into_owned(),
        None => text,
    }
}

pub(super) fn draft_from_html(html: &str) -> Option<TimerDraft> {
    draft_from_text(&strip_html(html))
}

/// HTML fragments, typically a calendar event dragged out of a web page.
pub struct HtmlInterpreter;

impl PayloadInterpreter for HtmlInterpreter {
    fn name(&self) -> &'static str {
        "html"
    }

    fn try_parse(&self, payload: &DropPayload) -> Option<TimerDraft> {
        payload.with_mime(MIME_HTML).find_map(|rep| match rep.load_text() {
            Ok(html) => draft_from_html(&html),
            Err(err) => {
                log::warn!("Could not read dropped HTML: {}", err);
                None
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::drop_import::Representation;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    #[test]
    fn strips_tags_and_decodes_entities() {
        let html = "<div><b>Tom &amp; Jerry</b></div><p>Premiere&nbsp;on 5 June 2027</p>";
        assert_eq!(strip_html(html).trim(), "Tom & Jerry\n\nPremiere on 5 June 2027");
    }

    #[test]
    fn drops_scripts_and_comments() {
        let html = "<style>p{color:red}</style><!-- note --><p>Visible</p><script>var x = 1;</script>";
        assert_eq!(strip_html(html).trim(), "Visible");
    }

    #[test]
    fn decodes_numeric_entities() {
        assert_eq!(strip_html("caf&#233; &#x2603; &bogus;"), "café ☃ &bogus;");
    }

    #[test]
    fn reads_windows_clipboard_fragment() {
        let html = "Version:0.9\r\nStartHTML:0000000105\r\n<html><body>\
<!--StartFragment--><span>Board meeting</span><br>2027-09-14<!--EndFragment--></body></html>";
        let payload = DropPayload::new().with(Representation::text(MIME_HTML, html));

        let draft = HtmlInterpreter.try_parse(&payload).unwrap();
        assert_eq!(draft.title, "Board meeting");
        assert_eq!(draft.comment, "2027-09-14");
        assert_eq!(draft.end_date, NaiveDate::from_ymd_opt(2027, 9, 14));
    }

    #[test]
    fn empty_markup_passes() {
        let payload = DropPayload::new().with(Representation::text(MIME_HTML, "<div> </div>"));
        assert_eq!(HtmlInterpreter.try_parse(&payload), None);
    }
}
