use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::{Captures, Regex};

use super::{DropPayload, PayloadData, PayloadInterpreter, TimerDraft, MIME_PLAIN};

/// Longest title taken from free text, in characters.
pub const MAX_TITLE_CHARS: usize = 100;

const MONTH: &str = "jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|jun(?:e)?|jul(?:y)?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?";

static ISO: OnceLock<Option<Regex>> = OnceLock::new();
static DOTTED: OnceLock<Option<Regex>> = OnceLock::new();
static SLASHED: OnceLock<Option<Regex>> = OnceLock::new();
static MONTH_FIRST: OnceLock<Option<Regex>> = OnceLock::new();
static DAY_FIRST: OnceLock<Option<Regex>> = OnceLock::new();

fn cached(cell: &'static OnceLock<Option<Regex>>, pattern: impl FnOnce() -> String) -> Option<&'static Regex> {
    cell.get_or_init(|| {
        let pattern = pattern();
        match Regex::new(&pattern) {
            Ok(regex) => Some(regex),
            Err(err) => {
                log::error!("Invalid date pattern {}: {}", pattern, err);
                None
            }
        }
    })
    .as_ref()
}

fn month_number(name: &str) -> Option<u32> {
    let prefix: String = name.chars().take(3).collect::<String>().to_ascii_lowercase();
    let month = match prefix.as_str() {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}

fn num<T: std::str::FromStr>(caps: &Captures<'_>, name: &str) -> Option<T> {
    caps.name(name)?.as_str().parse().ok()
}

type DateBuilder = fn(&Captures<'_>) -> Option<NaiveDate>;

fn numeric(caps: &Captures<'_>) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(num(caps, "y")?, num(caps, "m")?, num(caps, "d")?)
}

fn named_month(caps: &Captures<'_>) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(num(caps, "y")?, month_number(caps.name("mon")?.as_str())?, num(caps, "d")?)
}

fn patterns() -> Vec<(Option<&'static Regex>, DateBuilder)> {
    vec![
        (
            cached(&ISO, || r"\b(?P<y>\d{4})-(?P<m>\d{1,2})-(?P<d>\d{1,2})(?:T|\b)".into()),
            numeric,
        ),
        (
            cached(&DOTTED, || r"\b(?P<d>\d{1,2})\.(?P<m>\d{1,2})\.(?P<y>\d{4})\b".into()),
            numeric,
        ),
        (
            cached(&SLASHED, || r"\b(?P<m>\d{1,2})/(?P<d>\d{1,2})/(?P<y>\d{4})\b".into()),
            numeric,
        ),
        (
            cached(&MONTH_FIRST, || {
                format!(r"(?i)\b(?P<mon>{MONTH})\.?\s+(?P<d>\d{{1,2}})(?:st|nd|rd|th)?,?\s+(?P<y>\d{{4}})\b")
            }),
            named_month,
        ),
        (
            cached(&DAY_FIRST, || {
                format!(r"(?i)\b(?P<d>\d{{1,2}})(?:st|nd|rd|th)?\.?\s+(?P<mon>{MONTH})\.?,?\s+(?P<y>\d{{4}})\b")
            }),
            named_month,
        ),
    ]
}

/// The earliest recognizable calendar date in `text`.
///
/// Understands `YYYY-MM-DD`, `DD.MM.YYYY`, `MM/DD/YYYY`, `Month D, YYYY` and
/// `D Month YYYY`. Matches that are not real dates (`2027-02-30`) are skipped.
pub fn find_date(text: &str) -> Option<NaiveDate> {
    patterns()
        .into_iter()
        .filter_map(|(regex, build)| {
            regex?
                .captures_iter(text)
                .find_map(|caps| {
                    let start = caps.get(0)?.start();
                    build(&caps).map(|date| (start, date))
                })
        })
        .min_by_key(|(start, _)| *start)
        .map(|(_, date)| date)
}

/// First non-empty line as title, the remaining lines as comment, and the
/// first date found anywhere in the text.
pub fn draft_from_text(text: &str) -> Option<TimerDraft> {
    let mut lines = text.lines().map(str::trim).filter(|line| !line.is_empty());
    let first = lines.next()?;
    let title: String = first.chars().take(MAX_TITLE_CHARS).collect();
    let comment = lines.collect::<Vec<_>>().join("\n");

    Some(TimerDraft {
        title,
        comment,
        end_date: find_date(text),
    })
}

/// Fallback for any text the other interpreters passed on.
pub struct PlainTextInterpreter;

impl PayloadInterpreter for PlainTextInterpreter {
    fn name(&self) -> &'static str {
        "plain-text"
    }

    fn try_parse(&self, payload: &DropPayload) -> Option<TimerDraft> {
        payload
            .representations()
            .filter(|rep| {
                rep.has_mime(MIME_PLAIN)
                    || rep.has_mime("UTF8_STRING")
                    || (rep.base_mime().is_empty() && matches!(rep.data, PayloadData::Text(_)))
            })
            .find_map(|rep| match rep.load_text() {
                Ok(text) => draft_from_text(&text),
                Err(err) => {
                    log::warn!("Could not read dropped text: {}", err);
                    None
                }
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::drop_import::Representation;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    #[test_case("Launch 2027-03-04", 2027, 3, 4 ; "iso")]
    #[test_case("on 4.3.2027 at noon", 2027, 3, 4 ; "dotted")]
    #[test_case("due 03/04/2027", 2027, 3, 4 ; "us slashes")]
    #[test_case("March 4, 2027", 2027, 3, 4 ; "month first")]
    #[test_case("Sept 4th 2027", 2027, 9, 4 ; "abbreviated month")]
    #[test_case("4 March 2027", 2027, 3, 4 ; "day first")]
    #[test_case("starts 2027-03-04T09:00:00Z", 2027, 3, 4 ; "iso with time")]
    fn recognizes_dates(text: &str, y: i32, m: u32, d: u32) {
        assert_eq!(find_date(text), NaiveDate::from_ymd_opt(y, m, d));
    }

    #[test]
    fn earliest_date_wins() {
        assert_eq!(
            find_date("from 1 May 2027 until 2027-06-01"),
            NaiveDate::from_ymd_opt(2027, 5, 1)
        );
    }

    #[test]
    fn impossible_dates_are_skipped() {
        assert_eq!(
            find_date("2027-02-30 or 2027-03-01"),
            NaiveDate::from_ymd_opt(2027, 3, 1)
        );
        assert_eq!(find_date("no date here"), None);
    }

    #[test]
    fn splits_title_and_comment() {
        let draft = draft_from_text("\n  Vacation  \nPack bags\n\nBook taxi 2027-07-01\n").unwrap();
        assert_eq!(draft.title, "Vacation");
        assert_eq!(draft.comment, "Pack bags\nBook taxi 2027-07-01");
        assert_eq!(draft.end_date, NaiveDate::from_ymd_opt(2027, 7, 1));
    }

    #[test]
    fn long_titles_are_truncated() {
        let text = "x".repeat(250);
        let draft = draft_from_text(&text).unwrap();
        assert_eq!(draft.title.chars().count(), MAX_TITLE_CHARS);
    }

    #[test]
    fn blank_text_is_not_a_draft() {
        assert_eq!(draft_from_text("  \n\t\n"), None);
        let payload = DropPayload::new().with(Representation::text(MIME_PLAIN, "   "));
        assert_eq!(PlainTextInterpreter.try_parse(&payload), None);
    }
}
