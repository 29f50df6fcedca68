use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

use super::ImportError;

pub(super) fn unescape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n' | 'N') => out.push('\n'),
            Some(escaped @ (',' | ';' | '\\')) => out.push(escaped),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// Local calendar date of an iCalendar `DTSTART`/`DTEND` value.
///
/// `VALUE=DATE` values are taken as-is. Date-times ending in `Z` are UTC, a
/// `TZID` names the source zone; both are converted to the local date. Plain
/// date-times are floating and keep their date.
pub(super) fn parse_ical_date(value: &str, is_date: bool, tzid: Option<&str>) -> Option<NaiveDate> {
    let value = value.trim();
    if is_date || value.len() == 8 {
        return NaiveDate::parse_from_str(value.get(..8)?, "%Y%m%d").ok();
    }

    let has_utc_suffix = value.ends_with('Z');
    let normalized = value.trim_end_matches('Z');
    let naive = NaiveDateTime::parse_from_str(normalized.get(..15)?, "%Y%m%dT%H%M%S").ok()?;

    if has_utc_suffix {
        let utc = Utc.from_utc_datetime(&naive);
        return Some(utc.with_timezone(&Local).date_naive());
    }

    if let Some(tz_name) = tzid {
        match Tz::from_str(tz_name) {
            Ok(timezone) => {
                if let Some(dt) = timezone.from_local_datetime(&naive).earliest() {
                    return Some(dt.with_timezone(&Local).date_naive());
                }
            }
            Err(_) => log::debug!("Unknown TZID '{}', treating time as floating", tz_name),
        }
    }

    Some(naive.date())
}

/// Decode clipboard/drop bytes that may be UTF-8 or UTF-16LE.
pub(super) fn decode_text(bytes: &[u8]) -> String {
    if let Some(rest) = bytes.strip_prefix(&[0xFF, 0xFE]) {
        return decode_utf16le(rest);
    }
    if let Some(rest) = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]) {
        return trim_nuls(String::from_utf8_lossy(rest).into_owned());
    }
    if looks_like_utf16le(bytes) {
        return decode_utf16le(bytes);
    }
    trim_nuls(String::from_utf8_lossy(bytes).into_owned())
}

fn looks_like_utf16le(bytes: &[u8]) -> bool {
    if bytes.len() < 4 {
        return false;
    }
    let odd_zeros = bytes.iter().skip(1).step_by(2).filter(|b| **b == 0).count();
    odd_zeros * 2 >= bytes.len() / 2
}

fn decode_utf16le(bytes: &[u8]) -> String {
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();
    trim_nuls(String::from_utf16_lossy(&units))
}

fn trim_nuls(text: String) -> String {
    if text.contains('\0') {
        text.replace('\0', "")
    } else {
        text
    }
}

pub(super) fn read_text_file(path: &Path) -> Result<String, ImportError> {
    std::fs::read(path)
        .map(|bytes| decode_text(&bytes))
        .map_err(|source| ImportError::Unreadable { path: path.to_path_buf(), source })
}

/// Path named by the first `file://` URL in `text` (uri-list comments skipped).
pub(super) fn file_url_to_path(text: &str) -> Option<PathBuf> {
    let url = text
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && !line.starts_with('#'))?;
    let rest = url.strip_prefix("file://")?;
    let rest = rest.strip_prefix("localhost").unwrap_or(rest);
    let decoded = urlencoding::decode(rest).ok()?;

    // file:///C:/dir/file.ics
    let bytes = decoded.as_bytes();
    if bytes.len() > 3 && bytes[0] == b'/' && bytes[2] == b':' && bytes[1].is_ascii_alphabetic() {
        return Some(PathBuf::from(&decoded[1..]));
    }
    Some(PathBuf::from(decoded.into_owned()))
}

pub(super) fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case(ext))
        .unwrap_or(false)
}
