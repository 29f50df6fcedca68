// Per-card persisted configuration

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::color::{lenient_color, RgbaColor};
use super::settings::{lenient_font_size, GlobalSettings};
use crate::utils::date::{format_end_date, parse_end_date, EndDateError};

pub const DEFAULT_TIMER_TITLE: &str = "New Timer";

/// Opaque key identifying one timer's configuration and card.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(pub String);

impl CardId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CardId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Persisted settings of a single timer card.
///
/// Style fields are optional so that hand-edited or older files missing them
/// still load; [`TimerConfig::style`] resolves them against the global
/// defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerConfig {
    #[serde(default = "default_title", deserialize_with = "title_or_default")]
    pub title: String,
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub end_date: Option<String>,
    #[serde(default, deserialize_with = "comment_or_empty")]
    pub comment: String,
    #[serde(
        default,
        deserialize_with = "lenient_color",
        skip_serializing_if = "Option::is_none"
    )]
    pub bg_color_title: Option<RgbaColor>,
    #[serde(
        default,
        deserialize_with = "lenient_color",
        skip_serializing_if = "Option::is_none"
    )]
    pub bg_color_time: Option<RgbaColor>,
    #[serde(
        default,
        deserialize_with = "lenient_color",
        skip_serializing_if = "Option::is_none"
    )]
    pub text_color_time: Option<RgbaColor>,
    #[serde(
        default,
        deserialize_with = "lenient_font_size",
        skip_serializing_if = "Option::is_none"
    )]
    pub font_size_time: Option<u32>,
    #[serde(default, deserialize_with = "lenient_sort_order")]
    pub sort_order: i64,
}

fn default_title() -> String {
    DEFAULT_TIMER_TITLE.to_string()
}

/// Text fields accept strings and plain scalars; null or structured values
/// count as absent.
fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::String(text)) => Some(text),
        Some(Value::Number(number)) => Some(number.to_string()),
        Some(Value::Bool(flag)) => Some(flag.to_string()),
        Some(other) => {
            log::warn!("Ignoring non-text value {}", other);
            None
        }
    })
}

fn title_or_default<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(lenient_text(deserializer)?.unwrap_or_else(default_title))
}

fn comment_or_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(lenient_text(deserializer)?.unwrap_or_default())
}

/// Numbers, numeric strings and floats are all taken; anything else is 0.
fn lenient_sort_order<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    let raw = Option::<Value>::deserialize(deserializer)?;
    let parsed = match &raw {
        Some(Value::Number(number)) => number
            .as_i64()
            .or_else(|| number.as_f64().filter(|n| n.is_finite()).map(|n| n.round() as i64)),
        Some(Value::String(text)) => text.trim().parse().ok(),
        _ => None,
    };
    if parsed.is_none() && !matches!(raw, None | Some(Value::Null)) {
        log::warn!("Ignoring unusable sort_order {:?}", raw);
    }
    Ok(parsed.unwrap_or_default())
}

/// Colors and font size a card renders with after applying defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerStyle {
    pub bg_color_title: RgbaColor,
    pub bg_color_time: RgbaColor,
    pub text_color_time: RgbaColor,
    pub font_size_time: u32,
}

impl TimerConfig {
    /// A config with every style field filled from the global defaults.
    pub fn with_defaults(
        title: impl Into<String>,
        end_date: NaiveDate,
        comment: impl Into<String>,
        defaults: &GlobalSettings,
    ) -> Self {
        Self {
            title: title.into(),
            end_date: Some(format_end_date(end_date)),
            comment: comment.into(),
            bg_color_title: Some(defaults.default_bg_color_title),
            bg_color_time: Some(defaults.default_bg_color_time),
            text_color_time: Some(defaults.default_text_color_time),
            font_size_time: Some(defaults.default_time_font_size),
            sort_order: 0,
        }
    }

    /// The parsed end date-time.
    pub fn end_date(&self) -> Result<NaiveDateTime, EndDateError> {
        match self.end_date.as_deref() {
            Some(raw) => parse_end_date(raw),
            None => Err(EndDateError::Missing),
        }
    }

    pub fn end_day(&self) -> Option<NaiveDate> {
        self.end_date().ok().map(|dt| dt.date())
    }

    pub fn set_end_day(&mut self, date: NaiveDate) {
        self.end_date = Some(format_end_date(date));
    }

    pub fn style(&self, defaults: &GlobalSettings) -> TimerStyle {
        TimerStyle {
            bg_color_title: self.bg_color_title.unwrap_or(defaults.default_bg_color_title),
            bg_color_time: self.bg_color_time.unwrap_or(defaults.default_bg_color_time),
            text_color_time: self
                .text_color_time
                .unwrap_or(defaults.default_text_color_time),
            font_size_time: self
                .font_size_time
                .unwrap_or(defaults.default_time_font_size),
        }
    }

    pub fn has_comment(&self) -> bool {
        !self.comment.trim().is_empty()
    }
}
