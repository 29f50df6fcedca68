// Process-wide defaults and window-geometry memory

use serde::{Deserialize, Deserializer, Serialize};

use super::color::{lenient_color, RgbaColor};

pub const MIN_TIME_FONT_SIZE: u32 = 8;
pub const MAX_TIME_FONT_SIZE: u32 = 100;

pub const DEFAULT_TIME_FONT_SIZE: u32 = 32;
pub const DEFAULT_BG_COLOR_TITLE: RgbaColor = RgbaColor::rgb(10, 34, 145);
pub const DEFAULT_BG_COLOR_TIME: RgbaColor = RgbaColor::rgb(103, 176, 255);
pub const DEFAULT_TEXT_COLOR_TIME: RgbaColor = RgbaColor::rgb(15, 32, 70);

/// Smallest root window we are willing to restore.
const MIN_WINDOW_WIDTH: f32 = 200.0;
const MIN_WINDOW_HEIGHT: f32 = 150.0;

pub fn clamp_font_size(size: i64) -> u32 {
    size.clamp(MIN_TIME_FONT_SIZE as i64, MAX_TIME_FONT_SIZE as i64) as u32
}

/// Position and size of the main window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowGeometry {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl WindowGeometry {
    /// Check if this geometry is plausible (has reasonable size and position)
    pub fn is_plausible(&self) -> bool {
        self.x.is_finite()
            && self.y.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
            && self.width >= MIN_WINDOW_WIDTH
            && self.height >= MIN_WINDOW_HEIGHT
            // Allow positions within ±10000 pixels to support multi-monitor setups
            && self.x.abs() < 10000.0
            && self.y.abs() < 10000.0
    }

    pub fn differs_from(&self, other: &WindowGeometry) -> bool {
        (self.x - other.x).abs() > 2.0
            || (self.y - other.y).abs() > 2.0
            || (self.width - other.width).abs() > 1.0
            || (self.height - other.height).abs() > 1.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalSettings {
    #[serde(deserialize_with = "font_size_or_default")]
    pub default_time_font_size: u32,
    #[serde(deserialize_with = "title_bg_or_default")]
    pub default_bg_color_title: RgbaColor,
    #[serde(deserialize_with = "time_bg_or_default")]
    pub default_bg_color_time: RgbaColor,
    #[serde(deserialize_with = "text_color_or_default")]
    pub default_text_color_time: RgbaColor,
    #[serde(deserialize_with = "lenient_bool")]
    pub remember_window_position: bool,
    #[serde(deserialize_with = "lenient_coord")]
    pub window_x: Option<f32>,
    #[serde(deserialize_with = "lenient_coord")]
    pub window_y: Option<f32>,
    #[serde(deserialize_with = "lenient_coord")]
    pub window_width: Option<f32>,
    #[serde(deserialize_with = "lenient_coord")]
    pub window_height: Option<f32>,
}

impl Default for GlobalSettings {
    fn default() -> Self {
        Self {
            default_time_font_size: DEFAULT_TIME_FONT_SIZE,
            default_bg_color_title: DEFAULT_BG_COLOR_TITLE,
            default_bg_color_time: DEFAULT_BG_COLOR_TIME,
            default_text_color_time: DEFAULT_TEXT_COLOR_TIME,
            remember_window_position: false,
            window_x: None,
            window_y: None,
            window_width: None,
            window_height: None,
        }
    }
}

impl GlobalSettings {
    /// The remembered window geometry, if all four fields are present.
    pub fn window_geometry(&self) -> Option<WindowGeometry> {
        Some(WindowGeometry {
            x: self.window_x?,
            y: self.window_y?,
            width: self.window_width?,
            height: self.window_height?,
        })
    }

    pub fn set_window_geometry(&mut self, geometry: WindowGeometry) {
        self.window_x = Some(geometry.x);
        self.window_y = Some(geometry.y);
        self.window_width = Some(geometry.width);
        self.window_height = Some(geometry.height);
    }
}

fn font_size_or_default<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    Ok(lenient_font_size(deserializer)?.unwrap_or(DEFAULT_TIME_FONT_SIZE))
}

fn title_bg_or_default<'de, D: Deserializer<'de>>(deserializer: D) -> Result<RgbaColor, D::Error> {
    Ok(lenient_color(deserializer)?.unwrap_or(DEFAULT_BG_COLOR_TITLE))
}

fn time_bg_or_default<'de, D: Deserializer<'de>>(deserializer: D) -> Result<RgbaColor, D::Error> {
    Ok(lenient_color(deserializer)?.unwrap_or(DEFAULT_BG_COLOR_TIME))
}

fn text_color_or_default<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<RgbaColor, D::Error> {
    Ok(lenient_color(deserializer)?.unwrap_or(DEFAULT_TEXT_COLOR_TIME))
}

/// Accepts any JSON number and clamps it into the supported font range.
pub(crate) fn lenient_font_size<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw
        .as_ref()
        .and_then(serde_json::Value::as_f64)
        .filter(|size| size.is_finite())
        .map(|size| clamp_font_size(size.round() as i64)))
}

fn lenient_bool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match raw {
        Some(serde_json::Value::Bool(flag)) => flag,
        Some(serde_json::Value::Number(number)) => number.as_f64().is_some_and(|n| n != 0.0),
        Some(serde_json::Value::String(text)) => text.trim().eq_ignore_ascii_case("true"),
        _ => false,
    })
}

/// Window coordinates that are not finite numbers are dropped.
fn lenient_coord<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f32>, D::Error> {
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    let coord = match &raw {
        Some(serde_json::Value::Number(number)) => number.as_f64(),
        Some(serde_json::Value::String(text)) => text.trim().parse().ok(),
        _ => None,
    };
    Ok(coord.filter(|n| n.is_finite()).map(|n| n as f32))
}
