// Module exports for models

pub mod color;
pub mod document;
pub mod settings;
pub mod timer;

pub use color::RgbaColor;
pub use document::ConfigDocument;
pub use settings::{GlobalSettings, WindowGeometry};
pub use timer::{CardId, TimerConfig, TimerStyle};
