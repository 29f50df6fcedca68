use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use super::ordering::{display_order, move_card};
use super::persistence::{load_document, save_document};
use crate::models::settings::clamp_font_size;
use crate::models::timer::DEFAULT_TIMER_TITLE;
use crate::models::{
    CardId, ConfigDocument, GlobalSettings, RgbaColor, TimerConfig, WindowGeometry,
};
use crate::utils::date::tomorrow;

/// Values the settings dialog asked to make the process-wide default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DefaultPromotions {
    pub font_size_time: Option<u32>,
    pub bg_color_title: Option<RgbaColor>,
    pub bg_color_time: Option<RgbaColor>,
    pub text_color_time: Option<RgbaColor>,
}

impl DefaultPromotions {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Owns the configuration document for the lifetime of the window.
///
/// Every mutating call rewrites the whole file before returning. Write
/// failures are logged and swallowed; the in-memory document stays
/// authoritative for the rest of the session.
pub struct CountdownService {
    document: ConfigDocument,
    path: PathBuf,
    save_failed: bool,
    /// Set while memory holds changes the file does not.
    unsaved: bool,
}

impl CountdownService {
    /// Load the document at `path` (missing or malformed files yield an
    /// empty document).
    pub fn load(path: PathBuf) -> Self {
        let document = load_document(&path);
        Self::from_document(document, path)
    }

    pub fn from_document(document: ConfigDocument, path: PathBuf) -> Self {
        Self {
            document,
            path,
            save_failed: false,
            unsaved: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn document(&self) -> &ConfigDocument {
        &self.document
    }

    pub fn settings(&self) -> &GlobalSettings {
        &self.document.global_settings
    }

    pub fn timer(&self, id: &CardId) -> Option<&TimerConfig> {
        self.document.timers.get(id)
    }

    pub fn len(&self) -> usize {
        self.document.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.document.timers.is_empty()
    }

    /// Card ids in display order.
    pub fn ordered_cards(&self) -> Vec<CardId> {
        display_order(&self.document.timers)
    }

    /// Create a timer, filling unset fields from the global defaults and a
    /// default end date of tomorrow.
    pub fn add_timer(
        &mut self,
        title: Option<String>,
        end_date: Option<NaiveDate>,
        comment: Option<String>,
        today: NaiveDate,
    ) -> CardId {
        let title = title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| DEFAULT_TIMER_TITLE.to_string());
        let end_date = end_date.unwrap_or_else(|| tomorrow(today));
        let comment = comment.unwrap_or_default();

        let id = self.document.next_card_id();
        let mut config =
            TimerConfig::with_defaults(title, end_date, comment, &self.document.global_settings);
        config.sort_order = self.document.next_sort_order();

        log::info!(
            "Adding timer {} '{}' ending {}",
            id,
            config.title,
            config.end_date.as_deref().unwrap_or_default()
        );
        self.document.timers.insert(id.clone(), config);
        self.persist();
        id
    }

    /// Replace a timer's configuration. Returns false for unknown ids.
    pub fn update_timer(&mut self, id: &CardId, mut config: TimerConfig) -> bool {
        let Some(slot) = self.document.timers.get_mut(id) else {
            log::warn!("Ignoring update for unknown timer {}", id);
            return false;
        };
        config.font_size_time = config.font_size_time.map(|s| clamp_font_size(s as i64));
        *slot = config;
        log::info!("Updated timer {}", id);
        self.persist();
        true
    }

    pub fn delete_timer(&mut self, id: &CardId) -> bool {
        if self.document.timers.remove(id).is_none() {
            log::warn!("Ignoring delete for unknown timer {}", id);
            return false;
        }
        log::info!("Deleted timer {}", id);
        self.persist();
        true
    }

    /// Assign `sort_order` from the given visual order and persist. Cards not
    /// mentioned keep their relative order after the listed ones.
    pub fn apply_order(&mut self, order: &[CardId]) {
        let mut position = 0i64;
        for id in order {
            if let Some(timer) = self.document.timers.get_mut(id) {
                timer.sort_order = position;
                position += 1;
            }
        }
        for id in self.ordered_cards() {
            if !order.contains(&id) {
                if let Some(timer) = self.document.timers.get_mut(&id) {
                    timer.sort_order = position;
                    position += 1;
                }
            }
        }
        log::info!("Reordered {} timer(s)", position);
        self.persist();
    }

    /// Move `dragged` to `insert_index` within the current display order.
    pub fn reorder(&mut self, dragged: &CardId, insert_index: usize) -> bool {
        let current = self.ordered_cards();
        match move_card(&current, dragged, insert_index) {
            Some(new_order) => {
                self.apply_order(&new_order);
                true
            }
            None => {
                log::warn!("Ignoring reorder of unknown timer {}", dragged);
                false
            }
        }
    }

    pub fn promote_defaults(&mut self, promotions: DefaultPromotions) {
        if promotions.is_empty() {
            return;
        }
        let settings = &mut self.document.global_settings;
        if let Some(size) = promotions.font_size_time {
            settings.default_time_font_size = clamp_font_size(size as i64);
        }
        if let Some(color) = promotions.bg_color_title {
            settings.default_bg_color_title = color;
        }
        if let Some(color) = promotions.bg_color_time {
            settings.default_bg_color_time = color;
        }
        if let Some(color) = promotions.text_color_time {
            settings.default_text_color_time = color;
        }
        log::info!("Updated global defaults: {:?}", promotions);
        self.persist();
    }

    pub fn set_remember_window_position(&mut self, remember: bool) {
        if self.document.global_settings.remember_window_position == remember {
            return;
        }
        self.document.global_settings.remember_window_position = remember;
        self.persist();
    }

    /// Window-close hook: store the geometry when remembering is enabled,
    /// then write the document if anything differs from the file.
    pub fn save_on_close(&mut self, geometry: Option<WindowGeometry>) {
        let settings = &mut self.document.global_settings;
        if settings.remember_window_position {
            match geometry {
                Some(geometry) if geometry.is_plausible() => {
                    let moved = settings
                        .window_geometry()
                        .map_or(true, |stored| stored.differs_from(&geometry));
                    if moved {
                        log::debug!("Remembering window geometry {:?}", geometry);
                        settings.set_window_geometry(geometry);
                        self.unsaved = true;
                    }
                }
                Some(geometry) => {
                    log::debug!("Skipping implausible window geometry {:?}", geometry);
                }
                None => {}
            }
        }
        if self.unsaved {
            self.persist();
        } else {
            log::debug!("Nothing changed, leaving {} untouched", self.path.display());
        }
    }

    /// Remembered geometry worth restoring at startup.
    pub fn restorable_geometry(&self) -> Option<WindowGeometry> {
        let settings = &self.document.global_settings;
        if !settings.remember_window_position {
            return None;
        }
        settings.window_geometry().filter(WindowGeometry::is_plausible)
    }

    /// Write the whole document. Returns false (after logging) on failure.
    pub fn persist(&mut self) -> bool {
        match save_document(&self.path, &self.document) {
            Ok(()) => {
                self.unsaved = false;
                true
            }
            Err(err) => {
                log::error!("Failed to persist timers: {err:?}");
                self.save_failed = true;
                self.unsaved = true;
                false
            }
        }
    }

    /// Whether a write failed since the last call.
    pub fn take_save_failure(&mut self) -> bool {
        std::mem::take(&mut self.save_failed)
    }
}
