use chrono::NaiveDate;
use egui_extras::DatePickerButton;

use super::card_rendering::{color32_to_rgba, rgba_to_color32};
use crate::models::settings::{clamp_font_size, MAX_TIME_FONT_SIZE, MIN_TIME_FONT_SIZE};
use crate::models::timer::DEFAULT_TIMER_TITLE;
use crate::models::{CardId, GlobalSettings, RgbaColor, TimerConfig};
use crate::services::countdown::DefaultPromotions;
use crate::ui_egui::callbacks::AppCallbacks;
use crate::utils::date::{parse_end_date, tomorrow, EndDateError, DATE_ONLY_FORMAT};

/// Editable copy of one timer's settings.
#[derive(Debug, Clone, PartialEq)]
pub struct FormValues {
    pub title: String,
    pub end_date: String,
    pub font_size_time: u32,
    pub comment: String,
    pub bg_color_title: RgbaColor,
    pub bg_color_time: RgbaColor,
    pub text_color_time: RgbaColor,
    pub promote_font_size: bool,
    pub promote_bg_color_title: bool,
    pub promote_bg_color_time: bool,
    pub promote_text_color_time: bool,
    pub remember_window_position: bool,
}

impl FormValues {
    pub fn from_config(config: &TimerConfig, settings: &GlobalSettings) -> Self {
        let style = config.style(settings);
        let end_date = match config.end_day() {
            Some(day) => day.format(DATE_ONLY_FORMAT).to_string(),
            None => config.end_date.clone().unwrap_or_default(),
        };
        Self {
            title: config.title.clone(),
            end_date,
            font_size_time: style.font_size_time,
            comment: config.comment.clone(),
            bg_color_title: style.bg_color_title,
            bg_color_time: style.bg_color_time,
            text_color_time: style.text_color_time,
            promote_font_size: false,
            promote_bg_color_title: false,
            promote_bg_color_time: false,
            promote_text_color_time: false,
            remember_window_position: settings.remember_window_position,
        }
    }
}

/// What a confirmed dialog asks the main window to apply.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveRequest {
    pub config: TimerConfig,
    pub promotions: DefaultPromotions,
    pub remember_window_position: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogResult {
    Saved,
    Deleted,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DialogEvent {
    Save(SaveRequest),
    /// Needs a yes/no confirmation before anything is deleted
    DeleteRequested,
    Cancel,
}

pub struct SettingsDialogState {
    card_id: CardId,
    base: TimerConfig,
    snapshot: FormValues,
    pub values: FormValues,
    date_error: Option<EndDateError>,
}

impl SettingsDialogState {
    pub fn new(card_id: CardId, config: &TimerConfig, settings: &GlobalSettings) -> Self {
        let values = FormValues::from_config(config, settings);
        Self {
            card_id,
            base: config.clone(),
            snapshot: values.clone(),
            values,
            date_error: None,
        }
    }

    pub fn card_id(&self) -> &CardId {
        &self.card_id
    }

    /// Title the card had when the dialog opened.
    pub fn original_title(&self) -> &str {
        &self.base.title
    }

    /// Back to the values captured when the dialog opened.
    pub fn reset(&mut self) {
        self.values = self.snapshot.clone();
        self.date_error = None;
    }

    pub fn date_error(&self) -> Option<&EndDateError> {
        self.date_error.as_ref()
    }

    pub fn dismiss_date_error(&mut self) {
        self.date_error = None;
    }

    fn build_request(&self) -> Result<SaveRequest, EndDateError> {
        let end = parse_end_date(&self.values.end_date)?;
        let values = &self.values;

        let mut config = self.base.clone();
        let title = values.title.trim();
        config.title = if title.is_empty() {
            DEFAULT_TIMER_TITLE.to_string()
        } else {
            title.to_string()
        };
        config.set_end_day(end.date());
        config.comment = values.comment.trim_end().to_string();
        let font_size = clamp_font_size(values.font_size_time as i64);
        config.font_size_time = Some(font_size);
        config.bg_color_title = Some(values.bg_color_title);
        config.bg_color_time = Some(values.bg_color_time);
        config.text_color_time = Some(values.text_color_time);

        let promotions = DefaultPromotions {
            font_size_time: values.promote_font_size.then_some(font_size),
            bg_color_title: values.promote_bg_color_title.then_some(values.bg_color_title),
            bg_color_time: values.promote_bg_color_time.then_some(values.bg_color_time),
            text_color_time: values.promote_text_color_time.then_some(values.text_color_time),
        };

        Ok(SaveRequest {
            config,
            promotions,
            remember_window_position: values.remember_window_position,
        })
    }

    /// Validate the form. An unparseable end date raises the blocking
    /// warning and keeps the dialog open.
    pub fn submit(&mut self) -> Option<SaveRequest> {
        match self.build_request() {
            Ok(request) => {
                self.date_error = None;
                Some(request)
            }
            Err(err) => {
                log::warn!("Rejecting settings for {}: {}", self.card_id, err);
                self.date_error = Some(err);
                None
            }
        }
    }
}

/// Apply a dialog event through the main window. `None` means the dialog
/// stays open.
pub fn apply_dialog_event(
    event: DialogEvent,
    card_id: &CardId,
    callbacks: &mut dyn AppCallbacks,
) -> Option<DialogResult> {
    match event {
        DialogEvent::Save(request) => {
            if !callbacks.update_timer(card_id, request.config) {
                log::warn!("Timer {} vanished while its dialog was open", card_id);
            }
            if !request.promotions.is_empty() {
                callbacks.promote_defaults(request.promotions);
            }
            callbacks.set_remember_window_position(request.remember_window_position);
            Some(DialogResult::Saved)
        }
        DialogEvent::Cancel => Some(DialogResult::Cancelled),
        DialogEvent::DeleteRequested => None,
    }
}

/// The confirmed half of a delete.
pub fn confirm_delete(card_id: &CardId, callbacks: &mut dyn AppCallbacks) -> DialogResult {
    callbacks.delete_timer(card_id);
    DialogResult::Deleted
}

pub fn render_settings_dialog(
    ctx: &egui::Context,
    state: &mut SettingsDialogState,
    today: NaiveDate,
) -> Option<DialogEvent> {
    let mut event = None;
    let mut open = true;
    let blocked = state.date_error.is_some();
    let id_source = format!("timer_settings_{}", state.card_id);

    egui::Window::new(format!("Settings: {}", state.original_title()))
        .id(egui::Id::new(&id_source))
        .open(&mut open)
        .collapsible(false)
        .resizable(false)
        .default_width(340.0)
        .show(ctx, |ui| {
            ui.add_enabled_ui(!blocked, |ui| {
                event = render_form(ui, state, &id_source, today);
            });
        });

    if let Some(err) = state.date_error.clone() {
        render_date_warning(ctx, state, &err);
    }

    if !open {
        return Some(DialogEvent::Cancel);
    }
    event
}

fn render_form(
    ui: &mut egui::Ui,
    state: &mut SettingsDialogState,
    id_source: &str,
    today: NaiveDate,
) -> Option<DialogEvent> {
    let mut event = None;
    let values = &mut state.values;

    egui::Grid::new((id_source, "grid"))
        .num_columns(2)
        .spacing([12.0, 8.0])
        .show(ui, |ui| {
            ui.label("Title");
            ui.add(
                egui::TextEdit::singleline(&mut values.title)
                    .desired_width(200.0)
                    .hint_text(DEFAULT_TIMER_TITLE),
            );
            ui.end_row();

            ui.label("End date");
            ui.horizontal(|ui| {
                ui.add(
                    egui::TextEdit::singleline(&mut values.end_date)
                        .desired_width(100.0)
                        .hint_text("YYYY-MM-DD"),
                );
                let mut picked = parse_end_date(&values.end_date)
                    .map(|dt| dt.date())
                    .unwrap_or_else(|_| tomorrow(today));
                let picker_id = format!("{id_source}_date");
                if ui
                    .add(DatePickerButton::new(&mut picked).id_source(picker_id.as_str()))
                    .changed()
                {
                    values.end_date = picked.format(DATE_ONLY_FORMAT).to_string();
                }
            });
            ui.end_row();

            ui.label("Font size");
            ui.horizontal(|ui| {
                ui.add(egui::Slider::new(
                    &mut values.font_size_time,
                    MIN_TIME_FONT_SIZE..=MAX_TIME_FONT_SIZE,
                ));
                ui.checkbox(&mut values.promote_font_size, "Set as default");
            });
            ui.end_row();

            render_color_row(ui, "Title background", &mut values.bg_color_title, &mut values.promote_bg_color_title);
            render_color_row(ui, "Time background", &mut values.bg_color_time, &mut values.promote_bg_color_time);
            render_color_row(ui, "Time text", &mut values.text_color_time, &mut values.promote_text_color_time);
        });

    ui.add_space(6.0);
    ui.label("Comment");
    ui.add(
        egui::TextEdit::multiline(&mut values.comment)
            .desired_rows(4)
            .desired_width(f32::INFINITY)
            .hint_text("Shown when hovering the card"),
    );

    ui.add_space(6.0);
    ui.checkbox(
        &mut values.remember_window_position,
        "Remember window position on exit",
    );

    ui.separator();
    ui.horizontal(|ui| {
        if ui.button("Reset").clicked() {
            state.reset();
        }
        if ui.button("Save").clicked() {
            if let Some(request) = state.submit() {
                event = Some(DialogEvent::Save(request));
            }
        }
        let delete_clicked = ui
            .add(
                egui::Button::new(egui::RichText::new("Delete").color(egui::Color32::WHITE))
                    .fill(egui::Color32::from_rgb(185, 28, 28)),
            )
            .clicked();
        if delete_clicked {
            event = Some(DialogEvent::DeleteRequested);
        }
        if ui.button("Cancel").clicked() {
            event = Some(DialogEvent::Cancel);
        }
    });

    event
}

fn render_color_row(ui: &mut egui::Ui, label: &str, color: &mut RgbaColor, promote: &mut bool) {
    ui.label(label);
    ui.horizontal(|ui| {
        let mut edited = rgba_to_color32(*color);
        if egui::color_picker::color_edit_button_srgba(
            ui,
            &mut edited,
            egui::color_picker::Alpha::Opaque,
        )
        .changed()
        {
            *color = color32_to_rgba(edited);
        }
        ui.label(egui::RichText::new(color.to_hex_string()).monospace().weak());
        ui.checkbox(promote, "Set as default");
    });
    ui.end_row();
}

fn render_date_warning(ctx: &egui::Context, state: &mut SettingsDialogState, err: &EndDateError) {
    egui::Window::new("Invalid date")
        .id(egui::Id::new(("timer_settings_warning", state.card_id.as_str())))
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(
                    egui::RichText::new("⚠")
                        .size(24.0)
                        .color(egui::Color32::from_rgb(220, 150, 50)),
                );
                ui.label(format!("{err}.\n\nPlease enter the date as YYYY-MM-DD."));
            });
            ui.add_space(8.0);
            if ui.button("OK").clicked() || ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                state.dismiss_date_error();
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::settings::DEFAULT_TIME_FONT_SIZE;
    use crate::ui_egui::callbacks::MockAppCallbacks;
    use mockall::predicate::{always, eq};
    use pretty_assertions::assert_eq;

    fn config() -> TimerConfig {
        let mut config = TimerConfig::with_defaults(
            "Holiday",
            NaiveDate::from_ymd_opt(2026, 12, 24).unwrap(),
            "",
            &GlobalSettings::default(),
        );
        config.sort_order = 3;
        config
    }

    fn dialog() -> SettingsDialogState {
        SettingsDialogState::new(CardId::from("timer_1"), &config(), &GlobalSettings::default())
    }

    #[test]
    fn form_is_seeded_from_config() {
        let dialog = dialog();
        assert_eq!(dialog.values.title, "Holiday");
        assert_eq!(dialog.values.end_date, "2026-12-24");
        assert_eq!(dialog.values.font_size_time, DEFAULT_TIME_FONT_SIZE);
        assert!(!dialog.values.promote_font_size);
    }

    #[test]
    fn malformed_stored_date_is_shown_verbatim() {
        let mut broken = config();
        broken.end_date = Some("soon".into());
        let dialog = SettingsDialogState::new(CardId::from("x"), &broken, &GlobalSettings::default());
        assert_eq!(dialog.values.end_date, "soon");
    }

    #[test]
    fn reset_restores_opening_values() {
        let mut dialog = dialog();
        dialog.values.title = "Changed".into();
        dialog.values.bg_color_time = RgbaColor::rgb(1, 1, 1);
        dialog.values.end_date = "bad".into();
        assert!(dialog.submit().is_none());

        dialog.reset();
        assert_eq!(dialog.values, FormValues::from_config(&config(), &GlobalSettings::default()));
        assert!(dialog.date_error().is_none());
    }

    #[test]
    fn invalid_date_blocks_submit() {
        let mut dialog = dialog();
        dialog.values.end_date = "24/12/2026".into();

        assert_eq!(dialog.submit(), None);
        assert!(matches!(dialog.date_error(), Some(EndDateError::Malformed(_))));

        dialog.dismiss_date_error();
        dialog.values.end_date = String::new();
        assert_eq!(dialog.submit(), None);
        assert_eq!(dialog.date_error(), Some(&EndDateError::Missing));
    }

    #[test]
    fn submit_builds_full_replacement() {
        let mut dialog = dialog();
        dialog.values.title = "  Christmas Eve ".into();
        dialog.values.end_date = "2026-12-24".into();
        dialog.values.comment = "Presents\n".into();
        dialog.values.font_size_time = 48;
        dialog.values.promote_font_size = true;
        dialog.values.promote_text_color_time = true;

        let request = dialog.submit().unwrap();
        assert_eq!(request.config.title, "Christmas Eve");
        assert_eq!(request.config.end_date.as_deref(), Some("2026-12-24 00:00:00"));
        assert_eq!(request.config.comment, "Presents");
        assert_eq!(request.config.font_size_time, Some(48));
        assert_eq!(request.config.sort_order, 3);
        assert_eq!(
            request.promotions,
            DefaultPromotions {
                font_size_time: Some(48),
                text_color_time: Some(dialog.values.text_color_time),
                ..Default::default()
            }
        );
    }

    #[test]
    fn blank_title_falls_back_to_default() {
        let mut dialog = dialog();
        dialog.values.title = "   ".into();
        assert_eq!(dialog.submit().unwrap().config.title, DEFAULT_TIMER_TITLE);
    }

    #[test]
    fn save_goes_through_callbacks() {
        let mut dialog = dialog();
        dialog.values.promote_bg_color_title = true;
        dialog.values.remember_window_position = true;
        let request = dialog.submit().unwrap();
        let expected_config = request.config.clone();
        let id = CardId::from("timer_1");

        let mut callbacks = MockAppCallbacks::new();
        callbacks
            .expect_update_timer()
            .withf(move |card, config| card.as_str() == "timer_1" && *config == expected_config)
            .times(1)
            .return_const(true);
        callbacks
            .expect_promote_defaults()
            .withf(|p| p.bg_color_title.is_some() && p.font_size_time.is_none())
            .times(1)
            .return_const(());
        callbacks
            .expect_set_remember_window_position()
            .with(eq(true))
            .times(1)
            .return_const(());

        let result = apply_dialog_event(DialogEvent::Save(request), &id, &mut callbacks);
        assert_eq!(result, Some(DialogResult::Saved));
    }

    #[test]
    fn save_without_promotions_skips_defaults() {
        let request = dialog().submit().unwrap();
        let mut callbacks = MockAppCallbacks::new();
        callbacks.expect_update_timer().times(1).return_const(true);
        callbacks.expect_promote_defaults().never();
        callbacks
            .expect_set_remember_window_position()
            .with(always())
            .return_const(());

        apply_dialog_event(DialogEvent::Save(request), &CardId::from("timer_1"), &mut callbacks);
    }

    #[test]
    fn cancel_and_delete_request_touch_nothing() {
        let mut callbacks = MockAppCallbacks::new();
        let id = CardId::from("timer_1");
        assert_eq!(
            apply_dialog_event(DialogEvent::Cancel, &id, &mut callbacks),
            Some(DialogResult::Cancelled)
        );
        assert_eq!(apply_dialog_event(DialogEvent::DeleteRequested, &id, &mut callbacks), None);
    }

    #[test]
    fn confirmed_delete_reports_deleted() {
        let mut callbacks = MockAppCallbacks::new();
        callbacks
            .expect_delete_timer()
            .withf(|id| id.as_str() == "timer_1")
            .times(1)
            .return_const(true);
        assert_eq!(
            confirm_delete(&CardId::from("timer_1"), &mut callbacks),
            DialogResult::Deleted
        );
    }
}
