mod card_rendering;
mod container;
mod settings;
mod state;

pub(super) use container::{render_card_list, ContainerAction};
pub(super) use state::CountdownUiState;

use std::time::Instant;

use chrono::{Local, NaiveDate};

use self::settings::{apply_dialog_event, render_settings_dialog, DialogEvent, DialogResult, SettingsDialogState};
use super::confirm::ConfirmAction;
use super::CountdownApp;
use crate::models::CardId;

impl CountdownApp {
    /// Create a timer and rebuild the card list around it.
    pub(super) fn add_timer(
        &mut self,
        title: Option<String>,
        end_date: Option<NaiveDate>,
        comment: Option<String>,
    ) -> CardId {
        let today = Local::now().date_naive();
        let id = self.service.add_timer(title, end_date, comment, today);
        self.create_timer_cards();
        id
    }

    /// Throw away all per-card UI state and rebuild it from the document.
    pub(super) fn create_timer_cards(&mut self) {
        let today = Local::now().date_naive();
        self.countdown_ui.rebuild(&self.service, Instant::now(), today);
    }

    pub(super) fn handle_container_actions(&mut self, actions: Vec<ContainerAction>) {
        for action in actions {
            match action {
                ContainerAction::OpenSettings(card_id) => self.open_settings(&card_id),
                ContainerAction::DeleteCard(card_id) => self.request_delete(&card_id),
                ContainerAction::Reorder {
                    dragged,
                    insert_index,
                } => {
                    if self.service.reorder(&dragged, insert_index) {
                        self.create_timer_cards();
                    }
                }
            }
        }
    }

    /// Open the settings dialog for a card; a card has at most one.
    pub(super) fn open_settings(&mut self, card_id: &CardId) {
        if self.countdown_ui.has_dialog(card_id) {
            return;
        }
        let Some(config) = self.service.timer(card_id) else {
            log::warn!("Cannot open settings for unknown timer {}", card_id);
            return;
        };
        let dialog = SettingsDialogState::new(card_id.clone(), config, self.service.settings());
        self.countdown_ui.open_dialog(dialog);
    }

    pub(super) fn request_delete(&mut self, card_id: &CardId) {
        let Some(config) = self.service.timer(card_id) else {
            return;
        };
        self.confirm_dialog.request(ConfirmAction::DeleteTimer {
            card_id: card_id.clone(),
            title: config.title.clone(),
        });
    }

    pub(super) fn render_settings_dialogs(&mut self, ctx: &egui::Context) {
        let today = Local::now().date_naive();

        for card_id in self.countdown_ui.dialog_ids() {
            let Some(mut dialog) = self.countdown_ui.take_dialog(&card_id) else {
                continue;
            };
            let Some(event) = render_settings_dialog(ctx, &mut dialog, today) else {
                self.countdown_ui.return_dialog(dialog);
                continue;
            };

            if matches!(event, DialogEvent::DeleteRequested) {
                self.countdown_ui.return_dialog(dialog);
                self.request_delete(&card_id);
                continue;
            }

            match apply_dialog_event(event, &card_id, self) {
                Some(result) => {
                    self.countdown_ui
                        .dialog_closed(&card_id, Instant::now(), Local::now().date_naive());
                    if result == DialogResult::Saved {
                        self.toasts
                            .success(format!("Saved \"{}\"", dialog_title(&self.service, &card_id)));
                    }
                }
                None => self.countdown_ui.return_dialog(dialog),
            }
        }
    }

    /// Delete a timer the user has confirmed, closing any dialog it had.
    pub(super) fn finish_delete(&mut self, card_id: &CardId, title: &str) {
        let result = settings::confirm_delete(card_id, self);
        self.countdown_ui
            .dialog_closed(card_id, Instant::now(), Local::now().date_naive());
        if result == DialogResult::Deleted {
            log::info!("Deleted timer {} ('{}')", card_id, title);
            self.toasts.success(format!("Deleted \"{}\"", title));
        }
    }
}

fn dialog_title(service: &crate::services::countdown::CountdownService, card_id: &CardId) -> String {
    service
        .timer(card_id)
        .map(|config| config.title.clone())
        .unwrap_or_default()
}
