//! Confirmation dialog for destructive actions.

use egui::{Context, RichText};

use super::CountdownApp;
use crate::models::CardId;

/// Destructive operations that ask first.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfirmAction {
    /// Delete a timer by id
    DeleteTimer { card_id: CardId, title: String },
}

impl ConfirmAction {
    pub fn title(&self) -> &'static str {
        match self {
            ConfirmAction::DeleteTimer { .. } => "Delete Timer",
        }
    }

    pub fn message(&self) -> String {
        match self {
            ConfirmAction::DeleteTimer { title, .. } => {
                format!("Are you sure you want to delete the timer \"{}\"?\n\nThis action cannot be undone.", title)
            }
        }
    }

    pub fn confirm_text(&self) -> &'static str {
        match self {
            ConfirmAction::DeleteTimer { .. } => "Yes, delete",
        }
    }
}

/// What the user did with the dialog this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmResult {
    Confirmed,
    Cancelled,
    /// Dialog is still open
    Pending,
}

/// At most one unanswered confirmation.
#[derive(Debug, Default)]
pub struct ConfirmDialogState {
    pending_action: Option<ConfirmAction>,
}

impl ConfirmDialogState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request confirmation for an action, replacing any unanswered one.
    pub fn request(&mut self, action: ConfirmAction) {
        self.pending_action = Some(action);
    }

    /// Render the dialog. The action stays pending until the caller takes
    /// it with [`Self::take_action`] or the user cancels.
    pub fn render(&mut self, ctx: &Context) -> ConfirmResult {
        let Some(action) = &self.pending_action else {
            return ConfirmResult::Pending;
        };

        let mut result = ConfirmResult::Pending;
        let danger = ctx.style().visuals.error_fg_color;

        egui::Window::new(action.title())
            .id(egui::Id::new("confirm_dialog"))
            .collapsible(false)
            .resizable(false)
            .default_width(320.0)
            .pivot(egui::Align2::CENTER_CENTER)
            .default_pos(ctx.screen_rect().center())
            .show(ctx, |ui| {
                ui.vertical_centered(|ui| {
                    ui.label(action.message());
                    ui.add_space(12.0);
                    ui.horizontal(|ui| {
                        if ui.button("No").clicked() {
                            result = ConfirmResult::Cancelled;
                        }
                        let delete = ui.button(RichText::new(action.confirm_text()).color(danger));
                        if delete.clicked() {
                            result = ConfirmResult::Confirmed;
                        }
                    });
                });
            });

        if result == ConfirmResult::Pending && ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            result = ConfirmResult::Cancelled;
        }

        if result == ConfirmResult::Cancelled {
            self.pending_action = None;
        }

        result
    }

    /// Hand the confirmed action to the caller.
    pub fn take_action(&mut self) -> Option<ConfirmAction> {
        self.pending_action.take()
    }
}

impl CountdownApp {
    /// Render the confirmation dialog and run whatever the user confirmed.
    pub(super) fn handle_confirm_dialog(&mut self, ctx: &Context) {
        if self.confirm_dialog.render(ctx) != ConfirmResult::Confirmed {
            return;
        }
        if let Some(action) = self.confirm_dialog.take_action() {
            self.execute_confirmed_action(action);
        }
    }

    fn execute_confirmed_action(&mut self, action: ConfirmAction) {
        match action {
            ConfirmAction::DeleteTimer { card_id, title } => self.finish_delete(&card_id, &title),
        }
    }
}
