mod confirm;
mod countdown;
mod geometry;
mod imports;
mod lifecycle;
mod toast;

use self::confirm::ConfirmDialogState;
use self::countdown::CountdownUiState;
use self::toast::ToastQueue;
use crate::models::{CardId, TimerConfig, WindowGeometry};
use crate::services::countdown::{CountdownService, DefaultPromotions};
use crate::services::drop_import::InterpreterChain;
use crate::ui_egui::callbacks::AppCallbacks;

/// The main window: owns the timers, their cards and the window chrome.
pub struct CountdownApp {
    /// Configuration document and its persistence
    service: CountdownService,
    /// Per-card tickers, dialogs and drag state
    countdown_ui: CountdownUiState,
    confirm_dialog: ConfirmDialogState,
    toasts: ToastQueue,
    drop_chain: InterpreterChain,
    /// Remembered geometry still to be applied to the window
    pending_root_geometry: Option<WindowGeometry>,
    /// Most recent plausible geometry reported by the window
    last_root_geometry: Option<WindowGeometry>,
}

impl eframe::App for CountdownApp {
    fn update(&mut self, ctx: &egui::Context, frame: &mut eframe::Frame) {
        self.handle_update(ctx, frame);
    }

    fn on_exit(&mut self, gl: Option<&eframe::glow::Context>) {
        self.handle_exit(gl);
    }
}

impl AppCallbacks for CountdownApp {
    fn update_timer(&mut self, id: &CardId, config: TimerConfig) -> bool {
        let updated = self.service.update_timer(id, config);
        if updated {
            self.create_timer_cards();
        }
        updated
    }

    fn delete_timer(&mut self, id: &CardId) -> bool {
        let deleted = self.service.delete_timer(id);
        if deleted {
            self.create_timer_cards();
        }
        deleted
    }

    fn promote_defaults(&mut self, promotions: DefaultPromotions) {
        self.service.promote_defaults(promotions);
        self.create_timer_cards();
    }

    fn set_remember_window_position(&mut self, remember: bool) {
        self.service.set_remember_window_position(remember);
    }
}
