use std::time::Instant;

use chrono::Local;

use super::confirm::ConfirmDialogState;
use super::countdown::{render_card_list, CountdownUiState};
use super::toast::ToastQueue;
use super::CountdownApp;
use crate::services::countdown::{resolve_config_path, CountdownService, TICK_INTERVAL};
use crate::services::drop_import::InterpreterChain;

impl CountdownApp {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        let base = std::env::current_dir().unwrap_or_else(|err| {
            log::warn!("Unable to read the working directory ({}); using '.'", err);
            ".".into()
        });
        let service = CountdownService::load(resolve_config_path(&base));
        Self::with_service(service)
    }

    /// Build the window around an already loaded service.
    pub fn with_service(service: CountdownService) -> Self {
        log::debug!(
            "Opening window with {} timer(s) stored at {}",
            service.len(),
            service.path().display()
        );
        let pending_root_geometry = service.restorable_geometry();
        let countdown_ui =
            CountdownUiState::new(&service, Instant::now(), Local::now().date_naive());

        Self {
            service,
            countdown_ui,
            confirm_dialog: ConfirmDialogState::new(),
            toasts: ToastQueue::new(),
            drop_chain: InterpreterChain::default(),
            pending_root_geometry,
            last_root_geometry: None,
        }
    }

    pub(super) fn handle_update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.apply_pending_root_geometry(ctx);
        self.capture_root_geometry(ctx);

        self.handle_file_drops(ctx);
        self.handle_paste(ctx);

        let now = Instant::now();
        let today = Local::now().date_naive();
        let changed = self.countdown_ui.poll_tickers(now, today);
        if changed > 0 {
            log::debug!("{} card(s) changed display this tick", changed);
        }

        self.render_top_panel(ctx);
        let actions = self.render_central_panel(ctx);
        self.handle_container_actions(actions);

        self.render_settings_dialogs(ctx);
        self.handle_confirm_dialog(ctx);
        render_drop_overlay(ctx);

        if self.service.take_save_failure() {
            self.toasts
                .error("Could not save timers; changes are kept in memory");
        }
        self.toasts.render(ctx);

        let wait = self
            .countdown_ui
            .next_refresh_in(Instant::now())
            .map_or(TICK_INTERVAL, |next| next.min(TICK_INTERVAL));
        ctx.request_repaint_after(wait);
    }

    fn render_top_panel(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("countdown_top_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("Countdowns");
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("➕ Add Timer").clicked() {
                        let id = self.add_timer(None, None, None);
                        log::info!("Added timer {} from the toolbar", id);
                        self.toasts.success("Added timer");
                    }
                });
            });
        });
    }

    fn render_central_panel(&mut self, ctx: &egui::Context) -> Vec<super::countdown::ContainerAction> {
        let now = Local::now().naive_local();
        egui::CentralPanel::default()
            .show(ctx, |ui| {
                if self.countdown_ui.is_empty() {
                    ui.centered_and_justified(|ui| {
                        ui.label(
                            egui::RichText::new(
                                "No timers yet.\nClick \"Add Timer\" or drop an event here.",
                            )
                            .weak(),
                        );
                    });
                    return Vec::new();
                }

                egui::ScrollArea::vertical()
                    .auto_shrink([false, false])
                    .show(ui, |ui| {
                        render_card_list(ui, &self.service, &mut self.countdown_ui, now)
                    })
                    .inner
            })
            .inner
    }

    pub(super) fn handle_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        log::info!("Saving timers on exit");
        self.service.save_on_close(self.last_root_geometry);
    }
}

/// Highlight the window while something is being dragged over it.
fn render_drop_overlay(ctx: &egui::Context) {
    if ctx.input(|i| i.raw.hovered_files.is_empty()) {
        return;
    }

    let screen_rect = ctx.screen_rect();
    let painter = ctx.layer_painter(egui::LayerId::new(
        egui::Order::Foreground,
        egui::Id::new("drop_overlay"),
    ));
    painter.rect_filled(screen_rect, 0.0, egui::Color32::from_black_alpha(120));
    painter.text(
        screen_rect.center(),
        egui::Align2::CENTER_CENTER,
        "Drop to create a timer",
        egui::FontId::proportional(20.0),
        egui::Color32::WHITE,
    );
}
