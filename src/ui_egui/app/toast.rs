//! Short-lived status lines ("Added timer", "Could not save") stacked in the
//! bottom-right corner of the window.

use std::time::{Duration, Instant};

use egui::{Align2, Color32, Context, Frame, RichText, Stroke};

const LIFETIME: Duration = Duration::from_secs(3);
const FADE: Duration = Duration::from_millis(400);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Warning,
    Error,
}

impl ToastKind {
    fn accent(self) -> Color32 {
        match self {
            ToastKind::Success => Color32::from_rgb(60, 170, 90),
            ToastKind::Warning => Color32::from_rgb(225, 160, 40),
            ToastKind::Error => Color32::from_rgb(215, 70, 70),
        }
    }

    fn glyph(self) -> &'static str {
        match self {
            ToastKind::Success => "✓",
            ToastKind::Warning => "⚠",
            ToastKind::Error => "✗",
        }
    }
}

#[derive(Debug, Clone)]
struct Toast {
    text: String,
    kind: ToastKind,
    shown_at: Instant,
    lifetime: Duration,
}

/// Opacity of a toast `age` into its `lifetime`: solid, then a linear fade
/// over the final [`FADE`].
fn fade_alpha(age: Duration, lifetime: Duration) -> f32 {
    let left = lifetime.saturating_sub(age);
    if left.is_zero() {
        0.0
    } else if left >= FADE {
        1.0
    } else {
        left.as_secs_f32() / FADE.as_secs_f32()
    }
}

#[derive(Debug, Default)]
pub struct ToastQueue {
    items: Vec<Toast>,
}

impl ToastQueue {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, kind: ToastKind, text: impl Into<String>) {
        self.items.push(Toast {
            text: text.into(),
            kind,
            shown_at: Instant::now(),
            lifetime: LIFETIME,
        });
    }

    pub fn success(&mut self, text: impl Into<String>) {
        self.push(ToastKind::Success, text);
    }

    pub fn warning(&mut self, text: impl Into<String>) {
        self.push(ToastKind::Warning, text);
    }

    pub fn error(&mut self, text: impl Into<String>) {
        self.push(ToastKind::Error, text);
    }

    fn prune(&mut self, now: Instant) {
        self.items
            .retain(|toast| now.duration_since(toast.shown_at) < toast.lifetime);
    }

    pub fn render(&mut self, ctx: &Context) {
        let now = Instant::now();
        self.prune(now);
        if self.items.is_empty() {
            return;
        }
        // Keep frames coming while something is fading
        ctx.request_repaint();

        let fill = ctx.style().visuals.extreme_bg_color;
        egui::Area::new(egui::Id::new("toast_stack"))
            .anchor(Align2::RIGHT_BOTTOM, [-10.0, -10.0])
            .order(egui::Order::Foreground)
            .interactable(false)
            .show(ctx, |ui| {
                ui.set_max_width(260.0);
                // Newest at the bottom, next to the anchor
                for toast in &self.items {
                    let alpha = fade_alpha(now.duration_since(toast.shown_at), toast.lifetime);
                    let accent = toast.kind.accent().gamma_multiply(alpha);
                    Frame::popup(ui.style())
                        .fill(fill.gamma_multiply(0.95 * alpha))
                        .stroke(Stroke::new(1.5, accent))
                        .show(ui, |ui| {
                            ui.horizontal_wrapped(|ui| {
                                ui.colored_label(accent, RichText::new(toast.kind.glyph()).strong());
                                ui.label(RichText::new(&toast.text).color(
                                    ui.visuals().text_color().gamma_multiply(alpha),
                                ));
                            });
                        });
                    ui.add_space(4.0);
                }
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alpha_holds_then_fades_to_zero() {
        assert_eq!(fade_alpha(Duration::ZERO, LIFETIME), 1.0);
        assert_eq!(fade_alpha(LIFETIME - FADE, LIFETIME), 1.0);
        let halfway = fade_alpha(LIFETIME - FADE / 2, LIFETIME);
        assert!((halfway - 0.5).abs() < 0.01);
        assert_eq!(fade_alpha(LIFETIME, LIFETIME), 0.0);
        assert_eq!(fade_alpha(LIFETIME * 2, LIFETIME), 0.0);
    }

    #[test]
    fn prune_drops_only_finished_toasts() {
        let mut queue = ToastQueue::new();
        queue.error("Could not save");
        queue.warning("Nothing to import");
        queue.items[0].lifetime = Duration::ZERO;

        queue.prune(Instant::now());
        assert_eq!(queue.items.len(), 1);
        assert_eq!(queue.items[0].kind, ToastKind::Warning);
    }
}
