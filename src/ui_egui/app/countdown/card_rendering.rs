use std::time::Instant;

use chrono::NaiveDateTime;

use super::state::{CardUiState, TooltipState};
use crate::models::{RgbaColor, TimerConfig, TimerStyle};
use crate::services::countdown::format_detailed_remaining;

const CARD_ROUNDING: f32 = 8.0;
const TITLE_BAR_HEIGHT: f32 = 30.0;
const TITLE_FONT_SIZE: f32 = 16.0;
const CAPTION_FONT_SIZE: f32 = 12.0;
const BODY_PADDING: f32 = 8.0;
const DRAG_STROKE_COLOR: egui::Color32 = egui::Color32::from_rgb(100, 149, 237);

/// Action from rendering a single card
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardUiAction {
    None,
    OpenSettings,
    Delete,
}

pub(super) fn rgba_to_color32(color: RgbaColor) -> egui::Color32 {
    egui::Color32::from_rgba_unmultiplied(color.r, color.g, color.b, color.a)
}

pub(super) fn color32_to_rgba(color: egui::Color32) -> RgbaColor {
    let [r, g, b, a] = color.to_srgba_unmultiplied();
    RgbaColor::new(r, g, b, a)
}

/// Tooltip text for cards that carry a comment: the comment under the
/// detailed remaining time and target date. Cards without one get none.
pub fn format_card_tooltip(config: &TimerConfig, now: NaiveDateTime) -> Option<String> {
    if !config.has_comment() {
        return None;
    }
    let mut lines = Vec::new();

    match config.end_date() {
        Ok(end) => {
            lines.push(format!("⏱ {}", format_detailed_remaining(end, now)));
            lines.push(format!("Target: {}", end.format("%a %d %b %Y")));
        }
        Err(err) => lines.push(format!("⚠ {err}")),
    }

    lines.push(String::new());
    lines.push(config.comment.trim().to_string());
    Some(lines.join("\n"))
}

/// Height a card needs for its countdown font size.
pub fn card_height(style: &TimerStyle) -> f32 {
    let number = style.font_size_time as f32 * 1.25;
    TITLE_BAR_HEIGHT + BODY_PADDING * 2.0 + number + CAPTION_FONT_SIZE + 4.0
}

/// Draw one card and report the user's interaction with it. The returned
/// response senses clicks and drags over the whole card.
pub fn render_card(
    ui: &mut egui::Ui,
    config: &TimerConfig,
    style: TimerStyle,
    card: &mut CardUiState,
    now: NaiveDateTime,
    is_being_dragged: bool,
    any_drag_active: bool,
) -> (CardUiAction, egui::Response) {
    let mut action = CardUiAction::None;
    let size = egui::vec2(ui.available_width(), card_height(&style));
    let (rect, response) = ui.allocate_exact_size(size, egui::Sense::click_and_drag());

    if ui.is_rect_visible(rect) {
        paint_card(ui, rect, config, &style, card, is_being_dragged);
    }

    if response.double_clicked() {
        action = CardUiAction::OpenSettings;
    }

    response.context_menu(|ui| {
        if ui.button("✏ Edit…").clicked() {
            action = CardUiAction::OpenSettings;
            ui.close_menu();
        }
        ui.separator();
        if ui.button("🗑 Delete…").clicked() {
            action = CardUiAction::Delete;
            ui.close_menu();
        }
    });

    let dragging = any_drag_active || response.drag_started() || response.dragged();
    let tooltip = format_card_tooltip(config, now);
    let hovered = response.hovered() && tooltip.is_some();
    let response = match (card.update_hover(hovered, dragging, Instant::now()), tooltip) {
        (TooltipState::Visible, Some(text)) => response.on_hover_ui_at_pointer(|ui| {
            ui.label(text);
        }),
        (TooltipState::Pending(remaining), _) => {
            ui.ctx().request_repaint_after(remaining);
            response
        }
        _ => response,
    };

    if response.hovered() && !any_drag_active {
        ui.ctx().set_cursor_icon(egui::CursorIcon::Grab);
    }

    (action, response)
}

fn paint_card(
    ui: &egui::Ui,
    rect: egui::Rect,
    config: &TimerConfig,
    style: &TimerStyle,
    card: &CardUiState,
    is_being_dragged: bool,
) {
    let painter = ui.painter_at(rect.expand(2.0));
    let rounding = egui::Rounding::same(CARD_ROUNDING);
    let text_color = rgba_to_color32(style.text_color_time);

    painter.rect_filled(rect, rounding, rgba_to_color32(style.bg_color_time));

    let title_rect = egui::Rect::from_min_size(rect.min, egui::vec2(rect.width(), TITLE_BAR_HEIGHT));
    painter.rect_filled(
        title_rect,
        egui::Rounding {
            nw: CARD_ROUNDING,
            ne: CARD_ROUNDING,
            sw: 0.0,
            se: 0.0,
        },
        rgba_to_color32(style.bg_color_title),
    );

    let mut job = egui::text::LayoutJob::simple_singleline(
        config.title.clone(),
        egui::FontId::proportional(TITLE_FONT_SIZE),
        egui::Color32::WHITE,
    );
    job.wrap = egui::text::TextWrapping::truncate_at_width(title_rect.width() - 2.0 * BODY_PADDING);
    let galley = ui.fonts(|fonts| fonts.layout_job(job));
    painter.galley(
        title_rect.center() - galley.size() / 2.0,
        galley,
        egui::Color32::WHITE,
    );

    let display = card.ticker.display();
    let body_top = title_rect.bottom() + BODY_PADDING;
    let number_height = style.font_size_time as f32 * 1.25;
    painter.text(
        egui::pos2(rect.center().x, body_top + number_height / 2.0),
        egui::Align2::CENTER_CENTER,
        display.label(),
        egui::FontId::proportional(style.font_size_time as f32),
        text_color,
    );

    let caption = display.caption();
    if !caption.is_empty() {
        painter.text(
            egui::pos2(rect.center().x, body_top + number_height + 2.0),
            egui::Align2::CENTER_TOP,
            caption,
            egui::FontId::proportional(CAPTION_FONT_SIZE),
            text_color.gamma_multiply(0.8),
        );
    }

    let stroke = if is_being_dragged {
        egui::Stroke::new(3.0, DRAG_STROKE_COLOR)
    } else {
        egui::Stroke::new(1.0, egui::Color32::from_gray(40))
    };
    painter.rect_stroke(rect, rounding, stroke);
}
