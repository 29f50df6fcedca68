//! The scrollable list of timer cards and reorder dragging.

use chrono::NaiveDateTime;

use super::card_rendering::{render_card, CardUiAction};
use super::state::CountdownUiState;
use crate::models::CardId;
use crate::services::countdown::{insert_index, CountdownService};

const CARD_SPACING: f32 = 6.0;
const INDICATOR_THICKNESS: f32 = 4.0;
const INDICATOR_COLOR: egui::Color32 = egui::Color32::from_rgb(100, 149, 237);

/// State for drag-and-drop reordering of cards
#[derive(Debug, Clone, Default)]
pub struct DragState {
    /// The card currently being dragged, if any
    pub dragging_card: Option<CardId>,
    /// Computed insertion index for reordering
    pub insert_index: Option<usize>,
}

impl DragState {
    pub fn start_drag(&mut self, card_id: CardId) {
        self.dragging_card = Some(card_id);
        self.insert_index = None;
    }

    pub fn update_drag(&mut self, pos: egui::Pos2, midpoints: &[f32]) {
        self.insert_index = Some(insert_index(pos.y, midpoints));
    }

    /// End the drag, returning the dragged card and where it was dropped.
    pub fn end_drag(&mut self) -> Option<(CardId, Option<usize>)> {
        let card = self.dragging_card.take();
        let index = self.insert_index.take();
        card.map(|card| (card, index))
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging_card.is_some()
    }

    pub fn is_dragging_card(&self, card_id: &CardId) -> bool {
        self.dragging_card.as_ref() == Some(card_id)
    }
}

/// Actions that can result from card list interactions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContainerAction {
    OpenSettings(CardId),
    DeleteCard(CardId),
    Reorder { dragged: CardId, insert_index: usize },
}

/// Y coordinate of the insertion marker for `insert_index` among `rects`.
pub fn insertion_indicator_y(rects: &[egui::Rect], insert_index: usize) -> Option<f32> {
    let first = rects.first()?;
    let y = if insert_index == 0 {
        first.top() - CARD_SPACING / 2.0
    } else if insert_index >= rects.len() {
        rects.last()?.bottom() + CARD_SPACING / 2.0
    } else {
        rects[insert_index].top() - CARD_SPACING / 2.0
    };
    Some(y)
}

/// Render every card in display order. Returns the actions the main window
/// has to apply.
pub fn render_card_list(
    ui: &mut egui::Ui,
    service: &CountdownService,
    state: &mut CountdownUiState,
    now: NaiveDateTime,
) -> Vec<ContainerAction> {
    let mut actions = Vec::new();
    let order = state.order().to_vec();
    let any_drag_active = state.drag.is_dragging();

    let mut rects = Vec::with_capacity(order.len());
    let mut drag_started = None;
    let mut drag_pos = None;
    let mut drag_stopped = false;

    for card_id in &order {
        let Some(config) = service.timer(card_id) else {
            continue;
        };
        let style = config.style(service.settings());
        let is_being_dragged = state.drag.is_dragging_card(card_id);
        let Some(card) = state.card_mut(card_id) else {
            continue;
        };

        let (card_action, response) =
            render_card(ui, config, style, card, now, is_being_dragged, any_drag_active);
        ui.add_space(CARD_SPACING);
        rects.push((card_id.clone(), response.rect));

        match card_action {
            CardUiAction::None => {}
            CardUiAction::OpenSettings => actions.push(ContainerAction::OpenSettings(card_id.clone())),
            CardUiAction::Delete => actions.push(ContainerAction::DeleteCard(card_id.clone())),
        }

        if response.drag_started() {
            drag_started = Some(card_id.clone());
        }
        if response.dragged() {
            drag_pos = response.interact_pointer_pos().or(drag_pos);
        }
        if response.drag_stopped() {
            drag_stopped = true;
        }
    }

    state.set_card_rects(rects);
    let midpoints = state.midpoints();

    if let Some(card_id) = drag_started {
        log::debug!("Started dragging {}", card_id);
        state.drag.start_drag(card_id);
    }
    if let Some(pos) = drag_pos {
        if state.drag.is_dragging() {
            state.drag.update_drag(pos, &midpoints);
            ui.ctx().set_cursor_icon(egui::CursorIcon::Grabbing);
        }
    }
    if drag_stopped {
        if let Some((dragged, Some(insert_index))) = state.drag.end_drag() {
            actions.push(ContainerAction::Reorder {
                dragged,
                insert_index,
            });
        }
    }

    if let Some(insert_index) = state.drag.insert_index {
        let card_rects: Vec<egui::Rect> = state.card_rects().collect();
        if let Some(y) = insertion_indicator_y(&card_rects, insert_index) {
            let clip = ui.clip_rect();
            let indicator = egui::Rect::from_min_size(
                egui::pos2(clip.left() + 4.0, y - INDICATOR_THICKNESS / 2.0),
                egui::vec2(clip.width() - 8.0, INDICATOR_THICKNESS),
            );
            ui.painter().rect_filled(indicator, 2.0, INDICATOR_COLOR);
        }
    }

    actions
}
