use std::collections::HashMap;
use std::time::{Duration, Instant};

use chrono::NaiveDate;

use super::container::DragState;
use super::settings::SettingsDialogState;
use crate::models::CardId;
use crate::services::countdown::{CardTicker, CountdownService};

/// Hover time before a card shows its tooltip.
pub const TOOLTIP_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TooltipState {
    Hidden,
    /// Still waiting; repaint after the given duration
    Pending(Duration),
    Visible,
}

/// UI-side state of one rendered card.
#[derive(Debug, Clone)]
pub struct CardUiState {
    pub ticker: CardTicker,
    hovered_since: Option<Instant>,
}

impl CardUiState {
    fn new(ticker: CardTicker) -> Self {
        Self {
            ticker,
            hovered_since: None,
        }
    }

    /// Advance the hover timer. Leaving the card or starting a drag cancels
    /// a pending tooltip.
    pub fn update_hover(&mut self, hovered: bool, dragging: bool, now: Instant) -> TooltipState {
        if !hovered || dragging {
            self.hovered_since = None;
            return TooltipState::Hidden;
        }
        let since = *self.hovered_since.get_or_insert(now);
        let elapsed = now.saturating_duration_since(since);
        if elapsed >= TOOLTIP_DELAY {
            TooltipState::Visible
        } else {
            TooltipState::Pending(TOOLTIP_DELAY - elapsed)
        }
    }
}

/// Everything the main window keeps per card between frames.
#[derive(Default)]
pub struct CountdownUiState {
    order: Vec<CardId>,
    cards: HashMap<CardId, CardUiState>,
    dialogs: HashMap<CardId, SettingsDialogState>,
    card_rects: Vec<(CardId, egui::Rect)>,
    pub drag: DragState,
}

impl CountdownUiState {
    pub fn new(service: &CountdownService, now: Instant, today: NaiveDate) -> Self {
        let mut state = Self::default();
        state.rebuild(service, now, today);
        state
    }

    /// Throw away every card's UI state and build it again from the document
    /// in display order. Open dialogs survive for cards that still exist.
    pub fn rebuild(&mut self, service: &CountdownService, now: Instant, today: NaiveDate) {
        self.order = service.ordered_cards();
        self.cards = self
            .order
            .iter()
            .filter_map(|id| {
                let config = service.timer(id)?;
                let ticker = CardTicker::new(config.end_day(), now, today);
                Some((id.clone(), CardUiState::new(ticker)))
            })
            .collect();

        self.dialogs.retain(|id, _| service.timer(id).is_some());
        for id in self.dialogs.keys() {
            if let Some(card) = self.cards.get_mut(id) {
                card.ticker.suspend();
            }
        }

        self.card_rects.clear();
        if let Some(dragged) = &self.drag.dragging_card {
            if !self.cards.contains_key(dragged) {
                self.drag.end_drag();
            }
        }
        log::debug!("Rebuilt {} timer card(s)", self.order.len());
    }

    pub fn order(&self) -> &[CardId] {
        &self.order
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    #[cfg(test)]
    pub fn card(&self, id: &CardId) -> Option<&CardUiState> {
        self.cards.get(id)
    }

    pub fn card_mut(&mut self, id: &CardId) -> Option<&mut CardUiState> {
        self.cards.get_mut(id)
    }

    /// Run due refreshes. Returns how many cards refreshed.
    pub fn poll_tickers(&mut self, now: Instant, today: NaiveDate) -> usize {
        self.cards
            .values_mut()
            .map(|card| card.ticker.poll(now, today))
            .filter(|refreshed| *refreshed)
            .count()
    }

    /// Soonest pending refresh among all cards.
    pub fn next_refresh_in(&self, now: Instant) -> Option<Duration> {
        self.cards
            .values()
            .filter_map(|card| card.ticker.time_until_next_tick(now))
            .min()
    }

    pub fn has_dialog(&self, id: &CardId) -> bool {
        self.dialogs.contains_key(id)
    }

    /// Open a card's dialog and suspend its refresh. An already open dialog
    /// is kept as is.
    pub fn open_dialog(&mut self, dialog: SettingsDialogState) {
        let id = dialog.card_id().clone();
        if let Some(card) = self.cards.get_mut(&id) {
            card.ticker.suspend();
        }
        self.dialogs.entry(id).or_insert(dialog);
    }

    pub fn dialog_ids(&self) -> Vec<CardId> {
        let mut ids: Vec<CardId> = self.dialogs.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Remove a dialog for rendering; hand it back with [`Self::return_dialog`]
    /// or finish with [`Self::dialog_closed`].
    pub fn take_dialog(&mut self, id: &CardId) -> Option<SettingsDialogState> {
        self.dialogs.remove(id)
    }

    pub fn return_dialog(&mut self, dialog: SettingsDialogState) {
        self.dialogs.insert(dialog.card_id().clone(), dialog);
    }

    /// The card's dialog is gone; resume its refresh.
    pub fn dialog_closed(&mut self, id: &CardId, now: Instant, today: NaiveDate) {
        self.dialogs.remove(id);
        if let Some(card) = self.cards.get_mut(id) {
            card.ticker.resume(now, today);
        }
    }

    pub fn set_card_rects(&mut self, rects: Vec<(CardId, egui::Rect)>) {
        self.card_rects = rects;
    }

    pub fn card_rects(&self) -> impl Iterator<Item = egui::Rect> + '_ {
        self.card_rects.iter().map(|(_, rect)| *rect)
    }

    /// Vertical midpoints of the cards as laid out last frame, top to bottom.
    pub fn midpoints(&self) -> Vec<f32> {
        self.card_rects.iter().map(|(_, rect)| rect.center().y).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ConfigDocument;
    use crate::services::countdown::{CardPhase, CountdownDisplay};
    use pretty_assertions::assert_eq;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn service_with(dates: &[Option<NaiveDate>]) -> (tempfile::TempDir, CountdownService) {
        let dir = tempfile::tempdir().unwrap();
        let mut service = CountdownService::from_document(
            ConfigDocument::default(),
            dir.path().join("timers_config.json"),
        );
        for (i, date) in dates.iter().enumerate() {
            let id = service.add_timer(Some(format!("t{i}")), *date, None, today());
            if date.is_none() {
                let mut config = service.timer(&id).unwrap().clone();
                config.end_date = None;
                service.update_timer(&id, config);
            }
        }
        (dir, service)
    }

    #[test]
    fn rebuild_follows_display_order_and_phases() {
        let past = NaiveDate::from_ymd_opt(2026, 1, 1);
        let future = NaiveDate::from_ymd_opt(2026, 12, 25);
        let (_dir, service) = service_with(&[future, past, None]);
        let state = CountdownUiState::new(&service, Instant::now(), today());

        assert_eq!(state.order(), service.ordered_cards().as_slice());
        let phases: Vec<CardPhase> = state
            .order()
            .iter()
            .map(|id| state.card(id).unwrap().ticker.phase())
            .collect();
        assert_eq!(phases, vec![CardPhase::Active, CardPhase::Ended, CardPhase::NoDate]);
        assert_eq!(
            state.card(&state.order()[0]).unwrap().ticker.display(),
            CountdownDisplay::Days(67)
        );
    }

    #[test]
    fn dialog_suspends_only_its_own_card() {
        let future = NaiveDate::from_ymd_opt(2026, 12, 25);
        let (_dir, service) = service_with(&[future, future]);
        let start = Instant::now();
        let mut state = CountdownUiState::new(&service, start, today());
        let (first, second) = (state.order()[0].clone(), state.order()[1].clone());

        let config = service.timer(&first).unwrap();
        state.open_dialog(SettingsDialogState::new(first.clone(), config, service.settings()));
        assert!(state.card(&first).unwrap().ticker.is_suspended());
        assert!(state.card(&second).unwrap().ticker.is_scheduled());

        assert_eq!(state.poll_tickers(start + Duration::from_secs(1), today()), 1);

        state.dialog_closed(&first, start + Duration::from_secs(2), today());
        assert!(!state.has_dialog(&first));
        assert!(state.card(&first).unwrap().ticker.is_scheduled());
    }

    #[test]
    fn rebuild_keeps_dialogs_suspended_and_drops_stale_ones() {
        let future = NaiveDate::from_ymd_opt(2026, 12, 25);
        let (_dir, mut service) = service_with(&[future, future]);
        let mut state = CountdownUiState::new(&service, Instant::now(), today());
        let (first, second) = (state.order()[0].clone(), state.order()[1].clone());
        for id in [&first, &second] {
            let config = service.timer(id).unwrap();
            state.open_dialog(SettingsDialogState::new(id.clone(), config, service.settings()));
        }

        service.delete_timer(&second);
        state.rebuild(&service, Instant::now(), today());

        assert_eq!(state.dialog_ids(), vec![first.clone()]);
        assert!(state.card(&first).unwrap().ticker.is_suspended());
    }

    #[test]
    fn edit_into_the_future_reactivates_an_ended_card() {
        let past = NaiveDate::from_ymd_opt(2026, 1, 1);
        let (_dir, mut service) = service_with(&[past]);
        let mut state = CountdownUiState::new(&service, Instant::now(), today());
        let id = state.order()[0].clone();
        assert_eq!(state.card(&id).unwrap().ticker.phase(), CardPhase::Ended);

        let mut config = service.timer(&id).unwrap().clone();
        config.set_end_day(NaiveDate::from_ymd_opt(2026, 11, 1).unwrap());
        service.update_timer(&id, config);
        state.rebuild(&service, Instant::now(), today());

        let ticker = &state.card(&id).unwrap().ticker;
        assert_eq!(ticker.display(), CountdownDisplay::Days(13));
        assert!(ticker.is_scheduled());
    }

    #[test]
    fn next_refresh_ignores_finished_cards() {
        let past = NaiveDate::from_ymd_opt(2026, 1, 1);
        let (_dir, service) = service_with(&[past, None]);
        let now = Instant::now();
        let state = CountdownUiState::new(&service, now, today());
        assert_eq!(state.next_refresh_in(now), None);
    }

    #[test]
    fn tooltip_waits_for_delay_and_resets_on_leave() {
        let now = Instant::now();
        let mut card = CardUiState::new(CardTicker::new(None, now, today()));

        assert_eq!(card.update_hover(true, false, now), TooltipState::Pending(TOOLTIP_DELAY));
        assert_eq!(
            card.update_hover(true, false, now + Duration::from_millis(400)),
            TooltipState::Pending(Duration::from_millis(600))
        );
        assert_eq!(card.update_hover(true, false, now + TOOLTIP_DELAY), TooltipState::Visible);

        assert_eq!(card.update_hover(false, false, now + TOOLTIP_DELAY), TooltipState::Hidden);
        assert_eq!(
            card.update_hover(true, false, now + Duration::from_secs(2)),
            TooltipState::Pending(TOOLTIP_DELAY)
        );
    }

    #[test]
    fn drag_cancels_pending_tooltip() {
        let now = Instant::now();
        let mut card = CardUiState::new(CardTicker::new(None, now, today()));
        card.update_hover(true, false, now);
        assert_eq!(card.update_hover(true, true, now + TOOLTIP_DELAY), TooltipState::Hidden);
        assert_eq!(
            card.update_hover(true, false, now + TOOLTIP_DELAY),
            TooltipState::Pending(TOOLTIP_DELAY)
        );
    }

    #[test]
    fn midpoints_follow_recorded_rects() {
        let mut state = CountdownUiState::default();
        state.set_card_rects(vec![
            (CardId::from("a"), egui::Rect::from_min_size(egui::pos2(0.0, 0.0), egui::vec2(100.0, 40.0))),
            (CardId::from("b"), egui::Rect::from_min_size(egui::pos2(0.0, 50.0), egui::vec2(100.0, 60.0))),
        ]);
        assert_eq!(state.midpoints(), vec![20.0, 80.0]);
    }
}
