//! Display ordering of timer cards and drag-reorder arithmetic.

use std::collections::BTreeMap;

use crate::models::{CardId, TimerConfig};

/// Order cards for display: ascending `(sort_order, end_date)` for cards with
/// a parseable end date, followed by the remaining cards in id order.
pub fn display_order(timers: &BTreeMap<CardId, TimerConfig>) -> Vec<CardId> {
    let mut dated = Vec::with_capacity(timers.len());
    let mut undated = Vec::new();

    for (id, timer) in timers {
        match timer.end_date() {
            Ok(end) => dated.push((timer.sort_order, end, id)),
            Err(err) => {
                log::debug!("Card {} uses fallback ordering: {}", id, err);
                undated.push(id);
            }
        }
    }

    // Stable sort over id-ordered input, so full ties stay in id order
    dated.sort_by(|a, b| (a.0, a.1).cmp(&(b.0, b.1)));

    dated
        .into_iter()
        .map(|(_, _, id)| id.clone())
        .chain(undated.into_iter().cloned())
        .collect()
}

/// Index at which a card dropped at `drop_y` is inserted, given the vertical
/// midpoints of the cards currently shown (top to bottom).
pub fn insert_index(drop_y: f32, midpoints: &[f32]) -> usize {
    midpoints
        .iter()
        .position(|mid_y| drop_y < *mid_y)
        .unwrap_or(midpoints.len())
}

/// Move `dragged` so it ends up in front of the card that was at
/// `insert_index` before the move. Returns `None` when the card is unknown.
pub fn move_card(order: &[CardId], dragged: &CardId, insert_index: usize) -> Option<Vec<CardId>> {
    let current_index = order.iter().position(|id| id == dragged)?;
    let mut new_order = order.to_vec();
    let card = new_order.remove(current_index);
    let adjusted_index = if insert_index > current_index {
        insert_index.saturating_sub(1)
    } else {
        insert_index
    };
    new_order.insert(adjusted_index.min(new_order.len()), card);
    Some(new_order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GlobalSettings;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn timer(sort_order: i64, end_date: Option<&str>) -> TimerConfig {
        let mut config = TimerConfig::with_defaults(
            "t",
            NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
            "",
            &GlobalSettings::default(),
        );
        config.sort_order = sort_order;
        config.end_date = end_date.map(str::to_string);
        config
    }

    fn ids(values: &[&str]) -> Vec<CardId> {
        values.iter().map(|v| CardId::from(*v)).collect()
    }

    #[test]
    fn sorts_by_sort_order_then_end_date() {
        let mut timers = BTreeMap::new();
        timers.insert(CardId::from("a"), timer(1, Some("2026-12-01 00:00:00")));
        timers.insert(CardId::from("b"), timer(0, Some("2027-01-01 00:00:00")));
        timers.insert(CardId::from("c"), timer(1, Some("2026-11-01 00:00:00")));
        timers.insert(CardId::from("d"), timer(0, Some("2026-10-25")));

        assert_eq!(display_order(&timers), ids(&["d", "b", "c", "a"]));
    }

    #[test]
    fn undated_cards_follow_in_id_order() {
        let mut timers = BTreeMap::new();
        timers.insert(CardId::from("z"), timer(-5, None));
        timers.insert(CardId::from("m"), timer(9, Some("2026-10-25 00:00:00")));
        timers.insert(CardId::from("b"), timer(-9, Some("garbage")));

        assert_eq!(display_order(&timers), ids(&["m", "b", "z"]));
    }

    #[test]
    fn insert_index_uses_midpoints() {
        let mids = [50.0, 150.0, 250.0];
        assert_eq!(insert_index(10.0, &mids), 0);
        assert_eq!(insert_index(100.0, &mids), 1);
        assert_eq!(insert_index(249.0, &mids), 2);
        assert_eq!(insert_index(400.0, &mids), 3);
        assert_eq!(insert_index(0.0, &[]), 0);
    }

    #[test]
    fn move_card_down_accounts_for_removed_slot() {
        let order = ids(&["a", "b", "c", "d"]);
        // Dropped below "c" (between c and d)
        let moved = move_card(&order, &CardId::from("a"), 3).unwrap();
        assert_eq!(moved, ids(&["b", "c", "a", "d"]));
    }

    #[test]
    fn move_card_up_and_to_ends() {
        let order = ids(&["a", "b", "c", "d"]);
        assert_eq!(move_card(&order, &CardId::from("d"), 0).unwrap(), ids(&["d", "a", "b", "c"]));
        assert_eq!(move_card(&order, &CardId::from("b"), 4).unwrap(), ids(&["a", "c", "d", "b"]));
        assert_eq!(move_card(&order, &CardId::from("b"), 1).unwrap(), order);
    }

    #[test]
    fn move_unknown_card_is_none() {
        assert_eq!(move_card(&ids(&["a"]), &CardId::from("x"), 0), None);
    }
}
