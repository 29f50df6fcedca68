// Property-based tests for card display order and drag reordering

use chrono::NaiveDate;
use countdown_widget::models::{CardId, ConfigDocument, GlobalSettings, TimerConfig};
use countdown_widget::services::countdown::{display_order, move_card};
use proptest::prelude::*;

fn timer(sort_order: i64, day_offset: i64) -> TimerConfig {
    let date = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap() + chrono::Duration::days(day_offset);
    let mut config = TimerConfig::with_defaults("t", date, "", &GlobalSettings::default());
    config.sort_order = sort_order;
    config
}

proptest! {
    /// Property: dated cards come out non-decreasing by (sort_order, end_date)
    #[test]
    fn prop_display_order_is_sorted(
        entries in prop::collection::vec((0..5i64, 0..400i64), 0..20),
    ) {
        let mut document = ConfigDocument::default();
        for (sort_order, offset) in entries {
            let id = document.next_card_id();
            document.timers.insert(id, timer(sort_order, offset));
        }

        let order = display_order(&document.timers);
        prop_assert_eq!(order.len(), document.timers.len());

        let keys: Vec<_> = order
            .iter()
            .map(|id| {
                let config = &document.timers[id];
                (config.sort_order, config.end_date().unwrap())
            })
            .collect();
        prop_assert!(keys.windows(2).all(|pair| pair[0] <= pair[1]));
    }

    /// Property: a reorder is a permutation that places the dragged card
    /// in front of the card it was dropped on
    #[test]
    fn prop_move_card_is_a_permutation(
        len in 1..12usize,
        from in 0..12usize,
        to in 0..13usize,
    ) {
        let from = from % len;
        let to = to % (len + 1);
        let order: Vec<CardId> = (0..len).map(|i| CardId::new(format!("timer_{i}"))).collect();

        let moved = move_card(&order, &order[from], to).unwrap();

        let mut sorted = moved.clone();
        sorted.sort();
        let mut original = order.clone();
        original.sort();
        prop_assert_eq!(sorted, original);

        let new_index = moved.iter().position(|id| id == &order[from]).unwrap();
        let expected = if to > from { to - 1 } else { to };
        prop_assert_eq!(new_index, expected.min(len - 1));
    }
}
