// The persisted configuration document

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::settings::GlobalSettings;
use super::timer::{CardId, TimerConfig};

/// Everything written to `timers_config.json`.
///
/// A damaged entry only costs that entry: the rest of the file still loads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigDocument {
    #[serde(default, deserialize_with = "readable_settings")]
    pub global_settings: GlobalSettings,
    #[serde(default, deserialize_with = "readable_timers")]
    pub timers: BTreeMap<CardId, TimerConfig>,
}

fn readable_settings<'de, D: Deserializer<'de>>(deserializer: D) -> Result<GlobalSettings, D::Error> {
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(match raw {
        None | Some(Value::Null) => GlobalSettings::default(),
        Some(value) => GlobalSettings::deserialize(value).unwrap_or_else(|err| {
            log::warn!("Unreadable global_settings, using defaults: {}", err);
            GlobalSettings::default()
        }),
    })
}

fn readable_timers<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<BTreeMap<CardId, TimerConfig>, D::Error> {
    let entries = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Object(entries)) => entries,
        None | Some(Value::Null) => return Ok(BTreeMap::new()),
        Some(other) => {
            log::warn!("Expected an object of timers, found {}", other);
            return Ok(BTreeMap::new());
        }
    };

    let mut timers = BTreeMap::new();
    for (id, value) in entries {
        match TimerConfig::deserialize(value) {
            Ok(config) => {
                timers.insert(CardId::new(id), config);
            }
            Err(err) => log::warn!("Skipping unreadable timer {}: {}", id, err),
        }
    }
    Ok(timers)
}

impl ConfigDocument {
    /// Allocate an id that is not yet used, starting at `timer_<len + 1>`.
    pub fn next_card_id(&self) -> CardId {
        let mut n = self.timers.len() + 1;
        loop {
            let candidate = CardId(format!("timer_{n}"));
            if !self.timers.contains_key(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }

    /// One past the largest sort order in use, so new cards land at the end.
    pub fn next_sort_order(&self) -> i64 {
        self.timers
            .values()
            .map(|timer| timer.sort_order)
            .max()
            .map_or(0, |max| max + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc_with(ids: &[&str]) -> ConfigDocument {
        let mut doc = ConfigDocument::default();
        for (i, id) in ids.iter().enumerate() {
            let mut config: TimerConfig = serde_json::from_str("{}").unwrap();
            config.sort_order = i as i64 * 5;
            doc.timers.insert(CardId::from(*id), config);
        }
        doc
    }

    #[test]
    fn first_id_is_timer_1() {
        assert_eq!(ConfigDocument::default().next_card_id(), CardId::from("timer_1"));
    }

    #[test]
    fn next_id_skips_ids_left_behind_by_deletions() {
        // timer_1 was deleted; len + 1 == 3 is taken
        let doc = doc_with(&["timer_2", "timer_3"]);
        assert_eq!(doc.next_card_id(), CardId::from("timer_4"));
    }

    #[test]
    fn next_sort_order_follows_maximum() {
        assert_eq!(ConfigDocument::default().next_sort_order(), 0);
        assert_eq!(doc_with(&["a", "b", "c"]).next_sort_order(), 11);
    }

    #[test]
    fn damaged_entry_does_not_hide_its_neighbours() {
        let doc: ConfigDocument = serde_json::from_str(
            r#"{
                "global_settings": {"remember_window_position": true},
                "timers": {
                    "timer_1": {"title": "Launch", "sort_order": 0},
                    "timer_2": "not a timer",
                    "timer_3": {"title": null, "comment": null, "sort_order": "2"}
                }
            }"#,
        )
        .unwrap();
        assert_eq!(doc.timers.len(), 2);
        assert_eq!(doc.timers[&CardId::from("timer_1")].title, "Launch");
        assert_eq!(doc.timers[&CardId::from("timer_3")].sort_order, 2);
        assert!(doc.global_settings.remember_window_position);
    }

    #[test]
    fn wrong_shaped_sections_fall_back_to_empty() {
        let doc: ConfigDocument =
            serde_json::from_str(r#"{"global_settings": 5, "timers": []}"#).unwrap();
        assert!(doc.timers.is_empty());
        assert_eq!(doc.global_settings, GlobalSettings::default());
    }

    #[test]
    fn empty_object_is_a_valid_document() {
        let doc: ConfigDocument = serde_json::from_str("{}").unwrap();
        assert!(doc.timers.is_empty());
        assert_eq!(doc.global_settings, GlobalSettings::default());
    }
}
