//! Operations card dialogs and card actions need from the main window.

use crate::models::{CardId, TimerConfig};
use crate::services::countdown::{CountdownService, DefaultPromotions};

#[cfg_attr(test, mockall::automock)]
pub trait AppCallbacks {
    /// Replace a timer's configuration. False for unknown ids.
    fn update_timer(&mut self, id: &CardId, config: TimerConfig) -> bool;

    fn delete_timer(&mut self, id: &CardId) -> bool;

    fn promote_defaults(&mut self, promotions: DefaultPromotions);

    fn set_remember_window_position(&mut self, remember: bool);
}

impl AppCallbacks for CountdownService {
    fn update_timer(&mut self, id: &CardId, config: TimerConfig) -> bool {
        CountdownService::update_timer(self, id, config)
    }

    fn delete_timer(&mut self, id: &CardId) -> bool {
        CountdownService::delete_timer(self, id)
    }

    fn promote_defaults(&mut self, promotions: DefaultPromotions) {
        CountdownService::promote_defaults(self, promotions)
    }

    fn set_remember_window_position(&mut self, remember: bool) {
        CountdownService::set_remember_window_position(self, remember)
    }
}
