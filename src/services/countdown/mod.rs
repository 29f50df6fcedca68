//! Countdown timers: the configuration document owner, its JSON store,
//! display ordering and the per-card refresh state.

mod ordering;
mod persistence;
mod service;
mod ticker;

pub use ordering::{display_order, insert_index, move_card};
pub use persistence::{
    load_document, read_document, resolve_config_path, save_document, CONFIG_DIR_NAME,
    CONFIG_FILE_NAME,
};
pub use service::{CountdownService, DefaultPromotions};
pub use ticker::{
    format_detailed_remaining, CardPhase, CardTicker, CountdownDisplay, ENDED_LABEL,
    NO_DATE_LABEL, TICK_INTERVAL,
};
