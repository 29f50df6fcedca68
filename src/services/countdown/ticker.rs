//! Per-card countdown state: what a card displays and when it refreshes.
//!
//! The UI polls every ticker each frame; a ticker only recomputes its
//! display once its one-second interval has elapsed. A card whose end date
//! has passed switches to [`CardPhase::Ended`] and stops scheduling refreshes
//! until its end date is edited.

use std::time::{Duration, Instant};

use chrono::{NaiveDate, NaiveDateTime};

use crate::utils::date::days_remaining;

pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

pub const ENDED_LABEL: &str = "Ended";
pub const NO_DATE_LABEL: &str = "No date";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardPhase {
    /// Periodic refresh running
    Active,
    /// Terminal; refresh cancelled
    Ended,
    /// Missing or malformed end date; nothing to count down to
    NoDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownDisplay {
    Days(i64),
    Ended,
    NoDate,
}

impl CountdownDisplay {
    pub fn label(&self) -> String {
        match self {
            CountdownDisplay::Days(days) => days.to_string(),
            CountdownDisplay::Ended => ENDED_LABEL.to_string(),
            CountdownDisplay::NoDate => NO_DATE_LABEL.to_string(),
        }
    }

    /// Caption shown under the number.
    pub fn caption(&self) -> &'static str {
        match self {
            CountdownDisplay::Days(1) => "day left",
            CountdownDisplay::Days(_) => "days left",
            CountdownDisplay::Ended | CountdownDisplay::NoDate => "",
        }
    }
}

#[derive(Debug, Clone)]
pub struct CardTicker {
    end_day: Option<NaiveDate>,
    display: CountdownDisplay,
    next_due: Option<Instant>,
    suspended: bool,
}

impl CardTicker {
    /// Create a ticker and compute its first display immediately.
    pub fn new(end_day: Option<NaiveDate>, now: Instant, today: NaiveDate) -> Self {
        let mut ticker = Self {
            end_day,
            display: CountdownDisplay::NoDate,
            next_due: None,
            suspended: false,
        };
        ticker.refresh(now, today);
        ticker
    }

    /// Run the periodic refresh if it is due. Returns true when it ran.
    pub fn poll(&mut self, now: Instant, today: NaiveDate) -> bool {
        if self.suspended {
            return false;
        }
        match self.next_due {
            Some(due) if now >= due => {
                self.refresh(now, today);
                true
            }
            _ => false,
        }
    }

    fn refresh(&mut self, now: Instant, today: NaiveDate) {
        self.display = match self.end_day {
            None => CountdownDisplay::NoDate,
            Some(end) => {
                let days = days_remaining(end, today);
                if days < 0 {
                    CountdownDisplay::Ended
                } else {
                    CountdownDisplay::Days(days)
                }
            }
        };

        self.next_due = match self.display {
            CountdownDisplay::Days(_) => Some(now + TICK_INTERVAL),
            CountdownDisplay::Ended | CountdownDisplay::NoDate => None,
        };
    }

    /// Pause refreshes while this card's own dialog is open.
    pub fn suspend(&mut self) {
        self.suspended = true;
    }

    /// Resume after the dialog closed; refreshes right away if still active.
    pub fn resume(&mut self, now: Instant, today: NaiveDate) {
        if !self.suspended {
            return;
        }
        self.suspended = false;
        if self.next_due.is_some() {
            self.refresh(now, today);
        }
    }

    pub fn display(&self) -> CountdownDisplay {
        self.display
    }

    pub fn phase(&self) -> CardPhase {
        match self.display {
            CountdownDisplay::Days(_) => CardPhase::Active,
            CountdownDisplay::Ended => CardPhase::Ended,
            CountdownDisplay::NoDate => CardPhase::NoDate,
        }
    }

    pub fn is_scheduled(&self) -> bool {
        self.next_due.is_some() && !self.suspended
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended
    }

    /// Time until the next refresh, used to schedule repaints.
    pub fn time_until_next_tick(&self, now: Instant) -> Option<Duration> {
        if self.suspended {
            return None;
        }
        self.next_due
            .map(|due| due.saturating_duration_since(now))
    }
}

/// Detailed `Xd Yh Zm Ws` remaining time, used for the card tooltip.
pub fn format_detailed_remaining(end: NaiveDateTime, now: NaiveDateTime) -> String {
    let remaining = end - now;
    let total_seconds = remaining.num_seconds();
    if total_seconds <= 0 {
        return "Time's up!".to_string();
    }

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3_600;
    let minutes = (total_seconds % 3_600) / 60;
    let seconds = total_seconds % 60;

    let mut parts = Vec::new();
    if days > 0 {
        parts.push(format!("{days}d"));
    }
    if hours > 0 || days > 0 {
        parts.push(format!("{hours}h"));
    }
    if minutes > 0 || hours > 0 || days > 0 {
        parts.push(format!("{minutes}m"));
    }
    parts.push(format!("{seconds}s"));
    parts.join(" ")
}
