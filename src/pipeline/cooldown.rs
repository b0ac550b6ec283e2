use std::{
    collections::HashMap,
    time::{Duration, Instant},
};

use crate::types::GestureKind;

pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(1);

/// Per-gesture debounce. Each gesture has its own timer.
#[derive(Clone, Debug)]
pub struct CooldownGate {
    period: Duration,
    last_accepted: HashMap<GestureKind, Instant>,
}

impl CooldownGate {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            last_accepted: HashMap::new(),
        }
    }

    /// Admits `gesture` unless it was accepted less than one period before `now`,
    /// and records the acceptance.
    pub fn admit(&mut self, gesture: GestureKind, now: Instant) -> bool {
        if let Some(last) = self.last_accepted.get(&gesture) {
            if now.saturating_duration_since(*last) < self.period {
                return false;
            }
        }
        self.last_accepted.insert(gesture, now);
        true
    }

    pub fn last_accepted(&self, gesture: GestureKind) -> Option<Instant> {
        self.last_accepted.get(&gesture).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.last_accepted.is_empty()
    }

    pub fn clear(&mut self) {
        self.last_accepted.clear();
    }
}

impl Default for CooldownGate {
    fn default() -> Self {
        Self::new(DEFAULT_COOLDOWN)
    }
}
