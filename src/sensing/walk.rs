use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::random::SharedRng;

pub const MIN_ATTENTION: f64 = 0.0;
pub const MAX_ATTENTION: f64 = 100.0;

/// Clamp into [0, 100]. NaN collapses to the floor.
pub fn clamp_attention(value: f64) -> f64 {
    if value.is_nan() {
        return MIN_ATTENTION;
    }
    value.clamp(MIN_ATTENTION, MAX_ATTENTION)
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AttentionSample {
    pub value: f64,
    pub taken_at: DateTime<Utc>,
}

/// Bounded random walk standing in for real attention inference. Steps are
/// drawn from `[min_step, max_step)`, which leans upward with the defaults.
#[derive(Debug, Clone)]
pub struct AttentionWalk {
    value: f64,
    min_step: f64,
    max_step: f64,
}

impl AttentionWalk {
    pub fn new(start: f64, min_step: f64, max_step: f64) -> Self {
        Self {
            value: clamp_attention(start),
            min_step,
            max_step,
        }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn step(&mut self, rng: &SharedRng) -> f64 {
        let change = rng.uniform(self.min_step, self.max_step);
        self.apply(change)
    }

    pub fn apply(&mut self, change: f64) -> f64 {
        self.value = clamp_attention(self.value + change);
        self.value
    }
}
