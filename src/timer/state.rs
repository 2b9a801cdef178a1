use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::sensing::clamp_attention;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum SessionStatus {
    #[default]
    Idle,
    Running,
    /// Session still open but the minute clock is held.
    Paused,
    Ended,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum TimerMode {
    /// Ends itself once `target_minutes` have elapsed.
    #[default]
    Countdown,
    Stopwatch,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub status: SessionStatus,
    pub mode: TimerMode,
    pub child_id: Option<String>,
    pub target_minutes: u32,
    /// Whole minutes counted by the duration ticker. Never decreases.
    pub elapsed_minutes: u32,
    /// Value of `elapsed_minutes` when the countdown was last rewound.
    pub countdown_base: u32,
    /// Latest attention reading, always within [0, 100].
    pub attention: f64,
    pub attention_active: bool,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            status: SessionStatus::Idle,
            mode: TimerMode::Countdown,
            child_id: None,
            target_minutes: 0,
            elapsed_minutes: 0,
            countdown_base: 0,
            attention: 100.0,
            attention_active: false,
            started_at: None,
            ended_at: None,
        }
    }
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.status == SessionStatus::Running
    }

    /// Running or paused: the session has started and not yet ended.
    pub fn is_active(&self) -> bool {
        matches!(self.status, SessionStatus::Running | SessionStatus::Paused)
    }

    pub fn begin_session(
        &mut self,
        child_id: String,
        mode: TimerMode,
        target_minutes: u32,
        initial_attention: f64,
        started_at: DateTime<Utc>,
    ) {
        *self = Self {
            status: SessionStatus::Running,
            mode,
            child_id: Some(child_id),
            target_minutes,
            elapsed_minutes: 0,
            countdown_base: 0,
            attention: clamp_attention(initial_attention),
            attention_active: false,
            started_at: Some(started_at),
            ended_at: None,
        };
    }

    /// Counts one minute while running. Returns whether it counted.
    pub fn tick_minute(&mut self) -> bool {
        if !self.is_running() {
            return false;
        }
        self.elapsed_minutes = self.elapsed_minutes.saturating_add(1);
        true
    }

    pub fn remaining_minutes(&self) -> Option<u32> {
        match self.mode {
            TimerMode::Countdown => {
                let counted = self.elapsed_minutes.saturating_sub(self.countdown_base);
                Some(self.target_minutes.saturating_sub(counted))
            }
            TimerMode::Stopwatch => None,
        }
    }

    pub fn target_reached(&self) -> bool {
        self.remaining_minutes() == Some(0)
    }

    pub fn pause(&mut self) -> bool {
        if !self.is_running() {
            return false;
        }
        self.status = SessionStatus::Paused;
        true
    }

    pub fn resume(&mut self) -> bool {
        if self.status != SessionStatus::Paused {
            return false;
        }
        self.status = SessionStatus::Running;
        true
    }

    /// Restarts the countdown from the full target and holds the clock.
    /// Minutes already studied stay in `elapsed_minutes`.
    pub fn rewind_countdown(&mut self) -> bool {
        if !self.is_active() || self.mode != TimerMode::Countdown {
            return false;
        }
        self.countdown_base = self.elapsed_minutes;
        self.status = SessionStatus::Paused;
        true
    }

    /// Stores a reading while the session is open; ignored otherwise.
    pub fn apply_attention(&mut self, value: f64) -> bool {
        if !self.is_active() {
            return false;
        }
        self.attention = clamp_attention(value);
        true
    }

    pub fn end(&mut self, ended_at: DateTime<Utc>) {
        self.status = SessionStatus::Ended;
        self.attention_active = false;
        self.ended_at = Some(ended_at);
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
