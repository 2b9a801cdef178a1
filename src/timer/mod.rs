pub mod controller;
pub mod state;

pub use controller::{SessionEvent, StudySessionController};
pub use state::{SessionState, SessionStatus, TimerMode};
