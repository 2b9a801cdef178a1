use log::info;

use crate::error::{FocusError, FocusResult};
use crate::models::FocusSession;

use super::ProfileStore;

impl ProfileStore {
    /// Appends a finished session. The child must be on the roster.
    pub async fn add_session(&self, session: FocusSession) -> FocusResult<()> {
        self.execute(move |roster| {
            if roster.child(session.child_id()).is_none() {
                return Err(FocusError::StaleReference(session.child_id().to_string()));
            }
            if roster.sessions.iter().any(|s| s.id() == session.id()) {
                return Err(FocusError::Validation(format!(
                    "session id '{}' already recorded",
                    session.id()
                )));
            }
            info!(
                "Recorded session {} for child {} ({} min, focus {})",
                session.id(),
                session.child_id(),
                session.duration(),
                session.focus_score()
            );
            roster.sessions.push(session);
            Ok(())
        })
        .await
    }

    /// Every recorded session in insertion order.
    pub async fn list_sessions(&self) -> FocusResult<Vec<FocusSession>> {
        self.execute(|roster| Ok(roster.sessions.clone())).await
    }

    pub async fn sessions_for_child(&self, child_id: &str) -> FocusResult<Vec<FocusSession>> {
        let child_id = child_id.to_string();
        self.execute(move |roster| {
            Ok(roster
                .sessions
                .iter()
                .filter(|session| session.child_id() == child_id)
                .cloned()
                .collect())
        })
        .await
    }
}
