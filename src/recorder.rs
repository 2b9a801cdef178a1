use chrono::{NaiveDate, Utc};
use log::info;
use uuid::Uuid;

use crate::error::FocusResult;
use crate::models::FocusSession;
use crate::store::ProfileStore;

/// Rounds an attention reading into a 0..=100 focus score. Non-finite
/// readings count as zero.
pub fn focus_score_from_attention(attention: f64) -> u8 {
    if !attention.is_finite() {
        return 0;
    }
    attention.round().clamp(0.0, 100.0) as u8
}

pub fn build_session(
    id: impl Into<String>,
    child_id: impl Into<String>,
    date: NaiveDate,
    final_attention: f64,
    elapsed_minutes: u32,
) -> FocusSession {
    FocusSession::new(
        id,
        child_id,
        date,
        elapsed_minutes,
        focus_score_from_attention(final_attention),
    )
}

/// Turns the end-of-session attention reading and elapsed minutes into a
/// stored `FocusSession`.
#[derive(Clone)]
pub struct SessionRecorder {
    store: ProfileStore,
}

impl SessionRecorder {
    pub fn new(store: ProfileStore) -> Self {
        Self { store }
    }

    pub async fn end_session(
        &self,
        final_attention: f64,
        elapsed_minutes: u32,
        child_id: &str,
    ) -> FocusResult<FocusSession> {
        let session = build_session(
            Uuid::new_v4().to_string(),
            child_id,
            Utc::now().date_naive(),
            final_attention,
            elapsed_minutes,
        );

        self.store.add_session(session.clone()).await?;
        info!(
            "Session {} closed after {} min with focus {}",
            session.id(),
            session.duration(),
            session.focus_score()
        );
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::avatar::MonogramAvatar;
    use crate::error::FocusError;
    use crate::models::Emotions;
    use proptest::prelude::*;

    #[tokio::test]
    async fn high_focus_twelve_minutes() {
        let store = ProfileStore::with_demo_data(&MonogramAvatar).unwrap();
        let recorder = SessionRecorder::new(store.clone());

        let session = recorder.end_session(85.0, 12, "1").await.unwrap();

        assert_eq!(session.duration(), 12);
        assert_eq!(session.focus_score(), 85);
        assert_eq!(
            session.emotions(),
            Emotions {
                happy: 70,
                neutral: 20,
                distracted: 10
            }
        );
        assert_eq!(session.date(), Utc::now().date_naive());
        assert!(store.list_sessions().await.unwrap().contains(&session));
    }

    #[tokio::test]
    async fn zero_elapsed_still_records_one_minute() {
        let store = ProfileStore::with_demo_data(&MonogramAvatar).unwrap();
        let session = SessionRecorder::new(store)
            .end_session(45.0, 0, "2")
            .await
            .unwrap();

        assert_eq!(session.duration(), 1);
        assert_eq!(session.focus_score(), 45);
        assert_eq!(
            session.emotions(),
            Emotions {
                happy: 20,
                neutral: 30,
                distracted: 50
            }
        );
    }

    #[tokio::test]
    async fn unknown_child_is_a_stale_reference() {
        let store = ProfileStore::with_demo_data(&MonogramAvatar).unwrap();
        let err = SessionRecorder::new(store)
            .end_session(60.0, 5, "ghost")
            .await
            .unwrap_err();
        assert!(matches!(err, FocusError::StaleReference(_)));
    }

    #[test]
    fn rounding_and_clamping() {
        assert_eq!(focus_score_from_attention(84.5), 85);
        assert_eq!(focus_score_from_attention(84.49), 84);
        assert_eq!(focus_score_from_attention(-12.0), 0);
        assert_eq!(focus_score_from_attention(140.0), 100);
        assert_eq!(focus_score_from_attention(f64::NAN), 0);
    }

    proptest! {
        #[test]
        fn duration_never_below_one(attention in -500.0f64..500.0, elapsed in 0u32..10_000) {
            let date = NaiveDate::from_ymd_opt(2024, 5, 5).unwrap();
            let session = build_session("id", "c", date, attention, elapsed);
            prop_assert!(session.duration() >= 1);
            prop_assert!(session.focus_score() <= 100);
        }
    }
}
