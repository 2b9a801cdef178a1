//! Parent dashboard figures for one child.

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::FocusResult;
use crate::models::FocusSession;
use crate::store::ProfileStore;

const RECENT_SESSIONS: usize = 5;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct EmotionAverages {
    pub happy: f64,
    pub neutral: f64,
    pub distracted: f64,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub focus_score: u8,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChildReport {
    pub child_id: String,
    pub total_sessions: usize,
    /// Rounded mean; zero without sessions.
    pub average_focus_score: u32,
    pub total_study_minutes: u32,
    pub emotion_averages: EmotionAverages,
    /// Oldest first.
    pub focus_trend: Vec<TrendPoint>,
    /// Newest first, at most five.
    pub recent_sessions: Vec<FocusSession>,
}

impl ChildReport {
    /// Ignores sessions belonging to other children.
    pub fn build(child_id: &str, sessions: &[FocusSession]) -> Self {
        let mut own: Vec<&FocusSession> = sessions
            .iter()
            .filter(|session| session.child_id() == child_id)
            .collect();
        own.sort_by_key(|session| session.date());

        let count = own.len();
        let (average_focus_score, emotion_averages) = if count == 0 {
            (0, EmotionAverages::default())
        } else {
            let n = count as f64;
            let focus_sum: f64 = own.iter().map(|s| s.focus_score() as f64).sum();
            let mut averages = EmotionAverages::default();
            for session in &own {
                let emotions = session.emotions();
                averages.happy += emotions.happy as f64;
                averages.neutral += emotions.neutral as f64;
                averages.distracted += emotions.distracted as f64;
            }
            averages.happy /= n;
            averages.neutral /= n;
            averages.distracted /= n;
            ((focus_sum / n).round() as u32, averages)
        };

        Self {
            child_id: child_id.to_string(),
            total_sessions: count,
            average_focus_score,
            total_study_minutes: own.iter().map(|s| s.duration()).sum(),
            emotion_averages,
            focus_trend: own
                .iter()
                .map(|s| TrendPoint {
                    date: s.date(),
                    focus_score: s.focus_score(),
                })
                .collect(),
            recent_sessions: own
                .iter()
                .rev()
                .take(RECENT_SESSIONS)
                .map(|s| (*s).clone())
                .collect(),
        }
    }
}

impl ProfileStore {
    pub async fn child_report(&self, child_id: &str) -> FocusResult<ChildReport> {
        let sessions = self.sessions_for_child(child_id).await?;
        Ok(ChildReport::build(child_id, &sessions))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::avatar::MonogramAvatar;

    fn on(day: u32, score: u8, minutes: u32) -> FocusSession {
        let date = NaiveDate::from_ymd_opt(2024, 4, day).unwrap();
        FocusSession::new(format!("s{day}"), "kid", date, minutes, score)
    }

    #[test]
    fn empty_history_reports_zeroes() {
        let report = ChildReport::build("kid", &[]);
        assert_eq!(report.total_sessions, 0);
        assert_eq!(report.average_focus_score, 0);
        assert_eq!(report.emotion_averages, EmotionAverages::default());
        assert!(report.recent_sessions.is_empty());
    }

    #[test]
    fn aggregates_and_orders_by_date() {
        let sessions = vec![on(3, 90, 20), on(1, 40, 10), on(2, 61, 15)];
        let report = ChildReport::build("kid", &sessions);

        assert_eq!(report.total_sessions, 3);
        assert_eq!(report.total_study_minutes, 45);
        assert_eq!(report.average_focus_score, 64);
        let trend: Vec<u8> = report.focus_trend.iter().map(|p| p.focus_score).collect();
        assert_eq!(trend, [40, 61, 90]);
        assert_eq!(report.recent_sessions[0].id(), "s3");
        assert!((report.emotion_averages.happy - (70.0 + 40.0 + 20.0) / 3.0).abs() < 1e-9);
    }

    #[test]
    fn keeps_only_five_recent() {
        let sessions: Vec<_> = (1..=8).map(|day| on(day, 70, 5)).collect();
        let report = ChildReport::build("kid", &sessions);
        let ids: Vec<_> = report.recent_sessions.iter().map(|s| s.id()).collect();
        assert_eq!(ids, ["s8", "s7", "s6", "s5", "s4"]);
    }

    #[tokio::test]
    async fn report_from_store_uses_demo_history() {
        let store = ProfileStore::with_demo_data(&MonogramAvatar).unwrap();
        let report = store.child_report("1").await.unwrap();
        assert_eq!(report.total_sessions, 2);
        assert_eq!(report.total_study_minutes, 55);
        assert_eq!(report.average_focus_score, 79);
    }
}
