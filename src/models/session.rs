//! Study-session records.
//!
//! A `FocusSession` is created once, when a session ends, and is immutable
//! afterwards. Its emotion breakdown is derived from the focus score and
//! cannot be set on its own.

use chrono::NaiveDate;
use serde::Serialize;

pub const MIN_DURATION_MINUTES: u32 = 1;
pub const MAX_FOCUS_SCORE: u8 = 100;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Emotions {
    pub happy: u8,
    pub neutral: u8,
    pub distracted: u8,
}

impl Emotions {
    /// Bands: above 80 mostly happy, above 50 balanced, otherwise mostly distracted.
    pub fn from_focus_score(focus_score: u8) -> Self {
        if focus_score > 80 {
            Self {
                happy: 70,
                neutral: 20,
                distracted: 10,
            }
        } else if focus_score > 50 {
            Self {
                happy: 40,
                neutral: 40,
                distracted: 20,
            }
        } else {
            Self {
                happy: 20,
                neutral: 30,
                distracted: 50,
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FocusSession {
    id: String,
    child_id: String,
    date: NaiveDate,
    duration: u32,
    focus_score: u8,
    emotions: Emotions,
}

impl FocusSession {
    /// Clamps `duration` up to one minute and `focus_score` down to 100.
    pub fn new(
        id: impl Into<String>,
        child_id: impl Into<String>,
        date: NaiveDate,
        duration: u32,
        focus_score: u8,
    ) -> Self {
        let focus_score = focus_score.min(MAX_FOCUS_SCORE);
        Self {
            id: id.into(),
            child_id: child_id.into(),
            date,
            duration: duration.max(MIN_DURATION_MINUTES),
            focus_score,
            emotions: Emotions::from_focus_score(focus_score),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn child_id(&self) -> &str {
        &self.child_id
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Whole minutes, never below one.
    pub fn duration(&self) -> u32 {
        self.duration
    }

    pub fn focus_score(&self) -> u8 {
        self.focus_score
    }

    pub fn emotions(&self) -> Emotions {
        self.emotions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 9).unwrap()
    }

    #[test]
    fn band_edges() {
        assert_eq!(Emotions::from_focus_score(81).happy, 70);
        assert_eq!(Emotions::from_focus_score(80).happy, 40);
        assert_eq!(Emotions::from_focus_score(51).happy, 40);
        assert_eq!(Emotions::from_focus_score(50).happy, 20);
        assert_eq!(Emotions::from_focus_score(0).distracted, 50);
    }

    #[test]
    fn constructor_enforces_floors_and_ceilings() {
        let session = FocusSession::new("s", "c", day(), 0, 250);
        assert_eq!(session.duration(), 1);
        assert_eq!(session.focus_score(), 100);
    }

    #[test]
    fn serializes_camel_case_with_iso_date() {
        let session = FocusSession::new("s1", "c1", day(), 12, 85);
        let json = serde_json::to_value(&session).unwrap();
        assert_eq!(json["childId"], "c1");
        assert_eq!(json["focusScore"], 85);
        assert_eq!(json["date"], "2024-03-09");
        assert_eq!(json["emotions"]["happy"], 70);
    }

    proptest! {
        #[test]
        fn equal_scores_have_equal_emotions(score in 0u8..=100, a in 0u32..500, b in 0u32..500) {
            let first = FocusSession::new("a", "x", day(), a, score);
            let second = FocusSession::new("b", "y", day(), b, score);
            prop_assert_eq!(first.emotions(), second.emotions());
        }

        #[test]
        fn emotions_always_sum_to_one_hundred(score in 0u8..=255) {
            let e = Emotions::from_focus_score(score);
            prop_assert_eq!(e.happy as u32 + e.neutral as u32 + e.distracted as u32, 100);
        }
    }
}
