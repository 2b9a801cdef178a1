//! Child-facing feedback derived from the live attention score: the focus
//! pet's mood and the indicator strip under the camera feed.

use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum PetMood {
    Happy,
    Neutral,
    Sad,
}

impl PetMood {
    pub fn from_attention(attention: f64) -> Self {
        if attention > 80.0 {
            PetMood::Happy
        } else if attention > 50.0 {
            PetMood::Neutral
        } else {
            PetMood::Sad
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            PetMood::Happy => "Amazing focus! Keep it up!",
            PetMood::Neutral => "You're doing okay. Stay focused!",
            PetMood::Sad => "Oops! Let's get back to work.",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum AttentionLevel {
    Great,
    Fair,
    Low,
}

impl AttentionLevel {
    pub fn from_attention(attention: f64) -> Self {
        match PetMood::from_attention(attention) {
            PetMood::Happy => AttentionLevel::Great,
            PetMood::Neutral => AttentionLevel::Fair,
            PetMood::Sad => AttentionLevel::Low,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            AttentionLevel::Great => "Great focus!",
            AttentionLevel::Fair => "Stay focused!",
            AttentionLevel::Low => "Look at the screen!",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mood_bands_are_exclusive_at_the_edges() {
        assert_eq!(PetMood::from_attention(80.1), PetMood::Happy);
        assert_eq!(PetMood::from_attention(80.0), PetMood::Neutral);
        assert_eq!(PetMood::from_attention(50.0), PetMood::Sad);
        assert_eq!(AttentionLevel::from_attention(95.0).message(), "Great focus!");
        assert_eq!(AttentionLevel::from_attention(10.0), AttentionLevel::Low);
    }
}
