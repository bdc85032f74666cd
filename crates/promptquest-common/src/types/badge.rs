//! Badge catalogue
//!
//! Badges are one-time achievements. Most are tied to finishing a world;
//! `prompt_master` additionally needs a high prompt score.

use serde::Serialize;

/// A badge definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Badge {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    /// World the badge is earned in
    pub world: u32,
}

/// All badges, ordered by world
pub const BADGES: [Badge; 5] = [
    Badge {
        id: "ai_explorer",
        name: "AI Explorer",
        description: "Completed World 1: AI Basics",
        icon: "🔍",
        world: 1,
    },
    Badge {
        id: "prediction_pro",
        name: "Prediction Pro",
        description: "Completed World 2: Prediction Engine",
        icon: "📊",
        world: 2,
    },
    Badge {
        id: "token_master",
        name: "Token Master",
        description: "Completed World 3: Tokenization",
        icon: "🔤",
        world: 3,
    },
    Badge {
        id: "prompt_master",
        name: "Prompt Master",
        description: "Scored 80%+ in World 4: Prompt Engineering",
        icon: "✍️",
        world: 4,
    },
    Badge {
        id: "truth_seeker",
        name: "Truth Seeker",
        description: "Detected hallucinations in World 5",
        icon: "🕵️",
        world: 5,
    },
];

/// Look up a badge by id
pub fn badge_by_id(id: &str) -> Option<&'static Badge> {
    BADGES.iter().find(|b| b.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_badge_lookup() {
        assert_eq!(badge_by_id("token_master").map(|b| b.world), Some(3));
        assert!(badge_by_id("nope").is_none());
    }

    #[test]
    fn test_badge_ids_unique() {
        let mut ids: Vec<_> = BADGES.iter().map(|b| b.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), BADGES.len());
    }
}
