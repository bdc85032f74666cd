//! Level tiers - the XP ladder a learner climbs
//!
//! Ten fixed tiers partition `[0, ∞)` contiguously. A tier owns its lower
//! bound: a learner sitting exactly on a threshold belongs to the higher
//! tier at 0% progress, never to the lower tier at 100%.

use serde::Serialize;

/// One rung of the XP ladder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LevelTier {
    /// Numeric level (1-10)
    pub level: u8,
    /// Display title
    pub title: &'static str,
    /// Inclusive lower XP bound
    pub min_xp: u64,
    /// Exclusive upper XP bound, `None` for the final tier
    pub max_xp: Option<u64>,
    /// Badge colour used by the dashboard
    pub color: &'static str,
}

impl LevelTier {
    /// Whether this tier has no upper bound
    #[inline]
    pub fn is_unbounded(&self) -> bool {
        self.max_xp.is_none()
    }

    /// Whether `xp` falls inside this tier
    pub fn contains(&self, xp: u64) -> bool {
        xp >= self.min_xp && self.max_xp.map_or(true, |max| xp < max)
    }
}

/// The fixed tier table, ascending by `min_xp`
pub const LEVEL_TIERS: [LevelTier; 10] = [
    LevelTier { level: 1, title: "Beginner", min_xp: 0, max_xp: Some(100), color: "#6c757d" },
    LevelTier { level: 2, title: "Explorer", min_xp: 100, max_xp: Some(250), color: "#20c997" },
    LevelTier { level: 3, title: "Learner", min_xp: 250, max_xp: Some(450), color: "#0dcaf0" },
    LevelTier { level: 4, title: "Thinker", min_xp: 450, max_xp: Some(700), color: "#0d6efd" },
    LevelTier { level: 5, title: "Intermediate", min_xp: 700, max_xp: Some(1000), color: "#6610f2" },
    LevelTier { level: 6, title: "Practitioner", min_xp: 1000, max_xp: Some(1400), color: "#d63384" },
    LevelTier { level: 7, title: "Analyst", min_xp: 1400, max_xp: Some(1900), color: "#fd7e14" },
    LevelTier { level: 8, title: "Advanced", min_xp: 1900, max_xp: Some(2500), color: "#ffc107" },
    LevelTier { level: 9, title: "Master", min_xp: 2500, max_xp: Some(3200), color: "#dc3545" },
    LevelTier { level: 10, title: "AI Expert", min_xp: 3200, max_xp: None, color: "#D4A017" },
];

/// A learner's resolved position on the ladder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LevelStatus {
    /// The tier the learner is in
    #[serde(flatten)]
    pub tier: LevelTier,
    /// XP the status was resolved for
    pub current_xp: u64,
    /// Percent of the way through the tier (0-100)
    pub progress: u8,
    /// XP at which the next tier starts, `None` at the top
    pub next_level_xp: Option<u64>,
}

/// Resolve the tier and in-tier progress for an XP total.
///
/// Total over all `u64`; the final tier always reports 100% progress.
/// Progress is rounded to the nearest percent, so the last few XP of a
/// wide tier may already read 100.
pub fn resolve_level(xp: u64) -> LevelStatus {
    let tier = LEVEL_TIERS
        .iter()
        .rev()
        .find(|tier| tier.min_xp <= xp)
        .copied()
        .unwrap_or(LEVEL_TIERS[0]);

    let progress = match tier.max_xp {
        None => 100,
        Some(max_xp) => {
            let span = max_xp - tier.min_xp;
            let into = xp - tier.min_xp;
            // round half up, integer-only
            ((into * 200 + span) / (span * 2)) as u8
        }
    };

    LevelStatus {
        tier,
        current_xp: xp,
        progress,
        next_level_xp: tier.max_xp,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_tiers_are_contiguous() {
        assert_eq!(LEVEL_TIERS[0].min_xp, 0);
        for pair in LEVEL_TIERS.windows(2) {
            assert_eq!(pair[0].max_xp, Some(pair[1].min_xp));
            assert_eq!(pair[0].level + 1, pair[1].level);
        }
        assert!(LEVEL_TIERS[9].is_unbounded());
    }

    #[test]
    fn test_zero_xp_is_beginner() {
        let status = resolve_level(0);
        assert_eq!(status.tier.level, 1);
        assert_eq!(status.tier.title, "Beginner");
        assert_eq!(status.progress, 0);
        assert_eq!(status.next_level_xp, Some(100));
    }

    #[test]
    fn test_threshold_belongs_to_higher_tier() {
        let status = resolve_level(100);
        assert_eq!(status.tier.level, 2);
        assert_eq!(status.tier.title, "Explorer");
        assert_eq!(status.progress, 0);

        let status = resolve_level(250);
        assert_eq!(status.tier.level, 3);
        assert_eq!(status.tier.title, "Learner");
        assert_eq!(status.progress, 0);
    }

    #[test]
    fn test_progress_rounds() {
        // 99 of 100 -> 99%
        assert_eq!(resolve_level(99).progress, 99);
        // Explorer spans 150; 175 is 75 in -> 50%
        assert_eq!(resolve_level(175).progress, 50);
        // 101 is 1/150 in -> 0.67% rounds to 1
        assert_eq!(resolve_level(101).progress, 1);
    }

    #[test]
    fn test_top_tier_is_full() {
        let status = resolve_level(3200);
        assert_eq!(status.tier.level, 10);
        assert_eq!(status.tier.title, "AI Expert");
        assert_eq!(status.progress, 100);
        assert_eq!(status.next_level_xp, None);

        assert_eq!(resolve_level(u64::MAX).progress, 100);
    }

    proptest! {
        #[test]
        fn prop_tier_contains_xp(xp in 0u64..10_000_000) {
            let status = resolve_level(xp);
            prop_assert!(status.tier.min_xp <= xp);
            prop_assert!(status.tier.contains(xp));
        }

        #[test]
        fn prop_progress_bounded(xp in 0u64..10_000_000) {
            let status = resolve_level(xp);
            prop_assert!(status.progress <= 100);
            if xp >= 3200 {
                prop_assert_eq!(status.progress, 100);
            }
        }
    }
}
