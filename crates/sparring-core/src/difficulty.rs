//! Difficulty tiers and the engine settings each one maps to.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Upper bound on any tier's think time.
pub const MAX_THINK_TIME_MS: u64 = 300;

/// How hard the opponent plays, ordered from weakest to strongest.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyTier {
    #[default]
    #[serde(alias = "sleeping")]
    Weakest,
    #[serde(alias = "blindfold")]
    Intermediate,
    #[serde(alias = "nani")]
    Strongest,
}

impl DifficultyTier {
    pub const ALL: [DifficultyTier; 3] = [
        DifficultyTier::Weakest,
        DifficultyTier::Intermediate,
        DifficultyTier::Strongest,
    ];

    /// Canonical lowercase name.
    pub const fn name(self) -> &'static str {
        match self {
            DifficultyTier::Weakest => "weakest",
            DifficultyTier::Intermediate => "intermediate",
            DifficultyTier::Strongest => "strongest",
        }
    }

    /// Engine settings for this tier.
    pub const fn profile(self) -> EngineProfile {
        profile_for(self)
    }
}

impl fmt::Display for DifficultyTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown difficulty tier: '{0}'")]
pub struct ParseTierError(pub String);

impl FromStr for DifficultyTier {
    type Err = ParseTierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "weakest" | "sleeping" => Ok(DifficultyTier::Weakest),
            "intermediate" | "blindfold" => Ok(DifficultyTier::Intermediate),
            "strongest" | "nani" => Ok(DifficultyTier::Strongest),
            _ => Err(ParseTierError(s.to_string())),
        }
    }
}

/// Strength settings handed to the oracle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EngineProfile {
    /// Engine skill level, 0-20.
    pub skill_level: u8,
    /// Target playing strength; `None` means unrestricted.
    pub target_rating: Option<u32>,
    /// Maximum search depth; `None` means unrestricted.
    pub search_depth: Option<u32>,
    /// Search budget per reply.
    pub think_time_ms: u64,
}

/// Looks up the engine settings for a tier.
pub const fn profile_for(tier: DifficultyTier) -> EngineProfile {
    match tier {
        DifficultyTier::Weakest => EngineProfile {
            skill_level: 1,
            target_rating: Some(400),
            search_depth: Some(1),
            think_time_ms: 100,
        },
        DifficultyTier::Intermediate => EngineProfile {
            skill_level: 8,
            target_rating: Some(1200),
            search_depth: Some(8),
            think_time_ms: 200,
        },
        DifficultyTier::Strongest => EngineProfile {
            skill_level: 20,
            target_rating: None,
            search_depth: None,
            think_time_ms: MAX_THINK_TIME_MS,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiers_parse_canonical_and_legacy_names() {
        assert_eq!("weakest".parse(), Ok(DifficultyTier::Weakest));
        assert_eq!(" Intermediate ".parse(), Ok(DifficultyTier::Intermediate));
        assert_eq!("STRONGEST".parse(), Ok(DifficultyTier::Strongest));
        assert_eq!("sleeping".parse(), Ok(DifficultyTier::Weakest));
        assert_eq!("blindfold".parse(), Ok(DifficultyTier::Intermediate));
        assert_eq!("nani".parse(), Ok(DifficultyTier::Strongest));
    }

    #[test]
    fn unknown_tier_is_rejected() {
        let err = "grandmaster".parse::<DifficultyTier>().unwrap_err();
        assert_eq!(err, ParseTierError("grandmaster".to_string()));
        assert!("".parse::<DifficultyTier>().is_err());
    }

    #[test]
    fn tiers_are_ordered_by_strength() {
        assert!(DifficultyTier::Weakest < DifficultyTier::Intermediate);
        assert!(DifficultyTier::Intermediate < DifficultyTier::Strongest);
        assert_eq!(DifficultyTier::default(), DifficultyTier::Weakest);
    }

    #[test]
    fn profile_table() {
        let weakest = profile_for(DifficultyTier::Weakest);
        assert_eq!(weakest.skill_level, 1);
        assert_eq!(weakest.target_rating, Some(400));
        assert_eq!(weakest.search_depth, Some(1));
        assert_eq!(weakest.think_time_ms, 100);

        let mid = profile_for(DifficultyTier::Intermediate);
        assert_eq!(mid.skill_level, 8);
        assert_eq!(mid.target_rating, Some(1200));
        assert_eq!(mid.think_time_ms, 200);

        let strongest = profile_for(DifficultyTier::Strongest);
        assert_eq!(strongest.skill_level, 20);
        assert_eq!(strongest.target_rating, None);
        assert_eq!(strongest.search_depth, None);
        assert_eq!(strongest.think_time_ms, 300);
    }

    #[test]
    fn think_time_is_bounded_and_grows_with_strength() {
        let mut previous = 0;
        for tier in DifficultyTier::ALL {
            let think = tier.profile().think_time_ms;
            assert!(think <= MAX_THINK_TIME_MS);
            assert!(think > previous);
            previous = think;
        }
    }

    #[test]
    fn tier_serde_uses_lowercase_names() {
        assert_eq!(
            serde_json::to_string(&DifficultyTier::Intermediate).unwrap(),
            "\"intermediate\""
        );
        let legacy: DifficultyTier = serde_json::from_str("\"nani\"").unwrap();
        assert_eq!(legacy, DifficultyTier::Strongest);
        assert_eq!(DifficultyTier::Weakest.to_string(), "weakest");
    }
}
