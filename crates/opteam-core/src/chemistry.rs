//! Chemistry tier thresholds and reference chemistry evaluation.
//!
//! # Rules
//!
//! For each category (nation, league, club) the players of a lineup are
//! grouped by their category value. Each group's headcount (Icons count 2 for
//! their nation, Heroes count 2 for their league) unlocks a tier:
//!
//! ```text
//! tier 0  headcount <  t1
//! tier 1  t1 <= headcount < t2
//! tier 2  t2 <= headcount < t3
//! tier 3  t3 <= headcount
//! ```
//!
//! A regular player's chemistry is the sum of the tiers unlocked by its
//! nation, league and club groups, capped at [`MAX_CHEMISTRY`]. Icons and
//! Heroes always have [`MAX_CHEMISTRY`].
//!
//! This module evaluates the rules directly on an assignment. The MILP model
//! in `opteam-milp` encodes the same rules as linear constraints; both must
//! agree on every lineup.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{DataValidationError, player::Category, player::Player};

/// Highest chemistry a single position can reach.
pub const MAX_CHEMISTRY: u32 = 3;

/// Number of unlockable tiers per category.
pub const TIER_COUNT: usize = 3;

/// Minimum headcounts for tiers 1, 2 and 3 of one category.
///
/// Invariant: thresholds are positive and strictly increasing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "[u32; 3]", into = "[u32; 3]")]
pub struct TierThresholds([u32; TIER_COUNT]);

impl TryFrom<[u32; TIER_COUNT]> for TierThresholds {
    type Error = DataValidationError;

    fn try_from(thresholds: [u32; TIER_COUNT]) -> Result<Self, Self::Error> {
        Self::new(thresholds)
    }
}

impl From<TierThresholds> for [u32; TIER_COUNT] {
    fn from(thresholds: TierThresholds) -> Self {
        thresholds.0
    }
}

impl TierThresholds {
    pub fn new(thresholds: [u32; TIER_COUNT]) -> Result<Self, DataValidationError> {
        let positive = thresholds[0] > 0;
        let increasing = thresholds.windows(2).all(|w| w[0] < w[1]);
        if positive && increasing {
            Ok(Self(thresholds))
        } else {
            Err(DataValidationError::InvalidThresholds { thresholds })
        }
    }

    /// Iterates `(tier, threshold)` pairs for tiers 1 to 3.
    pub fn tiers(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        (1..).zip(self.0.iter().copied())
    }

    /// Highest tier unlocked by `headcount` (0 when none is).
    #[must_use]
    pub fn tier_for(&self, headcount: u32) -> u32 {
        self.tiers()
            .filter(|(_, threshold)| headcount >= *threshold)
            .map(|(tier, _)| tier)
            .last()
            .unwrap_or(0)
    }
}

/// Tier thresholds for all three categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChemistryRules {
    pub nation: TierThresholds,
    pub league: TierThresholds,
    pub club: TierThresholds,
}

impl Default for ChemistryRules {
    fn default() -> Self {
        Self {
            nation: TierThresholds([2, 5, 8]),
            league: TierThresholds([3, 5, 8]),
            club: TierThresholds([2, 5, 8]),
        }
    }
}

impl ChemistryRules {
    #[must_use]
    pub fn thresholds(&self, category: Category) -> &TierThresholds {
        match category {
            Category::Nation => &self.nation,
            Category::League => &self.league,
            Category::Club => &self.club,
        }
    }

    /// Computes the final chemistry of each player in `players`.
    ///
    /// `players` is the full set of assigned players (normally one per slot);
    /// the returned values are in the same order.
    #[must_use]
    pub fn player_chemistry(&self, players: &[&Player]) -> Vec<u32> {
        let mut headcounts: HashMap<(Category, &str), u32> = HashMap::new();
        for player in players {
            for category in Category::ALL {
                *headcounts
                    .entry((category, player.category_value(category)))
                    .or_default() += player.headcount_weight(category);
            }
        }

        players
            .iter()
            .map(|player| {
                if player.has_forced_max_chemistry() {
                    return MAX_CHEMISTRY;
                }
                let points: u32 = Category::ALL
                    .into_iter()
                    .map(|category| {
                        let headcount = headcounts[&(category, player.category_value(category))];
                        self.thresholds(category).tier_for(headcount)
                    })
                    .sum();
                points.min(MAX_CHEMISTRY)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::PlayerRecord;

    fn player(id: u32, nation: &str, league: &str, club: &str) -> Player {
        Player::try_from(PlayerRecord {
            id,
            rating: 80,
            nation: nation.to_owned(),
            league: league.to_owned(),
            club: club.to_owned(),
            positions: vec!["CM".to_owned()],
            ..PlayerRecord::default()
        })
        .unwrap()
    }

    #[test]
    fn test_thresholds_must_increase() {
        assert!(TierThresholds::new([2, 5, 8]).is_ok());
        assert!(TierThresholds::new([2, 2, 8]).is_err());
        assert!(TierThresholds::new([0, 5, 8]).is_err());
        assert!(TierThresholds::new([8, 5, 2]).is_err());
    }

    #[test]
    fn test_tier_for() {
        let t = TierThresholds::new([2, 5, 8]).unwrap();
        assert_eq!(t.tier_for(0), 0);
        assert_eq!(t.tier_for(1), 0);
        assert_eq!(t.tier_for(2), 1);
        assert_eq!(t.tier_for(4), 1);
        assert_eq!(t.tier_for(5), 2);
        assert_eq!(t.tier_for(8), 3);
        assert_eq!(t.tier_for(11), 3);
    }

    #[test]
    fn test_rules_json_roundtrip_validates() {
        let rules = ChemistryRules::default();
        let json = serde_json::to_string(&rules).unwrap();
        assert_eq!(json, r#"{"nation":[2,5,8],"league":[3,5,8],"club":[2,5,8]}"#);
        let bad = r#"{"nation":[2,5,8],"league":[5,3,8],"club":[2,5,8]}"#;
        assert!(serde_json::from_str::<ChemistryRules>(bad).is_err());
    }

    #[test]
    fn test_two_nation_players_unlock_tier_one() {
        let rules = ChemistryRules::default();
        let a = player(1, "A", "L1", "C1");
        let b = player(2, "A", "L2", "C2");
        let c = player(3, "B", "L3", "C3");
        let chem = rules.player_chemistry(&[&a, &b, &c]);
        assert_eq!(chem, vec![1, 1, 0]);
    }

    #[test]
    fn test_five_nation_players_unlock_tier_two() {
        let rules = ChemistryRules::default();
        let players: Vec<Player> = (0..5)
            .map(|i| player(i, "A", &format!("L{i}"), &format!("C{i}")))
            .collect();
        let refs: Vec<&Player> = players.iter().collect();
        assert_eq!(rules.player_chemistry(&refs), vec![2; 5]);
    }

    #[test]
    fn test_chemistry_is_capped() {
        let rules = ChemistryRules::default();
        let players: Vec<Player> = (0..8).map(|i| player(i, "A", "L", "C")).collect();
        let refs: Vec<&Player> = players.iter().collect();
        assert_eq!(rules.player_chemistry(&refs), vec![MAX_CHEMISTRY; 8]);
    }

    #[test]
    fn test_icon_counts_double_and_has_max_chemistry() {
        let rules = ChemistryRules::default();
        let icon = Player::try_from(PlayerRecord {
            id: 10,
            rating: 95,
            nation: "A".to_owned(),
            league: "Icons".to_owned(),
            club: "Icons".to_owned(),
            positions: vec!["ST".to_owned()],
            is_icon: true,
            ..PlayerRecord::default()
        })
        .unwrap();
        let mate = player(1, "A", "L1", "C1");
        let loner = player(2, "B", "L2", "C2");
        // icon (2) + mate (1) = 3 heads for nation A: tier 1
        let chem = rules.player_chemistry(&[&icon, &mate, &loner]);
        assert_eq!(chem, vec![MAX_CHEMISTRY, 1, 0]);
    }

    #[test]
    fn test_isolated_icon_still_has_max_chemistry() {
        let rules = ChemistryRules::default();
        let icon = Player::try_from(PlayerRecord {
            id: 10,
            rating: 95,
            nation: "X".to_owned(),
            league: "Y".to_owned(),
            club: "Z".to_owned(),
            positions: vec!["ST".to_owned()],
            is_icon: true,
            ..PlayerRecord::default()
        })
        .unwrap();
        assert_eq!(rules.player_chemistry(&[&icon]), vec![MAX_CHEMISTRY]);
    }
}
