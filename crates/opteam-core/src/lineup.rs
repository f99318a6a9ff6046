//! Evaluated lineups and the Pareto dominance relation.

use std::{cmp::Ordering, collections::BTreeSet};

use serde::Serialize;

use crate::{
    DataValidationError, LINEUP_SIZE,
    chemistry::ChemistryRules,
    formation::{Formation, Position},
    player::{Player, PlayerId},
};

/// One filled slot of a [`Lineup`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineupSlot {
    pub position: Position,
    pub player: PlayerId,
    pub name: String,
    pub rating: u32,
    /// Final chemistry of this position, in `0..=3`.
    pub chemistry: u32,
}

/// A complete assignment of 11 players to the slots of a formation.
///
/// Lineups are only created by [`Lineup::evaluate`], so the scores always
/// match the assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Lineup {
    formation: String,
    slots: Vec<LineupSlot>,
    rating_total: u32,
    chemistry: u32,
}

impl Lineup {
    /// Scores the assignment `players[k] -> formation.positions()[k]`.
    pub fn evaluate(
        formation: &Formation,
        players: &[&Player],
        rules: &ChemistryRules,
    ) -> Result<Self, DataValidationError> {
        if players.len() != LINEUP_SIZE {
            return Err(DataValidationError::WrongLineupSize {
                count: players.len(),
            });
        }
        let mut seen = BTreeSet::new();
        for (player, position) in players.iter().zip(formation.positions()) {
            if !seen.insert(player.id()) {
                return Err(DataValidationError::RepeatedPlayer {
                    player: player.id(),
                });
            }
            if !player.can_play_at(position) {
                return Err(DataValidationError::IneligibleAssignment {
                    player: player.id(),
                    position: position.clone(),
                });
            }
        }

        let chemistry = rules.player_chemistry(players);
        let slots: Vec<LineupSlot> = players
            .iter()
            .zip(formation.positions())
            .zip(chemistry)
            .map(|((player, position), chemistry)| LineupSlot {
                position: position.clone(),
                player: player.id(),
                name: player.name().to_owned(),
                rating: player.rating(),
                chemistry,
            })
            .collect();

        Ok(Self {
            formation: formation.name().to_owned(),
            rating_total: slots.iter().map(|s| s.rating).sum(),
            chemistry: slots.iter().map(|s| s.chemistry).sum(),
            slots,
        })
    }

    #[must_use]
    pub fn formation(&self) -> &str {
        &self.formation
    }

    #[must_use]
    pub fn slots(&self) -> &[LineupSlot] {
        &self.slots
    }

    /// Sum of the 11 ratings.
    #[must_use]
    pub fn rating_total(&self) -> u32 {
        self.rating_total
    }

    /// Average rating of the 11 players.
    #[must_use]
    #[expect(clippy::cast_precision_loss)]
    pub fn rating(&self) -> f64 {
        f64::from(self.rating_total) / LINEUP_SIZE as f64
    }

    /// Sum of the 11 per-position chemistry values.
    #[must_use]
    pub fn chemistry(&self) -> u32 {
        self.chemistry
    }

    #[must_use]
    pub fn player_ids(&self) -> BTreeSet<PlayerId> {
        self.slots.iter().map(|s| s.player).collect()
    }

    /// Returns `true` if both lineups field the same 11 players, regardless
    /// of formation or slot order.
    #[must_use]
    pub fn has_same_players(&self, other: &Self) -> bool {
        self.player_ids() == other.player_ids()
    }

    /// Returns `true` if `self` is at least as good as `other` on both
    /// objectives and strictly better on one.
    #[must_use]
    pub fn dominates(&self, other: &Self) -> bool {
        let rating = self.rating_total.cmp(&other.rating_total);
        let chemistry = self.chemistry.cmp(&other.chemistry);
        rating.is_ge()
            && chemistry.is_ge()
            && (rating, chemistry) != (Ordering::Equal, Ordering::Equal)
    }
}
