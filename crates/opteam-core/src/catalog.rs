//! Player catalog and its per-formation restriction.
//!
//! [`PlayerCatalog`] holds every validated player. Before a formation is
//! optimized the catalog is narrowed to a [`FormationPool`]: the players
//! eligible for at least one slot of that formation, together with the
//! eligible `(player, slot)` pairs. Only these pairs get assignment variables
//! in the MILP model, which encodes the eligibility rule without a separate
//! constraint.
//!
//! # Validation
//!
//! [`PlayerCatalog::from_records`] discards invalid records and reports them.
//! [`PlayerCatalog::pool`] rejects a formation when it obviously cannot be
//! filled:
//!
//! - fewer than [`LINEUP_SIZE`] players are eligible for any of its slots, or
//! - some label has more slots than eligible players (e.g. two `CB` slots but
//!   a single centre-back).
//!
//! Subtler matching failures are left to the solver, which reports the model
//! as infeasible.

use std::collections::{BTreeMap, HashSet};

use crate::{
    DataValidationError, LINEUP_SIZE,
    formation::Formation,
    player::{Category, Player, PlayerId, PlayerRecord},
};

/// All validated players available to the optimizer.
#[derive(Debug, Clone, Default)]
pub struct PlayerCatalog {
    players: Vec<Player>,
}

impl PlayerCatalog {
    /// Builds a catalog from already validated players.
    ///
    /// Fails on the first repeated player id.
    pub fn new(players: Vec<Player>) -> Result<Self, DataValidationError> {
        let mut seen = HashSet::with_capacity(players.len());
        for player in &players {
            if !seen.insert(player.id()) {
                return Err(DataValidationError::DuplicatePlayer {
                    player: player.id(),
                });
            }
        }
        Ok(Self { players })
    }

    /// Validates raw records, keeping the valid ones.
    ///
    /// Returns the catalog and the errors of every discarded record. A record
    /// whose id was already accepted is discarded as a duplicate.
    pub fn from_records<I>(records: I) -> (Self, Vec<DataValidationError>)
    where
        I: IntoIterator<Item = PlayerRecord>,
    {
        let mut players = vec![];
        let mut rejected = vec![];
        let mut seen = HashSet::new();
        for record in records {
            match Player::try_from(record) {
                Ok(player) if !seen.insert(player.id()) => {
                    rejected.push(DataValidationError::DuplicatePlayer {
                        player: player.id(),
                    });
                }
                Ok(player) => players.push(player),
                Err(err) => rejected.push(err),
            }
        }
        (Self { players }, rejected)
    }

    #[must_use]
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.players.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id() == id)
    }

    /// Restricts the catalog to the players eligible for `formation`.
    pub fn pool<'a>(
        &'a self,
        formation: &'a Formation,
    ) -> Result<FormationPool<'a>, DataValidationError> {
        let mut players = vec![];
        let mut eligibility = vec![];
        for player in &self.players {
            let slots: Vec<usize> = formation
                .positions()
                .iter()
                .enumerate()
                .filter(|(_, position)| player.can_play_at(position))
                .map(|(slot, _)| slot)
                .collect();
            if slots.is_empty() {
                continue;
            }
            let index = players.len();
            players.push(player);
            eligibility.extend(slots.into_iter().map(|slot| Eligibility {
                player: index,
                slot,
            }));
        }

        if players.len() < LINEUP_SIZE {
            return Err(DataValidationError::InsufficientPlayers {
                formation: formation.name().to_owned(),
                eligible: players.len(),
            });
        }

        let mut checked = HashSet::new();
        for position in formation.positions() {
            if !checked.insert(position) {
                continue;
            }
            let slots = formation.slot_count(position);
            let candidates = players.iter().filter(|p| p.can_play_at(position)).count();
            if candidates < slots {
                return Err(DataValidationError::UnfillablePosition {
                    formation: formation.name().to_owned(),
                    position: position.clone(),
                    slots,
                    candidates,
                });
            }
        }

        Ok(FormationPool {
            formation,
            players,
            eligibility,
        })
    }
}

/// An eligible `(player, slot)` pair of a [`FormationPool`].
///
/// `player` indexes [`FormationPool::players`], `slot` indexes
/// [`Formation::positions`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Eligibility {
    pub player: usize,
    pub slot: usize,
}

/// The catalog restricted to one formation.
#[derive(Debug, Clone)]
pub struct FormationPool<'a> {
    formation: &'a Formation,
    players: Vec<&'a Player>,
    eligibility: Vec<Eligibility>,
}

impl<'a> FormationPool<'a> {
    #[must_use]
    pub fn formation(&self) -> &'a Formation {
        self.formation
    }

    /// Players eligible for at least one slot, in catalog order.
    #[must_use]
    pub fn players(&self) -> &[&'a Player] {
        &self.players
    }

    #[must_use]
    pub fn player(&self, index: usize) -> &'a Player {
        self.players[index]
    }

    /// Eligible pairs, sorted by player then slot.
    #[must_use]
    pub fn eligibility(&self) -> &[Eligibility] {
        &self.eligibility
    }

    #[must_use]
    pub fn index_of(&self, id: PlayerId) -> Option<usize> {
        self.players.iter().position(|p| p.id() == id)
    }

    /// Groups pool players by their value for `category`.
    ///
    /// Only values held by at least one pool player appear, so every group is
    /// non-empty.
    #[must_use]
    pub fn category_groups(&self, category: Category) -> BTreeMap<&'a str, Vec<usize>> {
        let mut groups: BTreeMap<&'a str, Vec<usize>> = BTreeMap::new();
        for (index, player) in self.players.iter().enumerate() {
            groups
                .entry(player.category_value(category))
                .or_default()
                .push(index);
        }
        groups
    }
}
