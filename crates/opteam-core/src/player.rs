//! Players and their category memberships.
//!
//! A [`Player`] is immutable once validated. Raw input arrives as a
//! [`PlayerRecord`] (the shape an external data loader produces) and is turned
//! into a `Player` by [`Player::try_from`], which enforces:
//!
//! - the rating is a positive integer,
//! - at least one position is listed,
//! - Icon and Hero are mutually exclusive.
//!
//! # Categories
//!
//! Chemistry is computed over three categories ([`Category`]): nation, league
//! and club. Every player belongs to exactly one value of each. Icons count
//! twice towards their nation's headcount and Heroes count twice towards their
//! league's headcount (see [`Player::headcount_weight`]).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{DataValidationError, formation::Position};

/// Stable identifier of a player within a catalog.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[serde(transparent)]
#[display("#{_0}")]
pub struct PlayerId(pub u32);

/// Grouping dimension used by the chemistry rules.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    #[display("nation")]
    Nation,
    #[display("league")]
    League,
    #[display("club")]
    Club,
}

impl Category {
    pub const ALL: [Self; 3] = [Self::Nation, Self::League, Self::Club];
}

/// Special card status. Icon and Hero are mutually exclusive by construction.
#[derive(
    Default, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::IsVariant,
)]
#[serde(rename_all = "snake_case")]
pub enum SpecialStatus {
    #[default]
    Regular,
    Icon,
    Hero,
}

/// Raw player data as supplied by an external loader.
///
/// `rating` is signed so that malformed input can be represented and rejected
/// instead of failing at deserialization time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub id: u32,
    #[serde(default)]
    pub name: String,
    pub rating: i64,
    pub nation: String,
    pub league: String,
    pub club: String,
    /// Preferred position first, then alternates.
    pub positions: Vec<String>,
    #[serde(default)]
    pub is_icon: bool,
    #[serde(default)]
    pub is_hero: bool,
}

/// A validated player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    id: PlayerId,
    name: String,
    rating: u32,
    nation: String,
    league: String,
    club: String,
    positions: Vec<Position>,
    status: SpecialStatus,
}

impl TryFrom<PlayerRecord> for Player {
    type Error = DataValidationError;

    fn try_from(record: PlayerRecord) -> Result<Self, Self::Error> {
        let id = PlayerId(record.id);
        let rating = u32::try_from(record.rating)
            .ok()
            .filter(|r| *r > 0)
            .ok_or(DataValidationError::InvalidRating {
                player: id,
                rating: record.rating,
            })?;
        let status = match (record.is_icon, record.is_hero) {
            (false, false) => SpecialStatus::Regular,
            (true, false) => SpecialStatus::Icon,
            (false, true) => SpecialStatus::Hero,
            (true, true) => return Err(DataValidationError::ConflictingSpecialStatus { player: id }),
        };
        let mut positions: Vec<Position> = Vec::with_capacity(record.positions.len());
        for label in record.positions {
            let position = Position::new(label);
            if !position.as_str().is_empty() && !positions.contains(&position) {
                positions.push(position);
            }
        }
        if positions.is_empty() {
            return Err(DataValidationError::NoPositions { player: id });
        }
        Ok(Self {
            id,
            name: record.name,
            rating,
            nation: record.nation,
            league: record.league,
            club: record.club,
            positions,
            status,
        })
    }
}

impl Player {
    #[must_use]
    pub fn id(&self) -> PlayerId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn rating(&self) -> u32 {
        self.rating
    }

    #[must_use]
    pub fn status(&self) -> SpecialStatus {
        self.status
    }

    #[must_use]
    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    #[must_use]
    pub fn can_play_at(&self, position: &Position) -> bool {
        self.positions.contains(position)
    }

    /// Returns the value this player holds for `category`.
    #[must_use]
    pub fn category_value(&self, category: Category) -> &str {
        match category {
            Category::Nation => &self.nation,
            Category::League => &self.league,
            Category::Club => &self.club,
        }
    }

    /// Number of heads this player counts as in its `category` group.
    ///
    /// Icons count as 2 for their nation, Heroes count as 2 for their league.
    #[must_use]
    pub fn headcount_weight(&self, category: Category) -> u32 {
        match (self.status, category) {
            (SpecialStatus::Icon, Category::Nation) | (SpecialStatus::Hero, Category::League) => 2,
            _ => 1,
        }
    }

    /// Icons and Heroes always play at maximum chemistry.
    #[must_use]
    pub fn has_forced_max_chemistry(&self) -> bool {
        !self.status.is_regular()
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name.is_empty() {
            write!(f, "{} ({})", self.id, self.rating)
        } else {
            write!(f, "{} {} ({})", self.id, self.name, self.rating)
        }
    }
}
