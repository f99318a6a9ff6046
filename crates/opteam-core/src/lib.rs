//! Domain model for optimizing a starting lineup under a fixed formation.
//!
//! This crate holds everything the optimizer knows about the game before any
//! linear model is built:
//!
//! - [`player`] - Player records, identifiers, category memberships and the
//!   Icon/Hero special status
//! - [`formation`] - Position labels and the 11-slot formations they are
//!   arranged in (including a table of built-in formations)
//! - [`catalog`] - Validation of raw player records and the per-formation
//!   [`FormationPool`] that restricts the catalog to players eligible for at
//!   least one slot
//! - [`chemistry`] - Tier thresholds per category and the reference chemistry
//!   evaluation of an assigned lineup
//! - [`lineup`] - A complete assignment of players to slots with its two
//!   objective scores, and the Pareto dominance relation between lineups
//!
//! # Architecture
//!
//! ```text
//! PlayerRecord (raw input)
//!     ↓ validated by
//! PlayerCatalog
//!     ↓ restricted per formation to
//! FormationPool  ──→  (opteam-milp builds the MILP model from it)
//!     ↓ solver assignment evaluated by
//! ChemistryRules
//!     ↓ produces
//! Lineup (rating, chemistry)
//! ```
//!
//! # Scores
//!
//! A lineup carries two objectives, both maximized:
//!
//! - **Rating**: the average of the 11 player ratings. Internally the integer
//!   sum ([`Lineup::rating_total`]) is kept so that comparisons are exact.
//! - **Chemistry**: the sum of the 11 per-position chemistry values, each in
//!   `0..=3`, so the total lies in `0..=33`.
//!
//! Scores are always recomputed from the assignment by
//! [`ChemistryRules::player_chemistry`] and never read back from solver
//! variables.

pub use self::{catalog::*, chemistry::*, formation::*, lineup::*, player::*};

pub mod catalog;
pub mod chemistry;
pub mod formation;
pub mod lineup;
pub mod player;

/// Number of players in a starting lineup (and slots in a formation).
pub const LINEUP_SIZE: usize = 11;

/// Malformed or insufficient player, formation or lineup input.
///
/// Validation errors are fatal for the formation they concern: the search
/// driver reports them and skips that formation before any solve is attempted.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum DataValidationError {
    #[display("player {player}: rating {rating} is not a positive integer")]
    InvalidRating { player: PlayerId, rating: i64 },
    #[display("player {player}: cannot be both an Icon and a Hero")]
    ConflictingSpecialStatus { player: PlayerId },
    #[display("player {player}: no eligible position")]
    NoPositions { player: PlayerId },
    #[display("player {player}: duplicate player id")]
    DuplicatePlayer { player: PlayerId },
    #[display("unknown player id {player}")]
    UnknownPlayer { player: PlayerId },
    #[display("formation '{formation}' has {count} positions (expected {})", LINEUP_SIZE)]
    WrongPositionCount { formation: String, count: usize },
    #[display("unknown formation '{name}'")]
    UnknownFormation { name: String },
    #[display(
        "formation '{formation}': only {eligible} eligible players (need {})",
        LINEUP_SIZE
    )]
    InsufficientPlayers { formation: String, eligible: usize },
    #[display(
        "formation '{formation}': {slots} '{position}' slot(s) but only {candidates} eligible player(s)"
    )]
    UnfillablePosition {
        formation: String,
        position: Position,
        slots: usize,
        candidates: usize,
    },
    #[display("tier thresholds {thresholds:?} must be positive and strictly increasing")]
    InvalidThresholds { thresholds: [u32; TIER_COUNT] },
    #[display("lineup has {count} players (expected {})", LINEUP_SIZE)]
    WrongLineupSize { count: usize },
    #[display("player {player} appears more than once in the lineup")]
    RepeatedPlayer { player: PlayerId },
    #[display("player {player} cannot play at {position}")]
    IneligibleAssignment { player: PlayerId, position: Position },
}
