//! MILP encoding of the lineup optimization problem.
//!
//! This crate turns a [`FormationPool`](opteam_core::FormationPool) into a
//! mixed-integer linear program and talks to the solver:
//!
//! - [`model`] - Solver-neutral variables, linear expressions and constraints
//! - [`solver`] - The [`MilpSolver`] boundary and its `good_lp`/`microlp`
//!   implementation
//! - [`assignment`] - One binary per eligible `(player, slot)` pair, one player
//!   per slot, one slot per player
//! - [`chemistry`] - Tier indicators per category value and the player, position
//!   and final chemistry bounds, including Icon/Hero relaxation
//! - [`lineup_model`] - Composition of the two encodings with the rating and
//!   chemistry objective expressions
//! - [`scalarize`] - Normalization optima and the weighted single objective
//! - [`dominance`] - Constraints that force the next solve away from every known
//!   frontier lineup
//!
//! # Architecture
//!
//! ```text
//! FormationPool
//!     ↓ AssignmentVars + ChemistryVars
//! LineupModel (base model, no objective)
//!     ↓ Normalization::objective(weight)
//! MilpModel (scalarized copy)
//!     ↓ DominanceBreaker::apply(frontier snapshot)
//! MilpSolver::solve
//!     ↓ LineupModel::decode
//! Lineup
//! ```
//!
//! Infeasibility is reported as [`SolveOutcome::Infeasible`], never as an
//! error: it is how a search branch ends.

pub use self::{
    dominance::{DEFAULT_EPSILON, DominanceBreaker, InvalidEpsilonError},
    lineup_model::LineupModel,
    model::MilpModel,
    scalarize::{InvalidWeightError, Normalization, Weight},
    solver::{MicroLpSolver, MilpSolver, Solution, SolveOutcome, SolverError},
};

pub mod assignment;
pub mod chemistry;
pub mod dominance;
pub mod lineup_model;
pub mod model;
pub mod scalarize;
pub mod solver;

#[cfg(test)]
mod testing;
