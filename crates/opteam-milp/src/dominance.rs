//! Dominance-breaking constraints.
//!
//! For every lineup `p` already on the frontier, the next solve must return a
//! lineup that is neither a repeat of `p`'s player set nor dominated by `p`.
//! With `R`, `C` the model's rating and chemistry totals and `R_max`, `C_max`
//! the normalization denominators, the generator adds:
//!
//! ```text
//! overlap(p)                              <= 10
//! R - (R_p + eps * R_max) * br            >= 0      br binary
//! C - (C_p + eps * C_max) * bc            >= 0      bc binary
//! R_p * rr - R                            <= 0      rr in [0, 1]
//! C_p * rc - C                            <= 0      rc in [0, 1]
//! br + bc + rr / 2 + rc / 2               >= 1
//! ```
//!
//! These are the normalized comparisons multiplied through by the (positive)
//! denominators. `br` can only be set by a strict rating improvement of at
//! least `eps` in normalized units, `rr` can only reach 1 when `R >= R_p`.
//! Without a strict improvement the last row needs `rr = rc = 1`, i.e. equal
//! scores, which together with the overlap row means a different player set.
//!
//! `p` may come from another formation, so its scores can exceed this
//! formation's optima; no constraint assumes otherwise.

use opteam_core::{LINEUP_SIZE, Lineup};

use crate::{
    lineup_model::LineupModel,
    model::{LinearExpr, MilpModel, Relation},
    scalarize::Normalization,
};

/// Default strict-improvement tolerance, in normalized objective units.
///
/// Half of the smallest normalized rating step of an 11-player squad rated up
/// to 99.
#[expect(clippy::cast_precision_loss)]
pub const DEFAULT_EPSILON: f64 = 1.0 / (2.0 * LINEUP_SIZE as f64 * 99.0);

#[derive(Debug, Clone, Copy, PartialEq, derive_more::Display, derive_more::Error)]
#[display("epsilon {value} is not a positive finite number")]
pub struct InvalidEpsilonError {
    value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DominanceBreaker {
    epsilon: f64,
}

impl Default for DominanceBreaker {
    fn default() -> Self {
        Self {
            epsilon: DEFAULT_EPSILON,
        }
    }
}

impl DominanceBreaker {
    pub fn new(epsilon: f64) -> Result<Self, InvalidEpsilonError> {
        if epsilon.is_finite() && epsilon > 0.0 {
            Ok(Self { epsilon })
        } else {
            Err(InvalidEpsilonError { value: epsilon })
        }
    }

    #[must_use]
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Returns `true` if `epsilon` is smaller than one raw unit of either
    /// objective after normalization.
    ///
    /// Otherwise a strict improvement of a single rating point or chemistry
    /// point cannot satisfy the improvement rows and genuine frontier points
    /// are missed.
    #[must_use]
    pub fn is_resolvable(&self, normalization: &Normalization) -> bool {
        self.epsilon * normalization.rating_scale() < 1.0
            && self.epsilon * normalization.chemistry_scale() < 1.0
    }

    /// Adds the constraints for every lineup of `frontier` to `milp`.
    ///
    /// `milp` must be a copy of `model`'s base model. Returns the number of
    /// lineups that produced constraints.
    #[expect(clippy::cast_precision_loss)]
    pub fn apply(
        &self,
        milp: &mut MilpModel,
        model: &LineupModel<'_>,
        normalization: &Normalization,
        frontier: &[Lineup],
    ) -> usize {
        let rating = model.rating_expr();
        let chemistry = model.chemistry_expr();
        let rating_step = self.epsilon * normalization.rating_scale();
        let chemistry_step = self.epsilon * normalization.chemistry_scale();

        for (n, known) in frontier.iter().enumerate() {
            // a lineup with fewer than 11 players in this pool cannot be repeated
            if model.count_in_pool(known.player_ids()) == LINEUP_SIZE {
                milp.add_constraint(
                    model.overlap_expr(known),
                    Relation::LessEq,
                    (LINEUP_SIZE - 1) as f64,
                );
            }

            let known_rating = f64::from(known.rating_total());
            let known_chemistry = f64::from(known.chemistry());

            let rating_better = milp.binary(format!("br[{n}]"));
            let chemistry_better = milp.binary(format!("bc[{n}]"));
            let rating_ratio = milp.continuous(format!("rr[{n}]"), 0.0, 1.0);
            let chemistry_ratio = milp.continuous(format!("rc[{n}]"), 0.0, 1.0);

            let mut improves = rating.clone();
            improves.add_term(rating_better, -(known_rating + rating_step));
            milp.add_constraint(improves, Relation::GreaterEq, 0.0);

            let mut improves = chemistry.clone();
            improves.add_term(chemistry_better, -(known_chemistry + chemistry_step));
            milp.add_constraint(improves, Relation::GreaterEq, 0.0);

            let mut ratio = LinearExpr::new().with_term(rating_ratio, known_rating);
            ratio.add_scaled(rating, -1.0);
            milp.add_constraint(ratio, Relation::LessEq, 0.0);

            let mut ratio = LinearExpr::new().with_term(chemistry_ratio, known_chemistry);
            ratio.add_scaled(chemistry, -1.0);
            milp.add_constraint(ratio, Relation::LessEq, 0.0);

            let escape = LinearExpr::new()
                .with_term(rating_better, 1.0)
                .with_term(chemistry_better, 1.0)
                .with_term(rating_ratio, 0.5)
                .with_term(chemistry_ratio, 0.5);
            milp.add_constraint(escape, Relation::GreaterEq, 1.0);
        }
        frontier.len()
    }
}
