//! Normalization constants and weighted scalarization.
//!
//! The two objectives live on very different scales (rating totals around
//! 900, chemistry totals at most 33). Before a formation is searched, each
//! objective is maximized alone; the optima become the denominators of
//!
//! ```text
//! (1 - alpha) * rating / rating_max + alpha * chemistry / chemistry_max
//! ```
//!
//! A zero optimum drops its term entirely. Chemistry can legitimately be 0
//! for a formation where no category group can reach a tier.

use crate::{
    lineup_model::LineupModel,
    model::LinearExpr,
    solver::{MilpSolver, SolveOutcome, SolverError},
};

/// Scalarization weight on chemistry, in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, derive_more::Display)]
#[display("{_0}")]
pub struct Weight(f64);

#[derive(Debug, Clone, Copy, PartialEq, derive_more::Display, derive_more::Error)]
#[display("weight {value} is not a number in [0, 1]")]
pub struct InvalidWeightError {
    value: f64,
}

impl Weight {
    pub const RATING_ONLY: Self = Self(0.0);
    pub const CHEMISTRY_ONLY: Self = Self(1.0);

    pub fn new(value: f64) -> Result<Self, InvalidWeightError> {
        if (0.0..=1.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(InvalidWeightError { value })
        }
    }

    /// `steps + 1` evenly spaced weights from 0 to 1.
    #[must_use]
    pub fn grid(steps: u32) -> Vec<Self> {
        if steps == 0 {
            return vec![Self::RATING_ONLY];
        }
        (0..=steps)
            .map(|i| Self(f64::from(i) / f64::from(steps)))
            .collect()
    }

    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for Weight {
    type Error = InvalidWeightError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Single-objective optima of one formation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Normalization {
    rating_max: u32,
    chemistry_max: u32,
}

impl Normalization {
    #[must_use]
    pub fn new(rating_max: u32, chemistry_max: u32) -> Self {
        Self {
            rating_max,
            chemistry_max,
        }
    }

    /// Solves the model twice, once per objective.
    ///
    /// Returns `Ok(None)` if the formation admits no lineup at all. The optima
    /// are read from the decoded lineups, not from the solver's objective.
    pub fn compute<S>(model: &LineupModel<'_>, solver: &S) -> Result<Option<Self>, SolverError>
    where
        S: MilpSolver + ?Sized,
    {
        let Some(rating_max) = solve_single(model, model.rating_expr(), solver)?
            .map(|lineup| lineup.rating_total())
        else {
            return Ok(None);
        };
        let Some(chemistry_max) = solve_single(model, model.chemistry_expr(), solver)?
            .map(|lineup| lineup.chemistry())
        else {
            return Ok(None);
        };
        tracing::debug!(
            formation = model.pool().formation().name(),
            rating_max,
            chemistry_max,
            "normalization computed"
        );
        Ok(Some(Self::new(rating_max, chemistry_max)))
    }

    #[must_use]
    pub fn rating_max(&self) -> u32 {
        self.rating_max
    }

    #[must_use]
    pub fn chemistry_max(&self) -> u32 {
        self.chemistry_max
    }

    /// Denominator of the rating term, 1 when the optimum is 0.
    #[must_use]
    pub fn rating_scale(&self) -> f64 {
        f64::from(self.rating_max.max(1))
    }

    /// Denominator of the chemistry term, 1 when the optimum is 0.
    #[must_use]
    pub fn chemistry_scale(&self) -> f64 {
        f64::from(self.chemistry_max.max(1))
    }

    /// Builds the weighted objective for `weight`.
    #[must_use]
    pub fn objective(&self, model: &LineupModel<'_>, weight: Weight) -> LinearExpr {
        let mut objective = LinearExpr::new();
        if self.rating_max > 0 {
            objective.add_scaled(model.rating_expr(), (1.0 - weight.0) / self.rating_scale());
        }
        if self.chemistry_max > 0 {
            objective.add_scaled(model.chemistry_expr(), weight.0 / self.chemistry_scale());
        }
        objective
    }
}

fn solve_single<S>(
    model: &LineupModel<'_>,
    objective: &LinearExpr,
    solver: &S,
) -> Result<Option<opteam_core::Lineup>, SolverError>
where
    S: MilpSolver + ?Sized,
{
    match solver.solve(&model.with_objective(objective.clone()))? {
        SolveOutcome::Optimal(solution) => model.decode(&solution).map(Some),
        SolveOutcome::Infeasible => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use opteam_core::{ChemistryRules, Formation, PlayerCatalog, PlayerRecord};

    use super::*;
    use crate::{solver::MicroLpSolver, testing};

    #[test]
    fn test_weight_bounds() {
        assert!(Weight::new(0.0).is_ok());
        assert!(Weight::new(1.0).is_ok());
        assert!(Weight::new(0.25).is_ok());
        assert!(Weight::new(-0.1).is_err());
        assert!(Weight::new(1.5).is_err());
        assert!(Weight::new(f64::NAN).is_err());
        assert!(Weight::try_from(f64::INFINITY).is_err());
    }

    #[test]
    fn test_weight_grid() {
        let grid: Vec<f64> = Weight::grid(4).into_iter().map(Weight::value).collect();
        assert_eq!(grid, vec![0.0, 0.25, 0.5, 0.75, 1.0]);
        assert_eq!(Weight::grid(0), vec![Weight::RATING_ONLY]);
    }

    #[test]
    fn test_compute_matches_enumeration() {
        let catalog = testing::catalog();
        let formation = Formation::builtin("4-4-2").unwrap();
        let rules = ChemistryRules::default();
        let model = LineupModel::build(catalog.pool(&formation).unwrap(), &rules);

        let lineups = testing::enumerate(&catalog, &formation, &rules);
        let rating_max = lineups.iter().map(|l| l.rating_total()).max().unwrap();
        let chemistry_max = lineups.iter().map(|l| l.chemistry()).max().unwrap();

        let normalization = Normalization::compute(&model, &MicroLpSolver)
            .unwrap()
            .unwrap();
        assert_eq!(normalization, Normalization::new(rating_max, chemistry_max));
    }

    #[test]
    fn test_zero_chemistry_drops_term() {
        let records = (1..=11).map(|id| PlayerRecord {
            id,
            rating: 80,
            nation: format!("N{id}"),
            league: format!("L{id}"),
            club: format!("C{id}"),
            positions: vec!["CM".to_owned()],
            ..PlayerRecord::default()
        });
        let (catalog, _) = PlayerCatalog::from_records(records);
        let formation = Formation::new("cm", ["CM"; 11]).unwrap();
        let rules = ChemistryRules::default();
        let model = LineupModel::build(catalog.pool(&formation).unwrap(), &rules);

        let normalization = Normalization::compute(&model, &MicroLpSolver)
            .unwrap()
            .unwrap();
        assert_eq!(normalization.chemistry_max(), 0);
        assert!((normalization.chemistry_scale() - 1.0).abs() < f64::EPSILON);

        let objective = normalization.objective(&model, Weight::CHEMISTRY_ONLY);
        assert!(objective.terms().iter().all(|(_, c)| c.abs() < f64::EPSILON));
        let objective = normalization.objective(&model, Weight::new(0.5).unwrap());
        assert_eq!(objective.terms().len(), model.rating_expr().terms().len());
    }
}
