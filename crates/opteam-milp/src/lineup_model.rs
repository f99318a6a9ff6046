//! The complete lineup model of one formation.
//!
//! [`LineupModel`] composes the assignment and chemistry encodings into a
//! base [`MilpModel`] without an objective, and exposes the two objective
//! expressions. Scalarized and dominance-constrained models are cloned from
//! the base, so each solve sees a snapshot fixed at build time.

use opteam_core::{ChemistryRules, FormationPool, Lineup, Player, PlayerId};

use crate::{
    assignment::AssignmentVars,
    chemistry::ChemistryVars,
    model::{LinearExpr, MilpModel},
    solver::{Solution, SolverError},
};

#[derive(Debug, Clone)]
pub struct LineupModel<'a> {
    pool: FormationPool<'a>,
    rules: ChemistryRules,
    model: MilpModel,
    assignment: AssignmentVars,
    chemistry: ChemistryVars,
    rating_expr: LinearExpr,
    chemistry_expr: LinearExpr,
}

impl<'a> LineupModel<'a> {
    pub fn build(pool: FormationPool<'a>, rules: &ChemistryRules) -> Self {
        let mut model = MilpModel::new();
        let assignment = AssignmentVars::build(&mut model, &pool);
        let chemistry = ChemistryVars::build(&mut model, &pool, &assignment, rules);
        let rating_expr = assignment.rating_expr(&pool);
        let chemistry_expr = chemistry.total_expr();
        tracing::debug!(
            formation = pool.formation().name(),
            players = pool.players().len(),
            %model,
            "built lineup model"
        );
        Self {
            pool,
            rules: *rules,
            model,
            assignment,
            chemistry,
            rating_expr,
            chemistry_expr,
        }
    }

    #[must_use]
    pub fn pool(&self) -> &FormationPool<'a> {
        &self.pool
    }

    /// The model without objective or dominance constraints.
    #[must_use]
    pub fn base(&self) -> &MilpModel {
        &self.model
    }

    #[must_use]
    pub fn assignment(&self) -> &AssignmentVars {
        &self.assignment
    }

    #[must_use]
    pub fn chemistry(&self) -> &ChemistryVars {
        &self.chemistry
    }

    /// Total rating of the assigned players.
    #[must_use]
    pub fn rating_expr(&self) -> &LinearExpr {
        &self.rating_expr
    }

    /// Total final chemistry over all slots.
    #[must_use]
    pub fn chemistry_expr(&self) -> &LinearExpr {
        &self.chemistry_expr
    }

    /// A copy of the base model maximizing `objective`.
    #[must_use]
    pub fn with_objective(&self, objective: LinearExpr) -> MilpModel {
        let mut model = self.model.clone();
        model.set_objective(objective);
        model
    }

    /// Number of `lineup`'s players assigned in a solution, as an expression.
    ///
    /// Players of `lineup` that are not in this pool contribute nothing.
    #[must_use]
    pub fn overlap_expr(&self, lineup: &Lineup) -> LinearExpr {
        let mut overlap = LinearExpr::new();
        for id in lineup.player_ids() {
            if let Some(player) = self.pool.index_of(id) {
                overlap.add_scaled(&self.assignment.selected(player), 1.0);
            }
        }
        overlap
    }

    /// Number of `players` present in this pool.
    #[must_use]
    pub fn count_in_pool(&self, players: impl IntoIterator<Item = PlayerId>) -> usize {
        players
            .into_iter()
            .filter(|id| self.pool.index_of(*id).is_some())
            .count()
    }

    /// Turns a solution into a lineup, recomputing both scores.
    pub fn decode(&self, solution: &Solution) -> Result<Lineup, SolverError> {
        let slots = self.assignment.decode(solution)?;
        let players: Vec<&Player> = slots.iter().map(|i| self.pool.player(*i)).collect();
        Lineup::evaluate(self.pool.formation(), &players, &self.rules).map_err(|err| {
            SolverError::Inconsistent {
                message: err.to_string(),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use opteam_core::{Formation, PlayerCatalog};

    use super::*;
    use crate::{
        solver::{MicroLpSolver, MilpSolver, SolveOutcome},
        testing,
    };

    #[test]
    fn test_model_chemistry_matches_reference() {
        let catalog = testing::catalog();
        let formation = Formation::builtin("4-4-2").unwrap();
        let rules = ChemistryRules::default();
        let model = LineupModel::build(catalog.pool(&formation).unwrap(), &rules);

        let best = testing::enumerate(&catalog, &formation, &rules)
            .iter()
            .map(Lineup::chemistry)
            .max()
            .unwrap();

        assert!(model.base().objective().is_empty());
        let milp = model.with_objective(model.chemistry_expr().clone());
        assert_eq!(milp.vars().len(), model.base().vars().len());
        assert_eq!(milp.constraints().len(), model.base().constraints().len());
        let SolveOutcome::Optimal(solution) = MicroLpSolver.solve(&milp).unwrap() else {
            panic!("expected an optimal solution");
        };
        let lineup = model.decode(&solution).unwrap();
        assert_eq!(lineup.chemistry(), best);
        assert!((solution.objective() - f64::from(best)).abs() < 1e-6);

        for (slot, lineup_slot) in lineup.slots().iter().enumerate() {
            let fc = solution.value(model.chemistry().final_chemistry(slot));
            assert!((fc - f64::from(lineup_slot.chemistry)).abs() < 1e-6);
        }
    }

    #[test]
    fn test_overlap_ignores_foreign_players() {
        let catalog = testing::catalog();
        let formation = Formation::builtin("4-4-2").unwrap();
        let rules = ChemistryRules::default();
        let model = LineupModel::build(catalog.pool(&formation).unwrap(), &rules);
        let lineup = testing::enumerate(&catalog, &formation, &rules)
            .into_iter()
            .next()
            .unwrap();

        // CB, CM and ST players can each fill two slots
        assert_eq!(model.overlap_expr(&lineup).terms().len(), 17);
        assert_eq!(model.count_in_pool(lineup.player_ids()), 11);
        assert_eq!(model.count_in_pool([PlayerId(999)]), 0);

        let empty = PlayerCatalog::default();
        assert!(empty.pool(&formation).is_err());
    }
}
