//! Iterative Pareto search across formations and weights.
//!
//! For every `(formation, weight)` pair the driver repeatedly builds the
//! scalarized model, adds the dominance-breaking constraints of the current
//! frontier, solves, and inserts the decoded lineup. The pair ends when the
//! model becomes infeasible, which means every lineup of the formation is
//! dominated by or identical to a frontier member.
//!
//! ```text
//! for formation in formations:           (pools validated up front)
//!     normalize (2 solves)
//!     for weight in weights:
//!         SEARCHING: solve -> insert -> SEARCHING
//!                    infeasible -> DONE
//! COMPLETE: frontier
//! ```
//!
//! Formations are processed strictly in order: the frontier built for one
//! formation constrains every later solve.

use opteam_core::{ChemistryRules, DataValidationError, Formation, FormationPool, PlayerCatalog};
use opteam_milp::{
    DEFAULT_EPSILON, DominanceBreaker, InvalidEpsilonError, LineupModel, MilpSolver,
    Normalization, SolveOutcome, SolverError, Weight,
};

use crate::frontier::{Insertion, ParetoFrontier};

/// Error of [`ParetoSearch::search_formation`].
#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum SearchError {
    #[display("invalid input: {_0}")]
    Validation(DataValidationError),
    #[display("solver failure: {_0}")]
    Solver(SolverError),
}

/// Tunables of the search driver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchConfig {
    breaker: DominanceBreaker,
    max_iterations_per_pair: Option<usize>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            breaker: DominanceBreaker::default(),
            max_iterations_per_pair: None,
        }
    }
}

impl SearchConfig {
    pub fn new(epsilon: f64) -> Result<Self, InvalidEpsilonError> {
        Ok(Self {
            breaker: DominanceBreaker::new(epsilon)?,
            max_iterations_per_pair: None,
        })
    }

    /// Stops a `(formation, weight)` pair after `limit` solves.
    #[must_use]
    pub fn with_max_iterations(mut self, limit: usize) -> Self {
        self.max_iterations_per_pair = Some(limit);
        self
    }

    #[must_use]
    pub fn epsilon(&self) -> f64 {
        self.breaker.epsilon()
    }

    #[must_use]
    pub fn max_iterations_per_pair(&self) -> Option<usize> {
        self.max_iterations_per_pair
    }
}

/// How a `(formation, weight)` pair ended.
#[derive(Debug, Clone, PartialEq, derive_more::IsVariant)]
pub enum PairOutcome {
    /// The model became infeasible: nothing new remains for this pair.
    Exhausted,
    /// The configured iteration limit was reached.
    IterationLimit,
    /// A solve returned a lineup the frontier rejected.
    Stalled,
    /// The solver failed; the frontier built so far is kept.
    SolverFailed(SolverError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PairReport {
    pub weight: Weight,
    pub accepted: usize,
    pub solves: usize,
    pub outcome: PairOutcome,
}

#[derive(Debug, Clone, PartialEq, derive_more::IsVariant)]
pub enum FormationOutcome {
    /// The formation failed validation and was never solved.
    Skipped(DataValidationError),
    /// No lineup satisfies the assignment constraints.
    Infeasible,
    /// A normalization solve failed.
    NormalizationFailed(SolverError),
    Searched {
        normalization: Normalization,
        pairs: Vec<PairReport>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormationReport {
    pub formation: String,
    pub outcome: FormationOutcome,
}

/// Per-formation account of a [`ParetoSearch::run`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchReport {
    pub formations: Vec<FormationReport>,
}

impl SearchReport {
    fn pairs(&self) -> impl Iterator<Item = &PairReport> {
        self.formations.iter().flat_map(|f| match &f.outcome {
            FormationOutcome::Searched { pairs, .. } => pairs.as_slice(),
            _ => &[][..],
        })
    }

    /// Lineups accepted into the frontier over the whole run.
    #[must_use]
    pub fn accepted(&self) -> usize {
        self.pairs().map(|p| p.accepted).sum()
    }

    /// Solves issued by the weight loops (normalization solves excluded).
    #[must_use]
    pub fn solves(&self) -> usize {
        self.pairs().map(|p| p.solves).sum()
    }

    /// Number of pairs or normalizations that ended on a solver error.
    #[must_use]
    pub fn solver_failures(&self) -> usize {
        let pairs = self
            .pairs()
            .filter(|p| p.outcome.is_solver_failed())
            .count();
        let normalizations = self
            .formations
            .iter()
            .filter(|f| f.outcome.is_normalization_failed())
            .count();
        pairs + normalizations
    }
}

/// The search driver.
#[derive(Debug, Clone)]
pub struct ParetoSearch<'a, S> {
    catalog: &'a PlayerCatalog,
    rules: ChemistryRules,
    solver: S,
    config: SearchConfig,
}

impl<'a, S> ParetoSearch<'a, S>
where
    S: MilpSolver,
{
    pub fn new(
        catalog: &'a PlayerCatalog,
        rules: ChemistryRules,
        solver: S,
        config: SearchConfig,
    ) -> Self {
        Self {
            catalog,
            rules,
            solver,
            config,
        }
    }

    /// Searches every formation in order, growing `frontier`.
    ///
    /// All formations are validated before the first solve. Invalid ones are
    /// reported and skipped; solver failures end only the pair they occur in.
    pub fn run(
        &self,
        formations: &[Formation],
        weights: &[Weight],
        frontier: &mut ParetoFrontier,
    ) -> SearchReport {
        let pools: Vec<Result<FormationPool<'_>, DataValidationError>> = formations
            .iter()
            .map(|formation| {
                self.catalog.pool(formation).inspect_err(|err| {
                    tracing::warn!(formation = formation.name(), %err, "skipping formation");
                })
            })
            .collect();

        let mut report = SearchReport::default();
        for (formation, pool) in formations.iter().zip(pools) {
            let outcome = match pool {
                Ok(pool) => self
                    .search_pool(pool, weights, frontier)
                    .unwrap_or_else(FormationOutcome::NormalizationFailed),
                Err(err) => FormationOutcome::Skipped(err),
            };
            report.formations.push(FormationReport {
                formation: formation.name().to_owned(),
                outcome,
            });
        }

        tracing::info!(
            frontier = frontier.len(),
            accepted = report.accepted(),
            solves = report.solves(),
            "search complete"
        );
        report
    }

    /// Searches a single formation.
    ///
    /// Unlike [`ParetoSearch::run`], validation and normalization failures
    /// are returned as errors.
    pub fn search_formation(
        &self,
        formation: &Formation,
        weights: &[Weight],
        frontier: &mut ParetoFrontier,
    ) -> Result<FormationOutcome, SearchError> {
        let pool = self.catalog.pool(formation)?;
        Ok(self.search_pool(pool, weights, frontier)?)
    }

    fn search_pool(
        &self,
        pool: FormationPool<'_>,
        weights: &[Weight],
        frontier: &mut ParetoFrontier,
    ) -> Result<FormationOutcome, SolverError> {
        let name = pool.formation().name();
        tracing::info!(formation = name, players = pool.players().len(), "searching formation");

        let model = LineupModel::build(pool, &self.rules);
        let normalization = match Normalization::compute(&model, &self.solver) {
            Ok(Some(normalization)) => normalization,
            Ok(None) => {
                tracing::info!(formation = name, "formation has no feasible lineup");
                return Ok(FormationOutcome::Infeasible);
            }
            Err(err) => {
                tracing::warn!(formation = name, %err, "normalization failed");
                return Err(err);
            }
        };
        if !self.config.breaker.is_resolvable(&normalization) {
            tracing::warn!(
                formation = name,
                epsilon = self.config.epsilon(),
                default = DEFAULT_EPSILON,
                rating_max = normalization.rating_max(),
                chemistry_max = normalization.chemistry_max(),
                "epsilon is too coarse to separate single-point improvements"
            );
        }

        let pairs = weights
            .iter()
            .map(|weight| self.search_pair(&model, &normalization, *weight, frontier))
            .collect();
        Ok(FormationOutcome::Searched {
            normalization,
            pairs,
        })
    }

    fn search_pair(
        &self,
        model: &LineupModel<'_>,
        normalization: &Normalization,
        weight: Weight,
        frontier: &mut ParetoFrontier,
    ) -> PairReport {
        let name = model.pool().formation().name();
        let objective = normalization.objective(model, weight);
        let mut accepted = 0;
        let mut solves = 0;

        let outcome = loop {
            if self
                .config
                .max_iterations_per_pair
                .is_some_and(|limit| solves >= limit)
            {
                tracing::warn!(formation = name, %weight, solves, "iteration limit reached");
                break PairOutcome::IterationLimit;
            }

            // constraints are fixed from the frontier as it is now
            let mut milp = model.with_objective(objective.clone());
            self.config
                .breaker
                .apply(&mut milp, model, normalization, frontier.lineups());
            solves += 1;

            let lineup = match self.solver.solve(&milp) {
                Ok(SolveOutcome::Optimal(solution)) => model.decode(&solution),
                Ok(SolveOutcome::Infeasible) => break PairOutcome::Exhausted,
                Err(err) => Err(err),
            };
            let lineup = match lineup {
                Ok(lineup) => lineup,
                Err(err) => {
                    tracing::warn!(formation = name, %weight, %err, "solver failed");
                    break PairOutcome::SolverFailed(err);
                }
            };

            let rating = lineup.rating();
            let chemistry = lineup.chemistry();
            match frontier.insert(lineup) {
                Insertion::Accepted { evicted } => {
                    accepted += 1;
                    tracing::debug!(
                        formation = name,
                        %weight,
                        rating,
                        chemistry,
                        evicted,
                        "lineup accepted"
                    );
                }
                rejected @ (Insertion::Duplicate | Insertion::Dominated) => {
                    tracing::warn!(
                        formation = name,
                        %weight,
                        rating,
                        chemistry,
                        ?rejected,
                        "search stalled"
                    );
                    break PairOutcome::Stalled;
                }
            }
        };

        tracing::info!(formation = name, %weight, accepted, solves, ?outcome, "pair done");
        PairReport {
            weight,
            accepted,
            solves,
            outcome,
        }
    }
}
