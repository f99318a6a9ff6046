//! Solver adapter boundary.
//!
//! [`MilpSolver`] is the only place where a concrete MILP backend is touched.
//! It accepts a [`MilpModel`] and returns either an optimal assignment of
//! every variable or an explicit [`SolveOutcome::Infeasible`]. Infeasibility
//! is an expected outcome (it terminates a search branch) and is therefore
//! not a [`SolverError`].
//!
//! [`MicroLpSolver`] implements the trait on top of `good_lp` with the pure
//! Rust `microlp` backend.

use good_lp::{
    Expression, ProblemVariables, ResolutionError, Solution as _, SolverModel as _, Variable,
    default_solver, variable,
};

use crate::model::{LinearExpr, MilpModel, Relation, VarId, VarKind};

/// The external solver failed in a way that is not infeasibility.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum SolverError {
    #[display("solver backend failed: {message}")]
    Backend { message: String },
    #[display("objective is unbounded")]
    Unbounded,
    #[display("solver returned an inconsistent solution: {message}")]
    Inconsistent { message: String },
}

/// Values of every model variable at an optimum.
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    values: Vec<f64>,
    objective: f64,
}

impl Solution {
    #[must_use]
    pub fn new(values: Vec<f64>, objective: f64) -> Self {
        Self { values, objective }
    }

    #[must_use]
    pub fn value(&self, var: VarId) -> f64 {
        self.values[var.index()]
    }

    /// Reads a binary variable, rounding away solver noise.
    #[must_use]
    pub fn is_set(&self, var: VarId) -> bool {
        self.value(var) > 0.5
    }

    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    #[must_use]
    pub fn objective(&self) -> f64 {
        self.objective
    }
}

#[derive(Debug, Clone, PartialEq, derive_more::IsVariant)]
pub enum SolveOutcome {
    Optimal(Solution),
    Infeasible,
}

/// A MILP backend.
pub trait MilpSolver {
    /// Maximizes the objective of `model`.
    fn solve(&self, model: &MilpModel) -> Result<SolveOutcome, SolverError>;
}

impl<S> MilpSolver for &S
where
    S: MilpSolver + ?Sized,
{
    fn solve(&self, model: &MilpModel) -> Result<SolveOutcome, SolverError> {
        (**self).solve(model)
    }
}

/// `good_lp` adapter using the bundled `microlp` branch-and-bound solver.
#[derive(Debug, Clone, Copy, Default)]
pub struct MicroLpSolver;

impl MilpSolver for MicroLpSolver {
    fn solve(&self, model: &MilpModel) -> Result<SolveOutcome, SolverError> {
        tracing::trace!(%model, "solving");

        let mut vars = ProblemVariables::new();
        let handles: Vec<Variable> = model
            .vars()
            .iter()
            .map(|def| {
                let definition = variable().name(def.name.clone());
                let definition = match def.kind {
                    VarKind::Binary => definition.binary(),
                    VarKind::Integer => definition.integer().min(def.lower).max(def.upper),
                    VarKind::Continuous => definition.min(def.lower).max(def.upper),
                };
                vars.add(definition)
            })
            .collect();

        let mut problem = vars
            .maximise(to_expression(model.objective(), &handles))
            .using(default_solver);
        for constraint in model.constraints() {
            let lhs = to_expression(&constraint.expr, &handles);
            let rhs = constraint.rhs - constraint.expr.constant();
            problem = problem.with(match constraint.relation {
                Relation::LessEq => lhs.leq(rhs),
                Relation::GreaterEq => lhs.geq(rhs),
                Relation::Eq => lhs.eq(rhs),
            });
        }

        match problem.solve() {
            Ok(solution) => {
                let values: Vec<f64> = handles.iter().map(|v| solution.value(*v)).collect();
                let objective = model.objective().evaluate(&values);
                Ok(SolveOutcome::Optimal(Solution::new(values, objective)))
            }
            Err(ResolutionError::Infeasible) => Ok(SolveOutcome::Infeasible),
            Err(ResolutionError::Unbounded) => Err(SolverError::Unbounded),
            Err(err) => Err(SolverError::Backend {
                message: err.to_string(),
            }),
        }
    }
}

/// Converts the variable terms of `expr`; the constant is handled by callers.
fn to_expression(expr: &LinearExpr, handles: &[Variable]) -> Expression {
    let mut expression = Expression::default();
    for (var, coefficient) in expr.terms() {
        expression.add_mul(*coefficient, handles[var.index()]);
    }
    expression
}
