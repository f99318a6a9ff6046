//! Solver-neutral mixed-integer linear model.
//!
//! A [`MilpModel`] is a list of bounded variables, a list of linear
//! constraints and one linear objective, always maximized. Builders in this
//! crate only talk to this representation; translating it into a concrete
//! solver's API is the job of a [`MilpSolver`](crate::solver::MilpSolver).

use std::fmt;

/// Handle of a variable within one [`MilpModel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VarId(usize);

impl VarId {
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum VarKind {
    Binary,
    Integer,
    Continuous,
}

/// Domain of a variable.
#[derive(Debug, Clone, PartialEq)]
pub struct VarDef {
    pub name: String,
    pub kind: VarKind,
    pub lower: f64,
    pub upper: f64,
}

/// `sum(coefficient * variable) + constant`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinearExpr {
    terms: Vec<(VarId, f64)>,
    constant: f64,
}

impl LinearExpr {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_term(mut self, var: VarId, coefficient: f64) -> Self {
        self.add_term(var, coefficient);
        self
    }

    pub fn add_term(&mut self, var: VarId, coefficient: f64) {
        self.terms.push((var, coefficient));
    }

    pub fn add_constant(&mut self, value: f64) {
        self.constant += value;
    }

    /// Adds `factor * other` to this expression.
    pub fn add_scaled(&mut self, other: &Self, factor: f64) {
        self.terms
            .extend(other.terms.iter().map(|(var, c)| (*var, c * factor)));
        self.constant += other.constant * factor;
    }

    #[must_use]
    pub fn terms(&self) -> &[(VarId, f64)] {
        &self.terms
    }

    #[must_use]
    pub fn constant(&self) -> f64 {
        self.constant
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Evaluates the expression; `values` is indexed by [`VarId::index`].
    #[must_use]
    pub fn evaluate(&self, values: &[f64]) -> f64 {
        self.constant
            + self
                .terms
                .iter()
                .map(|(var, c)| c * values[var.0])
                .sum::<f64>()
    }
}

impl FromIterator<(VarId, f64)> for LinearExpr {
    fn from_iter<T: IntoIterator<Item = (VarId, f64)>>(iter: T) -> Self {
        Self {
            terms: iter.into_iter().collect(),
            constant: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum Relation {
    #[display("<=")]
    LessEq,
    #[display(">=")]
    GreaterEq,
    #[display("==")]
    Eq,
}

/// `expr relation rhs`.
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    pub expr: LinearExpr,
    pub relation: Relation,
    pub rhs: f64,
}

impl Constraint {
    #[must_use]
    pub fn is_satisfied_by(&self, values: &[f64], tolerance: f64) -> bool {
        let lhs = self.expr.evaluate(values);
        match self.relation {
            Relation::LessEq => lhs <= self.rhs + tolerance,
            Relation::GreaterEq => lhs >= self.rhs - tolerance,
            Relation::Eq => (lhs - self.rhs).abs() <= tolerance,
        }
    }
}

/// A maximization problem.
#[derive(Debug, Clone, Default)]
pub struct MilpModel {
    vars: Vec<VarDef>,
    constraints: Vec<Constraint>,
    objective: LinearExpr,
}

impl MilpModel {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_var(&mut self, def: VarDef) -> VarId {
        let id = VarId(self.vars.len());
        self.vars.push(def);
        id
    }

    pub fn binary(&mut self, name: impl Into<String>) -> VarId {
        self.add_var(VarDef {
            name: name.into(),
            kind: VarKind::Binary,
            lower: 0.0,
            upper: 1.0,
        })
    }

    pub fn integer(&mut self, name: impl Into<String>, lower: f64, upper: f64) -> VarId {
        self.add_var(VarDef {
            name: name.into(),
            kind: VarKind::Integer,
            lower,
            upper,
        })
    }

    pub fn continuous(&mut self, name: impl Into<String>, lower: f64, upper: f64) -> VarId {
        self.add_var(VarDef {
            name: name.into(),
            kind: VarKind::Continuous,
            lower,
            upper,
        })
    }

    pub fn add_constraint(&mut self, expr: LinearExpr, relation: Relation, rhs: f64) {
        self.constraints.push(Constraint {
            expr,
            relation,
            rhs,
        });
    }

    pub fn set_objective(&mut self, objective: LinearExpr) {
        self.objective = objective;
    }

    #[must_use]
    pub fn vars(&self) -> &[VarDef] {
        &self.vars
    }

    #[must_use]
    pub fn var(&self, id: VarId) -> &VarDef {
        &self.vars[id.0]
    }

    #[must_use]
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    #[must_use]
    pub fn objective(&self) -> &LinearExpr {
        &self.objective
    }

    /// Checks bounds, integrality and every constraint against `values`.
    #[must_use]
    pub fn is_satisfied_by(&self, values: &[f64], tolerance: f64) -> bool {
        if values.len() != self.vars.len() {
            return false;
        }
        let in_domain = self.vars.iter().zip(values).all(|(def, value)| {
            let integral = def.kind.is_continuous() || (value - value.round()).abs() <= tolerance;
            integral && *value >= def.lower - tolerance && *value <= def.upper + tolerance
        });
        in_domain
            && self
                .constraints
                .iter()
                .all(|c| c.is_satisfied_by(values, tolerance))
    }
}

impl fmt::Display for MilpModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let binaries = self.vars.iter().filter(|v| v.kind.is_binary()).count();
        write!(
            f,
            "{} variables ({} binary), {} constraints",
            self.vars.len(),
            binaries,
            self.constraints.len()
        )
    }
}
