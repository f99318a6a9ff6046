//! Pareto frontier management and the weight-sweep search driver.
//!
//! - [`frontier`] - The set of non-dominated lineups and its insertion rule
//! - [`search`] - The loop over formations and weights that grows the frontier
//!   until every scalarized model is infeasible
//!
//! A search over a single frontier is sequential: every solve depends on the
//! frontier left by the previous one.

pub use self::{
    frontier::{Insertion, ParetoFrontier},
    search::{
        FormationOutcome, FormationReport, PairOutcome, PairReport, ParetoSearch, SearchConfig,
        SearchError, SearchReport,
    },
};

pub mod frontier;
pub mod search;
