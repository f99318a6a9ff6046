use chrono::{DateTime, Utc};
use opteam_core::{Lineup, PlayerId};
use opteam_pareto::{FormationOutcome, PairOutcome, PairReport, SearchReport};
use serde::{Deserialize, Serialize};

/// Output of `opteam optimize`.
#[derive(Debug, Clone, Serialize)]
pub struct FrontierReport<'a> {
    /// Timestamp when the search finished (ISO 8601 format)
    pub generated_at: DateTime<Utc>,
    pub epsilon: f64,
    pub weights: Vec<f64>,
    /// Per-formation search summary, in search order
    pub formations: Vec<FormationSummary>,
    /// Frontier lineups by descending rating
    pub lineups: Vec<LineupEntry<'a>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LineupEntry<'a> {
    pub average_rating: f64,
    #[serde(flatten)]
    pub lineup: &'a Lineup,
}

impl<'a> From<&'a Lineup> for LineupEntry<'a> {
    fn from(lineup: &'a Lineup) -> Self {
        Self {
            average_rating: lineup.rating(),
            lineup,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormationSummary {
    pub name: String,
    #[serde(flatten)]
    pub status: FormationStatus,
}

/// How the search of one formation ended.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FormationStatus {
    Skipped {
        reason: String,
    },
    Infeasible,
    NormalizationFailed {
        error: String,
    },
    Searched {
        rating_max: u32,
        chemistry_max: u32,
        pairs: Vec<PairSummary>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairSummary {
    pub weight: f64,
    pub accepted: usize,
    pub solves: usize,
    #[serde(flatten)]
    pub outcome: PairStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PairStatus {
    Exhausted,
    IterationLimit,
    Stalled,
    SolverFailed { error: String },
}

impl From<&PairReport> for PairSummary {
    fn from(pair: &PairReport) -> Self {
        let outcome = match &pair.outcome {
            PairOutcome::Exhausted => PairStatus::Exhausted,
            PairOutcome::IterationLimit => PairStatus::IterationLimit,
            PairOutcome::Stalled => PairStatus::Stalled,
            PairOutcome::SolverFailed(err) => PairStatus::SolverFailed {
                error: err.to_string(),
            },
        };
        Self {
            weight: pair.weight.value(),
            accepted: pair.accepted,
            solves: pair.solves,
            outcome,
        }
    }
}

impl From<&FormationOutcome> for FormationStatus {
    fn from(outcome: &FormationOutcome) -> Self {
        match outcome {
            FormationOutcome::Skipped(err) => Self::Skipped {
                reason: err.to_string(),
            },
            FormationOutcome::Infeasible => Self::Infeasible,
            FormationOutcome::NormalizationFailed(err) => Self::NormalizationFailed {
                error: err.to_string(),
            },
            FormationOutcome::Searched {
                normalization,
                pairs,
            } => Self::Searched {
                rating_max: normalization.rating_max(),
                chemistry_max: normalization.chemistry_max(),
                pairs: pairs.iter().map(PairSummary::from).collect(),
            },
        }
    }
}

impl FormationSummary {
    pub fn from_report(report: &SearchReport) -> Vec<Self> {
        report
            .formations
            .iter()
            .map(|formation| Self {
                name: formation.formation.clone(),
                status: FormationStatus::from(&formation.outcome),
            })
            .collect()
    }
}

/// The parts of an earlier report needed to seed a new search.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedReport {
    pub lineups: Vec<SeedLineup>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedLineup {
    pub formation: String,
    pub slots: Vec<SeedSlot>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedSlot {
    pub position: String,
    pub player: PlayerId,
}

#[cfg(test)]
mod tests {
    use opteam_core::{DataValidationError, Position};
    use opteam_milp::{Normalization, SolverError, Weight};
    use opteam_pareto::FormationReport;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_summary_is_tagged_by_status() {
        let report = SearchReport {
            formations: vec![
                FormationReport {
                    formation: "4-3-3".to_owned(),
                    outcome: FormationOutcome::Skipped(DataValidationError::UnfillablePosition {
                        formation: "4-3-3".to_owned(),
                        position: Position::new("LW"),
                        slots: 1,
                        candidates: 0,
                    }),
                },
                FormationReport {
                    formation: "4-4-2".to_owned(),
                    outcome: FormationOutcome::Searched {
                        normalization: Normalization::new(888, 31),
                        pairs: vec![
                            PairReport {
                                weight: Weight::RATING_ONLY,
                                accepted: 3,
                                solves: 4,
                                outcome: PairOutcome::Exhausted,
                            },
                            PairReport {
                                weight: Weight::CHEMISTRY_ONLY,
                                accepted: 0,
                                solves: 1,
                                outcome: PairOutcome::SolverFailed(SolverError::Unbounded),
                            },
                        ],
                    },
                },
            ],
        };

        let summaries = FormationSummary::from_report(&report);
        let value = serde_json::to_value(&summaries).unwrap();
        assert_eq!(value[0]["name"], "4-3-3");
        assert_eq!(value[0]["status"], "skipped");
        assert!(value[0]["reason"].as_str().unwrap().contains("LW"));
        assert_eq!(
            value[1],
            json!({
                "name": "4-4-2",
                "status": "searched",
                "rating_max": 888,
                "chemistry_max": 31,
                "pairs": [
                    { "weight": 0.0, "accepted": 3, "solves": 4, "outcome": "exhausted" },
                    {
                        "weight": 1.0,
                        "accepted": 0,
                        "solves": 1,
                        "outcome": "solver_failed",
                        "error": "objective is unbounded"
                    }
                ]
            })
        );
    }
}
