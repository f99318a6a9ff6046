use std::path::{Path, PathBuf};

use anyhow::Context as _;
use chrono::Utc;
use opteam_core::{ChemistryRules, Formation, Lineup, Player, PlayerCatalog};
use opteam_milp::{MicroLpSolver, Weight};
use opteam_pareto::{ParetoFrontier, ParetoSearch, SearchConfig};

use crate::{
    schema::report::{FormationSummary, FrontierReport, LineupEntry, SeedLineup, SeedReport},
    util::{self, Output},
};

const DEFAULT_WEIGHT_STEPS: u32 = 10;
const DEFAULT_MAX_ITERATIONS: usize = 200;

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct OptimizeArg {
    /// Player catalog (JSON array of records, or CSV export)
    #[arg(long)]
    players: PathBuf,
    /// Formation to search, in order; repeat for several (default: all)
    #[arg(long = "formation")]
    formations: Vec<String>,
    /// JSON object mapping custom formation names to 11 position labels
    #[arg(long)]
    formations_file: Option<PathBuf>,
    /// Comma-separated chemistry weights in [0, 1]
    #[arg(long, value_delimiter = ',', conflicts_with = "weight_steps")]
    weights: Vec<f64>,
    /// Number of intervals of the uniform weight grid on [0, 1]
    #[arg(long, default_value_t = DEFAULT_WEIGHT_STEPS)]
    weight_steps: u32,
    /// Strict-improvement tolerance in normalized units
    #[arg(long)]
    epsilon: Option<f64>,
    /// Maximum solves per (formation, weight) pair
    #[arg(long, default_value_t = DEFAULT_MAX_ITERATIONS)]
    max_iterations: usize,
    /// Chemistry tier thresholds (JSON)
    #[arg(long)]
    rules: Option<PathBuf>,
    /// Earlier report whose lineups seed the frontier
    #[arg(long)]
    seed: Option<PathBuf>,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &OptimizeArg) -> anyhow::Result<()> {
    let OptimizeArg {
        players,
        formations,
        formations_file,
        weights,
        weight_steps,
        epsilon,
        max_iterations,
        rules,
        seed,
        output,
    } = arg;

    let catalog = util::read_players_file(players)?;
    let rules = match rules {
        Some(path) => util::read_rules_file(path)?,
        None => ChemistryRules::default(),
    };
    let custom = match formations_file {
        Some(path) => util::read_formations_file(path)?,
        None => vec![],
    };
    let formations = match (formations.is_empty(), custom.is_empty()) {
        (false, _) => util::resolve_formations(formations, &custom)?,
        (true, false) => custom,
        (true, true) => Formation::builtin_names()
            .map(Formation::builtin)
            .collect::<Result<_, _>>()?,
    };
    let weights = if weights.is_empty() {
        Weight::grid(*weight_steps)
    } else {
        weights
            .iter()
            .map(|w| Weight::new(*w))
            .collect::<Result<_, _>>()
            .context("Invalid --weights")?
    };
    let config = match epsilon {
        Some(epsilon) => SearchConfig::new(*epsilon).context("Invalid --epsilon")?,
        None => SearchConfig::default(),
    }
    .with_max_iterations(*max_iterations);

    let mut frontier = match seed {
        Some(path) => load_seed(path, &catalog, &rules)?,
        None => ParetoFrontier::new(),
    };

    tracing::info!(
        formations = formations.len(),
        weights = weights.len(),
        seeded = frontier.len(),
        epsilon = config.epsilon(),
        "starting search"
    );
    let search = ParetoSearch::new(&catalog, rules, MicroLpSolver, config);
    let report = search.run(&formations, &weights, &mut frontier);
    if report.solver_failures() > 0 {
        tracing::warn!(
            failures = report.solver_failures(),
            "some searches ended on solver errors; the frontier may be incomplete"
        );
    }

    let report = FrontierReport {
        generated_at: Utc::now(),
        epsilon: config.epsilon(),
        weights: weights.iter().map(|w| w.value()).collect(),
        formations: FormationSummary::from_report(&report),
        lineups: frontier.sorted().into_iter().map(LineupEntry::from).collect(),
    };
    Output::save_json(&report, output.clone())?;
    Ok(())
}

/// Re-evaluates the lineups of an earlier report against the current data.
///
/// Lineups that reference unknown players or no longer validate are dropped.
fn load_seed(
    path: &Path,
    catalog: &PlayerCatalog,
    rules: &ChemistryRules,
) -> anyhow::Result<ParetoFrontier> {
    let seed: SeedReport = util::read_json_file("seed report", path)?;
    let total = seed.lineups.len();
    let lineups: Vec<Lineup> = seed
        .lineups
        .iter()
        .filter_map(|lineup| match reevaluate(lineup, catalog, rules) {
            Ok(lineup) => Some(lineup),
            Err(err) => {
                tracing::warn!(formation = %lineup.formation, %err, "dropping seed lineup");
                None
            }
        })
        .collect();
    let frontier = ParetoFrontier::from_lineups(lineups);
    tracing::info!(
        path = %path.display(),
        total,
        kept = frontier.len(),
        "frontier seeded"
    );
    Ok(frontier)
}

fn reevaluate(
    lineup: &SeedLineup,
    catalog: &PlayerCatalog,
    rules: &ChemistryRules,
) -> Result<Lineup, opteam_core::DataValidationError> {
    let formation = Formation::new(
        lineup.formation.clone(),
        lineup.slots.iter().map(|slot| slot.position.as_str()),
    )?;
    let players = lineup
        .slots
        .iter()
        .map(|slot| {
            catalog
                .get(slot.player)
                .ok_or(opteam_core::DataValidationError::UnknownPlayer {
                    player: slot.player,
                })
        })
        .collect::<Result<Vec<&Player>, _>>()?;
    Lineup::evaluate(&formation, &players, rules)
}

#[cfg(test)]
mod tests {
    use opteam_core::{PlayerId, PlayerRecord};

    use super::*;
    use crate::schema::report::SeedSlot;

    fn catalog() -> PlayerCatalog {
        let records = (1..=12).map(|id| PlayerRecord {
            id,
            name: format!("Player {id}"),
            rating: 80,
            nation: "A".to_owned(),
            league: "L".to_owned(),
            club: format!("C{id}"),
            positions: vec!["CM".to_owned()],
            ..PlayerRecord::default()
        });
        PlayerCatalog::from_records(records).0
    }

    fn seed(ids: impl IntoIterator<Item = u32>) -> SeedLineup {
        SeedLineup {
            formation: "cm".to_owned(),
            slots: ids
                .into_iter()
                .map(|id| SeedSlot {
                    position: "CM".to_owned(),
                    player: PlayerId(id),
                })
                .collect(),
        }
    }

    #[test]
    fn test_reevaluate_recomputes_scores() {
        let catalog = catalog();
        let lineup = reevaluate(&seed(1..=11), &catalog, &ChemistryRules::default()).unwrap();
        assert_eq!(lineup.rating_total(), 880);
        // 11 players of one nation and one league reach tier 3 in both
        assert_eq!(lineup.chemistry(), 33);
    }

    #[test]
    fn test_reevaluate_rejects_unknown_player() {
        let catalog = catalog();
        let lineup = seed((2..=11).chain([99]));
        let err = reevaluate(&lineup, &catalog, &ChemistryRules::default()).unwrap_err();
        assert_eq!(
            err,
            opteam_core::DataValidationError::UnknownPlayer {
                player: PlayerId(99)
            }
        );
    }

    #[test]
    fn test_reevaluate_rejects_short_lineup() {
        let catalog = catalog();
        assert!(reevaluate(&seed(1..=10), &catalog, &ChemistryRules::default()).is_err());
    }
}
