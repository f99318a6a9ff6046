use std::path::PathBuf;

use anyhow::Context as _;
use opteam_core::{ChemistryRules, DataValidationError, Lineup, Player, PlayerCatalog};

use crate::{
    schema::{lineup::LineupFile, report::LineupEntry},
    util::{self, Output},
};

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct EvaluateArg {
    /// Player catalog (JSON array of records, or CSV export)
    #[arg(long)]
    players: PathBuf,
    /// Lineup to score: `{"formation": ..., "players": [id, ...]}`
    #[arg(long)]
    lineup: PathBuf,
    /// JSON object mapping custom formation names to 11 position labels
    #[arg(long)]
    formations_file: Option<PathBuf>,
    /// Chemistry tier thresholds (JSON)
    #[arg(long)]
    rules: Option<PathBuf>,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &EvaluateArg) -> anyhow::Result<()> {
    let EvaluateArg {
        players,
        lineup,
        formations_file,
        rules,
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
    let input: LineupFile = util::read_json_file("lineup", lineup)?;
    let formation = util::resolve_formations(std::slice::from_ref(&input.formation), &custom)?
        .pop()
        .context("No formation resolved")?;

    let players = lookup_players(&catalog, &input)?;
    let lineup = Lineup::evaluate(&formation, &players, &rules)
        .with_context(|| format!("Invalid lineup for formation {}", formation.name()))?;
    tracing::info!(
        formation = lineup.formation(),
        rating = lineup.rating_total(),
        chemistry = lineup.chemistry(),
        "lineup evaluated"
    );

    Output::save_json(&LineupEntry::from(&lineup), output.clone())?;
    Ok(())
}

fn lookup_players<'a>(
    catalog: &'a PlayerCatalog,
    input: &LineupFile,
) -> Result<Vec<&'a Player>, DataValidationError> {
    input
        .players
        .iter()
        .map(|id| {
            catalog
                .get(*id)
                .ok_or(DataValidationError::UnknownPlayer { player: *id })
        })
        .collect()
}
