use std::path::PathBuf;

use opteam_core::{Formation, Position};
use serde::Serialize;

use crate::util::{self, Output};

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct FormationsArg {
    /// Also list custom formations from this JSON file
    #[arg(long)]
    formations_file: Option<PathBuf>,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct FormationEntry<'a> {
    name: &'a str,
    builtin: bool,
    positions: Vec<&'a str>,
}

impl<'a> FormationEntry<'a> {
    fn new(formation: &'a Formation, builtin: bool) -> Self {
        Self {
            name: formation.name(),
            builtin,
            positions: formation.positions().iter().map(Position::as_str).collect(),
        }
    }
}

pub(crate) fn run(arg: &FormationsArg) -> anyhow::Result<()> {
    let FormationsArg {
        formations_file,
        output,
    } = arg;

    let builtin = Formation::builtin_names()
        .map(Formation::builtin)
        .collect::<Result<Vec<_>, _>>()?;
    let custom = match formations_file {
        Some(path) => util::read_formations_file(path)?,
        None => vec![],
    };

    let entries: Vec<FormationEntry<'_>> = builtin
        .iter()
        .map(|f| FormationEntry::new(f, true))
        .chain(custom.iter().map(|f| FormationEntry::new(f, false)))
        .collect();
    Output::save_json(&entries, output.clone())?;
    Ok(())
}
