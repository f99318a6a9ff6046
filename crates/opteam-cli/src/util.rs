use std::{
    collections::BTreeMap,
    fs::File,
    io::{self, BufWriter, StdoutLock, Write as _},
    path::{Path, PathBuf},
};

use anyhow::Context;
use opteam_core::{ChemistryRules, Formation, PlayerCatalog, PlayerRecord};

#[derive(Debug)]
pub enum Output {
    Stdout {
        writer: StdoutLock<'static>,
    },
    File {
        writer: BufWriter<File>,
        path: PathBuf,
    },
}

impl Output {
    pub fn save_json<T>(value: &T, output_path: Option<PathBuf>) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        let mut output = Output::from_output_path(output_path)?;
        output.write_json(value)
    }

    pub fn from_output_path(output_path: Option<PathBuf>) -> anyhow::Result<Self> {
        match output_path {
            Some(path) => Output::open(path),
            None => Ok(Output::stdout()),
        }
    }

    pub fn stdout() -> Self {
        Output::Stdout {
            writer: io::stdout().lock(),
        }
    }

    pub fn open(path: PathBuf) -> anyhow::Result<Self> {
        let file = File::create(&path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        Ok(Output::File {
            writer: BufWriter::new(file),
            path,
        })
    }

    pub fn display_path(&self) -> String {
        match self {
            Output::Stdout { .. } => "stdout".to_string(),
            Output::File { path, .. } => path.display().to_string(),
        }
    }

    pub fn write_json<T>(&mut self, value: T) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        serde_json::to_writer_pretty(&mut *self, &value)
            .with_context(|| format!("Failed to write JSON to {}", self.display_path()))?;
        writeln!(&mut *self).with_context(|| {
            format!(
                "Failed to write newline after JSON to {}",
                self.display_path()
            )
        })?;
        self.flush()
            .with_context(|| format!("Failed to flush output to {}", self.display_path()))?;
        Ok(())
    }
}

impl io::Write for Output {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Output::Stdout { writer } => writer.write(buf),
            Output::File { writer, .. } => writer.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Output::Stdout { writer } => writer.flush(),
            Output::File { writer, .. } => writer.flush(),
        }
    }
}

pub fn read_json_file<T, P>(file_kind: &str, path: P) -> anyhow::Result<T>
where
    T: serde::de::DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open {} file: {}", file_kind, path.display()))?;

    let reader = io::BufReader::new(file);
    let value = serde_json::from_reader(reader).with_context(|| {
        format!(
            "Failed to parse {} JSON file: {}",
            file_kind,
            path.display()
        )
    })?;

    Ok(value)
}

/// Loads the player catalog from a JSON array of records or a CSV export.
///
/// The format is chosen by file extension. Invalid records are logged and
/// dropped; duplicate ids are an error.
pub fn read_players_file<P>(path: P) -> anyhow::Result<PlayerCatalog>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let is_csv = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
    let records: Vec<PlayerRecord> = if is_csv {
        let file = File::open(path)
            .with_context(|| format!("Failed to open players file: {}", path.display()))?;
        read_players_csv(file)
            .with_context(|| format!("Failed to parse players CSV file: {}", path.display()))?
    } else {
        read_json_file("players", path)?
    };

    let total = records.len();
    let (catalog, rejected) = PlayerCatalog::from_records(records);
    for err in &rejected {
        tracing::warn!(%err, "dropping player record");
    }
    if let Some(err) = rejected
        .into_iter()
        .find(|err| matches!(err, opteam_core::DataValidationError::DuplicatePlayer { .. }))
    {
        return Err(err).with_context(|| format!("Invalid players file: {}", path.display()));
    }
    tracing::info!(
        path = %path.display(),
        loaded = catalog.len(),
        dropped = total - catalog.len(),
        "players loaded"
    );
    Ok(catalog)
}

/// One row of the spreadsheet export.
#[derive(Debug, Clone, serde::Deserialize)]
struct CsvPlayerRow {
    #[serde(rename = "Id", default)]
    id: Option<u32>,
    #[serde(rename = "Full Name")]
    name: String,
    #[serde(rename = "Preferred Position", alias = "Preffered Position")]
    preferred_position: String,
    #[serde(rename = "Alternate positions", default)]
    alternate_positions: String,
    #[serde(rename = "Overall Rating")]
    rating: i64,
    #[serde(rename = "Nation")]
    nation: String,
    #[serde(rename = "League")]
    league: String,
    #[serde(rename = "Club")]
    club: String,
    #[serde(rename = "Icon", default)]
    icon: String,
    #[serde(rename = "Hero", default)]
    hero: String,
}

impl CsvPlayerRow {
    fn into_record(self, id: u32) -> PlayerRecord {
        let positions = std::iter::once(self.preferred_position.as_str())
            .chain(self.alternate_positions.split(','))
            .map(str::trim)
            .filter(|label| !label.is_empty())
            .map(str::to_owned)
            .collect();
        PlayerRecord {
            id,
            name: self.name,
            rating: self.rating,
            nation: self.nation,
            league: self.league,
            club: self.club,
            positions,
            is_icon: is_flag_set(&self.icon),
            is_hero: is_flag_set(&self.hero),
        }
    }
}

fn is_flag_set(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "y"
    )
}

fn read_players_csv<R>(reader: R) -> anyhow::Result<Vec<PlayerRecord>>
where
    R: io::Read,
{
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let rows = reader
        .deserialize::<CsvPlayerRow>()
        .enumerate()
        .map(|(row, result)| result.with_context(|| format!("Invalid player row {}", row + 1)))
        .collect::<anyhow::Result<Vec<_>>>()?;

    // rows without an id are numbered after the largest explicit one
    let mut next_id = rows.iter().filter_map(|row| row.id).max().unwrap_or(0);
    rows.into_iter()
        .map(|row| -> anyhow::Result<PlayerRecord> {
            let id = match row.id {
                Some(id) => id,
                None => {
                    next_id = next_id
                        .checked_add(1)
                        .context("Too many players without an id")?;
                    next_id
                }
            };
            Ok(row.into_record(id))
        })
        .collect()
}

/// Reads custom formations from a JSON object mapping names to 11 labels.
pub fn read_formations_file<P>(path: P) -> anyhow::Result<Vec<Formation>>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let table: BTreeMap<String, Vec<String>> = read_json_file("formations", path)?;
    table
        .into_iter()
        .map(|(name, positions)| {
            Formation::new(name, positions)
                .with_context(|| format!("Invalid formations file: {}", path.display()))
        })
        .collect()
}

pub fn read_rules_file<P>(path: P) -> anyhow::Result<ChemistryRules>
where
    P: AsRef<Path>,
{
    read_json_file("chemistry rules", path)
}

/// Resolves formation names against custom formations first, then built-ins.
pub fn resolve_formations(
    names: &[String],
    custom: &[Formation],
) -> anyhow::Result<Vec<Formation>> {
    names
        .iter()
        .map(|name| {
            if let Some(formation) = custom.iter().find(|f| f.name() == name) {
                return Ok(formation.clone());
            }
            Formation::builtin(name).with_context(|| format!("Unknown formation: {name}"))
        })
        .collect()
}
