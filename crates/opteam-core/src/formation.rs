//! Position labels and formations.
//!
//! A [`Formation`] is an ordered list of exactly [`LINEUP_SIZE`] position
//! labels. Labels may repeat (a 4-4-2 has two `CB` and two `CM` slots); each
//! occurrence is a distinct slot, addressed by its index in the formation.
//!
//! Built-in formations are available through [`Formation::builtin`]. Custom
//! formations can be deserialized from `{"name": ..., "positions": [...]}`;
//! deserialization validates the slot count.

use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

use crate::{DataValidationError, LINEUP_SIZE};

/// A position label such as `GK`, `CB` or `ST`.
///
/// Labels are trimmed and upper-cased on construction so that `" st"` and
/// `"ST"` compare equal.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[serde(from = "String", into = "String")]
#[display("{_0}")]
pub struct Position(String);

impl Position {
    #[must_use]
    pub fn new(label: impl AsRef<str>) -> Self {
        Self(label.as_ref().trim().to_ascii_uppercase())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Position {
    fn from(label: &str) -> Self {
        Self::new(label)
    }
}

impl From<String> for Position {
    fn from(label: String) -> Self {
        Self::new(label)
    }
}

impl From<Position> for String {
    fn from(position: Position) -> Self {
        position.0
    }
}

const BUILTIN_FORMATIONS: &[(&str, [&str; LINEUP_SIZE])] = &[
    (
        "4-4-2",
        ["GK", "LB", "CB", "CB", "RB", "LM", "CM", "CM", "RM", "ST", "ST"],
    ),
    (
        "4-3-3",
        ["GK", "LB", "CB", "CB", "RB", "CM", "CM", "CM", "LW", "ST", "RW"],
    ),
    (
        "4-2-3-1",
        ["GK", "LB", "CB", "CB", "RB", "CDM", "CDM", "LM", "CAM", "RM", "ST"],
    ),
    (
        "4-1-2-1-2",
        ["GK", "LB", "CB", "CB", "RB", "CDM", "CM", "CM", "CAM", "ST", "ST"],
    ),
    (
        "4-5-1",
        ["GK", "LB", "CB", "CB", "RB", "LM", "CM", "CM", "CM", "RM", "ST"],
    ),
    (
        "4-1-4-1",
        ["GK", "LB", "CB", "CB", "RB", "CDM", "LM", "CM", "CM", "RM", "ST"],
    ),
    (
        "3-5-2",
        ["GK", "CB", "CB", "CB", "LM", "CDM", "CDM", "RM", "CAM", "ST", "ST"],
    ),
    (
        "3-4-3",
        ["GK", "CB", "CB", "CB", "LM", "CM", "CM", "RM", "LW", "ST", "RW"],
    ),
    (
        "5-3-2",
        ["GK", "LWB", "CB", "CB", "CB", "RWB", "CM", "CM", "CM", "ST", "ST"],
    ),
    (
        "5-2-1-2",
        ["GK", "LWB", "CB", "CB", "CB", "RWB", "CM", "CM", "CAM", "ST", "ST"],
    ),
];

/// An ordered set of exactly [`LINEUP_SIZE`] position slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "FormationRecord", into = "FormationRecord")]
pub struct Formation {
    name: String,
    positions: ArrayVec<Position, LINEUP_SIZE>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct FormationRecord {
    name: String,
    positions: Vec<Position>,
}

impl TryFrom<FormationRecord> for Formation {
    type Error = DataValidationError;

    fn try_from(record: FormationRecord) -> Result<Self, Self::Error> {
        Self::new(record.name, record.positions)
    }
}

impl From<Formation> for FormationRecord {
    fn from(formation: Formation) -> Self {
        Self {
            name: formation.name,
            positions: formation.positions.into_iter().collect(),
        }
    }
}

impl Formation {
    /// Creates a formation from its slot labels.
    ///
    /// Fails unless exactly [`LINEUP_SIZE`] labels are given.
    pub fn new<I, P>(name: impl Into<String>, positions: I) -> Result<Self, DataValidationError>
    where
        I: IntoIterator<Item = P>,
        P: Into<Position>,
    {
        let name = name.into();
        let positions: Vec<Position> = positions.into_iter().map(Into::into).collect();
        if positions.len() != LINEUP_SIZE {
            return Err(DataValidationError::WrongPositionCount {
                formation: name,
                count: positions.len(),
            });
        }
        Ok(Self {
            name,
            positions: positions.into_iter().collect(),
        })
    }

    /// Looks up a built-in formation.
    ///
    /// Names are matched ignoring dashes, whitespace and case, so `"442"`,
    /// `"4-4-2"` and `"4 4 2"` are equivalent.
    pub fn builtin(name: &str) -> Result<Self, DataValidationError> {
        let key = formation_key(name);
        BUILTIN_FORMATIONS
            .iter()
            .find(|(builtin, _)| formation_key(builtin) == key)
            .map(|(builtin, positions)| Self {
                name: (*builtin).to_owned(),
                positions: positions.iter().copied().map(Position::new).collect(),
            })
            .ok_or_else(|| DataValidationError::UnknownFormation {
                name: name.to_owned(),
            })
    }

    /// Names of all built-in formations, in table order.
    pub fn builtin_names() -> impl Iterator<Item = &'static str> {
        BUILTIN_FORMATIONS.iter().map(|(name, _)| *name)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    /// Number of slots carrying `position`.
    #[must_use]
    pub fn slot_count(&self, position: &Position) -> usize {
        self.positions.iter().filter(|p| *p == position).count()
    }
}

fn formation_key(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}
