use opteam_core::PlayerId;
use serde::Deserialize;

/// Hand-written lineup accepted by `opteam evaluate`.
///
/// `players` lists one player id per formation slot, in slot order.
#[derive(Debug, Clone, Deserialize)]
pub struct LineupFile {
    pub formation: String,
    pub players: Vec<PlayerId>,
}
