use super::{color::Color, situation::Level, GameOptions};
use serde::{Deserialize, Serialize};

/// A point-in-time copy of a roster, taken when a game starts.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct Snapshot {
    pub options: GameOptions,
    pub players: Vec<SnapshotPlayer>,
    pub level: Option<Level>,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct SnapshotPlayer {
    pub name: String,
    pub color: Color,
}
