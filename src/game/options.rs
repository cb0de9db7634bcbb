use super::situation::Level;
use crate::error::ValidationError;
use serde::{Deserialize, Serialize};

/// Options for customising a scorekeeping session.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct GameOptions {
    /// The score each player starts with.
    pub starting_score: u32,
    /// The score needed to win.
    pub win_threshold: WinThreshold,
    /// How points are awarded from the award prompt.
    pub award_mode: AwardMode,
    /// Whether the roster is snapshotted when the game starts.
    pub persistence: Persistence,
    /// Whether a level must be chosen and situations are shown.
    pub levels: bool,
}

/// The score at which a player wins.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WinThreshold {
    pub score: u32,
    /// When `false`, the score must strictly exceed `score`.
    pub inclusive: bool,
}

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AwardMode {
    /// Choosing a player in the award prompt awards them immediately.
    Single,
    /// Players are toggled in the award prompt, then the award is confirmed.
    Multi,
}

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Persistence {
    None,
    Snapshot,
}

impl WinThreshold {
    pub const fn inclusive(score: u32) -> Self {
        Self { score, inclusive: true }
    }

    pub const fn exclusive(score: u32) -> Self {
        Self { score, inclusive: false }
    }

    /// Whether the given score wins the game.
    pub fn is_reached(&self, score: u32) -> bool {
        match self.inclusive {
            true => score >= self.score,
            false => score > self.score,
        }
    }
}

impl Default for GameOptions {
    fn default() -> Self {
        Self {
            starting_score: 0,
            win_threshold: WinThreshold::inclusive(20),
            award_mode: AwardMode::Single,
            persistence: Persistence::None,
            levels: false,
        }
    }
}

impl GameOptions {
    /// Single-award scoreboard starting at one point, won on the twentieth point.
    pub fn classic() -> Self {
        Self {
            starting_score: 1,
            win_threshold: WinThreshold::exclusive(19),
            ..Default::default()
        }
    }

    /// Like [GameOptions::classic], but the roster survives a restart and a player must pass twenty.
    pub fn stored() -> Self {
        Self {
            starting_score: 1,
            win_threshold: WinThreshold::exclusive(20),
            persistence: Persistence::Snapshot,
            ..Default::default()
        }
    }

    /// Two-level play with batch awards.
    pub fn levels() -> Self {
        Self {
            award_mode: AwardMode::Multi,
            persistence: Persistence::Snapshot,
            levels: true,
            ..Default::default()
        }
    }

    /// Checks the options describe a playable game: a starting score of 0 or 1,
    /// and a winning score of 19 or 20 that nobody has reached at the start.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !matches!(self.starting_score, 0 | 1) || !matches!(self.win_threshold.score, 19 | 20) {
            return Err(ValidationError::InvalidGameOptions);
        }
        if self.win_threshold.is_reached(self.starting_score) {
            return Err(ValidationError::InvalidGameOptions);
        }
        Ok(())
    }

    /// Looks up a preset by name.
    pub fn preset(name: &str) -> Option<Self> {
        match name {
            "default" => Some(Self::default()),
            "classic" => Some(Self::classic()),
            "stored" => Some(Self::stored()),
            "levels" => Some(Self::levels()),
            _ => None,
        }
    }

    /// Whether a game with the given level selection still has to pick one before starting.
    pub fn requires_level(&self, level: Option<Level>) -> bool {
        self.levels && level.is_none()
    }
}
