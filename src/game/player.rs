use super::color::Color;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Uniquely identifies a player. Identifiers are never reused.
#[derive(Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Debug)]
#[serde(transparent)]
pub struct PlayerId(Uuid);

impl PlayerId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A game player.
#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub color: Color,
    pub score: u32,
}

impl Player {
    pub fn new(name: String, color: Color, score: u32) -> Self {
        Self {
            id: PlayerId::generate(),
            name,
            color,
            score,
        }
    }
}
