use super::color::Color;
use super::player::{Player, PlayerId};
use crate::error::ValidationError;
use rand::prelude::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

pub const MIN_PLAYERS: usize = 2;
pub const MAX_PLAYERS: usize = 6;

/// The ordered collection of players in a session.
#[derive(Clone, Serialize, Deserialize, Debug, Default)]
pub struct Roster {
    players: Vec<Player>,
}

impl Roster {
    /// Adds a player with the given starting score, returning their new identifier.
    pub fn add(&mut self, name: &str, color: Option<Color>, score: u32) -> Result<PlayerId, ValidationError> {
        if self.players.len() >= MAX_PLAYERS {
            return Err(ValidationError::RosterFull);
        }
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        let Some(color) = color else {
            return Err(ValidationError::MissingColor);
        };
        if !self.is_color_available(color) {
            return Err(ValidationError::ColorTaken);
        }
        let player = Player::new(name.to_string(), color, score);
        let id = player.id;
        self.players.push(player);
        Ok(id)
    }

    /// Removes the player with the given id, returning whether a player was removed.
    pub fn remove(&mut self, id: PlayerId) -> bool {
        let len = self.players.len();
        self.players.retain(|p| p.id != id);
        self.players.len() != len
    }

    /// Returns `true` iff no current player holds the color.
    pub fn is_color_available(&self, color: Color) -> bool {
        self.players.iter().all(|p| p.color != color)
    }

    /// Finds the index of the player with the given id.
    pub fn find(&self, id: PlayerId) -> Result<usize, ValidationError> {
        self.players
            .iter()
            .position(|p| p.id == id)
            .ok_or(ValidationError::PlayerNotFound)
    }

    pub fn get(&self, index: usize) -> Option<&Player> {
        self.players.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Player> {
        self.players.get_mut(index)
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Player> {
        self.players.iter()
    }

    /// Sets every player's score.
    pub fn reset_scores(&mut self, score: u32) {
        for player in self.players.iter_mut() {
            player.score = score;
        }
    }

    /// Randomises the turn order.
    pub fn shuffle(&mut self, rng: &mut impl Rng) {
        self.players.shuffle(rng);
    }

    pub fn clear(&mut self) {
        self.players.clear();
    }
}
