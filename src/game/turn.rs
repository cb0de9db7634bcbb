use serde::{Deserialize, Serialize};

/// Tracks whose turn it is.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, Default, PartialEq, Eq)]
pub struct TurnSequencer {
    index: usize,
}

impl TurnSequencer {
    /// Index into the roster of the player whose turn it is.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Passes the turn to the next player, wrapping around. Does nothing with no players.
    pub fn advance(&mut self, num_players: usize) {
        if num_players == 0 {
            return;
        }
        self.index = (self.index + 1) % num_players;
    }
}
