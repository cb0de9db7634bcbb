use super::player::PlayerId;
use serde::{Deserialize, Serialize};

/// The players picked in an open award prompt, in the order they were picked.
#[derive(Clone, Serialize, Deserialize, Debug, Default)]
pub struct Selection {
    targets: Vec<PlayerId>,
}

impl Selection {
    /// Picks the player, or unpicks them if they were already picked.
    pub fn toggle(&mut self, player: PlayerId) {
        match self.targets.iter().position(|p| *p == player) {
            Some(idx) => {
                self.targets.remove(idx);
            }
            None => self.targets.push(player),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn targets(&self) -> &[PlayerId] {
        &self.targets
    }

    /// Empties the selection, returning what was picked.
    pub fn take(&mut self) -> Vec<PlayerId> {
        std::mem::take(&mut self.targets)
    }
}
