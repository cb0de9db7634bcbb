use super::options::AwardMode;
use super::player::PlayerId;
use super::selection::Selection;
use super::{Game, GameState};
use crate::error::ValidationError;

impl Game {
    /// Opens the prompt for choosing who receives a point.
    pub fn open_award_prompt(&mut self) -> Result<(), ValidationError> {
        let GameState::Playing { prompt, .. } = &mut self.state else {
            return Err(ValidationError::InvalidAction);
        };
        prompt.get_or_insert_with(Selection::default);
        Ok(())
    }

    /// Closes the award prompt without awarding anything.
    pub fn cancel_award_prompt(&mut self) -> Result<(), ValidationError> {
        let GameState::Playing { prompt, .. } = &mut self.state else {
            return Err(ValidationError::InvalidAction);
        };
        *prompt = None;
        Ok(())
    }

    /// Called when a player is picked in the award prompt.
    /// In single mode this awards the point straight away; in multi mode it toggles the pick.
    pub fn select_target(&mut self, player: PlayerId) -> Result<(), ValidationError> {
        self.roster.find(player)?;
        let GameState::Playing { prompt: Some(selection), .. } = &mut self.state else {
            return Err(ValidationError::InvalidAction);
        };
        if self.opts.award_mode == AwardMode::Multi {
            selection.toggle(player);
            return Ok(());
        }
        self.award_point(player)
    }

    /// Awards a point to every player picked in the award prompt.
    pub fn confirm_award(&mut self) -> Result<(), ValidationError> {
        if self.opts.award_mode != AwardMode::Multi {
            return Err(ValidationError::InvalidAction);
        }
        let GameState::Playing { prompt: Some(selection), .. } = &mut self.state else {
            return Err(ValidationError::InvalidAction);
        };
        if selection.is_empty() {
            return Err(ValidationError::NoTargetSelected);
        }
        let targets = selection.take();
        self.award_points(&targets)
    }

    /// Awards a point to a single player.
    pub fn award_point(&mut self, player: PlayerId) -> Result<(), ValidationError> {
        self.award_points(&[player])
    }

    /// Awards a point to each of the given players. Ids of players not on the roster are skipped,
    /// and each player scores at most once.
    ///
    /// If any player has now won, the game is over. Otherwise the prompt is closed and the turn passes on.
    pub fn award_points(&mut self, players: &[PlayerId]) -> Result<(), ValidationError> {
        if !matches!(self.state, GameState::Playing { .. }) {
            return Err(ValidationError::InvalidAction);
        }

        let mut awarded = vec![];
        for id in players {
            let Ok(idx) = self.roster.find(*id) else {
                continue;
            };
            if !awarded.contains(&idx) {
                awarded.push(idx);
            }
        }
        if awarded.is_empty() {
            return Err(ValidationError::NoTargetSelected);
        }

        for idx in awarded {
            if let Some(player) = self.roster.get_mut(idx) {
                player.score = player.score.saturating_add(1);
            }
        }

        if let Some(winner) = self.check_winner() {
            self.state = GameState::Finished { winner };
            return Ok(());
        }

        if let GameState::Playing { turn, prompt, .. } = &mut self.state {
            *prompt = None;
            turn.advance(self.roster.len());
        }
        Ok(())
    }

    /// Passes the turn to the next player without awarding anything.
    pub fn skip_turn(&mut self) -> Result<(), ValidationError> {
        let GameState::Playing { turn, prompt, .. } = &mut self.state else {
            return Err(ValidationError::InvalidAction);
        };
        *prompt = None;
        turn.advance(self.roster.len());
        Ok(())
    }

    /// Finds the player who has won, if any.
    /// When several players reach the threshold at once, the highest score wins,
    /// then the earliest in turn order.
    fn check_winner(&self) -> Option<PlayerId> {
        let threshold = self.opts.win_threshold;
        let mut winner: Option<(PlayerId, u32)> = None;
        for player in self.roster.iter().filter(|p| threshold.is_reached(p.score)) {
            if winner.map_or(true, |(_, score)| player.score > score) {
                winner = Some((player.id, player.score));
            }
        }
        winner.map(|(id, _)| id)
    }
}
