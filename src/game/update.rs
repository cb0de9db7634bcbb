use super::color::Color;
use super::player::{Player, PlayerId};
use super::situation::{Level, Situation};
use super::{Game, GameOptions, GameState, Phase};
use serde::Serialize;

/// Everything a connected screen needs to render the game.
#[derive(Clone, Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct BoardUpdate {
    pub phase: Phase,
    pub options: GameOptions,
    pub players: Vec<PublicPlayer>,
    pub available_colors: Vec<Color>,
    pub can_start: bool,
    pub current_player: Option<PlayerId>,
    pub prompt: Option<AwardPrompt>,
    pub winner: Option<PublicPlayer>,
    pub level: Option<Level>,
    pub situations: Vec<&'static str>,
    pub situation: Option<Situation>,
}

#[derive(Clone, Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct PublicPlayer {
    pub id: PlayerId,
    pub name: String,
    pub color: Color,
    pub score: u32,
}

#[derive(Clone, Serialize, Debug)]
pub struct AwardPrompt {
    pub selected: Vec<PlayerId>,
}

impl From<&Player> for PublicPlayer {
    fn from(player: &Player) -> Self {
        Self {
            id: player.id,
            name: player.name.clone(),
            color: player.color,
            score: player.score,
        }
    }
}

impl Game {
    pub fn get_update(&self) -> BoardUpdate {
        let players = self.players().map(PublicPlayer::from).collect::<Vec<_>>();
        let winner = self.winner().map(PublicPlayer::from);
        let prompt = match &self.state {
            GameState::Playing { prompt: Some(selection), .. } => Some(AwardPrompt {
                selected: selection.targets().to_vec(),
            }),
            _ => None,
        };
        let situations = match (self.phase(), self.level()) {
            (Phase::InProgress, Some(level)) => level.situations().iter().map(|s| s.label).collect(),
            _ => vec![],
        };

        BoardUpdate {
            phase: self.phase(),
            options: self.opts,
            players,
            available_colors: self.available_colors(),
            can_start: self.can_start(),
            current_player: self.current_player().map(|p| p.id),
            prompt,
            winner,
            level: self.level(),
            situations,
            situation: self.situation().copied(),
        }
    }
}
