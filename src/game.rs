use self::color::Color;
pub use self::options::GameOptions;
use self::player::{Player, PlayerId};
use self::roster::{Roster, MIN_PLAYERS};
use self::selection::Selection;
use self::situation::{Level, Situation};
use self::snapshot::{Snapshot, SnapshotPlayer};
use self::turn::TurnSequencer;
use crate::error::ValidationError;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

pub mod color;
pub mod options;
pub mod player;
mod roster;
mod scoring;
mod selection;
pub mod situation;
pub mod snapshot;
mod test;
mod turn;
pub mod update;

/// A scorekeeping session for a game of Empathy Express.
#[derive(Clone, Debug)]
pub struct Game {
    opts: GameOptions,
    roster: Roster,
    level: Option<Level>,
    state: GameState,
    rng: rand_chacha::ChaCha8Rng,
}

/// Represents the current phase in the game loop.
#[derive(Clone, Debug)]
enum GameState {
    /// Players are being added and removed.
    Setup,
    Playing {
        turn: TurnSequencer,
        /// The award prompt, if it is open.
        prompt: Option<Selection>,
        /// The situation being shown, in games with levels.
        situation: Option<&'static Situation>,
    },
    Finished {
        winner: PlayerId,
    },
}

/// The coarse phase of a game, which governs which actions are valid.
#[derive(Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Debug)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    Setup,
    InProgress,
    Finished,
}

impl Game {
    /// Creates a new game in the setup phase.
    pub fn new(opts: GameOptions, seed: u64) -> Self {
        Self {
            opts,
            roster: Roster::default(),
            level: None,
            state: GameState::Setup,
            rng: rand_chacha::ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Rebuilds an in-progress game from a snapshot taken when it started.
    /// Turn order is kept as it was, and scores start over.
    pub fn restore(snapshot: &Snapshot, seed: u64) -> Result<Self, ValidationError> {
        snapshot.options.validate()?;
        let mut game = Self::new(snapshot.options, seed);
        for player in &snapshot.players {
            game.add_player(&player.name, Some(player.color))?;
        }
        if let Some(level) = snapshot.level {
            game.select_level(level)?;
        }
        game.check_can_start()?;
        game.begin();
        Ok(game)
    }

    pub fn phase(&self) -> Phase {
        match self.state {
            GameState::Setup => Phase::Setup,
            GameState::Playing { .. } => Phase::InProgress,
            GameState::Finished { .. } => Phase::Finished,
        }
    }

    pub fn game_over(&self) -> bool {
        matches!(self.state, GameState::Finished { .. })
    }

    pub fn num_players(&self) -> usize {
        self.roster.len()
    }

    /// Gets the players in turn order.
    pub fn players(&self) -> impl Iterator<Item = &'_ Player> {
        self.roster.iter()
    }

    /// Finds the player with the given id.
    pub fn player(&self, id: PlayerId) -> Result<&Player, ValidationError> {
        let idx = self.roster.find(id)?;
        self.roster.get(idx).ok_or(ValidationError::PlayerNotFound)
    }

    /// Returns `true` iff no current player holds the color.
    pub fn is_color_available(&self, color: Color) -> bool {
        self.roster.is_color_available(color)
    }

    /// The colors not yet taken, in palette order.
    pub fn available_colors(&self) -> Vec<Color> {
        Color::ALL
            .into_iter()
            .filter(|c| self.is_color_available(*c))
            .collect()
    }

    pub fn level(&self) -> Option<Level> {
        self.level
    }

    /// The index of the player whose turn it is, while the game is in progress.
    pub fn turn_index(&self) -> Option<usize> {
        match &self.state {
            GameState::Playing { turn, .. } => Some(turn.index()),
            _ => None,
        }
    }

    /// The player whose turn it is, while the game is in progress.
    pub fn current_player(&self) -> Option<&Player> {
        self.turn_index().and_then(|idx| self.roster.get(idx))
    }

    /// The winning player, once the game is finished.
    pub fn winner(&self) -> Option<&Player> {
        match &self.state {
            GameState::Finished { winner } => self.player(*winner).ok(),
            _ => None,
        }
    }

    /// The situation currently shown, if any.
    pub fn situation(&self) -> Option<&'static Situation> {
        match &self.state {
            GameState::Playing { situation, .. } => *situation,
            _ => None,
        }
    }

    /// Adds a player to the roster.
    pub fn add_player(&mut self, name: &str, color: Option<Color>) -> Result<PlayerId, ValidationError> {
        let GameState::Setup = self.state else {
            return Err(ValidationError::InvalidAction);
        };
        self.roster.add(name, color, self.opts.starting_score)
    }

    /// Removes a player from the roster. Unknown ids are ignored.
    pub fn remove_player(&mut self, id: PlayerId) -> Result<(), ValidationError> {
        let GameState::Setup = self.state else {
            return Err(ValidationError::InvalidAction);
        };
        self.roster.remove(id);
        Ok(())
    }

    /// Chooses the level to play at.
    pub fn select_level(&mut self, level: Level) -> Result<(), ValidationError> {
        if !self.opts.levels {
            return Err(ValidationError::LevelsDisabled);
        }
        let GameState::Setup = self.state else {
            return Err(ValidationError::InvalidAction);
        };
        self.level = Some(level);
        Ok(())
    }

    /// Whether the game could be started right now.
    pub fn can_start(&self) -> bool {
        matches!(self.state, GameState::Setup) && self.check_can_start().is_ok()
    }

    /// Starts the game, shuffling the turn order.
    pub fn start_game(&mut self) -> Result<(), ValidationError> {
        let GameState::Setup = self.state else {
            return Err(ValidationError::InvalidAction);
        };
        self.check_can_start()?;
        self.roster.shuffle(&mut self.rng);
        self.begin();
        Ok(())
    }

    /// Returns the game to the setup phase with an empty roster.
    pub fn reset_game(&mut self) {
        self.roster.clear();
        self.level = None;
        self.state = GameState::Setup;
    }

    /// Shows the responses for the situation with the given label.
    pub fn select_situation(&mut self, label: &str) -> Result<(), ValidationError> {
        let level = self.level.ok_or(ValidationError::LevelsDisabled)?;
        let GameState::Playing { situation, .. } = &mut self.state else {
            return Err(ValidationError::InvalidAction);
        };
        let found = level.find_situation(label).ok_or(ValidationError::UnknownSituation)?;
        *situation = Some(found);
        Ok(())
    }

    /// Takes the snapshot that is persisted when the game starts.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            options: self.opts,
            players: self
                .roster
                .iter()
                .map(|p| SnapshotPlayer { name: p.name.clone(), color: p.color })
                .collect(),
            level: self.level,
        }
    }

    fn check_can_start(&self) -> Result<(), ValidationError> {
        if self.roster.len() < MIN_PLAYERS {
            return Err(ValidationError::TooFewPlayers);
        }
        if self.opts.requires_level(self.level) {
            return Err(ValidationError::LevelNotSelected);
        }
        Ok(())
    }

    fn begin(&mut self) {
        self.roster.reset_scores(self.opts.starting_score);
        self.state = GameState::Playing {
            turn: TurnSequencer::default(),
            prompt: None,
            situation: None,
        };
    }
}
