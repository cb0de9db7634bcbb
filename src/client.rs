use crate::{
    error::ValidationError,
    game::{color::Color, player::PlayerId, situation::Level, update::BoardUpdate, GameOptions},
    session::{lock, SessionHandle, SessionManager},
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::sync::watch;

/// A single game client, such as the scoreboard screen or a phone following along.
pub struct Client<'a> {
    manager: &'a SessionManager,
    session: Option<SessionHandle>,
    game_id: Option<String>,
    updates: Option<watch::Receiver<BoardUpdate>>,
}

/// An action performed on the game by a client.
#[derive(Serialize, Deserialize, Debug, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameAction {
    AddPlayer {
        name: String,
        #[serde(default)]
        color: Option<Color>,
    },
    RemovePlayer {
        #[serde(rename = "playerId")]
        player_id: PlayerId,
    },
    SelectLevel {
        level: Level,
    },
    StartGame,
    OpenAwardPrompt,
    CancelAwardPrompt,
    SelectTarget {
        #[serde(rename = "playerId")]
        player_id: PlayerId,
    },
    ConfirmAward,
    SkipTurn,
    SelectSituation {
        label: String,
    },
    ResetGame,
}

impl<'a> Client<'a> {
    /// Creates a new game client.
    pub fn new(manager: &'a SessionManager) -> Self {
        Self {
            manager,
            session: None,
            game_id: None,
            updates: None,
        }
    }

    /// Creates a new game session, returning its ID.
    pub fn create_game(&mut self, options: GameOptions) -> Result<String, ValidationError> {
        let session = self.manager.create_game(options)?;
        let id = lock(&session)?.id().to_owned();
        Ok(id)
    }

    /// Joins a game, after which the client receives its updates.
    pub fn join(&mut self, game_id: &str) -> Result<(), ValidationError> {
        let session = self.manager.find_game(game_id)?;
        self.updates = Some(lock(&session)?.subscribe());
        self.game_id = Some(game_id.to_string());
        self.session = Some(session);
        Ok(())
    }

    /// Waits until there is an update to the game state, then returns the latest state.
    pub async fn next_state(&mut self) -> Value {
        let Some(updates) = &mut self.updates else {
            return std::future::pending().await;
        };

        if updates.changed().await.is_err() {
            return std::future::pending().await;
        }
        let update = updates.borrow_and_update();

        json!({
            "gameId": self.game_id,
            "state": *update
        })
    }

    /// Leaves the game.
    pub fn leave(&mut self) {
        self.game_id = None;
        self.updates = None;
        self.session = None;
    }

    /// Performs an action on the joined game.
    pub fn perform(&self, action: GameAction) -> Result<(), ValidationError> {
        let session = self.session.as_ref().ok_or(ValidationError::NotInGame)?;
        let mut session = lock(session)?;
        match action {
            GameAction::StartGame => session.start_game(),
            GameAction::ResetGame => {
                session.reset_game();
                Ok(())
            }
            action => session.mutate_game(|game| match action {
                GameAction::AddPlayer { name, color } => game.add_player(&name, color).map(|_| ()),
                GameAction::RemovePlayer { player_id } => game.remove_player(player_id),
                GameAction::SelectLevel { level } => game.select_level(level),
                GameAction::OpenAwardPrompt => game.open_award_prompt(),
                GameAction::CancelAwardPrompt => game.cancel_award_prompt(),
                GameAction::SelectTarget { player_id } => game.select_target(player_id),
                GameAction::ConfirmAward => game.confirm_award(),
                GameAction::SkipTurn => game.skip_turn(),
                GameAction::SelectSituation { label } => game.select_situation(&label),
                GameAction::StartGame | GameAction::ResetGame => Err(ValidationError::InvalidAction),
            }),
        }
    }

    /// Keeps the game session alive.
    pub fn heartbeat(&self) {
        let Some(session) = &self.session else {
            return;
        };
        if let Ok(mut session) = lock(session) {
            session.heartbeat();
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::game::options::WinThreshold;
    use crate::game::Phase;

    fn manager() -> SessionManager {
        let db = sled::Config::new().temporary(true).open().unwrap();
        SessionManager::new(&db).unwrap()
    }

    fn add(client: &Client, name: &str, color: Color) {
        client
            .perform(GameAction::AddPlayer { name: name.into(), color: Some(color) })
            .unwrap();
    }

    #[test]
    fn actions_require_a_game() {
        let manager = manager();
        let client = Client::new(&manager);
        assert_eq!(client.perform(GameAction::StartGame), Err(ValidationError::NotInGame));
    }

    #[test]
    fn creating_a_game_with_bad_options_fails() {
        let manager = manager();
        let mut client = Client::new(&manager);
        let options = GameOptions {
            starting_score: u32::MAX,
            win_threshold: WinThreshold::exclusive(u32::MAX),
            ..Default::default()
        };
        assert_eq!(client.create_game(options), Err(ValidationError::InvalidGameOptions));
        assert_eq!(manager.num_games(), 0);
    }

    #[test]
    fn joining_an_unknown_game_fails() {
        let manager = manager();
        let mut client = Client::new(&manager);
        assert_eq!(client.join("ZZZZ"), Err(ValidationError::GameNotFound));
    }

    #[test]
    fn client_plays_a_game() {
        let manager = manager();
        let mut client = Client::new(&manager);
        let id = client.create_game(GameOptions::classic()).unwrap();
        client.join(&id).unwrap();

        add(&client, "Alice", Color::Red);
        add(&client, "Bob", Color::Blue);
        assert_eq!(
            client.perform(GameAction::AddPlayer { name: "Carol".into(), color: None }),
            Err(ValidationError::MissingColor)
        );
        client.perform(GameAction::StartGame).unwrap();

        let session = manager.find_game(&id).unwrap();
        let target = lock(&session).unwrap().game().players().next().unwrap().id;
        for _ in 0..19 {
            client.perform(GameAction::OpenAwardPrompt).unwrap();
            client.perform(GameAction::SelectTarget { player_id: target }).unwrap();
        }
        assert_eq!(lock(&session).unwrap().game().phase(), Phase::Finished);

        client.perform(GameAction::ResetGame).unwrap();
        assert_eq!(lock(&session).unwrap().game().num_players(), 0);
    }

    #[tokio::test]
    async fn joined_client_receives_state() {
        let manager = manager();
        let mut client = Client::new(&manager);
        let id = client.create_game(GameOptions::default()).unwrap();
        client.join(&id).unwrap();

        let state = client.next_state().await;
        assert_eq!(state["gameId"], id.as_str());
        assert_eq!(state["state"]["phase"], "setup");

        add(&client, "Alice", Color::Red);
        let state = client.next_state().await;
        assert_eq!(state["state"]["players"][0]["name"], "Alice");
    }

    #[test]
    fn actions_parse_from_json() {
        let action: GameAction =
            serde_json::from_value(json!({ "type": "add_player", "name": "Alice", "color": "red" })).unwrap();
        assert_eq!(action, GameAction::AddPlayer { name: "Alice".into(), color: Some(Color::Red) });

        let action: GameAction = serde_json::from_value(json!({ "type": "add_player", "name": "Alice" })).unwrap();
        assert_eq!(action, GameAction::AddPlayer { name: "Alice".into(), color: None });

        let action: GameAction =
            serde_json::from_value(json!({ "type": "select_level", "level": "Level 2" })).unwrap();
        assert_eq!(action, GameAction::SelectLevel { level: Level::Two });

        assert!(serde_json::from_value::<GameAction>(json!({ "type": "cheat" })).is_err());
    }
}
