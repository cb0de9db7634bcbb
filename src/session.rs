use crate::archive::{Archive, GameRecord};
use crate::error::ValidationError;
use crate::game::options::Persistence;
use crate::game::update::BoardUpdate;
use crate::game::{Game, GameOptions};
use crate::store::{SessionStore, SnapshotTrees, StoreError};
use chrono::Utc;
use dashmap::{mapref::entry::Entry, DashMap};
use rand::{Rng, RngCore};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tokio::sync::watch;

/// Manages all the game sessions running on the server.
pub struct SessionManager {
    sessions: DashMap<String, SessionHandle>,
    dbs: Dbs,
}

/// The databases that games are persisted to.
#[derive(Clone)]
struct Dbs {
    snapshots: SnapshotTrees,
    archive: Archive,
}

/// A single scorekeeping session.
pub struct Session {
    /// The game ID.
    id: String,
    /// The game itself.
    game: Game,
    /// Where the roster is snapshotted when the game starts, if the game is persisted.
    store: Option<Box<dyn SessionStore>>,
    /// Where the game is recorded once it is won.
    archive: Option<Archive>,
    /// Channel for sending game state updates to clients.
    updates: watch::Sender<BoardUpdate>,
    /// Timestamp that the game was started.
    started_ts: Option<chrono::DateTime<Utc>>,
    /// Whether this game has been archived.
    archived: bool,
    /// Timestamp of the last time this session was interacted with.
    last_ts: Instant,
}

pub type SessionHandle = Arc<Mutex<Session>>;

/// Locks a session, treating a poisoned session as gone.
pub fn lock(session: &SessionHandle) -> Result<MutexGuard<'_, Session>, ValidationError> {
    session.lock().map_err(|_| ValidationError::GameNotFound)
}

impl SessionManager {
    pub fn new(db: &sled::Db) -> Result<Self, StoreError> {
        let sessions = DashMap::new();
        let dbs = Dbs {
            snapshots: SnapshotTrees::open(db)?,
            archive: Archive::open(db)?,
        };
        for id in dbs.snapshots.ids() {
            let store = dbs.snapshots.store(&id);
            let snapshot = match store.load() {
                Ok(Some(snapshot)) => snapshot,
                Ok(None) => continue,
                Err(err) => {
                    log::error!("Could not load snapshot for {}: {}", id, err);
                    continue;
                }
            };
            let game = match Game::restore(&snapshot, Self::random_seed()) {
                Ok(game) => game,
                Err(err) => {
                    log::warn!("Discarding snapshot for {}: {}", id, err);
                    store.clear().ok();
                    continue;
                }
            };
            log::info!("Restored game {} with {} players", id, game.num_players());
            let session = Session::new(id.clone(), game, Some(Box::new(store)), Some(dbs.archive.clone()));
            sessions.insert(id, Arc::new(Mutex::new(session)));
        }
        Ok(Self { sessions, dbs })
    }

    pub fn create_game(&self, options: GameOptions) -> Result<SessionHandle, ValidationError> {
        options.validate()?;
        loop {
            let id = Self::random_id();
            let entry = self.sessions.entry(id);
            if let Entry::Occupied(_) = entry {
                continue;
            }
            let id = entry.key().clone();
            let store: Option<Box<dyn SessionStore>> = match options.persistence {
                Persistence::Snapshot => Some(Box::new(self.dbs.snapshots.store(&id))),
                Persistence::None => None,
            };
            let game = Game::new(options, Self::random_seed());
            let session = Session::new(id.clone(), game, store, Some(self.dbs.archive.clone()));
            let session = Arc::new(Mutex::new(session));
            entry.or_insert(session.clone());
            log::info!("Created game {}", id);
            break Ok(session);
        }
    }

    pub fn find_game(&self, game_id: &str) -> Result<SessionHandle, ValidationError> {
        self.sessions
            .get(game_id)
            .map(|session| session.clone())
            .ok_or(ValidationError::GameNotFound)
    }

    pub fn num_games(&self) -> usize {
        self.sessions.len()
    }

    /// Gets every finished game that has been archived.
    pub fn past_games(&self) -> Vec<(u64, GameRecord)> {
        self.dbs.archive.past_games()
    }

    /// Removes sessions that have not been interacted with for longer than `ttl`.
    pub fn purge_games(&self, ttl: Duration) {
        let mut ids_to_delete = vec![];

        // Find expired sessions
        for session in self.sessions.iter() {
            let game_id = session.key();
            let Ok(session) = session.lock() else {
                log::error!("Found poisoned session: {}", game_id);
                ids_to_delete.push(game_id.clone());
                continue;
            };
            if session.last_ts.elapsed() > ttl {
                session.clear_snapshot();
                ids_to_delete.push(game_id.clone());
            }
        }

        for game_id in ids_to_delete.into_iter() {
            log::info!("Purging game {}", game_id);
            self.sessions.remove(&game_id);
        }
    }

    fn random_id() -> String {
        let mut rng = rand::thread_rng();
        (0..4).map(|_| rng.gen_range('A'..='Z')).collect()
    }

    fn random_seed() -> u64 {
        rand::thread_rng().next_u64()
    }
}

impl Session {
    pub fn new(id: String, game: Game, store: Option<Box<dyn SessionStore>>, archive: Option<Archive>) -> Self {
        let started_ts = game.turn_index().map(|_| Utc::now());
        let updates = watch::channel(game.get_update()).0;
        Self {
            id,
            game,
            store,
            archive,
            updates,
            started_ts,
            archived: false,
            last_ts: Instant::now(),
        }
    }

    /// Gets the unique game ID.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    /// Returns a stream of updates for the game, starting with the current state.
    pub fn subscribe(&mut self) -> watch::Receiver<BoardUpdate> {
        let rx = self.updates.subscribe();
        self.notify();
        rx
    }

    /// Starts the game, snapshotting the roster if the game is persisted.
    pub fn start_game(&mut self) -> Result<(), ValidationError> {
        self.game.start_game()?;
        self.started_ts = Some(Utc::now());
        if let Some(store) = &self.store {
            if let Err(err) = store.save(&self.game.snapshot()) {
                log::error!("Could not save snapshot for {}: {}", self.id, err);
            }
        }
        log::info!("Started game {} with {} players", self.id, self.game.num_players());
        self.notify();
        Ok(())
    }

    /// Clears the roster and any snapshot, returning to setup.
    pub fn reset_game(&mut self) {
        self.game.reset_game();
        self.clear_snapshot();
        self.started_ts = None;
        self.archived = false;
        log::info!("Reset game {}", self.id);
        self.notify();
    }

    /// Performs an action on the game.
    pub fn mutate_game<F, T>(&mut self, mutation: F) -> Result<T, ValidationError>
    where
        F: FnOnce(&mut Game) -> Result<T, ValidationError>,
    {
        let result = mutation(&mut self.game)?;
        self.archive();
        self.notify();
        Ok(result)
    }

    /// Keeps the game session alive.
    pub fn heartbeat(&mut self) {
        self.last_ts = Instant::now();
    }

    /// Notifies all connected clients of the new game state.
    fn notify(&mut self) {
        self.updates.send_replace(self.game.get_update());
        self.last_ts = Instant::now();
    }

    fn clear_snapshot(&self) {
        if let Some(store) = &self.store {
            if let Err(err) = store.clear() {
                log::error!("Could not clear snapshot for {}: {}", self.id, err);
            }
        }
    }

    /// Archives the game if it is over and hasn't been archived yet.
    fn archive(&mut self) {
        if self.archived {
            return;
        }
        let Some(winner) = self.game.winner() else {
            return;
        };
        log::info!("{} won game {}", winner.name, self.id);
        self.archived = true;

        let Some(archive) = &self.archive else {
            return;
        };
        let finished = Utc::now();
        let record = GameRecord {
            game_id: self.id.clone(),
            players: self.game.players().map(|p| p.name.clone()).collect(),
            started: self.started_ts.unwrap_or(finished),
            finished,
            winner: winner.name.clone(),
        };
        if let Err(err) = archive.record(&record) {
            log::error!("Could not archive game {}: {}", self.id, err);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::game::color::Color;
    use crate::game::Phase;
    use crate::store::MemoryStore;

    fn temp_db() -> sled::Db {
        sled::Config::new().temporary(true).open().unwrap()
    }

    fn add_two_players(session: &mut Session) {
        session
            .mutate_game(|game| game.add_player("Alice", Some(Color::Red)))
            .unwrap();
        session
            .mutate_game(|game| game.add_player("Bob", Some(Color::Blue)))
            .unwrap();
    }

    #[test]
    fn starting_saves_a_snapshot_and_reset_clears_it() {
        let store = MemoryStore::default();
        let game = Game::new(GameOptions::stored(), 1);
        let mut session = Session::new("ABCD".into(), game, Some(Box::new(store.clone())), None);
        add_two_players(&mut session);
        assert!(store.load().unwrap().is_none());

        session.start_game().unwrap();
        let snapshot = store.load().unwrap().unwrap();
        let names = session.game().players().map(|p| p.name.clone()).collect::<Vec<_>>();
        assert_eq!(snapshot.players.iter().map(|p| p.name.clone()).collect::<Vec<_>>(), names);

        session.reset_game();
        assert!(store.load().unwrap().is_none());
        assert_eq!(session.game().phase(), Phase::Setup);
    }

    #[test]
    fn scores_are_not_persisted_after_start() {
        let store = MemoryStore::default();
        let game = Game::new(GameOptions::stored(), 1);
        let mut session = Session::new("ABCD".into(), game, Some(Box::new(store.clone())), None);
        add_two_players(&mut session);
        session.start_game().unwrap();

        let first = session.game().players().next().unwrap().id;
        session.mutate_game(|game| game.award_point(first)).unwrap();

        let restored = Game::restore(&store.load().unwrap().unwrap(), 2).unwrap();
        assert!(restored.players().all(|p| p.score == 1));
    }

    #[test]
    fn subscribers_see_every_change() {
        let game = Game::new(GameOptions::default(), 1);
        let mut session = Session::new("ABCD".into(), game, None, None);
        let mut rx = session.subscribe();
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().players.len(), 0);

        add_two_players(&mut session);
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().players.len(), 2);
    }

    #[test]
    fn rejected_actions_leave_the_game_untouched() {
        let game = Game::new(GameOptions::default(), 1);
        let mut session = Session::new("ABCD".into(), game, None, None);
        add_two_players(&mut session);
        let result = session.mutate_game(|game| game.add_player("Carol", Some(Color::Red)));
        assert_eq!(result, Err(ValidationError::ColorTaken));
        assert_eq!(session.game().num_players(), 2);
    }

    #[test]
    fn won_games_are_archived_once() {
        let db = temp_db();
        let archive = Archive::open(&db).unwrap();
        let game = Game::new(GameOptions::classic(), 1);
        let mut session = Session::new("ABCD".into(), game, None, Some(archive.clone()));
        add_two_players(&mut session);
        session.start_game().unwrap();

        let first = session.game().players().next().unwrap().id;
        while !session.game().game_over() {
            session.mutate_game(|game| game.award_point(first)).unwrap();
        }
        session.mutate_game(|_| Ok(())).unwrap();

        let games = archive.past_games();
        assert_eq!(games.len(), 1);
        assert_eq!(games[0].1.game_id, "ABCD");
        assert_eq!(Some(games[0].1.winner.as_str()), session.game().winner().map(|w| w.name.as_str()));
    }

    #[test]
    fn manager_restores_snapshotted_games() {
        let db = temp_db();
        let id = {
            let manager = SessionManager::new(&db).unwrap();
            let session = manager.create_game(GameOptions::stored()).unwrap();
            let mut session = lock(&session).unwrap();
            add_two_players(&mut session);
            session.start_game().unwrap();
            session.id().to_string()
        };

        let manager = SessionManager::new(&db).unwrap();
        assert_eq!(manager.num_games(), 1);
        let session = manager.find_game(&id).unwrap();
        let session = lock(&session).unwrap();
        assert_eq!(session.game().phase(), Phase::InProgress);
        assert_eq!(session.game().num_players(), 2);
    }

    #[test]
    fn unpersisted_games_are_not_restored() {
        let db = temp_db();
        {
            let manager = SessionManager::new(&db).unwrap();
            let session = manager.create_game(GameOptions::default()).unwrap();
            let mut session = lock(&session).unwrap();
            add_two_players(&mut session);
            session.start_game().unwrap();
        }
        let manager = SessionManager::new(&db).unwrap();
        assert_eq!(manager.num_games(), 0);
    }

    #[test]
    fn invalid_options_create_no_session() {
        let manager = SessionManager::new(&temp_db()).unwrap();
        let options = GameOptions {
            starting_score: 20,
            ..Default::default()
        };
        assert!(matches!(manager.create_game(options), Err(ValidationError::InvalidGameOptions)));
        assert_eq!(manager.num_games(), 0);
    }

    #[test]
    fn unknown_game_is_not_found() {
        let manager = SessionManager::new(&temp_db()).unwrap();
        assert!(matches!(manager.find_game("NOPE"), Err(ValidationError::GameNotFound)));
    }

    #[test]
    fn idle_games_are_purged() {
        let manager = SessionManager::new(&temp_db()).unwrap();
        manager.create_game(GameOptions::default()).unwrap();
        manager.purge_games(Duration::from_secs(3600));
        assert_eq!(manager.num_games(), 1);
        std::thread::sleep(Duration::from_millis(5));
        manager.purge_games(Duration::ZERO);
        assert_eq!(manager.num_games(), 0);
    }
}
