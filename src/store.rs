use crate::game::snapshot::{Snapshot, SnapshotPlayer};
use crate::game::{situation::Level, GameOptions};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database error: {0}")]
    Db(#[from] sled::Error),
    #[error("malformed snapshot: {0}")]
    Json(#[from] serde_json::Error),
    #[error("malformed level: {0}")]
    Level(String),
    #[cfg(test)]
    #[error("store is unavailable")]
    Poisoned,
}

/// Somewhere a game's roster can be snapshotted when it starts, and read back after a restart.
pub trait SessionStore: Send {
    fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError>;
    fn load(&self) -> Result<Option<Snapshot>, StoreError>;
    fn clear(&self) -> Result<(), StoreError>;
}

/// The sled trees that snapshots are kept in.
#[derive(Clone)]
pub struct SnapshotTrees {
    /// The roster of each game, as a list of names and colors.
    players: sled::Tree,
    /// The level label of each game that has one.
    levels: sled::Tree,
    /// The options each game was created with.
    options: sled::Tree,
}

/// Snapshot storage for a single game, keyed by its game ID.
pub struct SledStore {
    id: String,
    trees: SnapshotTrees,
}

/// A snapshot held in memory only.
#[cfg(test)]
#[derive(Clone, Default)]
pub struct MemoryStore {
    slot: std::sync::Arc<std::sync::Mutex<Option<Snapshot>>>,
}

impl SnapshotTrees {
    pub fn open(db: &sled::Db) -> Result<Self, StoreError> {
        Ok(Self {
            players: db.open_tree("players")?,
            levels: db.open_tree("levels")?,
            options: db.open_tree("options")?,
        })
    }

    /// Gets the IDs of all games that have a snapshot.
    pub fn ids(&self) -> Vec<String> {
        self.players
            .iter()
            .keys()
            .flat_map(|key| key.ok())
            .flat_map(|key| String::from_utf8(key.to_vec()).ok())
            .collect()
    }

    pub fn store(&self, id: &str) -> SledStore {
        SledStore {
            id: id.to_string(),
            trees: self.clone(),
        }
    }
}

impl SessionStore for SledStore {
    fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        let key = self.id.as_bytes();
        self.trees
            .players
            .insert(key, serde_json::to_vec(&snapshot.players)?)?;
        self.trees
            .options
            .insert(key, serde_json::to_vec(&snapshot.options)?)?;
        match snapshot.level {
            Some(level) => self.trees.levels.insert(key, level.to_string().as_bytes())?,
            None => self.trees.levels.remove(key)?,
        };
        Ok(())
    }

    fn load(&self) -> Result<Option<Snapshot>, StoreError> {
        let key = self.id.as_bytes();
        let Some(players) = self.trees.players.get(key)? else {
            return Ok(None);
        };
        let players: Vec<SnapshotPlayer> = serde_json::from_slice(&players)?;
        let options: GameOptions = match self.trees.options.get(key)? {
            Some(options) => serde_json::from_slice(&options)?,
            None => GameOptions::stored(),
        };
        let level = match self.trees.levels.get(key)? {
            Some(label) => {
                let label = String::from_utf8_lossy(&label);
                Some(label.parse::<Level>().map_err(StoreError::Level)?)
            }
            None => None,
        };
        Ok(Some(Snapshot { options, players, level }))
    }

    fn clear(&self) -> Result<(), StoreError> {
        let key = self.id.as_bytes();
        self.trees.players.remove(key)?;
        self.trees.levels.remove(key)?;
        self.trees.options.remove(key)?;
        Ok(())
    }
}

#[cfg(test)]
impl SessionStore for MemoryStore {
    fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        *self.slot.lock().map_err(|_| StoreError::Poisoned)? = Some(snapshot.clone());
        Ok(())
    }

    fn load(&self) -> Result<Option<Snapshot>, StoreError> {
        Ok(self.slot.lock().map_err(|_| StoreError::Poisoned)?.clone())
    }

    fn clear(&self) -> Result<(), StoreError> {
        *self.slot.lock().map_err(|_| StoreError::Poisoned)? = None;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::game::color::Color;

    fn temp_db() -> sled::Db {
        sled::Config::new().temporary(true).open().unwrap()
    }

    fn snapshot(level: Option<Level>) -> Snapshot {
        Snapshot {
            options: GameOptions::levels(),
            players: vec![
                SnapshotPlayer { name: "Alice".into(), color: Color::Red },
                SnapshotPlayer { name: "Bob".into(), color: Color::Blue },
            ],
            level,
        }
    }

    #[test]
    fn absent_snapshot_means_no_game() {
        let trees = SnapshotTrees::open(&temp_db()).unwrap();
        assert!(trees.store("ABCD").load().unwrap().is_none());
        assert!(trees.ids().is_empty());
    }

    #[test]
    fn sled_store_keeps_players_and_level() {
        let trees = SnapshotTrees::open(&temp_db()).unwrap();
        let store = trees.store("ABCD");
        store.save(&snapshot(Some(Level::Two))).unwrap();

        assert_eq!(store.load().unwrap(), Some(snapshot(Some(Level::Two))));
        assert_eq!(trees.ids(), vec!["ABCD".to_string()]);
        assert!(trees.store("WXYZ").load().unwrap().is_none());
    }

    #[test]
    fn stored_values_are_plain_text() {
        let db = temp_db();
        let trees = SnapshotTrees::open(&db).unwrap();
        trees.store("ABCD").save(&snapshot(Some(Level::One))).unwrap();

        let level = db.open_tree("levels").unwrap().get("ABCD").unwrap().unwrap();
        assert_eq!(&level[..], b"Level 1");
        let players = db.open_tree("players").unwrap().get("ABCD").unwrap().unwrap();
        let players: serde_json::Value = serde_json::from_slice(&players).unwrap();
        assert_eq!(players, serde_json::json!([
            { "name": "Alice", "color": "red" },
            { "name": "Bob", "color": "blue" }
        ]));
    }

    #[test]
    fn saving_without_a_level_drops_the_old_one() {
        let trees = SnapshotTrees::open(&temp_db()).unwrap();
        let store = trees.store("ABCD");
        store.save(&snapshot(Some(Level::One))).unwrap();
        store.save(&snapshot(None)).unwrap();
        assert_eq!(store.load().unwrap().unwrap().level, None);
    }

    #[test]
    fn clear_removes_the_snapshot() {
        let trees = SnapshotTrees::open(&temp_db()).unwrap();
        let store = trees.store("ABCD");
        store.save(&snapshot(Some(Level::One))).unwrap();
        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
        assert!(trees.ids().is_empty());
    }

    #[test]
    fn memory_store_round_trip() {
        let store = MemoryStore::default();
        assert!(store.load().unwrap().is_none());
        store.save(&snapshot(None)).unwrap();
        assert_eq!(store.load().unwrap(), Some(snapshot(None)));
        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
    }
}
