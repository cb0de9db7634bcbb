use crate::store::StoreError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A finished game, kept for statistics.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameRecord {
    pub game_id: String,
    pub players: Vec<String>,
    pub started: DateTime<Utc>,
    pub finished: DateTime<Utc>,
    pub winner: String,
}

/// The database of finished games.
#[derive(Clone)]
pub struct Archive {
    db: sled::Db,
    games: sled::Tree,
}

impl Archive {
    pub fn open(db: &sled::Db) -> Result<Self, StoreError> {
        Ok(Self {
            db: db.clone(),
            games: db.open_tree("archive")?,
        })
    }

    /// Appends a finished game to the archive.
    pub fn record(&self, record: &GameRecord) -> Result<(), StoreError> {
        let key = self.db.generate_id()?.to_be_bytes();
        self.games.insert(key, serde_json::to_vec(record)?)?;
        Ok(())
    }

    /// Gets every archived game, oldest first. Unreadable entries are skipped.
    pub fn past_games(&self) -> Vec<(u64, GameRecord)> {
        self.games
            .iter()
            .flat_map(|entry| entry.ok())
            .flat_map(|(key, value)| {
                let key = u64::from_be_bytes(key.as_ref().try_into().ok()?);
                let record = serde_json::from_slice::<GameRecord>(&value).ok()?;
                Some((key, record))
            })
            .collect()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn records_are_listed_in_order() {
        let db = sled::Config::new().temporary(true).open().unwrap();
        let archive = Archive::open(&db).unwrap();
        let now = Utc::now();
        for (id, winner) in [("ABCD", "Alice"), ("WXYZ", "Bob")] {
            archive
                .record(&GameRecord {
                    game_id: id.into(),
                    players: vec!["Alice".into(), "Bob".into()],
                    started: now,
                    finished: now,
                    winner: winner.into(),
                })
                .unwrap();
        }

        let games = archive.past_games();
        assert_eq!(games.len(), 2);
        assert!(games[0].0 < games[1].0);
        assert_eq!(games[0].1.winner, "Alice");
        assert_eq!(games[1].1.game_id, "WXYZ");
    }
}
