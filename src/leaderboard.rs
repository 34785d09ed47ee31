//! Finished-game scores.
//!
//! Entries are append-only. With the `serde` feature the list is kept as JSON
//! in a [`KeyValueStore`] under [`LEADERBOARD_KEY`].

use std::collections::HashMap;
use std::fmt;

use parking_lot::Mutex;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Key the leaderboard is stored under.
pub const LEADERBOARD_KEY: &str = "leaderboard";

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LeaderboardEntry {
    pub name: String,
    pub score: f64,
    /// Difficulty label the game was played at
    pub difficulty: String,
}

impl LeaderboardEntry {
    pub fn new(name: impl Into<String>, score: f64, difficulty: impl Into<String>) -> Self {
        LeaderboardEntry {
            name: name.into(),
            score,
            difficulty: difficulty.into(),
        }
    }
}

/// Error type for leaderboard persistence
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeaderboardError {
    /// The backing store failed
    Store { reason: String },
    /// Stored data could not be read back
    Corrupt { reason: String },
}

impl fmt::Display for LeaderboardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LeaderboardError::Store { reason } => write!(f, "Leaderboard store failed: {reason}"),
            LeaderboardError::Corrupt { reason } => {
                write!(f, "Stored leaderboard is unreadable: {reason}")
            }
        }
    }
}

impl std::error::Error for LeaderboardError {}

/// String key-value storage the leaderboard persists into.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, LeaderboardError>;
    fn set(&self, key: &str, value: String) -> Result<(), LeaderboardError>;
}

#[derive(Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, LeaderboardError> {
        Ok(self.values.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: String) -> Result<(), LeaderboardError> {
        self.values.lock().insert(key.to_string(), value);
        Ok(())
    }
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for std::sync::Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>, LeaderboardError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: String) -> Result<(), LeaderboardError> {
        (**self).set(key, value)
    }
}

#[derive(Default)]
pub struct Leaderboard {
    entries: Mutex<Vec<LeaderboardEntry>>,
    #[cfg(feature = "serde")]
    store: Option<Box<dyn KeyValueStore>>,
}

impl Leaderboard {
    /// An in-memory leaderboard.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A leaderboard backed by `store`, loaded from whatever it already holds.
    #[cfg(feature = "serde")]
    pub fn load<S: KeyValueStore + 'static>(store: S) -> Result<Self, LeaderboardError> {
        let entries = match store.get(LEADERBOARD_KEY)? {
            Some(json) => serde_json::from_str(&json).map_err(|e| LeaderboardError::Corrupt {
                reason: e.to_string(),
            })?,
            None => Vec::new(),
        };
        Ok(Leaderboard {
            entries: Mutex::new(entries),
            store: Some(Box::new(store)),
        })
    }

    /// Append an entry and persist the list.
    pub fn record(&self, entry: LeaderboardEntry) -> Result<(), LeaderboardError> {
        log::info!(
            "{} scored {} at {}",
            entry.name,
            entry.score,
            entry.difficulty
        );
        let mut entries = self.entries.lock();
        entries.push(entry);
        self.persist(&entries)
    }

    #[cfg(feature = "serde")]
    fn persist(&self, entries: &[LeaderboardEntry]) -> Result<(), LeaderboardError> {
        let Some(store) = &self.store else {
            return Ok(());
        };
        let json = serde_json::to_string(entries).map_err(|e| LeaderboardError::Store {
            reason: e.to_string(),
        })?;
        store.set(LEADERBOARD_KEY, json)
    }

    #[cfg(not(feature = "serde"))]
    fn persist(&self, _entries: &[LeaderboardEntry]) -> Result<(), LeaderboardError> {
        Ok(())
    }

    /// Entries in recording order.
    #[must_use]
    pub fn entries(&self) -> Vec<LeaderboardEntry> {
        self.entries.lock().clone()
    }

    /// Entries by descending score; equal scores keep recording order.
    #[must_use]
    pub fn ranked(&self) -> Vec<LeaderboardEntry> {
        let mut ranked = self.entries();
        ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
        ranked
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
