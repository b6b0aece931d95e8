use serde_json::{Map, Value};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use thorp_core::StrategyAdjustments;
use thorp_core::engine::clamp_deck_count;
use thorp_page::GameKind;
use tracing::{Level, event};

use crate::protocol::StatusReply;

/// Field names shared by every surface that reads or writes the store.
pub mod keys {
    pub const DETECTED_GAME: &str = "detectedGame";
    pub const DETECTED_URL: &str = "detectedUrl";
    pub const LAST_DETECTION: &str = "lastDetection";
    pub const RUNNING_COUNT: &str = "runningCount";
    pub const TRUE_COUNT: &str = "trueCount";
    pub const HIGH_LOW_INDEX: &str = "highLowIndex";
    pub const PLAYER_ADVANTAGE: &str = "playerAdvantage";
    pub const BET_RECOMMENDATION: &str = "betRecommendation";
    pub const CARDS_SEEN: &str = "cardsSeen";
    pub const DECK_COUNT: &str = "deckCount";
    pub const STRATEGY_ADJUSTMENTS: &str = "strategyAdjustments";
    pub const LAST_UPDATE: &str = "lastUpdate";
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read store {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write store {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("store {path:?} is not a JSON object: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode store: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Last-write-wins key/value mirror of the most recent count.
///
/// Writes are applied key by key with no transaction across fields.
pub trait PersistenceStore {
    fn get(&self, key: &str) -> Option<Value>;

    fn set_many(&mut self, entries: Map<String, Value>) -> Result<(), StoreError>;

    fn set(&mut self, key: &str, value: Value) -> Result<(), StoreError> {
        let mut entries = Map::new();
        entries.insert(key.to_string(), value);
        self.set_many(entries)
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: Map<String, Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl PersistenceStore for MemoryStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.values.get(key).cloned()
    }

    fn set_many(&mut self, entries: Map<String, Value>) -> Result<(), StoreError> {
        self.values.extend(entries);
        Ok(())
    }
}

/// Store persisted as a single pretty-printed JSON object.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    values: Map<String, Value>,
}

impl JsonFileStore {
    /// Open the store at `path`; a missing file is an empty store.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let values = match fs::read_to_string(&path) {
            Ok(text) if text.trim().is_empty() => Map::new(),
            Ok(text) => serde_json::from_str(&text).map_err(|source| StoreError::Parse {
                path: path.clone(),
                source,
            })?,
            Err(err) if err.kind() == io::ErrorKind::NotFound => Map::new(),
            Err(source) => return Err(StoreError::Read { path, source }),
        };
        Ok(Self { path, values })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| StoreError::Write {
                path: self.path.clone(),
                source,
            })?;
        }
        let bytes = serde_json::to_vec_pretty(&self.values)?;
        fs::write(&self.path, bytes).map_err(|source| StoreError::Write {
            path: self.path.clone(),
            source,
        })
    }
}

impl PersistenceStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.values.get(key).cloned()
    }

    fn set_many(&mut self, entries: Map<String, Value>) -> Result<(), StoreError> {
        let written = entries.len();
        self.values.extend(entries);
        self.flush()?;
        event!(
            target: "thorp::store",
            Level::DEBUG,
            path = %self.path.display(),
            written,
            "store updated"
        );
        Ok(())
    }
}

/// Entries written when the user resets the count from the popup.
pub fn reset_entries() -> Map<String, Value> {
    let mut entries = Map::new();
    entries.insert(keys::RUNNING_COUNT.into(), Value::from(0));
    entries.insert(keys::TRUE_COUNT.into(), Value::from(0));
    entries.insert(keys::HIGH_LOW_INDEX.into(), Value::from(0));
    entries.insert(keys::PLAYER_ADVANTAGE.into(), Value::from(0));
    entries.insert(keys::BET_RECOMMENDATION.into(), Value::from(1));
    entries.insert(keys::CARDS_SEEN.into(), Value::from(0));
    entries
}

/// What the popup shows: the stored mirror, optionally refreshed from a live
/// session.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredStatus {
    pub detected_game: Option<GameKind>,
    pub detected_url: Option<String>,
    pub running_count: i64,
    pub true_count: f64,
    pub high_low_index: f64,
    pub player_advantage: f64,
    pub bet_recommendation: u8,
    pub cards_seen: u64,
    pub deck_count: u8,
    pub strategy_adjustments: StrategyAdjustments,
}

impl Default for StoredStatus {
    fn default() -> Self {
        Self {
            detected_game: None,
            detected_url: None,
            running_count: 0,
            true_count: 0.0,
            high_low_index: 0.0,
            player_advantage: 0.0,
            bet_recommendation: 1,
            cards_seen: 0,
            deck_count: 1,
            strategy_adjustments: StrategyAdjustments::default(),
        }
    }
}

impl StoredStatus {
    /// Read the popup's key set; missing or mistyped values fall back to the
    /// neutral defaults.
    pub fn load(store: &impl PersistenceStore) -> Self {
        let defaults = Self::default();
        let number = |key: &str| store.get(key).and_then(|value| value.as_f64());
        let integer = |key: &str| store.get(key).and_then(|value| value.as_i64());

        Self {
            detected_game: store
                .get(keys::DETECTED_GAME)
                .and_then(|value| value.as_str().and_then(|label| label.parse().ok())),
            detected_url: store
                .get(keys::DETECTED_URL)
                .and_then(|value| value.as_str().map(str::to_string)),
            running_count: integer(keys::RUNNING_COUNT).unwrap_or(defaults.running_count),
            true_count: number(keys::TRUE_COUNT).unwrap_or(defaults.true_count),
            high_low_index: number(keys::HIGH_LOW_INDEX).unwrap_or(defaults.high_low_index),
            player_advantage: number(keys::PLAYER_ADVANTAGE).unwrap_or(defaults.player_advantage),
            bet_recommendation: integer(keys::BET_RECOMMENDATION)
                .filter(|units| *units > 0)
                .map(|units| units.min(i64::from(u8::MAX)) as u8)
                .unwrap_or(defaults.bet_recommendation),
            cards_seen: store
                .get(keys::CARDS_SEEN)
                .and_then(|value| value.as_u64())
                .unwrap_or(defaults.cards_seen),
            deck_count: integer(keys::DECK_COUNT)
                .filter(|decks| *decks != 0)
                .map(clamp_deck_count)
                .unwrap_or(defaults.deck_count),
            strategy_adjustments: store
                .get(keys::STRATEGY_ADJUSTMENTS)
                .and_then(|value| serde_json::from_value(value).ok())
                .unwrap_or_default(),
        }
    }

    /// Overlay the values a live session reported.
    pub fn merge_live(&mut self, reply: &StatusReply) {
        if let Some(game) = reply.game {
            self.detected_game = Some(game);
        }
        self.running_count = i64::from(reply.running_count);
        self.true_count = reply.true_count;
        self.high_low_index = reply.high_low_index;
        self.player_advantage = reply.player_advantage;
        self.bet_recommendation = reply.bet_recommendation.max(1);
        self.cards_seen = u64::from(reply.cards_seen);
        self.deck_count = reply.deck_count;
        self.strategy_adjustments = reply.strategy_adjustments;
    }
}
