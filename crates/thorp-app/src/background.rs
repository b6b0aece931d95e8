use serde_json::{Map, Value};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{Level, event};

use crate::presentation::Badge;
use crate::protocol::{CountUpdate, Message};
use crate::store::{PersistenceStore, StoreError, keys};

pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or_default()
}

/// Mirrors page messages into the store and keeps the badge current.
#[derive(Debug)]
pub struct Background<S> {
    store: S,
    badge: Badge,
}

impl<S: PersistenceStore> Background<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            badge: Badge::default(),
        }
    }

    pub fn badge(&self) -> &Badge {
        &self.badge
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// A tab started loading a new page.
    pub fn on_navigation(&mut self) {
        self.badge.clear();
    }

    /// The badge follows every message even when the store write fails.
    pub fn handle(&mut self, message: &Message, now_ms: u64) -> Result<(), StoreError> {
        match message {
            Message::GameDetected { game, url } => {
                let mut entries = Map::new();
                entries.insert(keys::DETECTED_GAME.into(), Value::from(game.as_str()));
                entries.insert(keys::DETECTED_URL.into(), Value::from(url.as_str()));
                entries.insert(keys::LAST_DETECTION.into(), Value::from(now_ms));
                self.badge.mark_detected();
                self.store.set_many(entries)?;
                event!(
                    target: "thorp::background",
                    Level::INFO,
                    game = %game,
                    url = %url,
                    "detection stored"
                );
            }
            Message::CountUpdate(update) => {
                self.badge.show_true_count(update.true_count);
                self.store.set_many(count_entries(update, now_ms)?)?;
                event!(
                    target: "thorp::background",
                    Level::DEBUG,
                    running_count = update.running_count,
                    true_count = update.true_count,
                    badge = %self.badge.text,
                    "count stored"
                );
            }
            Message::ResetCount | Message::SetDeckCount { .. } | Message::GetStatus => {}
        }
        Ok(())
    }
}

fn count_entries(update: &CountUpdate, now_ms: u64) -> Result<Map<String, Value>, StoreError> {
    let Value::Object(mut entries) = serde_json::to_value(update)? else {
        return Ok(Map::new());
    };
    entries.insert(keys::LAST_UPDATE.into(), Value::from(now_ms));
    Ok(entries)
}
