//! Card persistence.
//!
//! [`CardStore`] is the contract of the persistence collaborator: `save`
//! returns a short opaque id, `fetch` returns the same structure back with
//! the free-text fields sanitized. Two implementations:
//! - [`Storage`]: ACID redb file, one JSON record per card
//! - [`MemoryStore`]: in-process map for previews and tests

use crate::error::CardError;
use crate::model::CardState;
use crate::sanitize::sanitize_free_text;
use crate::types::CardId;
use parking_lot::RwLock;
use redb::{Database, ReadableTable, TableDefinition};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

mod memory;

pub use memory::MemoryStore;

// Table definitions
const CARDS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("cards");

/// Persistence collaborator contract
pub trait CardStore: Send + Sync {
    /// Persist a card and return its id.
    ///
    /// Reuses `state.card_id` when present, otherwise mints a new id.
    fn save(&self, state: &CardState) -> Result<CardId, CardError>;

    /// Fetch a card by id; `None` when unknown
    fn fetch(&self, id: &CardId) -> Result<Option<CardState>, CardError>;
}

/// A persisted card with its save timestamp
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredCard {
    pub state: serde_json::Value,
    /// Unix timestamp of the last save
    pub saved_at: i64,
}

/// Prepare a state for storage: sanitized copy carrying its id
pub(crate) fn prepare_for_save(state: &CardState) -> (CardId, CardState) {
    let id = state.card_id.clone().unwrap_or_else(CardId::generate);
    let mut stored = state.clone();
    sanitize_free_text(&mut stored);
    stored.card_id = Some(id.clone());
    (id, stored)
}

/// Storage layer using redb for ACID-compliant persistence
#[derive(Clone)]
pub struct Storage {
    db: Arc<RwLock<Database>>,
}

impl Storage {
    /// Create a new storage instance at the given path.
    ///
    /// This will:
    /// - Create the database directory if it doesn't exist
    /// - Initialize the database file
    /// - Create all required tables
    pub fn new(path: impl AsRef<Path>) -> Result<Self, CardError> {
        let path = path.as_ref();

        // Create parent directory if needed
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let db = Database::create(path)?;

        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(CARDS_TABLE)?;
        }
        write_txn.commit()?;

        info!(?path, "Opened card storage");
        Ok(Self {
            db: Arc::new(RwLock::new(db)),
        })
    }

    /// Save a card record under `id`, overwriting any previous version.
    pub fn save_card(&self, id: &CardId, state: &CardState) -> Result<(), CardError> {
        let record = StoredCard {
            state: serde_json::to_value(state)?,
            saved_at: chrono::Utc::now().timestamp(),
        };
        let data = serde_json::to_vec(&record)?;

        let db = self.db.read();
        let write_txn = db.begin_write()?;
        {
            let mut table = write_txn.open_table(CARDS_TABLE)?;
            table.insert(id.as_str(), data.as_slice())?;
        }
        write_txn.commit()?;
        debug!(%id, bytes = data.len(), "Card saved");
        Ok(())
    }

    /// Load a card record by id.
    ///
    /// Returns `None` if no card with the given id exists. A stored document
    /// that fails shape validation is an integrity error.
    pub fn load_card(&self, id: &CardId) -> Result<Option<CardState>, CardError> {
        let db = self.db.read();
        let read_txn = db.begin_read()?;
        let table = read_txn.open_table(CARDS_TABLE)?;

        match table.get(id.as_str())? {
            Some(v) => {
                let record: StoredCard = serde_json::from_slice(v.value())?;
                Ok(Some(CardState::from_value(record.state)?))
            }
            None => Ok(None),
        }
    }

    /// List stored card ids with their save timestamps.
    pub fn list_cards(&self) -> Result<Vec<(CardId, i64)>, CardError> {
        let db = self.db.read();
        let read_txn = db.begin_read()?;
        let table = read_txn.open_table(CARDS_TABLE)?;

        let mut cards = Vec::new();
        for entry in table.iter()? {
            let (key, value) = entry?;
            let record: StoredCard = serde_json::from_slice(value.value())?;
            cards.push((CardId(key.value().to_string()), record.saved_at));
        }
        Ok(cards)
    }

    /// Delete a card. Returns `Ok(())` even if it doesn't exist.
    pub fn delete_card(&self, id: &CardId) -> Result<(), CardError> {
        let db = self.db.read();
        let write_txn = db.begin_write()?;
        {
            let mut table = write_txn.open_table(CARDS_TABLE)?;
            table.remove(id.as_str())?;
        }
        write_txn.commit()?;
        info!(%id, "Deleted card");
        Ok(())
    }
}

impl CardStore for Storage {
    fn save(&self, state: &CardState) -> Result<CardId, CardError> {
        let (id, stored) = prepare_for_save(state);
        self.save_card(&id, &stored)?;
        Ok(id)
    }

    fn fetch(&self, id: &CardId) -> Result<Option<CardState>, CardError> {
        self.load_card(id)
    }
}
