//! In-memory card store
//!
//! Keeps serialized documents rather than live values, so a fetch goes
//! through the same validation as a card loaded from disk.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use super::{prepare_for_save, CardStore};
use crate::error::CardError;
use crate::model::CardState;
use crate::types::CardId;

/// Process-local [`CardStore`]; clones share the same map
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    cards: Arc<RwLock<HashMap<CardId, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored cards
    pub fn len(&self) -> usize {
        self.cards.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.read().is_empty()
    }
}

impl CardStore for MemoryStore {
    fn save(&self, state: &CardState) -> Result<CardId, CardError> {
        let (id, stored) = prepare_for_save(state);
        let json = stored.to_json()?;
        self.cards.write().insert(id.clone(), json);
        Ok(id)
    }

    fn fetch(&self, id: &CardId) -> Result<Option<CardState>, CardError> {
        self.cards
            .read()
            .get(id)
            .map(|json| CardState::from_json(json))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_cards() {
        let store = MemoryStore::new();
        let other = store.clone();
        let id = store.save(&CardState::default()).unwrap();
        assert!(other.fetch(&id).unwrap().is_some());
        assert_eq!(other.len(), 1);
    }

    #[test]
    fn test_fetch_unknown_is_none() {
        let store = MemoryStore::new();
        assert!(store.is_empty());
        assert!(store.fetch(&CardId("nope".into())).unwrap().is_none());
    }
}
