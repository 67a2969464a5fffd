// =====================================================================================
// File: src/repository.rs
// Description: Abstract persistence contract (§6) and an in-memory
//              implementation used for tests and the reset/reseed binary.
// Author: arkSong (arksong2018@gmail.com)
// =====================================================================================

use crate::error::{FraudGuardError, FraudGuardResult};
use crate::model::{Card, CardPattern, Device, FraudAlert, Transaction};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

/// Key-addressable `find`/`save` for the five persisted entities, plus the
/// two specialized transaction queries the rule set and context loader need
/// (§6 Persistence contract).
pub trait Repository: Send + Sync {
    fn find_card(&self, id: Uuid) -> Option<Card>;
    fn save_card(&self, card: Card) -> FraudGuardResult<()>;
    fn delete_card(&self, id: Uuid) -> FraudGuardResult<()>;
    fn all_cards(&self) -> Vec<Card>;

    fn find_device(&self, id: Uuid) -> Option<Device>;
    fn save_device(&self, device: Device) -> FraudGuardResult<()>;
    fn all_devices(&self) -> Vec<Device>;

    fn find_transaction(&self, id: Uuid) -> Option<Transaction>;
    fn save_transaction(&self, tx: Transaction) -> FraudGuardResult<()>;

    /// Top-N transactions for a card, ordered by `created_at` descending.
    fn recent_transactions(&self, card_id: Uuid, limit: usize) -> Vec<Transaction>;

    /// Transactions for a card created strictly after `after`.
    fn transactions_after(&self, card_id: Uuid, after: DateTime<Utc>) -> Vec<Transaction>;

    /// All transactions for a card (used by the pattern builder).
    fn all_transactions_for_card(&self, card_id: Uuid) -> Vec<Transaction>;

    fn find_alert(&self, id: Uuid) -> Option<FraudAlert>;
    fn save_alert(&self, alert: FraudAlert) -> FraudGuardResult<()>;

    fn find_pattern(&self, card_id: Uuid) -> Option<CardPattern>;
    fn save_pattern(&self, pattern: CardPattern) -> FraudGuardResult<()>;

    fn clear_cards(&self);
    fn clear_devices(&self);
    fn clear_transactions(&self);
    fn clear_alerts(&self);
    fn clear_patterns(&self);

    /// Convenience for callers that don't need the five deletes to run in
    /// parallel (the reset tool drives them independently instead - §4.K).
    fn clear_all(&self) {
        self.clear_transactions();
        self.clear_alerts();
        self.clear_patterns();
        self.clear_cards();
        self.clear_devices();
    }
}

#[derive(Default)]
struct Store {
    cards: HashMap<Uuid, Card>,
    devices: HashMap<Uuid, Device>,
    transactions: HashMap<Uuid, Transaction>,
    alerts: HashMap<Uuid, FraudAlert>,
    patterns: HashMap<Uuid, CardPattern>,
}

/// Thread-safe in-memory repository. Stands in for the real persistence
/// technology (§1 out of scope) so the engine can be exercised end to end in
/// tests without a database.
#[derive(Default)]
pub struct InMemoryRepository {
    store: RwLock<Store>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Repository for InMemoryRepository {
    fn find_card(&self, id: Uuid) -> Option<Card> {
        self.store.read().unwrap().cards.get(&id).cloned()
    }

    fn save_card(&self, card: Card) -> FraudGuardResult<()> {
        self.store.write().unwrap().cards.insert(card.id, card);
        Ok(())
    }

    fn delete_card(&self, id: Uuid) -> FraudGuardResult<()> {
        self.store
            .write()
            .unwrap()
            .cards
            .remove(&id)
            .ok_or_else(|| FraudGuardError::CardNotFound(id.to_string()))?;
        Ok(())
    }

    fn all_cards(&self) -> Vec<Card> {
        self.store.read().unwrap().cards.values().cloned().collect()
    }

    fn find_device(&self, id: Uuid) -> Option<Device> {
        self.store.read().unwrap().devices.get(&id).cloned()
    }

    fn save_device(&self, device: Device) -> FraudGuardResult<()> {
        self.store.write().unwrap().devices.insert(device.id, device);
        Ok(())
    }

    fn all_devices(&self) -> Vec<Device> {
        self.store.read().unwrap().devices.values().cloned().collect()
    }

    fn find_transaction(&self, id: Uuid) -> Option<Transaction> {
        self.store.read().unwrap().transactions.get(&id).cloned()
    }

    fn save_transaction(&self, tx: Transaction) -> FraudGuardResult<()> {
        self.store.write().unwrap().transactions.insert(tx.id, tx);
        Ok(())
    }

    fn recent_transactions(&self, card_id: Uuid, limit: usize) -> Vec<Transaction> {
        let store = self.store.read().unwrap();
        let mut txs: Vec<Transaction> = store
            .transactions
            .values()
            .filter(|t| t.card_id == card_id)
            .cloned()
            .collect();
        txs.sort_by_key(|t| std::cmp::Reverse(t.created_at));
        txs.truncate(limit);
        txs
    }

    fn transactions_after(&self, card_id: Uuid, after: DateTime<Utc>) -> Vec<Transaction> {
        self.store
            .read()
            .unwrap()
            .transactions
            .values()
            .filter(|t| t.card_id == card_id && t.created_at >= after)
            .cloned()
            .collect()
    }

    fn all_transactions_for_card(&self, card_id: Uuid) -> Vec<Transaction> {
        self.store
            .read()
            .unwrap()
            .transactions
            .values()
            .filter(|t| t.card_id == card_id)
            .cloned()
            .collect()
    }

    fn find_alert(&self, id: Uuid) -> Option<FraudAlert> {
        self.store.read().unwrap().alerts.get(&id).cloned()
    }

    fn save_alert(&self, alert: FraudAlert) -> FraudGuardResult<()> {
        self.store.write().unwrap().alerts.insert(alert.id, alert);
        Ok(())
    }

    fn find_pattern(&self, card_id: Uuid) -> Option<CardPattern> {
        self.store.read().unwrap().patterns.get(&card_id).cloned()
    }

    fn save_pattern(&self, pattern: CardPattern) -> FraudGuardResult<()> {
        self.store
            .write()
            .unwrap()
            .patterns
            .insert(pattern.card_id, pattern);
        Ok(())
    }

    fn clear_cards(&self) {
        self.store.write().unwrap().cards.clear();
    }

    fn clear_devices(&self) {
        self.store.write().unwrap().devices.clear();
    }

    fn clear_transactions(&self) {
        self.store.write().unwrap().transactions.clear();
    }

    fn clear_alerts(&self) {
        self.store.write().unwrap().alerts.clear();
    }

    fn clear_patterns(&self) {
        self.store.write().unwrap().patterns.clear();
    }
}
