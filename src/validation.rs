// =====================================================================================
// File: src/validation.rs
// Description: Validation context / immutable per-evaluation snapshot (§4.D)
// Author: arkSong (arksong2018@gmail.com)
// =====================================================================================

use crate::model::Transaction;
use crate::repository::Repository;
use chrono::Duration;
use std::sync::atomic::{AtomicBool, Ordering};
use uuid::Uuid;

/// Immutable per-evaluation bundle of recent-transaction windows. Rules read
/// it but never mutate it, and never re-query storage (§4.D, §5).
pub struct ValidationSnapshot {
    /// Most recent 20 transactions for the card, newest first.
    pub last20: Vec<Transaction>,
    pub last10: Vec<Transaction>,
    pub last24_hours: Vec<Transaction>,
    pub last10_minutes: Vec<Transaction>,
    pub last5_minutes: Vec<Transaction>,
}

impl ValidationSnapshot {
    /// `last20[0..5)`, used by SUSPICIOUS_SUCCESS_AFTER_FAILURE.
    pub fn last5(&self) -> &[Transaction] {
        &self.last20[..self.last20.len().min(5)]
    }
}

/// Builds the snapshot for one evaluation. A single instance is scoped to
/// one transaction; calling `load` twice is a no-op idempotent read, backed
/// by an internal one-shot guard rather than a second storage query (§4.D
/// "second calls within the same evaluation MUST be no-ops").
pub struct ValidationContext<'a> {
    repo: &'a dyn Repository,
    loaded: AtomicBool,
    cached: std::sync::Mutex<Option<std::sync::Arc<ValidationSnapshot>>>,
}

impl<'a> ValidationContext<'a> {
    pub fn new(repo: &'a dyn Repository) -> Self {
        Self {
            repo,
            loaded: AtomicBool::new(false),
            cached: std::sync::Mutex::new(None),
        }
    }

    /// Load (or return the already-loaded) snapshot for `transaction` on
    /// `card_id`. Only the first call in this context's lifetime issues a
    /// storage read.
    pub fn load(&self, card_id: Uuid, transaction: &Transaction) -> std::sync::Arc<ValidationSnapshot> {
        if !self.loaded.swap(true, Ordering::SeqCst) {
            let snapshot = self.build(card_id, transaction);
            *self.cached.lock().unwrap() = Some(std::sync::Arc::new(snapshot));
        }
        self.cached.lock().unwrap().clone().expect("loaded flag guarantees snapshot is present")
    }

    fn build(&self, card_id: Uuid, transaction: &Transaction) -> ValidationSnapshot {
        let last20 = self.repo.recent_transactions(card_id, 20);
        let reference = transaction.reference_time();

        let last10 = last20.iter().take(10).cloned().collect();
        let last24_hours = last20
            .iter()
            .filter(|t| t.created_at >= reference - Duration::hours(24))
            .cloned()
            .collect();
        let last10_minutes = last20
            .iter()
            .filter(|t| t.created_at >= reference - Duration::minutes(10))
            .cloned()
            .collect();
        let last5_minutes = last20
            .iter()
            .filter(|t| t.created_at >= reference - Duration::minutes(5))
            .cloned()
            .collect();

        ValidationSnapshot {
            last20,
            last10,
            last24_hours,
            last10_minutes,
            last5_minutes,
        }
    }
}
