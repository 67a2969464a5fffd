// =====================================================================================
// File: src/model/card.rs
// Description: Card and Device entities (§3)
// Author: arkSong (arksong2018@gmail.com)
// =====================================================================================

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CardStatus {
    Active,
    Blocked,
    Lost,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceType {
    Mobile,
    Desktop,
    PosTerminal,
}

/// A payment card. The raw PAN is stored but never exposed outside the
/// engine; callers receive a masked view (§6 masking rule).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Card {
    pub id: Uuid,
    pub brand: String,
    /// Raw PAN - never serialized into an outward-facing response.
    pub pan: String,
    pub holder_name: String,
    pub expiration_date: NaiveDate,
    pub credit_limit: Decimal,
    pub remaining_limit: Decimal,
    pub status: CardStatus,
    pub created_at: DateTime<Utc>,
    pub last_transaction_at: Option<DateTime<Utc>>,
    pub risk_score: i64,
    pub devices: HashSet<Uuid>,
}

impl Card {
    pub fn is_active(&self) -> bool {
        matches!(self.status, CardStatus::Active)
    }

    /// Invariant: `0 <= remaining <= credit_limit`, enforced on every
    /// mutation (transient violations during an in-flight update are not
    /// visible to callers - §3).
    pub fn debit(&mut self, amount: Decimal) {
        let new_remaining = self.remaining_limit - amount;
        self.remaining_limit = new_remaining.max(Decimal::ZERO).min(self.credit_limit);
    }
}

/// A device that has transacted against one or more cards (many-to-many,
/// neither side owns the other - §3 Ownership).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Device {
    pub id: Uuid,
    pub fingerprint: String,
    pub device_type: DeviceType,
    pub os: String,
    pub browser: String,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
    pub cards: HashSet<Uuid>,
}
