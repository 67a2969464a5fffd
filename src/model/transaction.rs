// =====================================================================================
// File: src/model/transaction.rs
// Description: Transaction entity and merchant category (§3)
// Author: arkSong (arksong2018@gmail.com)
// =====================================================================================

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MerchantCategory {
    Grocery,
    Restaurant,
    GasStation,
    Pharmacy,
    Entertainment,
    Gambling,
    CryptoExchange,
    MoneyTransfer,
    AdultContent,
    Unknown,
}

impl MerchantCategory {
    /// The high-risk subset sampled with probability 0.1 by the merchant
    /// generator (§4.C.2).
    pub const HIGH_RISK: [MerchantCategory; 4] = [
        MerchantCategory::Gambling,
        MerchantCategory::CryptoExchange,
        MerchantCategory::MoneyTransfer,
        MerchantCategory::AdultContent,
    ];

    pub const ALL: [MerchantCategory; 10] = [
        MerchantCategory::Grocery,
        MerchantCategory::Restaurant,
        MerchantCategory::GasStation,
        MerchantCategory::Pharmacy,
        MerchantCategory::Entertainment,
        MerchantCategory::Gambling,
        MerchantCategory::CryptoExchange,
        MerchantCategory::MoneyTransfer,
        MerchantCategory::AdultContent,
        MerchantCategory::Unknown,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decision {
    Approved,
    Review,
    Blocked,
}

/// A candidate or persisted payment transaction (§3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub card_id: Uuid,
    pub device_id: Uuid,
    /// Device-fingerprint snapshot copied at creation; immutable afterward.
    pub device_fingerprint: String,
    pub amount: Decimal,
    pub merchant_category: MerchantCategory,
    pub ip_address: String,
    pub latitude: String,
    pub longitude: String,
    pub country: Option<String>,
    pub state: Option<String>,
    pub city: Option<String>,
    pub transaction_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub reimbursed: bool,
    pub fraud: bool,
    pub decision: Decision,
}

impl Transaction {
    /// Reference time used to window transaction history relative to this
    /// transaction: its own `created_at`, or `now` if unset (§4.D).
    pub fn reference_time(&self) -> DateTime<Utc> {
        self.created_at
    }
}
