// =====================================================================================
// File: src/model/pattern.rs
// Description: CardPattern entity - the card's behavioral profile (§3, §4.I)
// Author: arkSong (arksong2018@gmail.com)
// =====================================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::MerchantCategory;

/// Ticket-size bucket assigned to an individual amount relative to the
/// card's own quartiles (§4.I).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TicketBucket {
    Micro,
    Small,
    Medium,
    Large,
}

/// One-to-one behavioral profile of a card, rebuilt after every evaluation
/// and cached on read (§3, §4.I).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardPattern {
    pub card_id: uuid::Uuid,
    pub average_amount: f64,
    pub median_amount: f64,
    pub max_amount: f64,
    pub q1_amount: f64,
    pub q3_amount: f64,
    pub iqr_amount: f64,
    pub std_dev_amount: f64,
    pub p95_amount: f64,
    pub ticket_distribution: Vec<(TicketBucket, usize)>,
    pub top_categories: Vec<(MerchantCategory, usize)>,
    pub top_hours: Vec<DateTime<Utc>>,
    pub transactions_per_day: f64,
    pub category_entropy: f64,
    pub top_weekdays: Vec<chrono::Weekday>,
    pub weekend_ratio: f64,
    pub max_per_hour_bucket: usize,
    pub temporal_consistency: f64,
    pub last_updated: DateTime<Utc>,
}

impl CardPattern {
    /// Lazily-created empty profile for a card with no transaction history
    /// (§4.I "On empty, create and persist an empty pattern").
    pub fn empty(card_id: uuid::Uuid) -> Self {
        Self {
            card_id,
            average_amount: 0.0,
            median_amount: 0.0,
            max_amount: 0.0,
            q1_amount: 0.0,
            q3_amount: 0.0,
            iqr_amount: 0.0,
            std_dev_amount: 0.0,
            p95_amount: 0.0,
            ticket_distribution: Vec::new(),
            top_categories: Vec::new(),
            top_hours: Vec::new(),
            transactions_per_day: 0.0,
            category_entropy: 0.0,
            top_weekdays: Vec::new(),
            weekend_ratio: 0.0,
            max_per_hour_bucket: 0,
            temporal_consistency: 0.0,
            last_updated: Utc::now(),
        }
    }
}
