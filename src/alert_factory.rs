// =====================================================================================
// File: src/alert_factory.rs
// Description: Pure classification of (transaction, alerts, score) into a
//              persisted FraudAlert (§4.H)
// Author: arkSong (arksong2018@gmail.com)
// =====================================================================================

use crate::model::{AlertSeverity, AlertStatus, AlertType, FraudAlert, Transaction};
use chrono::Utc;
use uuid::Uuid;

/// Build the persisted alert record for one evaluation. Pure function of
/// its inputs; callers decide whether to persist it.
pub fn build_alert(tx: &Transaction, alerts: Vec<AlertType>, score: i64) -> FraudAlert {
    FraudAlert {
        id: Uuid::new_v4(),
        transaction_id: tx.id,
        card_id: tx.card_id,
        alerts,
        fraud_score: score,
        severity: classify_severity(score),
        probability: score.clamp(0, 100),
        description: describe(score),
        status: AlertStatus::Pending,
        created_at: Utc::now(),
    }
}

fn classify_severity(score: i64) -> AlertSeverity {
    if score >= 100 {
        AlertSeverity::Critical
    } else if score >= 70 {
        AlertSeverity::High
    } else if score >= 50 {
        AlertSeverity::Medium
    } else {
        AlertSeverity::Low
    }
}

fn describe(score: i64) -> String {
    if score >= 80 {
        "Critical fraud risk detected; transaction requires immediate action.".to_string()
    } else if score >= 50 {
        "High-risk transaction flagged for review.".to_string()
    } else if score >= 30 {
        "Transaction shows atypical behavior for this card.".to_string()
    } else {
        "Transaction scored within normal behavioral range.".to_string()
    }
}
