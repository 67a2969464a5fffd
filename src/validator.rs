// =====================================================================================
// File: src/validator.rs
// Description: Global validator - parallel rule fan-out/fan-in (§4.F)
// Author: arkSong (arksong2018@gmail.com)
// =====================================================================================

use crate::model::{AlertType, Transaction};
use crate::rules::{all_rules, PartialResult, RuleContext};
use crate::validation::ValidationSnapshot;
use rayon::prelude::*;
use std::collections::HashSet;
use std::panic::{catch_unwind, AssertUnwindSafe};
use tracing::{info, warn};

/// Consolidated outcome of one evaluation: summed score and the
/// deduplicated set of triggered alert tags (§4.F; order is not a contract).
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub score: i64,
    pub alerts: Vec<AlertType>,
}

/// Fan out the 19 rules across a worker pool and fan back in, blocking the
/// caller until every rule has returned (§4.F, §5). Rules are free of
/// shared mutable state and receive the snapshot by shared reference, so the
/// fan-out is a plain parallel map; a rule that panics is treated as an
/// empty partial rather than propagating (§4.E "rules never throw").
pub fn validate(tx: &Transaction, snapshot: &ValidationSnapshot, ctx: &RuleContext) -> ValidationResult {
    let rules = all_rules();

    let partials: Vec<PartialResult> = rules
        .par_iter()
        .map(|rule| {
            catch_unwind(AssertUnwindSafe(|| rule.evaluate(tx, snapshot, ctx))).unwrap_or_else(|_| {
                warn!(transaction_id = %tx.id, "rule execution failed, treating as empty partial");
                PartialResult::empty()
            })
        })
        .collect();

    let mut score = 0i64;
    let mut seen = HashSet::new();
    let mut alerts = Vec::new();
    for partial in partials {
        score += partial.score;
        for alert in partial.alerts {
            if seen.insert(alert) {
                alerts.push(alert);
            }
        }
    }

    info!(transaction_id = %tx.id, score, alert_count = alerts.len(), "validation complete");
    ValidationResult { score, alerts }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AlertType, Decision, MerchantCategory};
    use crate::rules::tests_support::ctx_for;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn tx() -> Transaction {
        Transaction {
            id: Uuid::new_v4(),
            card_id: Uuid::new_v4(),
            device_id: Uuid::new_v4(),
            device_fingerprint: "fp".to_string(),
            amount: dec!(10.00),
            merchant_category: MerchantCategory::Grocery,
            ip_address: "::1".to_string(),
            latitude: "0.0".to_string(),
            longitude: "0.0".to_string(),
            country: None,
            state: None,
            city: None,
            transaction_at: Utc::now(),
            created_at: Utc::now(),
            reimbursed: false,
            fraud: false,
            decision: Decision::Approved,
        }
    }

    #[test]
    fn clean_transaction_with_no_history_scores_zero() {
        let ctx = ctx_for();
        let snapshot = ValidationSnapshot {
            last20: vec![],
            last10: vec![],
            last24_hours: vec![],
            last10_minutes: vec![],
            last5_minutes: vec![],
        };
        let t = tx();
        let result = validate(&t, &snapshot, &ctx);
        assert_eq!(result.score, 0);
        assert!(result.alerts.is_empty());
    }

    #[test]
    fn score_is_sum_of_triggered_alert_weights() {
        let ctx = ctx_for();
        let mut t = tx();
        t.amount = dec!(1.00);
        let snapshot = ValidationSnapshot {
            last20: vec![],
            last10: vec![],
            last24_hours: vec![],
            last10_minutes: vec![t.clone(), t.clone(), t.clone()],
            last5_minutes: vec![t.clone(), t.clone(), t.clone()],
        };
        let result = validate(&t, &snapshot, &ctx);
        let expected: i64 = result.alerts.iter().map(|a| a.weight()).sum();
        assert_eq!(result.score, expected);
        assert!(result.alerts.contains(&AlertType::VelocityAbuse));
        assert!(result.alerts.contains(&AlertType::CardTesting));
    }
}
