// =====================================================================================
// File: src/decision.rs
// Description: Score-to-decision mapping, override ordering, and the
//              decision service's side effects (§4.G)
// Author: arkSong (arksong2018@gmail.com)
// =====================================================================================

use crate::alert_factory::build_alert;
use crate::config::DecisionThresholds;
use crate::error::FraudGuardResult;
use crate::model::{AlertType, Card, Decision, FraudAlert, Transaction};
use crate::pattern_builder::{build_pattern, PatternCache};
use crate::repository::Repository;
use crate::validator::ValidationResult;
use chrono::Utc;
use tracing::{error, warn};

/// Outcome of one decision pass: the final decision, whether the transaction
/// is treated as fraud, and the alert record if any rule fired.
pub struct DecisionOutcome {
    pub decision: Decision,
    pub fraud: bool,
    pub alert: Option<FraudAlert>,
}

/// Map an aggregate score onto a decision tier (§4.G):
/// `score < review_floor` -> Approved, not fraud;
/// `review_floor <= score < blocked_floor` -> Review, not fraud;
/// `score >= blocked_floor` -> Blocked, fraud.
pub fn score_to_decision(score: i64, thresholds: &DecisionThresholds) -> (Decision, bool) {
    if score >= thresholds.blocked_floor {
        (Decision::Blocked, true)
    } else if score >= thresholds.review_floor {
        (Decision::Review, false)
    } else {
        (Decision::Approved, false)
    }
}

/// Apply the override ordering on top of the score-derived tier: a caller's
/// `success_force` flag first overrides the tier to Approved, but
/// `CREDIT_LIMIT_REACHED` then wins over that override and forces Blocked
/// regardless of `success_force` (§4.G, §9).
pub fn apply_overrides(base: (Decision, bool), success_force: bool, alerts: &[AlertType]) -> (Decision, bool) {
    let mut decision = base;
    if success_force {
        decision = (Decision::Approved, false);
    }
    if alerts.contains(&AlertType::CreditLimitReached) {
        decision = (Decision::Blocked, true);
    }
    decision
}

/// Run the full decision pass for one evaluation: map the validator's
/// result to a decision, persist the side effects the decision implies, and
/// return the outcome (§4.G).
///
/// Transaction and alert persistence failures are fatal and returned to the
/// caller; a pattern-rebuild failure is degraded and only logged (§7).
pub fn decide(
    repo: &dyn Repository,
    pattern_cache: &PatternCache,
    thresholds: &DecisionThresholds,
    mut card: Card,
    mut tx: Transaction,
    validation: ValidationResult,
    success_force: bool,
) -> FraudGuardResult<DecisionOutcome> {
    let base = score_to_decision(validation.score, thresholds);
    let (decision, fraud) = apply_overrides(base, success_force, &validation.alerts);

    tx.decision = decision;
    tx.fraud = fraud;

    let history = repo.all_transactions_for_card(card.id);
    match std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        build_pattern(card.id, pattern_cache, &history)
    })) {
        Ok(pattern) => {
            if let Err(e) = repo.save_pattern(pattern) {
                warn!(card_id = %card.id, error = %e, "pattern persistence failed, continuing");
            }
        }
        Err(_) => {
            warn!(card_id = %card.id, "pattern rebuild panicked, skipping profile update");
        }
    }

    if matches!(decision, Decision::Approved) {
        card.debit(tx.amount);
        card.last_transaction_at = Some(Utc::now());
    }

    repo.save_card(card).map_err(|e| {
        error!(error = %e, "card persistence failed");
        e
    })?;

    repo.save_transaction(tx.clone()).map_err(|e| {
        error!(transaction_id = %tx.id, error = %e, "transaction persistence failed");
        e
    })?;

    let alert = if validation.alerts.is_empty() {
        None
    } else {
        let alert = build_alert(&tx, validation.alerts, validation.score);
        repo.save_alert(alert.clone()).map_err(|e| {
            error!(alert_id = %alert.id, error = %e, "alert persistence failed");
            e
        })?;
        Some(alert)
    };

    Ok(DecisionOutcome { decision, fraud, alert })
}
