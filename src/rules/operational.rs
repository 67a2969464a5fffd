// =====================================================================================
// File: src/rules/operational.rs
// Description: Operational risk rules (§4.E)
// Author: arkSong (arksong2018@gmail.com)
// =====================================================================================

use super::{PartialResult, Rule, RuleContext};
use crate::model::{AlertType, Decision, Transaction};
use crate::validation::ValidationSnapshot;

/// MULTIPLE_FAILED_ATTEMPTS - in `last5Minutes`, trigger if
/// `count(decision = BLOCKED) >= 3`.
pub struct MultipleFailedAttempts;

impl Rule for MultipleFailedAttempts {
    fn evaluate(&self, _tx: &Transaction, snapshot: &ValidationSnapshot, _ctx: &RuleContext) -> PartialResult {
        let blocked = snapshot
            .last5_minutes
            .iter()
            .filter(|t| t.decision == Decision::Blocked)
            .count();
        if blocked >= 3 {
            PartialResult::single(AlertType::MultipleFailedAttempts)
        } else {
            PartialResult::empty()
        }
    }
}

/// SUSPICIOUS_SUCCESS_AFTER_FAILURE - only when the current transaction is
/// approved; in `last5` (`last20[0..5)`), skipping the current, trigger if
/// >= 2 were blocked.
pub struct SuspiciousSuccessAfterFailure;

impl Rule for SuspiciousSuccessAfterFailure {
    fn evaluate(&self, tx: &Transaction, snapshot: &ValidationSnapshot, _ctx: &RuleContext) -> PartialResult {
        if tx.decision != Decision::Approved {
            return PartialResult::empty();
        }
        let blocked = snapshot
            .last5()
            .iter()
            .filter(|t| t.id != tx.id && t.decision == Decision::Blocked)
            .count();
        if blocked >= 2 {
            PartialResult::single(AlertType::SuspiciousSuccessAfterFailure)
        } else {
            PartialResult::empty()
        }
    }
}
