// =====================================================================================
// File: src/rules/fraud_patterns.rs
// Description: Fraud-pattern rules (§4.E)
// Author: arkSong (arksong2018@gmail.com)
// =====================================================================================

use super::{PartialResult, Rule, RuleContext};
use crate::model::{AlertType, Decision, Transaction};
use crate::validation::ValidationSnapshot;
use rust_decimal_macros::dec;

/// CARD_TESTING - in `last10Minutes`, `vLow = count(amount <= 2)`,
/// `low = count(amount <= 5)`; trigger if `vLow >= 3 || low >= 5`.
pub struct CardTesting;

impl Rule for CardTesting {
    fn evaluate(&self, _tx: &Transaction, snapshot: &ValidationSnapshot, _ctx: &RuleContext) -> PartialResult {
        let v_low = snapshot.last10_minutes.iter().filter(|t| t.amount <= dec!(2)).count();
        let low = snapshot.last10_minutes.iter().filter(|t| t.amount <= dec!(5)).count();
        if v_low >= 3 || low >= 5 {
            PartialResult::single(AlertType::CardTesting)
        } else {
            PartialResult::empty()
        }
    }
}

/// MICRO_TRANSACTION_PATTERN - in `last20` (require >= 5), trigger if
/// `count(amount <= 2) / |last20| >= 0.6`.
pub struct MicroTransactionPattern;

impl Rule for MicroTransactionPattern {
    fn evaluate(&self, _tx: &Transaction, snapshot: &ValidationSnapshot, _ctx: &RuleContext) -> PartialResult {
        let n = snapshot.last20.len();
        if n < 5 {
            return PartialResult::empty();
        }
        let micro = snapshot.last20.iter().filter(|t| t.amount <= dec!(2)).count();
        if micro as f64 / n as f64 >= 0.6 {
            PartialResult::single(AlertType::MicroTransactionPattern)
        } else {
            PartialResult::empty()
        }
    }
}

/// DECLINE_THEN_APPROVE_PATTERN - only when the current transaction is
/// APPROVED; in `last10` (require >= 4), skip element 0 (the current), take
/// up to 3 of the preceding, trigger if >= 3 are BLOCKED.
pub struct DeclineThenApprovePattern;

impl Rule for DeclineThenApprovePattern {
    fn evaluate(&self, tx: &Transaction, snapshot: &ValidationSnapshot, _ctx: &RuleContext) -> PartialResult {
        if tx.decision != Decision::Approved {
            return PartialResult::empty();
        }
        if snapshot.last10.len() < 4 {
            return PartialResult::empty();
        }
        let preceding = snapshot.last10.iter().skip(1).take(3);
        let blocked = preceding.filter(|t| t.decision == Decision::Blocked).count();
        if blocked >= 3 {
            PartialResult::single(AlertType::DeclineThenApprovePattern)
        } else {
            PartialResult::empty()
        }
    }
}
