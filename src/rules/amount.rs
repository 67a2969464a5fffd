// =====================================================================================
// File: src/rules/amount.rs
// Description: Amount and limit rules (§4.E)
// Author: arkSong (arksong2018@gmail.com)
// =====================================================================================

use super::{PartialResult, Rule, RuleContext};
use crate::model::{AlertType, Transaction};
use crate::validation::ValidationSnapshot;
use rust_decimal::Decimal;

/// HIGH_AMOUNT - require `|last20| >= 5`; trigger if `amount > mean * 1.5`.
pub struct HighAmount;

impl Rule for HighAmount {
    fn evaluate(&self, tx: &Transaction, snapshot: &ValidationSnapshot, _ctx: &RuleContext) -> PartialResult {
        if snapshot.last20.len() < 5 {
            return PartialResult::empty();
        }
        let mean = mean_amount(&snapshot.last20);
        if decimal_to_f64(tx.amount) > mean * 1.5 {
            PartialResult::single(AlertType::HighAmount)
        } else {
            PartialResult::empty()
        }
    }
}

/// LIMIT_EXCEEDED - `used = sum(amounts in last20)`; trigger if
/// `amount > creditLimit - used`.
pub struct LimitExceeded;

impl Rule for LimitExceeded {
    fn evaluate(&self, tx: &Transaction, snapshot: &ValidationSnapshot, ctx: &RuleContext) -> PartialResult {
        let used: Decimal = snapshot.last20.iter().map(|t| t.amount).sum();
        if tx.amount > ctx.card.credit_limit - used {
            PartialResult::single(AlertType::LimitExceeded)
        } else {
            PartialResult::empty()
        }
    }
}

/// Bundled bullet (§4.E): CREDIT_LIMIT_REACHED triggers when
/// `amount > remainingLimit` and is decisive (§4.G forces BLOCKED);
/// EXPIRATION_DATE_APPROACHING triggers when `expirationDate - today <= 30 days`.
/// Both are independent checks folded into one rule, matching the spec's
/// own combined bullet and the "19 rules / 20 alert types" accounting (§1).
pub struct LimitAndExpiration;

impl Rule for LimitAndExpiration {
    fn evaluate(&self, tx: &Transaction, _snapshot: &ValidationSnapshot, ctx: &RuleContext) -> PartialResult {
        let mut result = PartialResult::empty();

        if tx.amount > ctx.card.remaining_limit {
            let a = AlertType::CreditLimitReached;
            result.score += a.weight();
            result.alerts.push(a);
        }

        let days_to_expiry = (ctx.card.expiration_date - ctx.today).num_days();
        if days_to_expiry <= 30 {
            let a = AlertType::ExpirationDateApproaching;
            result.score += a.weight();
            result.alerts.push(a);
        }

        result
    }
}

fn mean_amount(txs: &[Transaction]) -> f64 {
    if txs.is_empty() {
        return 0.0;
    }
    let sum: Decimal = txs.iter().map(|t| t.amount).sum();
    decimal_to_f64(sum) / txs.len() as f64
}

fn decimal_to_f64(d: Decimal) -> f64 {
    use rust_decimal::prelude::ToPrimitive;
    d.to_f64().unwrap_or(0.0)
}
