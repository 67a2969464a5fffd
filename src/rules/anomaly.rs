// =====================================================================================
// File: src/rules/anomaly.rs
// Description: Statistical anomaly rule simulating an external model (§4.E)
// Author: arkSong (arksong2018@gmail.com)
// =====================================================================================

use super::{PartialResult, Rule, RuleContext};
use crate::model::{AlertType, Transaction};
use crate::validation::ValidationSnapshot;
use rust_decimal::prelude::ToPrimitive;
use statrs::statistics::Statistics;

/// ANOMALY_MODEL_TRIGGERED - in `last20` excluding the current transaction,
/// require >= 10; trigger if `sigma > 0 && |amount - mu| > 2.5 * sigma`.
pub struct AnomalyModelTriggered;

impl Rule for AnomalyModelTriggered {
    fn evaluate(&self, tx: &Transaction, snapshot: &ValidationSnapshot, _ctx: &RuleContext) -> PartialResult {
        let history: Vec<f64> = snapshot
            .last20
            .iter()
            .filter(|t| t.id != tx.id)
            .map(|t| t.amount.to_f64().unwrap_or(0.0))
            .collect();
        if history.len() < 10 {
            return PartialResult::empty();
        }

        let mu = (&history[..]).mean();
        let sigma = (&history[..]).std_dev();
        if sigma <= 0.0 {
            return PartialResult::empty();
        }
        let amount = tx.amount.to_f64().unwrap_or(0.0);
        if (amount - mu).abs() > 2.5 * sigma {
            PartialResult::single(AlertType::AnomalyModelTriggered)
        } else {
            PartialResult::empty()
        }
    }
}
