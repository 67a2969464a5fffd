// =====================================================================================
// File: src/rules/behavior.rs
// Description: User-behavior rule (§4.E)
// Author: arkSong (arksong2018@gmail.com)
// =====================================================================================

use super::{PartialResult, Rule, RuleContext};
use crate::model::{AlertType, Transaction};
use crate::validation::ValidationSnapshot;
use chrono::Timelike;

/// TIME_OF_DAY_ANOMALY - require `|last20| >= 10`; trigger if the current
/// hour deviates from the history's mean hour by more than 4.
pub struct TimeOfDayAnomaly;

impl Rule for TimeOfDayAnomaly {
    fn evaluate(&self, tx: &Transaction, snapshot: &ValidationSnapshot, _ctx: &RuleContext) -> PartialResult {
        if snapshot.last20.len() < 10 {
            return PartialResult::empty();
        }
        let mean_hour = snapshot
            .last20
            .iter()
            .map(|t| t.created_at.hour() as f64)
            .sum::<f64>()
            / snapshot.last20.len() as f64;
        let current_hour = tx.transaction_at.hour() as f64;
        if (current_hour - mean_hour).abs() > 4.0 {
            PartialResult::single(AlertType::TimeOfDayAnomaly)
        } else {
            PartialResult::empty()
        }
    }
}
