// =====================================================================================
// File: src/rules/velocity.rs
// Description: Frequency and velocity rules (§4.E)
// Author: arkSong (arksong2018@gmail.com)
// =====================================================================================

use super::{PartialResult, Rule, RuleContext};
use crate::model::{AlertType, Transaction};
use crate::validation::ValidationSnapshot;

/// VELOCITY_ABUSE - trigger if `|last5Minutes| >= 3`.
pub struct VelocityAbuse;

impl Rule for VelocityAbuse {
    fn evaluate(&self, _tx: &Transaction, snapshot: &ValidationSnapshot, _ctx: &RuleContext) -> PartialResult {
        if snapshot.last5_minutes.len() >= 3 {
            PartialResult::single(AlertType::VelocityAbuse)
        } else {
            PartialResult::empty()
        }
    }
}

/// BURST_ACTIVITY - baseline = `|last24Hours|`, require >= 5; trigger if
/// `|last5Minutes| > (baseline / 24) * 3`.
pub struct BurstActivity;

impl Rule for BurstActivity {
    fn evaluate(&self, _tx: &Transaction, snapshot: &ValidationSnapshot, _ctx: &RuleContext) -> PartialResult {
        let baseline = snapshot.last24_hours.len();
        if baseline < 5 {
            return PartialResult::empty();
        }
        let threshold = (baseline as f64 / 24.0) * 3.0;
        if snapshot.last5_minutes.len() as f64 > threshold {
            PartialResult::single(AlertType::BurstActivity)
        } else {
            PartialResult::empty()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::tests_support::{ctx_for, tx_at};
    use chrono::{Duration, Utc};

    #[test]
    fn velocity_abuse_requires_three_in_five_minutes() {
        let now = Utc::now();
        let current = tx_at(now);
        let snapshot = ValidationSnapshot {
            last20: vec![tx_at(now - Duration::minutes(1)), tx_at(now - Duration::minutes(2))],
            last10: vec![],
            last24_hours: vec![],
            last10_minutes: vec![],
            last5_minutes: vec![tx_at(now - Duration::minutes(1)), tx_at(now - Duration::minutes(2))],
        };
        let ctx = ctx_for();
        assert_eq!(VelocityAbuse.evaluate(&current, &snapshot, &ctx), PartialResult::empty());

        let snapshot3 = ValidationSnapshot {
            last5_minutes: vec![tx_at(now), tx_at(now), tx_at(now)],
            ..snapshot
        };
        assert_eq!(
            VelocityAbuse.evaluate(&current, &snapshot3, &ctx).alerts,
            vec![AlertType::VelocityAbuse]
        );
    }

    #[test]
    fn burst_activity_needs_baseline_of_five() {
        let now = Utc::now();
        let current = tx_at(now);
        let ctx = ctx_for();
        let snapshot = ValidationSnapshot {
            last20: vec![],
            last10: vec![],
            last24_hours: vec![tx_at(now); 4],
            last10_minutes: vec![],
            last5_minutes: vec![tx_at(now); 4],
        };
        assert_eq!(BurstActivity.evaluate(&current, &snapshot, &ctx), PartialResult::empty());

        let snapshot2 = ValidationSnapshot {
            last24_hours: vec![tx_at(now); 8], // threshold = 1.0
            last5_minutes: vec![tx_at(now); 2],
            ..snapshot
        };
        assert_eq!(
            BurstActivity.evaluate(&current, &snapshot2, &ctx).alerts,
            vec![AlertType::BurstActivity]
        );
    }
}
