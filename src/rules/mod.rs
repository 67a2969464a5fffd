// =====================================================================================
// File: src/rules/mod.rs
// Description: Rule trait, partial result, and the 19-rule set (§4.E)
// Author: arkSong (arksong2018@gmail.com)
// =====================================================================================

mod amount;
mod anomaly;
mod behavior;
mod device;
mod fraud_patterns;
mod location;
mod operational;
mod velocity;

use crate::config::GeoConfig;
use crate::geo::ipv6::VpnBlacklist;
use crate::model::{AlertType, Card, Device, Transaction};
use crate::validation::ValidationSnapshot;
use chrono::NaiveDate;

/// Output of a single rule: `(score, alerts)`. An empty result is `(0, [])`.
/// `score == 0 <=> alerts.is_empty()` is a crate-wide invariant (§8).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartialResult {
    pub score: i64,
    pub alerts: Vec<AlertType>,
}

impl PartialResult {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn single(alert: AlertType) -> Self {
        Self {
            score: alert.weight(),
            alerts: vec![alert],
        }
    }
}

/// Read-only material a rule may consult beyond the transaction and
/// snapshot: the card and (if known) originating device, and the
/// process-wide singletons loaded at startup (§5 "process-wide, read-only").
pub struct RuleContext<'a> {
    pub card: &'a Card,
    pub device: Option<&'a Device>,
    pub vpn: &'a VpnBlacklist,
    pub geo: &'a GeoConfig,
    /// Reference "today" for expiration checks - the transaction's own date,
    /// not wall-clock time, so evaluation is deterministic and replayable.
    pub today: NaiveDate,
}

/// A rule's evaluate method may report under more than one name when the
/// specification bundles two alert types into a single rule (the
/// credit-limit / expiration bullet in §4.E "Amount and limit").
pub trait Rule: Send + Sync {
    fn evaluate(&self, tx: &Transaction, snapshot: &ValidationSnapshot, ctx: &RuleContext) -> PartialResult;
}

/// All 19 rules (§4.E groups `CREDIT_LIMIT_REACHED` and
/// `EXPIRATION_DATE_APPROACHING` into a single bullet, so the 20 `AlertType`
/// tags map onto 19 independent rule evaluations - §1, §2). Rules run in no
/// particular order (§5: completion order does not affect the aggregate
/// score).
pub fn all_rules() -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(velocity::VelocityAbuse),
        Box::new(velocity::BurstActivity),
        Box::new(fraud_patterns::CardTesting),
        Box::new(fraud_patterns::MicroTransactionPattern),
        Box::new(fraud_patterns::DeclineThenApprovePattern),
        Box::new(amount::HighAmount),
        Box::new(amount::LimitExceeded),
        Box::new(amount::LimitAndExpiration),
        Box::new(location::HighRiskCountry),
        Box::new(location::LocationAnomaly),
        Box::new(location::ImpossibleTravel),
        Box::new(device::NewDeviceDetected),
        Box::new(device::DeviceFingerprintChange),
        Box::new(device::TorOrProxyDetected),
        Box::new(device::MultipleCardsSameDevice),
        Box::new(operational::MultipleFailedAttempts),
        Box::new(operational::SuspiciousSuccessAfterFailure),
        Box::new(behavior::TimeOfDayAnomaly),
        Box::new(anomaly::AnomalyModelTriggered),
    ]
}
