// =====================================================================================
// File: src/rules/location.rs
// Description: Location and travel rules (§4.E)
// Author: arkSong (arksong2018@gmail.com)
// =====================================================================================

use super::{PartialResult, Rule, RuleContext};
use crate::geo::{haversine_km, Coordinate};
use crate::model::{AlertType, Transaction};
use crate::validation::ValidationSnapshot;

/// HIGH_RISK_COUNTRY - trigger if the transaction's resolved country (§6,
/// upper-cased) is in the configured high-risk set. Unresolved is empty.
pub struct HighRiskCountry;

impl Rule for HighRiskCountry {
    fn evaluate(&self, tx: &Transaction, _snapshot: &ValidationSnapshot, ctx: &RuleContext) -> PartialResult {
        match &tx.country {
            Some(code) => {
                let upper = code.to_uppercase();
                if ctx.geo.high_risk_countries.iter().any(|c| c == &upper) {
                    PartialResult::single(AlertType::HighRiskCountry)
                } else {
                    PartialResult::empty()
                }
            }
            None => PartialResult::empty(),
        }
    }
}

/// Locate the most recent prior transaction in `last20` whose `created_at`
/// is strictly before the current one (§4.E Location reference point,
/// shared by LOCATION_ANOMALY and IMPOSSIBLE_TRAVEL).
fn previous_reference<'a>(tx: &Transaction, last20: &'a [Transaction]) -> Option<&'a Transaction> {
    last20
        .iter()
        .filter(|t| t.created_at < tx.created_at)
        .max_by_key(|t| t.created_at)
}

fn parse_point(tx: &Transaction) -> Option<Coordinate> {
    Coordinate::parse(&tx.latitude, &tx.longitude).ok()
}

/// LOCATION_ANOMALY - require `|last20| >= 2`; trigger if the distance to
/// the previous reference point exceeds 300 km.
pub struct LocationAnomaly;

impl Rule for LocationAnomaly {
    fn evaluate(&self, tx: &Transaction, snapshot: &ValidationSnapshot, ctx: &RuleContext) -> PartialResult {
        if snapshot.last20.len() < 2 {
            return PartialResult::empty();
        }
        let (Some(curr), Some(prev_tx)) = (parse_point(tx), previous_reference(tx, &snapshot.last20)) else {
            return PartialResult::empty();
        };
        let Some(prev) = parse_point(prev_tx) else {
            return PartialResult::empty();
        };
        if haversine_km(prev, curr) > ctx.geo.location_anomaly_km {
            PartialResult::single(AlertType::LocationAnomaly)
        } else {
            PartialResult::empty()
        }
    }
}

/// IMPOSSIBLE_TRAVEL - same reference point; skip if `dt <= 0`; trigger if
/// `distance > 1000 km && dt_hours < 1`.
pub struct ImpossibleTravel;

impl Rule for ImpossibleTravel {
    fn evaluate(&self, tx: &Transaction, snapshot: &ValidationSnapshot, ctx: &RuleContext) -> PartialResult {
        let Some(prev_tx) = previous_reference(tx, &snapshot.last20) else {
            return PartialResult::empty();
        };
        let dt = (tx.created_at - prev_tx.created_at).num_seconds();
        if dt <= 0 {
            return PartialResult::empty();
        }
        let (Some(curr), Some(prev)) = (parse_point(tx), parse_point(prev_tx)) else {
            return PartialResult::empty();
        };
        let hours = dt as f64 / 3600.0;
        let distance = haversine_km(prev, curr);
        if distance > ctx.geo.impossible_travel_km && hours < ctx.geo.impossible_travel_hours {
            PartialResult::single(AlertType::ImpossibleTravel)
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

    fn with_coords(created_at: chrono::DateTime<Utc>, lat: &str, lon: &str) -> Transaction {
        let mut t = tx_at(created_at);
        t.latitude = lat.to_string();
        t.longitude = lon.to_string();
        t
    }

    #[test]
    fn impossible_travel_fires_on_sao_paulo_to_new_york_in_ten_minutes() {
        let ctx = ctx_for();
        let now = Utc::now();
        let first = with_coords(now, "-23.550520", "-46.633308");
        let second = with_coords(now + Duration::minutes(10), "40.712776", "-74.005974");
        let snapshot = ValidationSnapshot {
            last20: vec![first],
            last10: vec![],
            last24_hours: vec![],
            last10_minutes: vec![],
            last5_minutes: vec![],
        };
        assert_eq!(
            ImpossibleTravel.evaluate(&second, &snapshot, &ctx).alerts,
            vec![AlertType::ImpossibleTravel]
        );
    }

    #[test]
    fn impossible_travel_skips_non_positive_delta() {
        let ctx = ctx_for();
        let now = Utc::now();
        let first = with_coords(now, "-23.550520", "-46.633308");
        let second = with_coords(now - Duration::minutes(10), "40.712776", "-74.005974");
        let snapshot = ValidationSnapshot {
            last20: vec![first],
            last10: vec![],
            last24_hours: vec![],
            last10_minutes: vec![],
            last5_minutes: vec![],
        };
        assert_eq!(ImpossibleTravel.evaluate(&second, &snapshot, &ctx), PartialResult::empty());
    }

    #[test]
    fn location_anomaly_requires_two_history_entries() {
        let ctx = ctx_for();
        let now = Utc::now();
        let first = with_coords(now, "-23.550520", "-46.633308");
        let second = with_coords(now + Duration::minutes(10), "40.712776", "-74.005974");
        let snapshot = ValidationSnapshot {
            last20: vec![first],
            last10: vec![],
            last24_hours: vec![],
            last10_minutes: vec![],
            last5_minutes: vec![],
        };
        assert_eq!(LocationAnomaly.evaluate(&second, &snapshot, &ctx), PartialResult::empty());
    }

    #[test]
    fn high_risk_country_matches_configured_set_case_insensitively() {
        let ctx = ctx_for();
        let mut tx = tx_at(Utc::now());
        tx.country = Some("ru".to_string());
        assert_eq!(
            HighRiskCountry.evaluate(&tx, &ValidationSnapshot {
                last20: vec![], last10: vec![], last24_hours: vec![], last10_minutes: vec![], last5_minutes: vec![]
            }, &ctx).alerts,
            vec![AlertType::HighRiskCountry]
        );
    }

    #[test]
    fn high_risk_country_empty_when_unresolved() {
        let ctx = ctx_for();
        let tx = tx_at(Utc::now());
        assert_eq!(
            HighRiskCountry.evaluate(&tx, &ValidationSnapshot {
                last20: vec![], last10: vec![], last24_hours: vec![], last10_minutes: vec![], last5_minutes: vec![]
            }, &ctx),
            PartialResult::empty()
        );
    }
}
