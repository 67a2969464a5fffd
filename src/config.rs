// =====================================================================================
// File: src/config.rs
// Description: Tunables for the fraud evaluation engine
// Author: arkSong (arksong2018@gmail.com)
// =====================================================================================

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Engine-wide configuration. Defaults reproduce the literal constants from
/// the specification; embedders may override them (mirrors `FraudConfig` /
/// `VelocityLimits` / `GeographicRules` in the teacher's `fraud_detection`
/// module, which exposes as config what here are normative thresholds).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    pub decision: DecisionThresholds,
    pub geo: GeoConfig,
    pub limits: ResourceLimits,
    pub country_cache: CountryCacheConfig,
    pub vpn_blacklist_path: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            decision: DecisionThresholds::default(),
            geo: GeoConfig::default(),
            limits: ResourceLimits::default(),
            country_cache: CountryCacheConfig::default(),
            vpn_blacklist_path: "data/vpn-ipv6-blacklist.json".to_string(),
        }
    }
}

/// Score tier boundaries (§4.G).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DecisionThresholds {
    pub review_floor: i64,
    pub blocked_floor: i64,
}

impl Default for DecisionThresholds {
    fn default() -> Self {
        Self {
            review_floor: 25,
            blocked_floor: 60,
        }
    }
}

/// Geospatial rule tunables (§4.E Location).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoConfig {
    pub high_risk_countries: Vec<String>,
    pub location_anomaly_km: f64,
    pub impossible_travel_km: f64,
    pub impossible_travel_hours: f64,
    pub earth_radius_km: f64,
}

impl Default for GeoConfig {
    fn default() -> Self {
        Self {
            high_risk_countries: vec![
                "RU".to_string(),
                "NG".to_string(),
                "IR".to_string(),
                "KP".to_string(),
                "UA".to_string(),
            ],
            location_anomaly_km: 300.0,
            impossible_travel_km: 1000.0,
            impossible_travel_hours: 1.0,
            earth_radius_km: 6371.0,
        }
    }
}

/// Creation-time resource caps (§5).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ResourceLimits {
    pub max_cards: usize,
    pub max_devices_per_card: usize,
}

impl Default for ResourceLimits {
    fn default() -> Self {
        Self {
            max_cards: 500,
            max_devices_per_card: 20,
        }
    }
}

/// Country-resolution cache bound (§4.B).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CountryCacheConfig {
    pub max_entries: usize,
    #[serde(with = "duration_secs")]
    pub write_age: Duration,
    #[serde(with = "duration_secs")]
    pub timeout: Duration,
}

impl Default for CountryCacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 10_000,
            write_age: Duration::from_secs(600),
            timeout: Duration::from_secs(2),
        }
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_secs(u64::deserialize(d)?))
    }
}
