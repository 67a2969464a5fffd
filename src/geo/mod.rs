// =====================================================================================
// File: src/geo/mod.rs
// Description: Geospatial utilities - haversine distance, in-disk sampling,
//              city catalog, IPv6 CIDR expansion and membership (§4.A)
// Author: arkSong (arksong2018@gmail.com)
// =====================================================================================

pub mod cities;
pub mod ipv6;

use crate::error::{FraudGuardError, FraudGuardResult};
use rand::Rng;
use std::f64::consts::PI;

/// A point in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Parse a `(lat, lon)` pair from the 6-decimal-precision strings stored
    /// on a transaction. Returns `MalformedCoordinate` on parse failure,
    /// letting the caller decide the rule is inapplicable (§4.A).
    pub fn parse(lat: &str, lon: &str) -> FraudGuardResult<Self> {
        let lat: f64 = lat
            .parse()
            .map_err(|_| FraudGuardError::MalformedCoordinate(lat.to_string()))?;
        let lon: f64 = lon
            .parse()
            .map_err(|_| FraudGuardError::MalformedCoordinate(lon.to_string()))?;
        Ok(Self { lat, lon })
    }
}

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between two points, in kilometers, assuming a
/// spherical Earth of radius 6371 km.
pub fn haversine_km(a: Coordinate, b: Coordinate) -> f64 {
    let phi1 = a.lat.to_radians();
    let phi2 = b.lat.to_radians();
    let d_phi = (b.lat - a.lat).to_radians();
    let d_lambda = (b.lon - a.lon).to_radians();

    let sin_dphi = (d_phi / 2.0).sin();
    let sin_dlambda = (d_lambda / 2.0).sin();
    let h = sin_dphi * sin_dphi + phi1.cos() * phi2.cos() * sin_dlambda * sin_dlambda;
    let h = h.clamp(0.0, 1.0);
    2.0 * EARTH_RADIUS_KM * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Draw a point uniformly distributed within a disk of radius `radius_km`
/// centered on `center` (§4.A uniform in-disk sampling).
pub fn sample_in_disk(rng: &mut impl Rng, center: Coordinate, radius_km: f64) -> Coordinate {
    let r_lat = radius_km / 111.0;
    let r_lon = radius_km / (111.0 * center.lat.to_radians().cos().max(1e-6).abs());
    let theta = rng.gen_range(0.0..(2.0 * PI));
    let rho: f64 = rng.gen_range(0.0_f64..1.0).sqrt();

    let mut lat = center.lat + rho * r_lat * theta.cos();
    let mut lon = center.lon + rho * r_lon * theta.sin();

    // wrap longitude into [-180, 180)
    lon = ((lon + 180.0).rem_euclid(360.0)) - 180.0;
    lat = lat.clamp(-90.0, 90.0);

    Coordinate::new(lat, lon)
}
