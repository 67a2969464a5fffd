// =====================================================================================
// File: src/generator/location.rs
// Description: Location sub-generator (§4.C.4)
// Author: arkSong (arksong2018@gmail.com)
// =====================================================================================

use crate::geo::{cities, sample_in_disk, Coordinate};
use crate::model::Transaction;
use rand::seq::SliceRandom;
use rand::Rng;

/// Draw a synthetic `(lat, lon)` pair. With an empty history, sample a
/// random city and a point within half its urban radius. Otherwise, with
/// probability 0.95 draw near the most recent coordinate; with probability
/// 0.05 jump to a random city, modeling a trip or location-spoofing anomaly.
pub fn generate(rng: &mut impl Rng, recent: &[Transaction]) -> Coordinate {
    if recent.is_empty() {
        let city = cities::all().choose(rng).expect("city catalog is never empty");
        return sample_in_disk(rng, city.coordinate(), city.urban_radius_km * 0.5);
    }

    if rng.gen_bool(0.95) {
        if let Ok(previous) = Coordinate::parse(&recent[0].latitude, &recent[0].longitude) {
            return sample_in_disk(rng, previous, 5.0);
        }
    }

    let city = cities::all().choose(rng).expect("city catalog is never empty");
    sample_in_disk(rng, city.coordinate(), city.urban_radius_km * 0.5)
}
