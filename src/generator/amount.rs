// =====================================================================================
// File: src/generator/amount.rs
// Description: Amount sub-generator (§4.C.1)
// Author: arkSong (arksong2018@gmail.com)
// =====================================================================================

use crate::model::Transaction;
use rand::Rng;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Draw a synthetic amount from the card's recent history. With probability
/// 0.9 it is a small multiplicative jitter around the average; with
/// probability 0.1 it is an outlier 3-6x the average. An empty history
/// falls back to a base value of 100.
pub fn generate(rng: &mut impl Rng, recent: &[Transaction]) -> Decimal {
    let average = if recent.is_empty() {
        100.0
    } else {
        let sum: f64 = recent.iter().map(|t| t.amount.to_f64().unwrap_or(0.0)).sum();
        sum / recent.len() as f64
    };

    let raw = if rng.gen_bool(0.9) {
        average * rng.gen_range(0.9..1.1)
    } else {
        let multiplier = 3.0 + (rng.gen_range(0.0..3.0_f64)).floor();
        average * multiplier
    };

    Decimal::from_f64_retain(raw)
        .unwrap_or(Decimal::new(10000, 2))
        .round_dp(2)
}
