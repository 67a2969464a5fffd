// =====================================================================================
// File: src/generator/merchant.rs
// Description: Merchant-category sub-generator (§4.C.2)
// Author: arkSong (arksong2018@gmail.com)
// =====================================================================================

use crate::model::{MerchantCategory, Transaction};
use rand::Rng;

/// Pick a merchant category. With probability 0.1 draw uniformly from the
/// high-risk set; otherwise weight each category at 1 plus 3 per occurrence
/// in the recent history and pick proportionally to that weight.
pub fn generate(rng: &mut impl Rng, recent: &[Transaction]) -> MerchantCategory {
    if rng.gen_bool(0.1) {
        let idx = rng.gen_range(0..MerchantCategory::HIGH_RISK.len());
        return MerchantCategory::HIGH_RISK[idx];
    }

    let weights: Vec<(MerchantCategory, u32)> = MerchantCategory::ALL
        .iter()
        .filter(|&&category| category != MerchantCategory::Unknown)
        .map(|&category| {
            let occurrences = recent.iter().filter(|t| t.merchant_category == category).count() as u32;
            (category, 1 + 3 * occurrences)
        })
        .collect();

    let total: u32 = weights.iter().map(|(_, w)| w).sum();
    let mut draw = rng.gen_range(0..total);
    for (category, weight) in &weights {
        if draw < *weight {
            return *category;
        }
        draw -= weight;
    }

    // Unreachable: weights always sum to `total`, so `draw` is always
    // consumed by one of the buckets above.
    MerchantCategory::Unknown
}
