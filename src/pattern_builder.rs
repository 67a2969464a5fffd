// =====================================================================================
// File: src/pattern_builder.rs
// Description: Card behavioral-profile builder, with a cache invalidated on
//              every rebuild (§4.I)
// Author: arkSong (arksong2018@gmail.com)
// =====================================================================================

use crate::model::{CardPattern, MerchantCategory, TicketBucket, Transaction};
use chrono::{Datelike, Timelike, Utc, Weekday};
use rust_decimal::prelude::ToPrimitive;
use std::collections::{HashMap, HashSet};
use std::sync::RwLock;
use uuid::Uuid;

/// Process-wide pattern cache, memoized by card id and invalidated before
/// every rebuild write (§4.I Caching).
#[derive(Default)]
pub struct PatternCache {
    entries: RwLock<HashMap<Uuid, CardPattern>>,
}

impl PatternCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, card_id: Uuid) -> Option<CardPattern> {
        self.entries.read().unwrap().get(&card_id).cloned()
    }

    pub fn invalidate(&self, card_id: Uuid) {
        self.entries.write().unwrap().remove(&card_id);
    }

    pub fn put(&self, pattern: CardPattern) {
        self.entries.write().unwrap().insert(pattern.card_id, pattern);
    }
}

/// Rebuild a card's behavioral pattern from its full transaction history.
/// On an empty history, returns the lazily-created empty pattern (§4.I).
pub fn build_pattern(card_id: Uuid, cache: &PatternCache, transactions: &[Transaction]) -> CardPattern {
    cache.invalidate(card_id);

    if transactions.is_empty() {
        let pattern = CardPattern::empty(card_id);
        cache.put(pattern.clone());
        return pattern;
    }

    let mut amounts: Vec<f64> = transactions.iter().map(|t| t.amount.to_f64().unwrap_or(0.0)).collect();
    amounts.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let n = amounts.len();

    let clamp = |i: usize| i.min(n - 1);
    let mean = amounts.iter().sum::<f64>() / n as f64;
    let max = amounts[n - 1];
    let median = amounts[clamp(n / 2)];
    let q1 = amounts[clamp(n / 4)];
    let q3 = amounts[clamp(3 * n / 4)];
    let variance = amounts.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n as f64;
    let std_dev = variance.sqrt();
    let p95_index = clamp(((0.95 * n as f64).ceil() as usize).saturating_sub(1));
    let p95 = amounts[p95_index];

    let ticket_distribution = ticket_analytics(&amounts, q1, median, q3);

    let (categories, entropy) = category_analytics(transactions);
    let top_categories = top_n_categories(&categories, 5);

    let (top_hours, top_weekdays, weekend_ratio, transactions_per_day, max_per_hour_bucket, temporal_consistency) =
        temporal_analytics(transactions);

    let pattern = CardPattern {
        card_id,
        average_amount: mean,
        median_amount: median,
        max_amount: max,
        q1_amount: q1,
        q3_amount: q3,
        iqr_amount: q3 - q1,
        std_dev_amount: std_dev,
        p95_amount: p95,
        ticket_distribution,
        top_categories,
        top_hours,
        transactions_per_day,
        category_entropy: entropy,
        top_weekdays,
        weekend_ratio,
        max_per_hour_bucket,
        temporal_consistency,
        last_updated: Utc::now(),
    };

    cache.put(pattern.clone());
    pattern
}

/// Classify a single amount against the card's own quartiles: `micro < Q1 ≤
/// small < median ≤ medium < Q3 ≤ large` (§4.I ticket classification).
fn classify_ticket(amount: f64, q1: f64, median: f64, q3: f64) -> TicketBucket {
    if amount < q1 {
        TicketBucket::Micro
    } else if amount < median {
        TicketBucket::Small
    } else if amount < q3 {
        TicketBucket::Medium
    } else {
        TicketBucket::Large
    }
}

fn ticket_analytics(amounts: &[f64], q1: f64, median: f64, q3: f64) -> Vec<(TicketBucket, usize)> {
    let mut counts: HashMap<TicketBucket, usize> = HashMap::new();
    for &amount in amounts {
        *counts.entry(classify_ticket(amount, q1, median, q3)).or_insert(0) += 1;
    }
    [TicketBucket::Micro, TicketBucket::Small, TicketBucket::Medium, TicketBucket::Large]
        .into_iter()
        .filter_map(|bucket| counts.get(&bucket).map(|&c| (bucket, c)))
        .collect()
}

fn category_analytics(transactions: &[Transaction]) -> (HashMap<MerchantCategory, usize>, f64) {
    let mut histogram: HashMap<MerchantCategory, usize> = HashMap::new();
    for t in transactions {
        *histogram.entry(t.merchant_category).or_insert(0) += 1;
    }
    let n = transactions.len() as f64;
    let entropy = histogram
        .values()
        .map(|&count| {
            let p = count as f64 / n;
            -p * p.log2()
        })
        .sum();
    (histogram, entropy)
}

fn top_n_categories(histogram: &HashMap<MerchantCategory, usize>, n: usize) -> Vec<(MerchantCategory, usize)> {
    let mut entries: Vec<(MerchantCategory, usize)> = histogram.iter().map(|(&k, &v)| (k, v)).collect();
    entries.sort_by_key(|e| std::cmp::Reverse(e.1));
    entries.truncate(n);
    entries
}

type TemporalAnalytics = (Vec<chrono::DateTime<Utc>>, Vec<Weekday>, f64, f64, usize, f64);

fn temporal_analytics(transactions: &[Transaction]) -> TemporalAnalytics {
    let mut hour_histogram = [0usize; 24];
    let mut weekday_histogram = [0usize; 7];
    let mut bucket_counts: HashMap<(chrono::NaiveDate, u32), usize> = HashMap::new();
    let mut day_counts: HashSet<chrono::NaiveDate> = HashSet::new();
    let mut hours: Vec<f64> = Vec::new();

    for t in transactions {
        let dt = t.created_at;
        let hour = dt.hour();
        hour_histogram[hour as usize] += 1;
        weekday_histogram[dt.weekday().num_days_from_monday() as usize] += 1;
        *bucket_counts.entry((dt.date_naive(), hour)).or_insert(0) += 1;
        day_counts.insert(dt.date_naive());
        hours.push(hour as f64);
    }

    let mut hour_ranked: Vec<(u32, usize)> = hour_histogram
        .iter()
        .enumerate()
        .map(|(h, &c)| (h as u32, c))
        .collect();
    hour_ranked.sort_by_key(|e| std::cmp::Reverse(e.1));
    let top_hours: Vec<chrono::DateTime<Utc>> = hour_ranked
        .into_iter()
        .take(3)
        .filter(|&(_, c)| c > 0)
        .map(|(h, _)| {
            Utc::now()
                .date_naive()
                .and_hms_opt(h, 0, 0)
                .unwrap()
                .and_utc()
        })
        .collect();

    let weekdays = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ];
    let mut weekday_ranked: Vec<(Weekday, usize)> = weekday_histogram
        .iter()
        .enumerate()
        .map(|(i, &c)| (weekdays[i], c))
        .collect();
    weekday_ranked.sort_by_key(|e| std::cmp::Reverse(e.1));
    let top_weekdays: Vec<Weekday> = weekday_ranked
        .into_iter()
        .take(3)
        .filter(|&(_, c)| c > 0)
        .map(|(w, _)| w)
        .collect();

    let weekend_count = weekday_histogram[5] + weekday_histogram[6];
    let weekend_ratio = weekend_count as f64 / transactions.len() as f64;

    let day_count = day_counts.len().max(1);
    let transactions_per_day = transactions.len() as f64 / day_count as f64;

    let max_per_hour_bucket = bucket_counts.values().copied().max().unwrap_or(0);

    let mean_hour = hours.iter().sum::<f64>() / hours.len() as f64;
    let variance = hours.iter().map(|h| (h - mean_hour).powi(2)).sum::<f64>() / hours.len() as f64;
    let temporal_consistency = variance.sqrt();

    (
        top_hours,
        top_weekdays,
        weekend_ratio,
        transactions_per_day,
        max_per_hour_bucket,
        temporal_consistency,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Decision;
    use chrono::Duration;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn tx_with(amount: Decimal, created_at: chrono::DateTime<Utc>, category: MerchantCategory) -> Transaction {
        Transaction {
            id: Uuid::new_v4(),
            card_id: Uuid::new_v4(),
            device_id: Uuid::new_v4(),
            device_fingerprint: "fp".to_string(),
            amount,
            merchant_category: category,
            ip_address: "::1".to_string(),
            latitude: "0.0".to_string(),
            longitude: "0.0".to_string(),
            country: None,
            state: None,
            city: None,
            transaction_at: created_at,
            created_at,
            reimbursed: false,
            fraud: false,
            decision: Decision::Approved,
        }
    }

    #[test]
    fn empty_history_yields_empty_pattern() {
        let cache = PatternCache::new();
        let card_id = Uuid::new_v4();
        let pattern = build_pattern(card_id, &cache, &[]);
        assert_eq!(pattern.average_amount, 0.0);
        assert_eq!(cache.get(card_id).unwrap().card_id, card_id);
    }

    #[test]
    fn quartiles_are_ordered_and_non_negative_dispersion() {
        let cache = PatternCache::new();
        let card_id = Uuid::new_v4();
        let now = Utc::now();
        let amounts = [dec!(10.00), dec!(20.00), dec!(30.00), dec!(40.00), dec!(50.00), dec!(5.00)];
        let txs: Vec<Transaction> = amounts
            .iter()
            .enumerate()
            .map(|(i, &a)| tx_with(a, now - Duration::hours(i as i64), MerchantCategory::Grocery))
            .collect();
        let pattern = build_pattern(card_id, &cache, &txs);

        assert!(pattern.q1_amount <= pattern.median_amount);
        assert!(pattern.median_amount <= pattern.q3_amount);
        assert!(pattern.q3_amount <= pattern.max_amount);
        assert!(pattern.std_dev_amount >= 0.0);
        assert!(pattern.average_amount >= 0.0);
    }

    #[test]
    fn small_history_does_not_panic_on_index_clamping() {
        let cache = PatternCache::new();
        let card_id = Uuid::new_v4();
        let now = Utc::now();
        let txs = vec![tx_with(dec!(10.00), now, MerchantCategory::Grocery)];
        let pattern = build_pattern(card_id, &cache, &txs);
        assert_eq!(pattern.max_amount, 10.0);
        assert_eq!(pattern.q1_amount, 10.0);
    }

    #[test]
    fn ticket_distribution_buckets_every_amount() {
        let cache = PatternCache::new();
        let card_id = Uuid::new_v4();
        let now = Utc::now();
        let amounts = [dec!(1.00), dec!(10.00), dec!(20.00), dec!(30.00), dec!(100.00)];
        let txs: Vec<Transaction> = amounts
            .iter()
            .enumerate()
            .map(|(i, &a)| tx_with(a, now - Duration::hours(i as i64), MerchantCategory::Grocery))
            .collect();
        let pattern = build_pattern(card_id, &cache, &txs);

        let total: usize = pattern.ticket_distribution.iter().map(|&(_, c)| c).sum();
        assert_eq!(total, amounts.len());
        assert!(pattern
            .ticket_distribution
            .iter()
            .any(|&(b, _)| b == TicketBucket::Large));
    }

    #[test]
    fn rebuild_invalidates_previous_cache_entry() {
        let cache = PatternCache::new();
        let card_id = Uuid::new_v4();
        let now = Utc::now();
        let first = build_pattern(card_id, &cache, &[tx_with(dec!(10.00), now, MerchantCategory::Grocery)]);
        let second = build_pattern(
            card_id,
            &cache,
            &[
                tx_with(dec!(10.00), now, MerchantCategory::Grocery),
                tx_with(dec!(500.00), now, MerchantCategory::Grocery),
            ],
        );
        assert_ne!(first.max_amount, second.max_amount);
        assert_eq!(cache.get(card_id).unwrap().max_amount, second.max_amount);
    }
}
