// =====================================================================================
// File: src/lifecycle.rs
// Description: Full reset / reseed tooling (§4.K)
// Author: arkSong (arksong2018@gmail.com)
// =====================================================================================

use crate::error::FraudGuardResult;
use crate::model::{Card, CardStatus, Device, DeviceType};
use crate::repository::Repository;
use chrono::{NaiveDate, Utc};
use rand::Rng;
use rust_decimal::Decimal;
use std::collections::HashSet;
use uuid::Uuid;

/// Shape of a reseed: how many cards to create and how many devices to
/// link to each.
#[derive(Debug, Clone, Copy)]
pub struct ResetConfig {
    pub card_count: usize,
    pub devices_per_card: usize,
}

impl Default for ResetConfig {
    fn default() -> Self {
        Self {
            card_count: 10,
            devices_per_card: 2,
        }
    }
}

const BRANDS: [&str; 3] = ["VISA", "MASTERCARD", "AMEX"];

/// Clear every aggregate and reseed a fresh population. Deletes across the
/// five entity types run in parallel since they are independent I/O
/// operations; creation is sequential (Card, then Device, then the link
/// between them) because linking needs both populations to already exist
/// (§4.K).
pub fn reset(repo: &dyn Repository, config: &ResetConfig) -> FraudGuardResult<()> {
    rayon::scope(|scope| {
        scope.spawn(|_| repo.clear_transactions());
        scope.spawn(|_| repo.clear_alerts());
        scope.spawn(|_| repo.clear_patterns());
        scope.spawn(|_| repo.clear_cards());
        scope.spawn(|_| repo.clear_devices());
    });

    let mut rng = rand::thread_rng();
    for _ in 0..config.card_count {
        let card = seed_card(&mut rng);
        repo.save_card(card.clone())?;

        let mut devices = Vec::with_capacity(config.devices_per_card);
        for _ in 0..config.devices_per_card {
            devices.push(seed_device(&mut rng));
        }
        for device in &devices {
            repo.save_device(device.clone())?;
        }

        link(repo, card, devices)?;
    }

    Ok(())
}

fn link(repo: &dyn Repository, mut card: Card, devices: Vec<Device>) -> FraudGuardResult<()> {
    for mut device in devices {
        device.cards.insert(card.id);
        card.devices.insert(device.id);
        repo.save_device(device)?;
    }
    repo.save_card(card)
}

fn seed_card(rng: &mut impl Rng) -> Card {
    let limit = Decimal::new(rng.gen_range(50_000..500_000), 2);
    Card {
        id: Uuid::new_v4(),
        brand: BRANDS[rng.gen_range(0..BRANDS.len())].to_string(),
        pan: format!("4{:015}", rng.gen_range(0..10_u64.pow(15))),
        holder_name: "Synthetic Holder".to_string(),
        expiration_date: NaiveDate::from_ymd_opt(2027 + rng.gen_range(0..4), 1 + rng.gen_range(0..12), 1).unwrap(),
        credit_limit: limit,
        remaining_limit: limit,
        status: CardStatus::Active,
        created_at: Utc::now(),
        last_transaction_at: None,
        risk_score: 0,
        devices: HashSet::new(),
    }
}

fn seed_device(rng: &mut impl Rng) -> Device {
    let device_types = [DeviceType::Mobile, DeviceType::Desktop, DeviceType::PosTerminal];
    Device {
        id: Uuid::new_v4(),
        fingerprint: format!("fp-{:08x}", rng.gen::<u32>()),
        device_type: device_types[rng.gen_range(0..device_types.len())],
        os: "Unknown".to_string(),
        browser: "Unknown".to_string(),
        first_seen: Utc::now(),
        last_seen: Utc::now(),
        cards: HashSet::new(),
    }
}
