// =====================================================================================
// File: src/generator/mod.rs
// Description: Transaction generator - normal (random pool) and manual
//              (caller-supplied) modes (§4.C)
// Author: arkSong (arksong2018@gmail.com)
// =====================================================================================

pub mod amount;
pub mod location;
pub mod merchant;
pub mod network;

use crate::error::{FraudGuardError, FraudGuardResult};
use crate::geo::ipv6::VpnBlacklist;
use crate::model::{Card, Decision, Device, MerchantCategory, Transaction};
use crate::repository::Repository;
use chrono::Utc;
use rand::seq::SliceRandom;
use rand::Rng;
use rust_decimal::Decimal;
use uuid::Uuid;

/// Caller-supplied fields for manual generation (§4.C).
pub struct ManualPayload {
    pub card_id: Uuid,
    pub device_id: Uuid,
    pub amount: Decimal,
    pub merchant_category: MerchantCategory,
    pub ip_address: String,
    pub latitude: String,
    pub longitude: String,
}

pub enum GenerationRequest {
    Normal,
    Manual(ManualPayload),
}

/// The card/device pair a transaction was generated against, alongside the
/// transaction itself - the caller needs all three for the decision pass.
pub struct GeneratedTransaction {
    pub card: Card,
    pub device: Device,
    pub transaction: Transaction,
}

pub fn generate(
    repo: &dyn Repository,
    vpn: &VpnBlacklist,
    rng: &mut impl Rng,
    success_force: bool,
    request: GenerationRequest,
) -> FraudGuardResult<GeneratedTransaction> {
    match request {
        GenerationRequest::Normal => generate_normal(repo, vpn, rng, success_force),
        GenerationRequest::Manual(payload) => generate_manual(repo, success_force, payload),
    }
}

fn generate_normal(
    repo: &dyn Repository,
    vpn: &VpnBlacklist,
    rng: &mut impl Rng,
    success_force: bool,
) -> FraudGuardResult<GeneratedTransaction> {
    let candidates: Vec<Card> = repo
        .all_cards()
        .into_iter()
        .filter(|c| c.is_active() && !c.devices.is_empty())
        .collect();
    let card = candidates
        .choose(rng)
        .cloned()
        .ok_or(FraudGuardError::NoCardsAvailable)?;

    let device_ids: Vec<Uuid> = card.devices.iter().copied().collect();
    let device_id = *device_ids.choose(rng).expect("card selection guarantees a non-empty device set");
    let device = repo
        .find_device(device_id)
        .ok_or_else(|| FraudGuardError::DeviceNotFound(device_id.to_string()))?;

    let recent = repo.recent_transactions(card.id, 20);
    let amount = amount::generate(rng, &recent);
    let merchant_category = merchant::generate(rng, &recent);
    let ip_address = network::generate(rng, vpn);
    let point = location::generate(rng, &recent);

    let now = Utc::now();
    let transaction = Transaction {
        id: Uuid::new_v4(),
        card_id: card.id,
        device_id: device.id,
        device_fingerprint: device.fingerprint.clone(),
        amount,
        merchant_category,
        ip_address,
        latitude: format!("{:.6}", point.lat),
        longitude: format!("{:.6}", point.lon),
        country: None,
        state: None,
        city: None,
        transaction_at: now,
        created_at: now,
        reimbursed: false,
        fraud: false,
        decision: initial_decision(success_force),
    };

    Ok(GeneratedTransaction { card, device, transaction })
}

fn generate_manual(
    repo: &dyn Repository,
    success_force: bool,
    payload: ManualPayload,
) -> FraudGuardResult<GeneratedTransaction> {
    let card = repo
        .find_card(payload.card_id)
        .ok_or_else(|| FraudGuardError::CardNotFound(payload.card_id.to_string()))?;
    if !card.is_active() {
        return Err(FraudGuardError::CardBlockedOrLost(card.id.to_string()));
    }
    let device = repo
        .find_device(payload.device_id)
        .ok_or_else(|| FraudGuardError::DeviceNotFound(payload.device_id.to_string()))?;
    if !card.devices.contains(&device.id) {
        return Err(FraudGuardError::DeviceNotLinked {
            card: card.id.to_string(),
            device: device.id.to_string(),
        });
    }

    let now = Utc::now();
    let transaction = Transaction {
        id: Uuid::new_v4(),
        card_id: card.id,
        device_id: device.id,
        device_fingerprint: device.fingerprint.clone(),
        amount: payload.amount,
        merchant_category: payload.merchant_category,
        ip_address: payload.ip_address,
        latitude: payload.latitude,
        longitude: payload.longitude,
        country: None,
        state: None,
        city: None,
        transaction_at: now,
        created_at: now,
        reimbursed: false,
        fraud: false,
        decision: initial_decision(success_force),
    };

    Ok(GeneratedTransaction { card, device, transaction })
}

fn initial_decision(success_force: bool) -> Decision {
    if success_force {
        Decision::Approved
    } else {
        Decision::Review
    }
}
