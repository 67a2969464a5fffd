// =====================================================================================
// File: tests/end_to_end.rs
// Description: Full-pipeline scenarios driving Pipeline::process end to end
//              against an in-memory repository (§8 end-to-end scenarios).
// Author: arkSong (arksong2018@gmail.com)
// =====================================================================================

use chrono::{Duration, NaiveDate, Utc};
use fraudguard_core::config::EngineConfig;
use fraudguard_core::country::UnresolvedCountryResolver;
use fraudguard_core::generator::ManualPayload;
use fraudguard_core::geo::ipv6::VpnBlacklist;
use fraudguard_core::model::{
    AlertType, Card, CardStatus, Decision, Device, DeviceType, MerchantCategory, Transaction,
};
use fraudguard_core::repository::{InMemoryRepository, Repository};
use fraudguard_core::Pipeline;
use rust_decimal_macros::dec;
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

fn empty_vpn() -> VpnBlacklist {
    VpnBlacklist::from_json(r#"{"list": []}"#).unwrap()
}

/// Create and persist a card and its one linked device, both sides of the
/// many-to-many relationship populated (§3 Ownership).
fn linked_card_and_device(repo: &InMemoryRepository) -> (Card, Device) {
    let card_id = Uuid::new_v4();
    let device_id = Uuid::new_v4();

    let mut devices = HashSet::new();
    devices.insert(device_id);
    let card = Card {
        id: card_id,
        brand: "VISA".to_string(),
        pan: "4111111111111111".to_string(),
        holder_name: "Jane Doe".to_string(),
        expiration_date: NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
        credit_limit: dec!(1000.00),
        remaining_limit: dec!(1000.00),
        status: CardStatus::Active,
        created_at: Utc::now(),
        last_transaction_at: None,
        risk_score: 0,
        devices,
    };

    let mut cards = HashSet::new();
    cards.insert(card_id);
    let device = Device {
        id: device_id,
        fingerprint: "fp-main".to_string(),
        device_type: DeviceType::Mobile,
        os: "iOS".to_string(),
        browser: "Safari".to_string(),
        first_seen: Utc::now(),
        last_seen: Utc::now(),
        cards,
    };

    repo.save_card(card.clone()).unwrap();
    repo.save_device(device.clone()).unwrap();
    (card, device)
}

fn history_tx(card_id: Uuid, device_id: Uuid, amount: rust_decimal::Decimal, created_at: chrono::DateTime<Utc>) -> Transaction {
    Transaction {
        id: Uuid::new_v4(),
        card_id,
        device_id,
        device_fingerprint: "fp-main".to_string(),
        amount,
        merchant_category: MerchantCategory::Grocery,
        ip_address: "::1".to_string(),
        latitude: "0.000000".to_string(),
        longitude: "0.000000".to_string(),
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

fn pipeline(repo: Arc<InMemoryRepository>) -> Pipeline {
    Pipeline::new(repo, empty_vpn(), EngineConfig::default(), Arc::new(UnresolvedCountryResolver))
}

fn manual(card_id: Uuid, device_id: Uuid, amount: rust_decimal::Decimal, lat: &str, lon: &str, ip: &str) -> ManualPayload {
    ManualPayload {
        card_id,
        device_id,
        amount,
        merchant_category: MerchantCategory::Grocery,
        ip_address: ip.to_string(),
        latitude: lat.to_string(),
        longitude: lon.to_string(),
    }
}

/// Scenario 1 - card testing: three low-amount transactions feed the
/// CARD_TESTING rule's last-10-minutes window (spaced past the 5-minute
/// velocity window so only CARD_TESTING fires); the triggering transaction
/// scores 50 and lands in REVIEW.
#[tokio::test]
async fn card_testing_pattern_lands_in_review() {
    let repo = Arc::new(InMemoryRepository::new());
    let (card, device) = linked_card_and_device(&repo);

    let now = Utc::now();
    for (amount, offset) in [(dec!(1.00), 9), (dec!(1.50), 7), (dec!(0.50), 6)] {
        repo.save_transaction(history_tx(card.id, device.id, amount, now - Duration::minutes(offset)))
            .unwrap();
    }

    let pipe = pipeline(repo.clone());
    let payload = manual(card.id, device.id, dec!(2.00), "0.000000", "0.000000", "::1");
    let response = pipe.process(true, false, Some(payload)).await.unwrap();

    assert!(response.alerts.contains(&AlertType::CardTesting));
    assert_eq!(response.score, AlertType::CardTesting.weight());
    assert_eq!(response.decision, Decision::Review);
    assert!(!response.fraud);
}

/// Scenario 2 - impossible travel: São Paulo to New York in ten minutes is
/// physically impossible and forces BLOCKED via the aggregate score.
#[tokio::test]
async fn impossible_travel_is_blocked() {
    let repo = Arc::new(InMemoryRepository::new());
    let (card, device) = linked_card_and_device(&repo);

    let now = Utc::now();
    let mut sao_paulo = history_tx(card.id, device.id, dec!(50.00), now - Duration::minutes(10));
    sao_paulo.latitude = "-23.550520".to_string();
    sao_paulo.longitude = "-46.633308".to_string();
    repo.save_transaction(sao_paulo).unwrap();

    let pipe = pipeline(repo.clone());
    let payload = manual(card.id, device.id, dec!(60.00), "40.712776", "-74.005974", "::1");
    let response = pipe.process(true, false, Some(payload)).await.unwrap();

    assert!(response.alerts.contains(&AlertType::ImpossibleTravel));
    assert_eq!(response.decision, Decision::Blocked);
    assert!(response.fraud);
}

/// Scenario 3 - a single high-amount signal against a steady history scores
/// low enough to stay APPROVED with the fraud flag unset. History is spread
/// hours apart so it contributes to steady-state averages without tripping
/// the velocity, burst or limit rules on its own.
#[tokio::test]
async fn high_amount_lone_signal_is_approved() {
    let repo = Arc::new(InMemoryRepository::new());
    let (mut card, device) = linked_card_and_device(&repo);
    card.credit_limit = dec!(5000.00);
    card.remaining_limit = dec!(5000.00);
    repo.save_card(card.clone()).unwrap();

    let now = Utc::now();
    for i in 0..10 {
        repo.save_transaction(history_tx(card.id, device.id, dec!(100.00), now - Duration::days(i + 1)))
            .unwrap();
    }

    let pipe = pipeline(repo.clone());
    let payload = manual(card.id, device.id, dec!(180.00), "0.000000", "0.000000", "::1");
    let response = pipe.process(true, false, Some(payload)).await.unwrap();

    assert_eq!(response.alerts, vec![AlertType::HighAmount]);
    assert_eq!(response.score, 20);
    assert_eq!(response.decision, Decision::Approved);
    assert!(!response.fraud);
}

/// Scenario 4 - a brand-new device plus a VPN-range IP combine to 50 and
/// land in REVIEW.
#[tokio::test]
async fn vpn_and_new_device_combine_to_review() {
    let repo = Arc::new(InMemoryRepository::new());
    let (card, old_device) = linked_card_and_device(&repo);

    let now = Utc::now();
    for i in 0..15 {
        repo.save_transaction(history_tx(card.id, old_device.id, dec!(20.00), now - Duration::days(i + 1)))
            .unwrap();
    }

    let new_device = Device {
        id: Uuid::new_v4(),
        fingerprint: "fp-new".to_string(),
        device_type: DeviceType::Mobile,
        os: "Android".to_string(),
        browser: "Chrome".to_string(),
        first_seen: now,
        last_seen: now,
        cards: HashSet::new(),
    };
    repo.save_device(new_device.clone()).unwrap();
    let mut card = repo.find_card(card.id).unwrap();
    card.devices.insert(new_device.id);
    repo.save_card(card.clone()).unwrap();

    let vpn = VpnBlacklist::from_json(r#"{"list": ["2001:67c:2e8::/48"]}"#).unwrap();
    let pipe = Pipeline::new(repo.clone(), vpn, EngineConfig::default(), Arc::new(UnresolvedCountryResolver));
    let payload = manual(card.id, new_device.id, dec!(20.00), "0.000000", "0.000000", "2001:67c:2e8::1");
    let response = pipe.process(true, false, Some(payload)).await.unwrap();

    assert!(response.alerts.contains(&AlertType::TorOrProxyDetected));
    assert!(response.alerts.contains(&AlertType::NewDeviceDetected));
    assert_eq!(response.score, AlertType::TorOrProxyDetected.weight() + AlertType::NewDeviceDetected.weight());
    assert_eq!(response.decision, Decision::Review);
}

/// Scenario 5 - an amount exceeding the remaining limit is BLOCKED via the
/// override, and the limit is left untouched because the debit never runs.
#[tokio::test]
async fn credit_limit_reached_blocks_and_preserves_limit() {
    let repo = Arc::new(InMemoryRepository::new());
    let (mut card, device) = linked_card_and_device(&repo);
    card.remaining_limit = dec!(20.00);
    repo.save_card(card.clone()).unwrap();

    let pipe = pipeline(repo.clone());
    let payload = manual(card.id, device.id, dec!(25.00), "0.000000", "0.000000", "::1");
    let response = pipe.process(true, false, Some(payload)).await.unwrap();

    assert!(response.alerts.contains(&AlertType::CreditLimitReached));
    assert_eq!(response.decision, Decision::Blocked);

    let saved = repo.find_card(card.id).unwrap();
    assert_eq!(saved.remaining_limit, dec!(20.00));
}

/// Scenario 6 - successForce overrides a high score to APPROVED, debits the
/// card, and still persists whatever alerts were raised.
#[tokio::test]
async fn force_approve_debits_card_despite_high_score() {
    let repo = Arc::new(InMemoryRepository::new());
    let (card, device) = linked_card_and_device(&repo);

    let now = Utc::now();
    for (amount, offset) in [(dec!(1.00), 90), (dec!(1.50), 60), (dec!(0.50), 30)] {
        repo.save_transaction(history_tx(card.id, device.id, amount, now - Duration::seconds(offset)))
            .unwrap();
    }

    let pipe = pipeline(repo.clone());
    let payload = manual(card.id, device.id, dec!(2.00), "0.000000", "0.000000", "::1");
    let response = pipe.process(true, true, Some(payload)).await.unwrap();

    assert_eq!(response.decision, Decision::Approved);
    assert!(!response.fraud);
    assert!(!response.alerts.is_empty());

    let saved = repo.find_card(card.id).unwrap();
    assert_eq!(saved.remaining_limit, dec!(998.00));
}

/// Cross-cutting invariant: the aggregate score is always the sum of the
/// weights of the alerts actually reported, regardless of scenario.
#[tokio::test]
async fn score_always_equals_sum_of_alert_weights() {
    let repo = Arc::new(InMemoryRepository::new());
    let (card, device) = linked_card_and_device(&repo);

    let pipe = pipeline(repo.clone());
    let payload = manual(card.id, device.id, dec!(10.00), "0.000000", "0.000000", "::1");
    let response = pipe.process(true, false, Some(payload)).await.unwrap();

    let expected: i64 = response.alerts.iter().map(|a| a.weight()).sum();
    assert_eq!(response.score, expected);
}

/// Normal-mode generation with no eligible cards fails fast with a
/// descriptive error rather than panicking.
#[tokio::test]
async fn normal_mode_without_any_cards_errors() {
    let repo = Arc::new(InMemoryRepository::new());
    let pipe = pipeline(repo);
    let result = pipe.process(false, false, None).await;
    assert!(result.is_err());
}
