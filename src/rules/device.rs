// =====================================================================================
// File: src/rules/device.rs
// Description: Device and network rules (§4.E)
// Author: arkSong (arksong2018@gmail.com)
// =====================================================================================

use super::{PartialResult, Rule, RuleContext};
use crate::model::{AlertType, Transaction};
use crate::validation::ValidationSnapshot;
use std::net::Ipv6Addr;

/// NEW_DEVICE_DETECTED - require `last20` to contain at least one
/// transaction other than the current; trigger if none reference the same
/// device id.
pub struct NewDeviceDetected;

impl Rule for NewDeviceDetected {
    fn evaluate(&self, tx: &Transaction, snapshot: &ValidationSnapshot, _ctx: &RuleContext) -> PartialResult {
        if is_new_device(tx, snapshot) {
            PartialResult::single(AlertType::NewDeviceDetected)
        } else {
            PartialResult::empty()
        }
    }
}

fn other_history<'a>(tx: &Transaction, snapshot: &'a ValidationSnapshot) -> Vec<&'a Transaction> {
    snapshot.last20.iter().filter(|t| t.id != tx.id).collect()
}

fn is_new_device(tx: &Transaction, snapshot: &ValidationSnapshot) -> bool {
    let others = other_history(tx, snapshot);
    if others.is_empty() {
        return false;
    }
    !others.iter().any(|t| t.device_id == tx.device_id)
}

/// DEVICE_FINGERPRINT_CHANGE - require the device is NOT new under the rule
/// above; find the most recent prior transaction from the same device;
/// trigger if its fingerprint differs from the current one.
pub struct DeviceFingerprintChange;

impl Rule for DeviceFingerprintChange {
    fn evaluate(&self, tx: &Transaction, snapshot: &ValidationSnapshot, _ctx: &RuleContext) -> PartialResult {
        if is_new_device(tx, snapshot) {
            return PartialResult::empty();
        }
        let prior = other_history(tx, snapshot)
            .into_iter()
            .filter(|t| t.device_id == tx.device_id)
            .max_by_key(|t| t.created_at);

        match prior {
            Some(prior) if prior.device_fingerprint != tx.device_fingerprint => {
                PartialResult::single(AlertType::DeviceFingerprintChange)
            }
            _ => PartialResult::empty(),
        }
    }
}

/// TOR_OR_PROXY_DETECTED - trigger if the transaction IP is contained in any
/// CIDR of the VPN blacklist loaded at startup.
pub struct TorOrProxyDetected;

impl Rule for TorOrProxyDetected {
    fn evaluate(&self, tx: &Transaction, _snapshot: &ValidationSnapshot, ctx: &RuleContext) -> PartialResult {
        match tx.ip_address.parse::<Ipv6Addr>() {
            Ok(addr) if ctx.vpn.contains(addr) => PartialResult::single(AlertType::TorOrProxyDetected),
            _ => PartialResult::empty(),
        }
    }
}

/// MULTIPLE_CARDS_SAME_DEVICE - trigger if the originating device's card set
/// size is >= 4 (§9 open question: the spec adopts 4 over the source's 3).
pub struct MultipleCardsSameDevice;

impl Rule for MultipleCardsSameDevice {
    fn evaluate(&self, _tx: &Transaction, _snapshot: &ValidationSnapshot, ctx: &RuleContext) -> PartialResult {
        match ctx.device {
            Some(device) if device.cards.len() >= 4 => PartialResult::single(AlertType::MultipleCardsSameDevice),
            _ => PartialResult::empty(),
        }
    }
}
