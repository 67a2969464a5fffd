// =====================================================================================
// File: src/pipeline.rs
// Description: Top-level orchestrator - the single logical operation the
//              engine exposes (§4.J, §6)
// Author: arkSong (arksong2018@gmail.com)
// =====================================================================================

use crate::config::EngineConfig;
use crate::country::CountryResolver;
use crate::decision::{decide, DecisionOutcome};
use crate::error::{FraudGuardError, FraudGuardResult};
use crate::generator::{self, GenerationRequest, ManualPayload};
use crate::geo::ipv6::VpnBlacklist;
use crate::masking::mask_pan;
use crate::model::{AlertSeverity, AlertType, Card, Decision, Device};
use crate::pattern_builder::PatternCache;
use crate::repository::Repository;
use crate::rules::RuleContext;
use crate::validation::ValidationContext;
use crate::validator::validate;
use std::sync::Arc;
use tracing::info;

/// Card snapshot exposed to callers - PAN is masked, never raw (§6 masking
/// rule, PCI-DSS §3.3).
#[derive(Debug, Clone)]
pub struct MaskedCardView {
    pub id: uuid::Uuid,
    pub brand: String,
    pub masked_pan: String,
    pub remaining_limit: rust_decimal::Decimal,
}

impl From<&Card> for MaskedCardView {
    fn from(card: &Card) -> Self {
        Self {
            id: card.id,
            brand: card.brand.clone(),
            masked_pan: mask_pan(Some(&card.pan)),
            remaining_limit: card.remaining_limit,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DeviceView {
    pub id: uuid::Uuid,
    pub fingerprint: String,
}

impl From<&Device> for DeviceView {
    fn from(device: &Device) -> Self {
        Self {
            id: device.id,
            fingerprint: device.fingerprint.clone(),
        }
    }
}

/// The single response the pipeline returns: the persisted transaction's
/// view, the masked card and device snapshots, the IP, and the validation
/// summary (§6).
#[derive(Debug, Clone)]
pub struct Response {
    pub transaction_id: uuid::Uuid,
    pub decision: Decision,
    pub fraud: bool,
    pub card: MaskedCardView,
    pub device: DeviceView,
    pub ip_address: String,
    pub score: i64,
    pub alerts: Vec<AlertType>,
    pub severity: AlertSeverity,
}

/// Wires together the generator, country resolver, rule validator and
/// decision service into one atomic unit of work per call (§4.J). A single
/// instance is process-wide; the repository and pattern cache it holds are
/// shared across concurrent calls.
pub struct Pipeline {
    repo: Arc<dyn Repository>,
    vpn: VpnBlacklist,
    config: EngineConfig,
    country_resolver: Arc<dyn CountryResolver>,
    pattern_cache: PatternCache,
}

impl Pipeline {
    pub fn new(
        repo: Arc<dyn Repository>,
        vpn: VpnBlacklist,
        config: EngineConfig,
        country_resolver: Arc<dyn CountryResolver>,
    ) -> Self {
        Self {
            repo,
            vpn,
            config,
            country_resolver,
            pattern_cache: PatternCache::new(),
        }
    }

    /// Run one evaluation end to end. Either everything commits
    /// (transaction, pattern update, alert) or nothing does (§4.J).
    pub async fn process(
        &self,
        is_manual: bool,
        success_force: bool,
        manual_payload: Option<ManualPayload>,
    ) -> FraudGuardResult<Response> {
        let request = if is_manual {
            GenerationRequest::Manual(manual_payload.ok_or_else(|| {
                FraudGuardError::ManualPayloadMissing("manual_payload".to_string())
            })?)
        } else {
            GenerationRequest::Normal
        };

        let mut rng = rand::thread_rng();
        let generated = generator::generate(self.repo.as_ref(), &self.vpn, &mut rng, success_force, request)?;
        let (card, device, mut tx) = (generated.card, generated.device, generated.transaction);

        let resolved = self
            .country_resolver
            .resolve_country(&tx.latitude, &tx.longitude)
            .await;
        tx.country = resolved.map(|code| code.to_uppercase());

        let validation_ctx = ValidationContext::new(self.repo.as_ref());
        let snapshot = validation_ctx.load(card.id, &tx);

        let rule_ctx = RuleContext {
            card: &card,
            device: Some(&device),
            vpn: &self.vpn,
            geo: &self.config.geo,
            today: tx.transaction_at.date_naive(),
        };
        let validation = validate(&tx, &snapshot, &rule_ctx);

        info!(
            transaction_id = %tx.id,
            card_id = %card.id,
            score = validation.score,
            "pipeline evaluation complete"
        );

        let DecisionOutcome { decision, fraud, alert } = decide(
            self.repo.as_ref(),
            &self.pattern_cache,
            &self.config.decision,
            card.clone(),
            tx.clone(),
            validation.clone(),
            success_force,
        )?;

        let severity = alert
            .as_ref()
            .map(|a| a.severity)
            .unwrap_or(AlertSeverity::Low);

        Ok(Response {
            transaction_id: tx.id,
            decision,
            fraud,
            card: MaskedCardView::from(&card),
            device: DeviceView::from(&device),
            ip_address: tx.ip_address.clone(),
            score: validation.score,
            alerts: validation.alerts,
            severity,
        })
    }
}
