// =====================================================================================
// File: src/model/alert.rs
// Description: AlertType enumeration and FraudAlert entity (§3)
// Author: arkSong (arksong2018@gmail.com)
// =====================================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Closed enumeration of fraud signals, each carrying a static integer
/// score weight (§3 AlertType table).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlertType {
    AnomalyModelTriggered,
    CardTesting,
    MicroTransactionPattern,
    DeclineThenApprovePattern,
    VelocityAbuse,
    BurstActivity,
    HighAmount,
    LimitExceeded,
    ImpossibleTravel,
    HighRiskCountry,
    LocationAnomaly,
    NewDeviceDetected,
    DeviceFingerprintChange,
    TorOrProxyDetected,
    MultipleCardsSameDevice,
    MultipleFailedAttempts,
    SuspiciousSuccessAfterFailure,
    TimeOfDayAnomaly,
    CreditLimitReached,
    ExpirationDateApproaching,
}

impl AlertType {
    /// Canonical weight, as tabulated in §3. `CREDIT_LIMIT_REACHED` and
    /// `EXPIRATION_DATE_APPROACHING` are not score-additive in the same
    /// sense (the former is decisive, the latter low-weight informational);
    /// both still carry a weight so the aggregate score (§4.F) stays a
    /// simple sum over all triggered alerts.
    pub fn weight(self) -> i64 {
        match self {
            AlertType::AnomalyModelTriggered => 30,
            AlertType::CardTesting => 50,
            AlertType::MicroTransactionPattern => 35,
            AlertType::DeclineThenApprovePattern => 30,
            AlertType::VelocityAbuse => 35,
            AlertType::BurstActivity => 25,
            AlertType::HighAmount => 20,
            AlertType::LimitExceeded => 40,
            AlertType::ImpossibleTravel => 65,
            AlertType::HighRiskCountry => 30,
            AlertType::LocationAnomaly => 30,
            AlertType::NewDeviceDetected => 15,
            AlertType::DeviceFingerprintChange => 25,
            AlertType::TorOrProxyDetected => 35,
            AlertType::MultipleCardsSameDevice => 50,
            AlertType::MultipleFailedAttempts => 25,
            AlertType::SuspiciousSuccessAfterFailure => 35,
            AlertType::TimeOfDayAnomaly => 10,
            AlertType::CreditLimitReached => 60,
            AlertType::ExpirationDateApproaching => 5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertSeverity {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertStatus {
    Pending,
    Reviewed,
    Confirmed,
    Dismissed,
}

/// A persisted fraud alert, owned by the transaction that produced it (§3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FraudAlert {
    pub id: Uuid,
    pub transaction_id: Uuid,
    pub card_id: Uuid,
    pub alerts: Vec<AlertType>,
    pub fraud_score: i64,
    pub severity: AlertSeverity,
    pub probability: i64,
    pub description: String,
    pub status: AlertStatus,
    pub created_at: DateTime<Utc>,
}
