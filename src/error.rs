// =====================================================================================
// File: src/error.rs
// Description: Error taxonomy for the fraud evaluation engine
// Author: arkSong (arksong2018@gmail.com)
// =====================================================================================

use thiserror::Error;

/// Result type for fraud-engine operations.
pub type FraudGuardResult<T> = Result<T, FraudGuardError>;

/// Errors surfaced by the engine.
///
/// Only input errors and fatal errors are represented here (see §7). Degraded
/// conditions - reverse-geocoding failure, pattern-cache miss, rule panics -
/// are recovered locally and never constructed as variants of this type.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FraudGuardError {
    #[error("card not found: {0}")]
    CardNotFound(String),

    #[error("device not found: {0}")]
    DeviceNotFound(String),

    #[error("device {device} is not linked to card {card}")]
    DeviceNotLinked { card: String, device: String },

    #[error("card {0} is blocked or lost")]
    CardBlockedOrLost(String),

    #[error("card quantity exceeds the maximum of {max}")]
    CardQuantityMax { max: usize },

    #[error("device quantity exceeds the maximum of {max} for card {card}")]
    DeviceMaxSupported { card: String, max: usize },

    #[error("transaction not found: {0}")]
    TransactionNotFound(String),

    #[error("malformed coordinate: {0}")]
    MalformedCoordinate(String),

    #[error("manual payload missing required field: {0}")]
    ManualPayloadMissing(String),

    #[error("no cards available to generate a transaction")]
    NoCardsAvailable,

    #[error("persistence error: {0}")]
    Persistence(String),

    #[error("startup resource unavailable: {0}")]
    StartupResource(String),
}
