//! Error types for sg-advisor

use sg_core::{CatalogError, Engine, Plan, RuleKind};
use thiserror::Error;

/// Advisor error type
///
/// Rule findings are never errors; these cover misconfiguration and
/// failures of the collaborators a rule depends on.
#[derive(Error, Debug)]
pub enum AdvisorError {
    /// A001: Two rules registered under the same key
    #[error("[A001] Rule '{kind}' is already registered for engine '{engine}'")]
    DuplicateRule { engine: Engine, kind: RuleKind },

    /// A002: Rule payload does not match the rule kind
    #[error("[A002] Invalid payload for rule '{kind}': {message}")]
    InvalidPayload { kind: RuleKind, message: String },

    /// A003: Naming format is not a valid regular expression
    #[error("[A003] Invalid naming format {format:?} for rule '{kind}': {message}")]
    InvalidNamingFormat {
        kind: RuleKind,
        format: String,
        message: String,
    },

    /// A004: Capability not licensed by the current plan
    #[error("[A004] The {feature} feature requires the {required} plan (current plan: {current})")]
    AccessDenied {
        feature: &'static str,
        required: Plan,
        current: Plan,
    },

    /// A005: Catalog lookup failed for a reason other than a missing entry
    #[error("[A005] Catalog error: {0}")]
    Catalog(#[from] CatalogError),
}

/// Result type alias for AdvisorError
pub type AdvisorResult<T> = Result<T, AdvisorError>;
