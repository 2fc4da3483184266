//! sg-advisor - SQL review for schemagate
//!
//! Rules are registered per engine in an immutable [`Registry`]. A script
//! is parsed once and checked by one rule ([`Registry::check`]) or by every
//! enabled rule of a review policy ([`PolicyChecker::check`]). Findings are
//! returned as [`sg_core::Advice`].

pub mod advisor;
pub mod checker;
pub mod context;
pub mod error;
pub mod registry;
pub mod rules;

#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;

pub use advisor::{Advisor, ParsedScript};
pub use checker::{summarize, worst_status, PolicyChecker, EMPTY_POLICY_TITLE};
pub use context::AdvisorContext;
pub use error::{AdvisorError, AdvisorResult};
pub use registry::{Registry, RegistryBuilder};
