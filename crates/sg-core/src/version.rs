//! Sortable encoding of migration versions for storage.
//!
//! Semantic versions are stored as `MMMM.mmmm.pppp-<suffix>` with each
//! component zero-padded to four digits, so lexical order of the stored
//! string equals numeric order of the version. Legacy, non-semantic versions
//! are stored behind [`NON_SEMANTIC_PREFIX`], which sorts before every
//! semantic encoding.

use crate::error::{CoreError, CoreResult};

/// Marker prepended to legacy versions.
pub const NON_SEMANTIC_PREFIX: &str = "0000.0000.0000-";

const MAX_COMPONENT: u64 = 9999;

/// A decoded stored version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredVersion {
    pub use_semantic_version: bool,
    pub version: String,
    pub suffix: String,
}

/// Encode a user-facing version for storage.
pub fn to_stored_version(use_semantic: bool, version: &str, suffix: &str) -> CoreResult<String> {
    if !use_semantic {
        if version.is_empty() {
            return Err(CoreError::InvalidVersion {
                version: version.to_string(),
                reason: "version must not be empty".to_string(),
            });
        }
        return Ok(format!("{NON_SEMANTIC_PREFIX}{version}"));
    }

    let parsed = semver::Version::parse(version).map_err(|e| CoreError::InvalidVersion {
        version: version.to_string(),
        reason: e.to_string(),
    })?;
    if !parsed.pre.is_empty() || !parsed.build.is_empty() {
        return Err(CoreError::InvalidVersion {
            version: version.to_string(),
            reason: "pre-release and build metadata are not supported".to_string(),
        });
    }
    for component in [parsed.major, parsed.minor, parsed.patch] {
        if component > MAX_COMPONENT {
            return Err(CoreError::InvalidVersion {
                version: version.to_string(),
                reason: format!("component {component} exceeds {MAX_COMPONENT}"),
            });
        }
    }
    if parsed.major == 0 && parsed.minor == 0 && parsed.patch == 0 {
        return Err(CoreError::InvalidVersion {
            version: version.to_string(),
            reason: "0.0.0 is reserved".to_string(),
        });
    }
    Ok(format!(
        "{:04}.{:04}.{:04}-{}",
        parsed.major, parsed.minor, parsed.patch, suffix
    ))
}

/// Decode a stored version.
///
/// Anything that is neither prefixed-legacy nor the padded semantic form is
/// rejected with [`CoreError::InvalidStoredVersion`]; rows written before
/// the prefix existed hit this path and need compaction.
pub fn from_stored_version(stored: &str) -> CoreResult<StoredVersion> {
    if let Some(legacy) = stored.strip_prefix(NON_SEMANTIC_PREFIX) {
        return Ok(StoredVersion {
            use_semantic_version: false,
            version: legacy.to_string(),
            suffix: String::new(),
        });
    }

    let invalid = |reason: &str| CoreError::InvalidStoredVersion {
        version: stored.to_string(),
        reason: reason.to_string(),
    };

    let (prefix, suffix) = stored
        .split_once('-')
        .ok_or_else(|| invalid("version should contain '-'"))?;
    let components: Vec<&str> = prefix.split('.').collect();
    if components.len() != 3 {
        return Err(invalid("expected three dot-separated components"));
    }
    let mut numbers = [0u64; 3];
    for (slot, component) in numbers.iter_mut().zip(&components) {
        if component.len() != 4 || !component.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid("components must be four digits"));
        }
        *slot = component
            .parse()
            .map_err(|_| invalid("components must be four digits"))?;
    }

    Ok(StoredVersion {
        use_semantic_version: true,
        version: format!("{}.{}.{}", numbers[0], numbers[1], numbers[2]),
        suffix: suffix.to_string(),
    })
}

/// Whether `version` is a plain `MAJOR.MINOR.PATCH` semantic version.
pub fn is_semantic(version: &str) -> bool {
    semver::Version::parse(version)
        .map(|v| v.pre.is_empty() && v.build.is_empty())
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "version_test.rs"]
mod tests;
