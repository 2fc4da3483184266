//! Subscription plans and the features they license.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    Free,
    #[default]
    Team,
    Enterprise,
}

/// A capability that is only available on some plans.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feature {
    SchemaReviewPolicy,
    BackwardCompatibility,
}

impl Feature {
    pub fn minimum_plan(self) -> Plan {
        match self {
            Feature::SchemaReviewPolicy => Plan::Team,
            Feature::BackwardCompatibility => Plan::Enterprise,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Feature::SchemaReviewPolicy => "schema review policy",
            Feature::BackwardCompatibility => "backward compatibility check",
        }
    }
}

impl Plan {
    pub fn allows(self, feature: Feature) -> bool {
        self >= feature.minimum_plan()
    }
}

impl std::fmt::Display for Plan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Plan::Free => write!(f, "free"),
            Plan::Team => write!(f, "team"),
            Plan::Enterprise => write!(f, "enterprise"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_gate() {
        assert!(!Plan::Free.allows(Feature::SchemaReviewPolicy));
        assert!(Plan::Team.allows(Feature::SchemaReviewPolicy));
        assert!(!Plan::Team.allows(Feature::BackwardCompatibility));
        assert!(Plan::Enterprise.allows(Feature::BackwardCompatibility));
    }
}
