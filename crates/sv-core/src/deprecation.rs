//! Deprecated-technique tracking models.
//!
//! ATT&CK periodically deprecates or revokes techniques; rules mapped to
//! them need review. These models back the `/deprecated/*` endpoints.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{CoreError, CoreResult};
use crate::rules::RuleSummary;

/// Statistics over deprecated-technique mappings
/// (`GET /deprecated/statistics`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeprecationStatistics {
    pub total_deprecated_techniques: u64,
    pub total_affected_rules: u64,
    pub rules_by_technique: HashMap<String, u64>,
    pub last_updated: Option<String>,
}

/// Rules affected by deprecated techniques
/// (`GET /deprecated/affected-rules`).
#[derive(Debug, Clone, Default, Serialize)]
pub struct AffectedRules {
    pub rules: Vec<RuleSummary>,
    pub total: u64,
    pub by_technique: HashMap<String, u64>,
}

impl AffectedRules {
    /// Transforms an affected-rules response; the rule array arrives under
    /// `rules` or `items`, and `total` falls back to the array length.
    pub fn from_value(value: &Value) -> CoreResult<Self> {
        #[derive(Debug, Default, Deserialize)]
        #[serde(default)]
        struct RawAffected {
            rules: Option<Vec<Value>>,
            items: Option<Vec<Value>>,
            total: Option<u64>,
            by_technique: Option<HashMap<String, u64>>,
        }

        let raw: RawAffected = serde_json::from_value(value.clone())
            .map_err(|e| CoreError::malformed(format!("affected rules: {e}")))?;
        let rules = raw
            .rules
            .or(raw.items)
            .unwrap_or_default()
            .iter()
            .map(RuleSummary::from_value)
            .collect::<CoreResult<Vec<_>>>()?;

        Ok(Self {
            total: raw.total.unwrap_or(rules.len() as u64),
            rules,
            by_technique: raw.by_technique.unwrap_or_default(),
        })
    }
}

/// Per-rule deprecation check result (`GET /deprecated/check-rule`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleDeprecationCheck {
    pub rule_id: String,
    pub has_deprecated_techniques: bool,
    pub deprecated_techniques: Vec<String>,
    /// Replacement IDs keyed by deprecated ID, where ATT&CK names one.
    pub suggested_replacements: HashMap<String, String>,
}

/// Request body for `POST /deprecated/update-mappings`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdateMappingsOptions {
    /// Restrict the update to specific rules; empty means all affected.
    pub rule_ids: Vec<String>,
    /// Preview without persisting.
    pub dry_run: bool,
}

/// Response of `POST /deprecated/update-mappings`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdateMappingsResponse {
    pub updated_rules: u64,
    pub updated_mappings: u64,
    pub dry_run: bool,
    pub errors: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_affected_rules_envelope_and_total_fallback() {
        let value = json!({
            "items": [{"id": 1, "rule_id": "R-1"}, {"id": 2, "rule_id": "R-2"}],
            "by_technique": {"T1003": 2}
        });
        let affected = AffectedRules::from_value(&value).unwrap();
        assert_eq!(affected.rules.len(), 2);
        assert_eq!(affected.total, 2);
        assert_eq!(affected.by_technique.get("T1003"), Some(&2));
    }

    #[test]
    fn test_check_deserializes() {
        let value = json!({
            "rule_id": "R-1",
            "has_deprecated_techniques": true,
            "deprecated_techniques": ["T1064"],
            "suggested_replacements": {"T1064": "T1059"}
        });
        let check: RuleDeprecationCheck = serde_json::from_value(value).unwrap();
        assert!(check.has_deprecated_techniques);
        assert_eq!(
            check.suggested_replacements.get("T1064").map(String::as_str),
            Some("T1059")
        );
    }
}
