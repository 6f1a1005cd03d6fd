//! CVE view models and normalization.
//!
//! CVE records carry their CVSS score under `cvss_v3_score` or
//! `cvss_score` depending on the API version; exactly one is present, so
//! the transformer resolves the pair rather than assuming either.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::dates::parse_datetime;
use crate::error::{CoreError, CoreResult};
use crate::severity::Severity;

/// Raw backend CVE record.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawCve {
    pub cve_id: Option<String>,
    pub description: Option<String>,
    pub severity: Option<String>,
    pub cvss_v3_score: Option<f64>,
    pub cvss_score: Option<f64>,
    pub cvss_v3_vector: Option<String>,
    pub published_date: Option<String>,
    pub modified_date: Option<String>,
    pub cwe_ids: Option<Vec<String>>,
    pub rule_count: Option<u32>,
}

/// Normalized vulnerability record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CveRecord {
    pub cve_id: String,
    pub description: Option<String>,
    pub severity: Severity,
    /// Resolved score: `cvss_v3_score` when present, else `cvss_score`.
    pub cvss_score: Option<f64>,
    pub cvss_vector: Option<String>,
    pub published_date: Option<DateTime<Utc>>,
    pub modified_date: Option<DateTime<Utc>>,
    pub cwe_ids: Vec<String>,
    /// Number of detection rules referencing this CVE.
    pub rule_count: u32,
}

impl CveRecord {
    /// Transforms a raw backend value; non-objects and records without a
    /// well-formed `cve_id` are rejected as malformed.
    pub fn from_value(value: &Value) -> CoreResult<Self> {
        if !value.is_object() {
            return Err(CoreError::malformed("cve record is not an object"));
        }
        let raw: RawCve = serde_json::from_value(value.clone())
            .map_err(|e| CoreError::malformed(format!("cve record: {e}")))?;
        Self::from_raw(raw)
    }

    /// Applies defaults and the score fallback to a deserialized record.
    pub fn from_raw(raw: RawCve) -> CoreResult<Self> {
        let cve_id = raw
            .cve_id
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| CoreError::malformed("cve record missing `cve_id`"))?;
        if !is_valid_cve_id(&cve_id) {
            return Err(CoreError::malformed(format!(
                "cve record has malformed id `{cve_id}`"
            )));
        }

        Ok(Self {
            cve_id,
            description: raw.description,
            severity: Severity::parse(raw.severity.as_deref()),
            cvss_score: raw.cvss_v3_score.or(raw.cvss_score),
            cvss_vector: raw.cvss_v3_vector,
            published_date: parse_datetime(raw.published_date.as_deref()),
            modified_date: parse_datetime(raw.modified_date.as_deref()),
            cwe_ids: raw.cwe_ids.unwrap_or_default(),
            rule_count: raw.rule_count.unwrap_or(0),
        })
    }
}

/// Checks the `CVE-YYYY-NNNN+` identifier shape.
pub fn is_valid_cve_id(id: &str) -> bool {
    let Some(rest) = id.strip_prefix("CVE-") else {
        return false;
    };
    let Some((year, seq)) = rest.split_once('-') else {
        return false;
    };
    year.len() == 4
        && year.chars().all(|c| c.is_ascii_digit())
        && seq.len() >= 4
        && seq.chars().all(|c| c.is_ascii_digit())
}

/// Normalized page of CVEs; the backend names the item array `items` or
/// `cves` depending on the endpoint.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CvePage {
    pub cves: Vec<CveRecord>,
    pub total: u64,
}

impl CvePage {
    pub fn from_value(value: &Value) -> CoreResult<Self> {
        #[derive(Debug, Default, Deserialize)]
        #[serde(default)]
        struct RawCvePage {
            items: Option<Vec<Value>>,
            cves: Option<Vec<Value>>,
            total: Option<u64>,
        }

        let raw: RawCvePage = serde_json::from_value(value.clone())
            .map_err(|e| CoreError::malformed(format!("cve page: {e}")))?;
        let items = raw.items.or(raw.cves).unwrap_or_default();
        let cves = items
            .iter()
            .map(CveRecord::from_value)
            .collect::<CoreResult<Vec<_>>>()?;

        Ok(Self {
            total: raw.total.unwrap_or(cves.len() as u64),
            cves,
        })
    }
}

/// CVE aggregate statistics (`GET /cves/stats`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CveStats {
    pub total_cves: u64,
    pub cves_with_rules: u64,
    pub by_severity: HashMap<String, u64>,
    pub average_cvss: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cvss_score_fallback_pair() {
        let v3 = json!({"cve_id": "CVE-2021-44228", "cvss_v3_score": 10.0});
        assert_eq!(
            CveRecord::from_value(&v3).unwrap().cvss_score,
            Some(10.0)
        );

        let legacy = json!({"cve_id": "CVE-2017-0144", "cvss_score": 8.1});
        assert_eq!(
            CveRecord::from_value(&legacy).unwrap().cvss_score,
            Some(8.1)
        );

        let neither = json!({"cve_id": "CVE-2020-0601"});
        assert_eq!(CveRecord::from_value(&neither).unwrap().cvss_score, None);
    }

    #[test]
    fn test_defaults() {
        let record = CveRecord::from_value(&json!({"cve_id": "CVE-2020-0601"})).unwrap();
        assert_eq!(record.rule_count, 0);
        assert!(record.cwe_ids.is_empty());
        assert_eq!(record.severity, Severity::Unknown);
        assert!(record.published_date.is_none());
    }

    #[test]
    fn test_identity_validation() {
        assert!(CveRecord::from_value(&json!({})).is_err());
        assert!(CveRecord::from_value(&json!({"cve_id": "not-a-cve"})).is_err());
        assert!(CveRecord::from_value(&json!({"cve_id": "CVE-21-1234"})).is_err());
        assert!(CveRecord::from_value(&json!({"cve_id": "CVE-2021-123"})).is_err());
        assert!(CveRecord::from_value(&json!("CVE-2021-44228")).is_err());
    }

    #[test]
    fn test_valid_cve_id_shapes() {
        assert!(is_valid_cve_id("CVE-2021-44228"));
        assert!(is_valid_cve_id("CVE-1999-0001"));
        // Modern sequence numbers can exceed four digits.
        assert!(is_valid_cve_id("CVE-2024-1234567"));
        assert!(!is_valid_cve_id("cve-2021-44228"));
    }

    #[test]
    fn test_cve_page_envelope_variants() {
        let items = json!({"items": [{"cve_id": "CVE-2021-44228"}], "total": 90});
        let page = CvePage::from_value(&items).unwrap();
        assert_eq!(page.cves.len(), 1);
        assert_eq!(page.total, 90);

        let cves = json!({"cves": [{"cve_id": "CVE-2021-44228"}]});
        let page = CvePage::from_value(&cves).unwrap();
        assert_eq!(page.total, 1);
    }
}
