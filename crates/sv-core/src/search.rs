//! Global search result normalization.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cve::CveRecord;
use crate::error::{CoreError, CoreResult};
use crate::mitre::TechniqueRecord;
use crate::rules::RuleSummary;

/// Results of `GET /search`, spanning rules, techniques, and CVEs.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchResults {
    pub rules: Vec<RuleSummary>,
    pub techniques: Vec<TechniqueRecord>,
    pub cves: Vec<CveRecord>,
    pub total_results: u64,
    /// The query echoed back for display.
    pub search_query: String,
}

impl SearchResults {
    /// Transforms a search response; every section is optional.
    pub fn from_value(value: &Value, query: &str) -> CoreResult<Self> {
        #[derive(Debug, Default, Deserialize)]
        #[serde(default)]
        struct RawSearch {
            rules: Option<Vec<Value>>,
            techniques: Option<Vec<TechniqueRecord>>,
            cves: Option<Vec<Value>>,
            total_results: Option<u64>,
        }

        let raw: RawSearch = serde_json::from_value(value.clone())
            .map_err(|e| CoreError::malformed(format!("search results: {e}")))?;

        let rules = raw
            .rules
            .unwrap_or_default()
            .iter()
            .map(RuleSummary::from_value)
            .collect::<CoreResult<Vec<_>>>()?;
        let cves = raw
            .cves
            .unwrap_or_default()
            .iter()
            .map(CveRecord::from_value)
            .collect::<CoreResult<Vec<_>>>()?;

        Ok(Self {
            rules,
            techniques: raw.techniques.unwrap_or_default(),
            cves,
            total_results: raw.total_results.unwrap_or(0),
            search_query: query.to_string(),
        })
    }
}
