//! Filter-parameter normalization.
//!
//! The frontend filter object tolerates aliased field names kept for
//! compatibility with earlier API versions. The backend expects exactly one
//! canonical query-parameter set, so every semantic filter is resolved
//! through an ordered fallback chain: canonical key first, alias only when
//! the canonical key is absent, never merged.
//!
//! Fallback-chain table:
//!
//! | canonical        | aliases                |
//! |------------------|------------------------|
//! | `query`          | `search`               |
//! | `severities`     | `severity`             |
//! | `rule_sources`   | `rule_source`          |
//! | `has_mitre`      | `has_mitre_mapping`    |
//! | `has_cves`       | `has_cve_references`   |
//! | `start_date`     | `date_range.start`¹    |
//! | `end_date`       | `date_range.end`¹      |
//!
//! ¹ the structured `date_range` wins over the flat fields, matching the
//! shape the filter bar produces today.
//!
//! Array-valued filters serialize as comma-joined strings and empty arrays
//! are omitted entirely; the backend treats a present-but-empty parameter
//! as "filter for empty string", which is never intended.

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreResult;
use crate::pagination::PageRequest;

/// Sort direction for list queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    /// Wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

impl std::fmt::Display for SortDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Frontend sort field names that differ from the backend's.
const SORT_FIELD_ALIASES: &[(&str, &str)] = &[
    ("modified_date", "updated_date"),
    ("title", "name"),
    ("source_rule_id", "rule_id"),
];

/// Remaps a frontend sort field to the backend's name; unmapped fields pass
/// through unchanged.
pub fn canonical_sort_field(field: &str) -> &str {
    SORT_FIELD_ALIASES
        .iter()
        .find(|(frontend, _)| *frontend == field)
        .map(|(_, backend)| *backend)
        .unwrap_or(field)
}

/// A sort selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    /// Frontend field name; remapped on normalization.
    pub field: String,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }
}

/// Inclusive date range filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

/// The rule-list filter selection.
///
/// Purely client-side and transient; aliased fields exist so that values
/// restored from older bookmarks or URLs keep working.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleFilters {
    pub query: Option<String>,
    /// Legacy alias of `query`.
    pub search: Option<String>,
    pub severities: Vec<String>,
    /// Legacy alias of `severities`.
    pub severity: Vec<String>,
    pub rule_sources: Vec<String>,
    /// Legacy alias of `rule_sources`.
    pub rule_source: Vec<String>,
    pub platforms: Vec<String>,
    pub tactics: Vec<String>,
    pub rule_platforms: Vec<String>,
    pub rule_types: Vec<String>,
    pub mitre_techniques: Vec<String>,
    pub cve_ids: Vec<String>,
    pub tags: Vec<String>,
    pub has_mitre: Option<bool>,
    /// Legacy alias of `has_mitre`.
    pub has_mitre_mapping: Option<bool>,
    pub has_cves: Option<bool>,
    /// Legacy alias of `has_cves`.
    pub has_cve_references: Option<bool>,
    pub is_active: Option<bool>,
    pub date_range: Option<DateRange>,
    /// Flat alias of `date_range.start`.
    pub start_date: Option<DateTime<Utc>>,
    /// Flat alias of `date_range.end`.
    pub end_date: Option<DateTime<Utc>>,
    pub enrichment_score_min: Option<f64>,
}

impl RuleFilters {
    /// Resolved free-text query: canonical `query`, else `search`.
    pub fn effective_query(&self) -> Option<&str> {
        non_empty(self.query.as_deref()).or_else(|| non_empty(self.search.as_deref()))
    }

    /// Resolved severities: canonical `severities`, else `severity`.
    pub fn effective_severities(&self) -> &[String] {
        if self.severities.is_empty() {
            &self.severity
        } else {
            &self.severities
        }
    }

    /// Resolved sources: canonical `rule_sources`, else `rule_source`.
    pub fn effective_rule_sources(&self) -> &[String] {
        if self.rule_sources.is_empty() {
            &self.rule_source
        } else {
            &self.rule_sources
        }
    }

    /// Resolved MITRE-enrichment flag.
    pub fn effective_has_mitre(&self) -> Option<bool> {
        self.has_mitre.or(self.has_mitre_mapping)
    }

    /// Resolved CVE-enrichment flag.
    pub fn effective_has_cves(&self) -> Option<bool> {
        self.has_cves.or(self.has_cve_references)
    }

    /// Resolved range start: `date_range.start`, else flat `start_date`.
    pub fn effective_start_date(&self) -> Option<DateTime<Utc>> {
        match &self.date_range {
            Some(range) => range.start,
            None => self.start_date,
        }
    }

    /// Resolved range end: `date_range.end`, else flat `end_date`.
    pub fn effective_end_date(&self) -> Option<DateTime<Utc>> {
        match &self.date_range {
            Some(range) => range.end,
            None => self.end_date,
        }
    }

    /// Produces the canonical backend parameter set for this selection.
    pub fn to_params(&self) -> BTreeMap<String, String> {
        let mut params = BTreeMap::new();

        insert_str(&mut params, "query", self.effective_query());
        insert_list(&mut params, "severities", self.effective_severities());
        insert_list(&mut params, "rule_sources", self.effective_rule_sources());
        insert_list(&mut params, "platforms", &self.platforms);
        insert_list(&mut params, "tactics", &self.tactics);
        insert_list(&mut params, "rule_platforms", &self.rule_platforms);
        insert_list(&mut params, "rule_types", &self.rule_types);
        insert_list(&mut params, "mitre_techniques", &self.mitre_techniques);
        insert_list(&mut params, "cve_ids", &self.cve_ids);
        insert_list(&mut params, "tags", &self.tags);
        insert_bool(&mut params, "has_mitre", self.effective_has_mitre());
        insert_bool(&mut params, "has_cves", self.effective_has_cves());
        insert_bool(&mut params, "is_active", self.is_active);
        insert_date(&mut params, "start_date", self.effective_start_date());
        insert_date(&mut params, "end_date", self.effective_end_date());
        if let Some(min) = self.enrichment_score_min {
            params.insert("enrichment_score_min".into(), min.to_string());
        }

        params
    }
}

/// The CVE-list filter selection, independently scoped from rule filters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CveFilters {
    pub query: Option<String>,
    pub severities: Vec<String>,
    pub with_rules_only: Option<bool>,
}

impl CveFilters {
    /// Produces the canonical backend parameter set for this selection.
    pub fn to_params(&self) -> BTreeMap<String, String> {
        let mut params = BTreeMap::new();
        insert_str(&mut params, "query", non_empty(self.query.as_deref()));
        insert_list(&mut params, "severities", &self.severities);
        insert_bool(&mut params, "with_rules_only", self.with_rules_only);
        params
    }
}

/// Builds the full parameter set for a paged rule query: pagination, sort
/// (with field aliasing), and normalized filters.
pub fn build_query_params(
    page: Option<PageRequest>,
    sort: Option<&SortSpec>,
    filters: Option<&RuleFilters>,
) -> CoreResult<BTreeMap<String, String>> {
    let mut params = filters.map(RuleFilters::to_params).unwrap_or_default();

    if let Some(page) = page {
        let window = PageRequest::new(page.page, page.page_size)?.to_offset();
        params.insert("offset".into(), window.offset.to_string());
        params.insert("limit".into(), window.limit.to_string());
    }

    if let Some(sort) = sort {
        params.insert("sort_by".into(), canonical_sort_field(&sort.field).into());
        params.insert("sort_dir".into(), sort.direction.as_str().into());
    }

    Ok(params)
}

/// One selectable filter value as served by `GET /filters/options`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterOption {
    pub value: String,
    pub label: String,
    /// Facet count, when the backend supplies one.
    pub count: Option<u64>,
}

/// The filter-option catalog served by `GET /filters/options`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterOptions {
    pub sources: Vec<FilterOption>,
    pub rule_sources: Vec<FilterOption>,
    pub rule_types: Vec<FilterOption>,
    pub tactics: Vec<FilterOption>,
    pub severities: Vec<String>,
    pub platforms: Vec<String>,
}

/// A display chip summarizing one active filter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterChip {
    pub key: &'static str,
    pub label: String,
    pub value: String,
}

/// Flattens the active filter selection into display chips.
pub fn build_filter_chips(filters: &RuleFilters) -> Vec<FilterChip> {
    let mut chips = Vec::new();

    if let Some(query) = filters.effective_query() {
        chips.push(FilterChip {
            key: "query",
            label: format!("Search: {query}"),
            value: query.to_string(),
        });
    }

    for severity in filters.effective_severities() {
        chips.push(FilterChip {
            key: "severity",
            label: severity.clone(),
            value: severity.clone(),
        });
    }

    for rule_type in &filters.rule_types {
        chips.push(FilterChip {
            key: "rule_type",
            label: rule_type.clone(),
            value: rule_type.clone(),
        });
    }

    for tag in &filters.tags {
        chips.push(FilterChip {
            key: "tag",
            label: tag.clone(),
            value: tag.clone(),
        });
    }

    if let Some(active) = filters.is_active {
        chips.push(FilterChip {
            key: "is_active",
            label: if active { "Active" } else { "Inactive" }.to_string(),
            value: active.to_string(),
        });
    }

    chips
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

fn insert_str(params: &mut BTreeMap<String, String>, key: &str, value: Option<&str>) {
    if let Some(value) = value {
        params.insert(key.into(), value.to_string());
    }
}

fn insert_list(params: &mut BTreeMap<String, String>, key: &str, values: &[String]) {
    let joined = values
        .iter()
        .filter(|v| !v.trim().is_empty())
        .cloned()
        .collect::<Vec<_>>()
        .join(",");
    if !joined.is_empty() {
        params.insert(key.into(), joined);
    }
}

fn insert_bool(params: &mut BTreeMap<String, String>, key: &str, value: Option<bool>) {
    if let Some(value) = value {
        params.insert(key.into(), value.to_string());
    }
}

fn insert_date(params: &mut BTreeMap<String, String>, key: &str, value: Option<DateTime<Utc>>) {
    if let Some(value) = value {
        params.insert(
            key.into(),
            value.to_rfc3339_opts(SecondsFormat::Secs, true),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_alias_and_canonical_are_equivalent() {
        let canonical = RuleFilters {
            query: Some("x".into()),
            ..Default::default()
        };
        let alias = RuleFilters {
            search: Some("x".into()),
            ..Default::default()
        };
        assert_eq!(canonical.to_params(), alias.to_params());
    }

    #[test]
    fn test_canonical_wins_over_alias() {
        let filters = RuleFilters {
            query: Some("canonical".into()),
            search: Some("legacy".into()),
            severities: vec!["high".into()],
            severity: vec!["low".into()],
            ..Default::default()
        };
        let params = filters.to_params();
        assert_eq!(params.get("query").unwrap(), "canonical");
        assert_eq!(params.get("severities").unwrap(), "high");
    }

    #[test]
    fn test_empty_arrays_are_omitted() {
        let filters = RuleFilters {
            severities: vec![],
            ..Default::default()
        };
        let params = filters.to_params();
        assert!(!params.contains_key("severities"));
        assert!(params.is_empty());
    }

    #[test]
    fn test_empty_strings_are_omitted() {
        let filters = RuleFilters {
            query: Some("  ".into()),
            tags: vec!["".into()],
            ..Default::default()
        };
        assert!(filters.to_params().is_empty());
    }

    #[test]
    fn test_arrays_comma_joined() {
        let filters = RuleFilters {
            severities: vec!["critical".into(), "high".into()],
            mitre_techniques: vec!["T1059".into(), "T1059.001".into()],
            ..Default::default()
        };
        let params = filters.to_params();
        assert_eq!(params.get("severities").unwrap(), "critical,high");
        assert_eq!(params.get("mitre_techniques").unwrap(), "T1059,T1059.001");
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let filters = RuleFilters {
            search: Some("powershell".into()),
            severity: vec!["high".into()],
            has_mitre_mapping: Some(true),
            ..Default::default()
        };
        assert_eq!(filters.to_params(), filters.to_params());
    }

    #[test]
    fn test_sort_field_alias_mapping() {
        let params = build_query_params(
            Some(PageRequest::default()),
            Some(&SortSpec::new("modified_date", SortDirection::Desc)),
            None,
        )
        .unwrap();
        assert_eq!(params.get("sort_by").unwrap(), "updated_date");
        assert_eq!(params.get("sort_dir").unwrap(), "desc");
    }

    #[test]
    fn test_unmapped_sort_field_passes_through() {
        assert_eq!(canonical_sort_field("severity"), "severity");
        assert_eq!(canonical_sort_field("title"), "name");
        assert_eq!(canonical_sort_field("source_rule_id"), "rule_id");
    }

    #[test]
    fn test_pagination_merged_into_params() {
        let page = PageRequest {
            page: 3,
            page_size: 25,
        };
        let params = build_query_params(Some(page), None, None).unwrap();
        assert_eq!(params.get("offset").unwrap(), "50");
        assert_eq!(params.get("limit").unwrap(), "25");
    }

    #[test]
    fn test_invalid_pagination_rejected() {
        let page = PageRequest {
            page: 0,
            page_size: 25,
        };
        assert!(build_query_params(Some(page), None, None).is_err());
    }

    #[test]
    fn test_date_range_wins_over_flat_fields() {
        let in_range = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let flat = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let filters = RuleFilters {
            date_range: Some(DateRange {
                start: Some(in_range),
                end: None,
            }),
            start_date: Some(flat),
            ..Default::default()
        };
        let params = filters.to_params();
        assert_eq!(params.get("start_date").unwrap(), "2025-01-01T00:00:00Z");
        assert!(!params.contains_key("end_date"));
    }

    #[test]
    fn test_cve_filters_independent_shape() {
        let filters = CveFilters {
            query: Some("openssl".into()),
            severities: vec!["critical".into()],
            with_rules_only: Some(true),
        };
        let params = filters.to_params();
        assert_eq!(params.get("query").unwrap(), "openssl");
        assert_eq!(params.get("severities").unwrap(), "critical");
        assert_eq!(params.get("with_rules_only").unwrap(), "true");
    }

    #[test]
    fn test_filter_chips() {
        let filters = RuleFilters {
            search: Some("mimikatz".into()),
            severity: vec!["critical".into()],
            tags: vec!["credential-theft".into()],
            is_active: Some(true),
            ..Default::default()
        };
        let chips = build_filter_chips(&filters);
        assert_eq!(chips.len(), 4);
        assert_eq!(chips[0].label, "Search: mimikatz");
        assert_eq!(chips[3].label, "Active");
    }
}
