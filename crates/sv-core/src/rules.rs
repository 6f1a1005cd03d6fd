//! Rule view models and the backend-to-frontend transformer.
//!
//! Backend rule records are inconsistent across API versions: the same
//! conceptual field arrives under different names (`name`/`title`,
//! `rule_id`/`source_rule_id`), in different shapes (`mitre_techniques` as
//! ID strings or as mapping objects), or at different nesting levels
//! (top-level vs. `rule_metadata`). The transformer reconciles every
//! observed shape into one [`RuleSummary`]/[`RuleDetail`] pair.
//!
//! The transform is total over missing optional fields: every output field
//! has a default. It fails only when the record is structurally
//! incompatible: not an object, or missing the `id`/`rule_id` identity.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::dates::parse_datetime;
use crate::error::{CoreError, CoreResult};
use crate::pagination::{pagination_meta, DEFAULT_PAGE_SIZE};
use crate::severity::Severity;

/// Rule activation state, boolean-backed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleStatus {
    Active,
    Inactive,
}

impl RuleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleStatus::Active => "active",
            RuleStatus::Inactive => "inactive",
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, RuleStatus::Active)
    }
}

impl From<bool> for RuleStatus {
    fn from(active: bool) -> Self {
        if active {
            RuleStatus::Active
        } else {
            RuleStatus::Inactive
        }
    }
}

impl std::fmt::Display for RuleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `is_active` arrives as a real boolean or, in older API versions, as a
/// string encoding of one.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum BoolLike {
    Bool(bool),
    Text(String),
}

impl BoolLike {
    /// Interprets the value; unrecognized strings yield `None`.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            BoolLike::Bool(b) => Some(*b),
            BoolLike::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "active" | "1" | "yes" => Some(true),
                "false" | "inactive" | "0" | "no" => Some(false),
                _ => None,
            },
        }
    }
}

/// Rule provenance: the backend sends either this object or a bare
/// `rule_source` string, depending on the API version.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleSource {
    pub id: Option<i64>,
    pub name: Option<String>,
    #[serde(rename = "type", alias = "source_type")]
    pub source_type: Option<String>,
}

/// One element of `mitre_techniques`: a plain ID string or a mapping
/// object carrying the ID plus enrichment confidence.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum MitreTechniqueRef {
    Id(String),
    Mapping(RawTechniqueMapping),
}

/// Mapping-object form of a technique reference.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawTechniqueMapping {
    pub technique_id: Option<String>,
    pub name: Option<String>,
    pub tactic: Option<String>,
    pub mapping_confidence: Option<f64>,
}

/// One element of `cve_references`/`cves`: a plain CVE ID or a mapping
/// object.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CveRef {
    Id(String),
    Mapping(RawCveMapping),
}

/// Mapping-object form of a CVE reference.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawCveMapping {
    pub cve_id: Option<String>,
    pub severity: Option<String>,
    pub cvss_score: Option<f64>,
    pub mapping_confidence: Option<f64>,
}

/// Normalized MITRE technique mapping on a rule detail.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TechniqueMapping {
    pub technique_id: String,
    pub name: Option<String>,
    pub tactic: Option<String>,
    pub mapping_confidence: Option<f64>,
}

/// Normalized CVE mapping on a rule detail.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CveMapping {
    pub cve_id: String,
    pub severity: Severity,
    pub cvss_score: Option<f64>,
    pub mapping_confidence: Option<f64>,
}

/// Raw backend rule record with every observed field optional.
///
/// This is the deserialization target; [`RuleSummary::from_raw`] applies
/// the fallback chains and defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawRule {
    pub id: Option<i64>,
    pub rule_id: Option<String>,
    /// Alias of `rule_id` used by some API versions.
    pub source_rule_id: Option<String>,
    pub name: Option<String>,
    /// Alias of `name`.
    pub title: Option<String>,
    pub description: Option<String>,
    pub rule_type: Option<String>,
    pub severity: Option<String>,
    pub is_active: Option<BoolLike>,
    pub tags: Option<Vec<String>>,
    pub created_date: Option<String>,
    pub modified_date: Option<String>,
    /// Alias of `modified_date`.
    pub updated_date: Option<String>,
    pub rule_source: Option<String>,
    pub source: Option<RuleSource>,
    pub has_mitre: Option<bool>,
    pub has_cves: Option<bool>,
    pub linked_technique_ids: Option<Vec<String>>,
    pub mitre_techniques: Option<Vec<MitreTechniqueRef>>,
    pub extracted_mitre_count: Option<u32>,
    pub extracted_cve_count: Option<u32>,
    pub enrichment_score: Option<f64>,
    pub rule_platforms: Option<Vec<String>>,
    pub platforms: Option<Vec<String>>,
}

/// Normalized rule list entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleSummary {
    pub id: i64,
    pub source_rule_id: String,
    pub title: String,
    pub description: Option<String>,
    pub rule_type: Option<String>,
    pub severity: Severity,
    pub status: RuleStatus,
    pub tags: Vec<String>,
    pub created_date: Option<DateTime<Utc>>,
    pub modified_date: Option<DateTime<Utc>>,
    /// Display name of the source; `"Unknown"` when nothing is available.
    pub rule_source: String,
    /// The richer source object, when the backend sent one.
    pub source: Option<RuleSource>,
    pub has_mitre_mapping: bool,
    pub has_cve_references: bool,
    pub extracted_mitre_count: u32,
    pub extracted_cve_count: u32,
    pub enrichment_score: f64,
    pub linked_technique_ids: Vec<String>,
    pub rule_platforms: Vec<String>,
    pub platforms: Vec<String>,
}

impl RuleSummary {
    /// Transforms a raw backend value into a summary.
    ///
    /// Non-object input and records without `id` plus `rule_id` (or its
    /// `source_rule_id` alias) are rejected as malformed.
    pub fn from_value(value: &Value) -> CoreResult<Self> {
        if !value.is_object() {
            return Err(CoreError::malformed("rule record is not an object"));
        }
        let raw: RawRule = serde_json::from_value(value.clone())
            .map_err(|e| CoreError::malformed(format!("rule record: {e}")))?;
        Self::from_raw(raw)
    }

    /// Applies the fallback chains and defaults to a deserialized record.
    pub fn from_raw(raw: RawRule) -> CoreResult<Self> {
        let id = raw
            .id
            .ok_or_else(|| CoreError::malformed("rule record missing `id`"))?;
        let source_rule_id = first_non_empty([raw.rule_id, raw.source_rule_id])
            .ok_or_else(|| CoreError::malformed("rule record missing `rule_id`"))?;

        // linked_technique_ids: pre-extracted array wins; otherwise derive
        // from `mitre_techniques`, whose elements may be strings or objects.
        let linked_technique_ids = match raw.linked_technique_ids {
            Some(ids) => ids
                .into_iter()
                .filter(|id| !id.trim().is_empty())
                .collect(),
            None => raw
                .mitre_techniques
                .as_deref()
                .map(extract_technique_ids)
                .unwrap_or_default(),
        };

        let has_mitre_mapping = raw.has_mitre.unwrap_or(!linked_technique_ids.is_empty());
        let extracted_mitre_count = raw
            .extracted_mitre_count
            .unwrap_or(linked_technique_ids.len() as u32);

        let rule_source = first_non_empty([
            raw.rule_source,
            raw.source.as_ref().and_then(|s| s.name.clone()),
        ])
        .unwrap_or_else(|| "Unknown".to_string());

        let platforms = raw.platforms.unwrap_or_default();
        let rule_platforms = raw
            .rule_platforms
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| platforms.clone());

        Ok(Self {
            id,
            source_rule_id,
            title: first_non_empty([raw.name, raw.title]).unwrap_or_default(),
            description: raw.description,
            rule_type: raw.rule_type,
            severity: Severity::parse(raw.severity.as_deref()),
            // Status is derived strictly from `is_active`; other fields are
            // never consulted.
            status: RuleStatus::from(
                raw.is_active.and_then(|b| b.as_bool()).unwrap_or(false),
            ),
            tags: raw.tags.unwrap_or_default(),
            created_date: parse_datetime(raw.created_date.as_deref()),
            modified_date: parse_datetime(
                first_non_empty([raw.updated_date, raw.modified_date]).as_deref(),
            ),
            rule_source,
            source: raw.source,
            has_mitre_mapping,
            has_cve_references: raw.has_cves.unwrap_or(false),
            extracted_mitre_count,
            extracted_cve_count: raw.extracted_cve_count.unwrap_or(0),
            enrichment_score: raw.enrichment_score.unwrap_or(0.0),
            linked_technique_ids,
            rule_platforms,
            platforms,
        })
    }
}

/// Fields that may appear top-level or nested under `rule_metadata` /
/// `metadata`. Resolution is per field, top-level first.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawRuleMetadata {
    pub siem_platform: Option<String>,
    pub aor: Option<String>,
    pub source_org: Option<String>,
    pub data_sources: Option<Vec<String>>,
    pub modified_by: Option<String>,
    pub cwe_ids: Option<Vec<String>>,
    pub hunt_id: Option<String>,
    pub malware_family: Option<String>,
    pub intrusion_set: Option<String>,
}

/// Raw backend rule detail: the summary fields plus detail extras.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawRuleDetail {
    #[serde(flatten)]
    pub rule: RawRule,
    pub rule_content: Option<String>,
    pub raw_rule: Option<Value>,
    pub confidence_score: Option<f64>,
    pub false_positive_rate: Option<f64>,
    pub hash: Option<String>,
    pub author: Option<String>,
    pub source_file_path: Option<String>,
    pub siem_platform: Option<String>,
    pub aor: Option<String>,
    pub source_org: Option<String>,
    pub data_sources: Option<Vec<String>>,
    pub modified_by: Option<String>,
    pub cwe_ids: Option<Vec<String>>,
    pub hunt_id: Option<String>,
    pub malware_family: Option<String>,
    pub intrusion_set: Option<String>,
    pub rule_metadata: Option<RawRuleMetadata>,
    /// Alias nesting of `rule_metadata`.
    pub metadata: Option<RawRuleMetadata>,
    pub cve_references: Option<Vec<CveRef>>,
    /// Alias of `cve_references`.
    pub cves: Option<Vec<CveRef>>,
    pub related_rules: Option<Value>,
    pub validation: Option<Value>,
    pub deprecated_technique_warnings: Option<Value>,
    pub has_deprecated_techniques: Option<bool>,
}

/// Normalized rule detail.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleDetail {
    #[serde(flatten)]
    pub summary: RuleSummary,
    /// Raw detection logic; opaque to the UI.
    pub rule_content: Option<String>,
    pub raw_rule: Option<Value>,
    pub confidence_score: Option<f64>,
    pub false_positive_rate: Option<f64>,
    pub hash: Option<String>,
    pub author: Option<String>,
    pub source_file_path: Option<String>,
    pub siem_platform: Option<String>,
    pub aor: Option<String>,
    pub source_org: Option<String>,
    pub data_sources: Vec<String>,
    pub modified_by: Option<String>,
    pub cwe_ids: Vec<String>,
    pub hunt_id: Option<String>,
    pub malware_family: Option<String>,
    pub intrusion_set: Option<String>,
    pub mitre_techniques: Vec<TechniqueMapping>,
    pub cve_references: Vec<CveMapping>,
    pub related_rules: Option<Value>,
    pub validation: Option<Value>,
    pub deprecated_technique_warnings: Option<Value>,
    pub has_deprecated_techniques: bool,
}

impl RuleDetail {
    /// Transforms a raw backend detail value.
    pub fn from_value(value: &Value) -> CoreResult<Self> {
        if !value.is_object() {
            return Err(CoreError::malformed("rule detail is not an object"));
        }
        let raw: RawRuleDetail = serde_json::from_value(value.clone())
            .map_err(|e| CoreError::malformed(format!("rule detail: {e}")))?;
        Self::from_raw(raw)
    }

    /// Applies the fallback chains to a deserialized detail record.
    pub fn from_raw(raw: RawRuleDetail) -> CoreResult<Self> {
        let mitre_techniques = raw
            .rule
            .mitre_techniques
            .as_deref()
            .map(technique_mappings)
            .unwrap_or_default();
        let summary = RuleSummary::from_raw(raw.rule)?;

        let primary = raw.rule_metadata.unwrap_or_default();
        let secondary = raw.metadata.unwrap_or_default();

        let cve_references = raw
            .cve_references
            .or(raw.cves)
            .as_deref()
            .map(cve_mappings)
            .unwrap_or_default();

        Ok(Self {
            summary,
            rule_content: raw.rule_content,
            raw_rule: raw.raw_rule,
            confidence_score: raw.confidence_score,
            false_positive_rate: raw.false_positive_rate,
            hash: raw.hash,
            author: raw.author,
            source_file_path: raw.source_file_path,
            siem_platform: raw
                .siem_platform
                .or(primary.siem_platform)
                .or(secondary.siem_platform),
            aor: raw.aor.or(primary.aor).or(secondary.aor),
            source_org: raw
                .source_org
                .or(primary.source_org)
                .or(secondary.source_org),
            data_sources: raw
                .data_sources
                .or(primary.data_sources)
                .or(secondary.data_sources)
                .unwrap_or_default(),
            modified_by: raw
                .modified_by
                .or(primary.modified_by)
                .or(secondary.modified_by),
            cwe_ids: raw
                .cwe_ids
                .or(primary.cwe_ids)
                .or(secondary.cwe_ids)
                .unwrap_or_default(),
            hunt_id: raw.hunt_id.or(primary.hunt_id).or(secondary.hunt_id),
            malware_family: raw
                .malware_family
                .or(primary.malware_family)
                .or(secondary.malware_family),
            intrusion_set: raw
                .intrusion_set
                .or(primary.intrusion_set)
                .or(secondary.intrusion_set),
            mitre_techniques,
            cve_references,
            related_rules: raw.related_rules,
            validation: raw.validation,
            deprecated_technique_warnings: raw.deprecated_technique_warnings,
            has_deprecated_techniques: raw.has_deprecated_techniques.unwrap_or(false),
        })
    }
}

/// Extracts technique IDs from the string-or-object element shapes,
/// dropping empty entries.
pub fn extract_technique_ids(refs: &[MitreTechniqueRef]) -> Vec<String> {
    refs.iter()
        .filter_map(|r| match r {
            MitreTechniqueRef::Id(id) => Some(id.clone()),
            MitreTechniqueRef::Mapping(m) => m.technique_id.clone(),
        })
        .filter(|id| !id.trim().is_empty())
        .collect()
}

fn technique_mappings(refs: &[MitreTechniqueRef]) -> Vec<TechniqueMapping> {
    refs.iter()
        .filter_map(|r| match r {
            MitreTechniqueRef::Id(id) if !id.trim().is_empty() => Some(TechniqueMapping {
                technique_id: id.clone(),
                name: None,
                tactic: None,
                mapping_confidence: None,
            }),
            MitreTechniqueRef::Id(_) => None,
            MitreTechniqueRef::Mapping(m) => {
                let technique_id = m.technique_id.clone()?;
                if technique_id.trim().is_empty() {
                    return None;
                }
                Some(TechniqueMapping {
                    technique_id,
                    name: m.name.clone(),
                    tactic: m.tactic.clone(),
                    mapping_confidence: m.mapping_confidence,
                })
            }
        })
        .collect()
}

fn cve_mappings(refs: &[CveRef]) -> Vec<CveMapping> {
    refs.iter()
        .filter_map(|r| match r {
            CveRef::Id(id) if !id.trim().is_empty() => Some(CveMapping {
                cve_id: id.clone(),
                severity: Severity::Unknown,
                cvss_score: None,
                mapping_confidence: None,
            }),
            CveRef::Id(_) => None,
            CveRef::Mapping(m) => {
                let cve_id = m.cve_id.clone()?;
                if cve_id.trim().is_empty() {
                    return None;
                }
                Some(CveMapping {
                    cve_id,
                    severity: Severity::parse(m.severity.as_deref()),
                    cvss_score: m.cvss_score,
                    mapping_confidence: m.mapping_confidence,
                })
            }
        })
        .collect()
}

fn first_non_empty<const N: usize>(candidates: [Option<String>; N]) -> Option<String> {
    candidates
        .into_iter()
        .flatten()
        .find(|v| !v.trim().is_empty())
}

/// Raw paged rule response; the backend names the item array `items` or
/// `rules` depending on the endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct RawRulePage {
    items: Option<Vec<Value>>,
    rules: Option<Vec<Value>>,
    total: Option<u64>,
    offset: Option<u64>,
    limit: Option<u32>,
    has_more: Option<bool>,
    facets: Option<Value>,
}

/// Normalized page of rules with derived pagination metadata.
#[derive(Debug, Clone, Serialize)]
pub struct RulePage {
    pub rules: Vec<RuleSummary>,
    pub total: u64,
    pub offset: u64,
    pub limit: u32,
    pub page: u32,
    pub total_pages: u32,
    pub has_more: bool,
    /// Facet counts for filter options, passed through untouched.
    pub facets: Option<Value>,
}

impl RulePage {
    /// Transforms a paged rule response. `fallback_limit` is the limit the
    /// caller requested, used when the backend omits its echo.
    pub fn from_value(value: &Value, fallback_limit: u32) -> CoreResult<Self> {
        let raw: RawRulePage = serde_json::from_value(value.clone())
            .map_err(|e| CoreError::malformed(format!("rule page: {e}")))?;

        let items = raw.items.or(raw.rules).unwrap_or_default();
        let rules = items
            .iter()
            .map(RuleSummary::from_value)
            .collect::<CoreResult<Vec<_>>>()?;

        let total = raw.total.unwrap_or(0);
        let offset = raw.offset.unwrap_or(0);
        let limit = raw
            .limit
            .filter(|l| *l > 0)
            .or(Some(fallback_limit).filter(|l| *l > 0))
            .unwrap_or(DEFAULT_PAGE_SIZE);
        let meta = pagination_meta(offset, limit, total)?;

        Ok(Self {
            rules,
            total,
            offset,
            limit,
            page: meta.page,
            total_pages: meta.total_pages,
            has_more: raw.has_more.unwrap_or(meta.has_next),
            facets: raw.facets,
        })
    }
}

/// Distribution maps attached to rule statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleDistributions {
    pub by_severity: HashMap<String, u64>,
    pub by_platform: HashMap<String, u64>,
    pub by_rule_source: HashMap<String, u64>,
    pub by_rule_platform: HashMap<String, u64>,
    pub by_mitre_coverage: HashMap<String, u64>,
    pub by_cve_coverage: HashMap<String, u64>,
    pub by_enrichment_quality: HashMap<String, u64>,
}

/// Enrichment rollups attached to rule statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EnrichmentStats {
    pub rules_with_mitre: u64,
    pub rules_with_cves: u64,
    pub average_enrichment_score: f64,
    pub total_mitre_techniques_covered: u64,
    pub total_cves_referenced: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct RawEnrichmentBucket {
    total_enriched: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct RawEnrichmentStats {
    rules_with_mitre: Option<u64>,
    rules_with_cves: Option<u64>,
    average_enrichment_score: Option<f64>,
    total_mitre_techniques_covered: Option<u64>,
    total_cves_referenced: Option<u64>,
    mitre: Option<RawEnrichmentBucket>,
    cve: Option<RawEnrichmentBucket>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct RawRuleStats {
    total_rules: Option<u64>,
    active_rules: Option<u64>,
    inactive_rules: Option<u64>,
    active_filters: Option<Value>,
    stats: Option<RawDistributions>,
    enrichment: Option<RawEnrichmentStats>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct RawDistributions {
    by_severity: Option<HashMap<String, u64>>,
    by_platform: Option<HashMap<String, u64>>,
    by_rule_source: Option<HashMap<String, u64>>,
    by_rule_platform: Option<HashMap<String, u64>>,
    by_mitre_coverage: Option<HashMap<String, u64>>,
    by_cve_coverage: Option<HashMap<String, u64>>,
    by_enrichment_quality: Option<HashMap<String, u64>>,
}

/// Normalized rule statistics (`GET /rules/stats`).
#[derive(Debug, Clone, Default, Serialize)]
pub struct RuleStatsResponse {
    pub total_rules: u64,
    pub active_rules: u64,
    pub inactive_rules: u64,
    pub active_filters: Option<Value>,
    pub stats: RuleDistributions,
    pub enrichment: EnrichmentStats,
}

impl RuleStatsResponse {
    /// Transforms a raw statistics response, reconciling the
    /// `by_platform`/`by_rule_platform` and nested-enrichment variants.
    pub fn from_value(value: &Value) -> CoreResult<Self> {
        let raw: RawRuleStats = serde_json::from_value(value.clone())
            .map_err(|e| CoreError::malformed(format!("rule stats: {e}")))?;

        let total_rules = raw.total_rules.unwrap_or(0);
        let stats = raw.stats.unwrap_or_default();
        let by_rule_platform = stats.by_rule_platform.unwrap_or_default();
        let enrichment = raw.enrichment.unwrap_or_default();

        Ok(Self {
            total_rules,
            active_rules: raw.active_rules.unwrap_or(total_rules),
            inactive_rules: raw.inactive_rules.unwrap_or(0),
            active_filters: raw.active_filters,
            stats: RuleDistributions {
                by_severity: stats.by_severity.unwrap_or_default(),
                by_platform: stats
                    .by_platform
                    .unwrap_or_else(|| by_rule_platform.clone()),
                by_rule_source: stats.by_rule_source.unwrap_or_default(),
                by_rule_platform,
                by_mitre_coverage: stats.by_mitre_coverage.unwrap_or_default(),
                by_cve_coverage: stats.by_cve_coverage.unwrap_or_default(),
                by_enrichment_quality: stats.by_enrichment_quality.unwrap_or_default(),
            },
            enrichment: EnrichmentStats {
                rules_with_mitre: enrichment
                    .rules_with_mitre
                    .or(enrichment.mitre.and_then(|b| b.total_enriched))
                    .unwrap_or(0),
                rules_with_cves: enrichment
                    .rules_with_cves
                    .or(enrichment.cve.and_then(|b| b.total_enriched))
                    .unwrap_or(0),
                average_enrichment_score: enrichment.average_enrichment_score.unwrap_or(0.0),
                total_mitre_techniques_covered: enrichment
                    .total_mitre_techniques_covered
                    .unwrap_or(0),
                total_cves_referenced: enrichment.total_cves_referenced.unwrap_or(0),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_end_to_end_transform() {
        let value = json!({
            "id": 7,
            "rule_id": "R-7",
            "name": "Suspicious PowerShell",
            "is_active": true,
            "mitre_techniques": ["T1059.001"]
        });
        let rule = RuleSummary::from_value(&value).unwrap();
        assert_eq!(rule.id, 7);
        assert_eq!(rule.source_rule_id, "R-7");
        assert_eq!(rule.title, "Suspicious PowerShell");
        assert_eq!(rule.status, RuleStatus::Active);
        assert!(rule.has_mitre_mapping);
        assert_eq!(rule.linked_technique_ids, vec!["T1059.001"]);
        assert_eq!(rule.extracted_mitre_count, 1);
        assert_eq!(rule.extracted_cve_count, 0);
        assert_eq!(rule.severity, Severity::Unknown);
    }

    #[test]
    fn test_minimal_record_is_total() {
        let value = json!({"id": 1, "rule_id": "R-1"});
        let rule = RuleSummary::from_value(&value).unwrap();
        assert_eq!(rule.title, "");
        assert_eq!(rule.status, RuleStatus::Inactive);
        assert_eq!(rule.rule_source, "Unknown");
        assert!(!rule.has_mitre_mapping);
        assert!(rule.linked_technique_ids.is_empty());
        assert_eq!(rule.enrichment_score, 0.0);
    }

    #[test]
    fn test_missing_identity_is_malformed() {
        assert!(matches!(
            RuleSummary::from_value(&json!({"rule_id": "R-1"})),
            Err(CoreError::MalformedResponse(_))
        ));
        assert!(matches!(
            RuleSummary::from_value(&json!({"id": 1})),
            Err(CoreError::MalformedResponse(_))
        ));
        assert!(matches!(
            RuleSummary::from_value(&json!([1, 2])),
            Err(CoreError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_source_rule_id_alias() {
        let value = json!({"id": 1, "source_rule_id": "SRC-9"});
        let rule = RuleSummary::from_value(&value).unwrap();
        assert_eq!(rule.source_rule_id, "SRC-9");
    }

    #[test]
    fn test_is_active_string_encodings() {
        for (encoded, expected) in [
            (json!("true"), RuleStatus::Active),
            (json!("active"), RuleStatus::Active),
            (json!("false"), RuleStatus::Inactive),
            (json!(false), RuleStatus::Inactive),
            (json!("garbage"), RuleStatus::Inactive),
        ] {
            let value = json!({"id": 1, "rule_id": "R-1", "is_active": encoded});
            assert_eq!(RuleSummary::from_value(&value).unwrap().status, expected);
        }
    }

    #[test]
    fn test_rule_source_fallback_chain() {
        let bare = json!({"id": 1, "rule_id": "R", "rule_source": "Sigma HQ"});
        assert_eq!(
            RuleSummary::from_value(&bare).unwrap().rule_source,
            "Sigma HQ"
        );

        let object = json!({"id": 1, "rule_id": "R", "source": {"id": 3, "name": "Elastic", "type": "vendor"}});
        let rule = RuleSummary::from_value(&object).unwrap();
        assert_eq!(rule.rule_source, "Elastic");
        assert_eq!(rule.source.as_ref().unwrap().source_type.as_deref(), Some("vendor"));

        let neither = json!({"id": 1, "rule_id": "R"});
        assert_eq!(
            RuleSummary::from_value(&neither).unwrap().rule_source,
            "Unknown"
        );
    }

    #[test]
    fn test_mixed_technique_reference_shapes() {
        let value = json!({
            "id": 1,
            "rule_id": "R",
            "mitre_techniques": [
                "T1003",
                {"technique_id": "T1055", "mapping_confidence": 0.92},
                {"name": "orphan mapping"},
                ""
            ]
        });
        let rule = RuleSummary::from_value(&value).unwrap();
        assert_eq!(rule.linked_technique_ids, vec!["T1003", "T1055"]);
        assert_eq!(rule.extracted_mitre_count, 2);
    }

    #[test]
    fn test_explicit_backend_count_wins() {
        let value = json!({
            "id": 1,
            "rule_id": "R",
            "mitre_techniques": ["T1003"],
            "extracted_mitre_count": 5
        });
        assert_eq!(
            RuleSummary::from_value(&value).unwrap().extracted_mitre_count,
            5
        );
    }

    #[test]
    fn test_pre_extracted_array_wins_over_mappings() {
        let value = json!({
            "id": 1,
            "rule_id": "R",
            "linked_technique_ids": ["T1999"],
            "mitre_techniques": ["T1003", "T1055"]
        });
        let rule = RuleSummary::from_value(&value).unwrap();
        assert_eq!(rule.linked_technique_ids, vec!["T1999"]);
    }

    #[test]
    fn test_has_mitre_explicit_false_wins() {
        // An explicit backend flag is trusted even when techniques exist.
        let value = json!({
            "id": 1,
            "rule_id": "R",
            "has_mitre": false,
            "mitre_techniques": ["T1003"]
        });
        assert!(!RuleSummary::from_value(&value).unwrap().has_mitre_mapping);
    }

    #[test]
    fn test_modified_date_alias() {
        let updated = json!({"id": 1, "rule_id": "R", "updated_date": "2025-02-01T00:00:00Z"});
        assert!(RuleSummary::from_value(&updated)
            .unwrap()
            .modified_date
            .is_some());

        let modified = json!({"id": 1, "rule_id": "R", "modified_date": "2025-02-01"});
        assert!(RuleSummary::from_value(&modified)
            .unwrap()
            .modified_date
            .is_some());
    }

    #[test]
    fn test_detail_metadata_fallback_is_per_field() {
        let value = json!({
            "id": 1,
            "rule_id": "R",
            "siem_platform": "splunk",
            "rule_metadata": {
                "siem_platform": "elastic",
                "aor": "DoD",
                "cwe_ids": ["CWE-79"]
            },
            "metadata": {
                "source_org": "Red Canary"
            }
        });
        let detail = RuleDetail::from_value(&value).unwrap();
        // Top-level wins for siem_platform, rule_metadata supplies aor,
        // metadata supplies source_org.
        assert_eq!(detail.siem_platform.as_deref(), Some("splunk"));
        assert_eq!(detail.aor.as_deref(), Some("DoD"));
        assert_eq!(detail.source_org.as_deref(), Some("Red Canary"));
        assert_eq!(detail.cwe_ids, vec!["CWE-79"]);
    }

    #[test]
    fn test_detail_cve_alias_pair() {
        let value = json!({
            "id": 1,
            "rule_id": "R",
            "cves": ["CVE-2021-44228", {"cve_id": "CVE-2017-0144", "severity": "critical", "cvss_score": 8.1}]
        });
        let detail = RuleDetail::from_value(&value).unwrap();
        assert_eq!(detail.cve_references.len(), 2);
        assert_eq!(detail.cve_references[0].cve_id, "CVE-2021-44228");
        assert_eq!(detail.cve_references[1].severity, Severity::Critical);
    }

    #[test]
    fn test_detail_technique_mappings_carry_confidence() {
        let value = json!({
            "id": 1,
            "rule_id": "R",
            "mitre_techniques": [{"technique_id": "T1059", "name": "Command and Scripting Interpreter", "mapping_confidence": 0.75}]
        });
        let detail = RuleDetail::from_value(&value).unwrap();
        assert_eq!(detail.mitre_techniques.len(), 1);
        assert_eq!(detail.mitre_techniques[0].mapping_confidence, Some(0.75));
    }

    #[test]
    fn test_rule_page_envelope_variants() {
        let items = json!({"items": [{"id": 1, "rule_id": "R-1"}], "total": 1, "offset": 0, "limit": 25});
        assert_eq!(RulePage::from_value(&items, 25).unwrap().rules.len(), 1);

        let rules = json!({"rules": [{"id": 2, "rule_id": "R-2"}], "total": 40});
        let page = RulePage::from_value(&rules, 25).unwrap();
        assert_eq!(page.rules.len(), 1);
        assert_eq!(page.limit, 25);
        assert_eq!(page.total_pages, 2);
        assert!(page.has_more);
    }

    #[test]
    fn test_rule_page_propagates_malformed_item() {
        let value = json!({"items": [{"name": "no identity"}]});
        assert!(RulePage::from_value(&value, 25).is_err());
    }

    #[test]
    fn test_rule_stats_platform_fallback() {
        let value = json!({
            "total_rules": 10,
            "stats": {"by_rule_platform": {"windows": 6}},
            "enrichment": {"mitre": {"total_enriched": 4}}
        });
        let stats = RuleStatsResponse::from_value(&value).unwrap();
        assert_eq!(stats.active_rules, 10);
        assert_eq!(stats.stats.by_platform.get("windows"), Some(&6));
        assert_eq!(stats.enrichment.rules_with_mitre, 4);
    }
}
