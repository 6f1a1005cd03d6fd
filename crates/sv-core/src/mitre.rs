//! MITRE ATT&CK domain: technique identifiers, matrix grouping, coverage.
//!
//! The backend serves each tactic's techniques as a flat list in which
//! subtechniques are distinguished from their parents only by the dotted
//! ID suffix (`T1003.001` under `T1003`). The grouping engine reconstructs
//! the two-level hierarchy, tolerating any input order, and derives
//! coverage statistics on top of it.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{CoreError, CoreResult};
use crate::stats::coverage_percentage;

/// Canonical kill-chain ordering for tactics. Tactics not in this list
/// sort after all known tactics, preserving their original order.
pub const KILL_CHAIN_ORDER: [&str; 14] = [
    "reconnaissance",
    "resource-development",
    "initial-access",
    "execution",
    "persistence",
    "privilege-escalation",
    "defense-evasion",
    "credential-access",
    "discovery",
    "lateral-movement",
    "collection",
    "command-and-control",
    "exfiltration",
    "impact",
];

/// Rule counts below this threshold (but above zero) classify as low
/// coverage.
pub const DEFAULT_LOW_COVERAGE_THRESHOLD: u32 = 3;

/// Whether a technique ID names a parent technique or a subtechnique.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TechniqueKind {
    Technique,
    Subtechnique {
        /// The parent technique's ID (the portion before the first dot).
        parent: String,
    },
}

/// A parsed technique identifier.
///
/// The dotted suffix is the only hierarchy signal the backend provides;
/// parsing it once up front avoids re-splitting IDs at every call site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TechniqueId {
    pub full: String,
    pub kind: TechniqueKind,
}

impl TechniqueId {
    /// Parses an ID. IDs with more than one dot (not observed in real
    /// ATT&CK data) still resolve to the prefix before the first dot.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        match raw.split_once('.') {
            Some((parent, suffix)) if !parent.is_empty() && !suffix.is_empty() => Self {
                full: raw.to_string(),
                kind: TechniqueKind::Subtechnique {
                    parent: parent.to_string(),
                },
            },
            _ => Self {
                full: raw.to_string(),
                kind: TechniqueKind::Technique,
            },
        }
    }

    pub fn is_subtechnique(&self) -> bool {
        matches!(self.kind, TechniqueKind::Subtechnique { .. })
    }

    /// The owning parent ID: itself for a parent technique.
    pub fn parent_id(&self) -> &str {
        match &self.kind {
            TechniqueKind::Technique => &self.full,
            TechniqueKind::Subtechnique { parent } => parent,
        }
    }
}

/// Coverage classification for a single technique or subtechnique.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoverageLevel {
    None,
    Low,
    High,
}

impl CoverageLevel {
    /// Classifies a node by its own rule count.
    pub fn classify(rule_count: u32, low_threshold: u32) -> Self {
        if rule_count == 0 {
            CoverageLevel::None
        } else if rule_count < low_threshold {
            CoverageLevel::Low
        } else {
            CoverageLevel::High
        }
    }
}

/// A technique record as served by the matrix and coverage endpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TechniqueRecord {
    pub technique_id: String,
    /// Alias of `technique_id` used by some API versions.
    pub id: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub platforms: Vec<String>,
    pub rule_count: Option<u32>,
    /// Alias of `rule_count` used by the coverage endpoint.
    pub count: Option<u32>,
    pub is_deprecated: bool,
    pub revoked: bool,
    pub superseded_by: Option<String>,
}

impl TechniqueRecord {
    /// The effective ID: `technique_id`, else the `id` alias.
    pub fn effective_id(&self) -> &str {
        if !self.technique_id.is_empty() {
            &self.technique_id
        } else {
            self.id.as_deref().unwrap_or("")
        }
    }

    /// The effective rule count: `rule_count`, else `count`, else 0.
    pub fn effective_rule_count(&self) -> u32 {
        self.rule_count.or(self.count).unwrap_or(0)
    }
}

/// A subtechnique grouped under its parent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubtechniqueEntry {
    pub technique_id: String,
    pub name: String,
    pub description: Option<String>,
    pub platforms: Vec<String>,
    pub rule_count: u32,
    pub coverage: CoverageLevel,
    pub is_deprecated: bool,
    pub revoked: bool,
    pub superseded_by: Option<String>,
}

/// A parent technique with its grouped subtechniques.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupedTechnique {
    pub technique_id: String,
    pub name: String,
    pub description: Option<String>,
    pub platforms: Vec<String>,
    /// The parent's own rule count, excluding subtechniques.
    pub rule_count: u32,
    /// Coverage classified on the parent's own count only.
    pub coverage: CoverageLevel,
    pub is_deprecated: bool,
    pub revoked: bool,
    pub superseded_by: Option<String>,
    pub subtechniques: Vec<SubtechniqueEntry>,
    /// True while the parent exists only because a subtechnique arrived
    /// first; cleared when the real parent record is seen.
    #[serde(skip)]
    placeholder: bool,
}

impl GroupedTechnique {
    fn placeholder(technique_id: &str) -> Self {
        Self {
            technique_id: technique_id.to_string(),
            // Sentinel until the real record arrives; the ID is the only
            // trustworthy attribute at this point.
            name: technique_id.to_string(),
            description: None,
            platforms: Vec::new(),
            rule_count: 0,
            coverage: CoverageLevel::None,
            is_deprecated: false,
            revoked: false,
            superseded_by: None,
            subtechniques: Vec::new(),
            placeholder: true,
        }
    }

    /// Overwrites attributes from a real parent record, preserving the
    /// subtechniques accumulated so far.
    fn absorb(&mut self, record: &TechniqueRecord) {
        self.name = record.name.clone();
        self.description = record.description.clone();
        self.platforms = record.platforms.clone();
        self.rule_count = record.effective_rule_count();
        self.is_deprecated = record.is_deprecated;
        self.revoked = record.revoked;
        self.superseded_by = record.superseded_by.clone();
        self.placeholder = false;
    }

    /// The parent's own count plus the sum of its subtechniques' counts.
    pub fn aggregate_rule_count(&self) -> u64 {
        u64::from(self.rule_count)
            + self
                .subtechniques
                .iter()
                .map(|s| u64::from(s.rule_count))
                .sum::<u64>()
    }

    /// True if the real parent record never appeared in the input.
    pub fn is_placeholder(&self) -> bool {
        self.placeholder
    }
}

/// Groups one tactic's flat technique list into the two-level hierarchy.
///
/// Input order is not assumed: a subtechnique arriving before its parent
/// synthesizes a placeholder that is later overwritten by the real record
/// without dropping or duplicating subtechniques. Duplicate parent IDs are
/// last-write-wins for attributes while subtechnique lists accumulate.
/// Output ordering is a display contract: parents and each subtechnique
/// list sort lexicographically by technique ID.
pub fn group_techniques(records: &[TechniqueRecord]) -> Vec<GroupedTechnique> {
    group_techniques_with_threshold(records, DEFAULT_LOW_COVERAGE_THRESHOLD)
}

/// [`group_techniques`] with an explicit low-coverage threshold.
pub fn group_techniques_with_threshold(
    records: &[TechniqueRecord],
    low_threshold: u32,
) -> Vec<GroupedTechnique> {
    let mut parents: HashMap<String, GroupedTechnique> = HashMap::new();

    for record in records {
        let id = TechniqueId::parse(record.effective_id());
        if id.full.is_empty() {
            tracing::debug!("skipping technique record without an id");
            continue;
        }

        match &id.kind {
            TechniqueKind::Technique => {
                parents
                    .entry(id.full.clone())
                    .or_insert_with(|| GroupedTechnique::placeholder(&id.full))
                    .absorb(record);
            }
            TechniqueKind::Subtechnique { parent } => {
                let rule_count = record.effective_rule_count();
                parents
                    .entry(parent.clone())
                    .or_insert_with(|| GroupedTechnique::placeholder(parent))
                    .subtechniques
                    .push(SubtechniqueEntry {
                        technique_id: id.full.clone(),
                        name: record.name.clone(),
                        description: record.description.clone(),
                        platforms: record.platforms.clone(),
                        rule_count,
                        coverage: CoverageLevel::classify(rule_count, low_threshold),
                        is_deprecated: record.is_deprecated,
                        revoked: record.revoked,
                        superseded_by: record.superseded_by.clone(),
                    });
            }
        }
    }

    let mut grouped: Vec<GroupedTechnique> = parents.into_values().collect();
    for parent in &mut grouped {
        parent.coverage = CoverageLevel::classify(parent.rule_count, low_threshold);
        parent
            .subtechniques
            .sort_by(|a, b| a.technique_id.cmp(&b.technique_id));
    }
    grouped.sort_by(|a, b| a.technique_id.cmp(&b.technique_id));
    grouped
}

/// Coverage rollup for one tactic.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TacticCoverage {
    /// Flattened node count: parents plus subtechniques.
    pub total: u32,
    /// Nodes with at least one mapped rule.
    pub covered: u32,
    /// `covered / total`, rounded; 0 when the tactic has no techniques.
    pub percentage: u32,
    /// Technique IDs (either level) with zero rules of their own. A parent
    /// is a gap even when its subtechniques are covered.
    pub gaps: Vec<String>,
}

/// A tactic column as served by the matrix endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawTactic {
    pub tactic_id: String,
    pub name: String,
    pub techniques: Vec<TechniqueRecord>,
}

/// A tactic with grouped techniques and derived coverage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupedTactic {
    pub tactic_id: String,
    pub name: String,
    pub techniques: Vec<GroupedTechnique>,
    /// Flattened node count, parents plus subtechniques.
    pub technique_count: u32,
    pub coverage: TacticCoverage,
}

impl GroupedTactic {
    /// An empty technique list is a legitimate state, rendered explicitly
    /// rather than as a missing tactic.
    pub fn has_techniques(&self) -> bool {
        !self.techniques.is_empty()
    }
}

/// Groups one tactic and derives its coverage rollup.
pub fn group_tactic(raw: &RawTactic, low_threshold: u32) -> GroupedTactic {
    let techniques = group_techniques_with_threshold(&raw.techniques, low_threshold);

    let mut total = 0u32;
    let mut covered = 0u32;
    let mut gaps = Vec::new();
    for parent in &techniques {
        total += 1;
        if parent.rule_count > 0 {
            covered += 1;
        } else {
            gaps.push(parent.technique_id.clone());
        }
        for sub in &parent.subtechniques {
            total += 1;
            if sub.rule_count > 0 {
                covered += 1;
            } else {
                gaps.push(sub.technique_id.clone());
            }
        }
    }

    GroupedTactic {
        tactic_id: raw.tactic_id.clone(),
        name: raw.name.clone(),
        techniques,
        technique_count: total,
        coverage: TacticCoverage {
            total,
            covered,
            percentage: coverage_percentage(u64::from(covered), u64::from(total)),
            gaps,
        },
    }
}

/// Normalizes a tactic name to its kill-chain slug.
fn tactic_slug(name: &str) -> String {
    name.trim().to_ascii_lowercase().replace(' ', "-")
}

/// Sorts tactics into the canonical kill-chain order. Unknown tactics sort
/// after all known ones, keeping their original relative order.
pub fn sort_tactics(tactics: &mut [GroupedTactic]) {
    let position = |tactic: &GroupedTactic| {
        KILL_CHAIN_ORDER
            .iter()
            .position(|slug| *slug == tactic_slug(&tactic.name))
            .unwrap_or(KILL_CHAIN_ORDER.len())
    };
    // Stable sort keeps unknown tactics in input order.
    tactics.sort_by_key(position);
}

/// Matrix envelope: the tactic array arrives under `matrix` or `tactics`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct RawMatrixResponse {
    matrix: Option<Vec<RawTactic>>,
    tactics: Option<Vec<RawTactic>>,
}

/// Transforms a full matrix response: grouping, coverage, and canonical
/// tactic ordering.
pub fn transform_matrix(value: &Value, low_threshold: u32) -> CoreResult<Vec<GroupedTactic>> {
    let raw: RawMatrixResponse = serde_json::from_value(value.clone())
        .map_err(|e| CoreError::malformed(format!("mitre matrix: {e}")))?;
    let tactics = raw
        .matrix
        .or(raw.tactics)
        .ok_or_else(|| CoreError::malformed("mitre matrix missing `matrix` array"))?;

    let mut grouped: Vec<GroupedTactic> = tactics
        .iter()
        .map(|t| group_tactic(t, low_threshold))
        .collect();
    sort_tactics(&mut grouped);
    Ok(grouped)
}

/// Collects the distinct platforms appearing anywhere in a matrix, sorted.
pub fn available_platforms(tactics: &[GroupedTactic]) -> Vec<String> {
    let mut platforms: Vec<String> = tactics
        .iter()
        .flat_map(|t| t.techniques.iter())
        .flat_map(|tech| {
            tech.platforms
                .iter()
                .chain(tech.subtechniques.iter().flat_map(|s| s.platforms.iter()))
        })
        .cloned()
        .collect();
    platforms.sort();
    platforms.dedup();
    platforms
}

/// Coverage summary as served by `GET /mitre/coverage`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CoverageReport {
    pub techniques: Vec<TechniqueRecord>,
    pub total_techniques: u32,
    pub covered_techniques: u32,
    pub coverage_percentage: u32,
}

impl CoverageReport {
    /// Transforms a coverage response, deriving totals the backend omits.
    pub fn from_value(value: &Value) -> CoreResult<Self> {
        #[derive(Debug, Default, Deserialize)]
        #[serde(default)]
        struct RawCoverage {
            techniques: Vec<TechniqueRecord>,
            total_techniques: Option<u32>,
            covered_techniques: Option<u32>,
            coverage_percentage: Option<u32>,
        }

        let raw: RawCoverage = serde_json::from_value(value.clone())
            .map_err(|e| CoreError::malformed(format!("mitre coverage: {e}")))?;

        let total = raw
            .total_techniques
            .unwrap_or(raw.techniques.len() as u32);
        let covered = raw.covered_techniques.unwrap_or_else(|| {
            raw.techniques
                .iter()
                .filter(|t| t.effective_rule_count() > 0)
                .count() as u32
        });

        Ok(Self {
            coverage_percentage: raw
                .coverage_percentage
                .unwrap_or_else(|| coverage_percentage(u64::from(covered), u64::from(total))),
            techniques: raw.techniques,
            total_techniques: total,
            covered_techniques: covered,
        })
    }

    /// Lookup map keyed by effective technique ID.
    pub fn coverage_map(&self) -> HashMap<&str, &TechniqueRecord> {
        self.techniques
            .iter()
            .filter(|t| !t.effective_id().is_empty())
            .map(|t| (t.effective_id(), t))
            .collect()
    }
}

/// A tactic as served by `GET /mitre/tactics`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TacticInfo {
    pub tactic_id: String,
    pub name: String,
}

/// Transforms the tactics listing; the array arrives under `tactics`,
/// `items`, or as a bare array.
pub fn transform_tactics(value: &Value) -> CoreResult<Vec<TacticInfo>> {
    let array = value
        .get("tactics")
        .or_else(|| value.get("items"))
        .unwrap_or(value);
    serde_json::from_value(array.clone())
        .map_err(|e| CoreError::malformed(format!("mitre tactics: {e}")))
}

/// A page of standalone technique records (`GET /mitre/techniques`).
#[derive(Debug, Clone, Default, Serialize)]
pub struct TechniquePage {
    pub techniques: Vec<TechniqueRecord>,
    pub total: u64,
}

impl TechniquePage {
    /// Transforms a technique listing; the array arrives under
    /// `techniques` or `items`.
    pub fn from_value(value: &Value) -> CoreResult<Self> {
        #[derive(Debug, Default, Deserialize)]
        #[serde(default)]
        struct RawTechniquePage {
            techniques: Option<Vec<TechniqueRecord>>,
            items: Option<Vec<TechniqueRecord>>,
            total: Option<u64>,
        }

        let raw: RawTechniquePage = serde_json::from_value(value.clone())
            .map_err(|e| CoreError::malformed(format!("mitre techniques: {e}")))?;
        let techniques = raw.techniques.or(raw.items).unwrap_or_default();
        Ok(Self {
            total: raw.total.unwrap_or(techniques.len() as u64),
            techniques,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(id: &str, rule_count: u32) -> TechniqueRecord {
        TechniqueRecord {
            technique_id: id.to_string(),
            name: format!("Technique {id}"),
            rule_count: Some(rule_count),
            ..Default::default()
        }
    }

    #[test]
    fn test_technique_id_parse() {
        let parent = TechniqueId::parse("T1003");
        assert_eq!(parent.kind, TechniqueKind::Technique);
        assert_eq!(parent.parent_id(), "T1003");

        let sub = TechniqueId::parse("T1003.001");
        assert!(sub.is_subtechnique());
        assert_eq!(sub.parent_id(), "T1003");
    }

    #[test]
    fn test_technique_id_multiple_dots() {
        // Not observed in real ATT&CK data, but must not misbehave.
        let odd = TechniqueId::parse("T1055.001.002");
        assert_eq!(
            odd.kind,
            TechniqueKind::Subtechnique {
                parent: "T1055".to_string()
            }
        );
    }

    #[test]
    fn test_grouping_is_order_independent() {
        let ids = ["T1003", "T1003.001", "T1003.002", "T1055"];
        let permutations: [[usize; 4]; 4] = [[0, 1, 2, 3], [3, 2, 1, 0], [1, 3, 0, 2], [2, 0, 3, 1]];

        for order in permutations {
            let records: Vec<_> = order.iter().map(|&i| record(ids[i], 1)).collect();
            let grouped = group_techniques(&records);

            assert_eq!(grouped.len(), 2);
            assert_eq!(grouped[0].technique_id, "T1003");
            assert_eq!(grouped[1].technique_id, "T1055");
            let subs: Vec<_> = grouped[0]
                .subtechniques
                .iter()
                .map(|s| s.technique_id.as_str())
                .collect();
            assert_eq!(subs, vec!["T1003.001", "T1003.002"]);
            assert!(grouped[1].subtechniques.is_empty());
        }
    }

    #[test]
    fn test_placeholder_merge_preserves_subtechniques() {
        let records = vec![
            TechniqueRecord {
                technique_id: "T1003.001".into(),
                name: "LSASS Memory".into(),
                rule_count: Some(2),
                ..Default::default()
            },
            TechniqueRecord {
                technique_id: "T1003".into(),
                name: "OS Credential Dumping".into(),
                platforms: vec!["Windows".into()],
                rule_count: Some(1),
                ..Default::default()
            },
        ];
        let grouped = group_techniques(&records);
        assert_eq!(grouped.len(), 1);
        let parent = &grouped[0];
        assert_eq!(parent.name, "OS Credential Dumping");
        assert_eq!(parent.platforms, vec!["Windows"]);
        assert!(!parent.is_placeholder());
        assert_eq!(parent.subtechniques.len(), 1);
        assert_eq!(parent.subtechniques[0].technique_id, "T1003.001");
    }

    #[test]
    fn test_orphan_subtechnique_keeps_placeholder_parent() {
        let records = vec![record("T1574.002", 1)];
        let grouped = group_techniques(&records);
        assert_eq!(grouped.len(), 1);
        assert!(grouped[0].is_placeholder());
        assert_eq!(grouped[0].technique_id, "T1574");
        assert_eq!(grouped[0].name, "T1574");
        assert_eq!(grouped[0].rule_count, 0);
        assert_eq!(grouped[0].subtechniques.len(), 1);
    }

    #[test]
    fn test_duplicate_parent_last_write_wins_subs_accumulate() {
        let records = vec![
            TechniqueRecord {
                technique_id: "T1003".into(),
                name: "First".into(),
                rule_count: Some(1),
                ..Default::default()
            },
            record("T1003.001", 1),
            TechniqueRecord {
                technique_id: "T1003".into(),
                name: "Second".into(),
                rule_count: Some(9),
                ..Default::default()
            },
            record("T1003.002", 0),
        ];
        let grouped = group_techniques(&records);
        assert_eq!(grouped.len(), 1);
        assert_eq!(grouped[0].name, "Second");
        assert_eq!(grouped[0].rule_count, 9);
        assert_eq!(grouped[0].subtechniques.len(), 2);
    }

    #[test]
    fn test_coverage_classification_per_level() {
        let records = vec![record("T1003", 0), record("T1003.001", 1), record("T1003.002", 5)];
        let grouped = group_techniques(&records);
        let parent = &grouped[0];
        assert_eq!(parent.coverage, CoverageLevel::None);
        assert_eq!(parent.subtechniques[0].coverage, CoverageLevel::Low);
        assert_eq!(parent.subtechniques[1].coverage, CoverageLevel::High);
        assert_eq!(parent.aggregate_rule_count(), 6);
    }

    #[test]
    fn test_tactic_coverage_and_gaps() {
        let raw = RawTactic {
            tactic_id: "TA0006".into(),
            name: "Credential Access".into(),
            techniques: vec![record("T1003", 0), record("T1003.001", 2), record("T1110", 1)],
        };
        let tactic = group_tactic(&raw, DEFAULT_LOW_COVERAGE_THRESHOLD);
        assert_eq!(tactic.technique_count, 3);
        assert_eq!(tactic.coverage.total, 3);
        assert_eq!(tactic.coverage.covered, 2);
        assert_eq!(tactic.coverage.percentage, 67);
        // The parent is a gap even though its subtechnique is covered.
        assert_eq!(tactic.coverage.gaps, vec!["T1003"]);
    }

    #[test]
    fn test_empty_tactic_is_explicit() {
        let raw = RawTactic {
            tactic_id: "TA0043".into(),
            name: "Reconnaissance".into(),
            techniques: vec![],
        };
        let tactic = group_tactic(&raw, DEFAULT_LOW_COVERAGE_THRESHOLD);
        assert!(!tactic.has_techniques());
        assert_eq!(tactic.coverage.percentage, 0);
        assert!(tactic.coverage.gaps.is_empty());
    }

    #[test]
    fn test_tactic_sorting_kill_chain_order() {
        let mut tactics: Vec<GroupedTactic> = ["Impact", "Persistence", "Initial Access"]
            .iter()
            .map(|name| {
                group_tactic(
                    &RawTactic {
                        tactic_id: String::new(),
                        name: (*name).into(),
                        techniques: vec![],
                    },
                    DEFAULT_LOW_COVERAGE_THRESHOLD,
                )
            })
            .collect();
        sort_tactics(&mut tactics);
        let names: Vec<_> = tactics.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Initial Access", "Persistence", "Impact"]);
    }

    #[test]
    fn test_unknown_tactics_sort_after_known() {
        let mut tactics: Vec<GroupedTactic> = ["Zebra Phase", "Impact", "Alpha Phase", "Execution"]
            .iter()
            .map(|name| {
                group_tactic(
                    &RawTactic {
                        tactic_id: String::new(),
                        name: (*name).into(),
                        techniques: vec![],
                    },
                    DEFAULT_LOW_COVERAGE_THRESHOLD,
                )
            })
            .collect();
        sort_tactics(&mut tactics);
        let names: Vec<_> = tactics.iter().map(|t| t.name.as_str()).collect();
        // Unknown tactics keep their original relative order at the end.
        assert_eq!(names, vec!["Execution", "Impact", "Zebra Phase", "Alpha Phase"]);
    }

    #[test]
    fn test_transform_matrix_envelope_variants() {
        let matrix = json!({"matrix": [{"tactic_id": "TA0001", "name": "Initial Access", "techniques": []}]});
        assert_eq!(
            transform_matrix(&matrix, DEFAULT_LOW_COVERAGE_THRESHOLD)
                .unwrap()
                .len(),
            1
        );

        let tactics = json!({"tactics": [{"tactic_id": "TA0001", "name": "Initial Access", "techniques": []}]});
        assert_eq!(
            transform_matrix(&tactics, DEFAULT_LOW_COVERAGE_THRESHOLD)
                .unwrap()
                .len(),
            1
        );

        assert!(transform_matrix(&json!({}), DEFAULT_LOW_COVERAGE_THRESHOLD).is_err());
    }

    #[test]
    fn test_technique_record_id_and_count_aliases() {
        let value = json!({"id": "T1059", "name": "Scripting", "count": 4});
        let rec: TechniqueRecord = serde_json::from_value(value).unwrap();
        assert_eq!(rec.effective_id(), "T1059");
        assert_eq!(rec.effective_rule_count(), 4);
    }

    #[test]
    fn test_available_platforms_sorted_dedup() {
        let records = vec![
            TechniqueRecord {
                technique_id: "T1059".into(),
                platforms: vec!["Windows".into(), "Linux".into()],
                ..Default::default()
            },
            TechniqueRecord {
                technique_id: "T1059.001".into(),
                platforms: vec!["Windows".into()],
                ..Default::default()
            },
        ];
        let tactics = vec![group_tactic(
            &RawTactic {
                tactic_id: "TA0002".into(),
                name: "Execution".into(),
                techniques: records,
            },
            DEFAULT_LOW_COVERAGE_THRESHOLD,
        )];
        assert_eq!(available_platforms(&tactics), vec!["Linux", "Windows"]);
    }

    #[test]
    fn test_coverage_report_derives_totals() {
        let value = json!({"techniques": [
            {"technique_id": "T1003", "rule_count": 2},
            {"technique_id": "T1055", "count": 0}
        ]});
        let report = CoverageReport::from_value(&value).unwrap();
        assert_eq!(report.total_techniques, 2);
        assert_eq!(report.covered_techniques, 1);
        assert_eq!(report.coverage_percentage, 50);
        assert!(report.coverage_map().contains_key("T1003"));
    }

    #[test]
    fn test_technique_page_envelope() {
        let value = json!({"items": [{"technique_id": "T1003"}]});
        let page = TechniquePage::from_value(&value).unwrap();
        assert_eq!(page.techniques.len(), 1);
        assert_eq!(page.total, 1);
    }
}
