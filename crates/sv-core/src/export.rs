//! Rule export: request options and CSV flattening.
//!
//! CSV export is a plain flattening of the in-memory rule list; the
//! backend handles server-side exports via `POST /rules/export`.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::filters::RuleFilters;
use crate::rules::RuleSummary;

/// Export formats supported by the backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options for `POST /rules/export`.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportOptions {
    pub format: ExportFormat,
    pub include_enrichments: bool,
    pub include_metadata: bool,
    pub filters: Option<RuleFilters>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            format: ExportFormat::Csv,
            include_enrichments: true,
            include_metadata: true,
            filters: None,
        }
    }
}

impl ExportOptions {
    /// Builds the request body; filters are normalized to the canonical
    /// backend parameter names.
    pub fn to_request_body(&self) -> Value {
        json!({
            "format": self.format.as_str(),
            "include_enrichments": self.include_enrichments,
            "include_metadata": self.include_metadata,
            "filters": self.filters.as_ref().map(|f| f.to_params()),
        })
    }
}

/// Response of `POST /rules/export`: a download URL or an inline payload.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ExportResponse {
    pub export_url: Option<String>,
    pub export_data: Option<Value>,
    pub export_format: Option<String>,
    pub total_rules: u64,
    pub export_timestamp: Option<String>,
}

const CSV_HEADER: &str = "id,source_rule_id,title,severity,status,rule_source,rule_type,has_mitre_mapping,extracted_mitre_count,extracted_cve_count,linked_technique_ids,tags";

/// Flattens rules into CSV, one row per rule.
pub fn rules_to_csv(rules: &[RuleSummary]) -> String {
    let mut out = String::from(CSV_HEADER);
    out.push('\n');

    for rule in rules {
        let row = [
            rule.id.to_string(),
            csv_escape(&rule.source_rule_id),
            csv_escape(&rule.title),
            rule.severity.as_str().to_string(),
            rule.status.as_str().to_string(),
            csv_escape(&rule.rule_source),
            csv_escape(rule.rule_type.as_deref().unwrap_or("")),
            rule.has_mitre_mapping.to_string(),
            rule.extracted_mitre_count.to_string(),
            rule.extracted_cve_count.to_string(),
            csv_escape(&rule.linked_technique_ids.join(";")),
            csv_escape(&rule.tags.join(";")),
        ];
        out.push_str(&row.join(","));
        out.push('\n');
    }

    out
}

/// Quotes a field when it contains a comma, quote, or newline.
fn csv_escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rule(title: &str) -> RuleSummary {
        RuleSummary::from_value(&json!({
            "id": 1,
            "rule_id": "R-1",
            "name": title,
            "is_active": true
        }))
        .unwrap()
    }

    #[test]
    fn test_request_body_normalizes_filters() {
        let options = ExportOptions {
            format: ExportFormat::Json,
            filters: Some(RuleFilters {
                severity: vec!["high".into()],
                ..Default::default()
            }),
            ..Default::default()
        };
        let body = options.to_request_body();
        assert_eq!(body["format"], "json");
        assert_eq!(body["include_enrichments"], true);
        assert_eq!(body["filters"]["severities"], "high");
    }

    #[test]
    fn test_csv_header_and_rows() {
        let csv = rules_to_csv(&[rule("Suspicious PowerShell")]);
        let mut lines = csv.lines();
        assert!(lines.next().unwrap().starts_with("id,source_rule_id,title"));
        let row = lines.next().unwrap();
        assert!(row.contains("Suspicious PowerShell"));
        assert!(row.contains("active"));
    }

    #[test]
    fn test_csv_escaping() {
        let csv = rules_to_csv(&[rule("Detects \"evil\", maybe")]);
        assert!(csv.contains("\"Detects \"\"evil\"\", maybe\""));
    }

    #[test]
    fn test_csv_empty_list_is_header_only() {
        let csv = rules_to_csv(&[]);
        assert_eq!(csv.lines().count(), 1);
    }
}
