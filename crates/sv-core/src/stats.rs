//! Dashboard aggregate-statistics derivation.
//!
//! Folds backend distribution maps and trend arrays into the percentages
//! and summaries the dashboard panels display.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Granularity for trend queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    #[default]
    Day,
    Week,
    Month,
}

impl Granularity {
    /// Parses the wire representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "day" => Some(Granularity::Day),
            "week" => Some(Granularity::Week),
            "month" => Some(Granularity::Month),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Granularity::Day => "day",
            Granularity::Week => "week",
            Granularity::Month => "month",
        }
    }
}

impl std::fmt::Display for Granularity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rounded percentage of `covered` over `total`; 0 when `total` is 0, so
/// empty data never produces NaN or infinity.
pub fn coverage_percentage(covered: u64, total: u64) -> u32 {
    if total == 0 {
        return 0;
    }
    ((covered as f64 / total as f64) * 100.0).round() as u32
}

/// One row of a distribution breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BreakdownEntry {
    pub label: String,
    pub value: u64,
    pub percentage: u32,
}

/// Folds a label→count distribution into display rows: percentage per
/// label against the distribution total, sorted descending by count,
/// truncated to `top_n`.
///
/// The remainder past `top_n` is dropped, not summed into an "other"
/// bucket; the panels assume dropped-remainder semantics.
pub fn breakdown(distribution: &HashMap<String, u64>, top_n: usize) -> Vec<BreakdownEntry> {
    let total: u64 = distribution.values().sum();

    let mut entries: Vec<BreakdownEntry> = distribution
        .iter()
        .map(|(label, value)| BreakdownEntry {
            label: label.clone(),
            value: *value,
            percentage: if total > 0 {
                ((*value as f64 / total as f64) * 100.0).round() as u32
            } else {
                0
            },
        })
        .collect();

    // Ties break on label so the ordering stays deterministic.
    entries.sort_by(|a, b| b.value.cmp(&a.value).then(a.label.cmp(&b.label)));
    entries.truncate(top_n);
    entries
}

/// One day of rule activity in a trend series.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DailyActivity {
    pub date: Option<NaiveDate>,
    pub rules_created: u64,
    pub rules_updated: u64,
}

/// Rollup of a daily activity series.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TrendSummary {
    pub total_created: u64,
    pub total_updated: u64,
    /// `round(total / days)`, with an empty series treated as one day.
    pub average_per_day: u64,
}

/// Folds a daily time series into totals and a per-day average.
pub fn trend_summary(daily: &[DailyActivity]) -> TrendSummary {
    let total_created: u64 = daily.iter().map(|d| d.rules_created).sum();
    let total_updated: u64 = daily.iter().map(|d| d.rules_updated).sum();
    let days = daily.len().max(1) as f64;

    TrendSummary {
        total_created,
        total_updated,
        average_per_day: ((total_created + total_updated) as f64 / days).round() as u64,
    }
}

/// Headline metrics on the dashboard payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardMetrics {
    pub total_rules: u64,
    pub active_rules: u64,
    pub inactive_rules: u64,
    pub rules_with_mitre: u64,
    pub rules_with_cves: u64,
    pub rules_with_both: u64,
}

/// Distribution maps on the dashboard payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardDistributions {
    pub by_severity: HashMap<String, u64>,
    pub by_platform: HashMap<String, u64>,
    pub by_source: HashMap<String, u64>,
}

/// Coverage block on the dashboard payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardCoverage {
    pub total_techniques: u64,
    pub covered_techniques: u64,
    pub coverage_percentage: u32,
}

/// Trend block on the dashboard payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardTrends {
    pub daily_activity: Vec<DailyActivity>,
}

/// The `GET /analytics/dashboard` payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardData {
    pub metrics: DashboardMetrics,
    pub distributions: DashboardDistributions,
    pub coverage: DashboardCoverage,
    pub trends: DashboardTrends,
}

impl DashboardData {
    /// Share of rules with MITRE enrichment, rounded.
    pub fn enrichment_percentage(&self) -> u32 {
        coverage_percentage(self.metrics.rules_with_mitre, self.metrics.total_rules)
    }

    /// Number of distinct platforms in the platform distribution.
    pub fn platform_count(&self) -> usize {
        self.distributions.by_platform.len()
    }

    /// Severity rows for the donut chart.
    pub fn severity_breakdown(&self, top_n: usize) -> Vec<BreakdownEntry> {
        breakdown(&self.distributions.by_severity, top_n)
    }

    /// Source rows for the top-sources panel.
    pub fn source_breakdown(&self, top_n: usize) -> Vec<BreakdownEntry> {
        breakdown(&self.distributions.by_source, top_n)
    }

    /// Trend rollup for the activity panel.
    pub fn trend_summary(&self) -> TrendSummary {
        trend_summary(&self.trends.daily_activity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn distribution(pairs: &[(&str, u64)]) -> HashMap<String, u64> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_coverage_percentage_boundaries() {
        assert_eq!(coverage_percentage(0, 0), 0);
        assert_eq!(coverage_percentage(5, 5), 100);
        assert_eq!(coverage_percentage(1, 3), 33);
        assert_eq!(coverage_percentage(2, 3), 67);
    }

    #[test]
    fn test_breakdown_sorted_and_percentages() {
        let rows = breakdown(
            &distribution(&[("high", 30), ("critical", 50), ("low", 20)]),
            10,
        );
        assert_eq!(rows[0].label, "critical");
        assert_eq!(rows[0].percentage, 50);
        assert_eq!(rows[1].label, "high");
        assert_eq!(rows[2].percentage, 20);
    }

    #[test]
    fn test_breakdown_truncates_and_drops_remainder() {
        let rows = breakdown(
            &distribution(&[("a", 5), ("b", 4), ("c", 3), ("d", 2)]),
            2,
        );
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].label, "a");
        assert_eq!(rows[1].label, "b");
        // Percentages are computed against the full total, not the shown rows.
        assert_eq!(rows[0].percentage, 36);
    }

    #[test]
    fn test_breakdown_zero_total() {
        let rows = breakdown(&distribution(&[("empty", 0)]), 5);
        assert_eq!(rows[0].percentage, 0);
    }

    #[test]
    fn test_breakdown_tie_is_deterministic() {
        let rows = breakdown(&distribution(&[("b", 3), ("a", 3)]), 5);
        assert_eq!(rows[0].label, "a");
        assert_eq!(rows[1].label, "b");
    }

    #[test]
    fn test_trend_summary_average() {
        let daily = vec![
            DailyActivity {
                rules_created: 4,
                rules_updated: 2,
                ..Default::default()
            },
            DailyActivity {
                rules_created: 1,
                rules_updated: 0,
                ..Default::default()
            },
        ];
        let summary = trend_summary(&daily);
        assert_eq!(summary.total_created, 5);
        assert_eq!(summary.total_updated, 2);
        assert_eq!(summary.average_per_day, 4);
    }

    #[test]
    fn test_trend_summary_empty_series() {
        let summary = trend_summary(&[]);
        assert_eq!(summary.average_per_day, 0);
    }

    #[test]
    fn test_dashboard_derived_metrics() {
        let data = DashboardData {
            metrics: DashboardMetrics {
                total_rules: 200,
                rules_with_mitre: 60,
                ..Default::default()
            },
            distributions: DashboardDistributions {
                by_platform: distribution(&[("windows", 10), ("linux", 5)]),
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(data.enrichment_percentage(), 30);
        assert_eq!(data.platform_count(), 2);
    }
}
