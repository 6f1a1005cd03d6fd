//! In-memory mock of [`SecOpsApi`] for tests and offline development.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::{json, Value};
use sv_core::mitre::{group_tactic, sort_tactics, RawTactic};
use sv_core::{
    AffectedRules, CoverageReport, CveFilters, CvePage, CveRecord, CveStats, DailyActivity,
    DashboardData, DeprecationStatistics, ExportOptions, ExportResponse, FilterOptions,
    Granularity, GroupedTactic, PageRequest, RuleDeprecationCheck, RuleDetail, RuleFilters,
    RulePage, RuleStatsResponse, SearchResults, SortSpec, TacticInfo, TechniquePage,
    UpdateMappingsOptions, UpdateMappingsResponse,
};

use crate::error::{ClientError, ClientResult};
use crate::traits::SecOpsApi;

/// Mock backend serving canned data with honest pagination and filter
/// behavior for the list endpoints.
#[derive(Default)]
pub struct MockApi {
    pub rules: Vec<sv_core::RuleSummary>,
    pub rule_details: HashMap<i64, RuleDetail>,
    pub tactics: Vec<RawTactic>,
    pub cves: Vec<CveRecord>,
    pub dashboard: DashboardData,
    pub daily_activity: Vec<DailyActivity>,
    pub filter_options: FilterOptions,
    pub deprecation: DeprecationStatistics,
    pub low_coverage_threshold: u32,
}

impl MockApi {
    pub fn new() -> Self {
        Self {
            low_coverage_threshold: sv_core::mitre::DEFAULT_LOW_COVERAGE_THRESHOLD,
            ..Default::default()
        }
    }

    fn not_found(what: impl Into<String>) -> ClientError {
        ClientError::Http {
            status: 404,
            message: what.into(),
            body: None,
        }
    }

    fn matches(rule: &sv_core::RuleSummary, filters: &RuleFilters) -> bool {
        if let Some(query) = filters.effective_query() {
            let query = query.to_ascii_lowercase();
            if !rule.title.to_ascii_lowercase().contains(&query)
                && !rule.source_rule_id.to_ascii_lowercase().contains(&query)
            {
                return false;
            }
        }
        let severities = filters.effective_severities();
        if !severities.is_empty()
            && !severities
                .iter()
                .any(|s| s.eq_ignore_ascii_case(rule.severity.as_str()))
        {
            return false;
        }
        if let Some(active) = filters.is_active {
            if rule.status.is_active() != active {
                return false;
            }
        }
        if let Some(has_mitre) = filters.effective_has_mitre() {
            if rule.has_mitre_mapping != has_mitre {
                return false;
            }
        }
        true
    }

    fn paginate<T: Clone>(items: &[T], page: PageRequest) -> (Vec<T>, u64) {
        let window = page.to_offset();
        let total = items.len() as u64;
        let start = (window.offset as usize).min(items.len());
        let end = (start + window.limit as usize).min(items.len());
        (items[start..end].to_vec(), total)
    }
}

#[async_trait]
impl SecOpsApi for MockApi {
    async fn list_rules(
        &self,
        page: PageRequest,
        _sort: Option<&SortSpec>,
        filters: &RuleFilters,
    ) -> ClientResult<RulePage> {
        let filtered: Vec<_> = self
            .rules
            .iter()
            .filter(|r| Self::matches(r, filters))
            .cloned()
            .collect();
        let (rules, total) = Self::paginate(&filtered, page);
        let window = page.to_offset();
        let meta = sv_core::pagination::pagination_meta(window.offset, window.limit, total)?;

        Ok(RulePage {
            rules,
            total,
            offset: window.offset,
            limit: window.limit,
            page: meta.page,
            total_pages: meta.total_pages,
            has_more: meta.has_next,
            facets: None,
        })
    }

    async fn get_rule(&self, id: i64) -> ClientResult<RuleDetail> {
        self.rule_details
            .get(&id)
            .cloned()
            .ok_or_else(|| Self::not_found(format!("rule {id} not found")))
    }

    async fn rule_stats(&self, filters: Option<&RuleFilters>) -> ClientResult<RuleStatsResponse> {
        let default_filters = RuleFilters::default();
        let filters = filters.unwrap_or(&default_filters);
        let mut stats = RuleStatsResponse {
            total_rules: 0,
            ..Default::default()
        };
        for rule in self.rules.iter().filter(|r| Self::matches(r, filters)) {
            stats.total_rules += 1;
            if rule.status.is_active() {
                stats.active_rules += 1;
            } else {
                stats.inactive_rules += 1;
            }
            *stats
                .stats
                .by_severity
                .entry(rule.severity.as_str().to_string())
                .or_insert(0) += 1;
            if rule.has_mitre_mapping {
                stats.enrichment.rules_with_mitre += 1;
            }
            if rule.has_cve_references {
                stats.enrichment.rules_with_cves += 1;
            }
        }
        Ok(stats)
    }

    async fn rule_enrichment(&self) -> ClientResult<Value> {
        Ok(json!({
            "rules_with_mitre": self.rules.iter().filter(|r| r.has_mitre_mapping).count(),
            "rules_with_cves": self.rules.iter().filter(|r| r.has_cve_references).count(),
        }))
    }

    async fn export_rules(&self, options: &ExportOptions) -> ClientResult<ExportResponse> {
        Ok(ExportResponse {
            export_data: Some(json!(sv_core::export::rules_to_csv(&self.rules))),
            export_format: Some(options.format.as_str().to_string()),
            total_rules: self.rules.len() as u64,
            ..Default::default()
        })
    }

    async fn mitre_matrix(&self, _platforms: &[String]) -> ClientResult<Vec<GroupedTactic>> {
        let mut grouped: Vec<GroupedTactic> = self
            .tactics
            .iter()
            .map(|t| group_tactic(t, self.low_coverage_threshold))
            .collect();
        sort_tactics(&mut grouped);
        Ok(grouped)
    }

    async fn mitre_coverage(&self) -> ClientResult<CoverageReport> {
        let techniques: Vec<_> = self
            .tactics
            .iter()
            .flat_map(|t| t.techniques.iter())
            .cloned()
            .collect();
        let total = techniques.len() as u32;
        let covered = techniques
            .iter()
            .filter(|t| t.effective_rule_count() > 0)
            .count() as u32;
        Ok(CoverageReport {
            coverage_percentage: sv_core::stats::coverage_percentage(
                u64::from(covered),
                u64::from(total),
            ),
            techniques,
            total_techniques: total,
            covered_techniques: covered,
        })
    }

    async fn list_techniques(
        &self,
        page: PageRequest,
        query: Option<&str>,
    ) -> ClientResult<TechniquePage> {
        let query = query.map(str::to_ascii_lowercase);
        let filtered: Vec<_> = self
            .tactics
            .iter()
            .flat_map(|t| t.techniques.iter())
            .filter(|t| match &query {
                Some(q) => {
                    t.name.to_ascii_lowercase().contains(q)
                        || t.effective_id().to_ascii_lowercase().contains(q)
                }
                None => true,
            })
            .cloned()
            .collect();
        let (techniques, total) = Self::paginate(&filtered, page);
        Ok(TechniquePage { techniques, total })
    }

    async fn list_tactics(&self) -> ClientResult<Vec<TacticInfo>> {
        Ok(self
            .tactics
            .iter()
            .map(|t| TacticInfo {
                tactic_id: t.tactic_id.clone(),
                name: t.name.clone(),
            })
            .collect())
    }

    async fn list_cves(&self, page: PageRequest, filters: &CveFilters) -> ClientResult<CvePage> {
        let filtered: Vec<_> = self
            .cves
            .iter()
            .filter(|cve| {
                if let Some(query) = filters.query.as_deref() {
                    let query = query.to_ascii_lowercase();
                    let in_id = cve.cve_id.to_ascii_lowercase().contains(&query);
                    let in_description = cve
                        .description
                        .as_deref()
                        .is_some_and(|d| d.to_ascii_lowercase().contains(&query));
                    if !in_id && !in_description {
                        return false;
                    }
                }
                if !filters.severities.is_empty()
                    && !filters
                        .severities
                        .iter()
                        .any(|s| s.eq_ignore_ascii_case(cve.severity.as_str()))
                {
                    return false;
                }
                if filters.with_rules_only == Some(true) && cve.rule_count == 0 {
                    return false;
                }
                true
            })
            .cloned()
            .collect();
        let (cves, total) = Self::paginate(&filtered, page);
        Ok(CvePage { cves, total })
    }

    async fn get_cve(&self, id: &str) -> ClientResult<CveRecord> {
        self.cves
            .iter()
            .find(|c| c.cve_id == id)
            .cloned()
            .ok_or_else(|| Self::not_found(format!("{id} not found")))
    }

    async fn cve_stats(&self) -> ClientResult<CveStats> {
        let mut stats = CveStats {
            total_cves: self.cves.len() as u64,
            ..Default::default()
        };
        for cve in &self.cves {
            if cve.rule_count > 0 {
                stats.cves_with_rules += 1;
            }
            *stats
                .by_severity
                .entry(cve.severity.as_str().to_string())
                .or_insert(0) += 1;
        }
        Ok(stats)
    }

    async fn filter_options(&self) -> ClientResult<FilterOptions> {
        Ok(self.filter_options.clone())
    }

    async fn search(
        &self,
        query: &str,
        page: PageRequest,
        _types: &[String],
    ) -> ClientResult<SearchResults> {
        let filters = RuleFilters {
            query: Some(query.to_string()),
            ..Default::default()
        };
        let rules = self.list_rules(page, None, &filters).await?.rules;
        let cve_filters = CveFilters {
            query: Some(query.to_string()),
            ..Default::default()
        };
        let cves = self.list_cves(page, &cve_filters).await?.cves;
        let techniques = self.list_techniques(page, Some(query)).await?.techniques;

        Ok(SearchResults {
            total_results: (rules.len() + techniques.len() + cves.len()) as u64,
            rules,
            techniques,
            cves,
            search_query: query.to_string(),
        })
    }

    async fn dashboard(&self) -> ClientResult<DashboardData> {
        Ok(self.dashboard.clone())
    }

    async fn trends(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        _granularity: Granularity,
    ) -> ClientResult<Vec<DailyActivity>> {
        Ok(self
            .daily_activity
            .iter()
            .filter(|d| d.date.map_or(true, |date| date >= start && date <= end))
            .cloned()
            .collect())
    }

    async fn deprecation_statistics(&self) -> ClientResult<DeprecationStatistics> {
        Ok(self.deprecation.clone())
    }

    async fn affected_rules(&self, technique_id: Option<&str>) -> ClientResult<AffectedRules> {
        let rules: Vec<_> = self
            .rules
            .iter()
            .filter(|r| match technique_id {
                Some(id) => r.linked_technique_ids.iter().any(|t| t == id),
                None => !r.linked_technique_ids.is_empty(),
            })
            .cloned()
            .collect();
        Ok(AffectedRules {
            total: rules.len() as u64,
            rules,
            by_technique: HashMap::new(),
        })
    }

    async fn check_rule_deprecation(&self, rule_id: &str) -> ClientResult<RuleDeprecationCheck> {
        Ok(RuleDeprecationCheck {
            rule_id: rule_id.to_string(),
            ..Default::default()
        })
    }

    async fn update_deprecated_mappings(
        &self,
        options: &UpdateMappingsOptions,
    ) -> ClientResult<UpdateMappingsResponse> {
        Ok(UpdateMappingsResponse {
            updated_rules: options.rule_ids.len() as u64,
            dry_run: options.dry_run,
            ..Default::default()
        })
    }
}
