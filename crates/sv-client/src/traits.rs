//! The API facade trait.
//!
//! Consumers (the CLI, view layers, tests) talk to this trait rather
//! than the concrete client, so an in-memory mock can stand in for the
//! backend.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::Value;
use sv_core::{
    AffectedRules, CoverageReport, CveFilters, CvePage, CveRecord, CveStats, DailyActivity,
    DashboardData, DeprecationStatistics, ExportOptions, ExportResponse, FilterOptions,
    Granularity, GroupedTactic, PageRequest, RuleDeprecationCheck, RuleDetail, RuleFilters,
    RulePage, RuleStatsResponse, SearchResults, SortSpec, TacticInfo, TechniquePage,
    UpdateMappingsOptions, UpdateMappingsResponse,
};

use crate::client::ApiClient;
use crate::error::ClientResult;

/// Read/operate surface of the Sigview backend.
#[async_trait]
pub trait SecOpsApi: Send + Sync {
    async fn list_rules(
        &self,
        page: PageRequest,
        sort: Option<&SortSpec>,
        filters: &RuleFilters,
    ) -> ClientResult<RulePage>;

    async fn get_rule(&self, id: i64) -> ClientResult<RuleDetail>;

    async fn rule_stats(&self, filters: Option<&RuleFilters>) -> ClientResult<RuleStatsResponse>;

    async fn rule_enrichment(&self) -> ClientResult<Value>;

    async fn export_rules(&self, options: &ExportOptions) -> ClientResult<ExportResponse>;

    async fn mitre_matrix(&self, platforms: &[String]) -> ClientResult<Vec<GroupedTactic>>;

    async fn mitre_coverage(&self) -> ClientResult<CoverageReport>;

    async fn list_techniques(
        &self,
        page: PageRequest,
        query: Option<&str>,
    ) -> ClientResult<TechniquePage>;

    async fn list_tactics(&self) -> ClientResult<Vec<TacticInfo>>;

    async fn list_cves(&self, page: PageRequest, filters: &CveFilters) -> ClientResult<CvePage>;

    async fn get_cve(&self, id: &str) -> ClientResult<CveRecord>;

    async fn cve_stats(&self) -> ClientResult<CveStats>;

    async fn filter_options(&self) -> ClientResult<FilterOptions>;

    async fn search(
        &self,
        query: &str,
        page: PageRequest,
        types: &[String],
    ) -> ClientResult<SearchResults>;

    async fn dashboard(&self) -> ClientResult<DashboardData>;

    async fn trends(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        granularity: Granularity,
    ) -> ClientResult<Vec<DailyActivity>>;

    async fn deprecation_statistics(&self) -> ClientResult<DeprecationStatistics>;

    async fn affected_rules(&self, technique_id: Option<&str>) -> ClientResult<AffectedRules>;

    async fn check_rule_deprecation(&self, rule_id: &str) -> ClientResult<RuleDeprecationCheck>;

    async fn update_deprecated_mappings(
        &self,
        options: &UpdateMappingsOptions,
    ) -> ClientResult<UpdateMappingsResponse>;
}

#[async_trait]
impl SecOpsApi for ApiClient {
    async fn list_rules(
        &self,
        page: PageRequest,
        sort: Option<&SortSpec>,
        filters: &RuleFilters,
    ) -> ClientResult<RulePage> {
        ApiClient::list_rules(self, page, sort, filters).await
    }

    async fn get_rule(&self, id: i64) -> ClientResult<RuleDetail> {
        ApiClient::get_rule(self, id).await
    }

    async fn rule_stats(&self, filters: Option<&RuleFilters>) -> ClientResult<RuleStatsResponse> {
        ApiClient::rule_stats(self, filters).await
    }

    async fn rule_enrichment(&self) -> ClientResult<Value> {
        ApiClient::rule_enrichment(self).await
    }

    async fn export_rules(&self, options: &ExportOptions) -> ClientResult<ExportResponse> {
        ApiClient::export_rules(self, options).await
    }

    async fn mitre_matrix(&self, platforms: &[String]) -> ClientResult<Vec<GroupedTactic>> {
        ApiClient::mitre_matrix(self, platforms).await
    }

    async fn mitre_coverage(&self) -> ClientResult<CoverageReport> {
        ApiClient::mitre_coverage(self).await
    }

    async fn list_techniques(
        &self,
        page: PageRequest,
        query: Option<&str>,
    ) -> ClientResult<TechniquePage> {
        ApiClient::list_techniques(self, page, query).await
    }

    async fn list_tactics(&self) -> ClientResult<Vec<TacticInfo>> {
        ApiClient::list_tactics(self).await
    }

    async fn list_cves(&self, page: PageRequest, filters: &CveFilters) -> ClientResult<CvePage> {
        ApiClient::list_cves(self, page, filters).await
    }

    async fn get_cve(&self, id: &str) -> ClientResult<CveRecord> {
        ApiClient::get_cve(self, id).await
    }

    async fn cve_stats(&self) -> ClientResult<CveStats> {
        ApiClient::cve_stats(self).await
    }

    async fn filter_options(&self) -> ClientResult<FilterOptions> {
        ApiClient::filter_options(self).await
    }

    async fn search(
        &self,
        query: &str,
        page: PageRequest,
        types: &[String],
    ) -> ClientResult<SearchResults> {
        ApiClient::search(self, query, page, types).await
    }

    async fn dashboard(&self) -> ClientResult<DashboardData> {
        ApiClient::dashboard(self).await
    }

    async fn trends(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        granularity: Granularity,
    ) -> ClientResult<Vec<DailyActivity>> {
        ApiClient::trends(self, start, end, granularity).await
    }

    async fn deprecation_statistics(&self) -> ClientResult<DeprecationStatistics> {
        ApiClient::deprecation_statistics(self).await
    }

    async fn affected_rules(&self, technique_id: Option<&str>) -> ClientResult<AffectedRules> {
        ApiClient::affected_rules(self, technique_id).await
    }

    async fn check_rule_deprecation(&self, rule_id: &str) -> ClientResult<RuleDeprecationCheck> {
        ApiClient::check_rule_deprecation(self, rule_id).await
    }

    async fn update_deprecated_mappings(
        &self,
        options: &UpdateMappingsOptions,
    ) -> ClientResult<UpdateMappingsResponse> {
        ApiClient::update_deprecated_mappings(self, options).await
    }
}
