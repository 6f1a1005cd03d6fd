//! Rule endpoints.

use serde_json::Value;
use sv_core::filters::build_query_params;
use sv_core::{
    ExportOptions, ExportResponse, PageRequest, RuleDetail, RuleFilters, RulePage,
    RuleStatsResponse, SortSpec,
};
use tracing::instrument;

use crate::client::ApiClient;
use crate::error::ClientResult;
use crate::staleness::fingerprint;

impl ApiClient {
    /// `GET /rules`: paged rule list with optional facet counts.
    #[instrument(skip_all, fields(page = page.page))]
    pub async fn list_rules(
        &self,
        page: PageRequest,
        sort: Option<&SortSpec>,
        filters: &RuleFilters,
    ) -> ClientResult<RulePage> {
        let params = build_query_params(Some(page), sort, Some(filters))?;
        let value = self.http.get_value("/rules", &params).await?;
        Ok(RulePage::from_value(&value, page.page_size)?)
    }

    /// [`list_rules`](Self::list_rules) under the staleness guard:
    /// returns `None` when a newer fetch for the same parameter set was
    /// started while this one was in flight.
    pub async fn list_rules_guarded(
        &self,
        page: PageRequest,
        sort: Option<&SortSpec>,
        filters: &RuleFilters,
    ) -> ClientResult<Option<RulePage>> {
        let params = build_query_params(Some(page), sort, Some(filters))?;
        let ticket = self.staleness().begin(fingerprint("/rules", &params));

        let value = self.http.get_value("/rules", &params).await?;
        if !self.staleness().admit(&ticket) {
            return Ok(None);
        }
        Ok(Some(RulePage::from_value(&value, page.page_size)?))
    }

    /// `GET /rules/{id}`: full rule detail.
    pub async fn get_rule(&self, id: i64) -> ClientResult<RuleDetail> {
        let value = self
            .http
            .get_value(&format!("/rules/{id}"), &Self::no_params())
            .await?;
        Ok(RuleDetail::from_value(&value)?)
    }

    /// `GET /rules/stats`: aggregate rule statistics, optionally scoped
    /// by the active filters.
    pub async fn rule_stats(
        &self,
        filters: Option<&RuleFilters>,
    ) -> ClientResult<RuleStatsResponse> {
        let params = filters.map(RuleFilters::to_params).unwrap_or_default();
        let value = self.http.get_value("/rules/stats", &params).await?;
        Ok(RuleStatsResponse::from_value(&value)?)
    }

    /// `GET /rules/enrichment`: enrichment statistics, passed through.
    pub async fn rule_enrichment(&self) -> ClientResult<Value> {
        self.http
            .get_value("/rules/enrichment", &Self::no_params())
            .await
    }

    /// `POST /rules/export`: server-side export.
    pub async fn export_rules(&self, options: &ExportOptions) -> ClientResult<ExportResponse> {
        self.http
            .post_json("/rules/export", &options.to_request_body())
            .await
    }
}
