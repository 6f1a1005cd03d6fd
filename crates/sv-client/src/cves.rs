//! CVE endpoints.

use sv_core::{CveFilters, CvePage, CveRecord, CveStats, PageRequest};

use crate::client::ApiClient;
use crate::error::ClientResult;

impl ApiClient {
    /// `GET /cves`: paged CVE list.
    pub async fn list_cves(
        &self,
        page: PageRequest,
        filters: &CveFilters,
    ) -> ClientResult<CvePage> {
        let window = sv_core::pagination::page_to_offset(page.page, page.page_size)?;
        let mut params = filters.to_params();
        params.insert("offset".into(), window.offset.to_string());
        params.insert("limit".into(), window.limit.to_string());

        let value = self.http.get_value("/cves", &params).await?;
        Ok(CvePage::from_value(&value)?)
    }

    /// `GET /cves/{id}`: one vulnerability record.
    pub async fn get_cve(&self, id: &str) -> ClientResult<CveRecord> {
        let value = self
            .http
            .get_value(&format!("/cves/{id}"), &Self::no_params())
            .await?;
        Ok(CveRecord::from_value(&value)?)
    }

    /// `GET /cves/stats`: CVE aggregate statistics.
    pub async fn cve_stats(&self) -> ClientResult<CveStats> {
        self.http.get_json("/cves/stats", &Self::no_params()).await
    }
}
