//! MITRE ATT&CK endpoints.

use sv_core::mitre::{transform_matrix, transform_tactics};
use sv_core::{CoverageReport, GroupedTactic, PageRequest, TacticInfo, TechniquePage};

use crate::client::ApiClient;
use crate::error::ClientResult;
use crate::staleness::fingerprint;

impl ApiClient {
    /// `GET /mitre/matrix`: the tactic/technique matrix, grouped into
    /// the two-level hierarchy and cached per platform selection.
    pub async fn mitre_matrix(&self, platforms: &[String]) -> ClientResult<Vec<GroupedTactic>> {
        let mut params = Self::no_params();
        let joined = platforms
            .iter()
            .filter(|p| !p.trim().is_empty())
            .cloned()
            .collect::<Vec<_>>()
            .join(",");
        if !joined.is_empty() {
            params.insert("platforms".into(), joined);
        }

        let key = fingerprint("/mitre/matrix", &params);
        let threshold = self.low_coverage_threshold;
        self.matrix_cache
            .get_or_try_insert_with(key, || async {
                let value = self.http.get_value("/mitre/matrix", &params).await?;
                Ok(transform_matrix(&value, threshold)?)
            })
            .await
    }

    /// `GET /mitre/coverage`: per-technique coverage counts.
    pub async fn mitre_coverage(&self) -> ClientResult<CoverageReport> {
        let value = self
            .http
            .get_value("/mitre/coverage", &Self::no_params())
            .await?;
        Ok(CoverageReport::from_value(&value)?)
    }

    /// `GET /mitre/techniques`: paged technique listing with free-text
    /// search.
    pub async fn list_techniques(
        &self,
        page: PageRequest,
        query: Option<&str>,
    ) -> ClientResult<TechniquePage> {
        let window = sv_core::pagination::page_to_offset(page.page, page.page_size)?;
        let mut params = Self::no_params();
        params.insert("offset".into(), window.offset.to_string());
        params.insert("limit".into(), window.limit.to_string());
        if let Some(query) = query.filter(|q| !q.trim().is_empty()) {
            params.insert("query".into(), query.to_string());
        }

        let value = self.http.get_value("/mitre/techniques", &params).await?;
        Ok(TechniquePage::from_value(&value)?)
    }

    /// `GET /mitre/tactics`: the tactic catalog.
    pub async fn list_tactics(&self) -> ClientResult<Vec<TacticInfo>> {
        let value = self
            .http
            .get_value("/mitre/tactics", &Self::no_params())
            .await?;
        Ok(transform_tactics(&value)?)
    }
}
