//! Filter-option and global-search endpoints.

use sv_core::{FilterOptions, PageRequest, SearchResults};

use crate::client::ApiClient;
use crate::error::ClientResult;
use crate::staleness::fingerprint;

impl ApiClient {
    /// `GET /filters/options`: the filter-option catalog, cached.
    pub async fn filter_options(&self) -> ClientResult<FilterOptions> {
        let key = fingerprint("/filters/options", &Self::no_params());
        self.options_cache
            .get_or_try_insert_with(key, || async {
                self.http
                    .get_json("/filters/options", &Self::no_params())
                    .await
            })
            .await
    }

    /// `GET /search`: global search across rules, techniques, and CVEs.
    pub async fn search(
        &self,
        query: &str,
        page: PageRequest,
        types: &[String],
    ) -> ClientResult<SearchResults> {
        let window = sv_core::pagination::page_to_offset(page.page, page.page_size)?;
        let mut params = Self::no_params();
        params.insert("query".into(), query.to_string());
        params.insert("offset".into(), window.offset.to_string());
        params.insert("limit".into(), window.limit.to_string());
        let joined = types
            .iter()
            .filter(|t| !t.trim().is_empty())
            .cloned()
            .collect::<Vec<_>>()
            .join(",");
        if !joined.is_empty() {
            params.insert("types".into(), joined);
        }

        let value = self.http.get_value("/search", &params).await?;
        Ok(SearchResults::from_value(&value, query)?)
    }
}
