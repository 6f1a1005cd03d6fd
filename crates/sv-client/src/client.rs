//! The Sigview API client.

use std::collections::BTreeMap;
use std::time::Duration;

use sv_core::mitre::DEFAULT_LOW_COVERAGE_THRESHOLD;
use sv_core::{FilterOptions, GroupedTactic};

use crate::cache::ResponseCache;
use crate::error::ClientResult;
use crate::http::{HttpClient, HttpConfig};
use crate::staleness::StalenessGuard;
use crate::token::TokenStore;

/// The matrix changes only on ATT&CK releases.
const MATRIX_CACHE_TTL: Duration = Duration::from_secs(30 * 60);

/// Filter options shift as rules are ingested, so the window is shorter.
const OPTIONS_CACHE_TTL: Duration = Duration::from_secs(5 * 60);

/// Configuration for [`ApiClient`].
#[derive(Debug, Clone)]
pub struct ApiClientConfig {
    /// Base URL of the backend API.
    pub base_url: String,
    /// Initial bearer token, if already authenticated.
    pub token: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Maximum automatic retries for transient failures.
    pub max_retries: u32,
    /// Rule-count threshold separating low from high coverage.
    pub low_coverage_threshold: u32,
}

impl Default for ApiClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/api".to_string(),
            token: None,
            timeout_secs: 30,
            max_retries: 2,
            low_coverage_threshold: DEFAULT_LOW_COVERAGE_THRESHOLD,
        }
    }
}

/// Typed client over the Sigview REST backend.
///
/// Every response passes through the `sv-core` transformers, so callers
/// only ever see normalized view models.
pub struct ApiClient {
    pub(crate) http: HttpClient,
    tokens: TokenStore,
    guard: StalenessGuard,
    pub(crate) matrix_cache: ResponseCache<Vec<GroupedTactic>>,
    pub(crate) options_cache: ResponseCache<FilterOptions>,
    pub(crate) low_coverage_threshold: u32,
}

impl ApiClient {
    pub fn new(config: ApiClientConfig) -> ClientResult<Self> {
        let tokens = match &config.token {
            Some(token) => TokenStore::with_token(token.clone()),
            None => TokenStore::new(),
        };
        let http = HttpClient::new(
            HttpConfig {
                base_url: config.base_url,
                timeout_secs: config.timeout_secs,
                max_retries: config.max_retries,
            },
            tokens.clone(),
        )?;

        Ok(Self {
            http,
            tokens,
            guard: StalenessGuard::new(),
            matrix_cache: ResponseCache::new(MATRIX_CACHE_TTL, 16),
            options_cache: ResponseCache::new(OPTIONS_CACHE_TTL, 4),
            low_coverage_threshold: config.low_coverage_threshold,
        })
    }

    /// The shared token slot; `set` after re-authentication, cleared
    /// automatically on a 401.
    pub fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    /// The staleness guard for list fetches.
    pub fn staleness(&self) -> &StalenessGuard {
        &self.guard
    }

    pub(crate) fn no_params() -> BTreeMap<String, String> {
        BTreeMap::new()
    }
}
