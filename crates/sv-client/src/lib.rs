//! # sv-client
//!
//! Async REST client for the Sigview backend.
//!
//! The backend is a fixed collaborator with an occasionally inconsistent
//! JSON contract; every response body passes through the `sv-core`
//! transformers before reaching a caller. The client adds the transport
//! concerns on top: bearer-token auth, bounded retry for transient
//! failures, a staleness guard so superseded fetches never overwrite
//! newer state, and a short-lived response cache for slow-moving
//! resources.

pub mod cache;
pub mod client;
pub mod error;
pub mod http;
pub mod mock;
pub mod staleness;
pub mod token;
pub mod traits;

mod analytics;
mod cves;
mod deprecation;
mod mitre;
mod rules;
mod search;

pub use cache::ResponseCache;
pub use client::{ApiClient, ApiClientConfig};
pub use error::{ClientError, ClientResult};
pub use http::{HttpClient, HttpConfig};
pub use mock::MockApi;
pub use staleness::{FetchTicket, StalenessGuard};
pub use token::{BearerToken, TokenStore};
pub use traits::SecOpsApi;
