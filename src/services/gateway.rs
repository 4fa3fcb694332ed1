use std::future::Future;

use thiserror::Error;

use crate::models::{SearchQuery, Station};

/// Errors that can occur when querying the station backend
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Backend returned status {status_code}: {message}")]
    Backend { status_code: u16, message: String },

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Remote "stations near a point" lookup.
///
/// One call to [`search`](SearchGateway::search) is one outbound request. An
/// empty result is a success. Retries, caching and ordering of concurrent
/// calls are left to the caller.
pub trait SearchGateway: Send + Sync + 'static {
    fn search(
        &self,
        query: &SearchQuery,
    ) -> impl Future<Output = Result<Vec<Station>, GatewayError>> + Send;
}
