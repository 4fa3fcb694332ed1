use crate::models::{BackendErrorBody, BackendSearchParams, SearchQuery, Station, StationsPayload};
use crate::services::gateway::{GatewayError, SearchGateway};
use reqwest::{header, Client, Response};
use serde_json::Value;
use std::time::Duration;

/// Message used when a failing backend gives no `{ "error": ... }` body
pub const DEFAULT_BACKEND_ERROR: &str = "Failed to fetch stations from backend";

/// HTTP client for the station search backend
///
/// Serves two callers:
/// - the controller, through [`SearchGateway`], which gets typed stations
/// - the pass-through route, through [`forward`](Self::forward), which gets
///   the raw result records
pub struct StationApiClient {
    base_url: String,
    search_path: String,
    client: Client,
}

impl StationApiClient {
    /// Create a new client. `timeout` bounds every request.
    pub fn new(
        base_url: String,
        search_path: String,
        timeout: Duration,
    ) -> Result<Self, GatewayError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url,
            search_path,
            client,
        })
    }

    pub fn search_url(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.search_path.trim_start_matches('/')
        )
    }

    async fn send(&self, params: &BackendSearchParams) -> Result<Response, GatewayError> {
        let url = self.search_url();

        tracing::debug!(
            "Searching stations at {} (lat={}, lon={}, distance={}m)",
            url,
            params.latitude,
            params.longitude,
            params.distance
        );

        let response = self
            .client
            .get(&url)
            .header(header::ACCEPT, "application/json")
            .query(params)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body: BackendErrorBody = response.json().await.unwrap_or_default();
            let message = body
                .error
                .unwrap_or_else(|| DEFAULT_BACKEND_ERROR.to_string());
            tracing::warn!("Station backend returned {}: {}", status, message);
            return Err(GatewayError::Backend {
                status_code: status.as_u16(),
                message,
            });
        }

        Ok(response)
    }

    /// Forward a search and unwrap the `results` envelope
    ///
    /// Records come back exactly as the backend sent them. A body without a
    /// `results` array yields an empty list.
    pub async fn forward(&self, params: &BackendSearchParams) -> Result<Vec<Value>, GatewayError> {
        let response = self.send(params).await?;
        let json: Value = response.json().await?;

        let results = json
            .get("results")
            .and_then(|r| r.as_array())
            .cloned()
            .unwrap_or_default();

        tracing::debug!("Forwarding {} station records", results.len());

        Ok(results)
    }
}

impl SearchGateway for StationApiClient {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<Station>, GatewayError> {
        let params = BackendSearchParams::from(query);
        let response = self.send(&params).await?;

        let payload: StationsPayload = response
            .json()
            .await
            .map_err(|e| GatewayError::InvalidResponse(format!("Failed to parse stations: {}", e)))?;

        let stations = payload
            .into_records()
            .into_iter()
            .map(Station::try_from)
            .collect::<Result<Vec<_>, _>>()
            .map_err(GatewayError::InvalidResponse)?;

        tracing::debug!("Stations found: {}", stations.len());

        Ok(stations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_url_joins_cleanly() {
        let client = StationApiClient::new(
            "https://stations.test/api/".to_string(),
            "/search/stations".to_string(),
            Duration::from_secs(5),
        )
        .unwrap();

        assert_eq!(client.search_url(), "https://stations.test/api/search/stations");
    }
}
