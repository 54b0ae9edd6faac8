use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::range::DisplayRange;
use crate::upstream::models::{
    DurationCurveResponse, FlowHistogramResponse, MeasurementsResponse, Station,
};

pub struct PortalClient {
    http_client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl PortalClient {
    #[must_use]
    pub fn new(config: &Config) -> Self {
        let http_client = Client::builder()
            .danger_accept_invalid_certs(config.upstream_skip_tls_verify)
            .timeout(Duration::from_secs(120)) // full-history series can be large
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http_client,
            base_url: config.upstream_base_url.trim_end_matches('/').to_string(),
            api_key: config.upstream_api_key.clone(),
        }
    }

    /// List flow meters with their precomputed statistics.
    ///
    /// # Errors
    ///
    /// Returns `AppError::UpstreamApi` if the request fails or returns an error status.
    pub async fn get_stations(&self) -> AppResult<Vec<Station>> {
        self.get_json("misuratori/", &[]).await
    }

    /// Fetch raw and smoothed flow series for one meter over a display range.
    ///
    /// # Errors
    ///
    /// Returns `AppError::UpstreamApi` if the request fails or returns an error status.
    pub async fn get_measurements(
        &self,
        station_id: &str,
        range: DisplayRange,
    ) -> AppResult<MeasurementsResponse> {
        self.get_json(
            "measurements/",
            &[("id_misuratore", station_id), ("range", range.key())],
        )
        .await
    }

    /// Fetch the flow-duration curve (daily mean flow by exceedance percent).
    ///
    /// # Errors
    ///
    /// Returns `AppError::UpstreamApi` if the request fails or returns an error status.
    pub async fn get_duration_curve(&self, station_id: &str) -> AppResult<DurationCurveResponse> {
        self.get_json("duration-curve/", &[("id_misuratore", station_id)])
            .await
    }

    /// Fetch the normalized flow distribution histogram.
    ///
    /// # Errors
    ///
    /// Returns `AppError::UpstreamApi` if the request fails or returns an error status.
    pub async fn get_flow_histogram(&self, station_id: &str) -> AppResult<FlowHistogramResponse> {
        self.get_json("flow-histogram/", &[("id_misuratore", station_id)])
            .await
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> AppResult<T> {
        let url = format!("{}/{path}", self.base_url);

        let mut request = self.http_client.get(&url).query(query);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::UpstreamApi(format!("Request failed: {e}")))?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(AppError::UpstreamApi("Rate limited (429)".to_string()));
        }

        if !response.status().is_success() {
            return Err(AppError::UpstreamApi(format!(
                "HTTP {}: {}",
                response.status(),
                response.text().await.unwrap_or_default()
            )));
        }

        let text = response
            .text()
            .await
            .map_err(|e| AppError::UpstreamApi(format!("Failed to get response text: {e}")))?;

        serde_json::from_str(&text).map_err(|e| {
            tracing::error!(
                error = %e,
                path,
                body_preview = %text.chars().take(500).collect::<String>(),
                "Failed to parse portal response"
            );
            AppError::UpstreamApi(format!("Failed to parse response: {e}"))
        })
    }
}
