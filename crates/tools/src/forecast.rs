//! Open-Meteo forecast fetcher.
//!
//! One HTTP GET per invocation against the public forecast endpoint
//! (<https://open-meteo.com>, no API key). Coordinates are range-checked
//! before any network call, and the structured response is propagated
//! verbatim: forecast values are never reinterpreted here.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ToolError;
use crate::tool::Tool;

pub const DEFAULT_BASE_URL: &str = "https://api.open-meteo.com/v1/forecast";

const DEFAULT_FORECAST_DAYS: i64 = 3;
const MAX_FORECAST_DAYS: i64 = 7;

/// Daily variables requested when the model does not name any.
const DEFAULT_DAILY: [&str; 5] = [
    "temperature_2m_max",
    "temperature_2m_min",
    "precipitation_sum",
    "windspeed_10m_max",
    "weathercode",
];

/// Arguments for one forecast request.
#[derive(Debug, Clone, Deserialize)]
pub struct ForecastParams {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default = "default_forecast_days")]
    pub forecast_days: i64,
    #[serde(default = "default_daily")]
    pub daily: Vec<String>,
}

fn default_forecast_days() -> i64 {
    DEFAULT_FORECAST_DAYS
}

fn default_daily() -> Vec<String> {
    DEFAULT_DAILY.iter().map(|s| s.to_string()).collect()
}

impl ForecastParams {
    /// Range-check coordinates and clamp the day count to [1, 7].
    ///
    /// Daily variable names pass through as opaque strings; unknown names are
    /// rejected by the upstream service, not here, so new upstream variables
    /// keep working without a client change.
    fn validated(mut self) -> Result<Self, ToolError> {
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(ToolError::InvalidInput(format!(
                "latitude {} out of range [-90, 90]",
                self.latitude
            )));
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(ToolError::InvalidInput(format!(
                "longitude {} out of range [-180, 180]",
                self.longitude
            )));
        }
        self.forecast_days = self.forecast_days.clamp(1, MAX_FORECAST_DAYS);
        if self.daily.is_empty() {
            self.daily = default_daily();
        }
        Ok(self)
    }
}

/// Forecast payload, propagated verbatim from the upstream response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Forecast {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub elevation: f64,
    #[serde(default)]
    pub timezone: String,
    #[serde(default)]
    pub daily_units: HashMap<String, String>,
    /// Variable name → one value per forecast day.
    pub daily: HashMap<String, Vec<Value>>,
}

/// Client for the Open-Meteo forecast endpoint.
///
/// The base URL is injectable so tests (and configuration) can point at a
/// local server.
#[derive(Debug, Clone)]
pub struct ForecastClient {
    http: reqwest::Client,
    base_url: String,
}

impl ForecastClient {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Issue one GET; no retries, no caching.
    ///
    /// `timezone=auto` lets the server resolve local time from coordinates.
    pub async fn fetch(&self, params: ForecastParams) -> Result<Forecast, ToolError> {
        let params = params.validated()?;

        let response = self
            .http
            .get(&self.base_url)
            .query(&[
                ("latitude", params.latitude.to_string()),
                ("longitude", params.longitude.to_string()),
                ("forecast_days", params.forecast_days.to_string()),
                ("daily", params.daily.join(",")),
                ("timezone", "auto".to_string()),
            ])
            .send()
            .await
            .map_err(|e| ToolError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            tracing::debug!(%status, "forecast request failed");
            return Err(ToolError::Upstream { status, body });
        }

        let body = response
            .text()
            .await
            .map_err(|e| ToolError::Network(e.to_string()))?;

        serde_json::from_str(&body).map_err(|e| ToolError::MalformedResponse(e.to_string()))
    }
}

impl Default for ForecastClient {
    fn default() -> Self {
        Self::new()
    }
}

/// The forecast fetcher as a model-visible tool, exposed as `get_weather`.
pub struct ForecastTool {
    client: ForecastClient,
}

impl ForecastTool {
    pub fn new(client: ForecastClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for ForecastTool {
    fn name(&self) -> &str {
        "get_weather"
    }

    fn description(&self) -> &str {
        "Get weather forecast data for a location. Use this when the user asks \
         about weather, temperature, rain, wind, or forecasts for any location."
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "latitude": {
                    "type": "number",
                    "description": "Latitude of the location"
                },
                "longitude": {
                    "type": "number",
                    "description": "Longitude of the location"
                },
                "forecast_days": {
                    "type": "integer",
                    "minimum": 1,
                    "maximum": 7,
                    "description": "Number of days to forecast (default 3)"
                },
                "daily": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Daily weather variables, e.g. temperature_2m_max, \
                                    precipitation_sum, windspeed_10m_max"
                }
            },
            "required": ["latitude", "longitude"]
        })
    }

    async fn invoke(&self, input: Value) -> Result<Value, ToolError> {
        let params: ForecastParams =
            serde_json::from_value(input).map_err(|e| ToolError::InvalidInput(e.to_string()))?;
        let forecast = self.client.fetch(params).await?;
        serde_json::to_value(&forecast).map_err(|e| ToolError::Execution(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Router;
    use axum::http::StatusCode;
    use axum::routing::get;

    fn params(latitude: f64, longitude: f64) -> ForecastParams {
        ForecastParams {
            latitude,
            longitude,
            forecast_days: DEFAULT_FORECAST_DAYS,
            daily: default_daily(),
        }
    }

    /// Bind a throwaway server and return its base URL.
    async fn spawn_upstream(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}/v1/forecast")
    }

    fn fixture_body(days: usize) -> String {
        let series: Vec<f64> = (0..days).map(|d| 20.0 + d as f64).collect();
        serde_json::json!({
            "latitude": 35.6762,
            "longitude": 139.6503,
            "elevation": 40.0,
            "timezone": "Asia/Tokyo",
            "daily_units": { "temperature_2m_max": "°C" },
            "daily": {
                "temperature_2m_max": series.clone(),
                "temperature_2m_min": series,
            }
        })
        .to_string()
    }

    #[test]
    fn params_default_days_and_variables() {
        let params: ForecastParams = serde_json::from_value(serde_json::json!({
            "latitude": 35.6762,
            "longitude": 139.6503
        }))
        .unwrap();
        assert_eq!(params.forecast_days, 3);
        assert_eq!(params.daily.len(), DEFAULT_DAILY.len());
        assert!(params.daily.iter().any(|v| v == "weathercode"));
    }

    #[test]
    fn forecast_days_clamped_to_range() {
        let low = params(0.0, 0.0);
        let clamped = ForecastParams {
            forecast_days: 0,
            ..low
        }
        .validated()
        .unwrap();
        assert_eq!(clamped.forecast_days, 1);

        let high = params(0.0, 0.0);
        let clamped = ForecastParams {
            forecast_days: 30,
            ..high
        }
        .validated()
        .unwrap();
        assert_eq!(clamped.forecast_days, 7);
    }

    #[tokio::test]
    async fn out_of_range_latitude_rejected_before_any_request() {
        // Unroutable base URL: reaching the network would surface as a
        // Network error, not InvalidInput.
        let client = ForecastClient::with_base_url("http://127.0.0.1:1/v1/forecast");
        let err = client.fetch(params(91.0, 0.0)).await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidInput(_)), "{err:?}");

        let err = client.fetch(params(0.0, -181.0)).await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidInput(_)), "{err:?}");
    }

    #[tokio::test]
    async fn successful_fetch_propagates_daily_series() {
        let router = Router::new().route(
            "/v1/forecast",
            get(|| async { ([("content-type", "application/json")], fixture_body(3)) }),
        );
        let base_url = spawn_upstream(router).await;

        let client = ForecastClient::with_base_url(base_url);
        let forecast = client.fetch(params(35.6762, 139.6503)).await.unwrap();

        assert_eq!(forecast.timezone, "Asia/Tokyo");
        for series in forecast.daily.values() {
            assert_eq!(series.len(), 3);
        }
        assert_eq!(forecast.daily_units["temperature_2m_max"], "°C");
    }

    #[tokio::test]
    async fn upstream_error_carries_status_and_body() {
        let router = Router::new().route(
            "/v1/forecast",
            get(|| async { (StatusCode::BAD_REQUEST, "Data corrupted at path 'daily'") }),
        );
        let base_url = spawn_upstream(router).await;

        let client = ForecastClient::with_base_url(base_url);
        let err = client.fetch(params(35.0, 139.0)).await.unwrap_err();
        assert!(err.to_string().contains("400"));
        match err {
            ToolError::Upstream { status, body } => {
                assert_eq!(status, 400);
                assert!(body.contains("daily"));
            }
            other => panic!("expected Upstream, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_daily_block_is_malformed() {
        let router = Router::new().route(
            "/v1/forecast",
            get(|| async {
                (
                    [("content-type", "application/json")],
                    r#"{"latitude": 1.0, "longitude": 2.0}"#,
                )
            }),
        );
        let base_url = spawn_upstream(router).await;

        let client = ForecastClient::with_base_url(base_url);
        let err = client.fetch(params(1.0, 2.0)).await.unwrap_err();
        assert!(matches!(err, ToolError::MalformedResponse(_)), "{err:?}");
    }

    #[tokio::test]
    async fn unreachable_upstream_is_a_network_error() {
        let client = ForecastClient::with_base_url("http://127.0.0.1:1/v1/forecast");
        let err = client.fetch(params(1.0, 2.0)).await.unwrap_err();
        assert!(matches!(err, ToolError::Network(_)), "{err:?}");
    }

    #[tokio::test]
    async fn tool_rejects_non_numeric_arguments() {
        let tool = ForecastTool::new(ForecastClient::with_base_url(
            "http://127.0.0.1:1/v1/forecast",
        ));
        let err = tool
            .invoke(serde_json::json!({ "latitude": "north", "longitude": 2.0 }))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidInput(_)), "{err:?}");
    }
}
