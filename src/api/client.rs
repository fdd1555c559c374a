use crate::config::Settings;
use crate::error::ForecastError;
use crate::models::{DailyForecastRow, ForecastQuery};
use anyhow::Context;
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

const DAILY_VARIABLES: &str = "temperature_2m_max,temperature_2m_min";
const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Source of daily temperature extremes for a coordinate.
#[async_trait]
pub trait ForecastProvider: Send + Sync {
    async fn daily_forecast(
        &self,
        query: &ForecastQuery,
    ) -> Result<Vec<DailyForecastRow>, ForecastError>;
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    daily: DailySeries,
}

/// Open-Meteo's index-aligned sibling arrays.
#[derive(Debug, Deserialize)]
struct DailySeries {
    time: Vec<NaiveDate>,
    temperature_2m_min: Vec<Option<f64>>,
    temperature_2m_max: Vec<Option<f64>>,
}

impl DailySeries {
    fn into_rows(self) -> Result<Vec<DailyForecastRow>, ForecastError> {
        let days = self.time.len();
        if self.temperature_2m_min.len() != days || self.temperature_2m_max.len() != days {
            return Err(ForecastError::unexpected_shape(format!(
                "daily arrays differ in length: time={}, temperature_2m_min={}, temperature_2m_max={}",
                days,
                self.temperature_2m_min.len(),
                self.temperature_2m_max.len()
            )));
        }

        Ok(self
            .time
            .into_iter()
            .zip(self.temperature_2m_min)
            .zip(self.temperature_2m_max)
            .map(|((date, min), max)| DailyForecastRow {
                date,
                temperature_min: min,
                temperature_max: max,
            })
            .collect())
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    reason: String,
}

/// Turns a response body into rows. Invalid JSON is a request failure; valid JSON
/// without the `daily` series is a shape failure.
fn decode_daily_forecast(body: &[u8]) -> Result<Vec<DailyForecastRow>, ForecastError> {
    let value: serde_json::Value = serde_json::from_slice(body)
        .map_err(|err| ForecastError::request(format!("Malformed JSON body: {}", err)))?;

    let response: ForecastResponse = serde_json::from_value(value)
        .map_err(|err| ForecastError::unexpected_shape(err.to_string()))?;

    response.daily.into_rows()
}

#[derive(Debug, Clone)]
pub struct OpenMeteoClient {
    client: Client,
    endpoint: Url,
    timezone: String,
}

impl OpenMeteoClient {
    pub fn new(settings: &Settings) -> anyhow::Result<Self> {
        let endpoint = Url::parse(&settings.endpoint)
            .with_context(|| format!("Invalid forecast endpoint: {}", settings.endpoint))?;

        let mut builder = Client::builder().user_agent(USER_AGENT);
        if let Some(secs) = settings.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build().context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            endpoint,
            timezone: settings.timezone.clone(),
        })
    }

    fn query_params(&self, query: &ForecastQuery) -> Vec<(&'static str, String)> {
        let mut params = query.query_pairs();
        params.insert(2, ("daily", DAILY_VARIABLES.to_string()));
        params.insert(3, ("timezone", self.timezone.clone()));
        params
    }
}

#[async_trait]
impl ForecastProvider for OpenMeteoClient {
    async fn daily_forecast(
        &self,
        query: &ForecastQuery,
    ) -> Result<Vec<DailyForecastRow>, ForecastError> {
        let params = self.query_params(query);
        debug!(endpoint = %self.endpoint, ?params, "requesting daily forecast");

        let response = self
            .client
            .get(self.endpoint.clone())
            .query(&params)
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            let reason = serde_json::from_slice::<ErrorBody>(&body)
                .map(|b| b.reason)
                .unwrap_or_else(|_| String::from_utf8_lossy(&body).trim().to_string());
            return Err(ForecastError::request(format!("{} - {}", status, reason)));
        }

        let rows = decode_daily_forecast(&body)?;
        info!(days = rows.len(), "received daily forecast");
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TemperatureUnit;
    use std::collections::HashMap;
    use std::thread::JoinHandle;
    use tiny_http::{Response, Server};

    const THREE_DAYS: &str = r#"{
        "latitude": 48.86,
        "longitude": 2.3399997,
        "timezone": "Europe/Paris",
        "daily_units": {"time": "iso8601", "temperature_2m_max": "°C", "temperature_2m_min": "°C"},
        "daily": {
            "time": ["2026-10-17", "2026-10-18", "2026-10-19"],
            "temperature_2m_max": [17.4, 15.9, 14.2],
            "temperature_2m_min": [9.1, 8.3, 6.7]
        }
    }"#;

    fn serve_once(status: u16, body: &'static str) -> (Settings, JoinHandle<String>) {
        let server = Server::http("127.0.0.1:0").unwrap();
        let addr = server.server_addr().to_ip().unwrap();
        let handle = std::thread::spawn(move || {
            let request = server.recv().unwrap();
            let url = request.url().to_string();
            request
                .respond(Response::from_string(body).with_status_code(status))
                .unwrap();
            url
        });

        let settings = Settings {
            endpoint: format!("http://{}/v1/forecast", addr),
            ..Settings::default()
        };
        (settings, handle)
    }

    fn query_map(request_url: &str) -> HashMap<String, String> {
        let parsed = Url::parse(&format!("http://localhost{}", request_url)).unwrap();
        parsed
            .query_pairs()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn decodes_parallel_arrays_into_rows() {
        let rows = decode_daily_forecast(THREE_DAYS.as_bytes()).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].date, NaiveDate::from_ymd_opt(2026, 10, 17).unwrap());
        assert_eq!(rows[0].temperature_min, Some(9.1));
        assert_eq!(rows[0].temperature_max, Some(17.4));
        assert_eq!(rows[2].date, NaiveDate::from_ymd_opt(2026, 10, 19).unwrap());
        assert_eq!(rows[2].temperature_min, Some(6.7));
        assert_eq!(rows[2].temperature_max, Some(14.2));
    }

    #[test]
    fn decodes_empty_series() {
        let body = br#"{"daily": {"time": [], "temperature_2m_min": [], "temperature_2m_max": []}}"#;
        assert!(decode_daily_forecast(body).unwrap().is_empty());
    }

    #[test]
    fn keeps_null_temperatures() {
        let body = br#"{"daily": {"time": ["2026-10-17"], "temperature_2m_min": [null], "temperature_2m_max": [12.0]}}"#;
        let rows = decode_daily_forecast(body).unwrap();
        assert_eq!(rows[0].temperature_min, None);
        assert_eq!(rows[0].temperature_max, Some(12.0));
    }

    #[test]
    fn missing_daily_is_a_shape_error() {
        let err = decode_daily_forecast(br#"{"latitude": 48.86}"#).unwrap_err();
        assert!(matches!(err, ForecastError::UnexpectedResponseShape { .. }));
        assert!(err.to_string().contains("daily"));
    }

    #[test]
    fn missing_sub_array_is_a_shape_error() {
        let body = br#"{"daily": {"time": ["2026-10-17"], "temperature_2m_max": [12.0]}}"#;
        let err = decode_daily_forecast(body).unwrap_err();
        assert!(matches!(err, ForecastError::UnexpectedResponseShape { .. }));
        assert!(err.to_string().contains("temperature_2m_min"));
    }

    #[test]
    fn misaligned_arrays_are_a_shape_error() {
        let body = br#"{"daily": {"time": ["2026-10-17", "2026-10-18"], "temperature_2m_min": [1.0], "temperature_2m_max": [2.0, 3.0]}}"#;
        let err = decode_daily_forecast(body).unwrap_err();
        assert!(matches!(err, ForecastError::UnexpectedResponseShape { .. }));
    }

    #[test]
    fn malformed_json_is_a_request_error() {
        let err = decode_daily_forecast(b"<html>oops</html>").unwrap_err();
        assert!(matches!(err, ForecastError::Request { .. }));
    }

    #[test]
    fn rejects_invalid_endpoint() {
        let settings = Settings {
            endpoint: "not a url".to_string(),
            ..Settings::default()
        };
        assert!(OpenMeteoClient::new(&settings).is_err());
    }

    #[tokio::test]
    async fn sends_expected_query_parameters() {
        let (settings, server) = serve_once(200, THREE_DAYS);
        let client = OpenMeteoClient::new(&settings).unwrap();
        let query = ForecastQuery::new(48.85, 2.35, 3, TemperatureUnit::Celsius);

        let rows = client.daily_forecast(&query).await.unwrap();
        let request_url = server.join().unwrap();
        let params = query_map(&request_url);

        assert_eq!(rows.len(), 3);
        assert!(request_url.starts_with("/v1/forecast?"));
        assert_eq!(params["latitude"], "48.85");
        assert_eq!(params["longitude"], "2.35");
        assert_eq!(params["daily"], "temperature_2m_max,temperature_2m_min");
        assert_eq!(params["timezone"], "Europe/Paris");
        assert_eq!(params["forecast_days"], "3");
        assert_eq!(params["temperature_unit"], "celsius");
        assert_eq!(params.len(), 6);
    }

    #[tokio::test]
    async fn surfaces_provider_error_reason() {
        let (settings, server) = serve_once(
            400,
            r#"{"error": true, "reason": "Latitude must be in range of -90 to 90°. Given: 123.0."}"#,
        );
        let client = OpenMeteoClient::new(&settings).unwrap();
        let query = ForecastQuery::new(123.0, 2.35, 7, TemperatureUnit::Fahrenheit);

        let err = client.daily_forecast(&query).await.unwrap_err();
        server.join().unwrap();

        assert!(matches!(err, ForecastError::Request { .. }));
        assert!(err.to_string().contains("400"));
        assert!(err.to_string().contains("Latitude must be in range"));
    }

    #[tokio::test]
    async fn missing_daily_from_server_is_a_shape_error() {
        let (settings, server) = serve_once(200, r#"{"latitude": 48.86, "longitude": 2.34}"#);
        let client = OpenMeteoClient::new(&settings).unwrap();
        let query = ForecastQuery::new(48.85, 2.35, 7, TemperatureUnit::Celsius);

        let err = client.daily_forecast(&query).await.unwrap_err();
        server.join().unwrap();

        assert!(matches!(err, ForecastError::UnexpectedResponseShape { .. }));
    }

    #[tokio::test]
    async fn unreachable_host_is_a_request_error() {
        let settings = Settings {
            endpoint: "http://127.0.0.1:1/v1/forecast".to_string(),
            timeout_secs: Some(5),
            ..Settings::default()
        };
        let client = OpenMeteoClient::new(&settings).unwrap();
        let query = ForecastQuery::new(48.85, 2.35, 7, TemperatureUnit::Celsius);

        let err = client.daily_forecast(&query).await.unwrap_err();
        assert!(matches!(err, ForecastError::Request { .. }));
    }
}
