// HTTP boundary to the flight-data provider.
// HTTP failures are classified into ApiError here, once, so nothing downstream
// has to look at status codes or reqwest errors.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::{ApiError, ClientError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    SearchAirport,
    NearbyAirports,
    SearchFlights,
    CheckServer,
}

impl Endpoint {
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::SearchAirport => "/api/v1/flights/searchAirport",
            Endpoint::NearbyAirports => "/api/v1/flights/getNearByAirports",
            Endpoint::SearchFlights => "/api/v2/flights/searchFlightsComplete",
            Endpoint::CheckServer => "/api/v1/checkServer",
        }
    }
}

pub type QueryParams = Vec<(&'static str, String)>;

#[async_trait]
pub trait FlightDataProvider: Send + Sync + 'static {
    // Issues one GET. `Ok(None)` means the provider answered without a payload.
    async fn fetch(&self, endpoint: Endpoint, params: &QueryParams)
        -> Result<Option<Value>, ApiError>;
}

pub struct HttpProvider {
    http: Client,
    base_url: String,
}

impl HttpProvider {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let header = |value: &str| {
            HeaderValue::from_str(value)
                .map_err(|e| ClientError::ConfigError(format!("invalid header value: {}", e)))
        };

        let mut headers = HeaderMap::new();
        headers.insert("x-rapidapi-key", header(&config.api_key)?);
        headers.insert("x-rapidapi-host", header(&config.api_host)?);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| ClientError::InitError(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl FlightDataProvider for HttpProvider {
    async fn fetch(
        &self,
        endpoint: Endpoint,
        params: &QueryParams,
    ) -> Result<Option<Value>, ApiError> {
        let url = format!("{}{}", self.base_url, endpoint.path());
        debug!("GET {} {:?}", url, params);

        let response = self.http.get(&url).query(params).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = error_message(&body).unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string()
            });
            return Err(ApiError::from_status(status.as_u16(), message));
        }

        parse_payload(&body)
    }
}

pub fn parse_payload(body: &str) -> Result<Option<Value>, ApiError> {
    if body.trim().is_empty() {
        return Ok(None);
    }
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Null) => Ok(None),
        Ok(value) => Ok(Some(value)),
        Err(e) => Err(ApiError::Transport(format!("malformed response body: {}", e))),
    }
}

// `message` field of a JSON error body, if there is one
fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<Value>(body)
        .ok()?
        .get("message")?
        .as_str()
        .map(str::to_string)
        .filter(|m| !m.trim().is_empty())
}
