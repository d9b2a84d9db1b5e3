//! Keyed latest-rates vendor.
//!
//! One endpoint serves both concerns: `GET /v6/{key}/latest/{from}` returns
//! the full rate table for a base currency. Symbol discovery takes the key
//! set of that table; conversion looks up the target code and multiplies
//! locally.

use crate::error::FetchError;
use crate::rate_provider::{Conversion, ConversionProvider};
use crate::symbol_provider::SymbolProvider;
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::{debug, instrument};

/// Base currency used for symbol discovery. Any base yields the same code
/// set; the vendor keys its table off this code.
const DISCOVERY_BASE: &str = "USD";

pub struct RateApiProvider {
    base_url: String,
    api_key: String,
}

impl RateApiProvider {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        RateApiProvider {
            base_url: base_url.to_string(),
            api_key: api_key.to_string(),
        }
    }

    async fn fetch_latest(&self, from: &str) -> Result<LatestRatesResponse, FetchError> {
        let url = format!("{}/v6/{}/latest/{}", self.base_url, self.api_key, from);
        // The URL embeds the key; log only the base currency.
        debug!("Requesting latest rates for base {}", from);

        let client = reqwest::Client::builder().user_agent("fxc/0.1").build()?;
        let response = client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(FetchError::Provider(format!(
                "HTTP {} from latest-rates endpoint",
                response.status()
            )));
        }

        let text = response.text().await?;
        let data: LatestRatesResponse = serde_json::from_str(&text)
            .map_err(|e| FetchError::Malformed(format!("invalid latest-rates body: {e}")))?;

        if data.result.as_deref() == Some("error") {
            return Err(FetchError::Provider(
                data.error_type
                    .unwrap_or_else(|| "unspecified error".to_string()),
            ));
        }

        Ok(data)
    }
}

#[derive(Debug, Deserialize)]
struct LatestRatesResponse {
    result: Option<String>,
    #[serde(rename = "error-type")]
    error_type: Option<String>,
    time_last_update_unix: Option<i64>,
    conversion_rates: Option<BTreeMap<String, f64>>,
}

impl LatestRatesResponse {
    fn rates(self) -> Result<(BTreeMap<String, f64>, Option<i64>), FetchError> {
        let updated = self.time_last_update_unix;
        match self.conversion_rates {
            Some(rates) => Ok((rates, updated)),
            None => Err(FetchError::Malformed(
                "conversion_rates field is missing".to_string(),
            )),
        }
    }
}

#[async_trait]
impl SymbolProvider for RateApiProvider {
    async fn list_symbols(&self) -> Result<Vec<String>, FetchError> {
        let (rates, _) = self.fetch_latest(DISCOVERY_BASE).await?.rates()?;
        Ok(rates.into_keys().collect())
    }
}

#[async_trait]
impl ConversionProvider for RateApiProvider {
    #[instrument(name = "RateApiConvert", skip(self), fields(from = %from, to = %to))]
    async fn convert(&self, amount: f64, from: &str, to: &str) -> Result<Conversion, FetchError> {
        let (rates, updated) = self.fetch_latest(from).await?.rates()?;

        let rate = *rates.get(to).ok_or_else(|| {
            FetchError::Malformed(format!("no conversion rate for target {to}"))
        })?;

        let as_of = updated.and_then(|ts| Utc.timestamp_opt(ts, 0).single());
        Ok(Conversion {
            result: amount * rate,
            rate,
            as_of,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const KEY: &str = "test-key";

    async fn create_mock_server(base: &str, mock_response: &str) -> MockServer {
        let mock_server = MockServer::start().await;
        let request_path = format!("/v6/{KEY}/latest/{base}");

        Mock::given(method("GET"))
            .and(path(request_path))
            .respond_with(ResponseTemplate::new(200).set_body_string(mock_response))
            .mount(&mock_server)
            .await;

        mock_server
    }

    #[tokio::test]
    async fn test_successful_conversion() {
        let mock_response = r#"{
            "result": "success",
            "time_last_update_unix": 1718000000,
            "conversion_rates": {
                "USD": 1.0,
                "PKR": 280.0,
                "EUR": 0.9
            }
        }"#;

        let mock_server = create_mock_server("USD", mock_response).await;
        let provider = RateApiProvider::new(&mock_server.uri(), KEY);

        let conversion = provider.convert(10.0, "USD", "PKR").await.unwrap();
        assert_eq!(conversion.rate, 280.0);
        assert_eq!(conversion.result, 2800.0);
        assert_eq!(
            conversion.as_of,
            Utc.timestamp_opt(1718000000, 0).single()
        );
    }

    #[tokio::test]
    async fn test_symbols_are_rate_table_keys() {
        let mock_response = r#"{
            "result": "success",
            "conversion_rates": {
                "USD": 1.0,
                "PKR": 280.0,
                "EUR": 0.9
            }
        }"#;

        let mock_server = create_mock_server("USD", mock_response).await;
        let provider = RateApiProvider::new(&mock_server.uri(), KEY);

        let symbols = provider.list_symbols().await.unwrap();
        assert_eq!(symbols, vec!["EUR", "PKR", "USD"]);
    }

    #[tokio::test]
    async fn test_missing_rate_table_is_malformed() {
        let mock_response = r#"{"result": "success"}"#;

        let mock_server = create_mock_server("USD", mock_response).await;
        let provider = RateApiProvider::new(&mock_server.uri(), KEY);

        let result = provider.list_symbols().await;
        assert!(matches!(result, Err(FetchError::Malformed(_))));
    }

    #[tokio::test]
    async fn test_missing_target_code_is_malformed() {
        let mock_response = r#"{
            "result": "success",
            "conversion_rates": { "USD": 1.0 }
        }"#;

        let mock_server = create_mock_server("USD", mock_response).await;
        let provider = RateApiProvider::new(&mock_server.uri(), KEY);

        let result = provider.convert(10.0, "USD", "XXX").await;
        match result {
            Err(FetchError::Malformed(msg)) => assert!(msg.contains("XXX")),
            other => panic!("Expected malformed error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_error_envelope_is_provider_error() {
        let mock_response = r#"{
            "result": "error",
            "error-type": "invalid-key"
        }"#;

        let mock_server = create_mock_server("USD", mock_response).await;
        let provider = RateApiProvider::new(&mock_server.uri(), KEY);

        let result = provider.convert(10.0, "USD", "PKR").await;
        match result {
            Err(FetchError::Provider(msg)) => assert_eq!(msg, "invalid-key"),
            other => panic!("Expected provider error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_http_error_status() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/v6/{KEY}/latest/USD")))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let provider = RateApiProvider::new(&mock_server.uri(), KEY);
        let result = provider.convert(10.0, "USD", "PKR").await;
        match result {
            Err(FetchError::Provider(msg)) => assert!(msg.contains("500")),
            other => panic!("Expected provider error, got {other:?}"),
        }
    }
}
