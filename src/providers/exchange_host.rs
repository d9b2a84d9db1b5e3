//! Symbols/convert vendor.
//!
//! Separate endpoints per concern: `GET /symbols` enumerates currency
//! codes, `GET /convert?from=&to=&amount=` performs the conversion server
//! side. The API key is optional and passed as a query parameter when
//! configured.

use crate::error::FetchError;
use crate::rate_provider::{Conversion, ConversionProvider};
use crate::symbol_provider::SymbolProvider;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::{debug, instrument};

pub struct ExchangeHostProvider {
    base_url: String,
    api_key: Option<String>,
}

impl ExchangeHostProvider {
    pub fn new(base_url: &str, api_key: Option<String>) -> Self {
        ExchangeHostProvider {
            base_url: base_url.to_string(),
            api_key,
        }
    }

    async fn get(
        &self,
        endpoint: &str,
        query: &[(&str, String)],
    ) -> Result<String, FetchError> {
        let url = format!("{}{}", self.base_url, endpoint);
        debug!("Requesting {}", url);

        let client = reqwest::Client::builder().user_agent("fxc/0.1").build()?;
        let mut request = client.get(&url).query(query);
        if let Some(key) = &self.api_key {
            request = request.query(&[("apikey", key.as_str())]);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(FetchError::Provider(format!(
                "HTTP {} from {}",
                response.status(),
                endpoint
            )));
        }

        Ok(response.text().await?)
    }
}

#[derive(Debug, Deserialize)]
struct SymbolsResponse {
    // Values are vendor-dependent (name string or descriptor object); only
    // the keys matter here.
    symbols: Option<BTreeMap<String, serde_json::Value>>,
}

#[derive(Debug, Deserialize)]
struct ConvertResponse {
    success: Option<bool>,
    result: Option<f64>,
    info: Option<ConvertInfo>,
    error: Option<ErrorEnvelope>,
}

#[derive(Debug, Deserialize)]
struct ConvertInfo {
    rate: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    info: Option<String>,
}

#[async_trait]
impl SymbolProvider for ExchangeHostProvider {
    async fn list_symbols(&self) -> Result<Vec<String>, FetchError> {
        let text = self.get("/symbols", &[]).await?;
        let data: SymbolsResponse = serde_json::from_str(&text)
            .map_err(|e| FetchError::Malformed(format!("invalid symbols body: {e}")))?;

        let symbols = data
            .symbols
            .ok_or_else(|| FetchError::Malformed("symbols field is missing".to_string()))?;
        Ok(symbols.into_keys().collect())
    }
}

#[async_trait]
impl ConversionProvider for ExchangeHostProvider {
    #[instrument(name = "ExchangeHostConvert", skip(self), fields(from = %from, to = %to))]
    async fn convert(&self, amount: f64, from: &str, to: &str) -> Result<Conversion, FetchError> {
        let query = [
            ("from", from.to_string()),
            ("to", to.to_string()),
            ("amount", amount.to_string()),
        ];
        let text = self.get("/convert", &query).await?;
        let data: ConvertResponse = serde_json::from_str(&text)
            .map_err(|e| FetchError::Malformed(format!("invalid convert body: {e}")))?;

        if data.success == Some(false) {
            let info = data
                .error
                .and_then(|e| e.info)
                .unwrap_or_else(|| "conversion rejected".to_string());
            return Err(FetchError::Provider(info));
        }

        let result = data
            .result
            .ok_or_else(|| FetchError::Malformed("result field is missing".to_string()))?;
        let rate = data
            .info
            .and_then(|i| i.rate)
            .ok_or_else(|| FetchError::Malformed("info.rate field is missing".to_string()))?;

        Ok(Conversion {
            result,
            rate,
            as_of: None,
        })
    }
}
