pub mod exchange_host;
pub mod exchange_rate_api;

use crate::config::{ProviderConfig, ProviderKind};
use crate::rate_provider::ConversionProvider;
use crate::symbol_provider::SymbolProvider;
use anyhow::{Context, Result};
use exchange_host::ExchangeHostProvider;
use exchange_rate_api::RateApiProvider;
use std::sync::Arc;

/// Builds the configured backend. Both trait handles point at the same
/// provider instance; there is no cross-provider fallback.
pub fn build(
    config: &ProviderConfig,
) -> Result<(Arc<dyn SymbolProvider>, Arc<dyn ConversionProvider>)> {
    match config.kind {
        ProviderKind::RateApi => {
            let api_key = config.api_key().with_context(|| {
                format!(
                    "The rate-api provider requires an API key; export {}",
                    config.api_key_var()
                )
            })?;
            let provider = Arc::new(RateApiProvider::new(&config.base_url, &api_key));
            Ok((
                Arc::clone(&provider) as Arc<dyn SymbolProvider>,
                provider as Arc<dyn ConversionProvider>,
            ))
        }
        ProviderKind::ExchangeHost => {
            let provider = Arc::new(ExchangeHostProvider::new(
                &config.base_url,
                config.api_key(),
            ));
            Ok((
                Arc::clone(&provider) as Arc<dyn SymbolProvider>,
                provider as Arc<dyn ConversionProvider>,
            ))
        }
    }
}
