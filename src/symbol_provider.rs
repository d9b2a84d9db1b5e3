//! Currency symbol enumeration for the application.

use crate::error::FetchError;
use async_trait::async_trait;

#[async_trait]
pub trait SymbolProvider: Send + Sync {
    /// Returns the provider's supported currency codes, sorted.
    async fn list_symbols(&self) -> Result<Vec<String>, FetchError>;
}
