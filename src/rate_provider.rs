//! Conversion abstractions and core types.

use crate::error::FetchError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Outcome of one conversion request.
#[derive(Debug, Clone)]
pub struct Conversion {
    /// Converted amount in the target currency.
    pub result: f64,
    /// Unit rate from source to target.
    pub rate: f64,
    /// When the provider last refreshed its rates, if reported.
    pub as_of: Option<DateTime<Utc>>,
}

#[async_trait]
pub trait ConversionProvider: Send + Sync {
    async fn convert(&self, amount: f64, from: &str, to: &str) -> Result<Conversion, FetchError>;
}
