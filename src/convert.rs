use crate::rate_provider::{Conversion, ConversionProvider};
use crate::symbol_provider::SymbolProvider;
use crate::ui;
use anyhow::{Context, Result, bail};
use comfy_table::Cell;
use futures::future::try_join;
use tracing::debug;

/// One completed conversion, ready for display.
#[derive(Debug)]
pub struct ConversionSummary {
    pub amount: f64,
    pub from: String,
    pub to: String,
    pub conversion: Conversion,
}

impl ConversionSummary {
    pub fn display_as_table(&self) -> String {
        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("Amount"),
            ui::header_cell("From"),
            ui::header_cell("To"),
            ui::header_cell("Converted"),
        ]);
        table.add_row(vec![
            Cell::new(format!("{}", self.amount)),
            Cell::new(&self.from),
            Cell::new(&self.to),
            Cell::new(format!("{:.2}", self.conversion.result)),
        ]);

        let mut output = table.to_string();
        output.push_str(&format!(
            "\n{}",
            ui::style_text(
                &format!(
                    "1 {} = {:.6} {}",
                    self.from, self.conversion.rate, self.to
                ),
                ui::StyleType::Subtle,
            )
        ));
        if let Some(as_of) = self.conversion.as_of {
            output.push_str(&format!(
                "\n{}",
                ui::style_text(
                    &format!("Rates as of {}", as_of.format("%Y-%m-%d %H:%M UTC")),
                    ui::StyleType::Subtle,
                )
            ));
        }
        output
    }
}

/// One-shot conversion: fetch the symbol set and the conversion together,
/// validate the pair against the set, then display.
pub async fn run_convert(
    amount: f64,
    from: &str,
    to: &str,
    symbol_provider: &dyn SymbolProvider,
    conversion_provider: &dyn ConversionProvider,
) -> Result<()> {
    // Mirrors the interactive fast path: non-positive amounts convert to
    // nothing, without touching the network.
    if amount <= 0.0 {
        println!(
            "{}",
            ui::style_text("Nothing to convert: amount must be positive.", ui::StyleType::Subtle)
        );
        return Ok(());
    }

    let from = from.to_uppercase();
    let to = to.to_uppercase();

    let pb = ui::new_spinner("Fetching exchange rates...");
    let outcome = try_join(
        symbol_provider.list_symbols(),
        conversion_provider.convert(amount, &from, &to),
    )
    .await;
    pb.finish_and_clear();

    let (symbols, conversion) = outcome.context("Conversion failed")?;
    debug!(?conversion, "Received conversion");

    for code in [&from, &to] {
        if !symbols.iter().any(|s| s == code) {
            bail!("Unknown currency code: {code} (run `fxc symbols` for the supported list)");
        }
    }

    let summary = ConversionSummary {
        amount,
        from,
        to,
        conversion,
    };
    println!("{}", summary.display_as_table());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};

    struct StubProvider {
        symbols: Vec<String>,
        rate: f64,
        fail_conversion: bool,
    }

    impl StubProvider {
        fn new(rate: f64) -> Self {
            StubProvider {
                symbols: vec!["PKR".to_string(), "USD".to_string()],
                rate,
                fail_conversion: false,
            }
        }
    }

    #[async_trait]
    impl SymbolProvider for StubProvider {
        async fn list_symbols(&self) -> Result<Vec<String>, FetchError> {
            Ok(self.symbols.clone())
        }
    }

    #[async_trait]
    impl ConversionProvider for StubProvider {
        async fn convert(
            &self,
            amount: f64,
            _from: &str,
            _to: &str,
        ) -> Result<Conversion, FetchError> {
            if self.fail_conversion {
                return Err(FetchError::Provider("quota exceeded".to_string()));
            }
            Ok(Conversion {
                result: amount * self.rate,
                rate: self.rate,
                as_of: None,
            })
        }
    }

    #[test]
    fn test_summary_table_contents() {
        let summary = ConversionSummary {
            amount: 10.0,
            from: "USD".to_string(),
            to: "PKR".to_string(),
            conversion: Conversion {
                result: 2800.0,
                rate: 280.0,
                as_of: Utc.timestamp_opt(1718000000, 0).single(),
            },
        };

        let rendered = summary.display_as_table();
        assert!(rendered.contains("USD"));
        assert!(rendered.contains("PKR"));
        assert!(rendered.contains("2800.00"));
        assert!(rendered.contains("1 USD = 280.000000 PKR"));
        assert!(rendered.contains("Rates as of"));
    }

    #[tokio::test]
    async fn test_successful_one_shot_conversion() {
        let provider = StubProvider::new(280.0);
        let result = run_convert(10.0, "usd", "pkr", &provider, &provider).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_non_positive_amount_skips_network() {
        let mut provider = StubProvider::new(280.0);
        // A dispatched conversion would fail loudly; the fast path must not
        // reach it.
        provider.fail_conversion = true;

        let result = run_convert(0.0, "USD", "PKR", &provider, &provider).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_unknown_code_is_rejected() {
        let provider = StubProvider::new(280.0);
        let result = run_convert(10.0, "USD", "XXX", &provider, &provider).await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("XXX"));
    }

    #[tokio::test]
    async fn test_conversion_failure_propagates() {
        let mut provider = StubProvider::new(280.0);
        provider.fail_conversion = true;

        let result = run_convert(10.0, "USD", "PKR", &provider, &provider).await;
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Conversion failed")
        );
    }
}
