use crate::symbol_provider::SymbolProvider;
use crate::ui;
use anyhow::{Context, Result};

/// Lists the provider's supported currency codes.
pub async fn run_symbols(provider: &dyn SymbolProvider) -> Result<()> {
    let pb = ui::new_spinner("Fetching supported currencies...");
    let symbols = provider
        .list_symbols()
        .await
        .context("Failed to load currency list")?;
    pb.finish_and_clear();

    println!("{}", ui::symbols_table(&symbols));
    println!(
        "{}",
        ui::style_text(
            &format!("{} currencies supported", symbols.len()),
            ui::StyleType::Subtle
        )
    );

    Ok(())
}
