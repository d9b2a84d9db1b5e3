pub mod config;
pub mod convert;
pub mod engine;
pub mod error;
pub mod interactive;
pub mod log;
pub mod providers;
pub mod rate_provider;
pub mod state;
pub mod symbol_provider;
pub mod symbols;
pub mod ui;

use anyhow::Result;
use std::time::Duration;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq)]
pub enum AppCommand {
    Interactive,
    Convert { amount: f64, from: String, to: String },
    Symbols,
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("Currency Converter starting...");

    let config = match config_path {
        Some(path) => config::AppConfig::load_from_path(path)?,
        None => config::AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let (symbol_provider, conversion_provider) = providers::build(&config.provider)?;

    match command {
        AppCommand::Interactive => {
            let engine = engine::Engine::new(
                symbol_provider,
                conversion_provider,
                Duration::from_millis(config.debounce_ms),
                &config.defaults.from,
                &config.defaults.to,
            );
            interactive::run_session(engine).await
        }
        AppCommand::Convert { amount, from, to } => {
            convert::run_convert(
                amount,
                &from,
                &to,
                symbol_provider.as_ref(),
                conversion_provider.as_ref(),
            )
            .await
        }
        AppCommand::Symbols => symbols::run_symbols(symbol_provider.as_ref()).await,
    }
}
