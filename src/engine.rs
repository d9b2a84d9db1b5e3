//! The conversion engine.
//!
//! A single task owns the `ConverterState` and multiplexes over three
//! sources: the input event channel, the pending debounce timer, and the
//! fetch-completion channel. Fetches run as spawned tasks reporting back
//! with the fence token they were dispatched under; only the completion
//! carrying the latest token is applied, so overlapping requests resolve
//! to last-dispatched-wins regardless of arrival order.
//!
//! State snapshots are published over a watch channel; renderers observe,
//! never write.

use crate::error::FetchError;
use crate::rate_provider::{Conversion, ConversionProvider};
use crate::state::ConverterState;
use crate::symbol_provider::SymbolProvider;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::{Instant, sleep_until};
use tracing::{debug, warn};

/// Banner shown when the symbol list cannot be loaded.
pub const SYMBOLS_ERROR: &str = "Failed to load currency list.";
/// Banner shown when a conversion request fails.
pub const CONVERSION_ERROR: &str = "Conversion failed. Try again later.";

/// A user edit to the conversion form.
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    /// Amount field changed; `None` means the field was cleared.
    Amount(Option<f64>),
    From(String),
    To(String),
    Swap,
}

pub struct Engine {
    symbols: Arc<dyn SymbolProvider>,
    rates: Arc<dyn ConversionProvider>,
    debounce: Duration,
    default_from: String,
    default_to: String,
}

impl Engine {
    pub fn new(
        symbols: Arc<dyn SymbolProvider>,
        rates: Arc<dyn ConversionProvider>,
        debounce: Duration,
        default_from: &str,
        default_to: &str,
    ) -> Self {
        Engine {
            symbols,
            rates,
            debounce,
            default_from: default_from.to_string(),
            default_to: default_to.to_string(),
        }
    }

    /// Starts the engine task. The session ends when the returned input
    /// sender is dropped; the watch channel closes with it.
    pub fn spawn(self) -> (mpsc::Sender<Input>, watch::Receiver<ConverterState>) {
        let (input_tx, input_rx) = mpsc::channel(32);
        let (state_tx, state_rx) =
            watch::channel(ConverterState::new(&self.default_from, &self.default_to));
        tokio::spawn(self.run(input_rx, state_tx));
        (input_tx, state_rx)
    }

    async fn run(
        self,
        mut inputs: mpsc::Receiver<Input>,
        state_tx: watch::Sender<ConverterState>,
    ) {
        let mut state = ConverterState::new(&self.default_from, &self.default_to);

        // Symbol load runs exactly once per session, before any conversion
        // can be dispatched.
        state.loading = true;
        state_tx.send_replace(state.clone());
        match self.symbols.list_symbols().await {
            Ok(symbols) => {
                state.set_symbols(symbols);
                state.ensure_valid_pair(&self.default_from, &self.default_to);
                state.error.clear();
            }
            Err(e) => {
                warn!(error = %e, "Symbol load failed");
                state.error = SYMBOLS_ERROR.to_string();
            }
        }
        state.loading = false;
        state_tx.send_replace(state.clone());

        let (done_tx, mut done_rx) = mpsc::channel::<(u64, Result<Conversion, FetchError>)>(8);
        // Fence token: bumped on every qualifying input change and on every
        // dispatch. A completion is applied only if its token is current.
        let mut fence: u64 = 0;
        let mut deadline: Option<Instant> = None;

        loop {
            tokio::select! {
                input = inputs.recv() => {
                    let Some(input) = input else { break };
                    if !self.apply_input(&mut state, input) {
                        continue;
                    }
                    fence += 1;
                    if state.can_convert() {
                        deadline = Some(Instant::now() + self.debounce);
                    } else {
                        // No-op fast path: no request, nothing to show.
                        deadline = None;
                        state.clear_conversion();
                        state.loading = false;
                    }
                    state_tx.send_replace(state.clone());
                }
                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    deadline = None;
                    fence += 1;
                    let token = fence;
                    // The deadline is only armed while can_convert holds.
                    let Some(amount) = state.amount else { continue };
                    let from = state.from.clone();
                    let to = state.to.clone();
                    let rates = Arc::clone(&self.rates);
                    let done = done_tx.clone();
                    debug!(token, %from, %to, amount, "Dispatching conversion");
                    tokio::spawn(async move {
                        let outcome = rates.convert(amount, &from, &to).await;
                        let _ = done.send((token, outcome)).await;
                    });
                    state.loading = true;
                    state_tx.send_replace(state.clone());
                }
                Some((token, outcome)) = done_rx.recv() => {
                    if token != fence {
                        debug!(token, fence, "Discarding stale conversion response");
                        continue;
                    }
                    state.loading = false;
                    match outcome {
                        Ok(conversion) => {
                            state.rate = Some(conversion.rate);
                            state.result = format!("{:.2}", conversion.result);
                            state.error.clear();
                        }
                        Err(e) => {
                            warn!(error = %e, "Conversion failed");
                            state.clear_conversion();
                            state.error = CONVERSION_ERROR.to_string();
                        }
                    }
                    state_tx.send_replace(state.clone());
                }
            }
        }
    }

    /// Applies one input to the state. Returns true when the edit changed a
    /// conversion parameter, i.e. the trigger must re-evaluate.
    fn apply_input(&self, state: &mut ConverterState, input: Input) -> bool {
        match input {
            Input::Amount(amount) => {
                if state.amount == amount {
                    return false;
                }
                state.amount = amount;
                true
            }
            Input::From(code) => {
                let prev = state.from.clone();
                state.from = code.to_uppercase();
                state.ensure_valid_pair(&self.default_from, &self.default_to);
                state.from != prev
            }
            Input::To(code) => {
                let prev = state.to.clone();
                state.to = code.to_uppercase();
                state.ensure_valid_pair(&self.default_from, &self.default_to);
                state.to != prev
            }
            Input::Swap => {
                state.swap();
                true
            }
        }
    }
}
