//! Converter session state.
//!
//! One `ConverterState` exists per session. It is owned by the engine task
//! and published to renderers as read-only snapshots; every mutation goes
//! through the methods here so the pair-membership invariant holds whenever
//! the symbol set is non-empty.

use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub struct ConverterState {
    /// Supported currency codes, sorted. Empty until the symbol load
    /// succeeds.
    pub symbols: Vec<String>,
    /// Amount to convert. `None` when the field is empty.
    pub amount: Option<f64>,
    pub from: String,
    pub to: String,
    /// Unit rate from the last applied conversion.
    pub rate: Option<f64>,
    /// Converted amount, formatted to two decimal places. Empty when no
    /// conversion is displayed.
    pub result: String,
    /// True while a fetch is outstanding.
    pub loading: bool,
    /// User-facing error banner. Empty when the last operation succeeded.
    pub error: String,
}

impl ConverterState {
    pub fn new(from: &str, to: &str) -> Self {
        ConverterState {
            symbols: Vec::new(),
            amount: None,
            from: from.to_string(),
            to: to.to_string(),
            rate: None,
            result: String::new(),
            loading: false,
            error: String::new(),
        }
    }

    /// Stores the fetched symbol set. The set is immutable for the rest of
    /// the session.
    pub fn set_symbols(&mut self, mut symbols: Vec<String>) {
        symbols.sort();
        symbols.dedup();
        self.symbols = symbols;
    }

    /// Validates `from`/`to` against the symbol set, substituting the
    /// configured defaults (or the first symbols) for unknown codes.
    ///
    /// Returns true if either code changed; the displayed conversion is
    /// cleared in that case since it refers to the old pair.
    pub fn ensure_valid_pair(&mut self, default_from: &str, default_to: &str) -> bool {
        if self.symbols.is_empty() {
            return false;
        }

        let mut changed = false;
        if !self.symbols.iter().any(|s| s == &self.from) {
            let fallback = self.fallback_code(default_from, 0);
            debug!("Unknown source currency {}, falling back to {fallback}", self.from);
            self.from = fallback;
            changed = true;
        }
        if !self.symbols.iter().any(|s| s == &self.to) {
            let fallback = self.fallback_code(default_to, 1);
            debug!("Unknown target currency {}, falling back to {fallback}", self.to);
            self.to = fallback;
            changed = true;
        }

        if changed {
            self.clear_conversion();
        }
        changed
    }

    fn fallback_code(&self, preferred: &str, index: usize) -> String {
        if self.symbols.iter().any(|s| s == preferred) {
            return preferred.to_string();
        }
        self.symbols
            .get(index)
            .or_else(|| self.symbols.first())
            .cloned()
            .unwrap_or_default()
    }

    /// Exchanges `from` and `to` as a single state update. The previous
    /// result/rate refer to the old direction and are cleared; the trigger
    /// refreshes them.
    pub fn swap(&mut self) {
        std::mem::swap(&mut self.from, &mut self.to);
        self.clear_conversion();
    }

    pub fn clear_conversion(&mut self) {
        self.rate = None;
        self.result.clear();
    }

    /// Whether the conversion trigger may dispatch a request: the symbol
    /// set is loaded and the amount is positive.
    pub fn can_convert(&self) -> bool {
        !self.symbols.is_empty() && self.amount.is_some_and(|a| a > 0.0)
    }
}
