//! Terminal rendering of the converter form.
//!
//! Rendering is a pure function of the session state: the same snapshot
//! always produces the same text. Styling is applied on top of the plain
//! field helpers so tests can assert on content.

use crate::state::ConverterState;
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Placeholder shown in the result field while a conversion is in flight.
pub const CONVERTING_PLACEHOLDER: &str = "Converting...";

/// Defines different styles for text elements.
pub enum StyleType {
    Title,
    Error,
    Value,
    Subtle,
}

/// Applies a consistent style to a string.
pub fn style_text(text: &str, style_type: StyleType) -> String {
    let styled = match style_type {
        StyleType::Title => style(text).bold().underlined(),
        StyleType::Error => style(text).red(),
        StyleType::Value => style(text).green().bold(),
        StyleType::Subtle => style(text).dim(),
    };
    styled.to_string()
}

/// Creates a new `comfy_table::Table` with standard styling.
pub fn new_styled_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Creates a styled header cell for a table.
pub fn header_cell(text: &str) -> Cell {
    Cell::new(text)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

/// Creates a new `indicatif::ProgressBar` spinner with standard styling.
pub fn new_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

/// Amount field text; empty field renders as its placeholder.
pub fn amount_field(state: &ConverterState) -> String {
    state
        .amount
        .map_or_else(|| "Enter amount".to_string(), |a| format!("{a}"))
}

/// Result field text: the converting placeholder while loading, otherwise
/// the formatted amount.
pub fn result_field(state: &ConverterState) -> String {
    if state.loading {
        return CONVERTING_PLACEHOLDER.to_string();
    }
    if state.result.is_empty() {
        return "0.00".to_string();
    }
    state.result.clone()
}

/// Rate line once the rate is known: `1 USD = 280.000000 PKR`.
pub fn rate_line(state: &ConverterState) -> Option<String> {
    state
        .rate
        .map(|rate| format!("1 {} = {:.6} {}", state.from, rate, state.to))
}

/// Renders the whole form for one state snapshot.
pub fn render_form(state: &ConverterState) -> String {
    let mut output = String::new();

    if !state.error.is_empty() {
        output.push_str(&style_text(&state.error, StyleType::Error));
        output.push('\n');
    }

    let selectors = format!("{} ⇄ {}", state.from, state.to);
    // Inputs are disabled while a request is outstanding.
    let selectors = if state.loading {
        style_text(&selectors, StyleType::Subtle)
    } else {
        selectors
    };

    output.push_str(&format!(
        "Amount: {}  [{}]\n",
        amount_field(state),
        selectors
    ));
    output.push_str(&format!(
        "Converted: {}\n",
        style_text(&result_field(state), StyleType::Value)
    ));

    if let Some(line) = rate_line(state) {
        output.push_str(&style_text(&line, StyleType::Subtle));
        output.push('\n');
    }

    output
}

/// Lays the currency codes out in a table, several per row.
pub fn symbols_table(symbols: &[String]) -> Table {
    const COLUMNS: usize = 8;

    let mut table = new_styled_table();
    for chunk in symbols.chunks(COLUMNS) {
        table.add_row(
            chunk
                .iter()
                .map(|code| Cell::new(code).set_alignment(CellAlignment::Center)),
        );
    }
    table
}
