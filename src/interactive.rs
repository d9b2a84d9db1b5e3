//! Interactive conversion session.
//!
//! Reads edit commands from stdin and feeds them to the engine; a render
//! task re-prints the form on every published state change. The session
//! ends on `quit` or end of input.

use crate::engine::{Engine, Input};
use crate::ui;
use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Edit(Input),
    Symbols,
    Help,
    Quit,
}

/// Parses one input line. A bare number edits the amount; everything else
/// is a keyword command. Unrecognized lines yield `None`.
pub fn parse_command(line: &str) -> Option<Command> {
    let mut parts = line.split_whitespace();
    let head = parts.next()?;

    match head.to_lowercase().as_str() {
        "quit" | "exit" | "q" => Some(Command::Quit),
        "help" | "?" => Some(Command::Help),
        "symbols" | "list" => Some(Command::Symbols),
        "swap" => Some(Command::Edit(Input::Swap)),
        "clear" => Some(Command::Edit(Input::Amount(None))),
        "from" => parts
            .next()
            .map(|code| Command::Edit(Input::From(code.to_string()))),
        "to" => parts
            .next()
            .map(|code| Command::Edit(Input::To(code.to_string()))),
        _ => head
            .parse::<f64>()
            .ok()
            .map(|amount| Command::Edit(Input::Amount(Some(amount)))),
    }
}

const HELP: &str = "\
Commands:
  <number>    set the amount to convert
  from CODE   set the source currency
  to CODE     set the target currency
  swap        exchange source and target
  clear       clear the amount
  symbols     list supported currencies
  quit        leave the session";

pub async fn run_session(engine: Engine) -> Result<()> {
    let (inputs, state) = engine.spawn();

    println!("{}", ui::style_text("Currency Converter", ui::StyleType::Title));
    println!("{}", ui::style_text(HELP, ui::StyleType::Subtle));

    // Render on every published snapshot; exits when the engine drops the
    // watch sender.
    let mut render_rx = state.clone();
    let renderer = tokio::spawn(async move {
        loop {
            let snapshot = render_rx.borrow_and_update().clone();
            println!("{}", ui::render_form(&snapshot));
            if render_rx.changed().await.is_err() {
                break;
            }
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match parse_command(&line) {
            Some(Command::Quit) => break,
            Some(Command::Help) => println!("{}", ui::style_text(HELP, ui::StyleType::Subtle)),
            Some(Command::Symbols) => {
                let symbols = state.borrow().symbols.clone();
                println!("{}", ui::symbols_table(&symbols));
            }
            Some(Command::Edit(input)) => {
                debug!(?input, "Applying edit");
                if inputs.send(input).await.is_err() {
                    break;
                }
            }
            None => {
                if !line.trim().is_empty() {
                    println!(
                        "{}",
                        ui::style_text("Unrecognized input (try `help`).", ui::StyleType::Subtle)
                    );
                }
            }
        }
    }

    // Closing the input channel stops the engine and the renderer with it.
    drop(inputs);
    let _ = renderer.await;

    Ok(())
}
