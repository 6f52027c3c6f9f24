mod graph;
mod help;
mod info;
mod quit;
mod watch;
mod watchlog;

use stock::{StockError, Ticker};
use tracing::{debug, info, warn};

use crate::{Context, Error};
use graph::graph;
use help::help;
use info::info;
use quit::quit;
pub use watch::report;
use watch::watch;
use watchlog::watchlog;

pub const NOT_RECOGNISED: &str = "That ticker could not be recognised. Is it spelt correctly?";

/// Run one line of user input. Blank lines do nothing.
pub async fn dispatch(ctx: &mut Context<'_>, line: &str) -> Result<(), Error> {
    let mut tokens = line.split_whitespace();
    let Some(name) = tokens.next() else {
        return Ok(());
    };
    let name = name.to_lowercase();
    let args: Vec<&str> = tokens.collect();

    debug!(command = %name, args = args.len(), "dispatch");

    match name.as_str() {
        "info" => info(ctx, &args).await,
        "watch" => watch(ctx, &args).await,
        "watchlog" => watchlog(ctx),
        "graph" => graph(ctx, &args).await,
        "help" => help(ctx),
        "quit" | "stop" | "exit" => quit(ctx),
        _ => {
            info!(command = %name, "unknown command");
            ctx.say(format!(
                "Command \"{name}\" not recognized. Type 'help' for a list of commands."
            ))?;
            Ok(())
        }
    }
}

/// Boolean-like tokens, English and Dutch.
pub fn parse_flag(token: &str) -> Option<bool> {
    match token.trim().to_lowercase().as_str() {
        "true" | "yes" | "ja" => Some(true),
        "false" | "no" | "nee" => Some(false),
        _ => None,
    }
}

/// Tell the user why a lookup failed. Only terminal I/O errors escape.
fn fetch_failed(ctx: &mut Context<'_>, ticker: &Ticker, err: StockError) -> Result<(), Error> {
    match err {
        StockError::TickerNotFound(_) => {
            info!(symbol = %ticker, "ticker not found");
            ctx.say(NOT_RECOGNISED)?;
        }
        e => {
            warn!(symbol = %ticker, error = %e, "market data request failed");
            ctx.say(format!("Could not reach the market data provider: {e}"))?;
        }
    }
    Ok(())
}
