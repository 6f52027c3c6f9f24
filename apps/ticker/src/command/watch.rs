use stock::{
    Bar, Period, StockError, Ticker, Timeframe,
    money::{format_money, price_diff},
};
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

use super::fetch_failed;
use crate::{
    Context, Error,
    state::{LogStyle, Watched},
};

pub async fn watch(ctx: &mut Context<'_>, args: &[&str]) -> Result<(), Error> {
    let Some(symbol) = args.first() else {
        ctx.say("Usage: watch <ticker>")?;
        return Ok(());
    };

    let ticker = Ticker::new(symbol);
    let data = ctx.data;

    info!(symbol = %ticker, "watch: invoked");
    ctx.say(format!("Fetching information about {ticker}..."))?;

    let stock_info = match data.market.info(&ticker).await {
        Ok(i) => i,
        Err(e) => return fetch_failed(ctx, &ticker, e),
    };

    let name = stock_info.display_name();
    ctx.say(format!(
        "You are now watching {name}. (price in {})",
        stock_info.currency
    ))?;
    ctx.say("Press Ctrl-C to stop watching.")?;

    info!(symbol = %ticker, "watch: started");
    ctx.state.start_watching(Watched { ticker, name });

    Ok(())
}

/// One poll of the watched ticker: fetch two daily bars and print the
/// change since the last poll and since the previous close.
///
/// A failed fetch is reported and otherwise ignored; the next poll retries.
#[instrument(name = "watch.report", skip(ctx))]
pub async fn report(ctx: &mut Context<'_>) -> Result<(), Error> {
    let Some(ticker) = ctx.state.watched.as_ref().map(|w| w.ticker.clone()) else {
        return Ok(());
    };
    let data = ctx.data;

    let closes = data
        .market
        .history(&ticker, Period::Day2, Timeframe::Day1)
        .await
        .and_then(|bars| last_two_closes(&bars));
    ctx.state.last_update = Instant::now();

    let (previous_close, current) = match closes {
        Ok(c) => c,
        Err(StockError::TickerNotFound(_)) => {
            // listed when the watch started, so treat like any other gap
            warn!(symbol = %ticker, "watch: ticker disappeared");
            return poll_failed(ctx, &ticker, "no longer listed");
        }
        Err(e) => {
            warn!(symbol = %ticker, error = %e, "watch: poll failed");
            return poll_failed(ctx, &ticker, &e.to_string());
        }
    };

    let price_now = format_money(current);
    let since_check = price_diff(&price_now, &ctx.state.last_price);
    let since_close = price_diff(&price_now, &format_money(previous_close));
    let line = format!("Current value {ticker}: {price_now} ({since_check} | {since_close})");

    debug!(symbol = %ticker, price = %price_now, "watch: reported");

    match ctx.state.log_style {
        LogStyle::Overwrite => {
            write!(ctx.out, "{}", overwrite(&line, ctx.state.line_width))?;
            ctx.out.flush()?;
            ctx.state.line_width = line.chars().count();
        }
        LogStyle::Append => ctx.say(&line)?,
    }

    ctx.state.last_price = price_now;
    Ok(())
}

fn poll_failed(ctx: &mut Context<'_>, ticker: &Ticker, reason: &str) -> Result<(), Error> {
    let secs = ctx.data.config.watch_interval.as_secs();
    let lead = if ctx.state.line_width > 0 { "\n" } else { "" };
    ctx.say(format!(
        "{lead}Could not update {ticker} ({reason}). Retrying in {secs}s."
    ))?;
    ctx.state.line_width = 0;
    Ok(())
}

/// `(previous close, current price)` from the two most recent bars.
fn last_two_closes(bars: &[Bar]) -> Result<(f64, f64), StockError> {
    match bars {
        [.., prev, last] => match (prev.close, last.close) {
            (Some(p), Some(c)) => Ok((p, c)),
            _ => Err(StockError::MissingData("close price".to_string())),
        },
        _ => Err(StockError::MissingData(format!(
            "expected 2 daily bars, got {}",
            bars.len()
        ))),
    }
}

/// Carriage return plus padding so a shorter line fully covers the last one.
fn overwrite(line: &str, previous_width: usize) -> String {
    let pad = previous_width.saturating_sub(line.chars().count());
    format!("\r{line}{}", " ".repeat(pad))
}
