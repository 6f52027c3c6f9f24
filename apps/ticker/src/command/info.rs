use chrono::Utc;
use stock::{
    MarketData, Period, Profile, Ticker, TickerInfo, Timeframe,
    money::{currency_symbol, format_money},
};
use tracing::{debug, info};

use super::fetch_failed;
use crate::{Context, Error};

pub async fn info(ctx: &mut Context<'_>, args: &[&str]) -> Result<(), Error> {
    let Some(symbol) = args.first() else {
        ctx.say("Usage: info <ticker>")?;
        return Ok(());
    };

    let ticker = Ticker::new(symbol);
    let data = ctx.data;

    info!(symbol = %ticker, "info: invoked");
    ctx.say(format!("Fetching information about {ticker}..."))?;

    let stock_info = match data.market.info(&ticker).await {
        Ok(i) => i,
        Err(e) => return fetch_failed(ctx, &ticker, e),
    };

    // Yahoo throttles the profile endpoint hard; the summary works without it
    let profile = match data.market.profile(&ticker).await {
        Ok(p) => p,
        Err(e) => {
            debug!(symbol = %ticker, error = %e, "info: profile unavailable");
            Profile::default()
        }
    };

    let last_close = match data
        .market
        .history(&ticker, Period::Day1, Timeframe::Day1)
        .await
    {
        Ok(bars) => bars.iter().rev().find_map(|b| b.close),
        Err(e) => return fetch_failed(ctx, &ticker, e),
    };

    let in_euro = match last_close {
        Some(close) => to_euro(&*data.market, &stock_info.currency, close).await,
        None => None,
    };

    let price = SharePrice {
        close: last_close,
        in_euro,
    };
    for line in summary(&ticker, &stock_info, &profile, price) {
        ctx.say(line)?;
    }

    info!(symbol = %ticker, "info: completed");
    Ok(())
}

/// Convert a share price through the `<CUR>EUR=X` rate. `None` when the
/// quote already is in euros or no rate could be fetched.
async fn to_euro(market: &dyn MarketData, currency: &str, price: f64) -> Option<f64> {
    let (code, price) = match currency {
        "EUR" => return None,
        // London quotes in pence
        "GBp" => ("GBP", price / 100.0),
        code => (code, price),
    };

    let pair = Ticker::fx_pair(code, "EUR");
    match market.history(&pair, Period::Day1, Timeframe::Day1).await {
        Ok(bars) => bars.iter().rev().find_map(|b| b.close).map(|rate| price * rate),
        Err(e) => {
            debug!(pair = %pair, error = %e, "info: no exchange rate");
            None
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct SharePrice {
    close: Option<f64>,
    in_euro: Option<f64>,
}

fn summary(
    ticker: &Ticker,
    info: &TickerInfo,
    profile: &Profile,
    price: SharePrice,
) -> Vec<String> {
    let title = format!("================= Information {ticker} =================");
    let mut lines = vec![String::new(), title.clone(), String::new()];

    match (&info.long_name, &profile.sector) {
        (Some(name), Some(sector)) => {
            lines.push(format!(" {name} is a company in the {sector} sector."))
        }
        (Some(name), None) => lines.push(format!(" {name}.")),
        _ => {}
    }

    if let Some(employees) = profile.employees {
        lines.push(format!(
            " It has an estimated amount of {employees} full-time employees."
        ));
    }

    match price.close {
        Some(close) => {
            let euro = price
                .in_euro
                .map(|e| format!(", or €{}", format_money(e)))
                .unwrap_or_default();
            lines.push(format!(
                " At this time, one share is worth {}{} ({}){euro}.",
                currency_symbol(&info.currency),
                format_money(close),
                info.currency
            ))
        }
        None => lines.push(" No recent share price is available.".to_string()),
    }

    let local = Utc::now().with_timezone(&info.exchange_tz());
    lines.push(format!(
        " Local date at the exchange: {} (UTC{}).",
        local.format("%d %B %Y"),
        local.format("%:z")
    ));

    lines.push(String::new());
    lines.push("=".repeat(title.chars().count()));
    lines.push(String::new());
    lines
}
