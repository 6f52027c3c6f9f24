use std::{fs, path::PathBuf};

use stock::{
    Ticker,
    graph::{GraphKind, axis_label, build_chart, forward_fill},
};
use tracing::{debug, error, info, warn};

use super::{fetch_failed, parse_flag};
use crate::{Context, Error};

pub async fn graph(ctx: &mut Context<'_>, args: &[&str]) -> Result<(), Error> {
    let [symbol, period, rest @ ..] = args else {
        ctx.say("Usage: graph <ticker> <period> [save]")?;
        return Ok(());
    };

    let save = match rest.first() {
        None => false,
        Some(token) => match parse_flag(token) {
            Some(save) => save,
            None => {
                ctx.say(format!("Argument \"{token}\" invalid.\nOptions: true, false"))?;
                return Ok(());
            }
        },
    };

    let kind: GraphKind = match period.parse() {
        Ok(k) => k,
        Err(e) => {
            ctx.say(format!(
                "Period \"{}\" invalid.\nOptions: {}",
                e.0,
                GraphKind::keys()
            ))?;
            return Ok(());
        }
    };

    let ticker = Ticker::new(symbol);
    let profile = kind.profile();
    let data = ctx.data;

    info!(symbol = %ticker, period = %kind, save, "graph: invoked");
    ctx.say(format!("Fetching information about {ticker}..."))?;

    let stock_info = match data.market.info(&ticker).await {
        Ok(i) => i,
        Err(e) => return fetch_failed(ctx, &ticker, e),
    };
    let name = stock_info.display_name();

    ctx.say(format!(
        "Generating a graph for {name} of the last {} ({}) with an interval of {}...",
        profile.label,
        profile.period.as_str(),
        profile.interval.as_str()
    ))?;

    let bars = match data
        .market
        .history(&ticker, profile.period, profile.interval)
        .await
    {
        Ok(b) => {
            info!(symbol = %ticker, bars = b.len(), "graph: fetched bars");
            b
        }
        Err(e) => return fetch_failed(ctx, &ticker, e),
    };

    if bars.is_empty() {
        ctx.say(format!(
            "No price data for {name} over the last {}.",
            profile.label
        ))?;
        return Ok(());
    }

    let tz = stock_info.exchange_tz();
    let labels: Vec<String> = bars
        .iter()
        .map(|b| axis_label(&b.timestamp.with_timezone(&tz), profile))
        .collect();
    let raw: Vec<Option<f64>> = bars.iter().map(|b| b.close).collect();
    let closes = forward_fill(&raw);

    let title = format!("{name} History - last {}", profile.period.as_str());
    let chart = build_chart(&title, labels, closes);

    debug!(symbol = %ticker, "graph: showing chart");
    if let Err(e) = data.renderer.show(&title, &chart) {
        warn!(symbol = %ticker, error = ?e, "graph: display failed");
        ctx.say(format!("Could not display the graph. ({e:#})"))?;
    }

    if !save {
        return Ok(());
    }

    let dir = &data.config.graph_dir;
    let path = dir.join(format!("{ticker}_{}.png", profile.period.as_str()));

    let saved = fs::create_dir_all(dir)
        .map_err(Error::from)
        .and_then(|_| data.renderer.save(&chart, &path));

    match saved {
        Ok(()) => {
            let shown: PathBuf = std::path::absolute(&path).unwrap_or_else(|_| path.clone());
            info!(symbol = %ticker, path = %shown.display(), "graph: saved");
            ctx.say(format!("Graph generated at \"{}\"", shown.display()))?;
        }
        Err(e) => {
            error!(symbol = %ticker, error = ?e, "graph: save failed");
            ctx.say(format!(
                "An error occurred while generating the graph. Please try again. ({e:#})"
            ))?;
        }
    }

    Ok(())
}
