use std::{env, path::PathBuf, time::Duration};

use anyhow::{Context, Result, bail};

use crate::{command::parse_flag, state::LogStyle};

#[derive(Clone, Debug)]
pub struct Config {
    pub api_base_url: String,
    pub cookie_url: String,
    pub watch_interval: Duration,
    pub graph_dir: PathBuf,
    pub log_style: LogStyle,
    pub open_charts: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "https://query1.finance.yahoo.com".to_string(),
            cookie_url: "https://fc.yahoo.com".to_string(),
            watch_interval: Duration::from_secs(5),
            graph_dir: PathBuf::from("graphs"),
            log_style: LogStyle::Overwrite,
            open_charts: true,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Every setting is optional; unset variables keep their default.
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(url) = var("TICKER_API_BASE_URL") {
            config.api_base_url = url;
        }

        if let Some(url) = var("TICKER_COOKIE_URL") {
            config.cookie_url = url;
        }

        if let Some(secs) = var("TICKER_WATCH_INTERVAL_SECS") {
            let secs: u64 = secs
                .trim()
                .parse()
                .with_context(|| format!("TICKER_WATCH_INTERVAL_SECS={secs:?} is not a number"))?;
            if secs == 0 {
                bail!("TICKER_WATCH_INTERVAL_SECS must be greater than zero");
            }
            config.watch_interval = Duration::from_secs(secs);
        }

        if let Some(dir) = var("TICKER_GRAPH_DIR") {
            config.graph_dir = PathBuf::from(dir);
        }

        if let Some(style) = var("TICKER_WATCH_LOG") {
            config.log_style = style
                .parse()
                .with_context(|| format!("TICKER_WATCH_LOG={style:?}"))?;
        }

        if let Some(open) = var("TICKER_OPEN_CHARTS") {
            config.open_charts = parse_flag(&open)
                .with_context(|| format!("TICKER_OPEN_CHARTS={open:?} is not a boolean"))?;
        }

        Ok(config)
    }
}
