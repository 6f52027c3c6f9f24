#![allow(dead_code)]

use std::{
    collections::HashMap,
    io::{self, Write},
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use anyhow::{Result, bail};
use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use serde_json::Value;
use stock::{
    Bar, MarketData, Period, Profile, StockError, Ticker, TickerInfo, Timeframe, graph::Chart,
};
use ticker::{Data, config::Config, render::ChartRenderer, shell::Shell};
use tokio::time::Instant;

#[derive(Default)]
struct MarketInner {
    tickers: HashMap<String, (TickerInfo, Vec<Option<f64>>)>,
    history_calls: Vec<(Instant, Period, Timeframe)>,
    profile_calls: usize,
    fail_history: bool,
    fail_info: bool,
}

/// In-memory market with one close series per symbol.
#[derive(Clone, Default)]
pub struct MockMarket {
    inner: Arc<Mutex<MarketInner>>,
}

impl MockMarket {
    pub fn with_ticker(self, symbol: &str, name: &str, closes: &[Option<f64>]) -> Self {
        let info = TickerInfo {
            symbol: symbol.to_string(),
            long_name: Some(name.to_string()),
            short_name: None,
            currency: "USD".to_string(),
            exchange_timezone: "America/New_York".to_string(),
        };
        self.inner
            .lock()
            .unwrap()
            .tickers
            .insert(symbol.to_string(), (info, closes.to_vec()));
        self
    }

    pub fn with_currency(self, symbol: &str, currency: &str) -> Self {
        if let Some((info, _)) = self.inner.lock().unwrap().tickers.get_mut(symbol) {
            info.currency = currency.to_string();
        }
        self
    }

    /// Quote for the `<from>EUR=X` exchange rate.
    pub fn with_euro_rate(self, from: &str, rate: f64) -> Self {
        let pair = Ticker::fx_pair(from, "EUR");
        self.with_ticker(pair.symbol(), pair.symbol(), &[Some(rate)])
    }

    pub fn fail_history(&self, fail: bool) {
        self.inner.lock().unwrap().fail_history = fail;
    }

    /// Make metadata lookups fail the way a dropped connection would.
    pub fn fail_info(&self, fail: bool) {
        self.inner.lock().unwrap().fail_info = fail;
    }

    pub fn history_calls(&self) -> Vec<(Instant, Period, Timeframe)> {
        self.inner.lock().unwrap().history_calls.clone()
    }

    pub fn profile_calls(&self) -> usize {
        self.inner.lock().unwrap().profile_calls
    }
}

#[async_trait]
impl MarketData for MockMarket {
    async fn info(&self, ticker: &Ticker) -> Result<TickerInfo, StockError> {
        let inner = self.inner.lock().unwrap();
        if inner.fail_info {
            return Err(StockError::Api {
                code: "Internal Server Error".to_string(),
                description: "upstream unavailable".to_string(),
            });
        }
        inner
            .tickers
            .get(ticker.symbol())
            .map(|(info, _)| info.clone())
            .ok_or_else(|| StockError::TickerNotFound(ticker.to_string()))
    }

    async fn profile(&self, ticker: &Ticker) -> Result<Profile, StockError> {
        let mut inner = self.inner.lock().unwrap();
        inner.profile_calls += 1;
        if !inner.tickers.contains_key(ticker.symbol()) {
            return Err(StockError::TickerNotFound(ticker.to_string()));
        }
        Ok(Profile {
            sector: Some("Industrials".to_string()),
            employees: Some(420),
        })
    }

    async fn history(
        &self,
        ticker: &Ticker,
        period: Period,
        interval: Timeframe,
    ) -> Result<Vec<Bar>, StockError> {
        let mut inner = self.inner.lock().unwrap();
        inner.history_calls.push((Instant::now(), period, interval));

        if inner.fail_history {
            return Err(StockError::MissingData("simulated outage".to_string()));
        }

        let (_, closes) = inner
            .tickers
            .get(ticker.symbol())
            .ok_or_else(|| StockError::TickerNotFound(ticker.to_string()))?;

        let start = Utc.with_ymd_and_hms(2024, 6, 3, 13, 30, 0).unwrap();
        Ok(closes
            .iter()
            .enumerate()
            .map(|(i, &close)| Bar {
                timestamp: start + Duration::days(i as i64),
                close,
            })
            .collect())
    }
}

#[derive(Default)]
struct RendererInner {
    shown: Vec<String>,
    charts: Vec<Value>,
    saved: Vec<PathBuf>,
    save_error: Option<String>,
}

/// Records what would have been displayed or written.
#[derive(Clone, Default)]
pub struct RecordingRenderer {
    inner: Arc<Mutex<RendererInner>>,
}

impl RecordingRenderer {
    pub fn failing_save(message: &str) -> Self {
        let r = Self::default();
        r.inner.lock().unwrap().save_error = Some(message.to_string());
        r
    }

    pub fn shown(&self) -> Vec<String> {
        self.inner.lock().unwrap().shown.clone()
    }

    /// Every displayed chart as the JSON option charming would hand to ECharts.
    pub fn charts(&self) -> Vec<Value> {
        self.inner.lock().unwrap().charts.clone()
    }

    pub fn saved(&self) -> Vec<PathBuf> {
        self.inner.lock().unwrap().saved.clone()
    }
}

impl ChartRenderer for RecordingRenderer {
    fn show(&self, title: &str, chart: &Chart) -> Result<()> {
        let json = serde_json::to_value(chart)?;
        let mut inner = self.inner.lock().unwrap();
        inner.shown.push(title.to_string());
        inner.charts.push(json);
        Ok(())
    }

    fn save(&self, _chart: &Chart, path: &Path) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(msg) = &inner.save_error {
            bail!("{msg}");
        }
        inner.saved.push(path.to_path_buf());
        Ok(())
    }
}

/// Cloneable stdout stand-in.
#[derive(Clone, Default)]
pub struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl SharedBuf {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

pub fn acme() -> MockMarket {
    MockMarket::default().with_ticker("ACME", "Acme Corporation", &[Some(100.0), Some(102.0)])
}

pub fn shell_with(market: MockMarket, renderer: RecordingRenderer, config: Config) -> (Shell, SharedBuf) {
    let out = SharedBuf::default();
    let data = Data {
        market: Arc::new(market),
        renderer: Arc::new(renderer),
        config,
    };
    (Shell::new(data, Box::new(out.clone())), out)
}

pub fn shell(market: MockMarket) -> (Shell, SharedBuf) {
    shell_with(market, RecordingRenderer::default(), Config::default())
}
