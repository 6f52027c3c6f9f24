use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use crate::StockError;

/// An exchange symbol, always trimmed and uppercased.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ticker(String);

impl Ticker {
    pub fn new(symbol: &str) -> Self {
        Self(symbol.trim().to_uppercase())
    }

    /// Yahoo's symbol for the rate converting `from` into `to`, e.g. `USDEUR=X`.
    pub fn fx_pair(from: &str, to: &str) -> Self {
        Self::new(&format!("{from}{to}=X"))
    }

    pub fn symbol(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lookback window of a history request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Day1,
    Day2,
    Day5,
    Month1,
    Month6,
    Year1,
}

impl Period {
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Day1 => "1d",
            Period::Day2 => "2d",
            Period::Day5 => "5d",
            Period::Month1 => "1mo",
            Period::Month6 => "6mo",
            Period::Year1 => "1y",
        }
    }
}

/// Spacing between two samples of a history request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timeframe {
    Minute1,
    Minute5,
    Day1,
    Day5,
}

impl Timeframe {
    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::Minute1 => "1m",
            Timeframe::Minute5 => "5m",
            Timeframe::Day1 => "1d",
            Timeframe::Day5 => "5d",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TickerInfo {
    pub symbol: String,
    pub long_name: Option<String>,
    pub short_name: Option<String>,
    pub currency: String,
    pub exchange_timezone: String,
}

impl TickerInfo {
    /// Name shown to the user: long name, short name, `<SYM>-INDEX` for
    /// `^`-prefixed index symbols, otherwise the bare symbol.
    pub fn display_name(&self) -> String {
        if let Some(name) = self.long_name.as_ref().or(self.short_name.as_ref()) {
            return name.clone();
        }

        match self.symbol.strip_prefix('^') {
            Some(index) => format!("{index}-INDEX"),
            None => self.symbol.clone(),
        }
    }

    /// Time zone the exchange quotes in, UTC when the name is unknown.
    pub fn exchange_tz(&self) -> Tz {
        self.exchange_timezone.parse().unwrap_or(Tz::UTC)
    }
}

/// Company details that only some instruments have.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Profile {
    pub sector: Option<String>,
    pub employees: Option<u64>,
}

/// One sample of a history series. `close` is absent when the exchange
/// reported no trades in that slot.
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub close: Option<f64>,
}

#[async_trait]
pub trait MarketData: Send + Sync {
    /// Resolve metadata for a symbol. Unknown symbols yield
    /// [`StockError::TickerNotFound`].
    async fn info(&self, ticker: &Ticker) -> Result<TickerInfo, StockError>;

    /// Sector and headcount. Costs extra round trips, so only the detailed
    /// summary asks for it.
    async fn profile(&self, ticker: &Ticker) -> Result<Profile, StockError>;

    /// Fetch bars oldest first.
    async fn history(
        &self,
        ticker: &Ticker,
        period: Period,
        interval: Timeframe,
    ) -> Result<Vec<Bar>, StockError>;
}
