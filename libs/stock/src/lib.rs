mod error;
mod market;
mod price_client;

pub mod graph;
pub mod money;

pub use error::StockError;
pub use market::{Bar, MarketData, Period, Profile, Ticker, TickerInfo, Timeframe};
pub use price_client::PriceClient;
