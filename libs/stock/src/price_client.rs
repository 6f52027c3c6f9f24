use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{
    Client, StatusCode,
    header::{HeaderMap, HeaderValue, REFERER, USER_AGENT},
};
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};

use crate::{Bar, MarketData, Period, Profile, StockError, Ticker, TickerInfo, Timeframe};

const BROWSER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

#[derive(Clone)]
pub struct PriceClient {
    client: Client,
    base_api: String,
    cookie_url: String,
    crumb: Arc<Mutex<Option<String>>>,
}

impl PriceClient {
    /// `cookie_url` is any page that hands out the session cookie the crumb
    /// is bound to (`https://fc.yahoo.com` in production).
    pub fn new(
        base_api: impl Into<String>,
        cookie_url: impl Into<String>,
    ) -> Result<Self, StockError> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_AGENT));
        headers.insert(REFERER, HeaderValue::from_static("https://finance.yahoo.com/"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .cookie_store(true)
            .build()?;

        Ok(Self {
            client,
            base_api: base_api.into(),
            cookie_url: cookie_url.into(),
            crumb: Arc::new(Mutex::new(None)),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_api.trim_end_matches('/'), path)
    }

    async fn fetch_chart(
        &self,
        ticker: &Ticker,
        period: Period,
        interval: Timeframe,
    ) -> Result<ChartResult, StockError> {
        let url = self.url(&format!("v8/finance/chart/{}", ticker.symbol()));

        let res = self
            .client
            .get(url)
            .query(&[
                ("range", period.as_str()),
                ("interval", interval.as_str()),
                ("includePrePost", "false"),
            ])
            .send()
            .await?;

        // Unknown symbols come back as 404 with a regular error envelope
        let status = res.status();
        if !status.is_success() && status != StatusCode::NOT_FOUND {
            res.error_for_status_ref()?;
        }

        let body: ChartEnvelope = res.json().await?;
        body.into_result(ticker)
    }

    /// Yahoo wants a session cookie plus a matching crumb before it serves
    /// quoteSummary modules. Both are cached for the lifetime of the client.
    async fn crumb(&self) -> Result<String, StockError> {
        let mut cached = self.crumb.lock().await;
        if let Some(crumb) = cached.as_ref() {
            return Ok(crumb.clone());
        }

        // fc.yahoo.com answers 404 but still sets the cookie
        let _ = self.client.get(&self.cookie_url).send().await?;

        let crumb = self
            .client
            .get(self.url("v1/test/getcrumb"))
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        let crumb = crumb.trim().to_string();

        if crumb.is_empty() || crumb.contains(' ') || crumb.contains('<') {
            return Err(StockError::MissingData("crumb".to_string()));
        }

        *cached = Some(crumb.clone());
        Ok(crumb)
    }

    async fn fetch_profile(&self, ticker: &Ticker) -> Result<AssetProfile, StockError> {
        let crumb = self.crumb().await?;
        let url = self.url(&format!("v10/finance/quoteSummary/{}", ticker.symbol()));

        let res = self
            .client
            .get(url)
            .query(&[("modules", "assetProfile"), ("crumb", crumb.as_str())])
            .send()
            .await?;

        if res.status() == StatusCode::UNAUTHORIZED {
            // stale crumb, next call fetches a fresh one
            *self.crumb.lock().await = None;
        }

        let body: SummaryEnvelope = res.error_for_status()?.json().await?;
        body.quote_summary
            .result
            .into_iter()
            .flatten()
            .next()
            .and_then(|r| r.asset_profile)
            .ok_or_else(|| StockError::MissingData(format!("asset profile for {ticker}")))
    }
}

#[async_trait]
impl MarketData for PriceClient {
    #[instrument(name = "price_client.info", skip(self, ticker), fields(symbol = %ticker))]
    async fn info(&self, ticker: &Ticker) -> Result<TickerInfo, StockError> {
        let chart = self.fetch_chart(ticker, Period::Day1, Timeframe::Day1).await?;
        Ok(chart.meta.into_info())
    }

    #[instrument(name = "price_client.profile", skip(self, ticker), fields(symbol = %ticker))]
    async fn profile(&self, ticker: &Ticker) -> Result<Profile, StockError> {
        let profile = self.fetch_profile(ticker).await?;
        Ok(Profile {
            sector: profile.sector,
            employees: profile.full_time_employees,
        })
    }

    #[instrument(
        name = "price_client.history",
        skip(self, ticker),
        fields(symbol = %ticker, period = period.as_str(), interval = interval.as_str())
    )]
    async fn history(
        &self,
        ticker: &Ticker,
        period: Period,
        interval: Timeframe,
    ) -> Result<Vec<Bar>, StockError> {
        let chart = self.fetch_chart(ticker, period, interval).await?;
        let bars = chart.bars();
        debug!(bars = bars.len(), "fetched history");
        Ok(bars)
    }
}

//
// Match Yahoo Finance chart JSON
// https://query1.finance.yahoo.com/v8/finance/chart/{symbol}
//
#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    result: Option<Vec<ChartResult>>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    code: String,
    #[serde(default)]
    description: String,
}

impl ChartEnvelope {
    fn into_result(self, ticker: &Ticker) -> Result<ChartResult, StockError> {
        if let Some(err) = self.chart.error {
            if err.code == "Not Found" {
                return Err(StockError::TickerNotFound(ticker.to_string()));
            }
            warn!(code = %err.code, description = %err.description, "chart request rejected");
            return Err(StockError::Api {
                code: err.code,
                description: err.description,
            });
        }

        self.chart
            .result
            .into_iter()
            .flatten()
            .next()
            .ok_or_else(|| StockError::TickerNotFound(ticker.to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Vec<i64>,
    #[serde(default)]
    indicators: Indicators,
}

impl ChartResult {
    fn bars(&self) -> Vec<Bar> {
        let closes = self.indicators.quote.first().map(|q| &q.close);

        self.timestamp
            .iter()
            .enumerate()
            .filter_map(|(i, &ts)| {
                let timestamp = DateTime::<Utc>::from_timestamp(ts, 0)?;
                let close = closes
                    .and_then(|c| c.get(i).copied().flatten())
                    .filter(|v| !v.is_nan());
                Some(Bar { timestamp, close })
            })
            .collect()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    symbol: String,
    #[serde(default)]
    currency: Option<String>,
    #[serde(default)]
    exchange_timezone_name: Option<String>,
    #[serde(default)]
    long_name: Option<String>,
    #[serde(default)]
    short_name: Option<String>,
}

impl ChartMeta {
    fn into_info(self) -> TickerInfo {
        TickerInfo {
            symbol: self.symbol,
            long_name: self.long_name,
            short_name: self.short_name,
            currency: self.currency.unwrap_or_else(|| "USD".to_string()),
            exchange_timezone: self
                .exchange_timezone_name
                .unwrap_or_else(|| "UTC".to_string()),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<QuoteSeries>,
}

#[derive(Debug, Default, Deserialize)]
struct QuoteSeries {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

//
// quoteSummary?modules=assetProfile
//
#[derive(Debug, Deserialize)]
struct SummaryEnvelope {
    #[serde(rename = "quoteSummary")]
    quote_summary: SummaryBody,
}

#[derive(Debug, Deserialize)]
struct SummaryBody {
    result: Option<Vec<SummaryResult>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummaryResult {
    asset_profile: Option<AssetProfile>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AssetProfile {
    sector: Option<String>,
    full_time_employees: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHART: &str = r#"{
        "chart": {
            "result": [{
                "meta": {
                    "currency": "USD",
                    "symbol": "ACME",
                    "exchangeTimezoneName": "America/New_York",
                    "longName": "Acme Corporation",
                    "shortName": "Acme"
                },
                "timestamp": [1717075800, 1717162200, 1717421400],
                "indicators": {
                    "quote": [{
                        "open": [99.5, 100.5, null],
                        "high": [101.0, 102.5, null],
                        "low": [99.0, 100.0, null],
                        "close": [100.0, 102.0, null],
                        "volume": [1200, 1500, null]
                    }]
                }
            }],
            "error": null
        }
    }"#;

    const NOT_FOUND: &str = r#"{
        "chart": {
            "result": null,
            "error": {
                "code": "Not Found",
                "description": "No data found, symbol may be delisted"
            }
        }
    }"#;

    fn parse(body: &str) -> Result<ChartResult, StockError> {
        let envelope: ChartEnvelope = serde_json::from_str(body).expect("valid json");
        envelope.into_result(&Ticker::new("acme"))
    }

    #[test]
    fn bars_keep_gaps_as_none() {
        let bars = parse(CHART).expect("chart").bars();

        assert_eq!(bars.len(), 3);
        assert_eq!(bars[0].close, Some(100.0));
        assert_eq!(bars[1].close, Some(102.0));
        assert_eq!(bars[2].close, None);
        assert!(bars[0].timestamp < bars[1].timestamp);
    }

    #[test]
    fn meta_becomes_ticker_info() {
        let info = parse(CHART).expect("chart").meta.into_info();

        assert_eq!(info.symbol, "ACME");
        assert_eq!(info.currency, "USD");
        assert_eq!(info.exchange_timezone, "America/New_York");
        assert_eq!(info.display_name(), "Acme Corporation");
    }

    #[test]
    fn cookie_url_is_configurable() {
        let client = PriceClient::new("http://127.0.0.1:9/", "http://127.0.0.1:9/cookie")
            .expect("client");

        assert_eq!(client.cookie_url, "http://127.0.0.1:9/cookie");
        assert_eq!(
            client.url("v1/test/getcrumb"),
            "http://127.0.0.1:9/v1/test/getcrumb"
        );
    }

    #[test]
    fn not_found_error_maps_to_ticker_not_found() {
        let err = parse(NOT_FOUND).unwrap_err();
        assert!(matches!(err, StockError::TickerNotFound(s) if s == "ACME"));
    }

    #[test]
    fn other_api_errors_are_kept() {
        let body = r#"{"chart":{"result":null,"error":{"code":"Bad Request","description":"Invalid input"}}}"#;
        let err = parse(body).unwrap_err();
        assert!(matches!(err, StockError::Api { code, .. } if code == "Bad Request"));
    }

    #[test]
    fn empty_result_is_not_found() {
        let body = r#"{"chart":{"result":[],"error":null}}"#;
        assert!(matches!(parse(body), Err(StockError::TickerNotFound(_))));
    }

    #[test]
    fn asset_profile_parses() {
        let body = r#"{"quoteSummary":{"result":[{"assetProfile":{"sector":"Technology","fullTimeEmployees":164000}}],"error":null}}"#;
        let envelope: SummaryEnvelope = serde_json::from_str(body).expect("valid json");
        let profile = envelope
            .quote_summary
            .result
            .into_iter()
            .flatten()
            .next()
            .and_then(|r| r.asset_profile)
            .expect("profile");

        assert_eq!(profile.sector.as_deref(), Some("Technology"));
        assert_eq!(profile.full_time_employees, Some(164000));
    }
}
