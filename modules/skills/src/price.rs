//! `fetch-price`: current quote for one ticker, with USD conversion.

use anyhow::Result;
use async_trait::async_trait;
use clap::Parser;
use serde::Serialize;
use tracing::{info, warn};
use yahoo_finance_client::{is_valid_symbol, QuoteMeta, YahooFinanceClient};

use skills_common::{run_all, Config, OutputFormat, Reporter, RunResult, SkillError};

use crate::error::SchemaError;

pub const REPORTER: Reporter = Reporter::new(OutputFormat::Single, "symbol", "symbols");

const QUOTE_PAGE_URL: &str = "https://finance.yahoo.com/quote";

#[derive(Debug, Clone, Parser)]
#[command(
    name = "fetch-price",
    about = "Fetch the current price of a stock, ETF, index, or crypto pair"
)]
pub struct PriceArgs {
    /// Ticker symbol, e.g. AAPL, VOD.L, BTC-USD
    pub symbol: String,
}

impl PriceArgs {
    pub fn normalized_symbol(&self) -> Result<String, SkillError> {
        let symbol = self.symbol.trim().to_uppercase();
        if !is_valid_symbol(&symbol) {
            return Err(SkillError::InvalidArgument(format!(
                "invalid symbol {:?}",
                self.symbol
            )));
        }
        Ok(symbol)
    }
}

#[async_trait]
pub trait QuoteBackend: Send + Sync {
    async fn quote(&self, symbol: &str) -> Result<QuoteMeta>;
    async fn usd_rate(&self, currency: &str) -> Result<Option<f64>>;
}

#[async_trait]
impl QuoteBackend for YahooFinanceClient {
    async fn quote(&self, symbol: &str) -> Result<QuoteMeta> {
        Ok(YahooFinanceClient::quote(self, symbol).await?)
    }

    async fn usd_rate(&self, currency: &str) -> Result<Option<f64>> {
        Ok(YahooFinanceClient::usd_rate(self, currency).await?)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceOutput {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub symbol: String,
    pub name: String,
    pub price: f64,
    pub currency: String,
    pub change_percent: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub volume: Option<u64>,
    pub price_usd: Option<f64>,
    pub high_usd: Option<f64>,
    pub low_usd: Option<f64>,
    pub url: String,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Currency reported for a quote; Yahoo omits it for some indices.
pub fn currency_of(meta: &QuoteMeta) -> String {
    meta.currency
        .as_deref()
        .filter(|c| !c.is_empty())
        .unwrap_or("USD")
        .to_uppercase()
}

/// Shape a quote. `usd_rate` is ignored for USD assets; when it is `None`
/// the `*_usd` fields stay null.
pub fn normalize(symbol: &str, meta: &QuoteMeta, usd_rate: Option<f64>) -> Result<PriceOutput, SchemaError> {
    let price = meta
        .regular_market_price
        .ok_or_else(|| SchemaError::Rejected(format!("no price data for {symbol}")))?;
    let currency = currency_of(meta);

    let change_percent = meta
        .prior_close()
        .filter(|prev| *prev != 0.0)
        .map(|prev| round2((price - prev) / prev * 100.0));

    let high = meta.regular_market_day_high.filter(|v| *v != 0.0);
    let low = meta.regular_market_day_low.filter(|v| *v != 0.0);

    let rate = usd_rate.filter(|r| *r > 0.0 && currency != "USD");
    let convert = |value: Option<f64>| rate.and_then(|r| value.map(|v| round2(v * r)));

    let name = meta
        .long_name
        .clone()
        .or_else(|| meta.short_name.clone())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| symbol.to_string());

    Ok(PriceOutput {
        kind: "price",
        symbol: symbol.to_string(),
        name,
        price: round2(price),
        currency,
        change_percent,
        high: high.map(round2),
        low: low.map(round2),
        volume: meta.regular_market_volume,
        price_usd: convert(Some(price)),
        high_usd: convert(high),
        low_usd: convert(low),
        url: format!("{QUOTE_PAGE_URL}/{symbol}"),
    })
}

/// Quote plus, for non-USD assets, one FX lookup. A failed FX lookup only
/// drops the USD fields.
pub async fn fetch_price(backend: &dyn QuoteBackend, symbol: &str) -> Result<PriceOutput> {
    let meta = backend.quote(symbol).await?;
    let currency = currency_of(&meta);

    let rate = if currency == "USD" {
        None
    } else {
        match backend.usd_rate(&currency).await {
            Ok(rate) => rate,
            Err(e) => {
                warn!(symbol, %currency, error = %format!("{e:#}"), "FX lookup failed");
                None
            }
        }
    };

    let output = normalize(symbol, &meta, rate)?;
    info!(symbol, price = output.price, %currency, "Fetched price");
    Ok(output)
}

pub async fn execute_with<B: QuoteBackend>(
    args: PriceArgs,
    backend: B,
) -> Result<RunResult<PriceOutput>, SkillError> {
    let symbol = args.normalized_symbol()?;
    let backend = &backend;
    Ok(run_all(vec![symbol], 1, |item| async move {
        fetch_price(backend, &item.target).await
    })
    .await)
}

/// No credential needed; `config` is taken for a uniform skill signature.
pub async fn execute(_config: &Config, args: PriceArgs) -> Result<RunResult<PriceOutput>, SkillError> {
    execute_with(args, YahooFinanceClient::new()).await
}
