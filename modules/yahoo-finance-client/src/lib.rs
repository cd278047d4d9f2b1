pub mod error;
pub mod types;

pub use error::{Result, YahooError};
pub use types::{Chart, ChartEnvelope, ChartError, ChartResult, QuoteMeta};

use std::time::Duration;

const BASE_URL: &str = "https://query1.finance.yahoo.com";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Yahoo rejects requests without a browser-like user agent.
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko)";

/// Ticker characters Yahoo uses: letters, digits and `.^=-`.
pub fn is_valid_symbol(symbol: &str) -> bool {
    !symbol.is_empty()
        && symbol
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '^' | '=' | '-'))
}

pub struct YahooFinanceClient {
    client: reqwest::Client,
    base_url: String,
}

impl Default for YahooFinanceClient {
    fn default() -> Self {
        Self::new()
    }
}

impl YahooFinanceClient {
    pub fn new() -> Self {
        Self::with_base_url(BASE_URL)
    }

    pub fn with_base_url(base_url: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Latest daily quote metadata for a ticker.
    pub async fn quote(&self, symbol: &str) -> Result<QuoteMeta> {
        if !is_valid_symbol(symbol) {
            return Err(YahooError::InvalidSymbol(symbol.to_string()));
        }
        let url = format!("{}/v8/finance/chart/{}", self.base_url, symbol);
        tracing::debug!(symbol, "yahoo: fetching chart meta");

        let resp = self
            .client
            .get(&url)
            .query(&[("interval", "1d"), ("range", "1d")])
            .send()
            .await?;

        let status = resp.status();
        let bytes = resp.bytes().await?;

        // Unknown symbols come back as 404 with a chart.error body.
        if !status.is_success() {
            let message = serde_json::from_slice::<ChartEnvelope>(&bytes)
                .ok()
                .and_then(|e| e.chart.error)
                .and_then(|e| e.description)
                .unwrap_or_else(|| String::from_utf8_lossy(&bytes).into_owned());
            return Err(YahooError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let chart = serde_json::from_slice::<ChartEnvelope>(&bytes)?.chart;

        if let Some(err) = chart.error {
            return Err(YahooError::NoData {
                symbol: symbol.to_string(),
                reason: err
                    .description
                    .or(err.code)
                    .unwrap_or_else(|| "unknown error".to_string()),
            });
        }

        chart
            .result
            .and_then(|results| results.into_iter().next())
            .map(|r| r.meta)
            .ok_or_else(|| YahooError::NoData {
                symbol: symbol.to_string(),
                reason: "empty result".to_string(),
            })
    }

    /// Units of USD per one unit of `currency`, via the `<CUR>USD=X` pair.
    pub async fn usd_rate(&self, currency: &str) -> Result<Option<f64>> {
        let pair = format!("{}USD=X", currency.to_uppercase());
        let meta = self.quote(&pair).await?;
        Ok(meta.regular_market_price.filter(|r| *r > 0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_common_ticker_shapes() {
        for symbol in ["AAPL", "VOD.L", "^GSPC", "EURUSD=X", "BTC-USD", "7203.T"] {
            assert!(is_valid_symbol(symbol), "{symbol}");
        }
    }

    #[test]
    fn rejects_path_and_query_characters() {
        for symbol in ["", "A/B", "AAPL?x=1", "AAPL#frag", "A B", "%2F"] {
            assert!(!is_valid_symbol(symbol), "{symbol}");
        }
    }

    #[tokio::test]
    async fn quote_rejects_bad_symbol_before_sending() {
        let client = YahooFinanceClient::with_base_url("http://127.0.0.1:9");
        let err = client.quote("../v7/finance").await.unwrap_err();
        assert!(matches!(err, YahooError::InvalidSymbol(_)));
    }
}
