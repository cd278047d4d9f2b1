use serde::Deserialize;

/// Envelope of `GET /v8/finance/chart/<symbol>`.
#[derive(Debug, Clone, Deserialize)]
pub struct ChartEnvelope {
    pub chart: Chart,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chart {
    pub result: Option<Vec<ChartResult>>,
    pub error: Option<ChartError>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartError {
    pub code: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartResult {
    pub meta: QuoteMeta,
}

/// Quote summary carried in the chart `meta` block.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteMeta {
    pub symbol: Option<String>,
    pub currency: Option<String>,
    pub long_name: Option<String>,
    pub short_name: Option<String>,
    pub regular_market_price: Option<f64>,
    pub previous_close: Option<f64>,
    pub chart_previous_close: Option<f64>,
    pub regular_market_day_high: Option<f64>,
    pub regular_market_day_low: Option<f64>,
    pub regular_market_volume: Option<u64>,
}

impl QuoteMeta {
    /// Prior session close, preferring the explicit field over the chart's.
    pub fn prior_close(&self) -> Option<f64> {
        self.previous_close.or(self.chart_previous_close)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meta_reads_camel_case() {
        let env: ChartEnvelope = serde_json::from_str(
            r#"{"chart":{"result":[{"meta":{
                "symbol":"SAP.DE","currency":"EUR","longName":"SAP SE",
                "regularMarketPrice":201.5,"chartPreviousClose":199.0,
                "regularMarketDayHigh":203.0,"regularMarketDayLow":198.25,
                "regularMarketVolume":1200345}}],"error":null}}"#,
        )
        .unwrap();
        let meta = &env.chart.result.unwrap()[0].meta;
        assert_eq!(meta.currency.as_deref(), Some("EUR"));
        assert_eq!(meta.regular_market_price, Some(201.5));
        assert_eq!(meta.prior_close(), Some(199.0));
        assert_eq!(meta.regular_market_volume, Some(1_200_345));
    }

    #[test]
    fn error_envelope_has_no_result() {
        let env: ChartEnvelope = serde_json::from_str(
            r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#,
        )
        .unwrap();
        assert!(env.chart.result.is_none());
        assert_eq!(env.chart.error.unwrap().code.as_deref(), Some("Not Found"));
    }
}
