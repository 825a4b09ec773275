use async_trait::async_trait;
use chrono::DateTime;
use serde::Deserialize;

use crate::external::market_provider::{MarketDataProvider, ProviderError};
use crate::models::{AnalystRecommendation, MarketSnapshot, PricePoint};

pub struct YahooProvider {
    client: reqwest::Client,
}

impl YahooProvider {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for YahooProvider {
    fn default() -> Self {
        Self::new()
    }
}

// Minimal response structs (only what we need)

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    timestamp: Vec<i64>,
    indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    quote: Vec<ChartQuote>,
}

#[derive(Debug, Deserialize)]
struct ChartQuote {
    close: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct SummaryResponse {
    #[serde(rename = "quoteSummary")]
    quote_summary: QuoteSummary,
}

#[derive(Debug, Deserialize)]
struct QuoteSummary {
    result: Option<Vec<SummaryResult>>,
}

#[derive(Debug, Deserialize)]
struct SummaryResult {
    price: Option<PriceModule>,
    #[serde(rename = "summaryDetail")]
    summary_detail: Option<SummaryDetail>,
    #[serde(rename = "defaultKeyStatistics")]
    key_statistics: Option<KeyStatistics>,
    #[serde(rename = "financialData")]
    financial_data: Option<FinancialData>,
    #[serde(rename = "summaryProfile")]
    summary_profile: Option<SummaryProfile>,
}

#[derive(Debug, Deserialize)]
struct RawValue {
    raw: Option<f64>,
}

fn raw(v: &Option<RawValue>) -> Option<f64> {
    v.as_ref().and_then(|x| x.raw)
}

#[derive(Debug, Deserialize)]
struct PriceModule {
    #[serde(rename = "longName")]
    long_name: Option<String>,
    #[serde(rename = "regularMarketPrice")]
    regular_market_price: Option<RawValue>,
}

#[derive(Debug, Deserialize)]
struct SummaryDetail {
    #[serde(rename = "fiftyTwoWeekHigh")]
    fifty_two_week_high: Option<RawValue>,
    #[serde(rename = "fiftyTwoWeekLow")]
    fifty_two_week_low: Option<RawValue>,
    #[serde(rename = "trailingPE")]
    trailing_pe: Option<RawValue>,
    #[serde(rename = "forwardPE")]
    forward_pe: Option<RawValue>,
    #[serde(rename = "dividendYield")]
    dividend_yield: Option<RawValue>,
}

#[derive(Debug, Deserialize)]
struct KeyStatistics {
    #[serde(rename = "pegRatio")]
    peg_ratio: Option<RawValue>,
    #[serde(rename = "priceToBook")]
    price_to_book: Option<RawValue>,
}

#[derive(Debug, Deserialize)]
struct FinancialData {
    #[serde(rename = "recommendationKey")]
    recommendation_key: Option<String>,
    #[serde(rename = "targetMeanPrice")]
    target_mean_price: Option<RawValue>,
}

#[derive(Debug, Deserialize)]
struct SummaryProfile {
    sector: Option<String>,
    industry: Option<String>,
}

fn classify_status(status: reqwest::StatusCode) -> Option<ProviderError> {
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return Some(ProviderError::RateLimited);
    }
    if status == reqwest::StatusCode::NOT_FOUND {
        return Some(ProviderError::NotFound);
    }
    if !status.is_success() {
        return Some(ProviderError::BadResponse(format!("http {status}")));
    }
    None
}

#[async_trait]
impl MarketDataProvider for YahooProvider {
    async fn fetch_snapshot(&self, ticker: &str) -> Result<MarketSnapshot, ProviderError> {
        let url = format!(
            "https://query1.finance.yahoo.com/v10/finance/quoteSummary/{ticker}\
             ?modules=price,summaryDetail,defaultKeyStatistics,financialData,summaryProfile"
        );

        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        if let Some(err) = classify_status(resp.status()) {
            return Err(err);
        }

        let body = resp
            .json::<SummaryResponse>()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        let result = body
            .quote_summary
            .result
            .and_then(|mut r| r.pop())
            .ok_or(ProviderError::NotFound)?;

        let price = result
            .price
            .ok_or_else(|| ProviderError::BadResponse("missing price module".into()))?;
        let current_price = raw(&price.regular_market_price)
            .ok_or_else(|| ProviderError::BadResponse("missing market price".into()))?;

        let detail = result.summary_detail;
        let stats = result.key_statistics;
        let financial = result.financial_data;
        let profile = result.summary_profile;

        Ok(MarketSnapshot {
            company_name: price.long_name.unwrap_or_else(|| ticker.to_string()),
            sector: profile
                .as_ref()
                .and_then(|p| p.sector.clone())
                .unwrap_or_else(|| "Unknown".to_string()),
            industry: profile
                .as_ref()
                .and_then(|p| p.industry.clone())
                .unwrap_or_else(|| "Unknown".to_string()),
            current_price,
            fifty_two_week_high: detail
                .as_ref()
                .and_then(|d| raw(&d.fifty_two_week_high))
                .unwrap_or(current_price),
            fifty_two_week_low: detail
                .as_ref()
                .and_then(|d| raw(&d.fifty_two_week_low))
                .unwrap_or(current_price),
            pe_ratio: detail.as_ref().and_then(|d| raw(&d.trailing_pe)),
            forward_pe: detail.as_ref().and_then(|d| raw(&d.forward_pe)),
            peg_ratio: stats.as_ref().and_then(|s| raw(&s.peg_ratio)),
            price_to_book: stats.as_ref().and_then(|s| raw(&s.price_to_book)),
            // Yahoo reports yield as a fraction; scoring expects percent.
            dividend_yield: detail
                .as_ref()
                .and_then(|d| raw(&d.dividend_yield))
                .map(|y| y * 100.0),
            recommendation: financial
                .as_ref()
                .and_then(|f| f.recommendation_key.as_deref())
                .map(AnalystRecommendation::from_provider)
                .unwrap_or_default(),
            target_price: financial.as_ref().and_then(|f| raw(&f.target_mean_price)),
        })
    }

    async fn fetch_history(
        &self,
        ticker: &str,
        lookback_days: u32,
    ) -> Result<Vec<PricePoint>, ProviderError> {
        // Yahoo supports ranges like "6mo", "1y". Map days roughly.
        let range = if lookback_days <= 30 {
            "1mo"
        } else if lookback_days <= 180 {
            "6mo"
        } else if lookback_days <= 365 {
            "1y"
        } else {
            "2y"
        };

        let url = format!(
            "https://query1.finance.yahoo.com/v8/finance/chart/{ticker}?range={range}&interval=1d"
        );

        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        if let Some(err) = classify_status(resp.status()) {
            return Err(err);
        }

        let body = resp
            .json::<ChartResponse>()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        let result = body
            .chart
            .result
            .and_then(|mut r| r.pop())
            .ok_or(ProviderError::NotFound)?;

        // timestamp aligns with the close list by index
        let closes = result
            .indicators
            .quote
            .first()
            .ok_or_else(|| ProviderError::BadResponse("missing quote".into()))?
            .close
            .clone();

        let mut out = Vec::new();

        for (i, ts) in result.timestamp.iter().enumerate() {
            // skip missing closes
            let Some(close) = closes.get(i).and_then(|v| *v) else {
                continue;
            };

            let dt = DateTime::from_timestamp(*ts, 0)
                .ok_or_else(|| ProviderError::Parse("bad timestamp".into()))?;

            out.push(PricePoint {
                date: dt.date_naive(),
                close,
            });
        }

        // Ensure ascending by date
        out.sort_by_key(|p| p.date);

        Ok(out)
    }
}
