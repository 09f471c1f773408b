//! TradingView 스캐너 기반 티커 목록 조회.
//!
//! 거래소별 지역 엔드포인트에 필터 쿼리를 POST하여
//! 보통주/우선주 티커 목록과 장 상태를 가져옵니다.

use crate::error::{DataError, Result};
use async_trait::async_trait;
use pricesync_core::Exchange;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{info, warn};

/// TradingView 스캐너 기본 URL.
pub const TRADINGVIEW_SCANNER_URL: &str = "https://scanner.tradingview.com";

/// 한 번에 요청하는 최대 종목 수.
const SCAN_RANGE_LIMIT: u32 = 2000;
/// 요청 타임아웃.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// 거래소 티커 목록 소스.
#[async_trait]
pub trait TickerSource: Send + Sync {
    /// 거래소의 전체 티커 목록.
    async fn fetch_tickers(&self, exchange: Exchange) -> Result<Vec<String>>;
}

/// 장 상태와 티커 목록.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketSnapshot {
    /// 장 상태 (open, closed, holiday 등)
    pub status: String,
    pub tickers: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ScanResponse {
    #[serde(default)]
    data: Vec<ScanRow>,
}

#[derive(Debug, Deserialize)]
struct ScanRow {
    d: Vec<Value>,
}

/// TradingView 스캐너 클라이언트.
pub struct TickerScanner {
    client: reqwest::Client,
    base_url: String,
}

impl TickerScanner {
    pub fn new() -> Result<Self> {
        Self::with_base_url(TRADINGVIEW_SCANNER_URL)
    }

    /// 다른 엔드포인트(테스트 서버 등)를 사용하는 클라이언트.
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent("Mozilla/5.0")
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// 스캐너 지역 코드. 주식 스캔을 지원하지 않는 거래소는 `None`.
    pub fn region(exchange: Exchange) -> Option<&'static str> {
        match exchange {
            Exchange::Bist => Some("turkey"),
            Exchange::Nasdaq | Exchange::Nyse | Exchange::Amex => Some("america"),
            Exchange::Lse => Some("uk"),
            Exchange::Xetra => Some("germany"),
            Exchange::Binance | Exchange::FxIdc => None,
        }
    }

    fn build_payload(exchange: Exchange, columns: &[&str]) -> Value {
        json!({
            "filter": [
                {"left": "type", "operation": "equal", "right": "stock"},
                {"left": "subtype", "operation": "in_range", "right": ["common", "preference"]},
                {"left": "exchange", "operation": "equal", "right": exchange.code()}
            ],
            "options": {"lang": "en"},
            "symbols": {"query": {"types": []}, "tickers": []},
            "columns": columns,
            "sort": {"sortBy": "name", "sortOrder": "asc"},
            "range": [0, SCAN_RANGE_LIMIT]
        })
    }

    async fn scan(&self, exchange: Exchange, columns: &[&str]) -> Result<Vec<ScanRow>> {
        let region = Self::region(exchange).ok_or_else(|| {
            warn!(exchange = %exchange, "주식 스캔을 지원하지 않는 거래소");
            DataError::Unsupported(format!("scanner does not cover {}", exchange))
        })?;

        let url = format!("{}/{}/scan", self.base_url, region);
        info!(exchange = %exchange, region, "시장 스캔 요청");

        let response = self
            .client
            .post(&url)
            .json(&Self::build_payload(exchange, columns))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DataError::FetchError(format!(
                "scanner returned {}: {}",
                status, body
            )));
        }

        let parsed: ScanResponse = response.json().await?;
        Ok(parsed.data)
    }

    /// 거래소 장 상태와 티커 목록을 함께 조회합니다.
    ///
    /// 장 상태는 첫 번째 종목의 값을 사용합니다 (거래소 전체에서 동일).
    pub async fn fetch_market_status(&self, exchange: Exchange) -> Result<MarketSnapshot> {
        let rows = self.scan(exchange, &["name", "market_status"]).await?;

        let status = rows
            .first()
            .and_then(|row| row.d.get(1))
            .and_then(Value::as_str)
            .unwrap_or("no_data")
            .to_string();
        let tickers = extract_names(&rows)?;

        info!(
            exchange = %exchange,
            status = %status.to_uppercase(),
            count = tickers.len(),
            "장 상태 조회 완료"
        );
        Ok(MarketSnapshot { status, tickers })
    }
}

#[async_trait]
impl TickerSource for TickerScanner {
    async fn fetch_tickers(&self, exchange: Exchange) -> Result<Vec<String>> {
        let rows = self.scan(exchange, &["name"]).await?;
        let tickers = extract_names(&rows)?;

        info!(exchange = %exchange, count = tickers.len(), "시장 스캔 완료");
        Ok(tickers)
    }
}

fn extract_names(rows: &[ScanRow]) -> Result<Vec<String>> {
    rows.iter()
        .map(|row| {
            row.d
                .first()
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or_else(|| DataError::ParseError("scan row without name column".to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_map() {
        assert_eq!(TickerScanner::region(Exchange::Bist), Some("turkey"));
        assert_eq!(TickerScanner::region(Exchange::Nyse), Some("america"));
        assert_eq!(TickerScanner::region(Exchange::Xetra), Some("germany"));
        assert_eq!(TickerScanner::region(Exchange::FxIdc), None);
    }

    #[test]
    fn test_payload_filters_exchange() {
        let payload = TickerScanner::build_payload(Exchange::Lse, &["name"]);

        assert_eq!(payload["filter"][2]["right"], "LSE");
        assert_eq!(payload["columns"], json!(["name"]));
        assert_eq!(payload["range"], json!([0, 2000]));
    }
}
