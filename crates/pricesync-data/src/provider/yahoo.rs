//! Yahoo Finance 일봉 피드.
//!
//! 거래소 코드를 Yahoo 심볼 접미사로 바꿔 최근 5일 일봉을 조회하고,
//! 그 중 마지막 봉을 반환합니다.

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use pricesync_core::{DailyBar, Exchange, FeedClient, FeedError, FeedResult};
use tokio::sync::OnceCell;
use tracing::{debug, info};
use yahoo_finance_api as yahoo;

/// 조회 간격 (일봉).
const DAILY_INTERVAL: &str = "1d";
/// 조회 범위. 휴장일이 끼어도 최근 봉이 하나는 포함되도록 5일.
const LOOKBACK_RANGE: &str = "5d";

/// Yahoo Finance 기반 `FeedClient`.
///
/// 커넥터는 `connect()`에서 한 번만 생성되고 이후 모든 워커가 공유합니다.
#[derive(Default)]
pub struct YahooFeedClient {
    connector: OnceCell<yahoo::YahooConnector>,
}

impl YahooFeedClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// 거래소 심볼을 Yahoo Finance 심볼로 변환합니다.
    pub fn yahoo_symbol(symbol: &str, exchange: Exchange) -> String {
        match exchange {
            Exchange::Bist => format!("{}.IS", symbol),
            Exchange::Lse => format!("{}.L", symbol),
            Exchange::Xetra => format!("{}.DE", symbol),
            Exchange::Nasdaq | Exchange::Nyse | Exchange::Amex => symbol.to_string(),
            Exchange::Binance => {
                let base = symbol
                    .strip_suffix("USDT")
                    .or_else(|| symbol.strip_suffix("USD"))
                    .unwrap_or(symbol);
                format!("{}-USD", base)
            }
            Exchange::FxIdc => format!("{}=X", symbol),
        }
    }
}

#[async_trait]
impl FeedClient for YahooFeedClient {
    fn name(&self) -> &str {
        "yahoo"
    }

    async fn connect(&self) -> FeedResult<()> {
        self.connector
            .get_or_try_init(|| async {
                info!("Yahoo Finance 커넥터 생성");
                yahoo::YahooConnector::new()
                    .map_err(|e| FeedError::Connection(format!("Yahoo Finance 연결 실패: {}", e)))
            })
            .await?;
        Ok(())
    }

    async fn fetch_daily(&self, symbol: &str, exchange: Exchange) -> FeedResult<DailyBar> {
        let connector = self
            .connector
            .get()
            .ok_or_else(|| FeedError::Connection("connect() 호출 전입니다".to_string()))?;

        let yahoo_symbol = Self::yahoo_symbol(symbol, exchange);
        debug!(symbol = %yahoo_symbol, "Yahoo Finance 일봉 조회");

        let response = connector
            .get_quote_range(&yahoo_symbol, DAILY_INTERVAL, LOOKBACK_RANGE)
            .await
            .map_err(|e| FeedError::Network(format!("{}: {}", yahoo_symbol, e)))?;

        let quotes = response
            .quotes()
            .map_err(|e| FeedError::Parse(format!("{}: {}", yahoo_symbol, e)))?;

        let last = quotes
            .last()
            .ok_or_else(|| FeedError::Empty(yahoo_symbol.clone()))?;

        let timestamp = Utc
            .timestamp_opt(last.timestamp as i64, 0)
            .single()
            .ok_or_else(|| FeedError::Parse(format!("{}: 잘못된 타임스탬프", yahoo_symbol)))?;

        Ok(DailyBar {
            timestamp,
            open: last.open,
            high: last.high,
            low: last.low,
            close: last.close,
            volume: last.volume as f64,
        })
    }
}
