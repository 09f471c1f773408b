//! 일봉 관측치 타입.
//!
//! - `DailyBar` - 피드가 돌려준 원시 일봉 한 행 (부동소수점)
//! - `Observation` - 한 종목의 하루치 가격/거래량 (스케일된 정수)

use crate::error::{FeedError, FeedResult};
use crate::types::{normalize_symbol, Exchange, PriceCodec, ScaledPrice};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 피드가 돌려준 원시 일봉.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyBar {
    /// 봉 시작 시각
    pub timestamp: DateTime<Utc>,
    /// 시가
    pub open: f64,
    /// 고가
    pub high: f64,
    /// 저가
    pub low: f64,
    /// 종가
    pub close: f64,
    /// 거래량 (주/로트 수, 소수 허용)
    pub volume: f64,
}

/// 한 종목의 하루치 가격/거래량 기록.
///
/// 생성 후에는 변경하지 않습니다. 저장소에서는 `(symbol, event_date)`가
/// 한 행을 식별하며, 같은 키로 다시 수집하면 기존 행을 덮어씁니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// 정규화된 심볼
    pub symbol: String,
    /// 수집한 거래소
    pub exchange: Exchange,
    /// 거래일
    pub event_date: NaiveDate,
    /// 조회 시각
    pub query_time: DateTime<Utc>,
    /// 시가 (스케일된 정수)
    pub open: ScaledPrice,
    /// 고가 (스케일된 정수)
    pub high: ScaledPrice,
    /// 저가 (스케일된 정수)
    pub low: ScaledPrice,
    /// 종가 (스케일된 정수)
    pub close: ScaledPrice,
    /// 거래량
    pub volume: f64,
}

impl Observation {
    /// 원시 일봉에서 관측치를 생성합니다.
    ///
    /// 심볼이 정규화 후 비어 있거나 가격이 유한하지 않으면 파싱 에러를 반환합니다.
    pub fn from_bar(
        symbol: &str,
        exchange: Exchange,
        bar: &DailyBar,
        query_time: DateTime<Utc>,
    ) -> FeedResult<Self> {
        let symbol = normalize_symbol(symbol);
        if symbol.is_empty() {
            return Err(FeedError::Parse("빈 심볼".to_string()));
        }

        let prices = [bar.open, bar.high, bar.low, bar.close, bar.volume];
        if prices.iter().any(|p| !p.is_finite()) {
            return Err(FeedError::Parse(format!("{}: 유효하지 않은 가격", symbol)));
        }

        Ok(Self {
            symbol,
            exchange,
            event_date: bar.timestamp.date_naive(),
            query_time,
            open: PriceCodec::to_scaled(bar.open),
            high: PriceCodec::to_scaled(bar.high),
            low: PriceCodec::to_scaled(bar.low),
            close: PriceCodec::to_scaled(bar.close),
            volume: bar.volume,
        })
    }

    /// 저장소 행 키 `(symbol, event_date)`.
    pub fn key(&self) -> (&str, NaiveDate) {
        (&self.symbol, self.event_date)
    }

    pub fn open_f64(&self) -> f64 {
        PriceCodec::to_float(self.open)
    }

    pub fn high_f64(&self) -> f64 {
        PriceCodec::to_float(self.high)
    }

    pub fn low_f64(&self) -> f64 {
        PriceCodec::to_float(self.low)
    }

    pub fn close_f64(&self) -> f64 {
        PriceCodec::to_float(self.close)
    }

    /// 종가를 정확한 십진수로 반환합니다.
    pub fn close_decimal(&self) -> Decimal {
        PriceCodec::to_decimal(self.close)
    }
}
