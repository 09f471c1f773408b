//! 가격 저장소.
//!
//! 수집 파이프라인이 저장소에 요구하는 연산은 `PriceStore` trait으로 고정합니다.
//! - `PgPriceStore`: PostgreSQL 구현 (운영)
//! - `MemoryPriceStore`: 프로세스 내 구현 (dry-run, 테스트)

pub mod memory;
pub mod postgres;

pub use memory::MemoryPriceStore;
pub use postgres::{DatabaseConfig, PgPriceStore};

use crate::error::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use pricesync_core::{Exchange, Observation, ScaledPrice};
use std::collections::HashSet;

/// 일봉 저장소.
#[async_trait]
pub trait PriceStore: Send + Sync {
    /// 해당 거래소에서 `date`에 이미 처리된 심볼 집합.
    ///
    /// 거래일이 `date`이거나 `date`(UTC)에 조회된 행을 처리된 것으로 봅니다.
    /// 주말/휴장일 스캔은 직전 거래일 봉을 받습니다.
    async fn existing_symbols(&self, exchange: Exchange, date: NaiveDate)
        -> Result<HashSet<String>>;

    /// `(symbol, event_date)` 기준 일괄 upsert.
    ///
    /// 배치 전체가 반영되거나 아무것도 반영되지 않아야 합니다.
    /// 반영된 행 수를 반환합니다.
    async fn upsert_batch(&self, observations: &[Observation]) -> Result<u64>;

    /// 포트폴리오에 보유 중인 주식(STOCK) 심볼 목록.
    async fn stock_portfolio_symbols(&self) -> Result<Vec<String>>;

    /// 포트폴리오 종목의 현재가 갱신. 해당 종목이 없으면 `false`.
    async fn update_portfolio_price(&self, symbol: &str, price: ScaledPrice) -> Result<bool>;
}
