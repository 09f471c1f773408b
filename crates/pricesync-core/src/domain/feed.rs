//! 외부 시세 피드 인터페이스.
//!
//! 구체적인 피드 어댑터(Yahoo Finance 등)는 이 trait을 구현하며,
//! 테스트에서는 가짜 구현으로 대체합니다.

use crate::domain::DailyBar;
use crate::error::FeedResult;
use crate::types::Exchange;
use async_trait::async_trait;

/// 종목 하나의 일봉을 조회하는 시세 피드.
///
/// 한 번 생성된 핸들을 모든 워커가 공유하므로 `Send + Sync`여야 합니다.
#[async_trait]
pub trait FeedClient: Send + Sync {
    /// 피드 이름 (로그용).
    fn name(&self) -> &str;

    /// 피드 세션을 수립합니다.
    ///
    /// 스캔 시작 시 한 번만 호출됩니다. 실패하면 스캔 전체가 중단됩니다.
    async fn connect(&self) -> FeedResult<()> {
        Ok(())
    }

    /// 최근 거래일의 일봉 1개를 조회합니다.
    async fn fetch_daily(&self, symbol: &str, exchange: Exchange) -> FeedResult<DailyBar>;
}
