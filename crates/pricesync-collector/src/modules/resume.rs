//! 재개 필터.
//!
//! 오늘 이미 저장된 종목을 작업 목록에서 제외합니다.

use chrono::NaiveDate;
use pricesync_core::Exchange;
use pricesync_data::PriceStore;
use tracing::{error, info};

/// 저장소에 아직 없는 종목만 입력 순서대로 반환합니다.
///
/// 저장소 조회가 실패하면 전체 목록을 그대로 반환합니다 (fail-open).
pub async fn filter_pending(
    store: &dyn PriceStore,
    symbols: Vec<String>,
    exchange: Exchange,
    date: NaiveDate,
) -> Vec<String> {
    let existing = match store.existing_symbols(exchange, date).await {
        Ok(existing) => existing,
        Err(e) => {
            error!(
                exchange = %exchange,
                date = %date,
                error = %e,
                "처리 완료 종목 조회 실패, 전체 목록으로 진행"
            );
            return symbols;
        }
    };

    if existing.is_empty() {
        return symbols;
    }

    let total = symbols.len();
    let pending: Vec<String> = symbols
        .into_iter()
        .filter(|s| !existing.contains(s))
        .collect();

    let skipped = total - pending.len();
    if skipped > 0 {
        info!(
            exchange = %exchange,
            skipped,
            remaining = pending.len(),
            "이미 처리된 종목 건너뜀"
        );
    }

    pending
}
