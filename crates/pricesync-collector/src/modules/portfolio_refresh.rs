//! 포트폴리오 현재가 갱신.
//!
//! 보유 주식(STOCK)을 하나씩 조회해 `portfolio_assets`의 현재가를 갱신합니다.
//! 요청 제한을 피하기 위해 종목 사이에 고정 딜레이를 둡니다.

use crate::error::CollectorError;
use crate::{CollectionStats, CollectorConfig, Result};
use pricesync_core::{normalize_symbols, FeedClient, PriceCodec};
use pricesync_data::PriceStore;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

/// 포트폴리오 보유 주식의 현재가를 갱신합니다.
///
/// 종목 단위 실패는 통계에만 반영합니다. 보유 종목 조회 실패와
/// 피드 연결이 끊긴 경우는 에러로 반환합니다.
pub async fn refresh_portfolio(
    store: &dyn PriceStore,
    feed: &dyn FeedClient,
    config: &CollectorConfig,
    cancel: &CancellationToken,
) -> Result<CollectionStats> {
    let start = Instant::now();
    let mut stats = CollectionStats::new();
    let exchange = config.scan.exchange;

    let symbols = normalize_symbols(store.stock_portfolio_symbols().await?);
    tracing::info!(count = symbols.len(), exchange = %exchange, "포트폴리오 갱신 시작");

    if symbols.is_empty() {
        tracing::info!("갱신할 보유 주식이 없습니다");
        stats.elapsed = start.elapsed();
        return Ok(stats);
    }

    feed.connect().await.map_err(CollectorError::Connection)?;

    for symbol in &symbols {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::warn!("취소 신호 수신, 포트폴리오 갱신 중단");
                break;
            }
            _ = tokio::time::sleep(config.portfolio.request_delay()) => {}
        }

        stats.total += 1;

        let bar = match feed.fetch_daily(symbol, exchange).await {
            Ok(bar) if bar.close.is_finite() => bar,
            Ok(_) => {
                tracing::warn!(symbol = %symbol, "유효하지 않은 종가");
                stats.errors += 1;
                continue;
            }
            Err(e) if e.is_fatal() => {
                tracing::error!(symbol = %symbol, error = %e, "피드 연결 끊김, 포트폴리오 갱신 중단");
                return Err(CollectorError::Connection(e));
            }
            Err(e) => {
                tracing::warn!(symbol = %symbol, error = %e, "현재가 조회 실패");
                stats.errors += 1;
                continue;
            }
        };

        let price = PriceCodec::to_scaled(bar.close);
        match store.update_portfolio_price(symbol, price).await {
            Ok(true) => {
                tracing::info!(symbol = %symbol, price = %PriceCodec::to_decimal(price), "현재가 갱신");
                stats.success += 1;
            }
            Ok(false) => {
                tracing::warn!(symbol = %symbol, "포트폴리오에 없는 종목");
                stats.skipped += 1;
            }
            Err(e) => {
                tracing::error!(symbol = %symbol, error = %e, "현재가 저장 실패");
                stats.errors += 1;
            }
        }
    }

    stats.elapsed = start.elapsed();
    Ok(stats)
}
