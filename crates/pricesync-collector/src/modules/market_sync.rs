//! 시장 스캔 워크플로우.
//!
//! 티커 조회 → 웨이브 스캔 → 배치 upsert → 실패 리포트 순서로 실행합니다.
//! CLI `scan` 명령과 데몬 모드가 실행하는 단위입니다.

use super::checkpoint::CheckpointWriter;
use super::orchestrator::{ScanError, ScanOrchestrator};
use super::pipeline::BatchPipeline;
use super::report::FailureReporter;
use crate::error::CollectorError;
use crate::{CollectorConfig, Result, SyncStats};
use chrono::Utc;
use pricesync_core::{normalize_symbols, FeedClient};
use pricesync_data::{PriceStore, TickerSource};
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

/// 거래소 하나의 일봉을 수집해 저장합니다.
///
/// 거래소는 `config.scan.exchange`를 사용합니다. `symbols`가 주어지면
/// 티커 스캐너를 호출하지 않고 그 목록만 수집합니다.
pub async fn sync_market(
    store: Arc<dyn PriceStore>,
    feed: Arc<dyn FeedClient>,
    scanner: &dyn TickerSource,
    config: &CollectorConfig,
    symbols: Option<Vec<String>>,
    cancel: &CancellationToken,
) -> Result<SyncStats> {
    let start = Instant::now();
    let exchange = config.scan.exchange;
    let mut stats = SyncStats::new(exchange);

    tracing::info!(exchange = %exchange, "시장 스캔 시작");

    let targets = match symbols {
        Some(list) => {
            let syms = normalize_symbols(list);
            tracing::info!(count = syms.len(), "지정 종목 수집");
            syms
        }
        None => {
            let tickers = scanner
                .fetch_tickers(exchange)
                .await
                .map_err(|e| CollectorError::DataSource(e.to_string()))?;
            normalize_symbols(tickers)
        }
    };

    stats.requested = targets.len();
    if targets.is_empty() {
        tracing::warn!(exchange = %exchange, "수집할 종목이 없습니다");
        stats.elapsed = start.elapsed();
        return Ok(stats);
    }

    let orchestrator = ScanOrchestrator::new(
        Arc::clone(&store),
        feed,
        Arc::new(CheckpointWriter::from_config(&config.checkpoint)),
        FailureReporter::new(&config.report.dir),
        &config.scan,
    );

    let today = Utc::now().date_naive();
    let report = match orchestrator.orchestrate(targets, exchange, today, cancel).await {
        Ok(report) => report,
        Err(ScanError::Connection(e)) => return Err(CollectorError::Connection(e)),
    };

    stats.collected = report.observations.len();
    stats.unresolved = report.unresolved.len();
    stats.waves = report.waves;
    stats.outcome = report.outcome.as_str();
    stats.report_path = report.report_path;

    let pipeline = BatchPipeline::new(store, &config.batch);
    stats.saved = pipeline
        .insert_batch(report.observations)
        .await
        .map_err(CollectorError::Ingest)?;
    stats.elapsed = start.elapsed();

    if let Some(e) = report.report_error {
        stats.log_summary("시장 스캔");
        return Err(CollectorError::Report(e));
    }

    Ok(stats)
}
