//! 스캔 오케스트레이터.
//!
//! 재개 필터를 거친 종목 목록에 대해 웨이브를 반복 실행합니다.
//! 실패한 종목만 다음 웨이브로 넘기고, 웨이브 사이에는 선형 백오프로 대기합니다.
//! 재시도할 수 없는 에러로 거부된 종목은 다시 조회하지 않고 실패 리포트에 남깁니다.
//!
//! # 상태 전이
//!
//! ```text
//! INIT ─(pending 없음)──────────────▶ DONE
//!  │
//!  └─(connect)─▶ SCANNING(1) ─▶ SCANNING(k+1) ─▶ ...
//!                     │               │
//!                     ├─ 실패/거부 없음 ──▶ DONE
//!                     ├─ 재시도 대상 없음, 거부 있음 ──▶ EXHAUSTED (실패 리포트)
//!                     ├─ k == max ──▶ EXHAUSTED (실패 리포트)
//!                     └─ 취소 ──────▶ CANCELLED
//! ```

use super::checkpoint::CheckpointWriter;
use super::executor::FetchExecutor;
use super::report::FailureReporter;
use super::resume::filter_pending;
use crate::config::ScanConfig;
use chrono::NaiveDate;
use pricesync_core::{Exchange, FeedClient, FeedError, Observation};
use pricesync_data::PriceStore;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// 스캔을 시작할 수 없는 에러.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("피드 연결 실패: {0}")]
    Connection(#[source] FeedError),
}

/// 스캔 종료 상태.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOutcome {
    /// 모든 종목 수집 완료 (또는 할 일 없음)
    Done,
    /// 최대 웨이브 후에도 실패 종목이 남거나 거부된 종목이 있음
    Exhausted,
    /// 취소됨
    Cancelled,
}

impl ScanOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Done => "done",
            Self::Exhausted => "exhausted",
            Self::Cancelled => "cancelled",
        }
    }
}

/// 스캔 결과.
#[derive(Debug)]
pub struct ScanReport {
    pub outcome: ScanOutcome,
    /// 모든 웨이브에서 수집한 관측치
    pub observations: Vec<Observation>,
    /// 끝까지 수집하지 못한 종목
    pub unresolved: Vec<String>,
    /// 실행한 웨이브 수
    pub waves: u32,
    /// 실패 리포트 경로 (EXHAUSTED에서 기록 성공 시)
    pub report_path: Option<PathBuf>,
    /// 실패 리포트 기록 에러
    pub report_error: Option<std::io::Error>,
}

impl ScanReport {
    fn finished(outcome: ScanOutcome, observations: Vec<Observation>, unresolved: Vec<String>, waves: u32) -> Self {
        Self {
            outcome,
            observations,
            unresolved,
            waves,
            report_path: None,
            report_error: None,
        }
    }
}

/// 웨이브 기반 스캔 실행기.
pub struct ScanOrchestrator {
    store: Arc<dyn PriceStore>,
    feed: Arc<dyn FeedClient>,
    executor: FetchExecutor,
    reporter: FailureReporter,
    max_attempts: u32,
    backoff_base: Duration,
}

impl ScanOrchestrator {
    pub fn new(
        store: Arc<dyn PriceStore>,
        feed: Arc<dyn FeedClient>,
        checkpoint: Arc<CheckpointWriter>,
        reporter: FailureReporter,
        config: &ScanConfig,
    ) -> Self {
        let (jitter_min, jitter_max) = config.jitter_range();
        let executor = FetchExecutor::new(Arc::clone(&feed), checkpoint, config.workers)
            .with_jitter(jitter_min, jitter_max);

        Self {
            store,
            feed,
            executor,
            reporter,
            max_attempts: config.max_attempts.max(1),
            backoff_base: config.backoff_base(),
        }
    }

    /// k번째 웨이브 후 대기 시간 (`k * base`, 상한 없음).
    pub fn backoff(&self, wave: u32) -> Duration {
        self.backoff_base * wave
    }

    /// 스캔을 실행합니다.
    ///
    /// `date`는 재개 필터가 조회할 거래일입니다.
    pub async fn orchestrate(
        &self,
        symbols: Vec<String>,
        exchange: Exchange,
        date: NaiveDate,
        cancel: &CancellationToken,
    ) -> Result<ScanReport, ScanError> {
        // INIT
        let mut pending = filter_pending(self.store.as_ref(), symbols, exchange, date).await;
        if pending.is_empty() {
            info!(exchange = %exchange, "수집할 종목 없음");
            return Ok(ScanReport::finished(ScanOutcome::Done, Vec::new(), Vec::new(), 0));
        }

        self.feed.connect().await.map_err(|e| {
            warn!(exchange = %exchange, feed = self.feed.name(), error = %e, "피드 연결 실패");
            ScanError::Connection(e)
        })?;

        info!(
            exchange = %exchange,
            feed = self.feed.name(),
            pending = pending.len(),
            workers = self.executor.workers(),
            max_attempts = self.max_attempts,
            "스캔 시작"
        );

        let mut observations = Vec::new();
        let mut rejected = Vec::new();
        let mut wave = 0;

        loop {
            if cancel.is_cancelled() {
                pending.extend(rejected);
                return Ok(self.cancelled(exchange, observations, pending, wave));
            }

            // SCANNING(k)
            wave += 1;
            let result = self.executor.run_wave(&pending, exchange, cancel).await;
            info!(
                exchange = %exchange,
                attempt = wave,
                pending = pending.len(),
                succeeded = result.succeeded.len(),
                failed = result.failed.len(),
                rejected = result.rejected.len(),
                "웨이브 완료"
            );

            observations.extend(result.succeeded);
            rejected.extend(result.rejected);
            let mut next = result.failed;

            if !result.cancelled.is_empty() {
                next.extend(result.cancelled);
                next.extend(rejected);
                return Ok(self.cancelled(exchange, observations, next, wave));
            }

            pending = next;
            if pending.is_empty() && rejected.is_empty() {
                info!(exchange = %exchange, waves = wave, collected = observations.len(), "스캔 완료");
                return Ok(ScanReport::finished(ScanOutcome::Done, observations, Vec::new(), wave));
            }

            if pending.is_empty() || wave >= self.max_attempts {
                pending.extend(rejected);
                return Ok(self.exhausted(exchange, observations, pending, wave).await);
            }

            let delay = self.backoff(wave);
            info!(
                exchange = %exchange,
                retry = pending.len(),
                delay_secs = delay.as_secs_f64(),
                "실패 종목 재시도 대기"
            );
            tokio::select! {
                _ = cancel.cancelled() => {
                    pending.extend(rejected);
                    return Ok(self.cancelled(exchange, observations, pending, wave));
                }
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }

    async fn exhausted(
        &self,
        exchange: Exchange,
        observations: Vec<Observation>,
        unresolved: Vec<String>,
        waves: u32,
    ) -> ScanReport {
        warn!(
            exchange = %exchange,
            waves,
            unresolved = unresolved.len(),
            collected = observations.len(),
            "최대 재시도 도달, 일부 종목 수집 실패"
        );

        let mut report = ScanReport::finished(ScanOutcome::Exhausted, observations, unresolved, waves);
        match self.reporter.report_failures(exchange, &report.unresolved).await {
            Ok(path) => report.report_path = Some(path),
            Err(e) => report.report_error = Some(e),
        }
        report
    }

    fn cancelled(
        &self,
        exchange: Exchange,
        observations: Vec<Observation>,
        unresolved: Vec<String>,
        waves: u32,
    ) -> ScanReport {
        warn!(
            exchange = %exchange,
            waves,
            unresolved = unresolved.len(),
            collected = observations.len(),
            "스캔 취소됨"
        );
        ScanReport::finished(ScanOutcome::Cancelled, observations, unresolved, waves)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn orchestrator(base_secs: u64) -> ScanOrchestrator {
        let config = ScanConfig {
            backoff_base_secs: base_secs,
            ..ScanConfig::default()
        };
        ScanOrchestrator::new(
            Arc::new(pricesync_data::MemoryPriceStore::new()),
            Arc::new(pricesync_data::YahooFeedClient::new()),
            Arc::new(CheckpointWriter::disabled()),
            FailureReporter::new("logs"),
            &config,
        )
    }

    #[test]
    fn test_backoff_is_linear() {
        let orch = orchestrator(2);
        assert_eq!(orch.backoff(1), Duration::from_secs(2));
        assert_eq!(orch.backoff(2), Duration::from_secs(4));
        assert_eq!(orch.backoff(4), Duration::from_secs(8));
    }

    #[tokio::test]
    async fn test_empty_symbols_is_done_without_connect() {
        let orch = orchestrator(2);
        let report = orch
            .orchestrate(
                Vec::new(),
                Exchange::Bist,
                NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(),
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(report.outcome, ScanOutcome::Done);
        assert_eq!(report.waves, 0);
        assert!(report.observations.is_empty());
    }
}
