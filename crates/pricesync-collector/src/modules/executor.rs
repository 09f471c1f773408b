//! 동시 조회 실행기.
//!
//! 한 웨이브 동안 종목 목록을 제한된 수의 워커로 조회합니다.
//! 각 종목은 독립적으로 처리되며, 한 종목의 실패가 웨이브를 멈추지 않습니다.
//!
//! 워커마다:
//! 1. `[jitter_min, jitter_max]` 범위의 임의 지연
//! 2. `FeedClient::fetch_daily` 호출
//! 3. 성공 시 `Observation` 변환 후 체크포인트 기록
//! 4. 실패 시 사유와 함께 실패 목록에 추가 (재시도할 수 없는 에러는 거부 목록)

use super::checkpoint::CheckpointWriter;
use chrono::Utc;
use futures::stream::{self, StreamExt};
use pricesync_core::{Exchange, FeedClient, Observation};
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// 종목 하나의 조회 결과.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// 조회 성공
    Fetched(Observation),
    /// 조회 실패. `retryable`이면 다음 웨이브에서 재시도
    Failed {
        symbol: String,
        reason: String,
        retryable: bool,
    },
    /// 취소되어 조회하지 않음
    Cancelled(String),
}

/// 한 웨이브의 결과.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WaveResult {
    pub succeeded: Vec<Observation>,
    pub failed: Vec<String>,
    /// 재시도해도 결과가 같은 종목 (지원하지 않는 거래소, 파싱 불가 응답)
    pub rejected: Vec<String>,
    /// 취소로 조회하지 못한 종목 (성공도 실패도 아님)
    pub cancelled: Vec<String>,
}

impl WaveResult {
    fn from_outcomes(outcomes: Vec<FetchOutcome>) -> Self {
        let mut result = Self::default();
        for outcome in outcomes {
            match outcome {
                FetchOutcome::Fetched(obs) => result.succeeded.push(obs),
                FetchOutcome::Failed {
                    symbol,
                    retryable: true,
                    ..
                } => result.failed.push(symbol),
                FetchOutcome::Failed { symbol, .. } => result.rejected.push(symbol),
                FetchOutcome::Cancelled(symbol) => result.cancelled.push(symbol),
            }
        }
        result
    }
}

/// 제한된 워커 풀로 한 웨이브를 실행합니다.
pub struct FetchExecutor {
    feed: Arc<dyn FeedClient>,
    checkpoint: Arc<CheckpointWriter>,
    workers: usize,
    jitter_min: Duration,
    jitter_max: Duration,
}

impl FetchExecutor {
    pub fn new(feed: Arc<dyn FeedClient>, checkpoint: Arc<CheckpointWriter>, workers: usize) -> Self {
        Self {
            feed,
            checkpoint,
            workers: workers.max(1),
            jitter_min: Duration::ZERO,
            jitter_max: Duration::ZERO,
        }
    }

    /// 요청 전 임의 지연 범위를 설정합니다.
    pub fn with_jitter(mut self, min: Duration, max: Duration) -> Self {
        self.jitter_min = min.min(max);
        self.jitter_max = max.max(min);
        self
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// 웨이브 하나를 실행합니다. 모든 종목이 끝나야 반환합니다.
    pub async fn run_wave(
        &self,
        symbols: &[String],
        exchange: Exchange,
        cancel: &CancellationToken,
    ) -> WaveResult {
        let outcomes: Vec<FetchOutcome> = stream::iter(symbols.iter().cloned())
            .map(|symbol| self.fetch_one(symbol, exchange, cancel))
            .buffer_unordered(self.workers)
            .collect()
            .await;

        WaveResult::from_outcomes(outcomes)
    }

    async fn fetch_one(
        &self,
        symbol: String,
        exchange: Exchange,
        cancel: &CancellationToken,
    ) -> FetchOutcome {
        if cancel.is_cancelled() {
            return FetchOutcome::Cancelled(symbol);
        }

        let delay = self.sample_jitter();
        tokio::select! {
            _ = cancel.cancelled() => return FetchOutcome::Cancelled(symbol),
            _ = tokio::time::sleep(delay) => {}
        }

        let fetched = tokio::select! {
            biased;
            _ = cancel.cancelled() => return FetchOutcome::Cancelled(symbol),
            result = self.feed.fetch_daily(&symbol, exchange) => result,
        };

        let observation = match fetched
            .and_then(|bar| Observation::from_bar(&symbol, exchange, &bar, Utc::now()))
        {
            Ok(observation) => observation,
            Err(e) => {
                let retryable = e.is_retryable();
                warn!(exchange = %exchange, symbol = %symbol, error = %e, retryable, "종목 조회 실패");
                return FetchOutcome::Failed {
                    symbol,
                    reason: e.to_string(),
                    retryable,
                };
            }
        };

        if let Err(e) = self.checkpoint.append(&observation).await {
            error!(symbol = %observation.symbol, error = %e, "체크포인트 기록 실패");
        }

        info!(
            exchange = %exchange,
            symbol = %observation.symbol,
            close = %observation.close_decimal(),
            volume = observation.volume,
            "종목 조회 완료"
        );
        FetchOutcome::Fetched(observation)
    }

    fn sample_jitter(&self) -> Duration {
        if self.jitter_max.is_zero() {
            return Duration::ZERO;
        }
        let millis = rand::thread_rng()
            .gen_range(self.jitter_min.as_millis() as u64..=self.jitter_max.as_millis() as u64);
        debug!(millis, "요청 지연");
        Duration::from_millis(millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use pricesync_core::{DailyBar, FeedError, FeedResult};
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// `fail` 목록의 종목은 항상 실패하는 피드. `UNLISTED`는 지원하지 않는 종목.
    struct StubFeed {
        fail: HashSet<String>,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    impl StubFeed {
        fn new(fail: &[&str]) -> Self {
            Self {
                fail: fail.iter().map(|s| s.to_string()).collect(),
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl FeedClient for StubFeed {
        fn name(&self) -> &str {
            "stub"
        }

        async fn fetch_daily(&self, symbol: &str, _exchange: Exchange) -> FeedResult<DailyBar> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(10)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if symbol == "UNLISTED" {
                return Err(FeedError::Unsupported(format!("{symbol}: no suffix")));
            }
            if self.fail.contains(symbol) {
                return Err(FeedError::Network(format!("{symbol}: connection reset")));
            }
            Ok(DailyBar {
                timestamp: Utc.with_ymd_and_hms(2025, 3, 14, 7, 0, 0).unwrap(),
                open: 10.0,
                high: 11.0,
                low: 9.5,
                close: 10.5,
                volume: 1000.0,
            })
        }
    }

    fn symbols(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn executor(feed: Arc<StubFeed>, workers: usize) -> FetchExecutor {
        FetchExecutor::new(feed, Arc::new(CheckpointWriter::disabled()), workers)
    }

    #[tokio::test]
    async fn test_single_failure_is_isolated() {
        let feed = Arc::new(StubFeed::new(&["X"]));
        let result = executor(feed, 2)
            .run_wave(&symbols(&["X", "Y"]), Exchange::Bist, &CancellationToken::new())
            .await;

        assert_eq!(result.failed, vec!["X"]);
        assert_eq!(result.succeeded.len(), 1);
        assert_eq!(result.succeeded[0].symbol, "Y");
        assert_eq!(result.succeeded[0].close, 10_500_000);
    }

    #[tokio::test]
    async fn test_unsupported_symbol_is_rejected_not_retried() {
        let feed = Arc::new(StubFeed::new(&["X"]));
        let result = executor(feed, 2)
            .run_wave(
                &symbols(&["X", "UNLISTED", "Y"]),
                Exchange::Bist,
                &CancellationToken::new(),
            )
            .await;

        assert_eq!(result.failed, vec!["X"]);
        assert_eq!(result.rejected, vec!["UNLISTED"]);
        assert_eq!(result.succeeded.len(), 1);
    }

    #[tokio::test]
    async fn test_checkpoint_failure_keeps_fetched_observation() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("raw");
        std::fs::write(&blocker, "").unwrap();
        let exec = FetchExecutor::new(
            Arc::new(StubFeed::new(&[])),
            Arc::new(CheckpointWriter::new(blocker)),
            1,
        );

        let result = exec
            .run_wave(&symbols(&["A"]), Exchange::Bist, &CancellationToken::new())
            .await;

        assert_eq!(result.succeeded.len(), 1);
        assert!(result.failed.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_worker_bound_is_respected() {
        let feed = Arc::new(StubFeed::new(&[]));
        let list: Vec<String> = (0..12).map(|i| format!("S{i}")).collect();

        let result = executor(Arc::clone(&feed), 3)
            .run_wave(&list, Exchange::Bist, &CancellationToken::new())
            .await;

        assert_eq!(result.succeeded.len(), 12);
        assert!(feed.max_in_flight.load(Ordering::SeqCst) <= 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_jitter_delays_each_request() {
        let feed = Arc::new(StubFeed::new(&[]));
        let exec = executor(feed, 1)
            .with_jitter(Duration::from_millis(500), Duration::from_millis(1500));

        let started = tokio::time::Instant::now();
        exec.run_wave(&symbols(&["A", "B"]), Exchange::Bist, &CancellationToken::new())
            .await;

        assert!(started.elapsed() >= Duration::from_millis(1000));
    }

    #[tokio::test]
    async fn test_cancelled_token_skips_all() {
        let feed = Arc::new(StubFeed::new(&[]));
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = executor(feed, 2)
            .run_wave(&symbols(&["A", "B"]), Exchange::Bist, &cancel)
            .await;

        assert!(result.succeeded.is_empty());
        assert!(result.failed.is_empty());
        assert_eq!(result.cancelled.len(), 2);
    }
}
