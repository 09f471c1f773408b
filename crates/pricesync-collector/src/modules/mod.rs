//! 수집 파이프라인 모듈.
//!
//! - `resume` - 이미 저장된 종목 제외
//! - `executor` - 웨이브 하나의 동시 조회
//! - `orchestrator` - 웨이브 반복, 백오프, 종료 상태
//! - `checkpoint` - 조회 성공분 JSON Lines 로그
//! - `pipeline` - 멱등 배치 upsert
//! - `report` - 실패 종목 리포트
//! - `market_sync` / `portfolio_refresh` - CLI가 실행하는 워크플로우

pub mod checkpoint;
pub mod executor;
pub mod market_sync;
pub mod orchestrator;
pub mod pipeline;
pub mod portfolio_refresh;
pub mod report;
pub mod resume;

pub use checkpoint::{read_entries, CheckpointEntry, CheckpointError, CheckpointWriter};
pub use executor::{FetchExecutor, FetchOutcome, WaveResult};
pub use market_sync::sync_market;
pub use orchestrator::{ScanError, ScanOrchestrator, ScanOutcome, ScanReport};
pub use pipeline::{dedupe_latest, BatchPipeline};
pub use portfolio_refresh::refresh_portfolio;
pub use report::FailureReporter;
pub use resume::filter_pending;
