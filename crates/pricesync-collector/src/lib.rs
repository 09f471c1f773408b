//! End-of-day price scan and ingest pipeline.
//!
//! 거래소 하나의 일봉을 조회해 저장소에 적재하는 바이너리를 제공합니다:
//! - 재개 필터 (오늘 이미 저장된 종목 제외)
//! - 웨이브 기반 동시 조회와 선형 백오프 재시도
//! - 체크포인트 로그 (JSON Lines)
//! - 멱등 배치 upsert
//! - 실패 종목 리포트
//! - 포트폴리오 현재가 갱신

pub mod config;
pub mod error;
pub mod modules;
pub mod stats;

pub use config::CollectorConfig;
pub use error::{CollectorError, Result};
pub use stats::{CollectionStats, SyncStats};
