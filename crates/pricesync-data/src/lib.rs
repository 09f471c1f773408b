//! 저장소 및 시장 데이터 어댑터.
//!
//! 이 crate는 다음을 제공합니다:
//! - `PriceStore` trait과 PostgreSQL / 인메모리 구현
//! - Yahoo Finance 기반 일봉 피드(`YahooFeedClient`)
//! - TradingView 스캐너 기반 티커 목록 조회(`TickerScanner`)

pub mod error;
pub mod provider;
pub mod storage;

pub use error::{DataError, Result};

pub use provider::{MarketSnapshot, TickerScanner, TickerSource, YahooFeedClient};
pub use storage::{DatabaseConfig, MemoryPriceStore, PgPriceStore, PriceStore};
