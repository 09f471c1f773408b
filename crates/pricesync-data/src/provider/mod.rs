//! 외부 데이터 Provider 모듈.
//!
//! ## Yahoo Finance
//! - `YahooFeedClient`: 종목별 최근 일봉 조회 (`FeedClient` 구현)
//!
//! ## TradingView 스캐너
//! - `TickerScanner`: 거래소별 상장 종목 목록 및 장 상태 조회

pub mod scanner;
pub mod yahoo;

pub use scanner::{MarketSnapshot, TickerScanner, TickerSource, TRADINGVIEW_SCANNER_URL};
pub use yahoo::YahooFeedClient;
