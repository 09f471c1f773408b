//! # PriceSync Core
//!
//! 일봉 가격 수집기의 핵심 도메인 모델 및 타입을 제공합니다.
//!
//! 이 크레이트는 수집 파이프라인 전반에서 사용되는 기본 타입을 제공합니다:
//! - 거래소 코드 및 심볼 정규화
//! - 고정소수점 가격 코덱
//! - 일봉 관측치(`Observation`)와 원시 피드 행(`DailyBar`)
//! - 외부 시세 피드 trait(`FeedClient`)
//! - 로깅 인프라

pub mod domain;
pub mod error;
pub mod logging;
pub mod types;

pub use domain::*;
pub use error::*;
pub use logging::*;
pub use types::*;
