//! 시세 피드 에러 타입.
//!
//! 종목 단위의 일시적 실패와 스캔 전체를 멈춰야 하는 연결 실패를 구분합니다.

use thiserror::Error;

/// 외부 시세 피드 에러.
#[derive(Debug, Error)]
pub enum FeedError {
    /// 피드 연결 수립 실패
    #[error("피드 연결 실패: {0}")]
    Connection(String),

    /// 네트워크 에러
    #[error("네트워크 에러: {0}")]
    Network(String),

    /// 해당 일자 데이터 없음
    #[error("데이터 없음: {0}")]
    Empty(String),

    /// 응답 파싱 실패
    #[error("파싱 에러: {0}")]
    Parse(String),

    /// 요청 타임아웃
    #[error("타임아웃: {0}")]
    Timeout(String),

    /// 지원하지 않는 거래소
    #[error("지원하지 않는 거래소: {0}")]
    Unsupported(String),
}

/// 피드 작업을 위한 Result 타입.
pub type FeedResult<T> = Result<T, FeedError>;

impl FeedError {
    /// 다음 웨이브에서 재시도할 가치가 있는 에러인지 확인합니다.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            FeedError::Network(_) | FeedError::Empty(_) | FeedError::Timeout(_)
        )
    }

    /// 스캔 전체를 중단해야 하는 에러인지 확인합니다.
    pub fn is_fatal(&self) -> bool {
        matches!(self, FeedError::Connection(_))
    }
}
