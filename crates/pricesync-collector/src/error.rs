//! 에러 타입 정의.

use pricesync_core::FeedError;
use pricesync_data::DataError;
use std::fmt;

/// Collector 에러 타입
#[derive(Debug)]
pub enum CollectorError {
    /// 설정 에러
    Config(String),
    /// 저장소 에러 (연결, 조회)
    Database(DataError),
    /// 데이터 소스 에러 (스캐너, 피드)
    DataSource(String),
    /// 피드 연결 실패 (스캔 중단)
    Connection(FeedError),
    /// 배치 upsert 최종 실패
    Ingest(DataError),
    /// 실패 리포트 기록 실패
    Report(std::io::Error),
    /// 파일 입출력 에러
    Io(std::io::Error),
}

impl fmt::Display for CollectorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "Configuration error: {}", msg),
            Self::Database(e) => write!(f, "Database error: {}", e),
            Self::DataSource(msg) => write!(f, "Data source error: {}", msg),
            Self::Connection(e) => write!(f, "Feed connection error: {}", e),
            Self::Ingest(e) => write!(f, "Batch ingest failed: {}", e),
            Self::Report(e) => write!(f, "Failure report could not be written: {}", e),
            Self::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for CollectorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Database(e) | Self::Ingest(e) => Some(e),
            Self::Connection(e) => Some(e),
            Self::Report(e) | Self::Io(e) => Some(e),
            Self::Config(_) | Self::DataSource(_) => None,
        }
    }
}

impl From<DataError> for CollectorError {
    fn from(err: DataError) -> Self {
        Self::Database(err)
    }
}

impl From<std::io::Error> for CollectorError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<std::env::VarError> for CollectorError {
    fn from(err: std::env::VarError) -> Self {
        Self::Config(err.to_string())
    }
}

/// Result 타입 별칭
pub type Result<T> = std::result::Result<T, CollectorError>;
