//! 환경변수 기반 설정 모듈.

use crate::error::CollectorError;
use crate::Result;
use pricesync_core::Exchange;
use pricesync_data::provider::TRADINGVIEW_SCANNER_URL;
use std::path::PathBuf;
use std::time::Duration;

/// Collector 전체 설정
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// 데이터베이스 URL (dry-run, 티커 조회에는 필요 없음)
    pub database_url: Option<String>,
    /// 스캔 설정
    pub scan: ScanConfig,
    /// 체크포인트 로그 설정
    pub checkpoint: CheckpointConfig,
    /// 실패 리포트 설정
    pub report: ReportConfig,
    /// 배치 upsert 설정
    pub batch: BatchConfig,
    /// 포트폴리오 현재가 갱신 설정
    pub portfolio: PortfolioConfig,
    /// 티커 스캐너 설정
    pub scanner: ScannerConfig,
    /// 데몬 모드 설정
    pub daemon: DaemonConfig,
}

/// 스캔(웨이브) 설정
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// 기본 거래소
    pub exchange: Exchange,
    /// 동시 조회 워커 수
    pub workers: usize,
    /// 요청 전 지터 하한 (밀리초)
    pub jitter_min_ms: u64,
    /// 요청 전 지터 상한 (밀리초)
    pub jitter_max_ms: u64,
    /// 최대 웨이브 수
    pub max_attempts: u32,
    /// 웨이브 간 백오프 기준 (초). k번째 웨이브 후 k * base 대기
    pub backoff_base_secs: u64,
}

/// 체크포인트 로그 설정
#[derive(Debug, Clone)]
pub struct CheckpointConfig {
    pub enabled: bool,
    pub dir: PathBuf,
}

/// 실패 리포트 설정
#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub dir: PathBuf,
}

/// 배치 upsert 재시도 설정
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// 최대 시도 횟수
    pub max_attempts: u32,
    /// 재시도 간 딜레이 기준 (밀리초)
    pub retry_delay_ms: u64,
}

/// 포트폴리오 갱신 설정
#[derive(Debug, Clone)]
pub struct PortfolioConfig {
    /// 종목 간 딜레이 (밀리초)
    pub request_delay_ms: u64,
}

/// 티커 스캐너 설정
#[derive(Debug, Clone)]
pub struct ScannerConfig {
    pub base_url: String,
}

/// 데몬 모드 설정
#[derive(Debug, Clone)]
pub struct DaemonConfig {
    /// 워크플로우 실행 주기 (분 단위)
    pub interval_minutes: u64,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            scan: ScanConfig::default(),
            checkpoint: CheckpointConfig {
                enabled: true,
                dir: PathBuf::from("data/raw"),
            },
            report: ReportConfig {
                dir: PathBuf::from("logs"),
            },
            batch: BatchConfig {
                max_attempts: 3,
                retry_delay_ms: 1000,
            },
            portfolio: PortfolioConfig {
                request_delay_ms: 1000,
            },
            scanner: ScannerConfig {
                base_url: TRADINGVIEW_SCANNER_URL.to_string(),
            },
            daemon: DaemonConfig {
                interval_minutes: 1440,
            },
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            exchange: Exchange::Bist,
            workers: 1,
            jitter_min_ms: 500,
            jitter_max_ms: 1500,
            max_attempts: 5,
            backoff_base_secs: 2,
        }
    }
}

impl CollectorConfig {
    /// 환경변수에서 설정 로드
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        let exchange = match std::env::var("SCAN_EXCHANGE") {
            Ok(code) => code.parse::<Exchange>().map_err(CollectorError::Config)?,
            Err(_) => defaults.scan.exchange,
        };

        let config = Self {
            database_url: std::env::var("DATABASE_URL").ok(),
            scan: ScanConfig {
                exchange,
                workers: env_var_parse("SCAN_WORKERS", defaults.scan.workers),
                jitter_min_ms: env_var_parse("SCAN_JITTER_MIN_MS", defaults.scan.jitter_min_ms),
                jitter_max_ms: env_var_parse("SCAN_JITTER_MAX_MS", defaults.scan.jitter_max_ms),
                max_attempts: env_var_parse("SCAN_MAX_ATTEMPTS", defaults.scan.max_attempts),
                backoff_base_secs: env_var_parse(
                    "SCAN_BACKOFF_BASE_SECS",
                    defaults.scan.backoff_base_secs,
                ),
            },
            checkpoint: CheckpointConfig {
                enabled: env_var_bool("CHECKPOINT_ENABLED", defaults.checkpoint.enabled),
                dir: env_var_path("CHECKPOINT_DIR", defaults.checkpoint.dir),
            },
            report: ReportConfig {
                dir: env_var_path("REPORT_DIR", defaults.report.dir),
            },
            batch: BatchConfig {
                max_attempts: env_var_parse("BATCH_MAX_ATTEMPTS", defaults.batch.max_attempts),
                retry_delay_ms: env_var_parse(
                    "BATCH_RETRY_DELAY_MS",
                    defaults.batch.retry_delay_ms,
                ),
            },
            portfolio: PortfolioConfig {
                request_delay_ms: env_var_parse(
                    "PORTFOLIO_REQUEST_DELAY_MS",
                    defaults.portfolio.request_delay_ms,
                ),
            },
            scanner: ScannerConfig {
                base_url: std::env::var("SCANNER_BASE_URL").unwrap_or(defaults.scanner.base_url),
            },
            daemon: DaemonConfig {
                interval_minutes: env_var_parse(
                    "DAEMON_INTERVAL_MINUTES",
                    defaults.daemon.interval_minutes,
                ),
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// 값 범위 검증
    pub fn validate(&self) -> Result<()> {
        if self.scan.workers == 0 {
            return Err(CollectorError::Config(
                "SCAN_WORKERS는 1 이상이어야 합니다".to_string(),
            ));
        }
        if self.scan.max_attempts == 0 {
            return Err(CollectorError::Config(
                "SCAN_MAX_ATTEMPTS는 1 이상이어야 합니다".to_string(),
            ));
        }
        if self.scan.jitter_min_ms > self.scan.jitter_max_ms {
            return Err(CollectorError::Config(format!(
                "지터 범위가 잘못되었습니다: {}ms > {}ms",
                self.scan.jitter_min_ms, self.scan.jitter_max_ms
            )));
        }
        if self.batch.max_attempts == 0 {
            return Err(CollectorError::Config(
                "BATCH_MAX_ATTEMPTS는 1 이상이어야 합니다".to_string(),
            ));
        }
        Ok(())
    }

    /// DATABASE_URL을 요구합니다.
    pub fn require_database_url(&self) -> Result<&str> {
        self.database_url.as_deref().ok_or_else(|| {
            CollectorError::Config("DATABASE_URL 환경변수가 설정되지 않았습니다".to_string())
        })
    }
}

impl ScanConfig {
    /// 지터 범위를 Duration으로 반환
    pub fn jitter_range(&self) -> (Duration, Duration) {
        (
            Duration::from_millis(self.jitter_min_ms),
            Duration::from_millis(self.jitter_max_ms),
        )
    }

    /// 백오프 기준을 Duration으로 반환
    pub fn backoff_base(&self) -> Duration {
        Duration::from_secs(self.backoff_base_secs)
    }
}

impl BatchConfig {
    /// 재시도 딜레이 기준을 Duration으로 반환
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

impl PortfolioConfig {
    /// 종목 간 딜레이를 Duration으로 반환
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }
}

impl DaemonConfig {
    /// 워크플로우 실행 주기를 Duration으로 반환
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_minutes * 60)
    }
}

/// 환경변수에서 값을 파싱 (실패 시 기본값 사용)
fn env_var_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// 환경변수에서 bool 값 파싱
fn env_var_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .map(|v| v == "true" || v == "1")
        .unwrap_or(default)
}

fn env_var_path(key: &str, default: PathBuf) -> PathBuf {
    std::env::var(key).map(PathBuf::from).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = CollectorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.scan.max_attempts, 5);
        assert_eq!(config.scan.backoff_base(), Duration::from_secs(2));
        assert_eq!(config.daemon.interval(), Duration::from_secs(86_400));
    }

    #[test]
    fn test_validate_rejects_inverted_jitter() {
        let mut config = CollectorConfig::default();
        config.scan.jitter_min_ms = 2000;
        assert!(matches!(config.validate(), Err(CollectorError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_zero_workers() {
        let mut config = CollectorConfig::default();
        config.scan.workers = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_require_database_url() {
        let mut config = CollectorConfig::default();
        assert!(config.require_database_url().is_err());

        config.database_url = Some("postgresql://localhost/prices".to_string());
        assert_eq!(
            config.require_database_url().unwrap(),
            "postgresql://localhost/prices"
        );
    }
}
