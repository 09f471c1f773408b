//! 수집 체크포인트 로그.
//!
//! 조회에 성공한 관측치를 DB와 무관한 JSON Lines 파일에 즉시 추가합니다.
//! 배치 upsert 전에 프로세스가 죽어도 `{dir}/{date}_{exchange}.jsonl`에서
//! 수동으로 복구할 수 있습니다.
//!
//! # 파일 형식
//!
//! ```text
//! {"symbol":"THYAO","event_date":"2025-03-14","query_time":"2025-03-14T15:10:02Z","open":301250000,...}
//! ```
//!
//! 재개 필터는 이 파일을 읽지 않습니다. 재개 기준은 항상 저장소입니다.

use crate::config::CheckpointConfig;
use chrono::{DateTime, NaiveDate, Utc};
use pricesync_core::{Exchange, Observation, ScaledPrice};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::debug;

/// 체크포인트 로그 에러
#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("체크포인트 파일 입출력 실패: {0}")]
    Io(#[from] std::io::Error),

    #[error("체크포인트 직렬화 실패: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("체크포인트 {line}번째 줄 파싱 실패: {source}")]
    Corrupt {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// 체크포인트 로그 한 줄.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckpointEntry {
    pub symbol: String,
    pub event_date: NaiveDate,
    pub query_time: DateTime<Utc>,
    pub open: ScaledPrice,
    pub high: ScaledPrice,
    pub low: ScaledPrice,
    pub close: ScaledPrice,
    pub volume: f64,
}

impl From<&Observation> for CheckpointEntry {
    fn from(obs: &Observation) -> Self {
        Self {
            symbol: obs.symbol.clone(),
            event_date: obs.event_date,
            query_time: obs.query_time,
            open: obs.open,
            high: obs.high,
            low: obs.low,
            close: obs.close,
            volume: obs.volume,
        }
    }
}

/// 추가 전용 체크포인트 기록기.
///
/// 모든 워커가 하나의 기록기를 공유하며, 파일 열기부터 쓰기까지
/// 하나의 비동기 뮤텍스로 직렬화되므로 줄이 섞이지 않습니다.
#[derive(Debug)]
pub struct CheckpointWriter {
    dir: PathBuf,
    enabled: bool,
    lock: Mutex<()>,
}

impl CheckpointWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            enabled: true,
            lock: Mutex::new(()),
        }
    }

    /// 아무것도 기록하지 않는 기록기.
    pub fn disabled() -> Self {
        Self {
            dir: PathBuf::new(),
            enabled: false,
            lock: Mutex::new(()),
        }
    }

    pub fn from_config(config: &CheckpointConfig) -> Self {
        if config.enabled {
            Self::new(&config.dir)
        } else {
            Self::disabled()
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// 거래소/거래일별 로그 파일 경로.
    pub fn path_for(&self, exchange: Exchange, date: NaiveDate) -> PathBuf {
        self.dir
            .join(format!("{}_{}.jsonl", date.format("%Y-%m-%d"), exchange))
    }

    /// 관측치 한 줄을 추가합니다.
    pub async fn append(&self, observation: &Observation) -> Result<(), CheckpointError> {
        if !self.enabled {
            return Ok(());
        }

        let mut line = serde_json::to_string(&CheckpointEntry::from(observation))?;
        line.push('\n');
        let path = self.path_for(observation.exchange, observation.event_date);

        let _guard = self.lock.lock().await;

        fs::create_dir_all(&self.dir).await?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;

        debug!(symbol = %observation.symbol, path = %path.display(), "체크포인트 기록");
        Ok(())
    }
}

/// 체크포인트 로그를 다시 읽습니다 (수동 복구용).
///
/// 빈 줄은 건너뜁니다.
pub async fn read_entries(path: impl AsRef<Path>) -> Result<Vec<CheckpointEntry>, CheckpointError> {
    let content = fs::read_to_string(path.as_ref()).await?;

    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| {
            serde_json::from_str(line).map_err(|source| CheckpointError::Corrupt {
                line: idx + 1,
                source,
            })
        })
        .collect()
}
