//! 실패 종목 리포트.
//!
//! 모든 웨이브가 끝난 뒤에도 수집되지 않은 종목을 운영자가 확인할 수 있도록
//! `{dir}/failed_exchange_symbols_{exchange}_{YYYY-MM-DD_HH-MM-SS}.log`에 기록합니다.

use chrono::{DateTime, Utc};
use pricesync_core::Exchange;
use std::path::PathBuf;
use tracing::error;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// 실패 리포트 기록기.
#[derive(Debug, Clone)]
pub struct FailureReporter {
    dir: PathBuf,
}

impl FailureReporter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// 실패 종목을 리포트 파일로 기록하고 경로를 반환합니다.
    ///
    /// 빈 목록으로 호출하지 않습니다.
    pub async fn report_failures(
        &self,
        exchange: Exchange,
        symbols: &[String],
    ) -> std::io::Result<PathBuf> {
        self.report_failures_at(exchange, symbols, Utc::now()).await
    }

    pub async fn report_failures_at(
        &self,
        exchange: Exchange,
        symbols: &[String],
        at: DateTime<Utc>,
    ) -> std::io::Result<PathBuf> {
        let timestamp = at.format(TIMESTAMP_FORMAT).to_string();
        let path = self
            .dir
            .join(format!("failed_exchange_symbols_{}_{}.log", exchange, timestamp));

        let written = async {
            tokio::fs::create_dir_all(&self.dir).await?;
            tokio::fs::write(&path, render(exchange, &timestamp, symbols)).await
        }
        .await;

        match written {
            Ok(()) => {
                error!(
                    exchange = %exchange,
                    failed = symbols.len(),
                    path = %path.display(),
                    "스캔이 실패 종목을 남기고 종료됨, 리포트 저장"
                );
                Ok(path)
            }
            Err(e) => {
                error!(
                    critical = true,
                    exchange = %exchange,
                    failed = symbols.len(),
                    error = %e,
                    "실패 리포트 파일 생성 실패"
                );
                Err(e)
            }
        }
    }
}

fn render(exchange: Exchange, timestamp: &str, symbols: &[String]) -> String {
    let mut out = format!(
        "Exchange: {}\nDate: {}\nTotal Failed: {}\n{}\n",
        exchange,
        timestamp,
        symbols.len(),
        "-".repeat(30)
    );
    for symbol in symbols {
        out.push_str(symbol);
        out.push('\n');
    }
    out
}
