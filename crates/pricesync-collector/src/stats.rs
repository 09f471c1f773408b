//! 수집 통계 구조체.

use pricesync_core::Exchange;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

/// 종목 단위 작업 통계 (포트폴리오 갱신 등)
#[derive(Debug, Clone, Default, Serialize)]
pub struct CollectionStats {
    /// 총 시도 횟수
    pub total: usize,
    /// 성공 횟수
    pub success: usize,
    /// 에러 횟수
    pub errors: usize,
    /// 건너뛴 횟수 (대상 없음)
    pub skipped: usize,
    /// 소요 시간
    #[serde(skip)]
    pub elapsed: Duration,
}

impl CollectionStats {
    /// 새 통계 객체 생성
    pub fn new() -> Self {
        Self::default()
    }

    /// 성공률 계산 (%)
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.success as f64 / self.total as f64) * 100.0
        }
    }

    /// 통계 요약 로그 출력
    pub fn log_summary(&self, operation: &str) {
        tracing::info!(
            operation = operation,
            total = self.total,
            success = self.success,
            errors = self.errors,
            skipped = self.skipped,
            success_rate = format!("{:.1}%", self.success_rate()),
            elapsed = format!("{:.1}s", self.elapsed.as_secs_f64()),
            "작업 완료"
        );
    }
}

/// 시장 스캔 한 번의 통계
#[derive(Debug, Clone, Serialize)]
pub struct SyncStats {
    pub exchange: Exchange,
    /// 대상 종목 수 (재개 필터 전)
    pub requested: usize,
    /// 수집한 관측치 수
    pub collected: usize,
    /// 저장소에 반영된 행 수
    pub saved: u64,
    /// 끝까지 수집하지 못한 종목 수
    pub unresolved: usize,
    /// 실행한 웨이브 수
    pub waves: u32,
    /// 종료 상태 (done, exhausted, cancelled)
    pub outcome: &'static str,
    /// 실패 리포트 경로
    pub report_path: Option<PathBuf>,
    #[serde(skip)]
    pub elapsed: Duration,
}

impl SyncStats {
    pub fn new(exchange: Exchange) -> Self {
        Self {
            exchange,
            requested: 0,
            collected: 0,
            saved: 0,
            unresolved: 0,
            waves: 0,
            outcome: "done",
            report_path: None,
            elapsed: Duration::ZERO,
        }
    }

    /// 통계 요약 로그 출력
    pub fn log_summary(&self, operation: &str) {
        tracing::info!(
            operation = operation,
            exchange = %self.exchange,
            requested = self.requested,
            collected = self.collected,
            saved = self.saved,
            unresolved = self.unresolved,
            waves = self.waves,
            outcome = self.outcome,
            report = ?self.report_path,
            elapsed = format!("{:.1}s", self.elapsed.as_secs_f64()),
            "시장 스캔 완료"
        );
    }
}
