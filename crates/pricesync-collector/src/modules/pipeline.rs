//! 배치 적재 파이프라인.
//!
//! 스캔이 모은 관측치를 한 번의 upsert로 저장소에 반영합니다.
//! upsert는 `(symbol, event_date)` 기준으로 멱등이므로 실패 시 같은 배치를 재시도합니다.

use crate::config::BatchConfig;
use pricesync_core::Observation;
use pricesync_data::{DataError, PriceStore};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// 배치 upsert 단계.
pub struct BatchPipeline {
    store: Arc<dyn PriceStore>,
    max_attempts: u32,
    retry_delay: Duration,
}

impl BatchPipeline {
    pub fn new(store: Arc<dyn PriceStore>, config: &BatchConfig) -> Self {
        Self {
            store,
            max_attempts: config.max_attempts.max(1),
            retry_delay: config.retry_delay(),
        }
    }

    /// 관측치 배치를 저장합니다. 반영된 행 수를 반환합니다.
    ///
    /// 빈 배치는 저장소를 호출하지 않습니다.
    pub async fn insert_batch(&self, observations: Vec<Observation>) -> Result<u64, DataError> {
        if observations.is_empty() {
            warn!("저장할 데이터가 없습니다");
            return Ok(0);
        }

        let received = observations.len();
        let rows = dedupe_latest(observations);
        if rows.len() < received {
            warn!(
                received,
                unique = rows.len(),
                "배치 내 중복 키 병합"
            );
        }

        let mut attempt = 1;
        loop {
            match self.store.upsert_batch(&rows).await {
                Ok(affected) => {
                    info!(rows = rows.len(), affected, attempt, "배치 저장 완료");
                    return Ok(affected);
                }
                Err(e) if attempt < self.max_attempts => {
                    let delay = self.retry_delay * attempt;
                    warn!(
                        attempt,
                        max_attempts = self.max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "배치 저장 실패, 재시도"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    error!(
                        rows = rows.len(),
                        attempts = attempt,
                        error = %e,
                        "배치 저장 최종 실패"
                    );
                    return Err(e);
                }
            }
        }
    }
}

/// 같은 `(symbol, event_date)`가 여러 번 있으면 `query_time`이 가장 늦은 것만 남깁니다.
///
/// 처음 나온 순서를 유지합니다.
pub fn dedupe_latest(observations: Vec<Observation>) -> Vec<Observation> {
    let mut index: HashMap<(String, chrono::NaiveDate), usize> = HashMap::new();
    let mut rows: Vec<Observation> = Vec::with_capacity(observations.len());

    for obs in observations {
        let key = (obs.symbol.clone(), obs.event_date);
        match index.get(&key) {
            Some(&i) => {
                if obs.query_time >= rows[i].query_time {
                    rows[i] = obs;
                }
            }
            None => {
                index.insert(key, rows.len());
                rows.push(obs);
            }
        }
    }

    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};
    use pricesync_core::Exchange;
    use pricesync_data::MemoryPriceStore;

    fn observation(symbol: &str, close: i64, hour: u32) -> Observation {
        Observation {
            symbol: symbol.to_string(),
            exchange: Exchange::Bist,
            event_date: NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(),
            query_time: Utc.with_ymd_and_hms(2025, 3, 14, hour, 0, 0).unwrap(),
            open: close,
            high: close,
            low: close,
            close,
            volume: 10.0,
        }
    }

    fn config() -> BatchConfig {
        BatchConfig {
            max_attempts: 3,
            retry_delay_ms: 10,
        }
    }

    #[test]
    fn test_dedupe_keeps_latest_query_time() {
        let rows = dedupe_latest(vec![
            observation("A", 1, 12),
            observation("B", 5, 10),
            observation("A", 2, 15),
            observation("A", 3, 11),
        ]);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].symbol, "A");
        assert_eq!(rows[0].close, 2);
        assert_eq!(rows[1].symbol, "B");
    }

    #[tokio::test]
    async fn test_empty_batch_makes_no_store_call() {
        let store = Arc::new(MemoryPriceStore::new());
        let pipeline = BatchPipeline::new(store.clone(), &config());

        assert_eq!(pipeline.insert_batch(Vec::new()).await.unwrap(), 0);
        assert_eq!(store.upsert_calls(), 0);
    }

    #[tokio::test]
    async fn test_reingest_overwrites() {
        let store = Arc::new(MemoryPriceStore::new());
        let pipeline = BatchPipeline::new(store.clone(), &config());

        pipeline.insert_batch(vec![observation("A", 100, 10)]).await.unwrap();
        pipeline.insert_batch(vec![observation("A", 200, 16)]).await.unwrap();

        let rows = store.rows().await;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].close, 200);
    }
}
