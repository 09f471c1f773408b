//! PostgreSQL 저장소 통합 테스트.
//!
//! `DATABASE_URL`이 없으면 건너뜁니다.

use chrono::{NaiveDate, TimeZone, Utc};
use pricesync_core::{Exchange, Observation};
use pricesync_data::{DatabaseConfig, PgPriceStore, PriceStore};

async fn connect() -> Option<PgPriceStore> {
    let url = match std::env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            eprintln!("Skipping test: DATABASE_URL not set");
            return None;
        }
    };

    let store = PgPriceStore::connect(&DatabaseConfig::new(url))
        .await
        .expect("Failed to connect");
    store.ensure_schema().await.expect("Failed to create schema");
    Some(store)
}

fn observation(symbol: &str, close: i64, hour: u32) -> Observation {
    Observation {
        symbol: symbol.to_string(),
        exchange: Exchange::Bist,
        event_date: NaiveDate::from_ymd_opt(1999, 1, 4).unwrap(),
        query_time: Utc.with_ymd_and_hms(1999, 1, 4, hour, 0, 0).unwrap(),
        open: close,
        high: close,
        low: close,
        close,
        volume: 1_000.0,
    }
}

#[tokio::test]
async fn test_upsert_is_idempotent() {
    let Some(store) = connect().await else {
        return;
    };

    let first = observation("PSYNC_IDEMP", 100_000_000, 10);
    let second = observation("PSYNC_IDEMP", 101_500_000, 16);

    store.upsert_batch(&[first]).await.unwrap();
    store.upsert_batch(&[second.clone()]).await.unwrap();

    let rows: Vec<(i64, i64)> = sqlx::query_as(
        "SELECT close_integer, COUNT(*) OVER () FROM daily_prices WHERE symbol = $1 AND event_date = $2",
    )
    .bind(&second.symbol)
    .bind(second.event_date)
    .fetch_all(store.pool())
    .await
    .unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].0, 101_500_000);

    let existing = store
        .existing_symbols(Exchange::Bist, second.event_date)
        .await
        .unwrap();
    assert!(existing.contains("PSYNC_IDEMP"));
}

#[tokio::test]
async fn test_existing_symbols_matches_query_day() {
    let Some(store) = connect().await else {
        return;
    };

    // 1/4 봉을 1/5에 조회
    let mut late = observation("PSYNC_LATE", 50_000_000, 0);
    late.query_time = Utc.with_ymd_and_hms(1999, 1, 5, 9, 0, 0).unwrap();
    store.upsert_batch(&[late]).await.unwrap();

    let next_day = NaiveDate::from_ymd_opt(1999, 1, 5).unwrap();
    let existing = store
        .existing_symbols(Exchange::Bist, next_day)
        .await
        .unwrap();
    assert!(existing.contains("PSYNC_LATE"));
}

#[tokio::test]
async fn test_failed_chunk_rolls_back_whole_batch() {
    let Some(store) = connect().await else {
        return;
    };

    sqlx::query("DELETE FROM daily_prices WHERE symbol LIKE 'PSYNC_ATOMIC_%'")
        .execute(store.pool())
        .await
        .unwrap();

    // 첫 청크(500행)는 정상, 두 번째 청크에 같은 키가 두 번 들어감
    let mut batch: Vec<Observation> = (0..600)
        .map(|i| observation(&format!("PSYNC_ATOMIC_{i:03}"), 1_000_000 + i, 10))
        .collect();
    batch[550] = observation("PSYNC_ATOMIC_520", 2_000_000, 11);

    let result = store.upsert_batch(&batch).await;
    assert!(result.is_err());

    let (count,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM daily_prices WHERE symbol LIKE 'PSYNC_ATOMIC_%'")
            .fetch_one(store.pool())
            .await
            .unwrap();
    assert_eq!(count, 0);
}
