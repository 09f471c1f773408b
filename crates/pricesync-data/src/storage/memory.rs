//! 프로세스 내 가격 저장소.
//!
//! `--dry-run` 실행과 테스트에서 PostgreSQL 대신 사용합니다.
//! upsert 의미는 `PgPriceStore`와 같습니다.

use super::PriceStore;
use crate::error::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use pricesync_core::{Exchange, Observation, ScaledPrice};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;

/// 포트폴리오 보유 종목.
#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioAsset {
    pub asset_type: String,
    pub current_price: ScaledPrice,
}

/// 인메모리 `PriceStore`.
#[derive(Debug, Default)]
pub struct MemoryPriceStore {
    rows: RwLock<HashMap<(String, NaiveDate), Observation>>,
    portfolio: RwLock<BTreeMap<String, PortfolioAsset>>,
    upsert_calls: AtomicUsize,
}

impl MemoryPriceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 포트폴리오 종목을 추가합니다.
    pub async fn add_portfolio_asset(&self, symbol: &str, asset_type: &str) {
        self.portfolio.write().await.insert(
            symbol.to_string(),
            PortfolioAsset {
                asset_type: asset_type.to_string(),
                current_price: 0,
            },
        );
    }

    /// 저장된 행 하나를 조회합니다.
    pub async fn get(&self, symbol: &str, date: NaiveDate) -> Option<Observation> {
        self.rows
            .read()
            .await
            .get(&(symbol.to_string(), date))
            .cloned()
    }

    /// 저장된 전체 행 (심볼, 거래일 순).
    pub async fn rows(&self) -> Vec<Observation> {
        let mut rows: Vec<Observation> = self.rows.read().await.values().cloned().collect();
        rows.sort_by(|a, b| a.key().cmp(&b.key()));
        rows
    }

    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }

    /// `upsert_batch` 호출 횟수.
    pub fn upsert_calls(&self) -> usize {
        self.upsert_calls.load(Ordering::SeqCst)
    }

    pub async fn portfolio_asset(&self, symbol: &str) -> Option<PortfolioAsset> {
        self.portfolio.read().await.get(symbol).cloned()
    }
}

#[async_trait]
impl PriceStore for MemoryPriceStore {
    async fn existing_symbols(
        &self,
        exchange: Exchange,
        date: NaiveDate,
    ) -> Result<HashSet<String>> {
        Ok(self
            .rows
            .read()
            .await
            .values()
            .filter(|o| {
                o.exchange == exchange
                    && (o.event_date == date || o.query_time.date_naive() == date)
            })
            .map(|o| o.symbol.clone())
            .collect())
    }

    async fn upsert_batch(&self, observations: &[Observation]) -> Result<u64> {
        self.upsert_calls.fetch_add(1, Ordering::SeqCst);

        let mut rows = self.rows.write().await;
        for obs in observations {
            rows.insert((obs.symbol.clone(), obs.event_date), obs.clone());
        }
        Ok(observations.len() as u64)
    }

    async fn stock_portfolio_symbols(&self) -> Result<Vec<String>> {
        Ok(self
            .portfolio
            .read()
            .await
            .iter()
            .filter(|(_, asset)| asset.asset_type == "STOCK")
            .map(|(symbol, _)| symbol.clone())
            .collect())
    }

    async fn update_portfolio_price(&self, symbol: &str, price: ScaledPrice) -> Result<bool> {
        match self.portfolio.write().await.get_mut(symbol) {
            Some(asset) => {
                asset.current_price = price;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn observation(symbol: &str, close: ScaledPrice, hour: u32) -> Observation {
        Observation {
            symbol: symbol.to_string(),
            exchange: Exchange::Bist,
            event_date: NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(),
            query_time: Utc.with_ymd_and_hms(2025, 3, 14, hour, 0, 0).unwrap(),
            open: close,
            high: close,
            low: close,
            close,
            volume: 100.0,
        }
    }

    #[tokio::test]
    async fn test_upsert_overwrites_same_key() {
        let store = MemoryPriceStore::new();

        store.upsert_batch(&[observation("THYAO", 100, 10)]).await.unwrap();
        store.upsert_batch(&[observation("THYAO", 200, 15)]).await.unwrap();

        assert_eq!(store.len().await, 1);
        let row = store
            .get("THYAO", NaiveDate::from_ymd_opt(2025, 3, 14).unwrap())
            .await
            .unwrap();
        assert_eq!(row.close, 200);
        assert_eq!(store.upsert_calls(), 2);
    }

    #[tokio::test]
    async fn test_existing_symbols_scoped_by_exchange() {
        let store = MemoryPriceStore::new();
        let mut other = observation("AAPL", 100, 10);
        other.exchange = Exchange::Nasdaq;
        store
            .upsert_batch(&[observation("THYAO", 100, 10), other])
            .await
            .unwrap();

        let date = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();
        let bist = store.existing_symbols(Exchange::Bist, date).await.unwrap();
        assert_eq!(bist, HashSet::from(["THYAO".to_string()]));
    }

    #[tokio::test]
    async fn test_existing_symbols_matches_query_day() {
        let store = MemoryPriceStore::new();
        // 3/15(토)에 조회했지만 봉은 3/14(금) 것
        let mut friday_bar = observation("THYAO", 100, 10);
        friday_bar.query_time = Utc.with_ymd_and_hms(2025, 3, 15, 9, 0, 0).unwrap();
        store.upsert_batch(&[friday_bar]).await.unwrap();

        let saturday = NaiveDate::from_ymd_opt(2025, 3, 15).unwrap();
        let found = store.existing_symbols(Exchange::Bist, saturday).await.unwrap();
        assert_eq!(found, HashSet::from(["THYAO".to_string()]));

        let sunday = NaiveDate::from_ymd_opt(2025, 3, 16).unwrap();
        assert!(store
            .existing_symbols(Exchange::Bist, sunday)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_portfolio_price_update() {
        let store = MemoryPriceStore::new();
        store.add_portfolio_asset("THYAO", "STOCK").await;
        store.add_portfolio_asset("AFT", "FUND").await;

        assert_eq!(store.stock_portfolio_symbols().await.unwrap(), vec!["THYAO"]);
        assert!(store.update_portfolio_price("THYAO", 304_750_000).await.unwrap());
        assert!(!store.update_portfolio_price("GARAN", 1).await.unwrap());
        assert_eq!(
            store.portfolio_asset("THYAO").await.unwrap().current_price,
            304_750_000
        );
    }
}
