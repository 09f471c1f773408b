//! End-of-day price collector CLI.

use clap::{Parser, Subcommand};
use pricesync_collector::{modules, CollectorConfig, CollectorError};
use pricesync_core::{Exchange, FeedClient, LogConfig};
use pricesync_data::{
    DatabaseConfig, MemoryPriceStore, PgPriceStore, PriceStore, TickerScanner, YahooFeedClient,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[derive(Parser)]
#[command(name = "pricesync-collector")]
#[command(about = "End-of-day price scan and ingest", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// 로그 레벨 (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// 거래소 일봉 스캔 후 저장
    Scan {
        /// 거래소 코드 (기본: SCAN_EXCHANGE)
        #[arg(long)]
        exchange: Option<String>,

        /// 특정 심볼만 수집 (쉼표로 구분, 예: "THYAO,GARAN")
        #[arg(long)]
        symbols: Option<String>,

        /// DB 없이 인메모리 저장소로 실행
        #[arg(long)]
        dry_run: bool,
    },

    /// 거래소 티커 목록과 장 상태 출력
    ListTickers {
        /// 거래소 코드 (기본: SCAN_EXCHANGE)
        #[arg(long)]
        exchange: Option<String>,
    },

    /// 포트폴리오 보유 주식 현재가 갱신
    RefreshPortfolio,

    /// 데몬 모드: 주기적으로 시장 스캔 실행
    Daemon,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // 로깅 초기화
    pricesync_core::init_logging(LogConfig::for_crates(&cli.log_level).with_env_format())?;

    tracing::info!("PriceSync Collector 시작");

    // 설정 로드
    let mut config = CollectorConfig::from_env()?;
    tracing::debug!(exchange = %config.scan.exchange, workers = config.scan.workers, "설정 로드 완료");

    // Ctrl-C → 취소 토큰
    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("종료 신호 수신, 진행 중인 작업 정리 중...");
                cancel.cancel();
            }
        }
    });

    let feed: Arc<dyn FeedClient> = Arc::new(YahooFeedClient::new());

    // 명령 실행
    match cli.command {
        Commands::Scan {
            exchange,
            symbols,
            dry_run,
        } => {
            if let Some(code) = exchange {
                config.scan.exchange = parse_exchange(&code)?;
            }
            let symbols = symbols.map(|s| s.split(',').map(str::to_string).collect::<Vec<_>>());
            let scanner = ticker_scanner(&config)?;

            let pg = if dry_run {
                tracing::info!("dry-run: 인메모리 저장소 사용");
                None
            } else {
                Some(connect_store(&config).await?)
            };
            let store: Arc<dyn PriceStore> = match &pg {
                Some(pg) => Arc::new(pg.clone()),
                None => Arc::new(MemoryPriceStore::new()),
            };

            let result =
                modules::sync_market(store, feed, &scanner, &config, symbols, &cancel).await;
            if let Some(pg) = pg {
                pg.close().await;
            }
            result?.log_summary("시장 스캔");
        }
        Commands::ListTickers { exchange } => {
            let exchange = match exchange {
                Some(code) => parse_exchange(&code)?,
                None => config.scan.exchange,
            };
            let scanner = ticker_scanner(&config)?;
            let snapshot = scanner
                .fetch_market_status(exchange)
                .await
                .map_err(|e| CollectorError::DataSource(e.to_string()))?;

            println!("{} ({}): {}개 종목", exchange, snapshot.status, snapshot.tickers.len());
            for ticker in &snapshot.tickers {
                println!("{}", ticker);
            }
        }
        Commands::RefreshPortfolio => {
            let pg = connect_store(&config).await?;
            let result =
                modules::refresh_portfolio(&pg, feed.as_ref(), &config, &cancel).await;
            pg.close().await;
            result?.log_summary("포트폴리오 갱신");
        }
        Commands::Daemon => {
            tracing::info!(
                "=== 데몬 모드 시작 (거래소: {}, 주기: {}분) ===",
                config.scan.exchange,
                config.daemon.interval_minutes
            );

            let pg = connect_store(&config).await?;
            let store: Arc<dyn PriceStore> = Arc::new(pg.clone());
            let scanner = ticker_scanner(&config)?;

            let mut interval = tokio::time::interval(config.daemon.interval());
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        tracing::info!("데몬 종료 중...");
                        break;
                    }
                    _ = interval.tick() => {
                        tracing::info!("=== 시장 스캔 실행 ===");

                        match modules::sync_market(
                            Arc::clone(&store),
                            Arc::clone(&feed),
                            &scanner,
                            &config,
                            None,
                            &cancel,
                        )
                        .await
                        {
                            Ok(stats) => stats.log_summary("시장 스캔"),
                            Err(e) => tracing::error!("시장 스캔 실패: {}", e),
                        }

                        tracing::info!(
                            "=== 스캔 완료, 다음 실행: {}분 후 ===",
                            config.daemon.interval_minutes
                        );
                    }
                }
            }

            pg.close().await;
        }
    }

    tracing::info!("PriceSync Collector 종료");

    Ok(())
}

fn parse_exchange(code: &str) -> Result<Exchange, CollectorError> {
    code.parse().map_err(CollectorError::Config)
}

fn ticker_scanner(config: &CollectorConfig) -> Result<TickerScanner, CollectorError> {
    TickerScanner::with_base_url(&config.scanner.base_url)
        .map_err(|e| CollectorError::DataSource(e.to_string()))
}

/// PostgreSQL 연결 후 스키마를 준비합니다.
async fn connect_store(config: &CollectorConfig) -> Result<PgPriceStore, CollectorError> {
    let url = config.require_database_url()?;
    let store = PgPriceStore::connect(&DatabaseConfig::new(url)).await?;
    store.ensure_schema().await?;
    tracing::info!("데이터베이스 연결 성공");
    Ok(store)
}
