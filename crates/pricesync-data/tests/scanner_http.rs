//! TradingView 스캐너 HTTP 통합 테스트 (mockito).

use pricesync_core::Exchange;
use pricesync_data::{DataError, TickerScanner, TickerSource};

#[tokio::test]
async fn test_fetch_tickers_parses_names() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/turkey/scan")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"totalCount":3,"data":[{"s":"BIST:ASELS","d":["ASELS"]},{"s":"BIST:GARAN","d":["GARAN"]},{"s":"BIST:THYAO","d":["THYAO"]}]}"#)
        .create_async()
        .await;

    let scanner = TickerScanner::with_base_url(server.url()).unwrap();
    let tickers = scanner.fetch_tickers(Exchange::Bist).await.unwrap();

    assert_eq!(tickers, vec!["ASELS", "GARAN", "THYAO"]);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_fetch_market_status_reads_first_row() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/america/scan")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"data":[{"d":["AAPL","closed"]},{"d":["MSFT","closed"]}]}"#)
        .create_async()
        .await;

    let scanner = TickerScanner::with_base_url(server.url()).unwrap();
    let snapshot = scanner.fetch_market_status(Exchange::Nasdaq).await.unwrap();

    assert_eq!(snapshot.status, "closed");
    assert_eq!(snapshot.tickers, vec!["AAPL", "MSFT"]);
}

#[tokio::test]
async fn test_non_success_status_is_fetch_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/uk/scan")
        .with_status(429)
        .with_body("slow down")
        .create_async()
        .await;

    let scanner = TickerScanner::with_base_url(server.url()).unwrap();
    let result = scanner.fetch_tickers(Exchange::Lse).await;

    assert!(matches!(result, Err(DataError::FetchError(_))));
}

#[tokio::test]
async fn test_unsupported_exchange_makes_no_request() {
    let scanner = TickerScanner::with_base_url("http://127.0.0.1:9").unwrap();
    let result = scanner.fetch_tickers(Exchange::FxIdc).await;

    assert!(matches!(result, Err(DataError::Unsupported(_))));
}
