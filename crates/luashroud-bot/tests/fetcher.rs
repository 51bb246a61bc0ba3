//! Attachment downloads against a local HTTP server.

use std::error::Error;
use std::net::SocketAddr;
use std::time::Duration;

use axum::{Router, http::StatusCode, response::Redirect, routing::get};
use luashroud_bot::{AttachmentFetcher, BotError, HttpFetcher};
use tokio::net::TcpListener;

type TestResult = Result<(), Box<dyn Error>>;

async fn serve() -> Result<SocketAddr, Box<dyn Error>> {
    let router = Router::new()
        .route("/script.lua", get(|| async { "print('downloaded')" }))
        .route("/moved.lua", get(|| async { Redirect::temporary("/script.lua") }))
        .route(
            "/missing.lua",
            get(|| async { (StatusCode::NOT_FOUND, "gone") }),
        )
        .route(
            "/binary.lua",
            get(|| async { vec![0xff_u8, 0xfe, 0x00] }),
        )
        .route(
            "/slow.lua",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                "late"
            }),
        );
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    Ok(addr)
}

#[tokio::test]
async fn follows_redirects_and_returns_text() -> TestResult {
    let addr = serve().await?;
    let fetcher = HttpFetcher::new(Duration::from_secs(5))?;

    let direct = fetcher.fetch(&format!("http://{addr}/script.lua")).await?;
    assert_eq!(direct, "print('downloaded')");

    let redirected = fetcher.fetch(&format!("http://{addr}/moved.lua")).await?;
    assert_eq!(redirected, "print('downloaded')");
    Ok(())
}

#[tokio::test]
async fn error_statuses_and_bad_bodies_fail() -> TestResult {
    let addr = serve().await?;
    let fetcher = HttpFetcher::new(Duration::from_secs(5))?;

    let missing = fetcher.fetch(&format!("http://{addr}/missing.lua")).await;
    assert!(matches!(missing, Err(BotError::DownloadStatus { status: 404 })));

    let binary = fetcher.fetch(&format!("http://{addr}/binary.lua")).await;
    assert!(matches!(binary, Err(BotError::DownloadNotUtf8 { .. })));
    Ok(())
}

#[tokio::test]
async fn slow_hosts_time_out() -> TestResult {
    let addr = serve().await?;
    let fetcher = HttpFetcher::new(Duration::from_millis(200))?;

    let result = fetcher.fetch(&format!("http://{addr}/slow.lua")).await;
    match result {
        Err(err @ BotError::DownloadTimeout { .. }) => {
            assert!(err.is_download());
            assert_eq!(err.user_message(), "Download timeout");
        }
        other => return Err(format!("expected timeout, got {other:?}").into()),
    }
    Ok(())
}
