use std::time::Duration;

use anyhow::Result;
use axum::extract::Json;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Router;
use serde_json::{json, Value};

use foody_bot::backend::{BackendClient, BackendError};
use foody_bot::dialogue::ContactInfo;

/// Serve a throwaway backend on an ephemeral port and return its base URL.
async fn spawn_backend(router: Router) -> Result<String> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    Ok(format!("http://{addr}"))
}

fn client(base_url: &str) -> BackendClient {
    BackendClient::new(base_url, Duration::from_secs(2)).expect("client")
}

#[tokio::test]
async fn test_register_restaurant_sends_contact_field() -> Result<()> {
    let router = Router::new().route(
        "/register_restaurant",
        post(|Json(body): Json<Value>| async move {
            // Echo back a marker so the test can tell the email arrived.
            let id = if body.get("email").is_some() && body.get("name").is_some() {
                7
            } else {
                0
            };
            Json(json!({
                "restaurant_id": id,
                "verification_link": format!("https://foody.example/verify/{id}")
            }))
        }),
    );
    let base = spawn_backend(router).await?;

    let registration = client(&base)
        .register_restaurant("Кафе Май", &ContactInfo::Email("owner@cafe.ru".into()))
        .await
        .expect("registration");

    assert_eq!(registration.restaurant_id, 7);
    assert_eq!(
        registration.verification_link,
        "https://foody.example/verify/7"
    );

    Ok(())
}

#[tokio::test]
async fn test_list_offers_and_reserve() -> Result<()> {
    let router = Router::new()
        .route(
            "/offers",
            get(|| async {
                Json(json!([
                    { "id": 1, "title": "Сет", "price": "390 ₽", "restaurant": "Суши" }
                ]))
            }),
        )
        .route(
            "/reserve",
            post(|Json(body): Json<Value>| async move {
                Json(json!({
                    "code": format!("FD-{}", body["offer_id"]),
                    "expires_at": "2026-08-29T21:00:00Z",
                    "title": "Сет",
                    "price": "390 ₽",
                    "restaurant": "Суши"
                }))
            }),
        );
    let base = spawn_backend(router).await?;
    let client = client(&base);

    let offers = client.list_offers().await.expect("offers");
    assert_eq!(offers.len(), 1);
    assert_eq!(offers[0].id, 1);

    let reservation = client.reserve(42, 1).await.expect("reservation");
    assert_eq!(reservation.code, "FD-1");

    Ok(())
}

#[tokio::test]
async fn test_subscribe_roundtrip() -> Result<()> {
    let router = Router::new()
        .route("/subscribe", post(|| async { StatusCode::OK }))
        .route("/unsubscribe", post(|| async { StatusCode::OK }));
    let base = spawn_backend(router).await?;
    let client = client(&base);

    client.subscribe(42).await.expect("subscribe");
    client.unsubscribe(42).await.expect("unsubscribe");

    Ok(())
}

#[tokio::test]
async fn test_non_success_status_is_typed() -> Result<()> {
    let router = Router::new().route(
        "/offers",
        get(|| async { (StatusCode::BAD_GATEWAY, "backend down") }),
    );
    let base = spawn_backend(router).await?;

    match client(&base).list_offers().await {
        Err(BackendError::Status(code, body)) => {
            assert_eq!(code, 502);
            assert!(body.contains("backend down"));
        }
        other => panic!("expected status error, got {other:?}"),
    }

    Ok(())
}

#[tokio::test]
async fn test_connection_failure_is_typed() -> Result<()> {
    // Grab a free port and release it so nothing listens there.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);

    match client(&format!("http://{addr}")).list_offers().await {
        Err(BackendError::Network(_)) => {}
        other => panic!("expected network error, got {other:?}"),
    }

    Ok(())
}

/// A slow backend trips the client timeout instead of hanging the caller.
#[tokio::test]
async fn test_slow_backend_times_out() -> Result<()> {
    let router = Router::new().route(
        "/offers",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Json(json!([]))
        }),
    );
    let base = spawn_backend(router).await?;

    let client = BackendClient::new(&base, Duration::from_millis(200)).expect("client");
    match client.list_offers().await {
        Err(BackendError::Timeout) => {}
        other => panic!("expected timeout, got {other:?}"),
    }

    Ok(())
}
