//! 订单推送 (SSE) 集成测试

mod common;

use std::time::Duration;

use axum::body::Body;
use common::TestApp;
use http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

async fn first_event(app: &TestApp, uri: &str, token: &str) -> (StatusCode, Option<String>, String) {
    let request = Request::builder()
        .uri(uri)
        .header(http::header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    let response = app.app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get(http::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let mut body = response.into_body();
    let frame = tokio::time::timeout(Duration::from_secs(5), body.frame())
        .await
        .expect("no event within timeout")
        .expect("stream ended")
        .expect("body error");
    let chunk = frame.into_data().expect("data frame");
    (status, content_type, String::from_utf8_lossy(&chunk).into_owned())
}

#[tokio::test]
async fn test_admin_stream_sends_snapshot() {
    let app = TestApp::new();
    let admin = app.sign_up("admin@example.com", "admin").await;

    let (status, content_type, event) = first_event(&app, "/api/admin/orders/stream", &admin).await;
    assert_eq!(status, StatusCode::OK);
    assert!(content_type.unwrap().starts_with("text/event-stream"));
    assert!(event.starts_with("event: orders"), "{event}");
    assert!(event.contains("data: ["), "{event}");
}

#[tokio::test]
async fn test_customer_stream_sends_own_orders() {
    let app = TestApp::new();
    let token = app.sign_up("ana@example.com", "cliente").await;
    let dish = app.seed_dish("Tacos", 9.99, None, true).await;
    let order = app.place_order(&token, &[(&dish, 1)]).await;
    let order_id = order.body["id"].as_str().unwrap().to_string();

    // 首个快照可能在推送任务完成第一次读取之前发出，等待包含订单的事件
    let request = Request::builder()
        .uri("/api/orders/stream")
        .header(http::header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    let response = app.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let mut body = response.into_body();
    let found = tokio::time::timeout(Duration::from_secs(5), async {
        while let Some(Ok(frame)) = body.frame().await {
            if let Ok(chunk) = frame.into_data()
                && String::from_utf8_lossy(&chunk).contains(&order_id)
            {
                return true;
            }
        }
        false
    })
    .await
    .unwrap_or(false);
    assert!(found, "order {order_id} never appeared in the stream");
}

#[tokio::test]
async fn test_stream_requires_token() {
    let app = TestApp::new();
    let res = app.get("/api/orders/stream", None).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);

    let cliente = app.sign_up("ana@example.com", "cliente").await;
    let res = app.get("/api/admin/orders/stream", Some(&cliente)).await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
}
