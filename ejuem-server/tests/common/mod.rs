//! 集成测试公共工具
//!
//! 应用由 MemoryStore + LocalSessionProvider 组装，通过 `oneshot` 驱动路由。
//! [`FlakyStore`] 包装内存存储，可按表注入读写失败，或让某次写入停在门口。

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use ejuem_server::db::{ChangeEvent, Filter, Query, RecordStore, StoreError, StoreResult, tables};
use ejuem_server::{Config, JwtService, MemoryStore, ServerState, api};
use ejuem_server::auth::LocalSessionProvider;
use http::{Method, Request, StatusCode};
use http_body_util::BodyExt;
use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio::sync::{Notify, broadcast};
use tower::ServiceExt;

pub const TEST_SECRET: &str = "integration-test-secret-with-32-plus-chars";

/// Store operation that can be made to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Select,
    Insert,
    Update,
    Delete,
}

/// Gate that parks one store call until released
#[derive(Default)]
pub struct Pause {
    /// 被拦住的调用已到达
    pub reached: Notify,
    pub release: Notify,
}

/// MemoryStore wrapper with per-table failure injection
pub struct FlakyStore {
    pub inner: MemoryStore,
    failing: Mutex<HashSet<(Op, String)>>,
    /// 下一次 update 该表之前先对内部存储执行的写入 (模拟并发修改)
    interleave: Mutex<Option<(String, Vec<Filter>, Value)>>,
    pauses: Mutex<HashMap<(Op, String), Arc<Pause>>>,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self {
            inner: MemoryStore::new(),
            failing: Mutex::new(HashSet::new()),
            interleave: Mutex::new(None),
            pauses: Mutex::new(HashMap::new()),
        }
    }

    pub fn fail(&self, op: Op, table: &str) {
        self.failing.lock().insert((op, table.to_string()));
    }

    pub fn heal(&self, op: Op, table: &str) {
        self.failing.lock().remove(&(op, table.to_string()));
    }

    /// Apply `patch` to `table` right before the next update reaches it
    pub fn interleave_update(&self, table: &str, filters: Vec<Filter>, patch: Value) {
        *self.interleave.lock() = Some((table.to_string(), filters, patch));
    }

    /// Park the next `op` on `table` until the returned gate is released
    pub fn pause(&self, op: Op, table: &str) -> Arc<Pause> {
        let pause = Arc::new(Pause::default());
        self.pauses.lock().insert((op, table.to_string()), pause.clone());
        pause
    }

    async fn wait_if_paused(&self, op: Op, table: &str) {
        let pause = self.pauses.lock().remove(&(op, table.to_string()));
        if let Some(pause) = pause {
            pause.reached.notify_one();
            pause.release.notified().await;
        }
    }

    fn check(&self, op: Op, table: &str) -> StoreResult<()> {
        if self.failing.lock().contains(&(op, table.to_string())) {
            return Err(StoreError::Network(format!("injected {op:?} failure on {table}")));
        }
        Ok(())
    }
}

#[async_trait]
impl RecordStore for FlakyStore {
    async fn select(&self, table: &str, query: &Query) -> StoreResult<Vec<Value>> {
        self.check(Op::Select, table)?;
        self.inner.select(table, query).await
    }

    async fn insert(&self, table: &str, rows: Vec<Value>) -> StoreResult<Vec<Value>> {
        self.check(Op::Insert, table)?;
        self.wait_if_paused(Op::Insert, table).await;
        self.inner.insert(table, rows).await
    }

    async fn update(&self, table: &str, filters: &[Filter], patch: Value) -> StoreResult<Vec<Value>> {
        self.check(Op::Update, table)?;
        let pending = {
            let mut slot = self.interleave.lock();
            let due = matches!(slot.as_ref(), Some((t, _, _)) if t == table);
            if due { slot.take() } else { None }
        };
        if let Some((t, f, p)) = pending {
            self.inner.update(&t, &f, p).await?;
        }
        self.inner.update(table, filters, patch).await
    }

    async fn delete(&self, table: &str, filters: &[Filter]) -> StoreResult<Vec<Value>> {
        self.check(Op::Delete, table)?;
        self.inner.delete(table, filters).await
    }

    fn subscribe(&self) -> Option<broadcast::Receiver<ChangeEvent>> {
        self.inner.subscribe()
    }
}

pub struct TestApp {
    pub app: Router,
    pub state: ServerState,
    pub store: Arc<FlakyStore>,
}

/// Decoded JSON response
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestResponse {
    /// Numeric error code of an error body
    pub fn code(&self) -> u64 {
        self.body["code"].as_u64().unwrap_or_default()
    }
}

impl TestApp {
    pub fn new() -> Self {
        let store = Arc::new(FlakyStore::new());
        let config = Config::for_tests(TEST_SECRET);
        let jwt = JwtService::with_config(config.jwt.clone().unwrap());
        let dyn_store: Arc<dyn RecordStore> = store.clone();
        let sessions = Arc::new(LocalSessionProvider::new(dyn_store.clone(), jwt));
        let state = ServerState::new(config, dyn_store, sessions);
        let app = api::build_app(state.clone());
        Self { app, state, store }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        send(
            self.app.clone(),
            method,
            uri.to_string(),
            token.map(str::to_string),
            body,
        )
        .await
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.request(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.request(Method::POST, uri, token, Some(body)).await
    }

    /// Register an account and return its access token
    pub async fn sign_up(&self, email: &str, role: &str) -> String {
        let res = self
            .post(
                "/api/auth/sign-up",
                None,
                json!({ "email": email, "password": "secret123", "name": email, "role": role }),
            )
            .await;
        assert_eq!(res.status, StatusCode::OK, "sign-up failed: {:?}", res.body);
        res.body["access_token"].as_str().unwrap().to_string()
    }

    pub async fn seed_category(&self, name: &str) -> String {
        let rows = self
            .store
            .inner
            .insert(tables::CATEGORIES, vec![json!({ "name": name })])
            .await
            .unwrap();
        rows[0]["id"].as_str().unwrap().to_string()
    }

    pub async fn seed_dish(
        &self,
        name: &str,
        price: f64,
        category_id: Option<&str>,
        available: bool,
    ) -> String {
        let rows = self
            .store
            .inner
            .insert(
                tables::DISHES,
                vec![json!({
                    "name": name,
                    "price": price,
                    "category_id": category_id,
                    "available": available,
                    "is_offer": false,
                })],
            )
            .await
            .unwrap();
        rows[0]["id"].as_str().unwrap().to_string()
    }

    pub async fn create_cart(&self) -> String {
        let res = self.post("/api/carts", None, json!({})).await;
        assert_eq!(res.status, StatusCode::OK);
        res.body["id"].as_str().unwrap().to_string()
    }

    pub async fn add_to_cart(&self, cart_id: &str, dish_id: &str) -> TestResponse {
        self.post(
            &format!("/api/carts/{cart_id}/items"),
            None,
            json!({ "dish_id": dish_id }),
        )
        .await
    }

    /// Cart with `items` (dish id, times added), then checkout as `token`
    pub async fn place_order(&self, token: &str, items: &[(&str, usize)]) -> TestResponse {
        let cart_id = self.create_cart().await;
        for (dish_id, times) in items {
            for _ in 0..*times {
                let res = self.add_to_cart(&cart_id, dish_id).await;
                assert_eq!(res.status, StatusCode::OK, "add failed: {:?}", res.body);
            }
        }
        self.post(
            &format!("/api/carts/{cart_id}/checkout"),
            Some(token),
            json!({ "type": "para_llevar" }),
        )
        .await
    }
}

/// Send one request through `app` and decode the body
///
/// 参数均为自有值，便于 `tokio::spawn` 出并发请求。
pub async fn send(
    app: Router,
    method: Method,
    uri: String,
    token: Option<String>,
    body: Option<Value>,
) -> TestResponse {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(http::header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let body = match body {
        Some(value) => {
            builder = builder.header(http::header::CONTENT_TYPE, "application/json");
            Body::from(serde_json::to_vec(&value).unwrap())
        }
        None => Body::empty(),
    };

    let response = app.oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    // 提取器拒绝 (如查询参数解析失败) 返回纯文本
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    TestResponse { status, body }
}

/// Compare a JSON money value with an expected amount
pub fn assert_money(value: &Value, expected: f64) {
    let actual = value.as_f64().unwrap_or(f64::NAN);
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {value}"
    );
}
