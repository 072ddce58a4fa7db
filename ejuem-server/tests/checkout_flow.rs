//! 下单流程集成测试
//!
//! 购物车 → 结账 → 订单行 + 订单项；覆盖补偿删除与购物车保留。

mod common;

use common::{Op, TestApp, assert_money, send};
use ejuem_server::db::{RecordStore, tables};
use http::{Method, StatusCode};
use serde_json::json;

#[tokio::test]
async fn test_checkout_persists_order_with_items() {
    let app = TestApp::new();
    let token = app.sign_up("ana@example.com", "cliente").await;
    let tacos = app.seed_dish("Tacos", 9.99, None, true).await;
    let agua = app.seed_dish("Agua", 5.00, None, true).await;

    // 2 × 9.99 + 1 × 5.00 = 24.98
    let res = app.place_order(&token, &[(&tacos, 2), (&agua, 1)]).await;
    assert_eq!(res.status, StatusCode::OK, "{:?}", res.body);

    let order = &res.body;
    assert_eq!(order["status"], "pendiente");
    assert_eq!(order["type"], "para_llevar");
    assert_money(&order["total_price"], 24.98);

    let items = order["order_items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["dish_id"], tacos.as_str());
    assert_eq!(items[0]["quantity"], 2);
    assert_money(&items[0]["price"], 9.99);
    assert_eq!(items[1]["dish_id"], agua.as_str());
    assert_eq!(items[1]["quantity"], 1);

    assert_eq!(app.store.inner.count(tables::ORDERS), 1);
    assert_eq!(app.store.inner.count(tables::ORDER_ITEMS), 2);

    // 顾客视图带出菜品名
    let mine = app.get("/api/orders", Some(&token)).await;
    assert_eq!(mine.status, StatusCode::OK);
    let orders = mine.body.as_array().unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0]["order_items"][0]["dishes"]["name"], "Tacos");
    assert_eq!(orders[0]["actions"], json!([]));
}

#[tokio::test]
async fn test_checkout_clears_cart() {
    let app = TestApp::new();
    let token = app.sign_up("ana@example.com", "cliente").await;
    let dish = app.seed_dish("Tacos", 9.99, None, true).await;

    let cart_id = app.create_cart().await;
    app.add_to_cart(&cart_id, &dish).await;
    let res = app
        .post(&format!("/api/carts/{cart_id}/checkout"), Some(&token), json!({}))
        .await;
    assert_eq!(res.status, StatusCode::OK);

    let cart = app.get(&format!("/api/carts/{cart_id}"), None).await;
    assert_eq!(cart.body["lines"], json!([]));
    assert_money(&cart.body["total"], 0.0);
}

#[tokio::test]
async fn test_item_price_is_snapshot_at_add_time() {
    let app = TestApp::new();
    let token = app.sign_up("ana@example.com", "cliente").await;
    let dish = app.seed_dish("Tacos", 9.99, None, true).await;

    let cart_id = app.create_cart().await;
    app.add_to_cart(&cart_id, &dish).await;

    // 加入购物车后涨价，订单仍按快照价
    app.store
        .inner
        .update(
            tables::DISHES,
            &[ejuem_server::db::Filter::eq("id", dish.as_str())],
            json!({ "price": 12.5 }),
        )
        .await
        .unwrap();
    app.add_to_cart(&cart_id, &dish).await;

    let res = app
        .post(&format!("/api/carts/{cart_id}/checkout"), Some(&token), json!({}))
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_money(&res.body["order_items"][0]["price"], 9.99);
    assert_money(&res.body["total_price"], 19.98);
}

#[tokio::test]
async fn test_items_added_during_checkout_stay_in_cart() {
    let app = TestApp::new();
    let token = app.sign_up("ana@example.com", "cliente").await;
    let tacos = app.seed_dish("Tacos", 9.99, None, true).await;
    let agua = app.seed_dish("Agua", 5.00, None, true).await;
    let cart_id = app.create_cart().await;
    app.add_to_cart(&cart_id, &tacos).await;

    // 订单项写入停住，期间顾客继续加菜
    let pause = app.store.pause(Op::Insert, tables::ORDER_ITEMS);
    let checkout = tokio::spawn(send(
        app.app.clone(),
        Method::POST,
        format!("/api/carts/{cart_id}/checkout"),
        Some(token.clone()),
        Some(json!({})),
    ));
    pause.reached.notified().await;

    app.add_to_cart(&cart_id, &agua).await;
    let res = app.add_to_cart(&cart_id, &tacos).await;
    assert_eq!(res.body["item_count"], 3);

    pause.release.notify_one();
    let res = checkout.await.unwrap();
    assert_eq!(res.status, StatusCode::OK, "{:?}", res.body);
    let items = res.body["order_items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["quantity"], 1);

    let cart = app.get(&format!("/api/carts/{cart_id}"), None).await;
    let lines = cart.body["lines"].as_array().unwrap();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["dish_id"], tacos.as_str());
    assert_eq!(lines[0]["quantity"], 1);
    assert_eq!(lines[1]["dish_id"], agua.as_str());
    assert_money(&cart.body["total"], 14.99);
}

#[tokio::test]
async fn test_checkout_requires_authentication() {
    let app = TestApp::new();
    let dish = app.seed_dish("Tacos", 9.99, None, true).await;
    let cart_id = app.create_cart().await;
    app.add_to_cart(&cart_id, &dish).await;

    let res = app
        .post(&format!("/api/carts/{cart_id}/checkout"), None, json!({}))
        .await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.code(), 1001);

    // 购物车保留
    let cart = app.get(&format!("/api/carts/{cart_id}"), None).await;
    assert_eq!(cart.body["item_count"], 1);
    assert_eq!(app.store.inner.count(tables::ORDERS), 0);
}

#[tokio::test]
async fn test_checkout_rejects_invalid_token() {
    let app = TestApp::new();
    let cart_id = app.create_cart().await;

    let res = app
        .post(
            &format!("/api/carts/{cart_id}/checkout"),
            Some("not-a-jwt"),
            json!({}),
        )
        .await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.code(), 1004);
}

#[tokio::test]
async fn test_checkout_empty_cart() {
    let app = TestApp::new();
    let token = app.sign_up("ana@example.com", "cliente").await;
    let cart_id = app.create_cart().await;

    let res = app
        .post(&format!("/api/carts/{cart_id}/checkout"), Some(&token), json!({}))
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.code(), 4002);
    assert_eq!(app.store.inner.count(tables::ORDERS), 0);
}

#[tokio::test]
async fn test_item_insert_failure_rolls_back_order() {
    let app = TestApp::new();
    let token = app.sign_up("ana@example.com", "cliente").await;
    let dish = app.seed_dish("Tacos", 9.99, None, true).await;
    let cart_id = app.create_cart().await;
    app.add_to_cart(&cart_id, &dish).await;

    app.store.fail(Op::Insert, tables::ORDER_ITEMS);
    let res = app
        .post(&format!("/api/carts/{cart_id}/checkout"), Some(&token), json!({}))
        .await;
    assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(res.code(), 4005);

    // 两者都没有
    assert_eq!(app.store.inner.count(tables::ORDERS), 0);
    assert_eq!(app.store.inner.count(tables::ORDER_ITEMS), 0);
    let cart = app.get(&format!("/api/carts/{cart_id}"), None).await;
    assert_eq!(cart.body["item_count"], 1);

    // 恢复后同一个购物车可以正常下单
    app.store.heal(Op::Insert, tables::ORDER_ITEMS);
    let res = app
        .post(&format!("/api/carts/{cart_id}/checkout"), Some(&token), json!({}))
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(app.store.inner.count(tables::ORDERS), 1);
}

#[tokio::test]
async fn test_failed_rollback_reports_orphan_order() {
    let app = TestApp::new();
    let token = app.sign_up("ana@example.com", "cliente").await;
    let dish = app.seed_dish("Tacos", 9.99, None, true).await;
    let cart_id = app.create_cart().await;
    app.add_to_cart(&cart_id, &dish).await;

    app.store.fail(Op::Insert, tables::ORDER_ITEMS);
    app.store.fail(Op::Delete, tables::ORDERS);
    let res = app
        .post(&format!("/api/carts/{cart_id}/checkout"), Some(&token), json!({}))
        .await;
    assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(res.code(), 4006);
    assert!(res.body["details"]["order_id"].is_string());
    assert_eq!(app.store.inner.count(tables::ORDERS), 1);

    let cart = app.get(&format!("/api/carts/{cart_id}"), None).await;
    assert_eq!(cart.body["item_count"], 1);
}

#[tokio::test]
async fn test_order_insert_failure() {
    let app = TestApp::new();
    let token = app.sign_up("ana@example.com", "cliente").await;
    let dish = app.seed_dish("Tacos", 9.99, None, true).await;

    app.store.fail(Op::Insert, tables::ORDERS);
    let res = app.place_order(&token, &[(&dish, 1)]).await;
    assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(res.code(), 4005);
    assert_eq!(app.store.inner.count(tables::ORDER_ITEMS), 0);
}

#[tokio::test]
async fn test_cart_operations() {
    let app = TestApp::new();
    let tacos = app.seed_dish("Tacos", 9.99, None, true).await;
    let agua = app.seed_dish("Agua", 5.00, None, true).await;
    let cart_id = app.create_cart().await;

    app.add_to_cart(&cart_id, &tacos).await;
    app.add_to_cart(&cart_id, &tacos).await;
    let res = app.add_to_cart(&cart_id, &agua).await;
    assert_eq!(res.body["lines"].as_array().unwrap().len(), 2);
    assert_eq!(res.body["item_count"], 3);
    assert_money(&res.body["total"], 24.98);

    // 数量降到 0 即移除
    let res = app
        .request(
            Method::PATCH,
            &format!("/api/carts/{cart_id}/items/{agua}"),
            None,
            Some(json!({ "delta": -1 })),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["lines"].as_array().unwrap().len(), 1);

    // 未知菜品是空操作
    let res = app
        .request(
            Method::PATCH,
            &format!("/api/carts/{cart_id}/items/unknown"),
            None,
            Some(json!({ "delta": 3 })),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["item_count"], 2);

    let res = app
        .request(
            Method::DELETE,
            &format!("/api/carts/{cart_id}/items/{tacos}"),
            None,
            None,
        )
        .await;
    assert_eq!(res.body["lines"], json!([]));

    let res = app
        .request(Method::DELETE, &format!("/api/carts/{cart_id}"), None, None)
        .await;
    assert_eq!(res.status, StatusCode::OK);
    let res = app.get(&format!("/api/carts/{cart_id}"), None).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.code(), 4101);
}

#[tokio::test]
async fn test_add_item_checks_dish() {
    let app = TestApp::new();
    let hidden = app.seed_dish("Secreto", 3.0, None, false).await;
    let cart_id = app.create_cart().await;

    let res = app.add_to_cart(&cart_id, &hidden).await;
    assert_eq!(res.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(res.code(), 6003);

    let res = app.add_to_cart(&cart_id, "missing").await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.code(), 6001);

    let res = app.add_to_cart("no-such-cart", &hidden).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.code(), 4101);
}
