//! Cart Registry
//!
//! 服务端持有的匿名购物车，以 uuid 为键。HTTP 客户端通过购物车 ID
//! 驱动 [`Cart`] 引擎；结账时才需要登录。
//!
//! 每次读写都会刷新购物车的最后访问时间，闲置超过 TTL 的购物车由
//! [`CartRegistry::spawn_sweeper`] 定期清除。

use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use shared::models::Dish;
use shared::order::Cart;

#[derive(Debug)]
struct Entry {
    cart: Cart,
    touched: Instant,
}

impl Entry {
    fn new() -> Self {
        Self {
            cart: Cart::new(),
            touched: Instant::now(),
        }
    }
}

#[derive(Debug, Default)]
pub struct CartRegistry {
    carts: DashMap<String, Entry>,
}

impl CartRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty cart and return its id
    pub fn create(&self) -> String {
        let id = Uuid::new_v4().to_string();
        self.carts.insert(id.clone(), Entry::new());
        id
    }

    /// Snapshot of the cart
    pub fn get(&self, id: &str) -> Option<Cart> {
        let mut entry = self.carts.get_mut(id)?;
        entry.touched = Instant::now();
        Some(entry.cart.clone())
    }

    /// Run `f` against the cart, returning the updated snapshot
    ///
    /// `None` 表示购物车不存在。
    pub fn modify(&self, id: &str, f: impl FnOnce(&mut Cart)) -> Option<Cart> {
        let mut entry = self.carts.get_mut(id)?;
        entry.touched = Instant::now();
        f(&mut entry.cart);
        Some(entry.cart.clone())
    }

    pub fn add(&self, id: &str, dish: &Dish) -> Option<Cart> {
        self.modify(id, |cart| cart.add(dish))
    }

    pub fn update_quantity(&self, id: &str, dish_id: &str, delta: i32) -> Option<Cart> {
        self.modify(id, |cart| cart.update_quantity(dish_id, delta))
    }

    pub fn remove(&self, id: &str, dish_id: &str) -> Option<Cart> {
        self.modify(id, |cart| cart.remove(dish_id))
    }

    /// Remove what a successful checkout ordered
    ///
    /// 结账期间新加入的菜品与数量保留在购物车中。
    pub fn settle(&self, id: &str, submitted: &Cart) -> Option<Cart> {
        self.modify(id, |cart| cart.deduct(submitted))
    }

    /// Drop the cart entirely
    pub fn discard(&self, id: &str) -> bool {
        self.carts.remove(id).is_some()
    }

    /// Drop carts untouched for at least `max_idle`; returns how many were dropped
    pub fn evict_idle(&self, max_idle: Duration) -> usize {
        let before = self.carts.len();
        self.carts.retain(|_, entry| entry.touched.elapsed() < max_idle);
        before.saturating_sub(self.carts.len())
    }

    pub fn len(&self) -> usize {
        self.carts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.carts.is_empty()
    }

    /// Periodically evict idle carts until `cancel` fires
    pub fn spawn_sweeper(
        self: &Arc<Self>,
        max_idle: Duration,
        every: Duration,
        cancel: CancellationToken,
    ) {
        let registry = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {
                        let evicted = registry.evict_idle(max_idle);
                        if evicted > 0 {
                            tracing::debug!(evicted, remaining = registry.len(), "Idle carts evicted");
                        }
                    }
                }
            }
            tracing::debug!("Cart sweeper stopped");
        });
    }
}
