//! Order Feed
//!
//! 后台任务维护订单列表快照，通过 `tokio::sync::watch` 发布：
//! - 存储发布 `orders` / `order_items` 变更时立即刷新
//! - 至少每 `poll_interval` 刷新一次 (存储不发布通知时这是唯一方式)
//!
//! 刷新失败时保留上一份快照并记录警告。

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, watch};
use tokio_util::sync::CancellationToken;

use crate::db::repository::OrderRepository;
use crate::db::{ChangeEvent, RecordStore, tables};
use shared::models::Order;

/// Which listing a feed tracks
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedSource {
    /// 管理视图：全部订单
    All,
    /// 顾客视图：该用户的订单
    User(String),
}

/// Handle to a running feed
#[derive(Clone)]
pub struct OrderFeed {
    rx: watch::Receiver<Arc<Vec<Order>>>,
    cancel: CancellationToken,
}

impl OrderFeed {
    /// Spawn the refresh task; it stops when `cancel` fires
    pub fn spawn(
        store: Arc<dyn RecordStore>,
        source: FeedSource,
        poll_interval: Duration,
        cancel: CancellationToken,
    ) -> Self {
        let (tx, rx) = watch::channel(Arc::new(Vec::new()));
        let changes = store.subscribe();
        let repo = OrderRepository::new(store);

        tokio::spawn(run(repo, source, poll_interval, changes, tx, cancel.clone()));

        Self { rx, cancel }
    }

    /// New receiver positioned at the current snapshot
    pub fn subscribe(&self) -> watch::Receiver<Arc<Vec<Order>>> {
        self.rx.clone()
    }

    /// Stop the refresh task
    pub fn stop(&self) {
        self.cancel.cancel();
    }
}

fn is_order_change(event: &ChangeEvent) -> bool {
    event.table == tables::ORDERS || event.table == tables::ORDER_ITEMS
}

async fn load(repo: &OrderRepository, source: &FeedSource) -> Option<Vec<Order>> {
    let result = match source {
        FeedSource::All => repo.find_all().await,
        FeedSource::User(user_id) => repo.find_by_user(user_id).await,
    };
    result
        .map_err(|e| tracing::warn!(error = %e, ?source, "Order feed refresh failed"))
        .ok()
}

async fn next_change(changes: &mut Option<broadcast::Receiver<ChangeEvent>>) -> Option<bool> {
    match changes {
        Some(rx) => match rx.recv().await {
            Ok(event) => Some(is_order_change(&event)),
            // 落后时无法得知丢失了什么，直接刷新
            Err(broadcast::error::RecvError::Lagged(_)) => Some(true),
            Err(broadcast::error::RecvError::Closed) => None,
        },
        None => std::future::pending().await,
    }
}

async fn run(
    repo: OrderRepository,
    source: FeedSource,
    poll_interval: Duration,
    mut changes: Option<broadcast::Receiver<ChangeEvent>>,
    tx: watch::Sender<Arc<Vec<Order>>>,
    cancel: CancellationToken,
) {
    let mut ticker = tokio::time::interval(poll_interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    tracing::debug!(?source, ?poll_interval, "Order feed started");

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
            change = next_change(&mut changes) => match change {
                Some(true) => {}
                Some(false) => continue,
                None => {
                    tracing::warn!(?source, "Change notifications closed, polling only");
                    changes = None;
                    continue;
                }
            },
        }

        if let Some(orders) = load(&repo, &source).await {
            tx.send_if_modified(|current| {
                if current.as_slice() == orders.as_slice() {
                    false
                } else {
                    *current = Arc::new(orders);
                    true
                }
            });
        }
    }

    tracing::debug!(?source, "Order feed stopped");
}
