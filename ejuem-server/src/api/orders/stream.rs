//! SSE encoding of order feed snapshots

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::Stream;
use tokio::sync::watch;

use crate::orders::OrderFeed;
use crate::orders::views::{self, StatusFilter};
use shared::models::{Order, Role};

const EVENT_NAME: &str = "orders";
const KEEP_ALIVE_SECS: u64 = 15;

/// Stops a per-connection feed when the SSE stream is dropped
pub struct FeedGuard(OrderFeed);

impl FeedGuard {
    pub fn new(feed: OrderFeed) -> Self {
        Self(feed)
    }
}

impl Drop for FeedGuard {
    fn drop(&mut self) {
        self.0.stop();
    }
}

fn encode(orders: &[Order], role: Role, filter: StatusFilter) -> Option<Event> {
    let views = views::with_actions(filter.apply(orders.to_vec()), role);
    Event::default()
        .event(EVENT_NAME)
        .json_data(&views)
        .map_err(|e| tracing::warn!(error = %e, "Failed to encode order snapshot"))
        .ok()
}

/// 先发送当前快照，之后每次快照变化发送一次；推送任务结束时流随之结束
pub fn order_events(
    mut rx: watch::Receiver<Arc<Vec<Order>>>,
    role: Role,
    filter: StatusFilter,
    guard: Option<FeedGuard>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream = async_stream::stream! {
        let _guard = guard;

        loop {
            let snapshot = rx.borrow_and_update().clone();
            if let Some(event) = encode(&snapshot, role, filter) {
                yield Ok(event);
            }
            if rx.changed().await.is_err() {
                break;
            }
        }
    };

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(KEEP_ALIVE_SECS))
            .text("keep-alive"),
    )
}
