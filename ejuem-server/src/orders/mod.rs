//! 订单模块
//!
//! - [`cart_registry`]: 服务端购物车
//! - [`submitter`]: 结账 (订单 + 订单项，失败时补偿删除)
//! - [`lifecycle`]: 状态变更 (CAS)
//! - [`views`]: 顾客 / 管理订单视图
//! - [`feed`]: 订单快照推送

pub mod cart_registry;
pub mod feed;
pub mod lifecycle;
pub mod submitter;
pub mod views;

pub use cart_registry::CartRegistry;
pub use feed::{FeedSource, OrderFeed};
pub use lifecycle::OrderLifecycle;
pub use submitter::OrderSubmitter;
pub use views::{OrderView, StatusFilter};
