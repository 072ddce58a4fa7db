//! Order domain
//!
//! - [`cart`]: 购物车引擎（纯内存，无存储访问）
//! - [`lifecycle`]: 订单状态机与按角色可用的操作

pub mod cart;
pub mod lifecycle;

pub use cart::{Cart, CartLine, MAX_LINE_QUANTITY};
pub use lifecycle::{OrderStatus, StatusAction, available_actions};
