//! Data models
//!
//! 记录存储中各表对应的行类型及其创建/更新载荷。
//! ID 由存储生成，统一使用字符串。

pub mod category;
pub mod dining_table;
pub mod dish;
pub mod order;
pub mod user;

pub use category::*;
pub use dining_table::*;
pub use dish::*;
pub use order::*;
pub use user::*;
