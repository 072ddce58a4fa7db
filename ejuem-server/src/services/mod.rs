//! 业务服务

pub mod catalog;

pub use catalog::{CatalogService, CategoryFilter};
