//! Ejuem Server - 餐厅点餐后端
//!
//! # 架构概述
//!
//! 顾客浏览菜单、在匿名购物车中选菜并下单；员工 (mesero / admin)
//! 推进订单状态；管理员维护分类、菜品和桌台。所有持久化通过
//! [`db::RecordStore`] 访问，认证委托给 [`auth::SessionProvider`]。
//!
//! # 模块结构
//!
//! ```text
//! ejuem-server/src/
//! ├── core/          # 配置、状态、错误、HTTP 服务器
//! ├── auth/          # 会话提供者、JWT、中间件
//! ├── db/            # 记录存储 (memory / rest) 与仓储
//! ├── services/      # 菜单读取
//! ├── orders/        # 购物车注册表、下单、状态机、订单推送
//! ├── api/           # HTTP 路由和处理器
//! └── utils/         # 错误转换、日志
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod orders;
pub mod services;
pub mod utils;

// Re-export 公共类型
pub use auth::{CurrentUser, JwtService, SessionProvider};
pub use core::{Config, Server, ServerState};
pub use db::{MemoryStore, RecordStore, RestStore};
pub use utils::{AppError, AppResult};

// Re-export unified error types from shared
pub use utils::{ApiResponse, ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

// Security logging macro - 支持 tracing 格式说明符
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

/// 加载 .env 并初始化日志 (LOG_LEVEL / LOG_DIR)
pub fn setup_environment() {
    if let Err(e) = dotenv::dotenv() {
        // 没有 .env 文件是正常情况
        if !e.not_found() {
            eprintln!("Failed to load .env: {e}");
        }
    }

    let log_level = std::env::var("LOG_LEVEL").ok();
    let log_dir = std::env::var("LOG_DIR").ok();
    init_logger_with_file(log_level.as_deref(), log_dir.as_deref());
}

pub fn print_banner() {
    println!(
        r#"
    ______    _
   / ____/   (_)_  _____  ____ ___
  / __/     / / / / / _ \/ __ `__ \
 / /___    / / /_/ /  __/ / / / / /
/_____/ __/ /\__,_/\___/_/ /_/ /_/
       /___/
    "#
    );
}
