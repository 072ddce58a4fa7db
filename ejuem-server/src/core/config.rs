use std::str::FromStr;
use std::time::Duration;

use crate::auth::JwtConfig;
use crate::core::ServerError;

/// Record store backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// 进程内存储 + 本地会话 (开发 / 测试)
    Memory,
    /// 托管后端 (PostgREST + GoTrue)
    Rest,
}

impl StoreBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::Rest => "rest",
        }
    }
}

impl FromStr for StoreBackend {
    type Err = ServerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "rest" => Ok(Self::Rest),
            other => Err(ServerError::Config(format!(
                "STORE_BACKEND must be 'memory' or 'rest', got '{other}'"
            ))),
        }
    }
}

/// 服务器配置
///
/// # 环境变量
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | HTTP_PORT | 3000 | HTTP 服务端口 |
/// | ENVIRONMENT | development | 运行环境 |
/// | STORE_BACKEND | memory | memory / rest |
/// | STORE_URL | http://localhost:54321 | 托管后端地址 |
/// | STORE_API_KEY | (空) | 托管后端 anon key |
/// | JWT_SECRET | debug 下使用开发密钥 | 本地令牌密钥 (≥ 32 字符) |
/// | JWT_EXPIRATION_MINUTES | 1440 | 本地令牌有效期 |
/// | ORDER_POLL_INTERVAL_MS | 5000 | 订单推送轮询周期 |
/// | REQUEST_TIMEOUT_MS | 30000 | 外部请求超时(毫秒) |
/// | CART_IDLE_TIMEOUT_MINUTES | 120 | 匿名购物车闲置多久后清除 |
/// | HOUSEKEEPING_INTERVAL_SECS | 60 | 购物车 / 吊销记录清理周期 |
/// | LOG_LEVEL | info | 日志级别 |
/// | LOG_DIR | (未设置) | 设置后同时写入滚动日志文件 |
///
/// # 示例
///
/// ```ignore
/// STORE_BACKEND=rest STORE_URL=https://xyz.supabase.co STORE_API_KEY=... cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP API 服务端口
    pub http_port: u16,
    /// 运行环境: development | production
    pub environment: String,
    pub store_backend: StoreBackend,
    pub store_url: String,
    pub store_api_key: String,
    /// 本地会话的 JWT 配置 (仅 memory 后端需要)
    pub jwt: Option<JwtConfig>,
    /// 订单推送轮询周期 (毫秒)
    pub order_poll_interval_ms: u64,
    /// 外部请求超时时间 (毫秒)
    pub request_timeout_ms: u64,
    pub cart_idle_timeout_minutes: u64,
    pub housekeeping_interval_secs: u64,
    pub log_level: String,
    pub log_dir: Option<String>,
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Result<Self, ServerError> {
        let store_backend: StoreBackend = std::env::var("STORE_BACKEND")
            .unwrap_or_else(|_| "memory".into())
            .parse()?;

        let jwt = match store_backend {
            StoreBackend::Memory => Some(
                JwtConfig::from_env().map_err(|e| ServerError::Config(e.to_string()))?,
            ),
            StoreBackend::Rest => None,
        };

        Ok(Self {
            http_port: env_or("HTTP_PORT", 3000),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            store_backend,
            store_url: std::env::var("STORE_URL")
                .unwrap_or_else(|_| "http://localhost:54321".into()),
            store_api_key: std::env::var("STORE_API_KEY").unwrap_or_default(),
            jwt,
            order_poll_interval_ms: env_or("ORDER_POLL_INTERVAL_MS", 5000),
            request_timeout_ms: env_or("REQUEST_TIMEOUT_MS", 30000),
            cart_idle_timeout_minutes: env_or("CART_IDLE_TIMEOUT_MINUTES", 120),
            housekeeping_interval_secs: env_or("HOUSEKEEPING_INTERVAL_SECS", 60),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: std::env::var("LOG_DIR").ok().filter(|d| !d.is_empty()),
        })
    }

    /// 内存后端的测试配置
    pub fn for_tests(jwt_secret: &str) -> Self {
        Self {
            http_port: 0,
            environment: "test".into(),
            store_backend: StoreBackend::Memory,
            store_url: String::new(),
            store_api_key: String::new(),
            jwt: Some(JwtConfig::with_secret(jwt_secret)),
            order_poll_interval_ms: 5000,
            request_timeout_ms: 30000,
            cart_idle_timeout_minutes: 120,
            housekeeping_interval_secs: 60,
            log_level: "info".into(),
            log_dir: None,
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.order_poll_interval_ms.max(1))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn cart_idle_timeout(&self) -> Duration {
        Duration::from_secs(self.cart_idle_timeout_minutes.saturating_mul(60))
    }

    pub fn housekeeping_interval(&self) -> Duration {
        Duration::from_secs(self.housekeeping_interval_secs.max(1))
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// 是否开发环境
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_backend_parse() {
        assert_eq!("memory".parse::<StoreBackend>().unwrap(), StoreBackend::Memory);
        assert_eq!("REST".parse::<StoreBackend>().unwrap(), StoreBackend::Rest);
        assert!(matches!(
            "sqlite".parse::<StoreBackend>(),
            Err(ServerError::Config(_))
        ));
    }

    #[test]
    fn test_test_config_defaults() {
        let config = Config::for_tests("test-secret-at-least-thirty-two-bytes-long");
        assert_eq!(config.poll_interval(), Duration::from_secs(5));
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.cart_idle_timeout(), Duration::from_secs(2 * 60 * 60));
        assert_eq!(config.housekeeping_interval(), Duration::from_secs(60));
        assert!(!config.is_production());
    }
}
