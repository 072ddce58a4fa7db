use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::auth::{JwtService, LocalSessionProvider, RemoteSessionProvider, SessionProvider};
use crate::core::config::StoreBackend;
use crate::core::{Config, ServerError};
use crate::db::{MemoryStore, RecordStore, RestStore};
use crate::orders::{CartRegistry, FeedSource, OrderFeed, OrderLifecycle, OrderSubmitter};
use crate::services::CatalogService;

/// 服务器状态 - 持有所有服务的共享引用
///
/// 使用 Arc 实现浅拷贝，克隆成本极低。
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | store | Arc<dyn RecordStore> | 记录存储 |
/// | sessions | Arc<dyn SessionProvider> | 会话提供者 |
/// | carts | Arc<CartRegistry> | 匿名购物车 |
/// | admin_feed | OrderFeed | 管理视图订单推送 |
/// | shutdown | CancellationToken | 后台任务停止信号 |
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub store: Arc<dyn RecordStore>,
    pub sessions: Arc<dyn SessionProvider>,
    pub carts: Arc<CartRegistry>,
    pub admin_feed: OrderFeed,
    pub shutdown: CancellationToken,
}

impl std::fmt::Debug for ServerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerState")
            .field("config", &self.config)
            .field("carts", &self.carts.len())
            .finish_non_exhaustive()
    }
}

impl ServerState {
    /// 创建服务器状态 (手动构造)
    ///
    /// 会启动管理视图的订单推送任务与清理任务，因此必须在 tokio 运行时内调用。
    pub fn new(
        config: Config,
        store: Arc<dyn RecordStore>,
        sessions: Arc<dyn SessionProvider>,
    ) -> Self {
        let shutdown = CancellationToken::new();
        let admin_feed = OrderFeed::spawn(
            store.clone(),
            FeedSource::All,
            config.poll_interval(),
            shutdown.child_token(),
        );

        let carts = Arc::new(CartRegistry::new());
        carts.spawn_sweeper(
            config.cart_idle_timeout(),
            config.housekeeping_interval(),
            shutdown.child_token(),
        );
        spawn_session_pruner(
            sessions.clone(),
            config.housekeeping_interval(),
            shutdown.child_token(),
        );

        Self {
            config,
            store,
            sessions,
            carts,
            admin_feed,
            shutdown,
        }
    }

    /// 按配置的后端初始化
    ///
    /// - `memory`: [`MemoryStore`] + [`LocalSessionProvider`]
    /// - `rest`: [`RestStore`] + [`RemoteSessionProvider`]
    pub fn initialize(config: &Config) -> Result<Self, ServerError> {
        let timeout = config.request_timeout();

        let (store, sessions): (Arc<dyn RecordStore>, Arc<dyn SessionProvider>) =
            match config.store_backend {
                StoreBackend::Memory => {
                    let jwt = config.jwt.clone().ok_or_else(|| {
                        ServerError::Config("memory backend requires JWT configuration".into())
                    })?;
                    let store: Arc<dyn RecordStore> = Arc::new(MemoryStore::new());
                    let sessions =
                        Arc::new(LocalSessionProvider::new(store.clone(), JwtService::with_config(jwt)));
                    (store, sessions)
                }
                StoreBackend::Rest => {
                    let store = RestStore::new(&config.store_url, &config.store_api_key, timeout)
                        .map_err(|e| ServerError::Init(e.to_string()))?;
                    let sessions = RemoteSessionProvider::new(
                        &config.store_url,
                        &config.store_api_key,
                        timeout,
                    )
                    .map_err(|e| ServerError::Init(e.to_string()))?;
                    (Arc::new(store), Arc::new(sessions))
                }
            };

        tracing::info!(
            backend = ?config.store_backend,
            store_url = %config.store_url,
            "Record store initialized"
        );

        Ok(Self::new(config.clone(), store, sessions))
    }

    pub fn catalog(&self) -> CatalogService {
        CatalogService::new(self.store.clone())
    }

    pub fn submitter(&self) -> OrderSubmitter {
        OrderSubmitter::new(self.store.clone())
    }

    pub fn lifecycle(&self) -> OrderLifecycle {
        OrderLifecycle::new(self.store.clone())
    }

    /// Per-connection feed for one customer, stopped with the server or via its own token
    pub fn customer_feed(&self, user_id: &str) -> OrderFeed {
        OrderFeed::spawn(
            self.store.clone(),
            FeedSource::User(user_id.to_string()),
            self.config.poll_interval(),
            self.shutdown.child_token(),
        )
    }

    /// 停止所有后台任务
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }
}

/// 定期清理会话提供者中已失效的记录 (本地吊销的 jti)
fn spawn_session_pruner(
    sessions: Arc<dyn SessionProvider>,
    every: Duration,
    cancel: CancellationToken,
) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    let pruned = sessions.prune_expired();
                    if pruned > 0 {
                        tracing::debug!(pruned, "Expired revocations pruned");
                    }
                }
            }
        }
    });
}
