//! 认证授权模块
//!
//! - [`SessionProvider`] - 会话提供者抽象 (本地 / 托管)
//! - [`CurrentUser`] - 当前用户上下文 (提取器)
//! - [`JwtService`] - 本地令牌服务
//! - [`require_auth`] / [`require_staff`] / [`require_admin`] - 中间件

pub mod extractor;
pub mod jwt;
pub mod local;
pub mod middleware;
pub mod remote;
pub mod session;

pub use jwt::{Claims, JwtConfig, JwtError, JwtService};
pub use local::LocalSessionProvider;
pub use middleware::{CurrentUserExt, require_admin, require_auth, require_staff};
pub use remote::RemoteSessionProvider;
pub use session::{AuthError, AuthResult, CurrentUser, Session, SessionProvider};
