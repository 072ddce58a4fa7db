//! User Repository
//!
//! `users` 保存资料行（名称、邮箱、角色）；`credentials` 保存本地会话
//! 提供者使用的密码哈希，永远不会被嵌入到其他查询中。

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::{Query, RecordStore, decode_first, tables};
use shared::models::User;

/// Local password credential row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credential {
    /// Same id as the `users` row
    pub id: String,
    pub email: String,
    pub password_hash: String,
}

#[derive(Clone)]
pub struct UserRepository {
    base: BaseRepository,
}

impl UserRepository {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            base: BaseRepository::new(store),
        }
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<User>> {
        let rows = self
            .base
            .store()
            .select(tables::USERS, &Query::new().eq("id", id))
            .await?;
        Ok(decode_first(rows)?)
    }

    /// Insert the profile row; `user.id` is kept as the row id
    pub async fn create(&self, user: &User) -> RepoResult<User> {
        let rows = self
            .base
            .store()
            .insert(tables::USERS, vec![serde_json::to_value(user)?])
            .await?;
        decode_first(rows)?
            .ok_or_else(|| RepoError::Validation("Store returned no user row".into()))
    }

    pub async fn find_credential(&self, email: &str) -> RepoResult<Option<Credential>> {
        let rows = self
            .base
            .store()
            .select(tables::CREDENTIALS, &Query::new().eq("email", email))
            .await?;
        Ok(decode_first(rows)?)
    }

    pub async fn create_credential(&self, credential: &Credential) -> RepoResult<()> {
        self.base
            .store()
            .insert(tables::CREDENTIALS, vec![serde_json::to_value(credential)?])
            .await?;
        Ok(())
    }
}
