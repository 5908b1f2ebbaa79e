use std::collections::HashMap;

use async_trait::async_trait;
use redis::AsyncCommands;
use uuid::Uuid;

use wayfare_core::store::{HistoryEntry, StoreError, UserRecord, UserStore, UserUpdate};

fn unavailable(e: redis::RedisError) -> StoreError {
    StoreError::Unavailable(e.to_string())
}

fn corrupt(e: serde_json::Error) -> StoreError {
    StoreError::Serialization(e.to_string())
}

/// Redis-backed user/history store.
///
/// Layout: `user:{username}` holds the account document as JSON,
/// `email:{email}` is an index mapping an address to its owner, and
/// `history:{username}` is a hash keyed by entry id.
#[derive(Clone)]
pub struct RedisStore {
    client: redis::Client,
}

impl RedisStore {
    pub async fn new(connection_string: &str) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(connection_string)?;
        Ok(Self { client })
    }
}

#[async_trait]
impl UserStore for RedisStore {
    async fn get_user(&self, username: &str) -> Result<Option<UserRecord>, StoreError> {
        let mut conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(unavailable)?;
        let raw: Option<String> = conn
            .get(format!("user:{}", username))
            .await
            .map_err(unavailable)?;
        match raw {
            Some(json) => Ok(Some(serde_json::from_str(&json).map_err(corrupt)?)),
            None => Ok(None),
        }
    }

    async fn create_user(&self, user: &UserRecord) -> Result<(), StoreError> {
        let payload = serde_json::to_string(user).map_err(corrupt)?;
        let mut conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(unavailable)?;
        conn.set::<_, _, ()>(format!("user:{}", user.username), payload)
            .await
            .map_err(unavailable)?;
        conn.set::<_, _, ()>(format!("email:{}", user.email), &user.username)
            .await
            .map_err(unavailable)?;
        tracing::debug!("Created user {}", user.username);
        Ok(())
    }

    async fn user_exists(&self, username: &str) -> Result<bool, StoreError> {
        let mut conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(unavailable)?;
        conn.exists(format!("user:{}", username))
            .await
            .map_err(unavailable)
    }

    async fn email_exists(&self, email: &str) -> Result<bool, StoreError> {
        let mut conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(unavailable)?;
        conn.exists(format!("email:{}", email))
            .await
            .map_err(unavailable)
    }

    async fn email_exists_for_other_user(
        &self,
        email: &str,
        username: &str,
    ) -> Result<bool, StoreError> {
        let mut conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(unavailable)?;
        let owner: Option<String> = conn
            .get(format!("email:{}", email))
            .await
            .map_err(unavailable)?;
        Ok(owner.is_some_and(|owner| owner != username))
    }

    async fn update_user(&self, username: &str, update: UserUpdate) -> Result<(), StoreError> {
        let mut user = self
            .get_user(username)
            .await?
            .ok_or_else(|| StoreError::UserNotFound(username.to_string()))?;
        let old_email = user.email.clone();

        if let Some(email) = update.email {
            user.email = email;
        }
        if let Some(password_hash) = update.password_hash {
            user.password_hash = password_hash;
        }

        let payload = serde_json::to_string(&user).map_err(corrupt)?;
        let mut conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(unavailable)?;
        conn.set::<_, _, ()>(format!("user:{}", username), payload)
            .await
            .map_err(unavailable)?;

        // Keep the email index in step with the document
        if user.email != old_email {
            conn.del::<_, ()>(format!("email:{}", old_email))
                .await
                .map_err(unavailable)?;
            conn.set::<_, _, ()>(format!("email:{}", user.email), username)
                .await
                .map_err(unavailable)?;
        }
        Ok(())
    }

    async fn save_history(&self, username: &str, entry: &HistoryEntry) -> Result<(), StoreError> {
        let payload = serde_json::to_string(entry).map_err(corrupt)?;
        let mut conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(unavailable)?;
        conn.hset::<_, _, _, ()>(
            format!("history:{}", username),
            entry.id.to_string(),
            payload,
        )
        .await
        .map_err(unavailable)
    }

    async fn get_history(
        &self,
        username: &str,
        limit: usize,
    ) -> Result<Vec<HistoryEntry>, StoreError> {
        let mut conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(unavailable)?;
        let raw: HashMap<String, String> = conn
            .hgetall(format!("history:{}", username))
            .await
            .map_err(unavailable)?;

        let mut entries = Vec::with_capacity(raw.len());
        for json in raw.values() {
            entries.push(serde_json::from_str::<HistoryEntry>(json).map_err(corrupt)?);
        }
        entries.sort_by(|a, b| b.searched_at.cmp(&a.searched_at));
        entries.truncate(limit);
        Ok(entries)
    }

    async fn delete_history_item(
        &self,
        username: &str,
        entry_id: Uuid,
    ) -> Result<bool, StoreError> {
        let mut conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(unavailable)?;
        let removed: i64 = conn
            .hdel(format!("history:{}", username), entry_id.to_string())
            .await
            .map_err(unavailable)?;
        Ok(removed > 0)
    }
}
