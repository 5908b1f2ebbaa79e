use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use wayfare_core::store::{HistoryEntry, StoreError, UserRecord, UserStore, UserUpdate};

#[derive(Default)]
struct MemoryInner {
    users: HashMap<String, UserRecord>,
    history: HashMap<String, Vec<HistoryEntry>>,
}

/// Process-lifetime store for local development and tests. State lives for
/// as long as the instance the caller injected; nothing is global.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<MemoryInner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn get_user(&self, username: &str) -> Result<Option<UserRecord>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.users.get(username).cloned())
    }

    async fn create_user(&self, user: &UserRecord) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        inner.users.insert(user.username.clone(), user.clone());
        Ok(())
    }

    async fn user_exists(&self, username: &str) -> Result<bool, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.users.contains_key(username))
    }

    async fn email_exists(&self, email: &str) -> Result<bool, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.users.values().any(|user| user.email == email))
    }

    async fn email_exists_for_other_user(
        &self,
        email: &str,
        username: &str,
    ) -> Result<bool, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .users
            .values()
            .any(|user| user.email == email && user.username != username))
    }

    async fn update_user(&self, username: &str, update: UserUpdate) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let user = inner
            .users
            .get_mut(username)
            .ok_or_else(|| StoreError::UserNotFound(username.to_string()))?;
        if let Some(email) = update.email {
            user.email = email;
        }
        if let Some(password_hash) = update.password_hash {
            user.password_hash = password_hash;
        }
        Ok(())
    }

    async fn save_history(&self, username: &str, entry: &HistoryEntry) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        inner
            .history
            .entry(username.to_string())
            .or_default()
            .push(entry.clone());
        Ok(())
    }

    async fn get_history(
        &self,
        username: &str,
        limit: usize,
    ) -> Result<Vec<HistoryEntry>, StoreError> {
        let inner = self.inner.read().await;
        let mut entries: Vec<HistoryEntry> =
            inner.history.get(username).cloned().unwrap_or_default();
        entries.sort_by(|a, b| b.searched_at.cmp(&a.searched_at));
        entries.truncate(limit);
        Ok(entries)
    }

    async fn delete_history_item(
        &self,
        username: &str,
        entry_id: Uuid,
    ) -> Result<bool, StoreError> {
        let mut inner = self.inner.write().await;
        if let Some(entries) = inner.history.get_mut(username) {
            let before = entries.len();
            entries.retain(|entry| entry.id != entry_id);
            return Ok(entries.len() < before);
        }
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};
    use wayfare_core::store::{FlightSummary, HotelSummary, PackageSnapshot};

    fn user(name: &str, email: &str) -> UserRecord {
        UserRecord {
            username: name.to_string(),
            email: email.to_string(),
            password_hash: "ab12cd34".to_string(),
            created_at: Utc::now(),
        }
    }

    fn snapshot() -> PackageSnapshot {
        PackageSnapshot {
            flight: FlightSummary {
                carrier: "Delta Air Lines".to_string(),
                price: 420.0,
                currency: "USD".to_string(),
                stops: 0,
            },
            hotel: HotelSummary {
                name: "Harbour View".to_string(),
                price_per_night: 100.0,
                total_price: 500.0,
                currency: "EUR".to_string(),
            },
            destination_total: 530.0,
            currency: "EUR".to_string(),
        }
    }

    fn entry(offset_seconds: i64) -> HistoryEntry {
        HistoryEntry {
            id: Uuid::new_v4(),
            origin: "JFK".to_string(),
            destination: "PAR".to_string(),
            departure_date: NaiveDate::from_ymd_opt(2024, 5, 5).unwrap(),
            return_date: NaiveDate::from_ymd_opt(2024, 5, 10).unwrap(),
            adults: 2,
            best_package: snapshot(),
            searched_at: Utc.timestamp_opt(1_700_000_000 + offset_seconds, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_create_and_lookup_user() {
        let store = MemoryStore::new();
        assert!(!store.user_exists("ren").await.unwrap());

        store.create_user(&user("ren", "ren@example.com")).await.unwrap();
        assert!(store.user_exists("ren").await.unwrap());

        let loaded = store.get_user("ren").await.unwrap().unwrap();
        assert_eq!(loaded.email, "ren@example.com");
        assert!(store.get_user("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_email_checks() {
        let store = MemoryStore::new();
        store.create_user(&user("ren", "ren@example.com")).await.unwrap();
        store.create_user(&user("kay", "kay@example.com")).await.unwrap();

        assert!(store.email_exists("ren@example.com").await.unwrap());
        assert!(!store.email_exists("new@example.com").await.unwrap());

        assert!(store
            .email_exists_for_other_user("kay@example.com", "ren")
            .await
            .unwrap());
        assert!(!store
            .email_exists_for_other_user("ren@example.com", "ren")
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_update_user() {
        let store = MemoryStore::new();
        store.create_user(&user("ren", "ren@example.com")).await.unwrap();

        store
            .update_user(
                "ren",
                UserUpdate {
                    email: Some("new@example.com".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let loaded = store.get_user("ren").await.unwrap().unwrap();
        assert_eq!(loaded.email, "new@example.com");
        assert_eq!(loaded.password_hash, "ab12cd34");

        let missing = store
            .update_user("ghost", UserUpdate::default())
            .await
            .unwrap_err();
        assert!(matches!(missing, StoreError::UserNotFound(_)));
    }

    #[tokio::test]
    async fn test_history_newest_first_with_limit() {
        let store = MemoryStore::new();
        for i in 0..25 {
            store.save_history("ren", &entry(i)).await.unwrap();
        }

        let history = store.get_history("ren", 20).await.unwrap();
        assert_eq!(history.len(), 20);
        assert_eq!(history[0].searched_at, Utc.timestamp_opt(1_700_000_024, 0).unwrap());
        for pair in history.windows(2) {
            assert!(pair[0].searched_at >= pair[1].searched_at);
        }

        assert!(store.get_history("nobody", 20).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_history_item() {
        let store = MemoryStore::new();
        let first = entry(1);
        let second = entry(2);
        store.save_history("ren", &first).await.unwrap();
        store.save_history("ren", &second).await.unwrap();

        assert!(store.delete_history_item("ren", first.id).await.unwrap());
        assert!(!store.delete_history_item("ren", first.id).await.unwrap());
        assert!(!store.delete_history_item("nobody", second.id).await.unwrap());

        let history = store.get_history("ren", 20).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].id, second.id);
    }
}
