use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::options::Package;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),
    #[error("Serialization failed: {0}")]
    Serialization(String),
    #[error("User not found: {0}")]
    UserNotFound(String),
}

/// A registered account as the store persists it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Partial update applied to an existing account.
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub email: Option<String>,
    pub password_hash: Option<String>,
}

/// Condensed flight half of a persisted best package.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlightSummary {
    pub carrier: String,
    pub price: f64,
    pub currency: String,
    pub stops: u32,
}

/// Condensed hotel half of a persisted best package.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HotelSummary {
    pub name: String,
    pub price_per_night: f64,
    pub total_price: f64,
    pub currency: String,
}

/// What a search history entry remembers about its top-ranked package.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageSnapshot {
    pub flight: FlightSummary,
    pub hotel: HotelSummary,
    pub destination_total: f64,
    pub currency: String,
}

impl PackageSnapshot {
    pub fn from_package(package: &Package) -> Self {
        Self {
            flight: FlightSummary {
                carrier: package.flight.carrier_name.clone(),
                price: package.flight.price,
                currency: package.flight.currency.clone(),
                stops: package.flight.stops,
            },
            hotel: HotelSummary {
                name: package.hotel.name.clone(),
                price_per_night: package.hotel.price_per_night,
                total_price: package.hotel.total_price,
                currency: package.hotel.currency.clone(),
            },
            destination_total: package.destination_total,
            currency: package.currency.clone(),
        }
    }
}

/// One completed search by a signed-in user. Written once, never mutated;
/// removed only by an explicit delete.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: Uuid,
    pub origin: String,
    pub destination: String,
    pub departure_date: NaiveDate,
    pub return_date: NaiveDate,
    pub adults: u32,
    pub best_package: PackageSnapshot,
    pub searched_at: DateTime<Utc>,
}

/// Capability set for user accounts and per-user search history.
///
/// Implementations are interchangeable; the search and auth paths only ever
/// see this trait. The store is injected where it is needed, never reached
/// through global state.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn get_user(&self, username: &str) -> Result<Option<UserRecord>, StoreError>;

    async fn create_user(&self, user: &UserRecord) -> Result<(), StoreError>;

    async fn user_exists(&self, username: &str) -> Result<bool, StoreError>;

    async fn email_exists(&self, email: &str) -> Result<bool, StoreError>;

    /// True when `email` belongs to an account other than `username`.
    async fn email_exists_for_other_user(
        &self,
        email: &str,
        username: &str,
    ) -> Result<bool, StoreError>;

    async fn update_user(&self, username: &str, update: UserUpdate) -> Result<(), StoreError>;

    async fn save_history(&self, username: &str, entry: &HistoryEntry) -> Result<(), StoreError>;

    /// Newest-first history, at most `limit` entries.
    async fn get_history(&self, username: &str, limit: usize)
        -> Result<Vec<HistoryEntry>, StoreError>;

    /// Returns true when an entry was actually removed.
    async fn delete_history_item(&self, username: &str, entry_id: Uuid)
        -> Result<bool, StoreError>;
}
