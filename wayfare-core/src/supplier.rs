use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum SupplierError {
    #[error("Travel API authentication failed: {0}")]
    Auth(String),
    #[error("Travel API unreachable: {0}")]
    Transport(String),
    #[error("Travel API returned {status}: {message}")]
    Api { status: u16, message: String },
    #[error("Malformed travel API response: {0}")]
    Decode(String),
}

/// Geo and civic data for a location code, from the reference-data lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub city_name: String,
    pub country_code: String,
}

/// Client for the upstream travel data API. Each method returns the raw JSON
/// result set; normalization happens downstream so that payload quirks stay
/// in one place.
#[async_trait]
pub trait TravelSupplier: Send + Sync {
    async fn search_flights(
        &self,
        origin: &str,
        destination: &str,
        departure: NaiveDate,
        return_date: NaiveDate,
        adults: u32,
    ) -> Result<Value, SupplierError>;

    async fn search_hotels(
        &self,
        city_code: &str,
        check_in: NaiveDate,
        check_out: NaiveDate,
        adults: u32,
    ) -> Result<Value, SupplierError>;

    /// Resolve a location code to coordinates and city/country names.
    async fn locate(&self, code: &str) -> Result<Option<Location>, SupplierError>;

    async fn activities_by_geo(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<Value, SupplierError>;

    async fn activities_by_city(&self, city_code: &str) -> Result<Value, SupplierError>;

    /// Cheap credential check, used by the health endpoint.
    async fn verify_auth(&self) -> Result<(), SupplierError>;
}
