use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde_json::Value;
use uuid::Uuid;

use crate::normalize;
use crate::options::{Destination, SearchResult};
use crate::rank;
use crate::store::{HistoryEntry, PackageSnapshot, UserStore};
use crate::supplier::{Location, SupplierError, TravelSupplier};
use crate::{CoreError, CoreResult};

/// Parameters of one package search. Location codes are IATA-style
/// three-letter codes; the HTTP layer uppercases them before building this.
#[derive(Debug, Clone)]
pub struct SearchQuery {
    pub origin: String,
    pub destination: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub adults: u32,
}

impl SearchQuery {
    pub fn validate(&self) -> CoreResult<()> {
        validate_code("origin", &self.origin)?;
        validate_code("destination", &self.destination)?;
        if self.adults == 0 {
            return Err(CoreError::ValidationError(
                "At least one adult traveler is required".to_string(),
            ));
        }
        Ok(())
    }
}

fn validate_code(field: &str, code: &str) -> CoreResult<()> {
    if code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(())
    } else {
        Err(CoreError::ValidationError(format!(
            "{} must be a three-letter location code",
            field
        )))
    }
}

fn has_entries(payload: &Value) -> bool {
    payload
        .get("data")
        .and_then(Value::as_array)
        .is_some_and(|data| !data.is_empty())
}

/// Sequences the upstream calls for one search and assembles the result.
///
/// Upstream calls run sequentially per request; the engine itself keeps no
/// per-request state and is shared across requests behind an `Arc`.
pub struct SearchEngine {
    supplier: Arc<dyn TravelSupplier>,
    store: Arc<dyn UserStore>,
    fallback_currency: String,
}

impl SearchEngine {
    pub fn new(
        supplier: Arc<dyn TravelSupplier>,
        store: Arc<dyn UserStore>,
        fallback_currency: String,
    ) -> Self {
        Self {
            supplier,
            store,
            fallback_currency,
        }
    }

    /// Run a full package search. When `username` is set and the search
    /// produced at least one package, the best deal is written to that
    /// user's history.
    pub async fn run_search(
        &self,
        query: &SearchQuery,
        username: Option<&str>,
    ) -> CoreResult<SearchResult> {
        query.validate()?;

        let nights = (query.check_out - query.check_in).num_days();
        tracing::info!(
            "Package search {} -> {} ({} nights, {} adults)",
            query.origin,
            query.destination,
            nights,
            query.adults
        );

        // 1. Flights. A failure here is carried on the result, not fatal.
        let (flights_raw, flight_error) = match self
            .supplier
            .search_flights(
                &query.origin,
                &query.destination,
                query.check_in,
                query.check_out,
                query.adults,
            )
            .await
        {
            Ok(payload) => (payload, None),
            Err(e) => {
                tracing::warn!("Flight search failed: {}", e);
                (Value::Null, Some(e.to_string()))
            }
        };

        // 2. Hotels. A failure means no data.
        let hotels_raw = match self
            .supplier
            .search_hotels(&query.destination, query.check_in, query.check_out, query.adults)
            .await
        {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!("Hotel search failed: {}", e);
                Value::Null
            }
        };

        // 3. Destination descriptor.
        let location = match self.supplier.locate(&query.destination).await {
            Ok(location) => location,
            Err(e) => {
                tracing::debug!("Location lookup failed: {}", e);
                None
            }
        };

        // 4. Activities near the destination.
        let activities_raw = self
            .fetch_activities(&query.destination, location.as_ref())
            .await;

        // 5. Normalize and rank.
        let currency = normalize::destination_currency(&hotels_raw, &self.fallback_currency);
        let flights = normalize::normalize_flights(&flights_raw, &self.fallback_currency);
        let hotels = normalize::normalize_hotels(&hotels_raw, nights, &currency);
        let activities = normalize::normalize_activities(&activities_raw, &self.fallback_currency);
        let packages = rank::build_packages(&flights, &hotels, &activities, &currency);

        let destination = location.map(|location| Destination {
            city: location.city_name,
            country: location.country_code,
            latitude: location.latitude,
            longitude: location.longitude,
        });

        let result = SearchResult {
            flights,
            hotels,
            activities,
            packages,
            duration: nights,
            currency,
            destination,
            flight_error,
        };

        // 6. Remember the best deal for signed-in users.
        if let Some(username) = username {
            if let Some(best) = result.packages.first() {
                let entry = HistoryEntry {
                    id: Uuid::new_v4(),
                    origin: query.origin.clone(),
                    destination: query.destination.clone(),
                    departure_date: query.check_in,
                    return_date: query.check_out,
                    adults: query.adults,
                    best_package: PackageSnapshot::from_package(best),
                    searched_at: Utc::now(),
                };
                self.store.save_history(username, &entry).await?;
                tracing::debug!("Saved history entry {} for {}", entry.id, username);
            }
        }

        Ok(result)
    }

    /// Activities come from the coordinate lookup when the destination has
    /// coordinates; the by-city lookup covers every other case, including a
    /// coordinate result with no entries.
    async fn fetch_activities(&self, city_code: &str, location: Option<&Location>) -> Value {
        let mut payload = Value::Null;

        if let Some(location) = location {
            if let (Some(lat), Some(lon)) = (location.latitude, location.longitude) {
                payload = match self.supplier.activities_by_geo(lat, lon).await {
                    Ok(value) => value,
                    Err(e) => {
                        tracing::debug!("Activity lookup by coordinates failed: {}", e);
                        Value::Null
                    }
                };
            }
        }

        if !has_entries(&payload) {
            payload = match self.supplier.activities_by_city(city_code).await {
                Ok(value) => value,
                Err(e) => {
                    tracing::debug!("Activity lookup by city failed: {}", e);
                    Value::Null
                }
            };
        }

        payload
    }

    /// Credential check against the upstream API, for the health endpoint.
    pub async fn verify_supplier(&self) -> Result<(), SupplierError> {
        self.supplier.verify_auth().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{StoreError, UserRecord, UserUpdate};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Default)]
    struct StubSupplier {
        flights: Option<Value>,
        flight_failure: Option<String>,
        hotels: Option<Value>,
        hotel_failure: bool,
        location: Option<Location>,
        geo_activities: Option<Value>,
        city_activities: Option<Value>,
    }

    #[async_trait]
    impl TravelSupplier for StubSupplier {
        async fn search_flights(
            &self,
            _origin: &str,
            _destination: &str,
            _departure: NaiveDate,
            _return_date: NaiveDate,
            _adults: u32,
        ) -> Result<Value, SupplierError> {
            match &self.flight_failure {
                Some(message) => Err(SupplierError::Api {
                    status: 500,
                    message: message.clone(),
                }),
                None => Ok(self.flights.clone().unwrap_or(Value::Null)),
            }
        }

        async fn search_hotels(
            &self,
            _city_code: &str,
            _check_in: NaiveDate,
            _check_out: NaiveDate,
            _adults: u32,
        ) -> Result<Value, SupplierError> {
            if self.hotel_failure {
                return Err(SupplierError::Transport("connection refused".to_string()));
            }
            Ok(self.hotels.clone().unwrap_or(Value::Null))
        }

        async fn locate(&self, _code: &str) -> Result<Option<Location>, SupplierError> {
            Ok(self.location.clone())
        }

        async fn activities_by_geo(
            &self,
            _latitude: f64,
            _longitude: f64,
        ) -> Result<Value, SupplierError> {
            Ok(self.geo_activities.clone().unwrap_or(Value::Null))
        }

        async fn activities_by_city(&self, _city_code: &str) -> Result<Value, SupplierError> {
            Ok(self.city_activities.clone().unwrap_or(Value::Null))
        }

        async fn verify_auth(&self) -> Result<(), SupplierError> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingStore {
        saved: Mutex<Vec<HistoryEntry>>,
        fail_save: bool,
    }

    #[async_trait]
    impl UserStore for RecordingStore {
        async fn get_user(&self, _username: &str) -> Result<Option<UserRecord>, StoreError> {
            Ok(None)
        }

        async fn create_user(&self, _user: &UserRecord) -> Result<(), StoreError> {
            Ok(())
        }

        async fn user_exists(&self, _username: &str) -> Result<bool, StoreError> {
            Ok(false)
        }

        async fn email_exists(&self, _email: &str) -> Result<bool, StoreError> {
            Ok(false)
        }

        async fn email_exists_for_other_user(
            &self,
            _email: &str,
            _username: &str,
        ) -> Result<bool, StoreError> {
            Ok(false)
        }

        async fn update_user(&self, _username: &str, _update: UserUpdate) -> Result<(), StoreError> {
            Ok(())
        }

        async fn save_history(
            &self,
            _username: &str,
            entry: &HistoryEntry,
        ) -> Result<(), StoreError> {
            if self.fail_save {
                return Err(StoreError::Unavailable("write failed".to_string()));
            }
            self.saved.lock().unwrap().push(entry.clone());
            Ok(())
        }

        async fn get_history(
            &self,
            _username: &str,
            limit: usize,
        ) -> Result<Vec<HistoryEntry>, StoreError> {
            let saved = self.saved.lock().unwrap();
            Ok(saved.iter().rev().take(limit).cloned().collect())
        }

        async fn delete_history_item(
            &self,
            _username: &str,
            _entry_id: Uuid,
        ) -> Result<bool, StoreError> {
            Ok(false)
        }
    }

    fn flight_payload() -> Value {
        json!({"data": [{
            "id": "1",
            "price": {"total": "420.00", "currency": "USD"},
            "validatingAirlineCodes": ["DL"],
            "itineraries": [{"duration": "PT8H", "segments": [{}]}]
        }]})
    }

    fn hotel_payload() -> Value {
        json!({"data": [{
            "hotel": {"hotelId": "H1", "name": "Harbour View"},
            "offers": [{"price": {"total": "500.00", "currency": "EUR"}}]
        }]})
    }

    fn activities_payload(name: &str) -> Value {
        json!({"data": [{
            "id": "A1",
            "name": name,
            "price": {"amount": "30.00", "currencyCode": "EUR"}
        }]})
    }

    fn paris_location() -> Location {
        Location {
            latitude: Some(48.85),
            longitude: Some(2.35),
            city_name: "PARIS".to_string(),
            country_code: "FR".to_string(),
        }
    }

    fn query() -> SearchQuery {
        SearchQuery {
            origin: "JFK".to_string(),
            destination: "PAR".to_string(),
            check_in: NaiveDate::from_ymd_opt(2024, 5, 5).unwrap(),
            check_out: NaiveDate::from_ymd_opt(2024, 5, 10).unwrap(),
            adults: 1,
        }
    }

    fn make_engine(supplier: StubSupplier) -> (SearchEngine, Arc<RecordingStore>) {
        let store = Arc::new(RecordingStore::default());
        let engine = SearchEngine::new(Arc::new(supplier), store.clone(), "USD".to_string());
        (engine, store)
    }

    #[tokio::test]
    async fn test_search_assembles_result_and_saves_history() {
        let supplier = StubSupplier {
            flights: Some(flight_payload()),
            hotels: Some(hotel_payload()),
            location: Some(paris_location()),
            geo_activities: Some(activities_payload("Louvre tour")),
            ..Default::default()
        };
        let (engine, store) = make_engine(supplier);

        let result = engine.run_search(&query(), Some("ren")).await.unwrap();

        assert_eq!(result.duration, 5);
        assert_eq!(result.currency, "EUR");
        assert_eq!(result.flights.len(), 1);
        assert_eq!(result.hotels[0].price_per_night, 100.0);
        assert_eq!(result.packages.len(), 1);
        assert_eq!(result.packages[0].destination_total, 530.0);
        assert_eq!(result.destination.as_ref().unwrap().city, "PARIS");
        assert!(result.flight_error.is_none());

        let saved = store.saved.lock().unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].origin, "JFK");
        assert_eq!(saved[0].adults, 1);
        assert_eq!(saved[0].best_package.hotel.total_price, 500.0);
        assert_eq!(saved[0].best_package.flight.carrier, "Delta Air Lines");
    }

    #[tokio::test]
    async fn test_flight_failure_is_carried_not_fatal() {
        let supplier = StubSupplier {
            flight_failure: Some("upstream unavailable".to_string()),
            hotels: Some(hotel_payload()),
            city_activities: Some(activities_payload("City walk")),
            ..Default::default()
        };
        let (engine, store) = make_engine(supplier);

        let result = engine.run_search(&query(), Some("ren")).await.unwrap();

        assert!(result.flights.is_empty());
        assert!(result.flight_error.as_ref().unwrap().contains("upstream unavailable"));
        assert_eq!(result.hotels.len(), 1);
        assert!(result.packages.is_empty());
        assert!(store.saved.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_hotel_failure_means_no_data() {
        let supplier = StubSupplier {
            flights: Some(flight_payload()),
            hotel_failure: true,
            city_activities: Some(activities_payload("City walk")),
            ..Default::default()
        };
        let (engine, _store) = make_engine(supplier);

        let result = engine.run_search(&query(), None).await.unwrap();

        assert_eq!(result.flights.len(), 1);
        assert!(result.hotels.is_empty());
        assert!(result.packages.is_empty());
        assert!(result.flight_error.is_none());
        assert_eq!(result.currency, "USD");
    }

    #[tokio::test]
    async fn test_activity_fallback_when_geo_lookup_is_empty() {
        let supplier = StubSupplier {
            flights: Some(flight_payload()),
            hotels: Some(hotel_payload()),
            location: Some(paris_location()),
            geo_activities: Some(json!({"data": []})),
            city_activities: Some(activities_payload("City walk")),
            ..Default::default()
        };
        let (engine, _store) = make_engine(supplier);

        let result = engine.run_search(&query(), None).await.unwrap();
        assert_eq!(result.activities[0].name, "City walk");
    }

    #[tokio::test]
    async fn test_activity_fallback_without_coordinates() {
        let supplier = StubSupplier {
            flights: Some(flight_payload()),
            hotels: Some(hotel_payload()),
            location: Some(Location {
                latitude: None,
                longitude: None,
                city_name: "PARIS".to_string(),
                country_code: "FR".to_string(),
            }),
            geo_activities: Some(activities_payload("Never reached")),
            city_activities: Some(activities_payload("City walk")),
            ..Default::default()
        };
        let (engine, _store) = make_engine(supplier);

        let result = engine.run_search(&query(), None).await.unwrap();
        assert_eq!(result.activities[0].name, "City walk");
    }

    #[tokio::test]
    async fn test_anonymous_search_saves_no_history() {
        let supplier = StubSupplier {
            flights: Some(flight_payload()),
            hotels: Some(hotel_payload()),
            ..Default::default()
        };
        let (engine, store) = make_engine(supplier);

        let result = engine.run_search(&query(), None).await.unwrap();
        assert_eq!(result.packages.len(), 1);
        assert!(store.saved.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_store_failure_aborts_search() {
        let supplier = StubSupplier {
            flights: Some(flight_payload()),
            hotels: Some(hotel_payload()),
            ..Default::default()
        };
        let store = Arc::new(RecordingStore {
            fail_save: true,
            ..Default::default()
        });
        let engine = SearchEngine::new(Arc::new(supplier), store, "USD".to_string());

        let err = engine.run_search(&query(), Some("ren")).await.unwrap_err();
        assert!(matches!(err, CoreError::StorageError(_)));
    }

    #[tokio::test]
    async fn test_inverted_dates_flow_through() {
        let supplier = StubSupplier {
            hotels: Some(hotel_payload()),
            ..Default::default()
        };
        let (engine, _store) = make_engine(supplier);

        let mut q = query();
        q.check_in = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();
        q.check_out = NaiveDate::from_ymd_opt(2024, 5, 5).unwrap();

        let result = engine.run_search(&q, None).await.unwrap();
        assert_eq!(result.duration, -5);
        assert_eq!(result.hotels[0].price_per_night, 500.0);
    }

    #[tokio::test]
    async fn test_query_validation() {
        let (engine, _store) = make_engine(StubSupplier::default());

        let mut q = query();
        q.origin = "X".to_string();
        assert!(matches!(
            engine.run_search(&q, None).await.unwrap_err(),
            CoreError::ValidationError(_)
        ));

        let mut q = query();
        q.adults = 0;
        assert!(matches!(
            engine.run_search(&q, None).await.unwrap_err(),
            CoreError::ValidationError(_)
        ));
    }
}
