use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::Mutex;

use wayfare_core::supplier::{Location, SupplierError, TravelSupplier};

/// The offers lookup rejects oversized id lists; 50 is plenty for a search.
const HOTEL_ID_LIMIT: usize = 50;
const ACTIVITY_RADIUS_KM: u32 = 20;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    1800
}

struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

/// Client for the Amadeus self-service REST API.
///
/// Holds one OAuth2 token at a time and refreshes it lazily when a request
/// finds it expired. Safe to share behind an `Arc`; the token cache is the
/// only mutable state.
pub struct AmadeusClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    api_secret: String,
    token: Mutex<Option<CachedToken>>,
}

impl AmadeusClient {
    pub fn new(base_url: &str, api_key: &str, api_secret: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            api_secret: api_secret.to_string(),
            token: Mutex::new(None),
        }
    }

    async fn access_token(&self) -> Result<String, SupplierError> {
        let mut guard = self.token.lock().await;
        if let Some(cached) = guard.as_ref() {
            if cached.expires_at > Instant::now() {
                return Ok(cached.access_token.clone());
            }
        }

        let url = format!("{}/v1/security/oauth2/token", self.base_url);
        let params = [
            ("grant_type", "client_credentials"),
            ("client_id", self.api_key.as_str()),
            ("client_secret", self.api_secret.as_str()),
        ];

        let response = self
            .http
            .post(&url)
            .form(&params)
            .send()
            .await
            .map_err(|e| SupplierError::Transport(e.to_string()))?;
        if !response.status().is_success() {
            return Err(SupplierError::Auth(format!(
                "token request failed with status {}",
                response.status()
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| SupplierError::Decode(e.to_string()))?;
        tracing::debug!("Fetched new access token, valid for {}s", token.expires_in);

        let access_token = token.access_token;
        *guard = Some(CachedToken {
            access_token: access_token.clone(),
            expires_at: Instant::now() + Duration::from_secs(token.expires_in),
        });
        Ok(access_token)
    }

    async fn get_json(&self, path: &str, params: &[(&str, String)]) -> Result<Value, SupplierError> {
        let token = self.access_token().await?;
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .http
            .get(&url)
            .bearer_auth(token)
            .query(params)
            .send()
            .await
            .map_err(|e| SupplierError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SupplierError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json()
            .await
            .map_err(|e| SupplierError::Decode(e.to_string()))
    }
}

fn hotel_ids(payload: &Value) -> Vec<String> {
    payload
        .get("data")
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .take(HOTEL_ID_LIMIT)
                .filter_map(|entry| entry.get("hotelId").and_then(Value::as_str))
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

#[async_trait]
impl TravelSupplier for AmadeusClient {
    async fn search_flights(
        &self,
        origin: &str,
        destination: &str,
        departure: NaiveDate,
        return_date: NaiveDate,
        adults: u32,
    ) -> Result<Value, SupplierError> {
        let params = [
            ("originLocationCode", origin.to_string()),
            ("destinationLocationCode", destination.to_string()),
            ("departureDate", departure.format("%Y-%m-%d").to_string()),
            ("returnDate", return_date.format("%Y-%m-%d").to_string()),
            ("adults", adults.to_string()),
            ("max", "10".to_string()),
        ];
        self.get_json("/v2/shopping/flight-offers", &params).await
    }

    async fn search_hotels(
        &self,
        city_code: &str,
        check_in: NaiveDate,
        check_out: NaiveDate,
        adults: u32,
    ) -> Result<Value, SupplierError> {
        // Step 1: hotel ids serving the city
        let listing = self
            .get_json(
                "/v1/reference-data/locations/hotels/by-city",
                &[("cityCode", city_code.to_string())],
            )
            .await?;

        let ids = hotel_ids(&listing);
        if ids.is_empty() {
            return Ok(serde_json::json!({ "data": [] }));
        }

        // Step 2: offers for those ids
        let params = [
            ("hotelIds", ids.join(",")),
            ("checkInDate", check_in.format("%Y-%m-%d").to_string()),
            ("checkOutDate", check_out.format("%Y-%m-%d").to_string()),
            ("adults", adults.to_string()),
        ];
        self.get_json("/v3/shopping/hotel-offers", &params).await
    }

    async fn locate(&self, code: &str) -> Result<Option<Location>, SupplierError> {
        let params = [
            ("subType", "AIRPORT,CITY".to_string()),
            ("keyword", code.to_string()),
            ("page[limit]", "1".to_string()),
        ];
        let payload = self.get_json("/v1/reference-data/locations", &params).await?;

        let entry = payload
            .get("data")
            .and_then(Value::as_array)
            .and_then(|entries| entries.first());
        Ok(entry.map(|entry| Location {
            latitude: entry["geoCode"]["latitude"].as_f64(),
            longitude: entry["geoCode"]["longitude"].as_f64(),
            city_name: entry["address"]["cityName"].as_str().unwrap_or_default().to_string(),
            country_code: entry["address"]["countryCode"].as_str().unwrap_or_default().to_string(),
        }))
    }

    async fn activities_by_geo(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<Value, SupplierError> {
        let params = [
            ("latitude", latitude.to_string()),
            ("longitude", longitude.to_string()),
            ("radius", ACTIVITY_RADIUS_KM.to_string()),
        ];
        self.get_json("/v1/shopping/activities", &params).await
    }

    async fn activities_by_city(&self, city_code: &str) -> Result<Value, SupplierError> {
        let params = [("cityCode", city_code.to_string())];
        self.get_json("/v1/shopping/activities", &params).await
    }

    async fn verify_auth(&self) -> Result<(), SupplierError> {
        self.access_token().await.map(|_| ())
    }
}
