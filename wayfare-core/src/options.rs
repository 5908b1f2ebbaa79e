use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One flight candidate extracted from the upstream flight-offers payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlightOption {
    pub id: String,
    /// Round-trip total in the carrier's billing currency.
    pub price: f64,
    pub currency: String,
    pub carrier_code: String,
    pub carrier_name: String,
    /// Opaque ISO-8601 duration string as reported upstream (e.g. "PT11H30M").
    pub duration: String,
    pub stops: u32,
    /// Raw upstream entry, passed through for detail views.
    pub details: Value,
}

/// One hotel candidate with the price of its cheapest returned offer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HotelOption {
    pub id: String,
    pub name: String,
    pub price_per_night: f64,
    pub total_price: f64,
    pub currency: String,
    pub details: Value,
}

/// A point of interest or bookable activity near the destination.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityOption {
    pub id: String,
    pub name: String,
    pub price: f64,
    pub currency: String,
    #[serde(rename = "type")]
    pub activity_type: String,
    pub description: String,
    pub details: Value,
}

/// A flight/hotel pairing with the aggregated destination-side cost.
///
/// The flight price stays separate from `destination_total`: flights bill in
/// the origin currency, hotels and activities in the destination currency.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Package {
    pub flight: FlightOption,
    pub hotel: HotelOption,
    /// Hotel total plus a representative activity cost.
    pub destination_total: f64,
    pub currency: String,
}

/// Destination descriptor from the location-lookup service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Destination {
    pub city: String,
    pub country: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Everything a single package search produces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub flights: Vec<FlightOption>,
    pub hotels: Vec<HotelOption>,
    pub activities: Vec<ActivityOption>,
    pub packages: Vec<Package>,
    /// Stay length in nights. May be zero or negative when the caller
    /// supplied inverted dates; downstream math handles that.
    pub duration: i64,
    /// Destination currency resolved from the first hotel offer.
    pub currency: String,
    pub destination: Option<Destination>,
    /// Populated when the flight service failed; the rest of the search
    /// still completes.
    pub flight_error: Option<String>,
}
