use std::collections::HashSet;

use serde_json::Value;

use crate::carriers;
use crate::options::{ActivityOption, FlightOption, HotelOption};

/// Upper bound on each option list.
pub const MAX_OPTIONS: usize = 10;

fn entries(raw: &Value) -> &[Value] {
    raw.get("data")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn get_str(val: &Value, key: &str) -> Option<String> {
    val.get(key).and_then(Value::as_str).map(String::from)
}

/// Upstream price fields arrive as JSON strings ("635.12"); accept plain
/// numbers too.
fn get_num(val: &Value, key: &str) -> Option<f64> {
    match val.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

/// Dedup keys carry prices as integer cents; f64 has no total equality.
fn cents(price: f64) -> i64 {
    (price * 100.0).round() as i64
}

fn flight_option(entry: &Value, fallback_currency: &str) -> FlightOption {
    let price = entry
        .get("price")
        .and_then(|p| get_num(p, "total"))
        .unwrap_or(0.0);
    let currency = entry
        .get("price")
        .and_then(|p| get_str(p, "currency"))
        .unwrap_or_else(|| fallback_currency.to_string());

    let carrier_code = entry
        .get("validatingAirlineCodes")
        .and_then(Value::as_array)
        .and_then(|codes| codes.first())
        .and_then(Value::as_str)
        .unwrap_or("N/A")
        .to_string();

    let itinerary = entry
        .get("itineraries")
        .and_then(Value::as_array)
        .and_then(|itineraries| itineraries.first());
    let duration = itinerary
        .and_then(|i| get_str(i, "duration"))
        .unwrap_or_else(|| "N/A".to_string());
    let stops = itinerary
        .and_then(|i| i.get("segments"))
        .and_then(Value::as_array)
        .map(|segments| segments.len().saturating_sub(1) as u32)
        .unwrap_or(0);

    FlightOption {
        id: get_str(entry, "id").unwrap_or_default(),
        price,
        currency,
        carrier_name: carriers::display_name(&carrier_code).to_string(),
        carrier_code,
        duration,
        stops,
        details: entry.clone(),
    }
}

/// Turn a raw flight-offers payload into at most 10 deduplicated options.
/// Only the first 10 raw entries are considered; duplicates inside that
/// window (same carrier, price and stop count) collapse to the first one.
pub fn normalize_flights(raw: &Value, fallback_currency: &str) -> Vec<FlightOption> {
    let mut seen = HashSet::new();
    let mut options = Vec::new();

    for entry in entries(raw).iter().take(MAX_OPTIONS) {
        let option = flight_option(entry, fallback_currency);
        let key = (option.carrier_code.clone(), cents(option.price), option.stops);
        if seen.insert(key) {
            options.push(option);
        }
    }

    options
}

/// Turn a raw hotel-offers payload into at most 10 deduplicated options.
/// The scan window is the first 10 raw entries; rows without any offer are
/// skipped but still consume a slot in the window.
pub fn normalize_hotels(raw: &Value, nights: i64, currency: &str) -> Vec<HotelOption> {
    let mut seen = HashSet::new();
    let mut options = Vec::new();

    for entry in entries(raw).iter().take(MAX_OPTIONS) {
        let offer = match entry
            .get("offers")
            .and_then(Value::as_array)
            .and_then(|offers| offers.first())
        {
            Some(offer) => offer,
            None => continue,
        };

        let hotel = entry.get("hotel");
        let name = hotel
            .and_then(|h| get_str(h, "name"))
            .unwrap_or_else(|| "Unknown Hotel".to_string());
        let total_price = offer
            .get("price")
            .and_then(|p| get_num(p, "total"))
            .unwrap_or(0.0);
        let offer_currency = offer
            .get("price")
            .and_then(|p| get_str(p, "currency"))
            .unwrap_or_else(|| currency.to_string());
        let price_per_night = if nights > 0 {
            total_price / nights as f64
        } else {
            total_price
        };

        let key = (name.clone(), cents(total_price));
        if seen.insert(key) {
            options.push(HotelOption {
                id: hotel.and_then(|h| get_str(h, "hotelId")).unwrap_or_default(),
                name,
                price_per_night,
                total_price,
                currency: offer_currency,
                details: entry.clone(),
            });
        }
    }

    options
}

/// Turn a raw activities payload into at most 10 options. No deduplication;
/// activities keep their own reported currency rather than the destination
/// currency.
pub fn normalize_activities(raw: &Value, fallback_currency: &str) -> Vec<ActivityOption> {
    entries(raw)
        .iter()
        .take(MAX_OPTIONS)
        .map(|entry| {
            let price = entry.get("price");
            ActivityOption {
                id: get_str(entry, "id").unwrap_or_default(),
                name: get_str(entry, "name").unwrap_or_else(|| "Unknown Activity".to_string()),
                price: price.and_then(|p| get_num(p, "amount")).unwrap_or(0.0),
                currency: price
                    .and_then(|p| get_str(p, "currencyCode"))
                    .unwrap_or_else(|| fallback_currency.to_string()),
                activity_type: get_str(entry, "type").unwrap_or_else(|| "activity".to_string()),
                description: get_str(entry, "shortDescription")
                    .unwrap_or_else(|| "No description available".to_string()),
                details: entry.clone(),
            }
        })
        .collect()
}

/// Destination currency comes from the first hotel entry's first offer;
/// everything destination-side is assumed to be quoted in it.
pub fn destination_currency(raw_hotels: &Value, fallback: &str) -> String {
    entries(raw_hotels)
        .first()
        .and_then(|entry| entry.get("offers"))
        .and_then(Value::as_array)
        .and_then(|offers| offers.first())
        .and_then(|offer| offer.get("price"))
        .and_then(|price| get_str(price, "currency"))
        .unwrap_or_else(|| fallback.to_string())
}
