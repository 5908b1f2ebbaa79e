use crate::options::{ActivityOption, FlightOption, HotelOption, Package};

/// Upper bound on the ranked package list.
pub const MAX_PACKAGES: usize = 5;

/// How many flights and hotels enter the cross product.
const TOP_FLIGHTS: usize = 3;
const TOP_HOTELS: usize = 3;

/// How many activities contribute to the representative destination cost.
const ACTIVITY_SAMPLE: usize = 5;

/// Pair the top flights with the top hotels and rank the combinations.
///
/// The ranking key is the hotel's total price alone; the flight price is
/// carried on the package but does not participate in ordering, and the
/// activity sample is a constant added to every candidate. Ties keep the
/// cross-product enumeration order (flights outer, hotels inner).
pub fn build_packages(
    flights: &[FlightOption],
    hotels: &[HotelOption],
    activities: &[ActivityOption],
    currency: &str,
) -> Vec<Package> {
    if flights.is_empty() || hotels.is_empty() {
        return Vec::new();
    }

    let activity_cost: f64 = activities
        .iter()
        .take(ACTIVITY_SAMPLE)
        .map(|a| a.price)
        .sum();

    let mut packages = Vec::new();
    for flight in flights.iter().take(TOP_FLIGHTS) {
        for hotel in hotels.iter().take(TOP_HOTELS) {
            packages.push(Package {
                flight: flight.clone(),
                hotel: hotel.clone(),
                destination_total: hotel.total_price + activity_cost,
                currency: currency.to_string(),
            });
        }
    }

    packages.sort_by(|a, b| a.hotel.total_price.total_cmp(&b.hotel.total_price));
    packages.truncate(MAX_PACKAGES);
    packages
}
