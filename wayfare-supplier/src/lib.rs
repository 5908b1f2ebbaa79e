pub mod amadeus;

pub use amadeus::AmadeusClient;
