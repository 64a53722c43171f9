//! Adapters for the fraud engine's ports
//!
//! - `in_memory`: append-only audit store, also serving claimant history
//! - `vendor_api`: blacklist and HTTP vendor risk providers
//! - `weather_api`: OpenWeather-backed weather lookup
//! - `circuit_breaker`: shared fault tolerance for the HTTP adapters

pub mod circuit_breaker;
pub(crate) mod http;
pub mod in_memory;
pub mod vendor_api;
pub mod weather_api;

pub use circuit_breaker::CircuitBreaker;
pub use in_memory::InMemoryAuditStore;
pub use vendor_api::{BlacklistVendorRisk, HttpVendorRisk, HttpVendorRiskConfig};
pub use weather_api::{NullWeatherLookup, OpenWeatherConfig, OpenWeatherLookup};
