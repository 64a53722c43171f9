//! Signal provider ports
//!
//! Each capability the rule checks consult is a narrow async trait. Every
//! call is bounded by a timeout in [`SignalGateway`]; a provider that fails
//! or times out contributes its "unavailable" value (`None`) and the checks
//! that depend on it are skipped.

mod gateway;
mod geo;
mod text;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use core_kernel::{DomainPort, PortError};

pub use gateway::SignalGateway;
pub use geo::GazetteerGeoDistance;
pub use text::KeywordTextAnalyzer;

/// Note words that make an incident weather-sensitive
pub const WEATHER_KEYWORDS: &[&str] = &[
    "accident", "slip", "fall", "storm", "rain", "wet", "flood", "hail", "wind",
];

/// Returns true when lowercased notes mention any weather keyword
pub fn mentions_weather(notes_lower: &str) -> bool {
    WEATHER_KEYWORDS.iter().any(|k| notes_lower.contains(k))
}

/// Output of text analysis over claim notes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextAnalysis {
    pub keyword_count: u32,
    /// Matched suspicious terms, in order of first appearance
    pub suspicious_phrases: Vec<String>,
    /// Lexicon sentiment in [-1, 1]
    pub sentiment: f64,
    /// Highest similarity against the claimant's prior notes, in [0, 1]
    pub max_similarity: f64,
}

/// Fraud assessment of a provider or vendor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VendorAssessment {
    pub is_fraudulent: bool,
    pub risk_score: f64,
    pub reason: String,
}

/// Weather at a location on a date
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub condition: String,
    pub is_rainy: bool,
    /// Celsius
    pub temp: f64,
}

#[async_trait]
pub trait TextAnalyzer: DomainPort {
    /// Analyzes `text`, comparing it against `prior_notes` for similarity
    async fn analyze(&self, text: &str, prior_notes: &[String]) -> Result<TextAnalysis, PortError>;
}

#[async_trait]
pub trait GeoDistance: DomainPort {
    /// Distance in miles, `None` when either address cannot be resolved
    async fn distance(&self, from: &str, to: &str) -> Result<Option<f64>, PortError>;
}

#[async_trait]
pub trait VendorRisk: DomainPort {
    async fn check(&self, provider: &str) -> Result<Option<VendorAssessment>, PortError>;
}

#[async_trait]
pub trait WeatherLookup: DomainPort {
    async fn condition_at(&self, location: &str, date: NaiveDate) -> Result<Option<WeatherReport>, PortError>;
}

/// Which signal a snapshot is missing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    Text,
    Geo,
    Vendor,
    Weather,
}

impl SignalKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalKind::Text => "text",
            SignalKind::Geo => "geo",
            SignalKind::Vendor => "vendor",
            SignalKind::Weather => "weather",
        }
    }
}

/// Signals gathered for one claim
///
/// A `None` field means the provider was not consulted or did not answer in
/// time; `unavailable` records the latter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SignalSnapshot {
    pub text: Option<TextAnalysis>,
    pub distance_miles: Option<f64>,
    pub vendor: Option<VendorAssessment>,
    pub weather: Option<WeatherReport>,
    pub unavailable: Vec<SignalKind>,
}
