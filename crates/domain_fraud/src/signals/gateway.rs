//! Concurrent, time-bounded signal collection

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use core_kernel::PortError;

use super::{
    mentions_weather, GeoDistance, SignalKind, SignalSnapshot, TextAnalyzer, VendorRisk,
    WeatherLookup,
};
use crate::claim::Claim;
use crate::history::ClaimantHistory;

/// Fans out to every signal provider for one claim
///
/// The four providers are queried concurrently. Each one settles on its own
/// at the earlier of its `timeout` and the caller's deadline, so a slow
/// provider never costs the others their answers.
#[derive(Clone)]
pub struct SignalGateway {
    text: Arc<dyn TextAnalyzer>,
    geo: Arc<dyn GeoDistance>,
    vendor: Arc<dyn VendorRisk>,
    weather: Arc<dyn WeatherLookup>,
    timeout: Duration,
}

impl SignalGateway {
    pub fn new(
        text: Arc<dyn TextAnalyzer>,
        geo: Arc<dyn GeoDistance>,
        vendor: Arc<dyn VendorRisk>,
        weather: Arc<dyn WeatherLookup>,
        timeout: Duration,
    ) -> Self {
        Self {
            text,
            geo,
            vendor,
            weather,
            timeout,
        }
    }

    /// Collects signals for `claim`, returning no later than `deadline`
    ///
    /// Providers are skipped when the claim lacks the input they need: no
    /// notes, no location, no provider, or notes with no weather-sensitive
    /// wording.
    pub async fn collect(
        &self,
        claim: &Claim,
        history: &ClaimantHistory,
        default_registered_address: &str,
        deadline: tokio::time::Instant,
    ) -> SignalSnapshot {
        let started = Instant::now();
        let registered = history
            .registered_address
            .as_deref()
            .filter(|a| !a.trim().is_empty())
            .unwrap_or(default_registered_address);
        let incident_date = claim.timestamp.date_naive();
        let wants_weather = !claim.location.is_empty() && mentions_weather(&claim.notes_lower());

        let text = async {
            if claim.notes.is_empty() {
                return Ok(None);
            }
            self.bounded(SignalKind::Text, deadline, async {
                self.text.analyze(&claim.notes, &history.prior_notes).await.map(Some)
            })
            .await
        };
        let geo = async {
            if claim.location.is_empty() {
                return Ok(None);
            }
            self.bounded(SignalKind::Geo, deadline, self.geo.distance(&claim.location, registered))
                .await
        };
        let vendor = async {
            if claim.provider.is_empty() {
                return Ok(None);
            }
            self.bounded(SignalKind::Vendor, deadline, self.vendor.check(&claim.provider))
                .await
        };
        let weather = async {
            if !wants_weather {
                return Ok(None);
            }
            self.bounded(
                SignalKind::Weather,
                deadline,
                self.weather.condition_at(&claim.location, incident_date),
            )
            .await
        };

        let (text, geo, vendor, weather) = futures::join!(text, geo, vendor, weather);

        let mut snapshot = SignalSnapshot::default();
        snapshot.text = settle(text, &mut snapshot.unavailable);
        snapshot.distance_miles = settle(geo, &mut snapshot.unavailable);
        snapshot.vendor = settle(vendor, &mut snapshot.unavailable);
        snapshot.weather = settle(weather, &mut snapshot.unavailable);

        debug!(
            claimant_id = %claim.claimant_id,
            unavailable = snapshot.unavailable.len(),
            duration_ms = started.elapsed().as_millis() as u64,
            "Signals collected"
        );
        snapshot
    }

    async fn bounded<T, F>(
        &self,
        kind: SignalKind,
        deadline: tokio::time::Instant,
        call: F,
    ) -> Result<Option<T>, SignalKind>
    where
        F: Future<Output = Result<Option<T>, PortError>>,
    {
        let own_limit = tokio::time::Instant::now() + self.timeout;
        let limit = own_limit.min(deadline);
        match tokio::time::timeout_at(limit, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(error)) => {
                warn!(
                    signal = kind.as_str(),
                    error = %error,
                    transient = error.is_transient(),
                    "Signal provider failed, continuing without it"
                );
                Err(kind)
            }
            Err(_) => {
                warn!(
                    signal = kind.as_str(),
                    timeout_ms = self.timeout.as_millis() as u64,
                    scoring_deadline = limit < own_limit,
                    "Signal provider timed out, continuing without it"
                );
                Err(kind)
            }
        }
    }
}

fn settle<T>(outcome: Result<Option<T>, SignalKind>, unavailable: &mut Vec<SignalKind>) -> Option<T> {
    match outcome {
        Ok(value) => value,
        Err(kind) => {
            unavailable.push(kind);
            None
        }
    }
}
