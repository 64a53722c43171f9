//! Vendor risk providers
//!
//! [`BlacklistVendorRisk`] answers from the configured blacklist alone.
//! [`HttpVendorRisk`] queries an external vendor screening service and
//! answers from the blacklist whenever that service is unreachable or its
//! circuit is open.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::warn;

use core_kernel::{CircuitBreakerConfig, DomainPort, PortError};

use super::circuit_breaker::CircuitBreaker;
use super::http::{map_status, map_transport_error};
use crate::signals::{VendorAssessment, VendorRisk};

const SERVICE: &str = "vendor_api";

/// Risk score assigned to blacklisted providers
pub const BLACKLIST_RISK_SCORE: f64 = 0.95;

#[derive(Debug, Clone)]
pub struct BlacklistVendorRisk {
    blacklist: Vec<String>,
}

impl BlacklistVendorRisk {
    pub fn new(blacklist: Vec<String>) -> Self {
        Self {
            blacklist: blacklist
                .into_iter()
                .map(|e| e.trim().to_lowercase())
                .filter(|e| !e.is_empty())
                .collect(),
        }
    }

    pub fn assess(&self, provider: &str) -> VendorAssessment {
        let provider = provider.to_lowercase();
        if self.blacklist.iter().any(|entry| provider.contains(entry.as_str())) {
            VendorAssessment {
                is_fraudulent: true,
                risk_score: BLACKLIST_RISK_SCORE,
                reason: "Internal blacklist".to_string(),
            }
        } else {
            VendorAssessment {
                is_fraudulent: false,
                risk_score: 0.0,
                reason: "No adverse records".to_string(),
            }
        }
    }
}

impl DomainPort for BlacklistVendorRisk {}

#[async_trait]
impl VendorRisk for BlacklistVendorRisk {
    async fn check(&self, provider: &str) -> Result<Option<VendorAssessment>, PortError> {
        Ok(Some(self.assess(provider)))
    }
}

#[derive(Debug, Clone)]
pub struct HttpVendorRiskConfig {
    /// e.g. "https://vendors.example.com/api"; requests go to `{base_url}/check`
    pub base_url: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
    pub circuit_breaker: CircuitBreakerConfig,
}

#[derive(Debug, Deserialize)]
struct VendorCheckResponse {
    #[serde(default)]
    is_fraudulent: bool,
    #[serde(default)]
    risk_score: f64,
    #[serde(default)]
    reason: Option<String>,
}

pub struct HttpVendorRisk {
    client: reqwest::Client,
    config: HttpVendorRiskConfig,
    fallback: BlacklistVendorRisk,
    breaker: CircuitBreaker,
}

impl HttpVendorRisk {
    pub fn new(config: HttpVendorRiskConfig, fallback: BlacklistVendorRisk) -> Result<Self, PortError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| PortError::internal(format!("{SERVICE}: client build failed: {e}")))?;
        let breaker = CircuitBreaker::new(SERVICE, config.circuit_breaker.clone());
        Ok(Self {
            client,
            config,
            fallback,
            breaker,
        })
    }

    async fn fetch(&self, provider: &str) -> Result<VendorAssessment, PortError> {
        let url = format!("{}/check", self.config.base_url.trim_end_matches('/'));
        let mut request = self.client.get(&url).query(&[("vendor", provider)]);
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let timeout_ms = self.config.timeout.as_millis() as u64;
        let response = request
            .send()
            .await
            .map_err(|e| map_transport_error(SERVICE, e, timeout_ms))?;
        let status = response.status();
        if !status.is_success() {
            return Err(map_status(SERVICE, status));
        }
        let body: VendorCheckResponse = response
            .json()
            .await
            .map_err(|e| map_transport_error(SERVICE, e, timeout_ms))?;

        Ok(VendorAssessment {
            is_fraudulent: body.is_fraudulent,
            risk_score: body.risk_score.clamp(0.0, 1.0),
            reason: body.reason.unwrap_or_default(),
        })
    }
}

impl DomainPort for HttpVendorRisk {}

#[async_trait]
impl VendorRisk for HttpVendorRisk {
    async fn check(&self, provider: &str) -> Result<Option<VendorAssessment>, PortError> {
        if !self.breaker.is_available().await {
            return Ok(Some(self.fallback.assess(provider)));
        }

        match self.fetch(provider).await {
            Ok(assessment) => {
                self.breaker.record_success();
                Ok(Some(assessment))
            }
            Err(error) => {
                if error.is_transient() {
                    self.breaker.record_failure().await;
                }
                warn!(provider, error = %error, "Vendor API failed, using internal blacklist");
                Ok(Some(self.fallback.assess(provider)))
            }
        }
    }
}
