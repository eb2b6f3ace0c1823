//! Network diagnostics for failed auth calls.
//!
//! Probes the server's health endpoint, derives a rough connection class from
//! the measured round trip, and turns the findings into user-facing advice.
//! Probes are never retried.

use actsfile::messages::routes;
use reqwest::Method;
use serde::Serialize;
use std::time::Instant;

use crate::api_client::ApiClient;

/// Endpoint responses slower than this earn a "be patient" hint
pub const SLOW_RESPONSE_MS: u64 = 5000;

/// Result of a single endpoint probe
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointProbe {
    pub success: bool,
    pub status: Option<u16>,
    pub elapsed_ms: u64,
    pub error: Option<String>,
}

/// Connection class, using the Network Information API names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EffectiveType {
    #[serde(rename = "slow-2g")]
    Slow2g,
    #[serde(rename = "2g")]
    TwoG,
    #[serde(rename = "3g")]
    ThreeG,
    #[serde(rename = "4g")]
    FourG,
}

impl EffectiveType {
    /// Classify a round-trip time with the Network Information API thresholds
    pub fn from_rtt_ms(rtt_ms: u64) -> Self {
        match rtt_ms {
            2000.. => EffectiveType::Slow2g,
            1400.. => EffectiveType::TwoG,
            270.. => EffectiveType::ThreeG,
            _ => EffectiveType::FourG,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EffectiveType::Slow2g => "slow-2g",
            EffectiveType::TwoG => "2g",
            EffectiveType::ThreeG => "3g",
            EffectiveType::FourG => "4g",
        }
    }

    pub fn is_slow(&self) -> bool {
        matches!(self, EffectiveType::Slow2g | EffectiveType::TwoG)
    }
}

/// What is known about the link to the server
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionInfo {
    pub online: bool,
    pub rtt_ms: Option<u64>,
    pub effective_type: Option<EffectiveType>,
}

impl ConnectionInfo {
    /// Derive link metadata from a probe; RTT is only known if the server answered
    pub fn from_probe(online: bool, probe: &EndpointProbe) -> Self {
        let rtt_ms = probe.status.map(|_| probe.elapsed_ms);
        Self {
            online,
            rtt_ms,
            effective_type: rtt_ms.map(EffectiveType::from_rtt_ms),
        }
    }
}

/// Full diagnosis, recomputed on every call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkDiagnosis {
    pub connectivity: bool,
    pub api_health: bool,
    pub connection: ConnectionInfo,
    pub endpoint: EndpointProbe,
    pub recommendations: Vec<String>,
}

/// Probes for the auth server
#[derive(Debug, Clone)]
pub struct NetworkDiagnostics {
    api: ApiClient,
}

impl NetworkDiagnostics {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// `HEAD /health`; any failure counts as offline
    pub async fn check_connectivity(&self) -> bool {
        match self.api.probe(Method::HEAD, &self.api.url(routes::HEALTH)).await {
            Ok(status) => (200..300).contains(&status),
            Err(e) => {
                log::debug!("Connectivity probe failed: {}", e);
                false
            }
        }
    }

    /// `GET url`, timed
    pub async fn test_endpoint(&self, url: &str) -> EndpointProbe {
        let started = Instant::now();
        let result = self.api.probe(Method::GET, url).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match result {
            Ok(status) => EndpointProbe {
                success: (200..300).contains(&status),
                status: Some(status),
                elapsed_ms,
                error: None,
            },
            Err(e) => EndpointProbe {
                success: false,
                status: None,
                elapsed_ms,
                error: Some(e.to_string()),
            },
        }
    }

    /// Run both probes and derive recommendations
    pub async fn diagnose(&self) -> NetworkDiagnosis {
        let connectivity = self.check_connectivity().await;
        let endpoint = self.test_endpoint(&self.api.url(routes::HEALTH)).await;
        let connection = ConnectionInfo::from_probe(connectivity, &endpoint);
        let recommendations = recommendations(connectivity, &endpoint, &connection);

        log::info!(
            "Diagnosis: connectivity={} api_health={} rtt={:?}",
            connectivity,
            endpoint.success,
            connection.rtt_ms
        );

        NetworkDiagnosis {
            connectivity,
            api_health: endpoint.success,
            connection,
            endpoint,
            recommendations,
        }
    }
}

/// Advice for a set of findings, in fixed order
pub fn recommendations(
    connectivity: bool,
    endpoint: &EndpointProbe,
    connection: &ConnectionInfo,
) -> Vec<String> {
    let mut advice = Vec::new();

    if !connectivity {
        advice.push("Check your internet connection".to_string());
        advice.push("Try refreshing the page".to_string());
    }

    if !endpoint.success {
        advice.push("Server may be temporarily unavailable".to_string());
        advice.push("Try again in a few moments".to_string());
    }

    if connection.effective_type.is_some_and(|t| t.is_slow()) {
        advice.push("Your connection appears slow - this may cause timeouts".to_string());
    }

    if endpoint.elapsed_ms > SLOW_RESPONSE_MS {
        advice.push("Server response is slow - please be patient".to_string());
    }

    advice
}

#[cfg(test)]
mod tests {
    use super::*;

    fn probe(success: bool, status: Option<u16>, elapsed_ms: u64) -> EndpointProbe {
        EndpointProbe {
            success,
            status,
            elapsed_ms,
            error: None,
        }
    }

    #[test]
    fn test_effective_type_thresholds() {
        assert_eq!(EffectiveType::from_rtt_ms(50), EffectiveType::FourG);
        assert_eq!(EffectiveType::from_rtt_ms(270), EffectiveType::ThreeG);
        assert_eq!(EffectiveType::from_rtt_ms(1399), EffectiveType::ThreeG);
        assert_eq!(EffectiveType::from_rtt_ms(1400), EffectiveType::TwoG);
        assert_eq!(EffectiveType::from_rtt_ms(2500), EffectiveType::Slow2g);
        assert_eq!(EffectiveType::Slow2g.as_str(), "slow-2g");
    }

    #[test]
    fn test_healthy_fast_link_has_no_advice() {
        let endpoint = probe(true, Some(200), 30);
        let connection = ConnectionInfo::from_probe(true, &endpoint);
        assert!(recommendations(true, &endpoint, &connection).is_empty());
    }

    #[test]
    fn test_offline_advice_comes_first() {
        let endpoint = probe(false, None, 12);
        let connection = ConnectionInfo::from_probe(false, &endpoint);
        assert_eq!(connection.effective_type, None);

        assert_eq!(
            recommendations(false, &endpoint, &connection),
            vec![
                "Check your internet connection",
                "Try refreshing the page",
                "Server may be temporarily unavailable",
                "Try again in a few moments",
            ]
        );
    }

    #[test]
    fn test_slow_link_and_slow_server() {
        let endpoint = probe(true, Some(200), 6000);
        let connection = ConnectionInfo::from_probe(true, &endpoint);
        assert_eq!(connection.effective_type, Some(EffectiveType::Slow2g));

        assert_eq!(
            recommendations(true, &endpoint, &connection),
            vec![
                "Your connection appears slow - this may cause timeouts",
                "Server response is slow - please be patient",
            ]
        );
    }

    #[test]
    fn test_unhealthy_server_reply() {
        let endpoint = probe(false, Some(500), 80);
        let connection = ConnectionInfo::from_probe(true, &endpoint);
        let advice = recommendations(true, &endpoint, &connection);
        assert_eq!(advice[0], "Server may be temporarily unavailable");
        assert_eq!(advice.len(), 2);
    }
}
