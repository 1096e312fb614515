//! Instrumented outbound HTTP client.
//!
//! Applies the same interception as the service middleware to calls a
//! process makes: before/after events, a dependency span, and a
//! `traceparent` header so the callee joins the caller's trace.

use std::time::Instant;

use axum::http::{Method, StatusCode};
use chrono::Utc;
use url::Url;

use crate::observability::tracing::{TraceContext, TRACEPARENT};
use crate::telemetry::snapshot::{form_pairs, RequestSnapshot, ResponseSnapshot};
use crate::telemetry::{DependencySpan, TelemetryClient};

/// What a GET returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResponse {
    pub url: String,
    pub status: StatusCode,
    pub body: String,
}

#[derive(Clone)]
pub struct InstrumentedClient {
    http: reqwest::Client,
    telemetry: TelemetryClient,
}

impl InstrumentedClient {
    /// No request timeout is set; a hung server blocks the caller.
    pub fn new(telemetry: TelemetryClient) -> Self {
        Self {
            http: reqwest::Client::new(),
            telemetry,
        }
    }

    pub fn telemetry(&self) -> &TelemetryClient {
        &self.telemetry
    }

    /// Issue one GET. Transport errors are recorded, then returned to the caller.
    pub async fn get(&self, url: &Url) -> Result<ProbeResponse, reqwest::Error> {
        let trace = TraceContext::new_root();
        let snapshot = RequestSnapshot::new(Method::GET.as_str(), url.as_str())
            .with_values(url.query().map(|q| form_pairs(q.as_bytes())).unwrap_or_default());
        self.telemetry.on_before_request(&snapshot, Some(&trace));

        let started_at = Utc::now();
        let start = Instant::now();
        let result = self
            .http
            .get(url.clone())
            .header(TRACEPARENT, trace.to_traceparent())
            .send()
            .await;

        let outcome = match result {
            Ok(response) => {
                let status = response.status();
                response.text().await.map(|body| (status, body))
            }
            Err(e) => Err(e),
        };

        let mut dependency = DependencySpan {
            trace: trace.clone(),
            name: format!("GET {}", url.path()),
            target: target_of(url),
            url: url.to_string(),
            started_at,
            duration: start.elapsed(),
            result_code: None,
            properties: self.telemetry.identity().base_dimensions(),
        };

        match outcome {
            Ok((status, body)) => {
                let response = ResponseSnapshot::new(status, body.clone());
                self.telemetry
                    .on_after_response(&snapshot, &response, Some(&trace));
                dependency.result_code = Some(status.as_u16());
                self.telemetry.track(dependency);

                Ok(ProbeResponse {
                    url: url.to_string(),
                    status,
                    body,
                })
            }
            Err(e) => {
                dependency.properties.insert("error", e.to_string());
                self.telemetry.track(dependency);
                Err(e)
            }
        }
    }
}

fn target_of(url: &Url) -> String {
    match (url.host_str(), url.port_or_known_default()) {
        (Some(host), Some(port)) => format!("{}:{}", host, port),
        (Some(host), None) => host.to_string(),
        _ => url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_of() {
        let url = Url::parse("http://localhost:5000/api/v1/status").unwrap();
        assert_eq!(target_of(&url), "localhost:5000");

        let url = Url::parse("https://health.example.com/api/v1/status").unwrap();
        assert_eq!(target_of(&url), "health.example.com:443");
    }
}
