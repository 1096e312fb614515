//! Monitoring backend connection strings.
//!
//! Format: `InstrumentationKey=<key>;IngestionEndpoint=<url>;...`. Keys are
//! case-insensitive and unknown keys are ignored.

use std::str::FromStr;

use url::Url;

pub const DEFAULT_INGESTION_ENDPOINT: &str = "https://dc.services.visualstudio.com/";

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ConnectionStringError {
    #[error("connection string is missing InstrumentationKey")]
    MissingInstrumentationKey,

    #[error("malformed connection string segment: {0}")]
    MalformedSegment(String),

    #[error("invalid IngestionEndpoint: {0}")]
    InvalidEndpoint(#[from] url::ParseError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionString {
    pub instrumentation_key: String,
    pub ingestion_endpoint: Url,
}

impl ConnectionString {
    /// URL envelopes are POSTed to.
    pub fn track_url(&self) -> Result<Url, url::ParseError> {
        self.ingestion_endpoint.join("v2/track")
    }
}

impl FromStr for ConnectionString {
    type Err = ConnectionStringError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut instrumentation_key = None;
        let mut ingestion_endpoint = None;

        for segment in s.split(';').map(str::trim).filter(|seg| !seg.is_empty()) {
            let (key, value) = segment
                .split_once('=')
                .ok_or_else(|| ConnectionStringError::MalformedSegment(segment.to_string()))?;
            let value = value.trim();
            match key.trim().to_ascii_lowercase().as_str() {
                "instrumentationkey" if !value.is_empty() => {
                    instrumentation_key = Some(value.to_string())
                }
                "ingestionendpoint" if !value.is_empty() => {
                    ingestion_endpoint = Some(value.to_string())
                }
                _ => {}
            }
        }

        let instrumentation_key =
            instrumentation_key.ok_or(ConnectionStringError::MissingInstrumentationKey)?;

        // Url::join drops the last path segment unless the base ends with '/'.
        let mut endpoint = ingestion_endpoint.unwrap_or_else(|| DEFAULT_INGESTION_ENDPOINT.to_string());
        if !endpoint.ends_with('/') {
            endpoint.push('/');
        }

        Ok(Self {
            instrumentation_key,
            ingestion_endpoint: Url::parse(&endpoint)?,
        })
    }
}
