//! Per-process application identity.

use crate::telemetry::event::{dimensions, CustomDimensions};

/// Default environment label when none is configured.
pub const DEFAULT_ENVIRONMENT: &str = "Development";

/// Identity attached to every telemetry item a process produces.
///
/// Built once at startup from configuration and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationIdentity {
    application_name: String,
    environment: String,
}

impl ApplicationIdentity {
    pub fn new(application_name: impl Into<String>, environment: impl Into<String>) -> Self {
        Self {
            application_name: application_name.into(),
            environment: environment.into(),
        }
    }

    pub fn application_name(&self) -> &str {
        &self.application_name
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    /// The identifying fields every event starts from.
    pub fn base_dimensions(&self) -> CustomDimensions {
        let mut dims = CustomDimensions::new();
        dims.insert(dimensions::APPLICATION_NAME, self.application_name.clone());
        dims.insert(dimensions::ENVIRONMENT, self.environment.clone());
        dims
    }
}
