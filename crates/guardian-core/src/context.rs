//! Execution Context: read-only settings shared by every stage of a run
use crate::config::{PipelineConfig, StageDefaults};

#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionContext {
    pub defaults: StageDefaults,
    pub bridge_radius_km: f64,
}

impl ExecutionContext {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            defaults: config.defaults.clone(),
            bridge_radius_km: config.bridge_radius_km,
        }
    }
}

impl Default for ExecutionContext {
    fn default() -> Self {
        Self::new(&PipelineConfig::default())
    }
}
