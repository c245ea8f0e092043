//! Guardian Core: run state, stage contract and runner
//!
//! A run is a fixed sequence of stages. Each stage reads the accumulated
//! [`RunState`], contributes the findings group it owns and gets exactly one
//! execution-log entry. Failures are recorded, never propagated: the runner
//! always returns a state.

pub mod clearance;
pub mod config;
pub mod context;
pub mod data_model;
pub mod error;
pub mod response;
pub mod risk;
pub mod runner;
pub mod stage;

pub use clearance::{format_feet_inches, parse_maxheight, ClearanceStatus};
pub use config::{PipelineConfig, StageDefaults};
pub use context::ExecutionContext;
pub use data_model::{
    Bridge, BridgeFindings, BridgeRisk, Coordinates, ExecutionLog, ImageInput, LocationFindings,
    LogEntry, LookupSource, MeasurementFindings, Place, RecommendationFindings, RiskFindings,
    RoofEquipment, RunInput, RunReport, RunState, VehicleSpecs, VisionFindings, VisualDetection,
    WeatherConditions, WeatherFindings,
};
pub use error::GuardianError;
pub use response::{parse_response, ResponseSchema};
pub use risk::{BridgeVerdict, RiskLevel, SafetyGrade};
pub use runner::{run_stage, PipelineRunner};
pub use stage::{Stage, StageError, StageOutput, StagePatch};
