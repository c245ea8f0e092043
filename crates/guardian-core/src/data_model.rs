//! Data Model: run inputs, per-stage findings, execution log
//!
//! Every findings group is owned by exactly one stage. Groups start out
//! empty (all fields `None`) and are replaced wholesale when their stage
//! completes, see [`crate::stage::StagePatch`].
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::risk::{BridgeVerdict, RiskLevel};

/// Media type assumed when the caller does not supply one.
pub const DEFAULT_MEDIA_TYPE: &str = "image/jpeg";

// ============================================================================
// INPUT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageInput {
    /// Base64-encoded image bytes
    pub data: String,
    /// MIME type (ex: "image/png")
    pub media_type: String,
}

impl ImageInput {
    pub fn new(data: impl Into<String>, media_type: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            media_type: media_type.into(),
        }
    }

    /// Encode raw image bytes.
    pub fn from_bytes(bytes: &[u8], media_type: Option<&str>) -> Self {
        Self {
            data: base64::engine::general_purpose::STANDARD.encode(bytes),
            media_type: media_type.unwrap_or(DEFAULT_MEDIA_TYPE).to_string(),
        }
    }

    /// `data:` URL as accepted by multimodal chat endpoints.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.media_type, self.data)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunInput {
    pub image: Option<ImageInput>,
    /// Free-text travel location (ex: "Boston, MA")
    pub location: Option<String>,
}

// ============================================================================
// SHARED VALUE TYPES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

/// Which tier of a two-tier lookup produced a value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "tier", content = "name", rename_all = "snake_case")]
pub enum LookupSource {
    /// Remote service (ex: "mapbox_geocoding")
    Primary(String),
    /// Static table used when the remote service is unavailable
    Fallback(String),
}

impl LookupSource {
    pub fn primary(name: impl Into<String>) -> Self {
        LookupSource::Primary(name.into())
    }

    pub fn fallback(name: impl Into<String>) -> Self {
        LookupSource::Fallback(name.into())
    }

    pub fn name(&self) -> &str {
        match self {
            LookupSource::Primary(name) | LookupSource::Fallback(name) => name,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, LookupSource::Fallback(_))
    }
}

impl std::fmt::Display for LookupSource {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            LookupSource::Primary(name) => write!(f, "{}", name),
            LookupSource::Fallback(name) => write!(f, "{} (fallback)", name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub coordinates: Coordinates,
    pub place_name: String,
}

/// A bridge with a posted clearance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bridge {
    pub osm_id: String,
    pub name: String,
    /// Raw posted clearance as tagged (ex: `10'6"`, `3.2`)
    pub maxheight: String,
    pub bridge_type: Option<String>,
    #[serde(rename = "ref")]
    pub reference: Option<String>,
    /// `maxheight` converted to inches, when it could be parsed
    pub clearance_inches: Option<f64>,
}

impl Bridge {
    pub fn new(
        osm_id: impl Into<String>,
        name: impl Into<String>,
        maxheight: impl Into<String>,
    ) -> Self {
        let maxheight = maxheight.into();
        let clearance_inches = crate::clearance::parse_maxheight(&maxheight);
        Self {
            osm_id: osm_id.into(),
            name: name.into(),
            maxheight,
            bridge_type: None,
            reference: None,
            clearance_inches,
        }
    }

    pub fn with_type(mut self, bridge_type: impl Into<String>) -> Self {
        self.bridge_type = Some(bridge_type.into());
        self
    }

    pub fn with_ref(mut self, reference: impl Into<String>) -> Self {
        let reference = reference.into();
        self.reference = if reference.is_empty() { None } else { Some(reference) };
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherConditions {
    /// Short condition name (ex: "Clear", "Snow")
    pub condition: String,
    pub description: Option<String>,
    /// Degrees Fahrenheit
    pub temperature: Option<f64>,
    /// Negative when conditions reduce effective clearance
    pub clearance_impact_inches: i32,
    pub warnings: Vec<String>,
}

/// Result of the static vehicle-spec table lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleSpecs {
    pub found: bool,
    pub vehicle_name: String,
    pub base_height_inches: Option<f64>,
}

// ============================================================================
// PER-STAGE FINDINGS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualDetection {
    pub item: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub height_estimate_inches: Option<f64>,
    #[serde(default)]
    pub estimation_confidence: Option<f64>,
    #[serde(default)]
    pub visual_reasoning: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VisionFindings {
    pub vehicle_detected: Option<bool>,
    pub vehicle_type: Option<String>,
    pub make_model_estimate: Option<String>,
    pub base_height_estimate_inches: Option<f64>,
    pub total_height_visual_estimate_inches: Option<f64>,
    pub visual_detections: Option<Vec<VisualDetection>>,
    pub confidence: Option<f64>,
    pub uncertainty_inches: Option<f64>,
    pub estimation_method: Option<String>,
    pub reference_objects_used: Option<Vec<String>>,
    pub perspective_notes: Option<String>,
    pub reasoning: Option<String>,
}

impl VisionFindings {
    /// Sentinel written when no vehicle can be analysed.
    pub fn not_detected() -> Self {
        Self {
            vehicle_detected: Some(false),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoofEquipment {
    pub item: String,
    pub height_added_inches: f64,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeasurementFindings {
    pub vehicle_specs: Option<VehicleSpecs>,
    pub base_height_inches: Option<f64>,
    pub base_height_source: Option<String>,
    pub roof_equipment: Option<Vec<RoofEquipment>>,
    pub total_height_inches: Option<f64>,
    pub uncertainty_inches: Option<f64>,
    pub reasoning: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocationFindings {
    /// Location string actually geocoded
    pub query: Option<String>,
    pub coordinates: Option<Coordinates>,
    pub place: Option<Place>,
    pub source: Option<LookupSource>,
    pub note: Option<String>,
    pub reasoning: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BridgeFindings {
    pub nearby: Option<Vec<Bridge>>,
    pub count: Option<usize>,
    pub source: Option<LookupSource>,
    pub reasoning: Option<String>,
}

impl BridgeFindings {
    /// Sentinel written when bridges cannot be queried.
    pub fn empty() -> Self {
        Self {
            nearby: Some(Vec::new()),
            count: Some(0),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeatherFindings {
    pub conditions: Option<WeatherConditions>,
    pub clearance_adjustment_inches: Option<i32>,
    pub warnings: Option<Vec<String>>,
    pub source: Option<LookupSource>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeRisk {
    pub bridge_name: String,
    #[serde(default)]
    pub clearance: Option<String>,
    pub risk_level: BridgeVerdict,
    #[serde(default)]
    pub reasoning: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskFindings {
    pub dangerous_bridges: Option<Vec<BridgeRisk>>,
    pub risk_level: Option<RiskLevel>,
    pub strike_probability: Option<f64>,
    pub reasoning: Option<String>,
}

impl RiskFindings {
    /// Sentinel written when risk cannot be assessed.
    pub fn unknown() -> Self {
        Self {
            dangerous_bridges: Some(Vec::new()),
            risk_level: Some(RiskLevel::Unknown),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecommendationFindings {
    pub recommendations: Option<Vec<String>>,
    pub safe_routes: Option<Vec<String>>,
    pub avoid_routes: Option<Vec<String>>,
    pub summary: Option<String>,
}

// ============================================================================
// EXECUTION LOG
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub stage: String,
    pub action: String,
    pub timestamp: DateTime<Utc>,
    pub duration_seconds: f64,
    pub result: Option<Value>,
}

/// Append-only log. Timestamps never go backwards.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct ExecutionLog(Vec<LogEntry>);

impl ExecutionLog {
    pub fn record(
        &mut self,
        stage: impl Into<String>,
        action: impl Into<String>,
        duration_seconds: f64,
        result: Option<Value>,
    ) {
        let now = Utc::now();
        let timestamp = match self.0.last() {
            Some(last) if last.timestamp > now => last.timestamp,
            _ => now,
        };
        self.0.push(LogEntry {
            stage: stage.into(),
            action: action.into(),
            timestamp,
            duration_seconds: duration_seconds.max(0.0),
            result,
        });
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Entries recorded by one stage, in order.
    pub fn for_stage<'a>(&'a self, stage: &'a str) -> impl Iterator<Item = &'a LogEntry> + 'a {
        self.0.iter().filter(move |e| e.stage == stage)
    }
}

// ============================================================================
// RUN STATE
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct RunState {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub input: RunInput,
    pub vision: VisionFindings,
    pub measurement: MeasurementFindings,
    pub location: LocationFindings,
    pub bridges: BridgeFindings,
    pub weather: WeatherFindings,
    pub risk: RiskFindings,
    pub recommendation: RecommendationFindings,
    execution_log: ExecutionLog,
    errors: Vec<String>,
}

impl RunState {
    pub fn new(input: RunInput) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            input,
            vision: VisionFindings::default(),
            measurement: MeasurementFindings::default(),
            location: LocationFindings::default(),
            bridges: BridgeFindings::default(),
            weather: WeatherFindings::default(),
            risk: RiskFindings::default(),
            recommendation: RecommendationFindings::default(),
            execution_log: ExecutionLog::default(),
            errors: Vec::new(),
        }
    }

    pub fn execution_log(&self) -> &ExecutionLog {
        &self.execution_log
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// A run is successful when no stage recorded an error.
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    pub(crate) fn push_error(&mut self, message: String) {
        self.errors.push(message);
    }

    pub(crate) fn log_mut(&mut self) -> &mut ExecutionLog {
        &mut self.execution_log
    }

    /// Serializable view with the derived `success` flag.
    pub fn report(&self) -> RunReport<'_> {
        RunReport {
            success: self.is_success(),
            state: self,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RunReport<'a> {
    pub success: bool,
    #[serde(flatten)]
    pub state: &'a RunState,
}
