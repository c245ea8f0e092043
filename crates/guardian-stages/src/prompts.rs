//! Instructions sent to the reasoning service.
//!
//! Each prompt asks for a single JSON object whose shape matches the
//! corresponding type in [`crate::schemas`]. Domain heuristics (equipment
//! heights, suspension compression, safety margin) live here.
use guardian_core::{
    format_feet_inches, Bridge, ClearanceStatus, RunState, VehicleSpecs, VisionFindings,
};
use serde_json::{json, Value};

use crate::clearance_check::ClearanceQuery;
use crate::incident::IncidentReport;
use crate::route_plan::RouteRequest;

pub const VISION_MAX_TOKENS: u32 = 2000;
pub const MEASUREMENT_MAX_TOKENS: u32 = 1500;
pub const RISK_MAX_TOKENS: u32 = 2000;
pub const RECOMMENDATION_MAX_TOKENS: u32 = 1500;
pub const CLEARANCE_MAX_TOKENS: u32 = 2000;
pub const SIGN_MAX_TOKENS: u32 = 1500;
pub const ROUTE_MAX_TOKENS: u32 = 4000;
pub const INCIDENT_MAX_TOKENS: u32 = 2000;

pub const VISION_PROMPT: &str = r#"You are an expert at analyzing vehicle dimensions from photos.

CRITICAL TASK: Estimate vehicle height as accurately as possible using ALL visual cues.

ANALYSIS STEPS:
1. Identify vehicle type and model (use proportions, logos, design)
2. Use reference objects for scale:
   - Wheels/tires (typically 30-40" diameter for trucks, 24-30" for vans)
   - Door height (typically 60-72" for cab doors)
   - Windows (standard sizes vary by vehicle type)
   - Nearby objects (people, cars, buildings)
3. Detect ALL roof-mounted equipment with estimated heights:
   - AC units: 8-12" typical (look at profile/shadow)
   - Antennas: 4-10"
   - Roof racks: 3-8"
   - Satellite dishes: 6-10"
   - Custom equipment: estimate from proportions
4. Account for camera angle and perspective distortion
5. Provide confidence levels and uncertainty ranges

RESPOND WITH VALID JSON ONLY:
{
  "vehicle_detected": boolean,
  "vehicle_type": "box truck/RV/van/etc - be specific with model if visible",
  "make_model_estimate": "if logos/design visible",
  "base_height_estimate_inches": number,
  "estimation_method": "which visual references you used",
  "visible_items": [
    {
      "item": "AC unit/antenna/etc",
      "description": "visual description",
      "height_estimate_inches": number,
      "estimation_confidence": 0.0-1.0,
      "visual_reasoning": "how you estimated this height"
    }
  ],
  "total_height_estimate_inches": number (base + all equipment),
  "uncertainty_range_inches": number (+/- inches),
  "overall_confidence": 0.0-1.0,
  "reference_objects_used": ["wheel diameter", "door height"],
  "perspective_notes": "camera angle or distortion concerns",
  "reasoning": "explanation of your height calculation"
}

BE PRECISE: compare equipment sizes to vehicle proportions and use multiple reference points."#;

fn inches_or_na(value: Option<f64>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| "not available".to_string())
}

pub fn measurement_prompt(
    vision: &VisionFindings,
    vehicle_type: &str,
    specs: &VehicleSpecs,
    default_uncertainty: f64,
) -> String {
    let references = vision.reference_objects_used.clone().unwrap_or_default();
    let detections = json!(vision.visual_detections.clone().unwrap_or_default());

    format!(
        r#"You are a vehicle measurement expert combining visual analysis with database knowledge.

VISUAL ANALYSIS FROM IMAGE:
- Base height estimate: {base} inches
- Total height visual estimate: {total} inches
- Estimation method: {method}
- Reference objects used: {references:?}
- Uncertainty range: +/-{uncertainty} inches
- Perspective notes: {perspective}

DATABASE LOOKUP:
- Vehicle type: {vehicle_type}
- Standard specs: {specs:#}

DETECTED EQUIPMENT:
{detections:#}

TASK:
Provide the MOST ACCURATE height estimate by combining visual analysis with database knowledge.

PRIORITIZATION:
1. If the visual estimate used good reference objects (wheels, doors), trust it more
2. If make/model was identified, use database specs as the baseline
3. Combine both sources with weighted confidence
4. Add equipment heights from visual detection

Return ONLY valid JSON:
{{
  "base_height_inches": number,
  "base_height_source": "visual/database/combined",
  "roof_equipment": [
    {{
      "item": "string",
      "height_added_inches": number,
      "source": "visual_measurement/typical_value",
      "confidence": 0.0-1.0
    }}
  ],
  "total_height_inches": number,
  "uncertainty_inches": number,
  "reasoning": "how you combined visual, database and equipment measurements"
}}"#,
        base = inches_or_na(vision.base_height_estimate_inches),
        total = inches_or_na(vision.total_height_visual_estimate_inches),
        method = vision.estimation_method.as_deref().unwrap_or("not available"),
        references = references,
        uncertainty = vision.uncertainty_inches.unwrap_or(default_uncertainty),
        perspective = vision.perspective_notes.as_deref().unwrap_or("none"),
        vehicle_type = vehicle_type,
        specs = json!(specs),
        detections = detections,
    )
}

/// Bridge list annotated with the nominal margin and clearance status.
pub fn annotated_bridges(bridges: &[Bridge], vehicle_height: f64) -> Value {
    Value::Array(
        bridges
            .iter()
            .map(|bridge| {
                let mut entry = json!({
                    "name": bridge.name,
                    "maxheight": bridge.maxheight,
                    "type": bridge.bridge_type,
                    "ref": bridge.reference,
                });
                if let Some(clearance) = bridge.clearance_inches {
                    let status = ClearanceStatus::classify(clearance, vehicle_height);
                    entry["clearance_inches"] = json!(clearance);
                    entry["nominal_margin_inches"] = json!(clearance - vehicle_height);
                    entry["status"] = json!(status.label());
                }
                entry
            })
            .collect(),
    )
}

pub fn risk_prompt(
    vehicle_height: f64,
    uncertainty: f64,
    weather_impact: i32,
    bridges: &[Bridge],
) -> String {
    format!(
        r#"You are a bridge clearance safety expert.

VEHICLE:
- Height: {height} inches ({feet:.1} feet, {feet_inches})
- Uncertainty: +/-{uncertainty} inches
- Weather impact: {weather_impact} inches

NEARBY BRIDGES:
{bridges:#}

TASK:
Assess which bridges are dangerous for this vehicle.

Consider:
- Suspension compression (1-3 inches)
- Weather impact (already provided)
- Measurement uncertainty
- Margin of safety (need 6+ inches for "safe")

Return ONLY valid JSON:
{{
  "dangerous_bridges": [
    {{
      "bridge_name": "string",
      "clearance": "string from maxheight",
      "risk_level": "SAFE/CAUTION/DANGER/CRITICAL",
      "reasoning": "why this bridge is risky"
    }}
  ],
  "overall_risk": "SAFE/LOW/MEDIUM/HIGH/CRITICAL",
  "strike_probability": 0.0-1.0,
  "detailed_reasoning": "overall safety assessment"
}}"#,
        height = vehicle_height,
        feet = vehicle_height / 12.0,
        feet_inches = format_feet_inches(vehicle_height),
        uncertainty = uncertainty,
        weather_impact = weather_impact,
        bridges = annotated_bridges(bridges, vehicle_height),
    )
}

/// Everything the recommendation stage needs, condensed.
pub fn analysis_summary(state: &RunState) -> Value {
    json!({
        "vehicle": {
            "type": state.vision.vehicle_type,
            "height": state.measurement.total_height_inches,
            "equipment": state.measurement.roof_equipment,
        },
        "location": state.location.place.as_ref().map(|p| p.place_name.clone()),
        "bridges_found": state.bridges.count,
        "dangerous_bridges": state.risk.dangerous_bridges.clone().unwrap_or_default(),
        "risk_level": state.risk.risk_level,
        "weather": state.weather.conditions.as_ref().map(|c| c.condition.clone()),
    })
}

pub fn recommendation_prompt(state: &RunState) -> String {
    format!(
        r#"You are a route safety advisor.

COMPLETE ANALYSIS:
{analysis:#}

TASK:
Generate clear, actionable recommendations for the driver.

Return ONLY valid JSON:
{{
  "recommendations": [
    "specific action item 1",
    "specific action item 2"
  ],
  "safe_routes": ["route descriptions that are safe"],
  "avoid_routes": ["routes/areas to avoid"],
  "summary": "2-3 sentence summary of the situation"
}}"#,
        analysis = analysis_summary(state),
    )
}

pub fn clearance_prompt(query: &ClearanceQuery) -> String {
    format!(
        r#"You are a bridge clearance safety expert.

SCENARIO:
- Vehicle height: {height}" ({height_ft:.1} feet)
- Vehicle description: {description}
- Bridge: {bridge}
- Posted clearance: {clearance}" ({clearance_ft:.1} feet)

ANALYSIS REQUIRED:
1. Calculate clearance margins
2. Account for real-world factors:
   - Measurement uncertainty (2-4")
   - Suspension compression (1-3" depending on road/load)
   - Tire pressure effects (0.5-1")
   - Road resurfacing reducing clearance (0-4")
   - Bridge settlement (0-3" for older bridges)
3. Assess risk level
4. Provide a clear recommendation

RETURN JSON:
{{
  "will_fit": "yes/no/marginal",
  "margins": {{
    "nominal_inches": number,
    "worst_case_inches": number,
    "comfortable_clearance": boolean
  }},
  "risk_level": "SAFE/LOW/MEDIUM/HIGH/CRITICAL",
  "strike_probability": number (0-1),
  "grade": "A/B/C/D/F",
  "factors": {{
    "vehicle_uncertainty": "+/-X inches",
    "suspension_compression": "X inches",
    "effective_vehicle_height": number,
    "effective_bridge_clearance": number
  }},
  "recommendation": {{
    "action": "proceed/caution/avoid/stop",
    "explanation": "clear reasoning in 2-3 sentences",
    "alternative_action": "what to do instead"
  }},
  "warnings": ["specific concerns"],
  "detailed_analysis": "explanation for the driver"
}}

BE CONSERVATIVE: when in doubt, recommend avoiding."#,
        height = query.vehicle_height_inches,
        height_ft = query.vehicle_height_inches / 12.0,
        description = query.vehicle_description.as_deref().unwrap_or("not provided"),
        bridge = query.bridge_name,
        clearance = query.bridge_clearance_inches,
        clearance_ft = query.bridge_clearance_inches / 12.0,
    )
}

pub const SIGN_PROMPT: &str = r#"You are analyzing a bridge clearance sign photo.

TASKS:
1. Find and read ALL clearance signs
2. Identify the clearance heights
3. Note conditional information (by lane, by level, etc.)
4. Assess sign visibility and condition
5. Look for warning signs about height restrictions

RETURN JSON:
{
  "clearances_found": [
    {
      "clearance_inches": number,
      "clearance_display": "X'Y\"",
      "applies_to": "all lanes / left lane / level 1-3 / etc",
      "sign_condition": "clear/faded/damaged/obscured",
      "confidence": number (0-1)
    }
  ],
  "minimum_clearance": number,
  "warnings": ["any warning signs visible"],
  "sign_analysis": "description of what you see",
  "concerns": ["any visibility or accuracy issues"]
}

Return ONLY JSON, no other text."#;

pub fn route_prompt(request: &RouteRequest) -> String {
    format!(
        r#"You are a route planning expert for tall vehicles.

REQUEST:
- Vehicle height: {height}" ({height_ft:.1} feet)
- Vehicle: {description}
- From: {origin}
- To: {destination}

TASK: Create EXACTLY 3 route options with a safety analysis for each.

REQUIRED ROUTES:
1. Route A (SAFE): grade A, interstate highways only, all clearances 14'+, no dangerous bridges
2. Route C (MODERATE): grade C, mixed highways, some tight clearances (12'-13'), careful driving required
3. Route F (DANGEROUS): grade F, 3+ problem bridges, very high strike risk, to be AVOIDED

Known problem bridges:
- Storrow Drive, Boston: 10'6" (126"), 150+ strikes
- 11 Foot 8 Bridge, Durham NC: 12'4" (148")
- BQE Brooklyn: low bridges 11'6"-12'0"
- NY/NJ parkways: often 10'-11', trucks prohibited
- Most interstate highways: 14'-16' (safe)

RETURN JSON:
{{
  "routes": [
    {{
      "name": "Route A: Safe Interstate Route",
      "type": "interstate/mixed/prohibited",
      "safety_grade": "A/C/F",
      "distance_miles": number,
      "duration_hours": number,
      "clearance_summary": "string",
      "minimum_clearance": number (inches; 168+ for A, 138-162 for C, below 138 for F),
      "bridges_analyzed": number,
      "risk_assessment": {{
        "overall_risk": "SAFE/LOW/MEDIUM/HIGH/CRITICAL",
        "strike_probability": number (0-1),
        "concerns": ["specific bridges"]
      }},
      "key_bridges": [
        {{"name": "string", "clearance_inches": number, "margin_inches": number, "risk": "SAFE/CAUTION/DANGER/CRITICAL"}}
      ],
      "recommendation": {{
        "recommended": boolean,
        "reasoning": "explanation",
        "when_to_use": "string"
      }},
      "turn_by_turn_warnings": ["warnings for tight spots"]
    }}
  ],
  "overall_recommendation": {{
    "best_route": "Route A",
    "why": "explanation",
    "avoid_routes": ["Route F because it includes dangerous bridges"]
  }},
  "general_advice": ["string"]
}}

Return the 3 routes in order A, C, F. Be specific about bridge locations."#,
        height = request.vehicle_height_inches,
        height_ft = request.vehicle_height_inches / 12.0,
        description = request.vehicle_description.as_deref().unwrap_or("commercial truck"),
        origin = request.origin,
        destination = request.destination,
    )
}

pub fn incident_prompt(report: &IncidentReport) -> String {
    let height = report.vehicle_height_inches.unwrap_or(0.0);
    let clearance = report.bridge_clearance_inches.unwrap_or(0.0);
    format!(
        r#"You are analyzing a bridge strike incident photo.

CONTEXT:
- Reported vehicle height: {height}" ({height_ft:.1} feet)
- Reported bridge clearance: {clearance}" ({clearance_ft:.1} feet)

ANALYZE THE PHOTO:
1. Type and severity of visible damage
2. Point of impact (roof, cargo, equipment)
3. Whether the strike was avoidable
4. Likely causes
5. Lessons learned

RETURN JSON:
{{
  "damage_assessment": {{
    "severity": "minor/moderate/severe/catastrophic",
    "damage_type": "scrape/dent/roof_peel/structural",
    "affected_areas": ["string"],
    "estimated_repair_cost": "range",
    "vehicle_likely_driveable": boolean
  }},
  "incident_analysis": {{
    "impact_point_inches": number,
    "actual_clearance_likely": number (inches),
    "measurement_discrepancy": "explanation if heights don't match the damage",
    "contributing_factors": ["string"],
    "was_avoidable": boolean,
    "why_it_happened": "explanation"
  }},
  "lessons_learned": ["what could have prevented this"],
  "recommendations": {{
    "for_database": "how to update bridge data",
    "for_users": "warnings for future drivers",
    "for_signage": "sign improvements needed"
  }},
  "visual_description": "what you see in the image"
}}"#,
        height = height,
        height_ft = height / 12.0,
        clearance = clearance,
        clearance_ft = clearance / 12.0,
    )
}
