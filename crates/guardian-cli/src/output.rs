//! Rendering of run reports and clearance checks
use std::fmt::Write;

use guardian_core::{format_feet_inches, ClearanceStatus, RunState};
use guardian_stages::{ClearanceAssessment, IncidentAssessment, RoutePlanReport, SignReport};

pub fn render_run(state: &RunState) -> String {
    let mut out = String::new();
    let status = if state.is_success() { "complete" } else { "incomplete" };
    let _ = writeln!(out, "BridgeGuardian analysis ({}) run {}", status, state.run_id);

    match (&state.vision.vehicle_type, state.measurement.total_height_inches) {
        (Some(kind), Some(height)) => {
            let _ = writeln!(
                out,
                "Vehicle: {} at {} ({} in, +/-{} in)",
                kind,
                format_feet_inches(height),
                height,
                state.measurement.uncertainty_inches.unwrap_or_default()
            );
        }
        (Some(kind), None) => {
            let _ = writeln!(out, "Vehicle: {} (height not measured)", kind);
        }
        _ => {
            let _ = writeln!(out, "Vehicle: not detected");
        }
    }

    if let Some(place) = &state.location.place {
        let _ = writeln!(out, "Location: {}", place.place_name);
    }
    if let Some(conditions) = &state.weather.conditions {
        let _ = writeln!(
            out,
            "Weather: {} (clearance adjustment {} in)",
            conditions.condition, conditions.clearance_impact_inches
        );
    }

    if let Some(bridges) = &state.bridges.nearby {
        let _ = writeln!(out, "Bridges nearby: {}", state.bridges.count.unwrap_or(bridges.len()));
        for bridge in bridges {
            let verdict = match (bridge.clearance_inches, state.measurement.total_height_inches) {
                (Some(clearance), Some(height)) => {
                    ClearanceStatus::classify(clearance, height).label()
                }
                _ => "-",
            };
            let _ = writeln!(out, "  {:<32} {:>8}  {}", bridge.name, bridge.maxheight, verdict);
        }
    }

    if let Some(level) = state.risk.risk_level {
        let _ = writeln!(
            out,
            "Risk: {} (strike probability {:.0}%)",
            level,
            state.risk.strike_probability.unwrap_or_default() * 100.0
        );
    }
    if let Some(summary) = &state.recommendation.summary {
        let _ = writeln!(out, "\n{}", summary);
    }
    for item in state.recommendation.recommendations.iter().flatten() {
        let _ = writeln!(out, "  - {}", item);
    }

    if !state.errors().is_empty() {
        let _ = writeln!(out, "\nErrors:");
        for error in state.errors() {
            let _ = writeln!(out, "  ! {}", error);
        }
    }
    out
}

pub fn render_clearance(assessment: &ClearanceAssessment) -> String {
    let mut out = String::new();
    let query = &assessment.query;
    let analysis = &assessment.analysis;
    let _ = writeln!(
        out,
        "{}: posted {} vs vehicle {} (margin {:+} in, {})",
        query.bridge_name,
        format_feet_inches(query.bridge_clearance_inches),
        format_feet_inches(query.vehicle_height_inches),
        assessment.nominal_margin_inches,
        assessment.status
    );
    let _ = writeln!(
        out,
        "Will fit: {:?}  risk {}  strike probability {:.0}%",
        analysis.will_fit,
        analysis.risk_level,
        analysis.strike_probability * 100.0
    );
    let _ = writeln!(
        out,
        "Action: {:?}. {}",
        analysis.recommendation.action, analysis.recommendation.explanation
    );
    for warning in &analysis.warnings {
        let _ = writeln!(out, "  ! {}", warning);
    }
    out
}

pub fn render_sign(report: &SignReport) -> String {
    let mut out = String::new();
    match report.minimum_clearance_inches {
        Some(inches) => {
            let _ = writeln!(
                out,
                "Lowest posted clearance: {} ({} in)",
                format_feet_inches(inches),
                inches
            );
        }
        None => {
            let _ = writeln!(out, "No legible clearance found");
        }
    }
    for found in &report.reading.clearances_found {
        let figure = found
            .inches()
            .map(format_feet_inches)
            .unwrap_or_else(|| "?".to_string());
        let _ = writeln!(
            out,
            "  {:>8}  {}{}",
            figure,
            found.applies_to.as_deref().unwrap_or("all lanes"),
            found
                .sign_condition
                .map(|c| format!(" ({:?})", c).to_lowercase())
                .unwrap_or_default()
        );
    }
    for note in report.reading.warnings.iter().chain(&report.reading.concerns) {
        let _ = writeln!(out, "  ! {}", note);
    }
    out
}

pub fn render_route_plan(report: &RoutePlanReport) -> String {
    let mut out = String::new();
    let request = &report.request;
    let _ = writeln!(
        out,
        "{} -> {} at {}",
        request.origin,
        request.destination,
        format_feet_inches(request.vehicle_height_inches)
    );
    for (route, check) in report.plan.routes.iter().zip(&report.checks) {
        let verdict = check.status.map(|s| s.label()).unwrap_or("-");
        let _ = writeln!(out, "  [{}] {:<40} {}", route.safety_grade, route.name, verdict);
        for warning in &route.turn_by_turn_warnings {
            let _ = writeln!(out, "        ! {}", warning);
        }
    }
    match report.safest_fitting() {
        Some(best) => {
            let _ = writeln!(out, "Safest route that fits: {}", best.name);
        }
        None => {
            let _ = writeln!(out, "No proposed route is known to fit");
        }
    }
    for advice in &report.plan.general_advice {
        let _ = writeln!(out, "  - {}", advice);
    }
    out
}

pub fn render_incident(assessment: &IncidentAssessment) -> String {
    let mut out = String::new();
    let damage = &assessment.analysis.damage_assessment;
    let _ = writeln!(
        out,
        "Damage: {:?}{}",
        damage.severity,
        damage
            .damage_type
            .as_deref()
            .map(|kind| format!(" ({})", kind))
            .unwrap_or_default()
    );
    if let Some(margin) = assessment.reported_margin_inches {
        let _ = writeln!(out, "Reported margin: {:+} in", margin);
    }
    if let Some(findings) = &assessment.analysis.incident_analysis {
        if let Some(why) = &findings.why_it_happened {
            let _ = writeln!(out, "{}", why);
        }
    }
    for lesson in &assessment.analysis.lessons_learned {
        let _ = writeln!(out, "  - {}", lesson);
    }
    out
}
