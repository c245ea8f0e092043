//! bridge-guardian command-line front end
pub mod cli;
pub mod output;

use std::path::Path;

use anyhow::{Context, Result};
use guardian_core::{ImageInput, PipelineConfig, RunInput};
use guardian_reasoning::{service_from_config, ReasoningConfig};
use guardian_stages::{
    analyze_incident, check_clearance, plan_route, read_bridge_sign, run_pipeline, ClearanceQuery,
    IncidentReport, RouteRequest, Services,
};
use guardian_tools::{ToolSet, ToolsConfig};
use tracing::info;

use cli::{Cli, Commands, OutputFormat};

/// Media type from the file extension, `None` when unrecognised.
pub fn guess_media_type(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        _ => None,
    }
}

fn load_image(path: &Path, media_type: Option<&str>) -> Result<ImageInput> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("failed to read image {}", path.display()))?;
    let media_type = media_type.or_else(|| guess_media_type(path));
    info!(path = %path.display(), bytes = bytes.len(), "image loaded");
    Ok(ImageInput::from_bytes(&bytes, media_type))
}

pub async fn run(cli: Cli) -> Result<()> {
    let reasoning = service_from_config(&ReasoningConfig::from_env());

    let rendered = match cli.command {
        Commands::Analyze {
            image,
            media_type,
            location,
            offline,
        } => {
            let config = PipelineConfig::from_env().context("invalid pipeline configuration")?;
            let mut tools_config = ToolsConfig::from_env().context("invalid tool configuration")?;
            tools_config.offline |= offline;
            let tools = ToolSet::from_config(&tools_config).context("failed to build lookup clients")?;

            let image = image
                .as_deref()
                .map(|path| load_image(path, media_type.as_deref()))
                .transpose()?;
            let input = RunInput { image, location };

            let state = run_pipeline(input, &Services::new(reasoning, tools), &config).await;
            match cli.format {
                OutputFormat::Json => serde_json::to_string_pretty(&state.report())?,
                OutputFormat::Text => output::render_run(&state),
            }
        }
        Commands::CheckClearance {
            height,
            bridge,
            clearance,
            description,
        } => {
            let query = ClearanceQuery {
                vehicle_height_inches: height,
                bridge_name: bridge,
                bridge_clearance_inches: clearance,
                vehicle_description: description,
            };
            let assessment = check_clearance(reasoning.as_ref(), query)
                .await
                .context("clearance check failed")?;
            match cli.format {
                OutputFormat::Json => serde_json::to_string_pretty(&assessment)?,
                OutputFormat::Text => output::render_clearance(&assessment),
            }
        }
        Commands::ReadSign { image, media_type } => {
            let image = load_image(&image, media_type.as_deref())?;
            let report = read_bridge_sign(reasoning.as_ref(), image)
                .await
                .context("sign reading failed")?;
            match cli.format {
                OutputFormat::Json => serde_json::to_string_pretty(&report)?,
                OutputFormat::Text => output::render_sign(&report),
            }
        }
        Commands::PlanRoute {
            height,
            origin,
            destination,
            description,
        } => {
            let request = RouteRequest {
                vehicle_height_inches: height,
                origin,
                destination,
                vehicle_description: description,
            };
            let report = plan_route(reasoning.as_ref(), request)
                .await
                .context("route planning failed")?;
            match cli.format {
                OutputFormat::Json => serde_json::to_string_pretty(&report)?,
                OutputFormat::Text => output::render_route_plan(&report),
            }
        }
        Commands::AnalyzeIncident {
            image,
            media_type,
            height,
            clearance,
        } => {
            let image = load_image(&image, media_type.as_deref())?;
            let report = IncidentReport {
                vehicle_height_inches: height,
                bridge_clearance_inches: clearance,
            };
            let assessment = analyze_incident(reasoning.as_ref(), image, report)
                .await
                .context("incident analysis failed")?;
            match cli.format {
                OutputFormat::Json => serde_json::to_string_pretty(&assessment)?,
                OutputFormat::Text => output::render_incident(&assessment),
            }
        }
    };

    println!("{}", rendered);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guess_media_type() {
        assert_eq!(guess_media_type(Path::new("truck.PNG")), Some("image/png"));
        assert_eq!(guess_media_type(Path::new("a/b/rv.jpeg")), Some("image/jpeg"));
        assert_eq!(guess_media_type(Path::new("notes.txt")), None);
        assert_eq!(guess_media_type(Path::new("no_extension")), None);
    }
}
