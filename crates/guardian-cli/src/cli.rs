//! CLI definition using clap

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Json,
    Text,
}

#[derive(Parser, Debug)]
#[command(name = "bridge-guardian")]
#[command(version)]
#[command(about = "Estimate vehicle height from a photo and flag low bridges nearby")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format
    #[arg(long, short = 'f', global = true, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the full seven-stage analysis
    Analyze {
        /// Path to a photo of the vehicle
        #[arg(long, short = 'i')]
        image: Option<PathBuf>,

        /// MIME type of the image (guessed from the extension if omitted)
        #[arg(long)]
        media_type: Option<String>,

        /// Travel location (defaults to GUARDIAN_DEFAULT_LOCATION or "Boston, MA")
        #[arg(long, short = 'l')]
        location: Option<String>,

        /// Use the static lookup tables only
        #[arg(long)]
        offline: bool,
    },

    /// Ask whether a vehicle fits under one bridge
    CheckClearance {
        /// Vehicle height in inches
        #[arg(long)]
        height: f64,

        /// Bridge name
        #[arg(long)]
        bridge: String,

        /// Posted clearance in inches
        #[arg(long)]
        clearance: f64,

        /// Free-text vehicle description
        #[arg(long)]
        description: Option<String>,
    },

    /// Read posted clearances from a photo of a bridge sign
    ReadSign {
        /// Path to the sign photo
        #[arg(long, short = 'i')]
        image: PathBuf,

        /// MIME type of the image (guessed from the extension if omitted)
        #[arg(long)]
        media_type: Option<String>,
    },

    /// Propose graded routes between two places
    PlanRoute {
        /// Vehicle height in inches
        #[arg(long)]
        height: f64,

        /// Starting point
        #[arg(long)]
        origin: String,

        /// Destination
        #[arg(long)]
        destination: String,

        /// Free-text vehicle description
        #[arg(long)]
        description: Option<String>,
    },

    /// Assess damage from a photo taken after a bridge strike
    AnalyzeIncident {
        /// Path to the damage photo
        #[arg(long, short = 'i')]
        image: PathBuf,

        /// MIME type of the image (guessed from the extension if omitted)
        #[arg(long)]
        media_type: Option<String>,

        /// Reported vehicle height in inches
        #[arg(long)]
        height: Option<f64>,

        /// Reported bridge clearance in inches
        #[arg(long)]
        clearance: Option<f64>,
    },
}
