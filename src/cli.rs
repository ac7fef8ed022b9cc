//! CLI argument parsing.
//!
//! The CLI only wires a workbench to the HTTP service and a download
//! directory; all sequencing lives in `workflow`.
use crate::config::Overrides;
use crate::extraction::ExtractionKind;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Root CLI entrypoint.
#[derive(Parser, Debug)]
#[command(
    name = "tagx",
    version,
    about = "Upload a tag-database export and download extractions from the processing service",
    after_help = "Commands:\n  inspect <FILE>                 Upload a file and print its templates and areas\n  extract <FILE> <KIND>          Upload a file and download one extraction\n  shell [FILE]                   Interactive session (upload, select, extract)\n\nExamples:\n  tagx inspect plant.csv\n  tagx extract plant.csv templates --name '$Motor' --name '$Valve'\n  tagx extract plant.zip addresses --alarm-only\n  tagx --server http://tags.local:8000/api shell plant.zip",
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct RootArgs {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Options shared by every command.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Base URL of the processing service API
    #[arg(long, global = true, value_name = "URL")]
    pub server: Option<String>,

    /// Client config file (defaults to the user config dir)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Directory that receives downloaded artifacts
    #[arg(long, global = true, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Log progress to stderr
    #[arg(long, global = true)]
    pub verbose: bool,
}

impl GlobalArgs {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            server_url: self.server.clone(),
            output_dir: self.out_dir.clone(),
            config_path: self.config.clone(),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    Inspect(InspectArgs),
    Extract(ExtractArgs),
    Shell(ShellArgs),
}

#[derive(Parser, Debug)]
#[command(about = "Upload a file and print the session summary")]
pub struct InspectArgs {
    /// Database export to upload (.csv or .zip)
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Emit the session as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Debug)]
#[command(about = "Upload a file and download one extraction")]
pub struct ExtractArgs {
    /// Database export to upload (.csv or .zip)
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    #[command(subcommand)]
    pub kind: ExtractKindArgs,
}

#[derive(Subcommand, Debug)]
pub enum ExtractKindArgs {
    /// Selected templates as CSV
    Templates {
        /// Template to select (repeatable; naming one twice deselects it)
        #[arg(long = "name", value_name = "TEMPLATE")]
        names: Vec<String>,
    },
    /// Rows of the selected areas as CSV
    Areas {
        /// Area to select (repeatable; naming one twice deselects it)
        #[arg(long = "name", value_name = "AREA")]
        names: Vec<String>,
    },
    /// PLC address matrices per template (ZIP)
    Matrix,
    /// Address lists grouped by area (ZIP)
    Addresses {
        /// Only tags with alarm extensions
        #[arg(long)]
        alarm_only: bool,
    },
    /// Extension usage report (CSV)
    Extensions,
}

impl ExtractKindArgs {
    pub fn kind(&self) -> ExtractionKind {
        match self {
            Self::Templates { .. } => ExtractionKind::Templates,
            Self::Areas { .. } => ExtractionKind::Areas,
            Self::Matrix => ExtractionKind::Matrix,
            Self::Addresses { alarm_only } => ExtractionKind::Addresses {
                alarm_only: *alarm_only,
            },
            Self::Extensions => ExtractionKind::Extensions,
        }
    }

    pub fn names(&self) -> &[String] {
        match self {
            Self::Templates { names } | Self::Areas { names } => names,
            Self::Matrix | Self::Addresses { .. } | Self::Extensions => &[],
        }
    }
}

#[derive(Parser, Debug)]
#[command(about = "Run an interactive extraction session")]
pub struct ShellArgs {
    /// Upload this file before reading commands
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,
}
