use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use beacon_core::output::Encoding;

/// Output format options for `--output`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One JSON array (default)
    Json,
    /// YAML fragments, newline-joined
    Yaml,
    /// Comma-delimited rows with a header line
    Csv,
    /// Tab-delimited rows
    Tsv,
    /// Consume the result but render nothing
    Raw,
    /// Same as raw
    None,
}

impl From<OutputFormat> for Encoding {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Json => Encoding::Json,
            OutputFormat::Yaml => Encoding::Yaml,
            OutputFormat::Csv => Encoding::Csv,
            OutputFormat::Tsv => Encoding::Tsv,
            OutputFormat::Raw => Encoding::Raw,
            OutputFormat::None => Encoding::None,
        }
    }
}

#[derive(Parser)]
#[command(name = "beacon")]
#[command(about = "beacon - command-line client for the Beacon analytics service")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format
    #[arg(short = 'o', long, global = true, value_enum, default_value = "json")]
    pub output: OutputFormat,

    /// Write output to a file instead of stdout (existing content is replaced)
    #[arg(long, global = true, value_name = "PATH")]
    pub output_file: Option<PathBuf>,

    /// JMESPath expression applied to the result before rendering
    #[arg(short = 'q', long, global = true, value_name = "EXPR")]
    pub query: Option<String>,

    /// Config file path (defaults to ~/.config/beacon/config.toml)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage workspaces
    Workspace {
        #[command(subcommand)]
        command: WorkspaceCommands,
    },

    /// Manage datasets
    Dataset {
        #[command(subcommand)]
        command: DatasetCommands,
    },

    /// Manage reports
    Report {
        #[command(subcommand)]
        command: ReportCommands,
    },

    /// Send a raw request to the service API
    Rest {
        /// Request URI, relative to the API base URL
        uri: String,

        /// HTTP method
        #[arg(short = 'm', long, default_value = "get")]
        method: String,

        /// Request body: inline JSON, or @path to load a file
        #[arg(short, long)]
        body: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum WorkspaceCommands {
    /// List workspaces available to the caller
    List,
    /// Show one workspace by name or id
    Show {
        /// Workspace name or id
        workspace: String,
    },
}

#[derive(Subcommand)]
pub enum DatasetCommands {
    /// List datasets in a workspace
    List {
        /// Workspace name or id (falls back to the configured default)
        #[arg(short, long)]
        workspace: Option<String>,
    },
    /// Show one dataset by name or id
    Show {
        /// Dataset name or id
        dataset: String,

        #[arg(short, long)]
        workspace: Option<String>,
    },
    /// Trigger a dataset refresh
    Refresh {
        /// Dataset name or id
        dataset: String,

        #[arg(short, long)]
        workspace: Option<String>,
    },
    /// Run a tabular query against a dataset, streaming rows as they arrive
    Query {
        /// Dataset name or id
        dataset: String,

        /// Query statement to execute
        statement: String,

        #[arg(short, long)]
        workspace: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum ReportCommands {
    /// List reports in a workspace
    List {
        #[arg(short, long)]
        workspace: Option<String>,
    },
    /// Show one report by name or id
    Show {
        /// Report name or id
        report: String,

        #[arg(short, long)]
        workspace: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_global_output_options() {
        let cli = Cli::try_parse_from([
            "beacon",
            "workspace",
            "list",
            "--output",
            "csv",
            "--query",
            "[?name=='Sales']",
        ])
        .unwrap();
        assert_eq!(cli.output, OutputFormat::Csv);
        assert_eq!(cli.query.as_deref(), Some("[?name=='Sales']"));
    }

    #[test]
    fn output_format_maps_onto_encoding() {
        assert_eq!(Encoding::from(OutputFormat::Json), Encoding::Json);
        assert_eq!(Encoding::from(OutputFormat::None), Encoding::None);
        assert!(Encoding::from(OutputFormat::Raw).is_silent());
    }
}
