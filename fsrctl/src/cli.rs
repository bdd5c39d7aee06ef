//! CLI argument definitions

use clap::{Parser, Subcommand};
use fsr_core::View;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "fsrctl")]
#[command(about = "Command line interface for the FortiSOAR API")]
#[command(version)]
pub struct Cli {
    /// Configuration file path (defaults to ~/.pyfsr.yaml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// FortiSOAR server address
    #[arg(long, global = true)]
    pub server: Option<String>,

    /// Authentication token
    #[arg(long, global = true, conflicts_with_all = ["username", "password"])]
    pub token: Option<String>,

    /// Username for authentication
    #[arg(long, global = true)]
    pub username: Option<String>,

    /// Password for authentication
    #[arg(long, global = true)]
    pub password: Option<String>,

    /// Verify SSL certificates
    #[arg(long, global = true, overrides_with = "no_verify_ssl")]
    pub verify_ssl: bool,

    /// Skip SSL certificate verification
    #[arg(long, global = true, overrides_with = "verify_ssl")]
    pub no_verify_ssl: bool,

    /// Output format
    #[arg(short, long, global = true, value_enum)]
    pub output: Option<OutputFormat>,

    /// Save password in config file (not recommended)
    #[arg(long, global = true, overrides_with = "no_save_password")]
    pub save_password: bool,

    /// Never save the password in the config file
    #[arg(long, global = true, overrides_with = "save_password")]
    pub no_save_password: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// `--verify-ssl` / `--no-verify-ssl`, if either was given
    pub fn verify_ssl_flag(&self) -> Option<bool> {
        flag_pair(self.verify_ssl, self.no_verify_ssl)
    }

    /// `--save-password` / `--no-save-password`, if either was given
    pub fn save_password_flag(&self) -> Option<bool> {
        flag_pair(self.save_password, self.no_save_password)
    }
}

fn flag_pair(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage alerts
    Alerts {
        #[command(subcommand)]
        command: AlertCommands,
    },
    /// Manage files and attachments
    Files {
        #[command(subcommand)]
        command: FileCommands,
    },
    /// Send raw HTTP requests to the API
    Http {
        #[command(subcommand)]
        command: HttpCommands,
    },
    /// Manage the local configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum AlertCommands {
    /// List alerts with optional filtering
    List {
        /// Number of alerts to retrieve
        #[arg(long, default_value = "30")]
        limit: u32,
        /// Filter by severity
        #[arg(long)]
        severity: Option<String>,
        /// Filter by status
        #[arg(long)]
        status: Option<String>,
        /// Filter by source
        #[arg(long)]
        source: Option<String>,
        /// Comma-separated list of columns to display (table format only)
        #[arg(long)]
        columns: Option<String>,
        /// Simple view removes null/empty values, full shows all fields
        #[arg(long, value_enum, default_value = "simple")]
        view: ViewArg,
    },
    /// Get details of a specific alert
    Get {
        /// Alert ID
        alert_id: String,
        #[arg(long, value_enum, default_value = "simple")]
        view: ViewArg,
    },
    /// Create a new alert
    Create {
        /// Alert name
        #[arg(long)]
        name: String,
        #[command(flatten)]
        fields: AlertFields,
    },
    /// Update an existing alert
    Update {
        /// Alert ID
        alert_id: String,
        /// Alert name
        #[arg(long)]
        name: Option<String>,
        #[command(flatten)]
        fields: AlertFields,
    },
    /// Delete an alert
    Delete {
        /// Alert ID
        alert_id: String,
        /// Force deletion without confirmation
        #[arg(long)]
        force: bool,
    },
}

/// Optional alert attributes shared by create and update
#[derive(clap::Args, Debug, Clone, Default)]
pub struct AlertFields {
    /// Alert description
    #[arg(long)]
    pub description: Option<String>,
    /// Alert severity
    #[arg(long)]
    pub severity: Option<String>,
    /// Alert status
    #[arg(long)]
    pub status: Option<String>,
    /// Alert source
    #[arg(long)]
    pub source: Option<String>,
    /// Alert type
    #[arg(long = "type")]
    pub alert_type: Option<String>,
}

#[derive(Subcommand)]
pub enum FileCommands {
    /// Upload files and create attachments for them
    Upload {
        /// File path(s)
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Description for the attachment
        #[arg(long)]
        description: Option<String>,
        /// Comma-separated list of tags
        #[arg(long)]
        tags: Option<String>,
    },
    /// List attachments
    List {
        /// Number of attachments to retrieve
        #[arg(long, default_value = "30")]
        limit: u32,
        /// Filter by tag
        #[arg(long)]
        tag: Option<String>,
        /// Comma-separated list of columns to display (table format only)
        #[arg(long)]
        columns: Option<String>,
        #[arg(long, value_enum, default_value = "simple")]
        view: ViewArg,
    },
    /// Get details of a specific attachment
    Get {
        /// Attachment ID
        attachment_id: String,
        #[arg(long, value_enum, default_value = "simple")]
        view: ViewArg,
    },
    /// Download an attachment
    Download {
        /// Attachment ID
        attachment_id: String,
        /// Directory to save the downloaded file
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Delete an attachment
    Delete {
        /// Attachment ID
        attachment_id: String,
        /// Force deletion without confirmation
        #[arg(long)]
        force: bool,
    },
    /// Update attachment details
    Update {
        /// Attachment ID
        attachment_id: String,
        /// New name for the attachment
        #[arg(long)]
        name: Option<String>,
        /// New description
        #[arg(long)]
        description: Option<String>,
        /// Comma-separated list of tags (replaces existing tags)
        #[arg(long)]
        tags: Option<String>,
    },
    /// Link an attachment to an alert or incident
    Link {
        /// Attachment ID
        attachment_id: String,
        /// Alert ID to link to
        #[arg(long)]
        alert: Option<String>,
        /// Incident ID to link to
        #[arg(long)]
        incident: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum HttpCommands {
    /// Send a GET request
    Get {
        /// API endpoint, e.g. /api/3/alerts
        endpoint: String,
        /// Query parameters in key=value format
        #[arg(short, long = "params")]
        params: Vec<String>,
    },
    /// Send a POST request
    Post {
        endpoint: String,
        /// Path to a JSON file with the request body
        #[arg(short, long)]
        data: Option<PathBuf>,
    },
    /// Send a PUT request
    Put {
        endpoint: String,
        /// Path to a JSON file with the request body
        #[arg(short, long)]
        data: Option<PathBuf>,
    },
    /// Send a DELETE request
    Delete { endpoint: String },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the resolved configuration (secrets omitted)
    Show,
    /// Create or update the configuration file interactively
    Init,
    /// Remove the configuration file
    Clear {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(clap::ValueEnum, Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Table,
    Yaml,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewArg {
    Simple,
    Full,
}

impl From<ViewArg> for View {
    fn from(view: ViewArg) -> Self {
        match view {
            ViewArg::Simple => View::Simple,
            ViewArg::Full => View::Full,
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Yaml => write!(f, "yaml"),
        }
    }
}
