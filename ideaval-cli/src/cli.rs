use clap::{Parser, Subcommand, ValueEnum};
use ideaval_telemetry::LogFormat;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "ideaval")]
#[command(version, about = "Validate app ideas: concept, market, competitors and a final report", long_about = None)]
pub struct Cli {
    /// TOML config file; environment variables override its values
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Model id to use instead of the configured one
    #[arg(short, long, global = true)]
    pub model: Option<String>,

    /// Log output format
    #[arg(long, value_enum, global = true, default_value_t = CliLogFormat::Pretty)]
    pub log_format: CliLogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CliLogFormat {
    Pretty,
    Json,
}

impl From<CliLogFormat> for LogFormat {
    fn from(format: CliLogFormat) -> Self {
        match format {
            CliLogFormat::Pretty => LogFormat::Pretty,
            CliLogFormat::Json => LogFormat::Json,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate an app idea and print the report
    Validate {
        /// The idea; prompted for when omitted
        idea: Option<String>,

        /// Directory to write report_<session>.md into
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Do not record the run in the history database
        #[arg(long)]
        no_save: bool,
    },

    /// List previously validated ideas
    History {
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },

    /// Start the HTTP server
    Serve {
        #[arg(short, long, default_value_t = 8080)]
        port: u16,
    },

    /// Google Calendar helpers
    Calendar {
        #[command(subcommand)]
        action: CalendarCommand,
    },
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum CalendarCommand {
    /// List today's events
    Today,

    /// Create an event starting now
    Create {
        #[arg(short, long)]
        title: String,

        #[arg(short, long, default_value = "")]
        description: String,

        /// Event length in minutes
        #[arg(long, default_value_t = 60)]
        minutes: u32,
    },
}
