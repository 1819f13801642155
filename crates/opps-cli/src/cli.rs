//! Command line definitions for `opps-scrub`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "opps-scrub",
    version,
    about = "Clean CMRP opportunity snapshots before database import",
    long_about = "Clean and reshape CMRP opportunity CSV snapshots.\n\n\
                  Each subcommand is one batch pass: it reads a snapshot, rewrites \
                  the fields it is responsible for and writes every row back out."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// TOML configuration file (built-in defaults when omitted).
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Year assumed for dates written without one (overrides the config file).
    #[arg(long = "reference-year", value_name = "YEAR", global = true)]
    pub reference_year: Option<i32>,

    /// Column schema version to resolve positions against (overrides the config file).
    #[arg(long, value_name = "VERSION", global = true)]
    pub schema: Option<String>,

    /// Print the pass summary as JSON instead of tables.
    #[arg(long, global = true)]
    pub json: bool,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for humans, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Include raw field values in log events.
    ///
    /// Snapshots carry client and project names, so values are logged as
    /// `[REDACTED]` unless this flag is given.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Rewrite a snapshot into the configured schema, normalizing every field.
    Format(FormatArgs),

    /// Normalize the six date columns to YYYY-MM-DD.
    FixDates(PassArgs),

    /// Replace bare CMRP project codes with temporary codes.
    BackfillCodes(BackfillArgs),

    /// Clear short folder ids and cut rows to the import width.
    PrepareImport(PassArgs),

    /// Note temporary project codes in the remarks column.
    AnnotateTempCodes(AnnotateArgs),

    /// Sum the final amount of submitted opportunities in a raw export.
    SubmittedTotal(InputArgs),

    /// Show the columns of the configured schema.
    Schema(SchemaArgs),
}

#[derive(Args)]
pub struct InputArgs {
    /// Snapshot to read.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,
}

#[derive(Args)]
pub struct FormatArgs {
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Output snapshot (default: replace INPUT in place).
    #[arg(long, short, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct PassArgs {
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Output snapshot.
    #[arg(long, short, value_name = "PATH")]
    pub output: PathBuf,
}

#[derive(Args)]
pub struct BackfillArgs {
    #[command(flatten)]
    pub pass: PassArgs,

    /// Also write the temporary code report (Project Name, Generated Code, Date, UID).
    #[arg(long, value_name = "PATH")]
    pub report: Option<PathBuf>,
}

#[derive(Args)]
pub struct AnnotateArgs {
    #[command(flatten)]
    pub pass: PassArgs,

    /// Temporary code report written by `backfill-codes`. May be repeated.
    #[arg(long = "codes", value_name = "PATH")]
    pub codes: Vec<PathBuf>,
}

#[derive(Args)]
pub struct SchemaArgs {
    /// Schema version to show (default: the configured one).
    #[arg(value_name = "VERSION")]
    pub version: Option<String>,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
