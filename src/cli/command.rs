use std::path::PathBuf;

use clap::{Args, Parser as ClapParser, Subcommand, ValueEnum};
use discblob::blob::BlobKind;

#[derive(Debug, ClapParser)]
#[command(
    name       = env!("CARGO_PKG_NAME"),
    version    = env!("CARGO_PKG_VERSION"),
    author     = env!("CARGO_PKG_AUTHORS"),
    about      = "Tools for inspecting and converting CD audio track files",
    long_about = None,
)]
pub struct Cli {
    /// Set the log level
    #[arg(long, global = true, value_enum, default_value_t = LogLevel::Info)]
    pub loglevel: LogLevel,

    /// Log output format.
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,

    /// Show progress bars during operations.
    #[arg(long, global = true)]
    pub progress: bool,

    /// Choose an operation to perform.
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print the layout of a track file
    Info(InfoArgs),

    /// Copy the track bytes of a raw or WAVE file into a raw .bin file.
    Extract(ExtractArgs),

    /// Wrap a raw CD audio file into a WAVE file.
    Wrap(WrapArgs),
}

#[derive(Debug, Args)]
pub struct SourceArgs {
    /// Input track file.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Backing format of the input.
    #[arg(long, value_enum, default_value_t = SourceKind::Auto)]
    pub kind: SourceKind,

    /// Bytes to skip at the start of a raw input.
    #[arg(long, value_name = "BYTES", default_value_t = 0)]
    pub offset: u64,
}

#[derive(Debug, Args)]
pub struct InfoArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Report format.
    #[arg(long, value_enum, default_value_t = ReportFormat::Plain)]
    pub format: ReportFormat,
}

#[derive(Debug, Args)]
pub struct ExtractArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Output path, defaults to the input with a .bin extension.
    #[arg(long, value_name = "PATH")]
    pub output_path: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct WrapArgs {
    /// Raw CD audio input (2 channel, 16 bit little-endian, 44.1 kHz).
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Bytes to skip at the start of the input.
    #[arg(long, value_name = "BYTES", default_value_t = 0)]
    pub offset: u64,

    /// Output path, defaults to the input with a .wav extension.
    #[arg(long, value_name = "PATH")]
    pub output_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq)]
pub enum SourceKind {
    /// Detect from the file signature.
    Auto,
    /// Raw sector data.
    Raw,
    /// RIFF WAVE container.
    Wave,
}

impl SourceKind {
    pub fn blob_kind(self) -> Option<BlobKind> {
        match self {
            SourceKind::Auto => None,
            SourceKind::Raw => Some(BlobKind::Raw),
            SourceKind::Wave => Some(BlobKind::Wave),
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogLevel {
    /// Disable logging output.
    Off,
    /// No output except errors.
    Error,
    /// Show warnings and errors.
    Warn,
    /// Show info, warnings and errors (default).
    Info,
    /// Show debug, info, warnings and errors.
    Debug,
    /// Show all log messages including trace.
    Trace,
}

impl LogLevel {
    /// Convert LogLevel to log::LevelFilter
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Off => log::LevelFilter::Off,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogFormat {
    /// Colorized human-readable text.
    Plain,
    /// Structured JSON per log record.
    Json,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq)]
pub enum ReportFormat {
    /// Aligned text.
    Plain,
    /// YAML document.
    Yaml,
}
