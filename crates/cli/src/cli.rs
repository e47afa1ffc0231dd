use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Multi-modality trust scanner.
///
/// Scans video, image, audio and text inputs and prints one aggregated
/// trust report as JSON on stdout. Logs go to stderr.
#[derive(Parser, Debug)]
#[command(name = "atrust", about = "Scan media and text for manipulation and scam signals")]
pub struct CliArgs {
    /// Raise log level to info (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Scan one or more inputs and print the trust report
    Scan(ScanArgs),

    /// Initialize every detector tier and print its readiness
    Capabilities,

    /// Text rule document tools
    Rules {
        #[command(subcommand)]
        command: RulesCommand,
    },
}

#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Video file (raw frames)
    #[arg(long)]
    pub video: Option<PathBuf>,

    /// Image file
    #[arg(long)]
    pub image: Option<PathBuf>,

    /// Audio file (WAV or raw 16-bit PCM)
    #[arg(long)]
    pub audio: Option<PathBuf>,

    /// Inline text message
    #[arg(long, conflicts_with = "text_file")]
    pub text: Option<String>,

    /// UTF-8 text file
    #[arg(long)]
    pub text_file: Option<PathBuf>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pub pretty: bool,
}

#[derive(Subcommand, Debug)]
pub enum RulesCommand {
    /// Load, validate and compile a TextRules document
    Check {
        /// Path to the YAML document
        path: PathBuf,
    },
}
