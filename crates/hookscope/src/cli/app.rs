use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use super::commands::{decode::DecodeArgs, schema::SchemaArgs};

#[derive(Debug, Parser)]
#[command(
    name = "hookscope",
    version,
    about = "Decode page, messenger and WhatsApp webhook payloads"
)]
pub struct Cli {
    #[command(flatten)]
    pub runtime: RuntimeArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Args)]
pub struct RuntimeArgs {
    #[arg(long, global = true, value_name = "PATH")]
    pub home_dir: Option<PathBuf>,

    #[arg(long, global = true, value_name = "PATH")]
    pub cwd: Option<PathBuf>,

    /// Config file; defaults to `~/.hookscope/config.json` when present.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Decode a file of webhook payloads and summarize what it holds.
    Decode(DecodeArgs),
    /// Print the JSON schema of the decode report.
    Schema(SchemaArgs),
}

impl Command {
    /// Name used in progress lines.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Decode(_) => "decode",
            Self::Schema(_) => "schema",
        }
    }
}
