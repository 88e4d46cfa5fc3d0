//! CLI interface for okx-tape
//!
//! Provides subcommands for:
//! - `run`: Stream trades and show the live trade list
//! - `config`: Show the effective configuration

mod run;

pub use run::RunArgs;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "okx-tape")]
#[command(about = "Live OKX trade tape in the terminal")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Stream trades into the rolling trade list
    Run(RunArgs),
    /// Show the effective configuration
    Config,
}
