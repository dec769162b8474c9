//! CLI module for the key pool gateway

pub mod serve;

use clap::{Parser, Subcommand};

/// Key pool gateway - batch validation and import of upstream API keys
#[derive(Parser)]
#[command(name = "keypool-gateway")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the API server
    Serve,
}
