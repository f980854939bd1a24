//! CLI interface for ordertrack
//!
//! Provides subcommands for:
//! - `track`: Follow an order's live status and driver location
//! - `simulate`: Trigger delivery simulation on the backend
//! - `config`: Show effective configuration

mod simulate;
mod track;

pub use simulate::{SimAction, SimulateArgs};
pub use track::TrackArgs;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "ordertrack")]
#[command(about = "Real-time delivery order tracking client")]
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
    /// Follow an order's live status and driver location
    Track(TrackArgs),
    /// Trigger delivery simulation on the backend
    Simulate(SimulateArgs),
    /// Show effective configuration
    Config,
}
