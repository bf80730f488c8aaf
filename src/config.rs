//! Configuration and CLI argument handling

use std::time::Duration;

use clap::{ArgAction, Parser};

use crate::gate::GateSettings;

/// CLI argument parsing structure
#[derive(Parser, Debug, Clone)]
#[command(name = "confirm-gate")]
#[command(about = "Timed confirmation gates in front of bookings and redirects")]
#[command(version = "1.0.0")]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    /// Countdown length in ticks before a gate commits
    #[arg(short, long, default_value = "3")]
    pub countdown: u32,

    /// Tick period in milliseconds
    #[arg(long, default_value = "1000", value_parser = clap::value_parser!(u64).range(1..))]
    pub tick_ms: u64,

    /// Fraction of the container width treated as the cancel zone
    #[arg(long, default_value = "0.2")]
    pub confirm_split: f64,

    /// Start the countdown when the pointer leaves a pointer gate
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    pub pointer_leave_confirms: bool,

    /// Expose submit failure messages in booking gate snapshots
    #[arg(long)]
    pub surface_submit_errors: bool,

    /// Maximum number of gates mounted at the same time
    #[arg(long, default_value = "256", value_parser = clap::value_parser!(u64).range(1..))]
    pub max_gates: u64,

    /// Destination opened when a gate is created without one
    #[arg(long, default_value = "https://calendly.com/")]
    pub booking_url: String,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn max_gates(&self) -> usize {
        usize::try_from(self.max_gates).unwrap_or(usize::MAX)
    }

    /// Gate tunables, with the split clamped into `0..=1`
    pub fn gate_settings(&self) -> GateSettings {
        let confirm_split = if self.confirm_split.is_finite() {
            self.confirm_split.clamp(0.0, 1.0)
        } else {
            crate::gate::region::DEFAULT_CONFIRM_SPLIT
        };
        GateSettings {
            countdown: self.countdown,
            confirm_split,
            pointer_leave_confirms: self.pointer_leave_confirms,
            surface_submit_errors: self.surface_submit_errors,
        }
    }
}
