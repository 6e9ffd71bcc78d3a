//! Configuration and CLI argument handling

use std::{path::PathBuf, time::Duration};
use clap::Parser;

use crate::state::{SkipBehavior, TimerOptions};

/// CLI argument parsing structure
#[derive(Parser, Debug)]
#[command(name = "phase-timer")]
#[command(about = "A workout phase countdown and set-tracking service")]
#[command(version)]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20560")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Delay before the next activity starts after an advance, in milliseconds
    #[arg(long, default_value = "300")]
    pub advance_delay_ms: u64,

    /// Remaining seconds at or below which warning pulses fire
    #[arg(long, default_value = "3")]
    pub warning_seconds: u32,

    /// Make skip move to the next activity instead of ending the sequence
    #[arg(long)]
    pub skip_advances: bool,

    /// JSON file holding user preferences (kept in memory when omitted)
    #[arg(long)]
    pub preferences: Option<PathBuf>,

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

    /// Controller options derived from the command line
    pub fn timer_options(&self) -> TimerOptions {
        TimerOptions {
            advance_delay: Duration::from_millis(self.advance_delay_ms),
            warning_threshold_seconds: self.warning_seconds,
            skip_behavior: if self.skip_advances {
                SkipBehavior::NextActivity
            } else {
                SkipBehavior::EndSequence
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = Config::try_parse_from(["phase-timer"]).unwrap();
        let options = config.timer_options();
        assert_eq!(options.advance_delay, Duration::from_millis(300));
        assert_eq!(options.warning_threshold_seconds, 3);
        assert_eq!(options.skip_behavior, SkipBehavior::EndSequence);
        assert_eq!(config.address(), "127.0.0.1:20560");
        assert_eq!(config.log_level(), "info");
    }

    #[test]
    fn flags_override_timer_options() {
        let config = Config::try_parse_from([
            "phase-timer", "--advance-delay-ms", "50", "--skip-advances", "-v",
        ])
        .unwrap();
        let options = config.timer_options();
        assert_eq!(options.advance_delay, Duration::from_millis(50));
        assert_eq!(options.skip_behavior, SkipBehavior::NextActivity);
        assert_eq!(config.log_level(), "debug");
    }
}
