//! Client configuration
//!
//! Settings the host environment may override, typically loaded from a
//! JSON document at startup.

use std::time::Duration;

use garde::Validate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::reveal;

/// Errors that can occur while loading the configuration
#[derive(Error, Debug)]
pub enum Error {
    /// The document is not valid JSON for a configuration
    #[error("configuration could not be parsed: {0}")]
    Parse(#[from] serde_json::Error),
    /// A value is out of bounds
    #[error("configuration is invalid: {0}")]
    Invalid(#[from] garde::Report),
}

/// Validates that the countdown ticks at a sensible rate
fn validate_tick(val: &Duration) -> garde::Result {
    if (100..=10_000).contains(&val.as_millis()) {
        Ok(())
    } else {
        Err(garde::Error::new(
            "reveal_tick is outside of the bounds [100ms,10s]",
        ))
    }
}

/// Settings of the client
#[serde_with::serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ClientConfig {
    /// Address of the game server
    #[garde(length(min = 1))]
    pub server_url: String,
    /// Seconds shown on the reveal countdown
    #[garde(range(min = 1, max = 120))]
    pub reveal_seconds: u64,
    /// Delay between two countdown ticks
    #[garde(custom(|v, _| validate_tick(v)))]
    #[serde_as(as = "serde_with::DurationMilliSeconds<u64>")]
    pub reveal_tick: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: "https://inposter-backend-production.up.railway.app".to_owned(),
            reveal_seconds: reveal::COUNTDOWN_SECONDS,
            reveal_tick: Duration::from_millis(reveal::TICK_MILLIS),
        }
    }
}

impl ClientConfig {
    /// Parses and validates a JSON configuration; missing fields keep their
    /// defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be parsed or a value is out
    /// of bounds.
    pub fn from_json(document: &str) -> Result<Self, Error> {
        let config: Self = serde_json::from_str(document)?;
        config.validate()?;
        Ok(config)
    }
}
