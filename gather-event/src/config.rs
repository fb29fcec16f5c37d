//! Configuration of the multiplexer.
//!
//! The defaults are what most users want, so
//! this is moved to a submodule and only needs
//! to be touched for a hardened setup.

use anyhow::{Result, anyhow};
use std::ffi::OsString;
use std::str::FromStr;

/// Environment variable read by [`Config::from_env`].
pub const FAULT_POLICY_ENV: &str = "GATHER_FAULT_POLICY";

/// What a run does when one processor fails.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum FaultPolicy {
    /// The first failure aborts the whole run.
    ///
    /// The error is yielded right after the events
    /// the failing processor emitted before it, and
    /// nothing is yielded afterwards.
    #[default]
    Abort,

    /// A failing processor is terminated and
    /// recorded as a fault, while the remaining
    /// processors keep running to completion.
    Isolate,
}

impl FromStr for FaultPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "abort" => Ok(FaultPolicy::Abort),
            "isolate" => Ok(FaultPolicy::Isolate),
            other => Err(anyhow!("Unknown fault policy `{}`.", other)),
        }
    }
}

/// Configuration for a multiplexed run.
#[derive(Clone, Copy, Debug, Default)]
pub struct Config {
    pub fault_policy: FaultPolicy,
}

impl Config {
    /// Build the configuration from the environment.
    ///
    /// Unset variables keep their defaults, while
    /// malformed ones are reported as errors.
    pub fn from_env() -> Result<Self> {
        Self::from_var(std::env::var_os(FAULT_POLICY_ENV))
    }

    /// Build the configuration from the value of
    /// [`FAULT_POLICY_ENV`], if set.
    pub fn from_var(value: Option<OsString>) -> Result<Self> {
        let mut cfg = Config::default();
        if let Some(value) = value {
            let value = value
                .into_string()
                .map_err(|_| anyhow!("{} is not valid unicode.", FAULT_POLICY_ENV))?;
            cfg.fault_policy = value.parse()?;
        }
        Ok(cfg)
    }
}
