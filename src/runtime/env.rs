//! Environment and system information operations.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::env;
use std::path::PathBuf;

use super::RealRuntime;

impl RealRuntime {
    #[tracing::instrument(skip(self))]
    pub(crate) fn env_var_impl(&self, key: &str) -> Result<String, env::VarError> {
        env::var(key)
    }

    pub(crate) fn now_impl(&self) -> DateTime<Utc> {
        Utc::now()
    }

    #[tracing::instrument(skip(self))]
    pub(crate) fn home_dir_impl(&self) -> Option<PathBuf> {
        dirs::home_dir()
    }

    #[tracing::instrument(skip(self))]
    pub(crate) fn current_dir_impl(&self) -> Result<PathBuf> {
        env::current_dir().context("Failed to get current directory")
    }
}

#[cfg(test)]
mod tests {
    use crate::runtime::{RealRuntime, Runtime};

    #[test]
    fn test_real_runtime_env_and_dirs() {
        let runtime = RealRuntime;

        // PATH should exist on all systems
        assert!(runtime.env_var("PATH").is_ok());
        assert!(runtime.env_var("COMPOSER_LINK_SURELY_UNSET_VAR").is_err());

        let home = runtime.home_dir();
        assert!(home.is_some() || cfg!(target_os = "linux")); // CI might not have home

        let cwd = runtime.current_dir().unwrap();
        assert!(cwd.is_absolute());
    }

    #[test]
    fn test_real_runtime_now_is_monotonic_enough() {
        let runtime = RealRuntime;
        let first = runtime.now();
        let second = runtime.now();
        assert!(second >= first);
    }
}
