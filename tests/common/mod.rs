//! Shared integration-test harness for running the `mobile-seg` binary.

#![allow(dead_code)]

use std::path::PathBuf;
use std::process::{Command, Output};

/// Helpers for invoking the `mobile-seg` binary.
pub struct MobileSegProcess;

impl MobileSegProcess {
    /// Runs the binary with `args` and waits for it to exit.
    #[allow(clippy::missing_panics_doc)]
    #[must_use]
    pub fn spawn_command(args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_mobile-seg"))
            .args(args)
            .env_remove("MOBILE_SEG_LOG_LEVEL")
            .env_remove("MOBILE_SEG_EXP_DIR")
            .env("NO_COLOR", "1")
            .output()
            .expect("failed to run mobile-seg")
    }

    /// Returns the path to a test fixture.
    #[must_use]
    pub fn fixture_path(name: &str) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("tests/fixtures")
            .join(name)
    }

    /// Returns the path to a test fixture as a string argument.
    #[must_use]
    pub fn fixture_arg(name: &str) -> String {
        Self::fixture_path(name).display().to_string()
    }
}
