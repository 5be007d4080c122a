//! Command-line front ends for vfstatic.
//!
//! `vf-dump-config` writes a starting configuration for a variable font;
//! `vf-generate` turns a configuration into static fonts.

use std::process::ExitCode;

use env_logger::{Builder, Env};
use vfstatic_core::BatchStatus;

pub mod dump_config;
pub mod generate;

/// A fatal error stopped the run before any output was produced.
pub const EXIT_FATAL: u8 = 1;
/// Some variants were written, some failed.
pub const EXIT_PARTIAL_FAILURE: u8 = 3;
/// Every variant failed.
pub const EXIT_ALL_FAILED: u8 = 4;

/// Log to stderr at `info` unless `RUST_LOG` says otherwise.
pub fn init_logging() {
    Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .format_target(false)
        .init();
}

pub fn exit_status(status: BatchStatus) -> u8 {
    match status {
        BatchStatus::AllSucceeded => 0,
        BatchStatus::PartialFailure => EXIT_PARTIAL_FAILURE,
        BatchStatus::AllFailed => EXIT_ALL_FAILED,
    }
}

/// Log a fatal error with its whole cause chain and pick the exit code.
pub fn report_fatal(error: &anyhow::Error) -> ExitCode {
    log::error!("{error:#}");
    ExitCode::from(EXIT_FATAL)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_are_distinct() {
        assert_eq!(exit_status(BatchStatus::AllSucceeded), 0);
        assert_eq!(exit_status(BatchStatus::PartialFailure), 3);
        assert_eq!(exit_status(BatchStatus::AllFailed), 4);
        // 2 belongs to clap usage errors.
        assert_ne!(EXIT_FATAL, 2);
    }
}
