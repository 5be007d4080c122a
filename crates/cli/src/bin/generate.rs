use std::process::ExitCode;

use clap::Parser;
use log::info;
use vfstatic_cli::{exit_status, generate::GenerateArgs, init_logging, report_fatal};

fn main() -> ExitCode {
    init_logging();
    match GenerateArgs::parse().run() {
        Ok(report) => {
            info!("{} succeeded, {} failed", report.succeeded(), report.failed());
            ExitCode::from(exit_status(report.status()))
        }
        Err(e) => report_fatal(&e),
    }
}
