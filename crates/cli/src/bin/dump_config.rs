use std::process::ExitCode;

use clap::Parser;
use vfstatic_cli::{dump_config::DumpConfigArgs, init_logging, report_fatal};

fn main() -> ExitCode {
    init_logging();
    match DumpConfigArgs::parse().run() {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => report_fatal(&e),
    }
}
