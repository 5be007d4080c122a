use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use vfstatic_core::{BatchOptions, BatchReport, generate_from_config};

#[derive(Debug, Parser)]
#[command(name = "vf-generate", version)]
#[command(about = "Generate static fonts from a variable font configuration")]
#[command(after_help = "Exit status: 0 all variants written, 1 fatal error, \
    3 some variants failed, 4 every variant failed.")]
pub struct GenerateArgs {
    /// Configuration file written by vf-dump-config
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,
    /// Output directory for generated fonts
    #[arg(short, long, default_value = "output")]
    pub output: PathBuf,
    /// Generate variants in parallel
    #[arg(long)]
    pub parallel: bool,
}

impl GenerateArgs {
    pub fn options(&self) -> BatchOptions {
        BatchOptions { output_dir: self.output.clone(), parallel: self.parallel }
    }

    pub fn run(&self) -> Result<BatchReport> {
        generate_from_config(&self.config, &self.options())
            .with_context(|| format!("Failed to generate from {}", self.config.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let args = GenerateArgs::try_parse_from(["vf-generate", "Demo-config.json"]).unwrap();
        let options = args.options();
        assert_eq!(options.output_dir, PathBuf::from("output"));
        assert!(!options.parallel);
    }

    #[test]
    fn output_and_parallel() {
        let args =
            GenerateArgs::try_parse_from(["vf-generate", "--output", "dist", "--parallel", "c.json"])
                .unwrap();
        assert_eq!(args.config, PathBuf::from("c.json"));
        assert_eq!(args.output, PathBuf::from("dist"));
        assert!(args.parallel);
    }

    #[test]
    fn fatal_errors_carry_context() {
        let args = GenerateArgs::try_parse_from(["vf-generate", "/nonexistent/config.json"]).unwrap();
        let err = args.run().unwrap_err();
        let message = format!("{err:#}");
        assert!(message.starts_with("Failed to generate from /nonexistent/config.json"), "{message}");
    }
}
