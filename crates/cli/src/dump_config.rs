use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use vfstatic_core::{ExtractOptions, dump_config};

#[derive(Debug, Parser)]
#[command(name = "vf-dump-config", version)]
#[command(about = "Write a JSON axis configuration for a variable font")]
#[command(after_help = "Example:\n  vf-dump-config -o configs Inter[opsz,wght].ttf")]
pub struct DumpConfigArgs {
    /// Variable font (.ttf or .otf)
    #[arg(value_name = "FONT")]
    pub font: PathBuf,
    /// Directory for <font name>-config.json
    #[arg(short, long, default_value = ".")]
    pub output_dir: PathBuf,
    /// Seed variants from the font's named instances
    #[arg(long)]
    pub from_instances: bool,
}

impl DumpConfigArgs {
    pub fn run(&self) -> Result<PathBuf> {
        let options = ExtractOptions { from_instances: self.from_instances };
        dump_config(&self.font, &self.output_dir, options)
            .with_context(|| format!("Failed to dump configuration for {}", self.font.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let args = DumpConfigArgs::try_parse_from(["vf-dump-config", "Font.ttf"]).unwrap();
        assert_eq!(args.font, PathBuf::from("Font.ttf"));
        assert_eq!(args.output_dir, PathBuf::from("."));
        assert!(!args.from_instances);
    }

    #[test]
    fn all_options() {
        let args = DumpConfigArgs::try_parse_from([
            "vf-dump-config",
            "-o",
            "configs",
            "--from-instances",
            "Font.ttf",
        ])
        .unwrap();
        assert_eq!(args.output_dir, PathBuf::from("configs"));
        assert!(args.from_instances);
    }

    #[test]
    fn font_is_required() {
        assert!(DumpConfigArgs::try_parse_from(["vf-dump-config"]).is_err());
    }
}
