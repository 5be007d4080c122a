//! Generate every variant of a configuration, isolating failures.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use log::{error, info, warn};
use rayon::prelude::*;
use vfstatic_font_ops::InstanceNames;

use crate::{
    axis::{FontDefaults, font_defaults},
    config::{AxisOverrides, Configuration, GlobalAxes, Variants},
    error::{Error, VariantError},
    font::SourceFont,
    generate::{generate, output_file_name},
    io::ensure_dir,
    resolve::resolve,
};

#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub output_dir: PathBuf,
    /// Process variants on the rayon pool. Reporting order is unchanged.
    pub parallel: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self { output_dir: PathBuf::from("output"), parallel: false }
    }
}

#[derive(Debug)]
pub struct VariantOutcome {
    pub name: String,
    pub result: Result<PathBuf, VariantError>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchStatus {
    AllSucceeded,
    PartialFailure,
    AllFailed,
}

/// Per-variant outcomes, in configuration order.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<VariantOutcome>,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn status(&self) -> BatchStatus {
        match (self.succeeded(), self.failed()) {
            (_, 0) => BatchStatus::AllSucceeded,
            (0, _) => BatchStatus::AllFailed,
            _ => BatchStatus::PartialFailure,
        }
    }

    pub fn written(&self) -> impl Iterator<Item = &Path> {
        self.outcomes.iter().filter_map(|o| o.result.as_deref().ok())
    }
}

/// Everything a variant needs, shared read-only across the batch.
struct BatchContext<'a> {
    font_data: &'a [u8],
    defaults: FontDefaults,
    global: &'a GlobalAxes,
    font_name: &'a str,
    output_dir: &'a Path,
    extension: &'a str,
}

/// One variant to generate. `duplicate` is set when an earlier variant
/// already writes the same file.
struct Job<'a> {
    name: &'a str,
    overrides: &'a AxisOverrides,
    duplicate: Option<VariantError>,
}

/// Pair each variant with the error it gets when its output file is taken.
///
/// File names are compared case-insensitively so the outcome does not
/// depend on the file system.
fn plan_jobs<'a>(
    variants: &'a Variants,
    font_name: &str,
    output_dir: &Path,
    extension: &str,
) -> Vec<Job<'a>> {
    let mut claimed: HashMap<String, &str> = HashMap::new();
    variants
        .iter()
        .map(|(name, overrides)| {
            let file_name = output_file_name(font_name, name, extension);
            let duplicate = match claimed.get(&file_name.to_lowercase()) {
                Some(first) => Some(VariantError::DuplicateOutput {
                    path: output_dir.join(&file_name),
                    first: (*first).to_string(),
                }),
                None => {
                    claimed.insert(file_name.to_lowercase(), name.as_str());
                    None
                }
            };
            Job { name: name.as_str(), overrides, duplicate }
        })
        .collect()
}

impl BatchContext<'_> {
    fn process_variant(&self, job: Job<'_>) -> VariantOutcome {
        let Job { name, overrides, duplicate } = job;
        let result = match duplicate {
            Some(error) => Err(error),
            None => self.generate_variant(name, overrides),
        };

        match &result {
            Ok(path) => info!("Variant \"{name}\" written to {}", path.display()),
            Err(e) => error!("Variant \"{name}\" failed: {e}"),
        }
        VariantOutcome { name: name.to_string(), result }
    }

    fn generate_variant(
        &self,
        name: &str,
        overrides: &AxisOverrides,
    ) -> Result<PathBuf, VariantError> {
        resolve(&self.defaults, self.global, overrides).and_then(|coordinate| {
            info!("Variant \"{name}\": {coordinate}");
            let names = InstanceNames::new(self.font_name, name);
            generate(self.font_data, &coordinate, &names, self.output_dir, self.extension)
        })
    }
}

/// Resolve and generate every variant of `config` from `font`.
///
/// `output_dir` must exist. A failing variant never stops the others.
pub fn run_batch(
    font: &SourceFont,
    config: &Configuration,
    font_name: &str,
    options: &BatchOptions,
) -> Result<BatchReport, Error> {
    let context = BatchContext {
        font_data: font.data(),
        defaults: font_defaults(&font.variable_axes()?),
        global: &config.axes,
        font_name,
        output_dir: &options.output_dir,
        extension: font.extension(),
    };

    let jobs = plan_jobs(&config.variants, font_name, &options.output_dir, context.extension);
    let outcomes = if options.parallel {
        jobs.into_par_iter().map(|job| context.process_variant(job)).collect()
    } else {
        jobs.into_iter().map(|job| context.process_variant(job)).collect()
    };

    let report = BatchReport { outcomes };
    info!("Generated {}/{} variants", report.succeeded(), report.total());
    Ok(report)
}

/// Load a configuration, validate it against its font and generate every
/// variant into `options.output_dir`.
///
/// Returns `Err` only for fatal problems, before anything is written.
/// Per-variant failures are recorded in the report.
pub fn generate_from_config(config_path: &Path, options: &BatchOptions) -> Result<BatchReport, Error> {
    let config = Configuration::load(config_path)?;
    info!("Configuration loaded: {}", config_path.display());

    let font = SourceFont::open(&config.font_path(config_path))?;
    let axes = font.variable_axes()?;
    for warning in config.check_against(&axes)? {
        warn!("{warning}");
    }

    let family = font.family_name();
    let font_name = if config.font_name.trim().is_empty() {
        family.clone().ok_or(Error::MissingFontName)?
    } else {
        config.font_name.clone()
    };
    match family {
        Some(original) if original != font_name => {
            info!("Original font name: \"{original}\"");
            info!("Target font name: \"{font_name}\"");
        }
        _ => info!("Font name: \"{font_name}\""),
    }
    let tags: Vec<_> = axes.iter().map(|a| a.tag.as_str()).collect();
    info!("Available axes: {}", tags.join(", "));

    ensure_dir(&options.output_dir)?;
    let report = run_batch(&font, &config, &font_name, options)?;
    info!("Static fonts saved to {}", options.output_dir.display());
    Ok(report)
}
