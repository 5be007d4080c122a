//! Build a starting configuration from a variable font.

use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::{
    axis::{AxisTag, FontAxis},
    config::{AxisOverrides, Configuration, GlobalAxes, GlobalAxisValue, Variants},
    error::Error,
    font::{NamedInstance, SourceFont},
    io::ensure_dir,
};

const WEIGHT_NAMES: [(u16, &str); 9] = [
    (100, "Thin"),
    (200, "ExtraLight"),
    (300, "Light"),
    (400, "Regular"),
    (500, "Medium"),
    (600, "SemiBold"),
    (700, "Bold"),
    (800, "ExtraBold"),
    (900, "Black"),
];

#[derive(Debug, Clone, Copy, Default)]
pub struct ExtractOptions {
    /// Seed `variants` from the font's named instances.
    pub from_instances: bool,
}

/// Describe `font` as a configuration: every axis unset, no variants
/// (unless seeded from named instances).
pub fn extract_config(font: &SourceFont, options: ExtractOptions) -> Result<Configuration, Error> {
    let axes = font.variable_axes()?;
    for axis in &axes {
        info!("Axis {}: {} .. {} (default {})", axis.tag, axis.min, axis.max, axis.default);
    }

    let font_name = font.family_name().unwrap_or_else(|| {
        let stem = font.path().file_stem().map(|s| s.to_string_lossy().into_owned());
        let stem = stem.unwrap_or_default();
        warn!("{}: no family name in the font, using \"{stem}\"", font.path().display());
        stem
    });
    let file = font.path().canonicalize().unwrap_or_else(|_| font.path().to_path_buf());

    let mut config = Configuration::for_font(file, font_name, &axes);
    if options.from_instances {
        let instances = font.named_instances()?;
        if instances.is_empty() {
            warn!("{}: font has no named instances", font.path().display());
        }
        let (global, variants) = seed_from_instances(&axes, &instances);
        config.axes = global;
        config.variants = variants;
    }
    Ok(config)
}

/// Write `{font_name}-config.json` for the font at `font_path` into
/// `output_dir`. The font is never modified.
pub fn dump_config(
    font_path: &Path,
    output_dir: &Path,
    options: ExtractOptions,
) -> Result<PathBuf, Error> {
    let font = SourceFont::open(font_path)?;
    let config = extract_config(&font, options)?;

    ensure_dir(output_dir)?;
    let path = output_dir.join(config_file_name(&config.font_name));
    config.save(&path)?;
    info!("Configuration saved to {}", path.display());
    Ok(path)
}

fn config_file_name(font_name: &str) -> String {
    let safe: String =
        font_name.chars().map(|c| if matches!(c, '/' | '\\') { '_' } else { c }).collect();
    format!("{safe}-config.json")
}

/// Standard name for a weight, or the nearest one followed by the value
/// (`Regular450`) for weights off the hundreds.
pub fn weight_name(weight: f32) -> String {
    let nearest = WEIGHT_NAMES
        .iter()
        .min_by(|a, b| {
            let da = (f32::from(a.0) - weight).abs();
            let db = (f32::from(b.0) - weight).abs();
            da.total_cmp(&db)
        })
        .map_or("Regular", |&(_, name)| name);

    match WEIGHT_NAMES.iter().find(|(value, _)| f32::from(*value) == weight) {
        Some((_, name)) => (*name).to_string(),
        None => format!("{nearest}{}", weight.trunc() as i32),
    }
}

/// Turn named instances into variants, hoisting values every instance
/// shares into the global axes.
fn seed_from_instances(axes: &[FontAxis], instances: &[NamedInstance]) -> (GlobalAxes, Variants) {
    let global: GlobalAxes = axes
        .iter()
        .map(|axis| {
            let mut values = instances.iter().filter_map(|i| value_of(i, &axis.tag));
            let value = match values.next() {
                Some(first) if values.all(|v| v == first) => GlobalAxisValue::Set(first),
                _ => GlobalAxisValue::Unset,
            };
            (axis.tag.clone(), value)
        })
        .collect();

    let mut variants = Variants::new();
    for (index, instance) in instances.iter().enumerate() {
        let fallback = format!("Instance{}", index + 1);
        let name = match instance.coords.iter().find(|(tag, _)| tag.as_str() == "wght") {
            Some((_, wght)) => weight_name(*wght),
            None => fallback.clone(),
        };
        let name = if variants.contains_key(&name) { unused_name(&variants, fallback) } else { name };

        let overrides: AxisOverrides = instance
            .coords
            .iter()
            .filter(|(tag, value)| global.get(tag) != Some(&GlobalAxisValue::Set(*value)))
            .cloned()
            .collect();
        variants.insert(name, overrides);
    }
    (global, variants)
}

/// `base`, or `base_2`, `base_3`, ... when `base` is already a variant.
fn unused_name(variants: &Variants, base: String) -> String {
    if !variants.contains_key(&base) {
        return base;
    }
    (2..)
        .map(|n| format!("{base}_{n}"))
        .find(|name| !variants.contains_key(name))
        .unwrap_or(base)
}

fn value_of(instance: &NamedInstance, tag: &AxisTag) -> Option<f32> {
    instance.coords.iter().find(|(t, _)| t == tag).map(|(_, v)| *v)
}
