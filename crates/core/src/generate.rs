//! Turn one resolved coordinate into a named static font on disk.

use std::path::{Path, PathBuf};

use font_instancer::instantiate;
use log::debug;
use vfstatic_font_ops::{InstanceNames, apply_instance_names};

use crate::{axis::EffectiveCoordinate, error::VariantError, io::write_atomically};

/// `{font_name}-{variant_name}.{ext}`, with spaces removed from the font
/// name only. Distinct variant names always give distinct file names.
pub fn output_file_name(font_name: &str, variant_name: &str, extension: &str) -> String {
    let family: String = font_name.chars().filter(|c| !c.is_whitespace()).collect();
    format!("{family}-{variant_name}.{extension}")
}

/// Instance `font_data` at `coordinate` and rename it. Nothing is written.
pub fn build_instance(
    font_data: &[u8],
    coordinate: &EffectiveCoordinate,
    names: &InstanceNames,
) -> Result<Vec<u8>, VariantError> {
    let instance = instantiate(font_data, &coordinate.locations())?;
    Ok(apply_instance_names(&instance, names)?)
}

/// Build one static instance and write it into `output_dir`.
///
/// `output_dir` must already exist. Returns the path written.
pub fn generate(
    font_data: &[u8],
    coordinate: &EffectiveCoordinate,
    names: &InstanceNames,
    output_dir: &Path,
    extension: &str,
) -> Result<PathBuf, VariantError> {
    let data = build_instance(font_data, coordinate, names)?;
    let path = output_dir.join(output_file_name(&names.family, &names.style, extension));
    write_atomically(&path, &data)
        .map_err(|source| VariantError::Write { path: path.clone(), source })?;
    debug!("Wrote {} ({} bytes)", path.display(), data.len());
    Ok(path)
}
