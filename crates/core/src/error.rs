use std::{io, path::PathBuf};

use thiserror::Error;

use crate::axis::AxisTag;

/// Errors that stop a whole run before any output is produced.
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to create output directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse font {}: {source}", path.display())]
    ParseFont {
        path: PathBuf,
        #[source]
        source: skrifa::raw::ReadError,
    },

    #[error("{} is not a variable font", path.display())]
    NotVariableFont { path: PathBuf },

    #[error("invalid configuration {}: {source}", path.display())]
    ParseConfig {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize configuration: {0}")]
    SerializeConfig(#[source] serde_json::Error),

    #[error("global axes not present in the font: {}", join_tags(tags))]
    UnknownGlobalAxes { tags: Vec<AxisTag> },

    #[error("configuration has no variants")]
    NoVariants,

    #[error("no font name in the configuration and none in the font")]
    MissingFontName,
}

/// Errors confined to one variant. The batch records them and moves on.
#[derive(Debug, Error)]
pub enum VariantError {
    #[error("axes not present in the font: {}", join_tags(tags))]
    UnknownAxes { tags: Vec<AxisTag> },

    #[error("axis '{tag}' has no override, no global value and no font default")]
    Unresolvable { tag: AxisTag },

    #[error("instancing failed: {0}")]
    Instancing(#[from] font_instancer::Error),

    #[error("renaming failed: {0}")]
    Naming(#[from] vfstatic_font_ops::Error),

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("output {} is already produced by variant \"{first}\"", path.display())]
    DuplicateOutput { path: PathBuf, first: String },
}

fn join_tags(tags: &[AxisTag]) -> String {
    tags.iter().map(AxisTag::as_str).collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_axes_lists_every_tag() {
        let error = VariantError::UnknownAxes {
            tags: vec![AxisTag::new("slnt").unwrap(), AxisTag::new("GRAD").unwrap()],
        };
        assert_eq!(error.to_string(), "axes not present in the font: slnt, GRAD");
    }
}
