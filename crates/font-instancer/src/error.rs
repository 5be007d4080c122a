use std::result;

use read_fonts::ReadError;
use write_fonts::{BuilderError, error};

/// Errors raised while pinning a variable font to one location.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to parse font: {0}")]
    Parse(#[from] ReadError),

    #[error("not a variable font (no fvar table)")]
    NotVariableFont,

    #[error("no glyf table (CFF/CFF2 outlines are not supported)")]
    UnsupportedOutlines,

    #[error("no gvar table")]
    NoGvar,

    #[error("axis not found in font: {0}")]
    AxisNotFound(String),

    #[error("invalid value {value} for axis {tag}")]
    InvalidAxisValue { tag: String, value: f32 },

    #[error("failed to build font: {0}")]
    Build(#[from] BuilderError),

    #[error("failed to write table: {0}")]
    Write(#[from] error::Error),
}

pub type Result<T> = result::Result<T, Error>;
