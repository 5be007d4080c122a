//! Read-only access to a source variable font.

use std::path::{Path, PathBuf};

use skrifa::{
    FontRef, MetadataProvider,
    raw::{TableProvider, types::NameId},
};

use crate::{
    axis::{AxisTag, FontAxis},
    error::Error,
    io::read_file,
};

const PLATFORM_WINDOWS: u16 = 3;
const ENCODING_UNICODE_BMP: u16 = 1;

/// The bytes of a font file together with where they came from.
///
/// The data is read once and only ever borrowed, so it can be shared by
/// every variant of a batch.
#[derive(Debug, Clone)]
pub struct SourceFont {
    path: PathBuf,
    data: Vec<u8>,
}

/// A named instance from `fvar`, in user coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedInstance {
    pub coords: Vec<(AxisTag, f32)>,
}

impl SourceFont {
    /// Read and parse the font at `path`.
    pub fn open(path: &Path) -> Result<Self, Error> {
        let data = read_file(path)?;
        Self::from_bytes(path.to_path_buf(), data)
    }

    pub fn from_bytes(path: PathBuf, data: Vec<u8>) -> Result<Self, Error> {
        FontRef::new(&data).map_err(|source| Error::ParseFont { path: path.clone(), source })?;
        Ok(Self { path, data })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    fn font(&self) -> Result<FontRef<'_>, Error> {
        FontRef::new(&self.data).map_err(|source| Error::ParseFont { path: self.path.clone(), source })
    }

    /// Axes declared in `fvar`, in table order. Empty for static fonts.
    pub fn axes(&self) -> Result<Vec<FontAxis>, Error> {
        let font = self.font()?;
        let axes = font.axes();
        let mut out = Vec::with_capacity(axes.len());
        for axis in axes.iter() {
            // fvar tags are four bytes; anything that fails validation is
            // not addressable from a configuration and is skipped.
            let Ok(tag) = AxisTag::new(&axis.tag().to_string()) else {
                log::warn!("{}: skipping axis with unusable tag {}", self.path.display(), axis.tag());
                continue;
            };
            out.push(FontAxis {
                tag,
                min: axis.min_value(),
                default: axis.default_value(),
                max: axis.max_value(),
            });
        }
        Ok(out)
    }

    /// Like [`axes`](Self::axes), but a font without axes is an error.
    pub fn variable_axes(&self) -> Result<Vec<FontAxis>, Error> {
        let axes = self.axes()?;
        if axes.is_empty() {
            return Err(Error::NotVariableFont { path: self.path.clone() });
        }
        Ok(axes)
    }

    /// Family name (name ID 1), preferring the Windows Unicode record.
    pub fn family_name(&self) -> Option<String> {
        let font = self.font().ok()?;
        let name = font.name().ok()?;
        let data = name.string_data();
        let family: Vec<_> =
            name.name_record().iter().filter(|r| r.name_id() == NameId::FAMILY_NAME).collect();

        let windows = family.iter().find(|r| {
            r.platform_id() == PLATFORM_WINDOWS && r.encoding_id() == ENCODING_UNICODE_BMP
        });
        windows
            .into_iter()
            .chain(family.iter())
            .filter_map(|r| r.string(data).ok())
            .map(|s| s.chars().collect::<String>())
            .find(|s| !s.trim().is_empty())
    }

    pub fn named_instances(&self) -> Result<Vec<NamedInstance>, Error> {
        let axes = self.axes()?;
        let font = self.font()?;
        Ok(font
            .named_instances()
            .iter()
            .map(|instance| NamedInstance {
                coords: axes.iter().map(|a| a.tag.clone()).zip(instance.user_coords()).collect(),
            })
            .collect())
    }

    /// `otf` or `ttf`, following the source file name.
    pub fn extension(&self) -> &'static str {
        match self.path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("otf") => "otf",
            _ => "ttf",
        }
    }
}
