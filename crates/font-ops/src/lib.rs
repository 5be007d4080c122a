//! Whole-font rewriting and name table editing for static instances.

use read_fonts::{FontRef, ReadError, TableProvider, types::NameId};
use write_fonts::{
    BuilderError, FontBuilder,
    tables::name::{Name, NameRecord},
};

const PLATFORM_WINDOWS: u16 = 3;
const ENCODING_UNICODE_BMP: u16 = 1;
const LANGUAGE_EN_US: u16 = 0x409;

const FAMILY: u16 = 1;
const FULL_NAME: u16 = 4;
const POSTSCRIPT_NAME: u16 = 6;
const TYPOGRAPHIC_FAMILY: u16 = 16;
const TYPOGRAPHIC_SUBFAMILY: u16 = 17;

/// Name IDs every instance carries on the Windows English record set.
const INSTANCE_NAME_IDS: [u16; 5] =
    [FAMILY, FULL_NAME, POSTSCRIPT_NAME, TYPOGRAPHIC_FAMILY, TYPOGRAPHIC_SUBFAMILY];

/// PostScript names are limited to 63 printable ASCII characters.
const POSTSCRIPT_MAX_LEN: usize = 63;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to parse font: {0}")]
    Parse(#[from] ReadError),

    #[error("failed to build font: {0}")]
    Build(#[from] BuilderError),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Rewrite font data by applying a transformation function.
///
/// Copies all tables from the source font, then calls `f` to modify or add
/// tables. Tables added by `f` replace the copied ones.
pub fn rewrite_font(
    data: &[u8],
    f: impl FnOnce(&FontRef, &mut FontBuilder) -> Result<()>,
) -> Result<Vec<u8>> {
    let font = FontRef::new(data)?;
    let mut builder = FontBuilder::new();

    for record in font.table_directory.table_records() {
        let tag = record.tag();
        if let Some(table_data) = font.table_data(tag) {
            builder.add_raw(tag, table_data);
        }
    }

    f(&font, &mut builder)?;
    Ok(builder.build())
}

/// Names of one static instance: the configured family plus a variant
/// (style) name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceNames {
    pub family: String,
    pub style: String,
}

impl InstanceNames {
    pub fn new(family: impl Into<String>, style: impl Into<String>) -> Self {
        Self { family: family.into(), style: style.into() }
    }

    /// `"{family} {style}"`, used for both name ID 1 and name ID 4.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.family, self.style)
    }

    pub fn postscript_name(&self) -> String {
        let raw = format!("{}-{}", self.family, self.style);
        raw.chars()
            .filter(|c| c.is_ascii_graphic() && !"[](){}<>/%".contains(*c))
            .take(POSTSCRIPT_MAX_LEN)
            .collect()
    }

    fn value_for(&self, name_id: u16) -> Option<String> {
        match name_id {
            FAMILY | FULL_NAME => Some(self.full_name()),
            POSTSCRIPT_NAME => Some(self.postscript_name()),
            TYPOGRAPHIC_FAMILY => Some(self.family.clone()),
            TYPOGRAPHIC_SUBFAMILY => Some(self.style.clone()),
            _ => None,
        }
    }
}

/// Rename a font as one static instance.
///
/// Every existing record for name IDs 1, 4, 6, 16 and 17 is rewritten on
/// every platform. Windows English records are added for any of those IDs
/// the font lacks, so each instance ends up named the same way.
pub fn apply_instance_names(data: &[u8], names: &InstanceNames) -> Result<Vec<u8>> {
    rewrite_font(data, |font, builder| {
        // (platform, encoding, language, name id) -> string
        let mut entries: Vec<((u16, u16, u16, u16), String)> = Vec::new();

        if let Ok(name) = font.name() {
            for record in name.name_record() {
                let name_id = record.name_id().to_u16();
                let Ok(current) = record.string(name.string_data()) else {
                    continue;
                };
                let value = names
                    .value_for(name_id)
                    .unwrap_or_else(|| current.chars().collect());
                let key = (
                    record.platform_id(),
                    record.encoding_id(),
                    record.language_id(),
                    name_id,
                );
                entries.push((key, value));
            }
        }

        for name_id in INSTANCE_NAME_IDS {
            let key = (PLATFORM_WINDOWS, ENCODING_UNICODE_BMP, LANGUAGE_EN_US, name_id);
            if !entries.iter().any(|(existing, _)| *existing == key)
                && let Some(value) = names.value_for(name_id)
            {
                entries.push((key, value));
            }
        }

        entries.sort_by_key(|(key, _)| *key);
        let records = entries
            .into_iter()
            .map(|((platform, encoding, language, name_id), value)| {
                NameRecord::new(platform, encoding, language, NameId::new(name_id), value.into())
            })
            .collect();

        builder.add_table(&Name::new(records))?;
        Ok(())
    })
}
