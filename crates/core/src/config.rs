//! The JSON configuration shared by `vf-dump-config` and `vf-generate`.

use std::{
    fmt,
    hash::Hash,
    marker::PhantomData,
    ops::Deref,
    path::{Path, PathBuf},
};

use indexmap::IndexMap;
use serde::{
    Deserialize, Deserializer, Serialize,
    de::{Error as _, MapAccess, Visitor},
};
use serde_json::ser::{PrettyFormatter, Serializer};

use crate::{
    axis::{AxisTag, FontAxis},
    error::Error,
    io::{read_file, write_atomically},
};

/// A global axis value. `null` in JSON means "use the font default".
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "Option<f32>", into = "Option<f32>")]
pub enum GlobalAxisValue {
    #[default]
    Unset,
    Set(f32),
}

impl From<Option<f32>> for GlobalAxisValue {
    fn from(value: Option<f32>) -> Self {
        value.map_or(Self::Unset, Self::Set)
    }
}

impl From<GlobalAxisValue> for Option<f32> {
    fn from(value: GlobalAxisValue) -> Self {
        match value {
            GlobalAxisValue::Unset => None,
            GlobalAxisValue::Set(v) => Some(v),
        }
    }
}

pub type GlobalAxes = IndexMap<AxisTag, GlobalAxisValue>;

/// Axis values one variant sets explicitly. Duplicate tags are rejected.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct AxisOverrides(IndexMap<AxisTag, f32>);

impl AxisOverrides {
    pub fn new(values: IndexMap<AxisTag, f32>) -> Self {
        Self(values)
    }
}

impl Deref for AxisOverrides {
    type Target = IndexMap<AxisTag, f32>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<'de> Deserialize<'de> for AxisOverrides {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        unique_map(deserializer).map(Self)
    }
}

impl FromIterator<(AxisTag, f32)> for AxisOverrides {
    fn from_iter<I: IntoIterator<Item = (AxisTag, f32)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

pub type Variants = IndexMap<String, AxisOverrides>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Configuration {
    #[serde(rename = "$schema", default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    pub file: PathBuf,
    pub font_name: String,
    #[serde(deserialize_with = "unique_map")]
    pub axes: GlobalAxes,
    #[serde(deserialize_with = "unique_map")]
    pub variants: Variants,
}

/// Something suspicious in a configuration that does not stop generation.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigWarning {
    /// The font declares an axis the configuration's `axes` omits.
    MissingGlobalAxis(AxisTag),
    /// `null` globally and never overridden: every variant gets the default.
    UnusedGlobalAxis(AxisTag),
    /// A variant that overrides nothing.
    EmptyVariant(String),
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingGlobalAxis(tag) => {
                write!(f, "font axis '{tag}' is missing from \"axes\"")
            }
            Self::UnusedGlobalAxis(tag) => write!(
                f,
                "axis '{tag}' is null and never overridden; every variant uses the font default"
            ),
            Self::EmptyVariant(name) => {
                write!(f, "variant \"{name}\" has no overrides and inherits every axis")
            }
        }
    }
}

impl Configuration {
    /// A fresh configuration for a font: every axis unset, no variants.
    pub fn for_font(file: PathBuf, font_name: String, axes: &[FontAxis]) -> Self {
        Self {
            schema: None,
            file,
            font_name,
            axes: axes.iter().map(|axis| (axis.tag.clone(), GlobalAxisValue::Unset)).collect(),
            variants: Variants::new(),
        }
    }

    pub fn load(path: &Path) -> Result<Self, Error> {
        let data = read_file(path)?;
        serde_json::from_slice(&data)
            .map_err(|source| Error::ParseConfig { path: path.to_path_buf(), source })
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Pretty-printed JSON with four-space indentation.
    pub fn to_json(&self) -> Result<String, Error> {
        let mut buf = Vec::new();
        let mut serializer =
            Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
        self.serialize(&mut serializer).map_err(Error::SerializeConfig)?;
        buf.push(b'\n');
        // serde_json only emits UTF-8.
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    pub fn save(&self, path: &Path) -> Result<(), Error> {
        let json = self.to_json()?;
        write_atomically(path, json.as_bytes())
            .map_err(|source| Error::Write { path: path.to_path_buf(), source })
    }

    /// Locate the source font.
    ///
    /// Absolute paths are used as-is. A relative path is tried against the
    /// working directory first, then against the directory holding the
    /// configuration file.
    pub fn font_path(&self, config_path: &Path) -> PathBuf {
        if self.file.is_absolute() || self.file.exists() {
            return self.file.clone();
        }
        match config_path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => {
                let candidate = dir.join(&self.file);
                if candidate.exists() { candidate } else { self.file.clone() }
            }
            _ => self.file.clone(),
        }
    }

    /// Validate the configuration against the axes the font declares.
    ///
    /// Unknown global tags and an empty variant list are fatal. Everything
    /// else is returned as warnings. Unknown override tags are left to the
    /// resolver so they only fail their own variant.
    pub fn check_against(&self, font_axes: &[FontAxis]) -> Result<Vec<ConfigWarning>, Error> {
        let declared = |tag: &AxisTag| font_axes.iter().any(|axis| &axis.tag == tag);

        let unknown: Vec<AxisTag> = self.axes.keys().filter(|tag| !declared(tag)).cloned().collect();
        if !unknown.is_empty() {
            return Err(Error::UnknownGlobalAxes { tags: unknown });
        }
        if self.variants.is_empty() {
            return Err(Error::NoVariants);
        }

        let mut warnings = Vec::new();
        for axis in font_axes {
            if !self.axes.contains_key(&axis.tag) {
                warnings.push(ConfigWarning::MissingGlobalAxis(axis.tag.clone()));
            }
        }
        for (tag, value) in &self.axes {
            let overridden = self.variants.values().any(|o| o.contains_key(tag));
            if *value == GlobalAxisValue::Unset && !overridden {
                warnings.push(ConfigWarning::UnusedGlobalAxis(tag.clone()));
            }
        }
        for (name, overrides) in &self.variants {
            if overrides.is_empty() {
                warnings.push(ConfigWarning::EmptyVariant(name.clone()));
            }
        }
        Ok(warnings)
    }
}

/// Deserialize a JSON object into an [`IndexMap`], rejecting repeated keys.
fn unique_map<'de, D, K, V>(deserializer: D) -> Result<IndexMap<K, V>, D::Error>
where
    D: Deserializer<'de>,
    K: Deserialize<'de> + Eq + Hash + fmt::Display,
    V: Deserialize<'de>,
{
    struct UniqueMapVisitor<K, V>(PhantomData<(K, V)>);

    impl<'de, K, V> Visitor<'de> for UniqueMapVisitor<K, V>
    where
        K: Deserialize<'de> + Eq + Hash + fmt::Display,
        V: Deserialize<'de>,
    {
        type Value = IndexMap<K, V>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a JSON object with unique keys")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
            let mut map = IndexMap::with_capacity(access.size_hint().unwrap_or(0));
            while let Some((key, value)) = access.next_entry::<K, V>()? {
                if map.contains_key(&key) {
                    return Err(A::Error::custom(format_args!("duplicate key \"{key}\"")));
                }
                map.insert(key, value);
            }
            Ok(map)
        }
    }

    deserializer.deserialize_map(UniqueMapVisitor(PhantomData))
}
