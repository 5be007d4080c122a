//! Axis tags, font-declared axes and resolved coordinates.

use std::fmt;

use font_instancer::AxisLocation;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Identifier of one design-space axis (`wght`, `opsz`, ...).
///
/// One to four printable ASCII characters. Trailing spaces are not part of
/// the stored form, so `"ABC "` read from a font equals `"ABC"` from a
/// configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AxisTag(String);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid axis tag '{0}': expected 1 to 4 printable ASCII characters")]
pub struct InvalidAxisTag(pub String);

impl AxisTag {
    pub fn new(tag: &str) -> Result<Self, InvalidAxisTag> {
        let trimmed = tag.trim_end_matches(' ');
        let valid = !trimmed.is_empty()
            && trimmed.len() <= 4
            && trimmed.bytes().all(|b| (0x20..=0x7e).contains(&b));
        if valid {
            Ok(Self(trimmed.to_string()))
        } else {
            Err(InvalidAxisTag(tag.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for AxisTag {
    type Error = InvalidAxisTag;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<AxisTag> for String {
    fn from(tag: AxisTag) -> Self {
        tag.0
    }
}

impl fmt::Display for AxisTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One axis as declared by the font's `fvar` table.
#[derive(Debug, Clone, PartialEq)]
pub struct FontAxis {
    pub tag: AxisTag,
    pub min: f32,
    pub default: f32,
    pub max: f32,
}

/// Font-declared default for every axis, in `fvar` order.
pub type FontDefaults = IndexMap<AxisTag, f32>;

pub fn font_defaults(axes: &[FontAxis]) -> FontDefaults {
    axes.iter().map(|axis| (axis.tag.clone(), axis.default)).collect()
}

/// A complete location: one concrete value for every axis of the font.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EffectiveCoordinate(IndexMap<AxisTag, f32>);

impl EffectiveCoordinate {
    pub(crate) fn new(values: IndexMap<AxisTag, f32>) -> Self {
        Self(values)
    }

    pub fn get(&self, tag: &str) -> Option<f32> {
        self.0
            .iter()
            .find(|(axis, _)| axis.as_str() == tag)
            .map(|(_, value)| *value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AxisTag, f32)> {
        self.0.iter().map(|(tag, value)| (tag, *value))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The coordinate in the form the instancer consumes.
    pub fn locations(&self) -> Vec<AxisLocation> {
        self.iter()
            .map(|(tag, value)| AxisLocation::new(tag.as_str(), value))
            .collect()
    }
}

impl fmt::Display for EffectiveCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (tag, value)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{tag}={value}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_registered_and_short_tags() {
        assert_eq!(AxisTag::new("wght").unwrap().as_str(), "wght");
        assert_eq!(AxisTag::new("ABC ").unwrap().as_str(), "ABC");
        assert_eq!(AxisTag::new("ab").unwrap(), AxisTag::new("ab  ").unwrap());
    }

    #[test]
    fn rejects_malformed_tags() {
        assert!(AxisTag::new("").is_err());
        assert!(AxisTag::new("    ").is_err());
        assert!(AxisTag::new("weight").is_err());
        assert!(AxisTag::new("wé").is_err());
    }

    #[test]
    fn coordinate_displays_in_axis_order() {
        let coordinate = EffectiveCoordinate::new(IndexMap::from([
            (AxisTag::new("wght").unwrap(), 700.0),
            (AxisTag::new("opsz").unwrap(), 16.5),
        ]));
        assert_eq!(coordinate.to_string(), "wght=700, opsz=16.5");
        assert_eq!(coordinate.get("opsz"), Some(16.5));
    }

    #[test]
    fn coordinate_converts_to_locations() {
        let coordinate =
            EffectiveCoordinate::new(IndexMap::from([(AxisTag::new("wdth").unwrap(), 75.0)]));
        let locations = coordinate.locations();
        assert_eq!(locations, vec![AxisLocation::new("wdth", 75.0)]);
    }
}
