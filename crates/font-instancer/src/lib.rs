//! # Font Instancer
//!
//! Pin a TrueType variable font to a single location in its design space and
//! emit a static font with every variation table removed.
//!
//! ## Example
//!
//! ```no_run
//! use font_instancer::{instantiate, AxisLocation};
//!
//! let vf_data = std::fs::read("variable.ttf").unwrap();
//! let location = [
//!     AxisLocation::new("wght", 700.0),
//!     AxisLocation::new("opsz", 16.0),
//! ];
//! let static_font = instantiate(&vf_data, &location).unwrap();
//! std::fs::write("static.ttf", static_font).unwrap();
//! ```

mod error;
mod glyphs;
mod instance;
mod iup;
mod metrics;

pub use error::{Error, Result};
pub use instance::{VARIATION_TABLES, instantiate};
use read_fonts::types::Tag;

/// One axis of a location, in user-space units (`wght=700`, `opsz=16`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisLocation {
    pub tag: Tag,
    pub value: f32,
}

impl AxisLocation {
    /// Build a location from a tag string. Tags shorter than four bytes are
    /// padded with spaces, longer ones are truncated.
    ///
    /// ```
    /// use font_instancer::AxisLocation;
    /// let loc = AxisLocation::new("wght", 700.0);
    /// assert_eq!(loc.tag.to_string(), "wght");
    /// ```
    pub fn new(tag: &str, value: f32) -> Self {
        let mut tag_bytes = [b' '; 4];
        for (dst, src) in tag_bytes.iter_mut().zip(tag.as_bytes()) {
            *dst = *src;
        }
        Self { tag: Tag::new(&tag_bytes), value }
    }
}

impl From<(&str, f32)> for AxisLocation {
    fn from((tag, value): (&str, f32)) -> Self {
        Self::new(tag, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pads_short_tags() {
        let loc = AxisLocation::new("ab", 1.0);
        assert_eq!(loc.tag, Tag::new(b"ab  "));
    }

    #[test]
    fn converts_from_tuple() {
        let loc: AxisLocation = ("opsz", 14.0).into();
        assert_eq!(loc.tag, Tag::new(b"opsz"));
        assert_eq!(loc.value, 14.0);
    }
}
