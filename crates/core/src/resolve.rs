//! Per-axis precedence: variant override, then global value, then font default.

use indexmap::IndexMap;

use crate::{
    axis::{AxisTag, EffectiveCoordinate, FontDefaults},
    config::{AxisOverrides, GlobalAxes, GlobalAxisValue},
    error::VariantError,
};

/// Compute the full coordinate of one variant.
///
/// For every axis in `font_defaults` (in that order):
/// 1. an override in `overrides` wins,
/// 2. otherwise a set value in `global`,
/// 3. otherwise, if `global` lists the axis as unset, the font default.
///
/// An axis absent from both `overrides` and `global` has no source and
/// yields [`VariantError::Unresolvable`]. Override tags the font does not
/// declare are reported first, all at once.
pub fn resolve(
    font_defaults: &FontDefaults,
    global: &GlobalAxes,
    overrides: &AxisOverrides,
) -> Result<EffectiveCoordinate, VariantError> {
    let unknown: Vec<AxisTag> =
        overrides.keys().filter(|tag| !font_defaults.contains_key(*tag)).cloned().collect();
    if !unknown.is_empty() {
        return Err(VariantError::UnknownAxes { tags: unknown });
    }

    let mut values = IndexMap::with_capacity(font_defaults.len());
    for (tag, &default) in font_defaults {
        let value = match (overrides.get(tag), global.get(tag)) {
            (Some(&value), _) => value,
            (None, Some(GlobalAxisValue::Set(value))) => *value,
            (None, Some(GlobalAxisValue::Unset)) => default,
            (None, None) => return Err(VariantError::Unresolvable { tag: tag.clone() }),
        };
        values.insert(tag.clone(), value);
    }
    Ok(EffectiveCoordinate::new(values))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(s: &str) -> AxisTag {
        AxisTag::new(s).unwrap()
    }

    fn defaults() -> FontDefaults {
        FontDefaults::from([(tag("wght"), 400.0), (tag("opsz"), 14.0)])
    }

    fn global(entries: &[(&str, Option<f32>)]) -> GlobalAxes {
        entries.iter().map(|(t, v)| (tag(t), GlobalAxisValue::from(*v))).collect()
    }

    fn overrides(entries: &[(&str, f32)]) -> AxisOverrides {
        entries.iter().map(|(t, v)| (tag(t), *v)).collect()
    }

    #[test]
    fn override_beats_global() {
        let coord = resolve(
            &defaults(),
            &global(&[("wght", Some(500.0)), ("opsz", Some(16.0))]),
            &overrides(&[("wght", 700.0)]),
        )
        .unwrap();
        assert_eq!(coord.get("wght"), Some(700.0));
        assert_eq!(coord.get("opsz"), Some(16.0));
    }

    #[test]
    fn unset_global_falls_back_to_font_default() {
        let coord =
            resolve(&defaults(), &global(&[("wght", None), ("opsz", None)]), &overrides(&[]))
                .unwrap();
        assert_eq!(coord.get("wght"), Some(400.0));
        assert_eq!(coord.get("opsz"), Some(14.0));
    }

    #[test]
    fn worked_example() {
        let global = global(&[("wght", None), ("opsz", Some(16.0))]);
        let regular = resolve(&defaults(), &global, &overrides(&[("wght", 400.0)])).unwrap();
        let bold = resolve(&defaults(), &global, &overrides(&[("wght", 700.0)])).unwrap();
        assert_eq!(regular.to_string(), "wght=400, opsz=16");
        assert_eq!(bold.to_string(), "wght=700, opsz=16");
    }

    #[test]
    fn axis_missing_from_global_is_unresolvable() {
        let result =
            resolve(&defaults(), &global(&[("wght", None)]), &overrides(&[("wght", 700.0)]));
        assert!(matches!(result, Err(VariantError::Unresolvable { tag: t }) if t == tag("opsz")));
    }

    #[test]
    fn override_covers_axis_missing_from_global() {
        let coord = resolve(
            &defaults(),
            &global(&[("wght", None)]),
            &overrides(&[("wght", 700.0), ("opsz", 12.0)]),
        )
        .unwrap();
        assert_eq!(coord.get("opsz"), Some(12.0));
    }

    #[test]
    fn unknown_override_tags_are_reported_together() {
        let result = resolve(
            &defaults(),
            &global(&[("wght", None), ("opsz", None)]),
            &overrides(&[("slnt", -5.0), ("wght", 700.0), ("GRAD", 1.0)]),
        );
        match result {
            Err(VariantError::UnknownAxes { tags }) => {
                assert_eq!(tags, vec![tag("slnt"), tag("GRAD")]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn output_follows_font_axis_order_and_is_complete() {
        let coord = resolve(
            &defaults(),
            &global(&[("opsz", Some(20.0)), ("wght", None)]),
            &overrides(&[("opsz", 10.0)]),
        )
        .unwrap();
        let tags: Vec<_> = coord.iter().map(|(t, _)| t.as_str()).collect();
        assert_eq!(tags, ["wght", "opsz"]);
        assert_eq!(coord.len(), defaults().len());
    }

    #[test]
    fn is_deterministic() {
        let global = global(&[("wght", Some(300.0)), ("opsz", None)]);
        let overrides = overrides(&[("opsz", 24.0)]);
        let first = resolve(&defaults(), &global, &overrides).unwrap();
        let second = resolve(&defaults(), &global, &overrides).unwrap();
        assert_eq!(first, second);
    }
}
