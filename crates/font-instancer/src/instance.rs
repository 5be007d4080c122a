//! Variable font instantiation.

use read_fonts::{
    FontRef, TableProvider,
    tables::{fvar::Fvar, glyf::Glyph as ReadGlyph},
    types::{F2Dot14, Fixed, GlyphId, Tag},
};
use write_fonts::{
    FontBuilder,
    tables::glyf::{GlyfLocaBuilder, Glyph},
};

use crate::{
    AxisLocation,
    error::{Error, Result},
    glyphs::{GlyphDeltas, glyph_x_min, recompute_composite_bounds},
    metrics::{FontBounds, MetricDeltas, build_head, build_hhea, build_hmtx, build_os2, build_post},
};

/// Tables that only make sense in a variable font. None of them survive
/// instantiation.
pub const VARIATION_TABLES: [Tag; 8] = [
    Tag::new(b"fvar"),
    Tag::new(b"gvar"),
    Tag::new(b"avar"),
    Tag::new(b"cvar"),
    Tag::new(b"HVAR"),
    Tag::new(b"MVAR"),
    Tag::new(b"VVAR"),
    Tag::new(b"STAT"),
];

const REBUILT_TABLES: [Tag; 7] = [
    Tag::new(b"glyf"),
    Tag::new(b"loca"),
    Tag::new(b"hmtx"),
    Tag::new(b"head"),
    Tag::new(b"hhea"),
    Tag::new(b"OS/2"),
    Tag::new(b"post"),
];

// Any signature is invalidated by rewriting the font.
const DROPPED_TABLES: [Tag; 1] = [Tag::new(b"DSIG")];

/// Instantiate a variable font at the given user-space location.
///
/// Axes missing from `locations` stay at their default. The result is a
/// static TrueType font:
/// 1. glyph outlines and advance widths are moved by gvar,
/// 2. head/hhea bounds are recomputed and MVAR deltas baked into hhea, OS/2
///    and post,
/// 3. `usWeightClass`, `usWidthClass` and the macStyle bold bit follow the
///    `wght` and `wdth` values,
/// 4. every table in [`VARIATION_TABLES`] is removed.
///
/// Values outside an axis range are clamped by normalization.
///
/// # Errors
///
/// - `Error::NotVariableFont` if the font has no fvar table
/// - `Error::AxisNotFound` if a location names an axis the font lacks
/// - `Error::InvalidAxisValue` if a location value is not finite
/// - `Error::UnsupportedOutlines` if the font has CFF outlines (no glyf table)
/// - `Error::NoGvar` if the font has no gvar table
pub fn instantiate(data: &[u8], locations: &[AxisLocation]) -> Result<Vec<u8>> {
    let font = FontRef::new(data)?;

    let fvar = font.fvar().map_err(|_| Error::NotVariableFont)?;
    check_locations(&fvar, locations)?;

    let glyf = font.glyf().map_err(|_| Error::UnsupportedOutlines)?;
    let loca = font.loca(None).map_err(|_| Error::UnsupportedOutlines)?;
    let gvar = font.gvar().map_err(|_| Error::NoGvar)?;

    let avar = font.avar().ok();
    let mut coords = vec![F2Dot14::default(); fvar.axis_count() as usize];
    let user_coords = locations
        .iter()
        .map(|loc| (loc.tag, Fixed::from_f64(f64::from(loc.value))));
    fvar.user_to_normalized(avar.as_ref(), user_coords, &mut coords);

    let num_glyphs = u32::from(font.maxp()?.num_glyphs());
    let hmtx = font.hmtx()?;
    let hhea = font.hhea()?;
    let num_long_metrics = usize::from(hhea.number_of_h_metrics());

    let deltas = GlyphDeltas::new(&gvar, &coords);
    let mut glyphs: Vec<Glyph> = Vec::with_capacity(num_glyphs as usize);
    let mut advances: Vec<u16> = Vec::with_capacity(num_glyphs as usize);
    let mut original_lsbs: Vec<i16> = Vec::with_capacity(num_glyphs as usize);

    for gid in (0..num_glyphs).map(GlyphId::new) {
        // Phantom point 1 carries the advance width delta.
        let advance_delta = match gvar.phantom_point_deltas(&glyf, &loca, &coords, gid) {
            Ok(Some(phantom)) => phantom.get(1).map_or(0, |d| d.x.to_i32()),
            _ => 0,
        };
        let advance = i32::from(hmtx.advance(gid).unwrap_or(0)) + advance_delta;
        advances.push(advance.clamp(0, i32::from(u16::MAX)) as u16);
        original_lsbs.push(hmtx.side_bearing(gid).unwrap_or(0));

        glyphs.push(match loca.get_glyf(gid, &glyf) {
            Ok(Some(ReadGlyph::Simple(simple))) => deltas.simple(gid, &simple),
            Ok(Some(ReadGlyph::Composite(composite))) => deltas.composite(gid, &composite),
            _ => Glyph::Empty,
        });
    }

    recompute_composite_bounds(&mut glyphs);

    let mut glyf_builder = GlyfLocaBuilder::new();
    let mut bounds = FontBounds::default();
    let mut lsbs: Vec<i16> = Vec::with_capacity(glyphs.len());
    for ((glyph, &advance), &original_lsb) in glyphs.iter().zip(&advances).zip(&original_lsbs) {
        lsbs.push(glyph_x_min(glyph).unwrap_or(original_lsb));
        bounds.add(glyph, advance);
        glyf_builder.add_glyph(glyph)?;
    }

    let (new_glyf, new_loca, loca_format) = glyf_builder.build();
    let metric_deltas = MetricDeltas::new(font.mvar().ok(), &coords);

    let mut builder = FontBuilder::new();
    builder.add_table(&new_glyf)?;
    builder.add_table(&new_loca)?;
    builder.add_table(&build_hmtx(&advances, &lsbs, num_long_metrics))?;
    builder.add_table(&build_hhea(&hhea, &bounds, &metric_deltas))?;

    if let Ok(head) = font.head() {
        builder.add_table(&build_head(&head, &bounds, loca_format, locations))?;
    }
    if let Ok(os2) = font.os2() {
        builder.add_table(&build_os2(&os2, &metric_deltas, locations))?;
    }
    if let Ok(post) = font.post() {
        builder.add_table(&build_post(&post, &metric_deltas))?;
    }

    for record in font.table_directory.table_records() {
        let tag = record.tag();
        if !VARIATION_TABLES.contains(&tag)
            && !REBUILT_TABLES.contains(&tag)
            && !DROPPED_TABLES.contains(&tag)
            && let Some(data) = font.table_data(tag)
        {
            builder.add_raw(tag, data);
        }
    }

    Ok(builder.build())
}

fn check_locations(fvar: &Fvar, locations: &[AxisLocation]) -> Result<()> {
    let arrays = fvar.axis_instance_arrays()?;
    let axes = arrays.axes();

    for loc in locations {
        if !axes.iter().any(|axis| axis.axis_tag() == loc.tag) {
            return Err(Error::AxisNotFound(loc.tag.to_string()));
        }
        if !loc.value.is_finite() {
            return Err(Error::InvalidAxisValue { tag: loc.tag.to_string(), value: loc.value });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use read_fonts::{
        TableProvider,
        tables::{glyf::CompositeGlyphFlags, head::MacStyle},
    };

    use super::*;

    fn simple_points(font: &FontRef, gid: u32) -> Option<Vec<(i16, i16)>> {
        let glyf = font.glyf().ok()?;
        let loca = font.loca(None).ok()?;
        match loca.get_glyf(GlyphId::new(gid), &glyf).ok()?? {
            ReadGlyph::Simple(simple) => Some(simple.points().map(|p| (p.x, p.y)).collect()),
            ReadGlyph::Composite(_) => None,
        }
    }

    fn instance(wght: f32) -> Vec<u8> {
        instantiate(font_test_data::VAZIRMATN_VAR, &[AxisLocation::new("wght", wght)]).unwrap()
    }

    #[test]
    fn removes_every_variation_table() {
        let data = instance(400.0);
        let output = FontRef::new(&data).unwrap();
        for tag in VARIATION_TABLES {
            assert!(output.table_data(tag).is_none(), "{tag} survived instancing");
        }
        assert!(output.glyf().is_ok());
        assert!(output.hmtx().is_ok());
    }

    #[test]
    fn preserves_glyph_count() {
        let input = FontRef::new(font_test_data::VAZIRMATN_VAR).unwrap();
        let data = instance(700.0);
        let output = FontRef::new(&data).unwrap();
        assert_eq!(input.maxp().unwrap().num_glyphs(), output.maxp().unwrap().num_glyphs());
    }

    #[test]
    fn outlines_and_advances_follow_weight() {
        let light = instance(100.0);
        let black = instance(900.0);
        let light = FontRef::new(&light).unwrap();
        let black = FontRef::new(&black).unwrap();

        let light_points = simple_points(&light, 1).unwrap();
        let black_points = simple_points(&black, 1).unwrap();
        assert_eq!(light_points.len(), black_points.len());
        assert_ne!(light_points, black_points);

        let gid = GlyphId::new(1);
        assert_ne!(light.hmtx().unwrap().advance(gid), black.hmtx().unwrap().advance(gid));
    }

    /// Component flags a font author sets, by glyph, for every composite.
    fn composite_flags(font: &FontRef) -> Vec<(u32, Vec<u16>, Vec<u8>)> {
        let settable = (CompositeGlyphFlags::ROUND_XY_TO_GRID
            | CompositeGlyphFlags::USE_MY_METRICS
            | CompositeGlyphFlags::OVERLAP_COMPOUND
            | CompositeGlyphFlags::SCALED_COMPONENT_OFFSET
            | CompositeGlyphFlags::UNSCALED_COMPONENT_OFFSET)
            .bits();
        let glyf = font.glyf().unwrap();
        let loca = font.loca(None).unwrap();
        (0..u32::from(font.maxp().unwrap().num_glyphs()))
            .filter_map(|gid| match loca.get_glyf(GlyphId::new(gid), &glyf).ok()?? {
                ReadGlyph::Composite(composite) => {
                    let flags = composite.components().map(|c| c.flags.bits() & settable).collect();
                    let instructions = composite.instructions().unwrap_or_default().to_vec();
                    Some((gid, flags, instructions))
                }
                ReadGlyph::Simple(_) => None,
            })
            .collect()
    }

    #[test]
    fn keeps_component_flags_and_instructions() {
        let input = FontRef::new(font_test_data::VAZIRMATN_VAR).unwrap();
        let data = instance(400.0);
        let output = FontRef::new(&data).unwrap();

        let before = composite_flags(&input);
        assert!(before.iter().any(|(_, flags, _)| flags.iter().any(|f| *f != 0)));
        assert_eq!(composite_flags(&output), before);
    }

    #[test]
    fn lsb_equals_glyph_x_min() {
        let data = instance(500.0);
        let font = FontRef::new(&data).unwrap();
        let hmtx = font.hmtx().unwrap();

        for gid in 1..font.maxp().unwrap().num_glyphs().min(20) {
            let gid = u32::from(gid);
            if let Some(points) = simple_points(&font, gid)
                && !points.is_empty()
            {
                let x_min = points.iter().map(|p| p.0).min().unwrap();
                let lsb = hmtx.side_bearing(GlyphId::new(gid)).unwrap_or(0);
                assert_eq!(lsb, x_min, "glyph {gid}");
            }
        }
    }

    #[test]
    fn weight_drives_os2_and_mac_style() {
        let bold = instance(700.0);
        let bold = FontRef::new(&bold).unwrap();
        assert!(bold.head().unwrap().mac_style().contains(MacStyle::BOLD));
        if let Ok(os2) = bold.os2() {
            assert_eq!(os2.us_weight_class(), 700);
        }

        let regular = instance(400.0);
        let regular = FontRef::new(&regular).unwrap();
        assert!(!regular.head().unwrap().mac_style().contains(MacStyle::BOLD));
        if let Ok(os2) = regular.os2() {
            assert_eq!(os2.us_weight_class(), 400);
        }
    }

    #[test]
    fn empty_location_pins_to_defaults() {
        let data = instantiate(font_test_data::VAZIRMATN_VAR, &[]).unwrap();
        let output = FontRef::new(&data).unwrap();
        assert!(output.fvar().is_err());
    }

    #[test]
    fn rejects_unknown_axis() {
        let result =
            instantiate(font_test_data::VAZIRMATN_VAR, &[AxisLocation::new("opsz", 14.0)]);
        assert!(matches!(result, Err(Error::AxisNotFound(tag)) if tag == "opsz"));
    }

    #[test]
    fn rejects_non_finite_value() {
        let result =
            instantiate(font_test_data::VAZIRMATN_VAR, &[AxisLocation::new("wght", f32::NAN)]);
        assert!(matches!(result, Err(Error::InvalidAxisValue { .. })));
    }

    #[test]
    fn rejects_cff_font() {
        let result = instantiate(
            font_test_data::CANTARELL_VF_TRIMMED,
            &[AxisLocation::new("wght", 700.0)],
        );
        assert!(matches!(result, Err(Error::UnsupportedOutlines)));
    }

    #[test]
    fn rejects_non_variable_font() {
        let result = instantiate(font_test_data::SIMPLE_GLYF, &[AxisLocation::new("wght", 400.0)]);
        assert!(matches!(result, Err(Error::NotVariableFont)));
    }
}
