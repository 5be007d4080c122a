//! Font-wide metrics of an instance: hmtx, head bounds, and the MVAR-driven
//! fields of hhea, OS/2 and post.

use read_fonts::{
    tables::{
        head::{Head, MacStyle},
        hhea::Hhea,
        mvar::{Mvar, tags as mvar},
        os2::Os2,
        post::Post,
    },
    types::{F2Dot14, Tag},
};
use write_fonts::{
    from_obj::ToOwnedTable,
    tables::{
        glyf::{Bbox, Glyph},
        head::Head as WriteHead,
        hhea::Hhea as WriteHhea,
        hmtx::{Hmtx, LongMetric},
        loca::LocaFormat,
        os2::Os2 as WriteOs2,
        post::Post as WritePost,
    },
};

use crate::{AxisLocation, glyphs::clamp_i16};

const WGHT: Tag = Tag::new(b"wght");
const WDTH: Tag = Tag::new(b"wdth");

/// Weight at or above which `head.macStyle` carries the bold bit.
const BOLD_WEIGHT: f32 = 700.0;

/// Extremes accumulated over every instanced glyph.
#[derive(Debug, Default)]
pub(crate) struct FontBounds {
    bbox: Option<Bbox>,
    min_left_side_bearing: Option<i16>,
    min_right_side_bearing: Option<i16>,
    x_max_extent: Option<i16>,
    advance_width_max: u16,
}

impl FontBounds {
    pub(crate) fn add(&mut self, glyph: &Glyph, advance: u16) {
        self.advance_width_max = self.advance_width_max.max(advance);

        let bbox = match glyph {
            Glyph::Simple(simple) => simple.bbox,
            Glyph::Composite(composite) => composite.bbox,
            Glyph::Empty => return,
        };
        if bbox.x_min == 0 && bbox.x_max == 0 && bbox.y_min == 0 && bbox.y_max == 0 {
            return;
        }

        self.bbox = Some(match self.bbox {
            None => bbox,
            Some(acc) => Bbox {
                x_min: acc.x_min.min(bbox.x_min),
                y_min: acc.y_min.min(bbox.y_min),
                x_max: acc.x_max.max(bbox.x_max),
                y_max: acc.y_max.max(bbox.y_max),
            },
        });

        let lsb = bbox.x_min;
        let width = bbox.x_max.saturating_sub(bbox.x_min);
        let rsb = clamp_i16(i32::from(advance)).saturating_sub(lsb).saturating_sub(width);
        let extent = lsb.saturating_add(width);

        self.min_left_side_bearing = Some(self.min_left_side_bearing.map_or(lsb, |v| v.min(lsb)));
        self.min_right_side_bearing = Some(self.min_right_side_bearing.map_or(rsb, |v| v.min(rsb)));
        self.x_max_extent = Some(self.x_max_extent.map_or(extent, |v| v.max(extent)));
    }

    fn bbox(&self) -> Bbox {
        self.bbox.unwrap_or(Bbox { x_min: 0, y_min: 0, x_max: 0, y_max: 0 })
    }
}

/// MVAR deltas at one normalized location. Fonts without MVAR contribute 0.
pub(crate) struct MetricDeltas<'a> {
    mvar: Option<Mvar<'a>>,
    coords: &'a [F2Dot14],
}

impl<'a> MetricDeltas<'a> {
    pub(crate) fn new(mvar: Option<Mvar<'a>>, coords: &'a [F2Dot14]) -> Self {
        Self { mvar, coords }
    }

    fn delta(&self, tag: Tag) -> i32 {
        self.mvar
            .as_ref()
            .and_then(|m| m.metric_delta(tag, self.coords).ok())
            .map(|delta| delta.to_i32())
            .unwrap_or(0)
    }

    fn apply(&self, tag: Tag, value: i16) -> i16 {
        clamp_i16(i32::from(value) + self.delta(tag))
    }
}

pub(crate) fn build_hmtx(advances: &[u16], lsbs: &[i16], num_long_metrics: usize) -> Hmtx {
    let split = num_long_metrics.min(advances.len());
    let h_metrics = advances[..split]
        .iter()
        .zip(&lsbs[..split])
        .map(|(&advance, &side_bearing)| LongMetric { advance, side_bearing })
        .collect();

    Hmtx {
        h_metrics,
        left_side_bearings: lsbs[split..].to_vec(),
    }
}

fn weight_of(locations: &[AxisLocation]) -> Option<f32> {
    locations.iter().find(|loc| loc.tag == WGHT).map(|loc| loc.value)
}

pub(crate) fn build_head(
    original: &Head,
    bounds: &FontBounds,
    loca_format: LocaFormat,
    locations: &[AxisLocation],
) -> WriteHead {
    let mut head: WriteHead = original.to_owned_table();
    let bbox = bounds.bbox();
    head.x_min = bbox.x_min;
    head.y_min = bbox.y_min;
    head.x_max = bbox.x_max;
    head.y_max = bbox.y_max;
    head.index_to_loc_format = match loca_format {
        LocaFormat::Short => 0,
        LocaFormat::Long => 1,
    };

    if let Some(weight) = weight_of(locations) {
        if weight >= BOLD_WEIGHT {
            head.mac_style.insert(MacStyle::BOLD);
        } else {
            head.mac_style.remove(MacStyle::BOLD);
        }
    }

    head
}

pub(crate) fn build_hhea(original: &Hhea, bounds: &FontBounds, deltas: &MetricDeltas) -> WriteHhea {
    let mut hhea: WriteHhea = original.to_owned_table();

    hhea.ascender = deltas.apply(mvar::HASC, original.ascender().to_i16()).into();
    hhea.descender = deltas.apply(mvar::HDSC, original.descender().to_i16()).into();
    hhea.line_gap = deltas.apply(mvar::HLGP, original.line_gap().to_i16()).into();
    hhea.caret_slope_rise = deltas.apply(mvar::HCRS, original.caret_slope_rise());
    hhea.caret_slope_run = deltas.apply(mvar::HCRN, original.caret_slope_run());
    hhea.caret_offset = deltas.apply(mvar::HCOF, original.caret_offset());

    hhea.advance_width_max = bounds.advance_width_max.into();
    hhea.min_left_side_bearing = bounds.min_left_side_bearing.unwrap_or(0).into();
    hhea.min_right_side_bearing = bounds.min_right_side_bearing.unwrap_or(0).into();
    hhea.x_max_extent = bounds.x_max_extent.unwrap_or(0).into();

    hhea
}

/// Map a `wdth` percentage onto the nine `usWidthClass` steps, using the
/// midpoints between the OpenType reference widths as boundaries.
pub(crate) fn width_class(wdth: f32) -> u16 {
    const UPPER_BOUNDS: [f32; 8] = [56.25, 68.75, 81.25, 93.75, 106.25, 118.75, 137.5, 175.0];
    UPPER_BOUNDS
        .iter()
        .position(|&bound| wdth <= bound)
        .map_or(9, |i| i as u16 + 1)
}

pub(crate) fn build_os2(
    original: &Os2,
    deltas: &MetricDeltas,
    locations: &[AxisLocation],
) -> WriteOs2 {
    let mut os2: WriteOs2 = original.to_owned_table();

    if let Some(weight) = weight_of(locations) {
        os2.us_weight_class = weight.round().clamp(1.0, 1000.0) as u16;
    }
    if let Some(wdth) = locations.iter().find(|loc| loc.tag == WDTH) {
        os2.us_width_class = width_class(wdth.value);
    }

    os2.y_strikeout_size = deltas.apply(mvar::STRS, original.y_strikeout_size());
    os2.y_strikeout_position = deltas.apply(mvar::STRO, original.y_strikeout_position());
    os2.s_typo_ascender = deltas.apply(mvar::HASC, original.s_typo_ascender());
    os2.s_typo_descender = deltas.apply(mvar::HDSC, original.s_typo_descender());
    os2.s_typo_line_gap = deltas.apply(mvar::HLGP, original.s_typo_line_gap());

    os2.y_subscript_x_offset = deltas.apply(mvar::SBXO, original.y_subscript_x_offset());
    os2.y_subscript_y_offset = deltas.apply(mvar::SBYO, original.y_subscript_y_offset());
    os2.y_subscript_x_size = deltas.apply(mvar::SBXS, original.y_subscript_x_size());
    os2.y_subscript_y_size = deltas.apply(mvar::SBYS, original.y_subscript_y_size());
    os2.y_superscript_x_offset = deltas.apply(mvar::SPXO, original.y_superscript_x_offset());
    os2.y_superscript_y_offset = deltas.apply(mvar::SPYO, original.y_superscript_y_offset());
    os2.y_superscript_x_size = deltas.apply(mvar::SPXS, original.y_superscript_x_size());
    os2.y_superscript_y_size = deltas.apply(mvar::SPYS, original.y_superscript_y_size());

    os2.sx_height = original.sx_height().map(|v| deltas.apply(mvar::XHGT, v));
    os2.s_cap_height = original.s_cap_height().map(|v| deltas.apply(mvar::CPHT, v));

    os2
}

pub(crate) fn build_post(original: &Post, deltas: &MetricDeltas) -> WritePost {
    let mut post: WritePost = original.to_owned_table();
    post.underline_position =
        deltas.apply(mvar::UNDO, original.underline_position().to_i16()).into();
    post.underline_thickness =
        deltas.apply(mvar::UNDS, original.underline_thickness().to_i16()).into();
    post
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn width_class_follows_reference_widths() {
        assert_eq!(width_class(50.0), 1);
        assert_eq!(width_class(75.0), 3);
        assert_eq!(width_class(100.0), 5);
        assert_eq!(width_class(125.0), 7);
        assert_eq!(width_class(200.0), 9);
    }

    #[test]
    fn hmtx_splits_long_metrics() {
        let hmtx = build_hmtx(&[500, 600, 600], &[10, 20, 30], 2);
        assert_eq!(hmtx.h_metrics.len(), 2);
        assert_eq!(hmtx.h_metrics[1].advance, 600);
        assert_eq!(hmtx.left_side_bearings, vec![30]);
    }

    #[test]
    fn empty_bounds_are_zero() {
        let bounds = FontBounds::default();
        let bbox = bounds.bbox();
        assert_eq!((bbox.x_min, bbox.y_max), (0, 0));
        assert_eq!(bounds.advance_width_max, 0);
    }
}
