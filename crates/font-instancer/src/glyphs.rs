//! Glyph outline instancing: gvar deltas applied to simple contours and
//! composite component offsets, plus bounding box recomputation.

use std::iter::repeat_n;

use kurbo::{Affine, Rect};
use read_fonts::{
    FontData, FontRead,
    tables::{
        glyf::{
            Anchor as ReadAnchor, CompositeGlyph as ReadCompositeGlyph, CompositeGlyphFlags,
            CurvePoint, SimpleGlyph as ReadSimpleGlyph,
        },
        gvar::Gvar,
    },
    types::{F2Dot14, Fixed, GlyphId, Point},
};
use write_fonts::{
    dump_table,
    tables::glyf::{
        Anchor, Bbox, Component, CompositeGlyph, Contour, Glyph, SimpleGlyph, Transform,
    },
};

use crate::iup::interpolate_untouched;

/// Four phantom points trail every glyph's outline in gvar.
pub(crate) const PHANTOM_POINTS: usize = 4;

pub(crate) fn clamp_i16(value: i32) -> i16 {
    value.clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16
}

fn round_to_i16(value: Fixed) -> i16 {
    clamp_i16(value.round().to_i32())
}

/// gvar deltas evaluated at one normalized location.
pub(crate) struct GlyphDeltas<'a> {
    gvar: &'a Gvar<'a>,
    coords: &'a [F2Dot14],
}

impl<'a> GlyphDeltas<'a> {
    pub(crate) fn new(gvar: &'a Gvar<'a>, coords: &'a [F2Dot14]) -> Self {
        Self { gvar, coords }
    }

    /// Move every point of a simple glyph to the instance location.
    pub(crate) fn simple(&self, gid: GlyphId, glyph: &ReadSimpleGlyph) -> Glyph {
        let num_points = glyph.num_points();
        if num_points == 0 {
            return Glyph::Empty;
        }

        let end_pts: Vec<usize> = glyph
            .end_pts_of_contours()
            .iter()
            .map(|end| usize::from(end.get()))
            .collect();

        // 16.16 accumulation keeps fractional deltas until the final rounding.
        let mut points: Vec<Point<Fixed>> = glyph
            .points()
            .map(|p| Point::new(Fixed::from_i32(p.x.into()), Fixed::from_i32(p.y.into())))
            .chain(repeat_n(Point::default(), PHANTOM_POINTS))
            .collect();
        let on_curve: Vec<bool> = glyph.points().map(|p| p.on_curve).collect();
        // Inferred deltas are always relative to the default outline.
        let original: Vec<Point<i32>> =
            points.iter().map(|p| Point::new(p.x.to_i32(), p.y.to_i32())).collect();

        if let Ok(Some(var_data)) = self.gvar.glyph_variation_data(gid) {
            for (tuple, scalar) in var_data.active_tuples_at(self.coords) {
                if tuple.has_deltas_for_all_points() {
                    for delta in tuple.deltas() {
                        if let Some(point) = points.get_mut(delta.position as usize) {
                            let scaled: Point<Fixed> = delta.apply_scalar(scalar);
                            point.x += scaled.x;
                            point.y += scaled.y;
                        }
                    }
                    continue;
                }

                let explicit = tuple
                    .deltas()
                    .map(|d| (usize::from(d.position), Point::new(d.x_delta, d.y_delta)));
                apply_sparse_tuple(&mut points, &original, &end_pts, explicit, scalar);
            }
        }

        let mut contours = Vec::with_capacity(end_pts.len());
        let mut start = 0;
        for &end in &end_pts {
            let contour: Vec<CurvePoint> = (start..=end)
                .map(|i| {
                    CurvePoint::new(round_to_i16(points[i].x), round_to_i16(points[i].y), on_curve[i])
                })
                .collect();
            contours.push(Contour::from(contour));
            start = end + 1;
        }

        let mut simple = SimpleGlyph {
            bbox: Bbox::default(),
            contours,
            instructions: glyph.instructions().to_vec(),
        };
        simple.recompute_bounding_box();
        Glyph::Simple(simple)
    }

    /// Move the offsets of a composite glyph's components. The bounding box
    /// is provisional until [`recompute_composite_bounds`] runs.
    pub(crate) fn composite(&self, gid: GlyphId, glyph: &ReadCompositeGlyph) -> Glyph {
        let components: Vec<_> = glyph.components().collect();
        if components.is_empty() {
            return Glyph::Empty;
        }

        let mut offsets: Vec<Point<Fixed>> = components
            .iter()
            .map(|c| match c.anchor {
                ReadAnchor::Offset { x, y } => {
                    Point::new(Fixed::from_i32(x.into()), Fixed::from_i32(y.into()))
                }
                ReadAnchor::Point { .. } => Point::default(),
            })
            .chain(repeat_n(Point::default(), PHANTOM_POINTS))
            .collect();

        if let Ok(Some(var_data)) = self.gvar.glyph_variation_data(gid) {
            for (tuple, scalar) in var_data.active_tuples_at(self.coords) {
                for delta in tuple.deltas() {
                    if let Some(offset) = offsets.get_mut(delta.position as usize) {
                        let scaled: Point<Fixed> = delta.apply_scalar(scalar);
                        offset.x += scaled.x;
                        offset.y += scaled.y;
                    }
                }
            }
        }

        let mut rebuilt = components.iter().zip(&offsets).map(|(comp, offset)| {
            let anchor = match comp.anchor {
                ReadAnchor::Offset { .. } => Anchor::Offset {
                    x: round_to_i16(offset.x),
                    y: round_to_i16(offset.y),
                },
                ReadAnchor::Point { base, component } => Anchor::Point { base, component },
            };
            let t = comp.transform;
            let transform = Transform { xx: t.xx, yx: t.yx, xy: t.xy, yy: t.yy };
            Component::new(comp.glyph, anchor, transform, comp.flags)
        });

        let Some(first) = rebuilt.next() else {
            return Glyph::Empty;
        };
        let provisional = Rect::new(
            f64::from(glyph.x_min()),
            f64::from(glyph.y_min()),
            f64::from(glyph.x_max()),
            f64::from(glyph.y_max()),
        );
        let mut composite = CompositeGlyph::new(first, provisional);
        for component in rebuilt {
            composite.add_component(component, Rect::ZERO);
        }
        let instructions = glyph.instructions().unwrap_or_default();
        Glyph::Composite(with_instructions(composite, instructions))
    }
}

/// Add one sparse tuple to `points`.
///
/// `explicit` carries the tuple's unscaled deltas by point index. Points it
/// does not mention are inferred from `original`, the default outline, and
/// every delta is then scaled by `scalar`.
fn apply_sparse_tuple(
    points: &mut [Point<Fixed>],
    original: &[Point<i32>],
    end_pts: &[usize],
    explicit: impl IntoIterator<Item = (usize, Point<i32>)>,
    scalar: Fixed,
) {
    let mut touched = vec![false; points.len()];
    let mut deltas = vec![Point::<i32>::default(); points.len()];
    for (idx, delta) in explicit {
        if let Some(slot) = deltas.get_mut(idx) {
            *slot = delta;
            touched[idx] = true;
        }
    }

    interpolate_untouched(&mut deltas, &touched, original, end_pts);

    for (point, delta) in points.iter_mut().zip(&deltas) {
        let scaled = Point::new(Fixed::from_i32(delta.x), Fixed::from_i32(delta.y)) * scalar;
        point.x += scaled.x;
        point.y += scaled.y;
    }
}

/// Attach hinting instructions to a rebuilt composite.
///
/// write-fonts only keeps composite instructions on glyphs parsed from
/// bytes, so the glyph is serialized, given the instructions and read back.
/// On any failure the glyph is returned without instructions.
fn with_instructions(composite: CompositeGlyph, instructions: &[u8]) -> CompositeGlyph {
    if instructions.is_empty() {
        return composite;
    }
    let Ok(len) = u16::try_from(instructions.len()) else {
        return composite;
    };
    let Ok(mut bytes) = dump_table(&composite) else {
        return composite;
    };
    let Some(at) = last_component_flags(&bytes) else {
        return composite;
    };

    let flags = u16::from_be_bytes([bytes[at], bytes[at + 1]])
        | CompositeGlyphFlags::WE_HAVE_INSTRUCTIONS.bits();
    bytes[at..at + 2].copy_from_slice(&flags.to_be_bytes());
    bytes.extend_from_slice(&len.to_be_bytes());
    bytes.extend_from_slice(instructions);

    CompositeGlyph::read(FontData::new(&bytes)).unwrap_or(composite)
}

/// Byte offset of the flags of the last component in a serialized composite.
fn last_component_flags(bytes: &[u8]) -> Option<usize> {
    // numberOfContours and the bounding box.
    let mut pos = 10;
    loop {
        let raw = u16::from_be_bytes([*bytes.get(pos)?, *bytes.get(pos + 1)?]);
        let has = |flag: CompositeGlyphFlags| raw & flag.bits() != 0;

        if !has(CompositeGlyphFlags::MORE_COMPONENTS) {
            return Some(pos);
        }
        // flags and glyph id
        let mut size = 4;
        size += if has(CompositeGlyphFlags::ARG_1_AND_2_ARE_WORDS) { 4 } else { 2 };
        size += if has(CompositeGlyphFlags::WE_HAVE_A_SCALE) {
            2
        } else if has(CompositeGlyphFlags::WE_HAVE_AN_X_AND_Y_SCALE) {
            4
        } else if has(CompositeGlyphFlags::WE_HAVE_A_TWO_BY_TWO) {
            8
        } else {
            0
        };
        pos += size;
    }
}

#[derive(Debug, Clone, Copy)]
enum Bounds {
    Empty,
    Known(Bbox),
    Pending,
}

const ZERO_BBOX: Bbox = Bbox { x_min: 0, y_min: 0, x_max: 0, y_max: 0 };

fn is_zero(bbox: &Bbox) -> bool {
    bbox.x_min == 0 && bbox.y_min == 0 && bbox.x_max == 0 && bbox.y_max == 0
}

/// Resolve composite bounding boxes from their (possibly nested) components.
///
/// Composites are revisited until every box whose components are known has
/// been computed; anything still pending afterwards (a component cycle) ends
/// up with a zero box.
pub(crate) fn recompute_composite_bounds(glyphs: &mut [Glyph]) {
    let mut bounds: Vec<Bounds> = glyphs
        .iter()
        .map(|glyph| match glyph {
            Glyph::Simple(simple) => Bounds::Known(simple.bbox),
            Glyph::Composite(_) => Bounds::Pending,
            Glyph::Empty => Bounds::Empty,
        })
        .collect();

    loop {
        let mut progressed = false;
        for gid in 0..glyphs.len() {
            if !matches!(bounds[gid], Bounds::Pending) {
                continue;
            }
            let Glyph::Composite(composite) = &mut glyphs[gid] else {
                continue;
            };
            if let Some(bbox) = composite_bounds(composite, &bounds) {
                composite.bbox = bbox;
                bounds[gid] = Bounds::Known(bbox);
                progressed = true;
            }
        }
        if !progressed {
            break;
        }
    }

    for (glyph, state) in glyphs.iter_mut().zip(&bounds) {
        if let (Glyph::Composite(composite), Bounds::Pending) = (glyph, state) {
            composite.bbox = ZERO_BBOX;
        }
    }
}

/// Union of the transformed component boxes, or `None` while a component is
/// still pending.
fn composite_bounds(composite: &CompositeGlyph, bounds: &[Bounds]) -> Option<Bbox> {
    let mut extent: Option<Rect> = None;

    for comp in composite.components() {
        let bbox = match bounds.get(comp.glyph.to_u32() as usize) {
            Some(Bounds::Known(bbox)) if !is_zero(bbox) => *bbox,
            Some(Bounds::Known(_)) | Some(Bounds::Empty) | None => continue,
            Some(Bounds::Pending) => return None,
        };

        let (dx, dy) = match comp.anchor {
            Anchor::Offset { x, y } => (f64::from(x), f64::from(y)),
            Anchor::Point { .. } => (0.0, 0.0),
        };
        let t = &comp.transform;
        let affine = Affine::new([
            f64::from(t.xx.to_f32()),
            f64::from(t.yx.to_f32()),
            f64::from(t.xy.to_f32()),
            f64::from(t.yy.to_f32()),
            dx,
            dy,
        ]);
        let rect = Rect::new(
            f64::from(bbox.x_min),
            f64::from(bbox.y_min),
            f64::from(bbox.x_max),
            f64::from(bbox.y_max),
        );
        let placed = affine.transform_rect_bbox(rect);
        extent = Some(extent.map_or(placed, |e| e.union(placed)));
    }

    Some(extent.map_or(ZERO_BBOX, |r| Bbox {
        x_min: clamp_i16(r.x0.round() as i32),
        y_min: clamp_i16(r.y0.round() as i32),
        x_max: clamp_i16(r.x1.round() as i32),
        y_max: clamp_i16(r.y1.round() as i32),
    }))
}

/// Left side bearing of an instanced glyph, when it has an outline.
pub(crate) fn glyph_x_min(glyph: &Glyph) -> Option<i16> {
    match glyph {
        Glyph::Simple(simple) => Some(simple.bbox.x_min),
        Glyph::Composite(composite) => Some(composite.bbox.x_min),
        Glyph::Empty => None,
    }
}
