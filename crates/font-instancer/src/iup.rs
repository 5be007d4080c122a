//! Interpolation of untouched points for sparse gvar tuples.

use read_fonts::types::Point;

/// Infer deltas for every point a sparse tuple leaves untouched, contour by
/// contour. `end_pts` holds the last point index of each contour.
pub(crate) fn interpolate_untouched(
    deltas: &mut [Point<i32>],
    touched: &[bool],
    points: &[Point<i32>],
    end_pts: &[usize],
) {
    let mut start = 0;
    for &end in end_pts {
        if end < start || end >= points.len() {
            break;
        }
        let range = start..end + 1;
        interpolate_contour(
            &mut deltas[range.clone()],
            &touched[range.clone()],
            &points[range],
        );
        start = end + 1;
    }
}

fn interpolate_contour(deltas: &mut [Point<i32>], touched: &[bool], points: &[Point<i32>]) {
    let anchors: Vec<usize> = (0..points.len()).filter(|&i| touched[i]).collect();

    match anchors.as_slice() {
        [] => {}
        // A single touched point shifts the whole contour.
        [only] => {
            let shift = deltas[*only];
            for (i, slot) in deltas.iter_mut().enumerate() {
                if i != *only {
                    *slot = shift;
                }
            }
        }
        _ => {
            for (k, &from) in anchors.iter().enumerate() {
                let to = anchors[(k + 1) % anchors.len()];
                fill_between(deltas, points, from, to);
            }
        }
    }
}

fn fill_between(deltas: &mut [Point<i32>], points: &[Point<i32>], from: usize, to: usize) {
    let len = points.len();
    let (p1, p2) = (points[from], points[to]);
    let (d1, d2) = (deltas[from], deltas[to]);

    let mut i = (from + 1) % len;
    while i != to {
        let p = points[i];
        deltas[i] = Point::new(
            interpolate(p1.x, p2.x, p.x, d1.x, d2.x),
            interpolate(p1.y, p2.y, p.y, d1.y, d2.y),
        );
        i = (i + 1) % len;
    }
}

fn interpolate(c1: i32, c2: i32, c: i32, d1: i32, d2: i32) -> i32 {
    if c1 == c2 {
        return if d1 == d2 { d1 } else { 0 };
    }

    let (lo, hi, d_lo, d_hi) = if c1 < c2 { (c1, c2, d1, d2) } else { (c2, c1, d2, d1) };

    if c <= lo {
        d_lo
    } else if c >= hi {
        d_hi
    } else {
        let t = f64::from(c - lo) / f64::from(hi - lo);
        (f64::from(d_lo) + t * f64::from(d_hi - d_lo)).round() as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pts(coords: &[(i32, i32)]) -> Vec<Point<i32>> {
        coords.iter().map(|&(x, y)| Point::new(x, y)).collect()
    }

    #[test]
    fn single_touched_point_shifts_contour() {
        let points = pts(&[(0, 0), (100, 0), (100, 100)]);
        let mut deltas = pts(&[(0, 0), (10, 5), (0, 0)]);
        interpolate_untouched(&mut deltas, &[false, true, false], &points, &[2]);
        assert_eq!(deltas, pts(&[(10, 5), (10, 5), (10, 5)]));
    }

    #[test]
    fn interpolates_between_touched_points() {
        let points = pts(&[(0, 0), (50, 0), (100, 0), (50, 50)]);
        let mut deltas = pts(&[(0, 0), (0, 0), (20, 0), (0, 0)]);
        interpolate_untouched(&mut deltas, &[true, false, true, false], &points, &[3]);
        assert_eq!(deltas[1], Point::new(10, 0));
    }

    #[test]
    fn untouched_contour_is_left_alone() {
        let points = pts(&[(0, 0), (10, 10)]);
        let mut deltas = pts(&[(0, 0), (0, 0)]);
        interpolate_untouched(&mut deltas, &[false, false], &points, &[1]);
        assert_eq!(deltas, pts(&[(0, 0), (0, 0)]));
    }

    #[test]
    fn clamps_outside_the_anchor_range() {
        assert_eq!(interpolate(0, 100, -10, 4, 8), 4);
        assert_eq!(interpolate(0, 100, 150, 4, 8), 8);
        assert_eq!(interpolate(100, 0, 150, 4, 8), 4);
    }
}
