//! Geometry for the charts egui_plot does not provide (pie, treemap,
//! sunburst). Pure functions so they can be tested without a UI context.

use std::f32::consts::{FRAC_PI_2, TAU};

use eframe::egui::{pos2, Pos2, Rect};

/// Angular span `[start, end)` in radians, clockwise from 12 o'clock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Span {
    pub start: f32,
    pub end: f32,
}

impl Span {
    pub fn sweep(&self) -> f32 {
        self.end - self.start
    }

    pub fn contains(&self, angle: f32) -> bool {
        angle >= self.start && angle < self.end
    }

    pub fn mid(&self) -> f32 {
        (self.start + self.end) / 2.0
    }
}

/// Split `within` into consecutive spans proportional to `weights`.
/// Zero or negative weights get an empty span.
pub fn spans(weights: &[f64], within: Span) -> Vec<Span> {
    let total: f64 = weights.iter().filter(|w| **w > 0.0).sum();
    let mut cursor = within.start;
    weights
        .iter()
        .map(|w| {
            let frac = if total > 0.0 && *w > 0.0 { (*w / total) as f32 } else { 0.0 };
            let span = Span {
                start: cursor,
                end: cursor + frac * within.sweep(),
            };
            cursor = span.end;
            span
        })
        .collect()
}

/// Spans covering the full circle.
pub fn pie_spans(weights: &[f64]) -> Vec<Span> {
    spans(weights, Span { start: 0.0, end: TAU })
}

/// Sunburst rings: the inner ring split by group totals, each group's children
/// split within their parent's span.
pub fn sunburst_spans(groups: &[Vec<f64>]) -> Vec<(Span, Vec<Span>)> {
    let totals: Vec<f64> = groups.iter().map(|g| g.iter().sum()).collect();
    pie_spans(&totals)
        .into_iter()
        .zip(groups)
        .map(|(parent, children)| (parent, spans(children, parent)))
        .collect()
}

/// Point at `angle` (clockwise from 12 o'clock) on a circle.
pub fn polar(center: Pos2, radius: f32, angle: f32) -> Pos2 {
    let a = angle - FRAC_PI_2;
    pos2(center.x + radius * a.cos(), center.y + radius * a.sin())
}

/// Angle of `p` around `center`, in the same convention as [`polar`], in `[0, TAU)`.
pub fn angle_of(center: Pos2, p: Pos2) -> f32 {
    let a = (p.y - center.y).atan2(p.x - center.x) + FRAC_PI_2;
    a.rem_euclid(TAU)
}

/// Convex pieces of an annular sector between `inner` and `outer` radius.
///
/// egui only fills convex polygons, so the sector is cut into small steps.
/// With `inner == 0` the pieces are triangles of a pie wedge.
pub fn annular_pieces(center: Pos2, inner: f32, outer: f32, span: Span) -> Vec<Vec<Pos2>> {
    const STEP: f32 = 0.1;
    if span.sweep() <= 0.0 {
        return Vec::new();
    }
    let n = (span.sweep() / STEP).ceil().max(1.0) as usize;
    let d = span.sweep() / n as f32;
    (0..n)
        .map(|i| {
            let a0 = span.start + d * i as f32;
            let a1 = a0 + d;
            let mut pts = vec![polar(center, outer, a0), polar(center, outer, a1)];
            if inner > 0.0 {
                pts.push(polar(center, inner, a1));
                pts.push(polar(center, inner, a0));
            } else {
                pts.push(center);
            }
            pts
        })
        .collect()
}

/// Slice-and-dice: cut `rect` along its longer side into strips proportional
/// to `weights`.
pub fn slice(rect: Rect, weights: &[f64]) -> Vec<Rect> {
    let total: f64 = weights.iter().filter(|w| **w > 0.0).sum();
    let horizontal = rect.width() >= rect.height();
    let mut cursor = if horizontal { rect.min.x } else { rect.min.y };
    weights
        .iter()
        .map(|w| {
            let frac = if total > 0.0 && *w > 0.0 { (*w / total) as f32 } else { 0.0 };
            if horizontal {
                let x1 = cursor + frac * rect.width();
                let r = Rect::from_min_max(pos2(cursor, rect.min.y), pos2(x1, rect.max.y));
                cursor = x1;
                r
            } else {
                let y1 = cursor + frac * rect.height();
                let r = Rect::from_min_max(pos2(rect.min.x, cursor), pos2(rect.max.x, y1));
                cursor = y1;
                r
            }
        })
        .collect()
}

/// Two-level treemap: parents sliced from `rect`, children sliced inside each parent.
pub fn treemap(rect: Rect, groups: &[Vec<f64>]) -> Vec<(Rect, Vec<Rect>)> {
    let totals: Vec<f64> = groups.iter().map(|g| g.iter().sum()).collect();
    slice(rect, &totals)
        .into_iter()
        .zip(groups)
        .map(|(parent, children)| (parent, slice(parent, children)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-4;

    #[test]
    fn pie_spans_cover_the_circle_proportionally() {
        let s = pie_spans(&[1.0, 1.0, 2.0]);
        assert_eq!(s.len(), 3);
        assert!((s[0].sweep() - TAU / 4.0).abs() < EPS);
        assert!((s[2].sweep() - TAU / 2.0).abs() < EPS);
        assert!((s[2].end - TAU).abs() < EPS);
        assert_eq!(s[1].start, s[0].end);
    }

    #[test]
    fn zero_weights_get_empty_spans() {
        let s = pie_spans(&[0.0, 3.0]);
        assert_eq!(s[0].sweep(), 0.0);
        assert!((s[1].sweep() - TAU).abs() < EPS);
        assert!(pie_spans(&[0.0]).iter().all(|s| s.sweep() == 0.0));
    }

    #[test]
    fn sunburst_children_stay_inside_parent() {
        let rings = sunburst_spans(&[vec![1.0, 3.0], vec![4.0]]);
        let (parent, children) = &rings[0];
        assert!((parent.sweep() - TAU / 2.0).abs() < EPS);
        assert!((children[0].start - parent.start).abs() < EPS);
        assert!((children[1].end - parent.end).abs() < EPS);
        assert!((children[1].sweep() - 3.0 * children[0].sweep()).abs() < EPS);
    }

    #[test]
    fn polar_and_angle_of_agree() {
        let c = pos2(50.0, 50.0);
        for angle in [0.0, 1.0, 3.0, 5.5] {
            let p = polar(c, 10.0, angle);
            assert!((angle_of(c, p) - angle).abs() < EPS);
        }
        // 12 o'clock is straight up.
        let top = polar(c, 10.0, 0.0);
        assert!((top.x - 50.0).abs() < EPS && (top.y - 40.0).abs() < EPS);
    }

    #[test]
    fn annular_pieces_are_small_quads() {
        let pieces = annular_pieces(pos2(0.0, 0.0), 5.0, 10.0, Span { start: 0.0, end: 0.95 });
        assert_eq!(pieces.len(), 10);
        assert!(pieces.iter().all(|p| p.len() == 4));
        let wedge = annular_pieces(pos2(0.0, 0.0), 0.0, 10.0, Span { start: 0.0, end: 0.05 });
        assert_eq!(wedge.len(), 1);
        assert_eq!(wedge[0].len(), 3);
    }

    #[test]
    fn slice_splits_along_longer_side() {
        let rect = Rect::from_min_max(pos2(0.0, 0.0), pos2(100.0, 20.0));
        let parts = slice(rect, &[1.0, 3.0]);
        assert!((parts[0].width() - 25.0).abs() < EPS);
        assert!((parts[1].min.x - 25.0).abs() < EPS);
        assert!((parts[1].height() - 20.0).abs() < EPS);
    }

    #[test]
    fn treemap_areas_match_weights() {
        let rect = Rect::from_min_max(pos2(0.0, 0.0), pos2(100.0, 100.0));
        let map = treemap(rect, &[vec![1.0, 1.0], vec![2.0]]);
        let area = |r: &Rect| r.width() * r.height();
        let total: f32 = map.iter().flat_map(|(_, c)| c.iter()).map(area).sum();
        assert!((total - 10_000.0).abs() < 1e-2);
        assert!((area(&map[1].1[0]) - 2.0 * area(&map[0].1[0])).abs() < 1e-2);
    }
}
