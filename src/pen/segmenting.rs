//! Contour-level access and arc-length queries over value nodes.

use super::Pen;
use crate::foundation::core::{BezPath, PathEl, Point};
use kurbo::{ParamCurve, ParamCurveArclen, PathSeg};

const ARCLEN_ACCURACY: f64 = 1e-3;

/// Split a path into one path per `MoveTo`.
pub fn contours(path: &BezPath) -> Vec<BezPath> {
    let mut out: Vec<BezPath> = Vec::new();
    for el in path.elements() {
        match el {
            PathEl::MoveTo(_) => {
                let mut p = BezPath::new();
                p.push(*el);
                out.push(p);
            }
            // A path must start with MoveTo; stray leading commands are dropped.
            _ => {
                if let Some(p) = out.last_mut() {
                    p.push(*el);
                }
            }
        }
    }
    out
}

/// Join contours back into one path.
pub fn join(contours: impl IntoIterator<Item = BezPath>) -> BezPath {
    let mut out = BezPath::new();
    for c in contours {
        out.extend(c);
    }
    out
}

#[derive(Clone, Copy)]
enum Seg {
    Line(Point),
    Quad(Point, Point),
    Cubic(Point, Point, Point),
}

impl Seg {
    fn end(self) -> Point {
        match self {
            Seg::Line(p) | Seg::Quad(_, p) | Seg::Cubic(_, _, p) => p,
        }
    }
}

fn reverse_contour(contour: &BezPath) -> BezPath {
    let mut start = None;
    let mut segs = Vec::new();
    let mut closed = false;
    for el in contour.elements() {
        match *el {
            PathEl::MoveTo(p) => start = Some(p),
            PathEl::LineTo(p) => segs.push(Seg::Line(p)),
            PathEl::QuadTo(c, p) => segs.push(Seg::Quad(c, p)),
            PathEl::CurveTo(c1, c2, p) => segs.push(Seg::Cubic(c1, c2, p)),
            PathEl::ClosePath => closed = true,
        }
    }
    let Some(start) = start else {
        return BezPath::new();
    };

    // Node sequence: start, then the end point of every segment.
    let mut nodes = Vec::with_capacity(segs.len() + 1);
    nodes.push(start);
    nodes.extend(segs.iter().map(|s| s.end()));

    let mut out = BezPath::new();
    if !closed {
        let mut cur = nodes.len() - 1;
        out.move_to(nodes[cur]);
        for seg in segs.iter().rev() {
            cur -= 1;
            push_reversed(&mut out, *seg, nodes[cur]);
        }
        return out;
    }

    // A closing line back to the start is implied by ClosePath.
    if matches!(segs.last(), Some(Seg::Line(p)) if *p == start) {
        segs.pop();
        nodes.pop();
    }

    out.move_to(start);
    let last = nodes[nodes.len() - 1];
    if last != start {
        out.line_to(last);
    }
    for (k, seg) in segs.iter().enumerate().rev() {
        if k == 0 && matches!(seg, Seg::Line(_)) {
            break;
        }
        push_reversed(&mut out, *seg, nodes[k]);
    }
    out.close_path();
    out
}

fn push_reversed(out: &mut BezPath, seg: Seg, to: Point) {
    match seg {
        Seg::Line(_) => out.line_to(to),
        Seg::Quad(c, _) => out.quad_to(c, to),
        Seg::Cubic(c1, c2, _) => out.curve_to(c2, c1, to),
    }
}

/// Reverse the direction of every contour, keeping each contour's start point and the contour
/// order.
pub fn reverse_path(path: &BezPath) -> BezPath {
    join(contours(path).iter().map(reverse_contour))
}

fn segments_length(path: &BezPath) -> f64 {
    path.segments().map(|s| s.arclen(ARCLEN_ACCURACY)).sum()
}

impl Pen {
    /// Contours of a value node (empty for groups).
    pub fn contours(&self) -> Vec<BezPath> {
        self.value().map(contours).unwrap_or_default()
    }

    /// Keep the contours for which `keep(index, contour)` holds.
    pub fn filter_contours(mut self, mut keep: impl FnMut(usize, &BezPath) -> bool) -> Self {
        if let Some(p) = self.value() {
            let kept = contours(p)
                .into_iter()
                .enumerate()
                .filter(|(i, c)| keep(*i, c))
                .map(|(_, c)| c);
            let joined = join(kept);
            if let Ok(v) = self.value_mut() {
                *v = joined;
            }
        }
        self
    }

    /// Replace each contour with `f(index, contour)`.
    pub fn map_contours(mut self, mut f: impl FnMut(usize, BezPath) -> BezPath) -> Self {
        if let Some(p) = self.value() {
            let mapped = join(contours(p).into_iter().enumerate().map(|(i, c)| f(i, c)));
            if let Ok(v) = self.value_mut() {
                *v = mapped;
            }
        }
        self
    }

    /// Total arc length of every leaf path.
    pub fn length(&self) -> f64 {
        self.leaves()
            .filter_map(|l| l.pen.value().map(segments_length))
            .sum()
    }

    /// Point at fraction `t` (`0..=1`) of the arc length of a value node.
    pub fn point_at(&self, t: f64) -> Option<Point> {
        let path = self.value()?;
        let segs: Vec<PathSeg> = path.segments().collect();
        let lens: Vec<f64> = segs.iter().map(|s| s.arclen(ARCLEN_ACCURACY)).collect();
        let total: f64 = lens.iter().sum();
        let last = segs.last()?;
        let mut remaining = t.clamp(0.0, 1.0) * total;
        for (seg, len) in segs.iter().zip(&lens) {
            if remaining <= *len {
                let u = seg.inv_arclen(remaining, ARCLEN_ACCURACY);
                return Some(seg.eval(u));
            }
            remaining -= len;
        }
        Some(last.end())
    }

    /// Portion of a value node between arc-length fractions `from` and `to`.
    pub fn subsegment(&self, from: f64, to: f64) -> Option<BezPath> {
        let path = self.value()?;
        let (from, to) = (from.clamp(0.0, 1.0), to.clamp(0.0, 1.0));
        if from >= to {
            return Some(BezPath::new());
        }
        let segs: Vec<PathSeg> = path.segments().collect();
        let lens: Vec<f64> = segs.iter().map(|s| s.arclen(ARCLEN_ACCURACY)).collect();
        let total: f64 = lens.iter().sum();
        let (a, b) = (from * total, to * total);
        let mut out = BezPath::new();
        let mut acc = 0.0;
        for (seg, len) in segs.iter().zip(&lens) {
            let (s0, s1) = (acc, acc + len);
            acc = s1;
            if s1 <= a || s0 >= b || *len <= 0.0 {
                continue;
            }
            let u0 = if a > s0 {
                seg.inv_arclen(a - s0, ARCLEN_ACCURACY)
            } else {
                0.0
            };
            let u1 = if b < s1 {
                seg.inv_arclen(b - s0, ARCLEN_ACCURACY)
            } else {
                1.0
            };
            let part = seg.subsegment(u0..u1);
            if out.elements().is_empty() {
                out.move_to(part.start());
            }
            match part {
                PathSeg::Line(l) => out.line_to(l.p1),
                PathSeg::Quad(q) => out.quad_to(q.p1, q.p2),
                PathSeg::Cubic(c) => out.curve_to(c.p1, c.p2, c.p3),
            }
        }
        Some(out)
    }

    /// Split a value node into a group of one pen per contour, each keeping attributes and data.
    pub fn explode(self) -> Self {
        let Some(path) = self.value() else {
            return self;
        };
        let parts: Vec<Pen> = contours(path)
            .into_iter()
            .map(|c| {
                let mut p = Pen::from_path(c);
                p.attrs = self.attrs.clone();
                p.data = self.data.clone();
                p
            })
            .collect();
        let mut out = Pen::group(parts);
        out.attrs = self.attrs;
        out.data = self.data;
        out.tag = self.tag;
        out
    }

    /// Inverse of [`Pen::explode`]: merge the children back into one value node.
    pub fn implode(self) -> Self {
        self.collapsed()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pen/segmenting.rs"]
mod tests;
