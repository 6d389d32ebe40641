//! Boolean operations, outlines and flattening.
//!
//! Boolean operations flatten curves to polygons (tolerance [`FLATTEN_TOLERANCE`]) and run them
//! through `i_overlay` with the non-zero fill rule; results are polygonal.

use super::Pen;
use crate::foundation::core::{BezPath, PathEl};
use i_overlay::core::fill_rule::FillRule;
use i_overlay::core::overlay_rule::OverlayRule;
use i_overlay::float::single::SingleFloatOverlay;
use kurbo::{Cap, Join, Stroke, StrokeOpts};

/// Curve flattening tolerance used by boolean operations.
pub const FLATTEN_TOLERANCE: f64 = 0.1;

type Contour = Vec<[f64; 2]>;

/// Flatten `path` into closed polygons, one per contour.
fn to_polygons(path: &BezPath, tolerance: f64) -> Vec<Contour> {
    let mut out: Vec<Contour> = Vec::new();
    let mut cur: Contour = Vec::new();
    kurbo::flatten(path.iter(), tolerance, |el| match el {
        PathEl::MoveTo(p) => {
            if cur.len() > 2 {
                out.push(std::mem::take(&mut cur));
            }
            cur.clear();
            cur.push([p.x, p.y]);
        }
        PathEl::LineTo(p) => cur.push([p.x, p.y]),
        PathEl::ClosePath => {
            if cur.len() > 2 {
                out.push(std::mem::take(&mut cur));
            }
            cur.clear();
        }
        // flatten only emits MoveTo, LineTo and ClosePath
        PathEl::QuadTo(..) | PathEl::CurveTo(..) => {}
    });
    if cur.len() > 2 {
        out.push(cur);
    }
    out
}

fn from_shapes(shapes: Vec<Vec<Contour>>) -> BezPath {
    let mut out = BezPath::new();
    for contour in shapes.into_iter().flatten() {
        let mut pts = contour.into_iter();
        let Some([x, y]) = pts.next() else {
            continue;
        };
        out.move_to((x, y));
        for [x, y] in pts {
            out.line_to((x, y));
        }
        out.close_path();
    }
    out
}

fn overlay(subject: &BezPath, clip: &BezPath, rule: OverlayRule) -> BezPath {
    let subj = to_polygons(subject, FLATTEN_TOLERANCE);
    let clip = to_polygons(clip, FLATTEN_TOLERANCE);
    from_shapes(subj.overlay(&clip, rule, FillRule::NonZero))
}

/// Outline of `path` stroked at `width`.
pub(crate) fn stroke_outline(path: &BezPath, width: f64, miter: Option<f64>) -> BezPath {
    let mut style = Stroke::new(width).with_caps(Cap::Butt).with_join(Join::Miter);
    if let Some(limit) = miter {
        style = style.with_miter_limit(limit);
    }
    kurbo::stroke(path.iter(), &style, &StrokeOpts::default(), FLATTEN_TOLERANCE)
}

impl Pen {
    fn merged_path(&self) -> BezPath {
        let mut out = BezPath::new();
        for leaf in self.leaves() {
            if let Some(p) = leaf.pen.value() {
                out.extend(p.iter());
            }
        }
        out
    }

    fn with_result(mut self, path: BezPath) -> Self {
        self.collapse();
        if let Ok(v) = self.value_mut() {
            *v = path;
        }
        self
    }

    fn boolean(self, other: &Pen, rule: OverlayRule) -> Self {
        if self.is_empty() && other.is_empty() {
            return self;
        }
        let result = overlay(&self.merged_path(), &other.merged_path(), rule);
        self.with_result(result)
    }

    /// Union with `other`; groups are collapsed first.
    pub fn union(self, other: &Pen) -> Self {
        self.boolean(other, OverlayRule::Union)
    }

    /// Area of `self` not covered by `other`.
    pub fn difference(self, other: &Pen) -> Self {
        self.boolean(other, OverlayRule::Difference)
    }

    /// Area covered by both.
    pub fn intersection(self, other: &Pen) -> Self {
        self.boolean(other, OverlayRule::Intersect)
    }

    /// Area covered by exactly one.
    pub fn xor(self, other: &Pen) -> Self {
        self.boolean(other, OverlayRule::Xor)
    }

    /// Merge self-overlapping contours into a single non-overlapping outline.
    pub fn remove_overlap(self) -> Self {
        if self.is_empty() {
            return self;
        }
        let result = overlay(&self.merged_path(), &BezPath::new(), OverlayRule::Subject);
        self.with_result(result)
    }

    /// Replace the geometry with the outline of its stroke at `width`.
    pub fn outline(self, width: f64) -> Self {
        if self.is_empty() {
            return self;
        }
        let result = stroke_outline(&self.merged_path(), width, None);
        self.with_result(result)
    }

    /// Grow (positive) or shrink (negative) the filled area by `amount`.
    pub fn offset(self, amount: f64) -> Self {
        if self.is_empty() || amount == 0.0 {
            return self;
        }
        let base = self.merged_path();
        let ring = stroke_outline(&base, amount.abs() * 2.0, None);
        let rule = if amount > 0.0 {
            OverlayRule::Union
        } else {
            OverlayRule::Difference
        };
        let result = overlay(&base, &ring, rule);
        self.with_result(result)
    }

    /// Replace every leaf with the filled outline of its resolved default stroke.
    pub fn stroke_to_fill(mut self) -> Self {
        self.stroke_to_fill_mut();
        self
    }

    fn stroke_to_fill_mut(&mut self) {
        for child in self.children_mut() {
            child.stroke_to_fill_mut();
        }
        let style = self.style(None);
        let Some(stroke) = style.stroke() else {
            return;
        };
        let (weight, miter, color) = (stroke.weight, stroke.miter, stroke.color.clone());
        if let Some(p) = self.value() {
            let outline = stroke_outline(p, weight, miter);
            if let Ok(v) = self.value_mut() {
                *v = outline;
            }
            self.set_attr(
                super::attrs::DEFAULT_LAYER,
                super::Attr::Fill { fill: color },
            );
            self.set_attr(
                super::attrs::DEFAULT_LAYER,
                super::Attr::StrokeColor { fill: None },
            );
        }
    }

    /// Replace curves in every leaf with line segments within `tolerance`.
    pub fn flatten(mut self, tolerance: f64) -> Self {
        self.flatten_mut(tolerance);
        self
    }

    fn flatten_mut(&mut self, tolerance: f64) {
        for child in self.children_mut() {
            child.flatten_mut(tolerance);
        }
        if let Some(p) = self.value() {
            let mut flat = BezPath::new();
            kurbo::flatten(p.iter(), tolerance, |el| flat.push(el));
            if let Ok(v) = self.value_mut() {
                *v = flat;
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pen/pathops.rs"]
mod tests;
