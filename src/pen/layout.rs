use super::data::{DataValue, keys};
use super::{Content, Pen};
use crate::foundation::core::{Affine, Point, Rect, Vec2};
use crate::foundation::geometry::{Anchor, Axis, RectExt};

impl Pen {
    /// Apply `t` to every path below this node and to recorded frames.
    pub fn transform_mut(&mut self, t: Affine) -> &mut Self {
        match &mut self.content {
            Content::Value(p) => p.apply_affine(t),
            Content::Children(c) => {
                for child in c.iter_mut() {
                    child.transform_mut(t);
                }
            }
        }
        if let Some(DataValue::Rect(r)) = self.data.get_mut(keys::FRAME) {
            *r = t.transform_rect_bbox(*r);
        }
        self
    }

    /// Chainable [`Pen::transform_mut`].
    pub fn transform(mut self, t: Affine) -> Self {
        self.transform_mut(t);
        self
    }

    /// Move by `(dx, dy)`.
    pub fn translate(self, dx: f64, dy: f64) -> Self {
        self.transform(Affine::translate(Vec2::new(dx, dy)))
    }

    /// Uniform scale about `anchor` of the ambit; no-op without geometry.
    pub fn scale(self, s: f64, anchor: Anchor) -> Self {
        self.scale_xy(s, s, anchor)
    }

    /// Non-uniform scale about `anchor` of the ambit; no-op without geometry.
    pub fn scale_xy(self, sx: f64, sy: f64, anchor: Anchor) -> Self {
        let Ok(amb) = self.ambit() else {
            return self;
        };
        let t = about(amb.point_at(anchor), Affine::scale_non_uniform(sx, sy));
        self.transform(t)
    }

    /// Counter-clockwise rotation in degrees about `anchor` of the ambit; no-op without
    /// geometry.
    pub fn rotate(self, degrees: f64, anchor: Anchor) -> Self {
        let Ok(amb) = self.ambit() else {
            return self;
        };
        let t = about(amb.point_at(anchor), Affine::rotate(degrees.to_radians()));
        self.transform(t)
    }

    /// Move so the `anchor` point of the ambit lands on the `anchor` point of `rect`.
    pub fn align(self, rect: Rect, anchor: Anchor) -> Self {
        let Ok(amb) = self.ambit() else {
            return self;
        };
        let d = rect.point_at(anchor) - amb.point_at(anchor);
        self.translate(d.x, d.y)
    }

    /// Lay children out one after another along `axis`, separated by `gap`.
    ///
    /// Horizontal stacking runs left to right, vertical stacking top to bottom. The first child
    /// with geometry stays in place; a negative `gap` overlaps neighbours. Children without
    /// geometry are skipped.
    pub fn stack(mut self, axis: Axis, gap: f64) -> Self {
        let mut prev: Option<Rect> = None;
        for child in self.children_mut() {
            let Ok(amb) = child.ambit() else {
                continue;
            };
            if let Some(p) = prev {
                let d = match axis {
                    Axis::Horizontal => Vec2::new(p.x1 + gap - amb.x0, 0.0),
                    Axis::Vertical => Vec2::new(0.0, p.y0 - gap - amb.y1),
                };
                child.transform_mut(Affine::translate(d));
                prev = Some(amb + d);
            } else {
                prev = Some(amb);
            }
        }
        self
    }

    /// Record `rect` as this node's frame.
    pub fn with_frame(self, rect: Rect) -> Self {
        self.with_data(keys::FRAME, rect)
    }
}

fn about(p: Point, t: Affine) -> Affine {
    Affine::translate(p.to_vec2()) * t * Affine::translate(-p.to_vec2())
}

#[cfg(test)]
#[path = "../../tests/unit/pen/layout.rs"]
mod tests;
