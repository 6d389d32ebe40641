use super::Pen;
use crate::foundation::core::{BezPath, Point, Rect};
use crate::foundation::error::RunonResult;
use kurbo::{Ellipse, Shape};

const SHAPE_TOLERANCE: f64 = 0.1;

/// Closed rectangle traced counter-clockwise from the bottom-left corner.
pub(crate) fn rect_path(r: Rect) -> BezPath {
    let mut p = BezPath::new();
    p.move_to((r.x0, r.y0));
    p.line_to((r.x1, r.y0));
    p.line_to((r.x1, r.y1));
    p.line_to((r.x0, r.y1));
    p.close_path();
    p
}

impl Pen {
    /// Add a closed rectangle contour.
    pub fn rect(mut self, r: Rect) -> RunonResult<Self> {
        self.value_mut()?.extend(rect_path(r));
        Ok(self)
    }

    /// Add an ellipse inscribed in `r`.
    pub fn oval(mut self, r: Rect) -> RunonResult<Self> {
        let ellipse = Ellipse::from_rect(r);
        self.value_mut()?.extend(ellipse.path_elements(SHAPE_TOLERANCE));
        Ok(self)
    }

    /// Add a closed polygon through `points`; fewer than two points add nothing.
    pub fn polygon(mut self, points: &[Point]) -> RunonResult<Self> {
        if points.len() < 2 {
            return Ok(self);
        }
        let path = self.value_mut()?;
        path.move_to(points[0]);
        for p in &points[1..] {
            path.line_to(*p);
        }
        path.close_path();
        Ok(self)
    }

    /// Add an open two-point line, typically stroked.
    pub fn line(mut self, a: Point, b: Point) -> RunonResult<Self> {
        let path = self.value_mut()?;
        path.move_to(a);
        path.line_to(b);
        Ok(self)
    }
}
