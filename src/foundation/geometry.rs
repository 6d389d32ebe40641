//! Rectangle helpers and compass anchors in pen space.
//!
//! Pen space is Cartesian: the origin is bottom-left and `y` grows upwards, so `N` is the edge
//! at `rect.y1` and `S` the edge at `rect.y0`.

use crate::foundation::core::{Point, Rect};
use crate::foundation::error::{RunonError, RunonResult};

/// One horizontal or vertical reference line of a rectangle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Edge {
    /// Left edge (`x0`).
    MinX,
    /// Horizontal centre.
    MidX,
    /// Right edge (`x1`).
    MaxX,
    /// Bottom edge (`y0`).
    MinY,
    /// Vertical centre.
    MidY,
    /// Top edge (`y1`).
    MaxY,
}

impl Edge {
    /// Return `true` for the three `x` edges.
    pub fn is_horizontal(self) -> bool {
        matches!(self, Edge::MinX | Edge::MidX | Edge::MaxX)
    }
}

/// Layout axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    /// Left to right.
    Horizontal,
    /// Top to bottom.
    Vertical,
}

/// 9-point compass anchor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
pub enum Anchor {
    /// Top centre.
    N,
    /// Top right.
    NE,
    /// Middle right.
    E,
    /// Bottom right.
    SE,
    /// Bottom centre.
    S,
    /// Bottom left.
    SW,
    /// Middle left.
    W,
    /// Top left.
    NW,
    /// Centre.
    #[default]
    C,
}

impl Anchor {
    /// Split into the `(x edge, y edge)` pair this anchor refers to.
    pub fn edges(self) -> (Edge, Edge) {
        match self {
            Anchor::N => (Edge::MidX, Edge::MaxY),
            Anchor::NE => (Edge::MaxX, Edge::MaxY),
            Anchor::E => (Edge::MaxX, Edge::MidY),
            Anchor::SE => (Edge::MaxX, Edge::MinY),
            Anchor::S => (Edge::MidX, Edge::MinY),
            Anchor::SW => (Edge::MinX, Edge::MinY),
            Anchor::W => (Edge::MinX, Edge::MidY),
            Anchor::NW => (Edge::MinX, Edge::MaxY),
            Anchor::C => (Edge::MidX, Edge::MidY),
        }
    }
}

impl std::str::FromStr for Anchor {
    type Err = RunonError;

    fn from_str(s: &str) -> RunonResult<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "N" => Ok(Anchor::N),
            "NE" => Ok(Anchor::NE),
            "E" => Ok(Anchor::E),
            "SE" => Ok(Anchor::SE),
            "S" => Ok(Anchor::S),
            "SW" => Ok(Anchor::SW),
            "W" => Ok(Anchor::W),
            "NW" => Ok(Anchor::NW),
            "C" | "CENTER" | "MDPT" => Ok(Anchor::C),
            other => Err(RunonError::validation(format!(
                "unknown compass anchor '{other}'"
            ))),
        }
    }
}

/// Rectangle-relative positioning helpers for [`Rect`].
pub trait RectExt: Sized {
    /// Coordinate of `edge`.
    fn edge(&self, edge: Edge) -> f64;
    /// Point at the compass `anchor`.
    fn point_at(&self, anchor: Anchor) -> Point;
    /// Strip of size `amount` taken from `edge` (a centred strip for the `Mid` edges).
    fn take(&self, amount: f64, edge: Edge) -> Self;
    /// Split into the strip taken from `edge` and the remainder.
    fn divide(&self, amount: f64, edge: Edge) -> (Self, Self);
    /// `n` equal slices along the axis of `edge`, starting at `edge`.
    fn subdivide(&self, n: usize, edge: Edge) -> Vec<Self>;
    /// Shrink by `dx` on both sides horizontally and `dy` vertically (negative grows).
    fn inset_xy(&self, dx: f64, dy: f64) -> Self;
    /// Translate by `(dx, dy)`.
    fn offset_by(&self, dx: f64, dy: f64) -> Self;
    /// Scale the size by `s`, keeping the `anchor` point fixed.
    fn scale_about(&self, s: f64, anchor: Anchor) -> Self;
    /// Round origin and size to whole units.
    fn round_xywh(&self) -> Self;
    /// Mirror vertically inside a frame of height `h` (pen space <-> top-left space).
    fn flip_y(&self, h: f64) -> Self;
    /// Same size with the origin moved to `(0, 0)`.
    fn zeroed(&self) -> Self;
}

impl RectExt for Rect {
    fn edge(&self, edge: Edge) -> f64 {
        match edge {
            Edge::MinX => self.x0,
            Edge::MidX => (self.x0 + self.x1) * 0.5,
            Edge::MaxX => self.x1,
            Edge::MinY => self.y0,
            Edge::MidY => (self.y0 + self.y1) * 0.5,
            Edge::MaxY => self.y1,
        }
    }

    fn point_at(&self, anchor: Anchor) -> Point {
        let (ex, ey) = anchor.edges();
        Point::new(self.edge(ex), self.edge(ey))
    }

    fn take(&self, amount: f64, edge: Edge) -> Self {
        match edge {
            Edge::MinX => Rect::new(self.x0, self.y0, self.x0 + amount, self.y1),
            Edge::MaxX => Rect::new(self.x1 - amount, self.y0, self.x1, self.y1),
            Edge::MidX => {
                let c = self.edge(Edge::MidX);
                Rect::new(c - amount * 0.5, self.y0, c + amount * 0.5, self.y1)
            }
            Edge::MinY => Rect::new(self.x0, self.y0, self.x1, self.y0 + amount),
            Edge::MaxY => Rect::new(self.x0, self.y1 - amount, self.x1, self.y1),
            Edge::MidY => {
                let c = self.edge(Edge::MidY);
                Rect::new(self.x0, c - amount * 0.5, self.x1, c + amount * 0.5)
            }
        }
    }

    fn divide(&self, amount: f64, edge: Edge) -> (Self, Self) {
        let taken = self.take(amount, edge);
        let rest = match edge {
            Edge::MinX => Rect::new(taken.x1, self.y0, self.x1, self.y1),
            Edge::MaxX => Rect::new(self.x0, self.y0, taken.x0, self.y1),
            Edge::MinY => Rect::new(self.x0, taken.y1, self.x1, self.y1),
            Edge::MaxY => Rect::new(self.x0, self.y0, self.x1, taken.y0),
            // A centred strip leaves two pieces; the remainder is reported as the whole rect.
            Edge::MidX | Edge::MidY => *self,
        };
        (taken, rest)
    }

    fn subdivide(&self, n: usize, edge: Edge) -> Vec<Self> {
        if n == 0 {
            return Vec::new();
        }
        let mut out = Vec::with_capacity(n);
        let horizontal = edge.is_horizontal();
        let span = if horizontal {
            self.width()
        } else {
            self.height()
        };
        let step = span / n as f64;
        for i in 0..n {
            let a = step * i as f64;
            let b = step * (i + 1) as f64;
            let r = match edge {
                Edge::MinX | Edge::MidX => Rect::new(self.x0 + a, self.y0, self.x0 + b, self.y1),
                Edge::MaxX => Rect::new(self.x1 - b, self.y0, self.x1 - a, self.y1),
                Edge::MinY | Edge::MidY => Rect::new(self.x0, self.y0 + a, self.x1, self.y0 + b),
                Edge::MaxY => Rect::new(self.x0, self.y1 - b, self.x1, self.y1 - a),
            };
            out.push(r);
        }
        out
    }

    fn inset_xy(&self, dx: f64, dy: f64) -> Self {
        Rect::new(self.x0 + dx, self.y0 + dy, self.x1 - dx, self.y1 - dy)
    }

    fn offset_by(&self, dx: f64, dy: f64) -> Self {
        Rect::new(self.x0 + dx, self.y0 + dy, self.x1 + dx, self.y1 + dy)
    }

    fn scale_about(&self, s: f64, anchor: Anchor) -> Self {
        let p = self.point_at(anchor);
        Rect::new(
            p.x + (self.x0 - p.x) * s,
            p.y + (self.y0 - p.y) * s,
            p.x + (self.x1 - p.x) * s,
            p.y + (self.y1 - p.y) * s,
        )
    }

    fn round_xywh(&self) -> Self {
        let x = self.x0.round();
        let y = self.y0.round();
        Rect::new(x, y, x + self.width().round(), y + self.height().round())
    }

    fn flip_y(&self, h: f64) -> Self {
        Rect::new(self.x0, h - self.y1, self.x1, h - self.y0)
    }

    fn zeroed(&self) -> Self {
        Rect::new(0.0, 0.0, self.width(), self.height())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/geometry.rs"]
mod tests;
