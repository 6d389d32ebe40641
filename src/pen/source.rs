//! Ingestion of paths produced outside the pen tree.
//!
//! Outline producers (font libraries, shape generators) expose a replay contract; the closed
//! [`PenSource`] union decides once at the boundary how an input becomes a [`Pen`].

use super::Pen;
use super::data::keys;
use crate::foundation::color::Fill;
use crate::foundation::core::{BezPath, PathEl, Point, Rect};
use std::collections::BTreeMap;
use std::fmt;

/// Receiver of sequential path-construction callbacks.
pub trait PathReplay {
    /// Start a contour.
    fn move_to(&mut self, p: Point);
    /// Straight segment.
    fn line_to(&mut self, p: Point);
    /// Cubic segment.
    fn curve_to(&mut self, c1: Point, c2: Point, p: Point);
    /// Quadratic segment.
    fn qcurve_to(&mut self, c: Point, p: Point);
    /// Close the current contour.
    fn close_path(&mut self);
}

impl PathReplay for BezPath {
    fn move_to(&mut self, p: Point) {
        BezPath::move_to(self, p);
    }

    fn line_to(&mut self, p: Point) {
        BezPath::line_to(self, p);
    }

    fn curve_to(&mut self, c1: Point, c2: Point, p: Point) {
        BezPath::curve_to(self, c1, c2, p);
    }

    fn qcurve_to(&mut self, c: Point, p: Point) {
        BezPath::quad_to(self, c, p);
    }

    fn close_path(&mut self) {
        BezPath::close_path(self);
    }
}

/// Anything that can replay its outline into a [`PathReplay`].
pub trait ReplaySource {
    /// Emit every command in order.
    fn replay(&self, sink: &mut dyn PathReplay);
}

fn replay_elements(path: &BezPath, sink: &mut dyn PathReplay) {
    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => sink.move_to(p),
            PathEl::LineTo(p) => sink.line_to(p),
            PathEl::QuadTo(c, p) => sink.qcurve_to(c, p),
            PathEl::CurveTo(c1, c2, p) => sink.curve_to(c1, c2, p),
            PathEl::ClosePath => sink.close_path(),
        }
    }
}

impl ReplaySource for BezPath {
    fn replay(&self, sink: &mut dyn PathReplay) {
        replay_elements(self, sink);
    }
}

impl ReplaySource for Pen {
    fn replay(&self, sink: &mut dyn PathReplay) {
        for leaf in self.leaves() {
            if let Some(p) = leaf.pen.value() {
                replay_elements(p, sink);
            }
        }
    }
}

/// Adapter turning a drawing callback into a [`ReplaySource`].
pub struct ReplayFn<F>(pub F);

impl<F> ReplaySource for ReplayFn<F>
where
    F: Fn(&mut dyn PathReplay),
{
    fn replay(&self, sink: &mut dyn PathReplay) {
        (self.0)(sink);
    }
}

/// Stroke entry of a foreign default style.
#[derive(Clone, Debug, PartialEq)]
pub struct ForeignStroke {
    /// Stroke colour.
    pub color: Fill,
    /// Stroke width.
    pub weight: f64,
}

/// Default style dictionary of a foreign recording.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ForeignStyle {
    /// Fill colour.
    pub fill: Option<Fill>,
    /// Stroke colour and weight.
    pub stroke: Option<ForeignStroke>,
    /// Every other style key. Not carried over into the pen.
    pub other: BTreeMap<String, serde_json::Value>,
}

/// A path recorded by a foreign producer plus its style and metadata.
pub struct ForeignPen {
    /// Outline commands.
    pub outline: Box<dyn ReplaySource>,
    /// Default style.
    pub style: ForeignStyle,
    /// Layout frame, if the producer had one.
    pub frame: Option<Rect>,
    /// Glyph name, if the outline came from a font.
    pub glyph_name: Option<String>,
}

impl fmt::Debug for ForeignPen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ForeignPen")
            .field("style", &self.style)
            .field("frame", &self.frame)
            .field("glyph_name", &self.glyph_name)
            .finish_non_exhaustive()
    }
}

/// Every accepted input shape for [`Pen::from_pens`].
#[derive(Debug)]
pub enum PenSource {
    /// A collection; each member is converted and appended to a new group.
    Group(Vec<PenSource>),
    /// An existing pen tree.
    Native(Pen),
    /// A foreign recording.
    Foreign(ForeignPen),
}

impl From<Pen> for PenSource {
    fn from(p: Pen) -> Self {
        PenSource::Native(p)
    }
}

impl From<ForeignPen> for PenSource {
    fn from(p: ForeignPen) -> Self {
        PenSource::Foreign(p)
    }
}

impl Pen {
    /// Build a pen tree from any accepted input shape.
    ///
    /// Native pens with content are returned unchanged; an empty native pen becomes a fresh
    /// empty pen. Foreign recordings are replayed into a value node carrying `fill`, stroke
    /// colour and weight, `frame` and `glyphName`; their other style keys are not carried over.
    pub fn from_pens(source: impl Into<PenSource>) -> Pen {
        match source.into() {
            PenSource::Group(members) => Pen::group(members.into_iter().map(Pen::from_pens)),
            PenSource::Native(p) if !p.is_empty() => p,
            PenSource::Native(_) => Pen::new(),
            PenSource::Foreign(foreign) => {
                let mut path = BezPath::new();
                foreign.outline.replay(&mut path);
                let mut out = Pen::from_path(path);
                if let Some(fill) = foreign.style.fill {
                    out = out.f(fill);
                }
                if let Some(stroke) = foreign.style.stroke {
                    out = out.s(stroke.color).sw(stroke.weight);
                }
                if let Some(frame) = foreign.frame {
                    out = out.with_data(keys::FRAME, frame);
                }
                if let Some(name) = foreign.glyph_name {
                    out = out.with_data(keys::GLYPH_NAME, name);
                }
                out
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pen/source.rs"]
mod tests;
