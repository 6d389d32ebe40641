use super::Pen;
use super::attrs::{Attr, DEFAULT_LAYER, Dash, ImageFill, ImageSource, Shadow};
use super::data::keys;
use crate::foundation::color::{BlendMode, Fill};
use crate::foundation::core::Rect;
use std::collections::BTreeMap;
use std::path::PathBuf;

impl Pen {
    /// Apply `attr` to `layer` on this node and every descendant.
    pub fn set_attr(&mut self, layer: &str, attr: Attr) -> &mut Self {
        for child in self.children_mut() {
            child.set_attr(layer, attr.clone());
        }
        self.attrs.push(layer, attr);
        self
    }

    /// Chainable [`Pen::set_attr`].
    pub fn attr(mut self, layer: &str, attr: Attr) -> Self {
        self.set_attr(layer, attr);
        self
    }

    fn default_attr(self, attr: Attr) -> Self {
        self.attr(DEFAULT_LAYER, attr)
    }

    /// Fill with a colour or gradient.
    pub fn f(self, fill: impl Into<Fill>) -> Self {
        self.default_attr(Attr::Fill {
            fill: Some(fill.into()),
        })
    }

    /// Disable the fill.
    pub fn no_fill(self) -> Self {
        self.default_attr(Attr::Fill { fill: None })
    }

    /// Stroke colour or gradient.
    pub fn s(self, color: impl Into<Fill>) -> Self {
        self.default_attr(Attr::StrokeColor {
            fill: Some(color.into()),
        })
    }

    /// Disable the stroke.
    pub fn no_stroke(self) -> Self {
        self.default_attr(Attr::StrokeColor { fill: None })
    }

    /// Stroke weight.
    pub fn sw(self, weight: f64) -> Self {
        self.default_attr(Attr::StrokeWeight { weight })
    }

    /// Stroke colour and weight together.
    pub fn ssw(self, color: impl Into<Fill>, weight: f64) -> Self {
        self.s(color).sw(weight)
    }

    /// Stroke dash pattern.
    pub fn dash(self, dashes: Vec<f64>, offset: f64) -> Self {
        self.default_attr(Attr::Dash(Dash { dashes, offset }))
    }

    /// Stroke miter limit.
    pub fn miter(self, limit: f64) -> Self {
        self.default_attr(Attr::Miter { limit })
    }

    /// Blend mode for every paint of the node.
    pub fn blend(self, mode: BlendMode) -> Self {
        self.default_attr(Attr::Blend { mode })
    }

    /// Show or hide.
    pub fn visible(self, visible: bool) -> Self {
        self.default_attr(Attr::Visible { visible })
    }

    /// Drop shadow.
    pub fn shadow(self, shadow: Shadow) -> Self {
        self.default_attr(Attr::Shadow(shadow))
    }

    /// Fill with an image file placed at `rect`.
    pub fn img(self, path: impl Into<PathBuf>, rect: Rect, pattern: bool, opacity: f64) -> Self {
        self.default_attr(Attr::Image(ImageFill {
            source: ImageSource::Path(path.into()),
            rect,
            opacity,
            pattern,
        }))
    }

    /// Fill with an arbitrary image source.
    pub fn image(self, fill: ImageFill) -> Self {
        self.default_attr(Attr::Image(fill))
    }

    /// Raw backend paint overrides.
    pub fn skp(self, paint: BTreeMap<String, serde_json::Value>) -> Self {
        self.default_attr(Attr::RawPaint { paint })
    }

    /// Opacity multiplier inherited by every leaf below this node.
    pub fn alpha(self, alpha: f64) -> Self {
        self.with_data(keys::ALPHA, alpha)
    }

    /// Gaussian mask blur of the fill.
    pub fn blur(self, amount: f64) -> Self {
        self.with_data(keys::BLUR, amount)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pen/styling.rs"]
mod tests;
