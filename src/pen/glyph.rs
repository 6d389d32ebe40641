use super::Pen;
use super::data::{DataValue, keys};
use crate::foundation::core::{BezPath, Rect};

impl Pen {
    /// Value node for one glyph outline with its name and advance width.
    pub fn glyph(name: impl Into<String>, outline: BezPath, advance: f64) -> Self {
        Pen::from_path(outline)
            .with_data(keys::GLYPH_NAME, DataValue::Str(name.into()))
            .with_data(keys::ADVANCE, advance)
    }

    /// Glyph name recorded by a font producer.
    pub fn glyph_name(&self) -> Option<&str> {
        self.data_get(keys::GLYPH_NAME).and_then(DataValue::as_str)
    }

    /// Advance width: the recorded advance, else the width of the recorded frame.
    pub fn advance(&self) -> Option<f64> {
        self.data_get(keys::ADVANCE)
            .and_then(DataValue::as_f64)
            .or_else(|| self.frame().map(|f: Rect| f.width()))
    }

    /// Lay glyph children out along the baseline by their advances, starting at `x`.
    pub fn set_advances_from(mut self, x: f64) -> Self {
        let mut cursor = x;
        for child in self.children_mut() {
            let Some(adv) = child.advance() else {
                continue;
            };
            child.transform_mut(crate::foundation::core::Affine::translate((cursor, 0.0)));
            cursor += adv;
        }
        self
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pen/glyph.rs"]
mod tests;
