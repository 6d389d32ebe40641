use super::Pen;
use crate::foundation::core::Rect;
use crate::foundation::error::RunonResult;

/// Pen-to-pen transform plugged into a chain with [`Pen::ch`].
///
/// Raster effects (precompose, blur, phototype) implement this by snapshotting the pen inside
/// `rect` and returning an image-filled rectangle.
pub trait Effect {
    /// Transform `pen` within the resolved target `rect`.
    fn apply(&self, pen: Pen, rect: Rect) -> RunonResult<Pen>;
}

impl<F> Effect for F
where
    F: Fn(Pen, Rect) -> RunonResult<Pen>,
{
    fn apply(&self, pen: Pen, rect: Rect) -> RunonResult<Pen> {
        self(pen, rect)
    }
}

impl Pen {
    /// Pass this pen through `fx` once, with `rect` as its target.
    pub fn ch(self, fx: &dyn Effect, rect: Rect) -> RunonResult<Pen> {
        fx.apply(self, rect)
    }

    /// Target rectangle for effects: the recorded frame, else the ambit.
    pub fn resolved_rect(&self) -> RunonResult<Rect> {
        match self.frame() {
            Some(r) => Ok(r),
            None => self.ambit(),
        }
    }

    /// [`Pen::ch`] against [`Pen::resolved_rect`].
    pub fn ch_resolved(self, fx: &dyn Effect) -> RunonResult<Pen> {
        let rect = self.resolved_rect()?;
        fx.apply(self, rect)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pen/fx.rs"]
mod tests;
