//! Window host boundary and an offscreen implementation.

use super::keyboard::{Key, KeyAction, Modifiers};
use crate::foundation::color::Color;
use crate::foundation::core::{FrameRGBA, Point, Rect};
use crate::foundation::error::RunonResult;
use crate::render::canvas::Canvas;
use crate::render::raster::RasterCanvas;
use std::collections::VecDeque;

/// Input delivered by a host.
#[derive(Clone, Debug, PartialEq)]
pub enum InputEvent {
    /// Key transition with the modifier state at that moment.
    Key {
        /// Physical key.
        key: Key,
        /// Press, repeat or release.
        action: KeyAction,
        /// Held modifiers.
        mods: Modifiers,
    },
    /// Text input.
    Char(char),
    /// Mouse button change at a window position (top-left origin, window units).
    MouseButton {
        /// Cursor position.
        pos: Point,
        /// Button index, 0 = primary.
        button: u8,
        /// Pressed or released.
        pressed: bool,
    },
    /// Cursor moved (top-left origin, window units).
    MouseMove(Point),
    /// Scroll wheel delta.
    Scroll {
        /// Horizontal delta.
        dx: f64,
        /// Vertical delta.
        dy: f64,
    },
    /// Focus gained or lost.
    Focus(bool),
    /// The user asked to close the window.
    CloseRequested,
}

/// What the preview loop needs from a window: a drawable surface, events and a clock.
pub trait WindowHost {
    /// Make the drawing surface match `frame`; `recreate` is set when the layout changed.
    fn prepare(&mut self, frame: Rect, recreate: bool) -> RunonResult<()>;

    /// Run `draw` against the current surface. Returns `Ok(false)` when no surface exists.
    fn draw(&mut self, draw: &mut dyn FnMut(&mut dyn Canvas) -> RunonResult<()>)
    -> RunonResult<bool>;

    /// Flush and show the surface.
    fn present(&mut self) -> RunonResult<()>;

    /// Events that arrived since the last call, without blocking.
    fn poll_events(&mut self) -> Vec<InputEvent>;

    /// Events that arrive within `timeout` seconds; returns early on the first batch.
    fn wait_events(&mut self, timeout: f64) -> Vec<InputEvent>;

    /// Whether the window is gone.
    fn should_close(&self) -> bool;

    /// Monotonic time in seconds.
    fn now(&self) -> f64;

    /// Block for `secs` seconds.
    fn sleep(&mut self, secs: f64);

    /// Pixels per window unit.
    fn content_scale(&self) -> f64 {
        1.0
    }

    /// Current window opacity.
    fn opacity(&self) -> f64 {
        1.0
    }

    /// Set the window opacity (already clamped by the caller).
    fn set_opacity(&mut self, _opacity: f64) {}
}

/// Host without a window: draws into a [`RasterCanvas`] and keeps every presented frame.
///
/// Time is virtual and only advances through [`WindowHost::sleep`] and
/// [`WindowHost::wait_events`], so loop runs are deterministic.
#[derive(Debug)]
pub struct HeadlessHost {
    canvas: Option<RasterCanvas>,
    clock: f64,
    scripted: VecDeque<Vec<InputEvent>>,
    presented: Vec<FrameRGBA>,
    max_polls: Option<usize>,
    polls: usize,
    closed: bool,
    opacity: f64,
    content_scale: f64,
    recreated: usize,
}

impl Default for HeadlessHost {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessHost {
    /// Host with no surface yet and no scripted input.
    pub fn new() -> Self {
        Self {
            canvas: None,
            clock: 0.0,
            scripted: VecDeque::new(),
            presented: Vec::new(),
            max_polls: None,
            polls: 0,
            closed: false,
            opacity: 1.0,
            content_scale: 1.0,
            recreated: 0,
        }
    }

    /// Close after `polls` calls to [`WindowHost::poll_events`].
    pub fn close_after(mut self, polls: usize) -> Self {
        self.max_polls = Some(polls);
        self
    }

    /// Queue one batch of events, handed out by the next poll or wait.
    pub fn push_events(&mut self, events: impl IntoIterator<Item = InputEvent>) {
        self.scripted.push_back(events.into_iter().collect());
    }

    /// Report `scale` pixels per window unit.
    pub fn set_content_scale(&mut self, scale: f64) {
        self.content_scale = scale;
    }

    /// Frames shown so far, oldest first.
    pub fn presented(&self) -> &[FrameRGBA] {
        &self.presented
    }

    /// Most recently shown frame.
    pub fn last_frame(&self) -> Option<&FrameRGBA> {
        self.presented.last()
    }

    /// How many times the surface was (re)allocated.
    pub fn surfaces_created(&self) -> usize {
        self.recreated
    }

    fn next_batch(&mut self) -> Vec<InputEvent> {
        let batch = self.scripted.pop_front().unwrap_or_default();
        if batch.contains(&InputEvent::CloseRequested) {
            self.closed = true;
        }
        batch
    }
}

impl WindowHost for HeadlessHost {
    fn prepare(&mut self, frame: Rect, recreate: bool) -> RunonResult<()> {
        if recreate || self.canvas.is_none() {
            let w = frame.width().round().max(1.0) as u32;
            let h = frame.height().round().max(1.0) as u32;
            self.canvas = Some(RasterCanvas::new(w, h)?);
            self.recreated += 1;
        }
        Ok(())
    }

    fn draw(
        &mut self,
        draw: &mut dyn FnMut(&mut dyn Canvas) -> RunonResult<()>,
    ) -> RunonResult<bool> {
        match self.canvas.as_mut() {
            Some(canvas) => draw(canvas).map(|()| true),
            None => Ok(false),
        }
    }

    fn present(&mut self) -> RunonResult<()> {
        if let Some(canvas) = self.canvas.as_mut() {
            self.presented.push(canvas.to_frame());
        }
        Ok(())
    }

    fn poll_events(&mut self) -> Vec<InputEvent> {
        self.polls += 1;
        if self.max_polls.is_some_and(|m| self.polls >= m) {
            self.closed = true;
        }
        self.next_batch()
    }

    fn wait_events(&mut self, timeout: f64) -> Vec<InputEvent> {
        self.clock += timeout.max(0.0);
        self.next_batch()
    }

    fn should_close(&self) -> bool {
        self.closed
    }

    fn now(&self) -> f64 {
        self.clock
    }

    fn sleep(&mut self, secs: f64) {
        self.clock += secs.max(0.0);
    }

    fn content_scale(&self) -> f64 {
        self.content_scale
    }

    fn opacity(&self) -> f64 {
        self.opacity
    }

    fn set_opacity(&mut self, opacity: f64) {
        self.opacity = opacity;
    }
}

/// Background grey the loop clears to before drawing previews.
pub(crate) fn window_clear_color(transparent: bool) -> Color {
    Color::rgba(0.3, 0.3, 0.3, if transparent { 0.0 } else { 1.0 })
}

#[cfg(test)]
#[path = "../../tests/unit/preview/host.rs"]
mod tests;
