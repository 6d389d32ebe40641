//! Live preview loop.
//!
//! [`PreviewLoop`] is a single-threaded cooperative scheduler. Each tick it either plays back
//! frames already rendered to disk, or asks a [`Renderer`] for the previews waiting to be
//! painted, packs them into one window column, draws each one and presents the result. A
//! drawing failure in one preview is caught, reported on that preview and drawn as text; the
//! loop keeps going.
//!
//! Stdin commands arrive through a [`mailbox::Mailbox`]; windowing goes through the
//! [`host::WindowHost`] trait so the same loop runs against a real window or offscreen.

/// Preview window configuration.
pub mod config;
/// Window host boundary and the offscreen host.
pub mod host;
/// Keyboard shortcut table and modifier matching.
pub mod keyboard;
/// Window layout packing and pinning.
pub mod layout;
/// Single-slot stdin handoff.
pub mod mailbox;
/// On-screen host backed by winit and the GPU context.
#[cfg(feature = "viewer")]
pub mod window;

pub use config::PreviewConfig;
pub use host::{HeadlessHost, InputEvent, WindowHost};
pub use keyboard::{
    Key, KeyAction, KeyLayer, Modifiers, ModsInput, Shortcut, ShortcutTable, modifiers_match,
};
pub use layout::{PreviewSlot, WindowLayout, calculate_window_size, pin_window};
pub use mailbox::{Mailbox, StdinMailbox};

use crate::foundation::color::Color;
use crate::foundation::core::{Point, Rect};
use crate::foundation::error::{RunonError, RunonResult};
use crate::pen::Pen;
use crate::render::canvas::{Canvas, Paint};
use crate::render::composite::composite_to_canvas;
use crate::render::effects::precompose_fx;
use crate::render::image_io::load_image;
use config::clamp_opacity;
use host::window_clear_color;
use layout::centre_in_frame;
use std::path::PathBuf;
use std::sync::Arc;

/// Caller-supplied drawing routine for a preview that paints the canvas itself.
pub type DirectDraw = Box<dyn FnMut(&mut dyn Canvas) -> RunonResult<()>>;

/// What a preview shows.
pub enum PreviewContent {
    /// Pen tree composited into the preview rect.
    Pen(Pen),
    /// Encoded image file drawn at its natural size.
    Image(PathBuf),
    /// Routine drawing straight onto the canvas, in preview-local units.
    Direct(DirectDraw),
}

impl std::fmt::Debug for PreviewContent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PreviewContent::Pen(p) => f.debug_tuple("Pen").field(&p.to_string()).finish(),
            PreviewContent::Image(p) => f.debug_tuple("Image").field(p).finish(),
            PreviewContent::Direct(_) => f.write_str("Direct(..)"),
        }
    }
}

/// One result waiting to be painted.
#[derive(Debug)]
pub struct Preview {
    /// Artwork rectangle in pen units.
    pub rect: Rect,
    /// Artwork.
    pub content: PreviewContent,
    /// Background painted behind the artwork unless the window is transparent.
    pub bg: Color,
    /// Draw over the previous preview's row instead of starting a new one.
    pub layer: bool,
    /// Clip drawing to the preview rect.
    pub clip: bool,
    /// Flatten the pen through a precompose before drawing.
    pub composites: bool,
    /// Named style layer.
    pub style: Option<String>,
    /// Short error message; set, the preview is drawn as an error placeholder.
    pub error: Option<String>,
}

impl Preview {
    fn with_content(rect: Rect, content: PreviewContent) -> Self {
        Self {
            rect,
            content,
            bg: Color::WHITE,
            layer: false,
            clip: false,
            composites: false,
            style: None,
            error: None,
        }
    }

    /// Preview of a pen tree.
    pub fn pen(rect: Rect, pen: Pen) -> Self {
        Self::with_content(rect, PreviewContent::Pen(pen))
    }

    /// Preview of an image file.
    pub fn image(rect: Rect, path: impl Into<PathBuf>) -> Self {
        Self::with_content(rect, PreviewContent::Image(path.into()))
    }

    /// Preview drawn by `draw`.
    pub fn direct(rect: Rect, draw: impl FnMut(&mut dyn Canvas) -> RunonResult<()> + 'static) -> Self {
        Self::with_content(rect, PreviewContent::Direct(Box::new(draw)))
    }

    /// Background colour.
    pub fn with_bg(mut self, bg: Color) -> Self {
        self.bg = bg;
        self
    }

    /// Stack on the previous preview's row.
    pub fn as_layer(mut self) -> Self {
        self.layer = true;
        self
    }

    /// Clip to the preview rect.
    pub fn clipped(mut self) -> Self {
        self.clip = true;
        self
    }

    /// Precompose before drawing.
    pub fn composited(mut self) -> Self {
        self.composites = true;
        self
    }

    /// Named style layer.
    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = Some(style.into());
        self
    }

    /// Error placeholder showing `message`.
    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.error = Some(message.into());
        self
    }

    fn slot(&self) -> PreviewSlot {
        PreviewSlot {
            rect: self.rect,
            layer: self.layer,
            is_error: self.error.is_some(),
        }
    }
}

/// Requests the renderer can make of the loop.
#[derive(Clone, Debug, PartialEq)]
pub enum LoopCommand {
    /// Start looping over these rendered frames.
    PlayPreloaded(Vec<PathBuf>),
    /// Toggle preloaded playback: stop if playing, else play these frames.
    TogglePreloaded(Vec<PathBuf>),
    /// Stop preloaded playback.
    StopPreloaded,
    /// Change window opacity by a delta.
    AdjustOpacity(f64),
    /// Set window opacity.
    SetOpacity(f64),
    /// Clear the scroll offset.
    ResetScroll,
    /// End the loop.
    Exit,
}

/// The application side of the preview loop.
pub trait Renderer {
    /// Take the previews waiting to be painted; an empty list means nothing changed.
    fn previews_waiting_to_paint(&mut self) -> Vec<Preview>;

    /// Previews handed back after a paint, with errors recorded on them, plus the indices that
    /// drew without error.
    fn previews_painted(&mut self, _previews: Vec<Preview>, _drawn: &[usize]) {}

    /// Frame rate of the active animation; `None` disables frame pacing.
    fn fps(&self) -> Option<f64> {
        None
    }

    /// Background for preloaded playback.
    fn background(&self) -> Color {
        Color::WHITE
    }

    /// Active key layer.
    fn keylayer(&self) -> KeyLayer {
        KeyLayer::Default
    }

    /// A shortcut fired.
    fn on_shortcut(&mut self, _shortcut: Shortcut) -> Option<LoopCommand> {
        None
    }

    /// Key event while a non-default key layer is active.
    fn on_key(&mut self, _key: Key, _action: KeyAction, _mods: Modifiers) -> Option<LoopCommand> {
        None
    }

    /// Text input while a non-default key layer is active.
    fn on_character(&mut self, _c: char) -> Option<LoopCommand> {
        None
    }

    /// Mouse button, position in content pixels with a bottom-left origin.
    fn on_mouse_button(&mut self, _pos: Point, _button: u8, _pressed: bool) -> Option<LoopCommand> {
        None
    }

    /// Cursor move, position in content pixels with a bottom-left origin.
    fn on_mouse_move(&mut self, _pos: Point) -> Option<LoopCommand> {
        None
    }

    /// Latest non-empty stdin line, trimmed.
    fn on_stdin(&mut self, _line: &str) -> Option<LoopCommand> {
        None
    }

    /// Window content scale changed.
    fn on_content_scale_changed(&mut self, _scale: f64) {}

    /// Overlay drawn over the previews while a non-default key layer is active.
    fn draw_keylayer(&mut self, _canvas: &mut dyn Canvas, _frame: Rect) -> RunonResult<()> {
        Ok(())
    }

    /// Clear per-tick key state.
    fn reset_keystate(&mut self) {}

    /// Whether the renderer wants the loop to stop.
    fn is_dead(&self) -> bool {
        false
    }

    /// Loop ended.
    fn on_exit(&mut self) {}
}

/// What one [`PreviewLoop::tick`] did.
#[derive(Clone, Debug, PartialEq)]
pub enum Tick {
    /// Not due yet; events were dispatched while waiting.
    Waiting,
    /// Nothing to paint; the idle sleep grew.
    Idle,
    /// Previews were painted; holds the indices that drew without error.
    Rendered(Vec<usize>),
    /// One preloaded frame was shown.
    Preloaded,
    /// The window is gone or the renderer is dead.
    Closed,
}

const ERROR_TRACEBACK_HINT: &str = "> See process in terminal for traceback";

/// Cooperative preview scheduler over a [`WindowHost`].
pub struct PreviewLoop<H: WindowHost> {
    config: PreviewConfig,
    host: H,
    shortcuts: ShortcutTable,
    mailbox: Option<Arc<Mailbox>>,
    backoff: f64,
    last_time: f64,
    last_rect: Option<Rect>,
    preloaded: Vec<PathBuf>,
    playing_preloaded: Option<usize>,
    scroll_y: f64,
    focused: bool,
    content_scale: f64,
    exit_requested: bool,
}

impl<H: WindowHost + std::fmt::Debug> std::fmt::Debug for PreviewLoop<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreviewLoop")
            .field("host", &self.host)
            .field("backoff", &self.backoff)
            .field("last_rect", &self.last_rect)
            .field("playing_preloaded", &self.playing_preloaded)
            .field("scroll_y", &self.scroll_y)
            .finish_non_exhaustive()
    }
}

impl<H: WindowHost> PreviewLoop<H> {
    /// Loop over `host` with the default shortcut table.
    pub fn new(config: PreviewConfig, mut host: H) -> Self {
        host.set_opacity(config.opacity());
        let content_scale = config
            .window_content_scale
            .unwrap_or_else(|| host.content_scale());
        Self {
            backoff: config.refresh_delay,
            config,
            host,
            shortcuts: ShortcutTable::default(),
            mailbox: None,
            last_time: -1.0,
            last_rect: None,
            preloaded: Vec::new(),
            playing_preloaded: None,
            scroll_y: 0.0,
            focused: false,
            content_scale,
            exit_requested: false,
        }
    }

    /// Replace the shortcut table.
    pub fn with_shortcuts(mut self, shortcuts: ShortcutTable) -> Self {
        self.shortcuts = shortcuts;
        self
    }

    /// Drain `mailbox` once per tick and forward lines to the renderer.
    pub fn with_mailbox(mut self, mailbox: Arc<Mailbox>) -> Self {
        self.mailbox = Some(mailbox);
        self
    }

    /// Host.
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Mutable host.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Current idle sleep in seconds.
    pub fn backoff(&self) -> f64 {
        self.backoff
    }

    /// Window content rect of the last paint.
    pub fn last_rect(&self) -> Option<Rect> {
        self.last_rect
    }

    /// Accumulated vertical scroll.
    pub fn scroll_y(&self) -> f64 {
        self.scroll_y
    }

    /// Whether the window currently has focus.
    pub fn is_focused(&self) -> bool {
        self.focused
    }

    /// Index of the preloaded frame shown next, when playing.
    pub fn playing_preloaded(&self) -> Option<usize> {
        self.playing_preloaded
    }

    /// Clear the scroll offset.
    pub fn reset(&mut self) {
        self.scroll_y = 0.0;
    }

    /// Start looping over `frames`.
    pub fn preload_frames(&mut self, frames: Vec<PathBuf>) {
        self.preloaded = frames;
        self.playing_preloaded = Some(0);
    }

    /// Stop preloaded playback, keeping the frame list.
    pub fn stop_playing_preloaded(&mut self) {
        self.playing_preloaded = None;
    }

    /// Stop and forget the frames if playing, otherwise play `frames`.
    pub fn toggle_play_preloaded(&mut self, frames: Vec<PathBuf>) {
        if self.playing_preloaded.is_some() {
            self.playing_preloaded = None;
            self.preloaded.clear();
        } else {
            self.preload_frames(frames);
        }
    }

    /// Run ticks until the window closes or the renderer dies, then call
    /// [`Renderer::on_exit`]. Host failures end the loop with an error; preview failures never do.
    pub fn listen<R: Renderer + ?Sized>(&mut self, renderer: &mut R) -> RunonResult<()> {
        let result = loop {
            match self.tick(renderer) {
                Ok(Tick::Closed) => break Ok(()),
                Ok(_) => {}
                Err(e) => break Err(e),
            }
        };
        tracing::debug!("preview loop finished");
        renderer.on_exit();
        result
    }

    /// One scheduler step.
    pub fn tick<R: Renderer + ?Sized>(&mut self, renderer: &mut R) -> RunonResult<Tick> {
        if self.exit_requested || renderer.is_dead() || self.host.should_close() {
            return Ok(Tick::Closed);
        }

        if self.config.window_content_scale.is_none() {
            let scale = self.host.content_scale();
            if scale != self.content_scale {
                self.content_scale = scale;
                renderer.on_content_scale_changed(scale);
            }
        }

        let t = self.host.now();
        let fps = renderer.fps().filter(|f| f.is_finite() && *f > 0.0);
        if let Some(fps) = fps {
            let spf = 1.0 / fps;
            let td = t - self.last_time;
            if td >= spf {
                self.last_time = t;
            } else {
                let events = self.host.wait_events(spf - td);
                self.dispatch(renderer, events);
                return Ok(Tick::Waiting);
            }
        }

        let outcome = if self.playing_preloaded.is_some() && !self.preloaded.is_empty() {
            self.show_preloaded_frame(renderer)?;
            self.host.sleep(self.config.preloaded_interval);
            Tick::Preloaded
        } else {
            self.host.sleep(self.backoff);
            self.last_time = t;
            let outcome = match self.turn_over(renderer)? {
                Some(drawn) => Tick::Rendered(drawn),
                None => Tick::Idle,
            };
            if let Some(line) = self.mailbox.as_ref().and_then(|m| m.take()) {
                let line = line.trim();
                if !line.is_empty() {
                    let cmd = renderer.on_stdin(line);
                    self.apply(cmd);
                }
            }
            outcome
        };

        renderer.reset_keystate();
        let events = self.host.poll_events();
        self.dispatch(renderer, events);
        Ok(outcome)
    }

    /// Paint every waiting preview. Returns `None` when nothing was waiting, otherwise the
    /// indices that drew without error.
    pub fn turn_over<R: Renderer + ?Sized>(&mut self, renderer: &mut R) -> RunonResult<Option<Vec<usize>>> {
        let mut previews = renderer.previews_waiting_to_paint();
        if previews.is_empty() {
            self.backoff = (self.backoff + self.config.backoff_step).min(self.config.backoff_max);
            return Ok(None);
        }
        self.backoff = self.config.refresh_delay;

        let slots: Vec<PreviewSlot> = previews.iter().map(Preview::slot).collect();
        let layout = calculate_window_size(&slots, self.config.preview_scale, self.last_rect);
        self.last_rect = Some(layout.frame);
        if layout.changed {
            tracing::debug!(w = layout.frame.width(), h = layout.frame.height(), "window layout changed");
        }
        self.host.prepare(layout.frame, layout.changed)?;

        let transparent = self.config.window_transparent;
        let scroll_y = self.scroll_y;
        let mut drawn = Vec::with_capacity(previews.len());
        let drew = self.host.draw(&mut |canvas| {
            drawn.clear();
            canvas.clear(window_clear_color(transparent));
            for (idx, preview) in previews.iter_mut().enumerate() {
                let rect = centre_in_frame(layout.rects[idx], layout.frame);
                match draw_preview(canvas, preview, rect, layout.scale, scroll_y, transparent) {
                    Ok(()) if preview.error.is_none() => drawn.push(idx),
                    Ok(()) => {}
                    Err(e) => {
                        let message = e.short_message();
                        tracing::warn!(preview = idx, error = %e, "preview draw failed");
                        let red = Color::rgb(1.0, 0.0, 0.0);
                        draw_message(canvas, &message, Point::new(10.0, 32.0), 36.0, red);
                        preview.error = Some(message);
                    }
                }
            }
            if renderer.keylayer() != KeyLayer::Default {
                renderer.draw_keylayer(canvas, layout.frame)?;
            }
            Ok(())
        })?;
        if drew {
            self.host.present()?;
        }
        renderer.previews_painted(previews, &drawn);
        Ok(Some(drawn))
    }

    fn show_preloaded_frame<R: Renderer + ?Sized>(&mut self, renderer: &mut R) -> RunonResult<()> {
        let Some(idx) = self.playing_preloaded else {
            return Ok(());
        };
        let idx = idx % self.preloaded.len();
        let path = self.preloaded[idx].clone();
        let bg = (!self.config.window_transparent).then(|| renderer.background());
        let image = match load_image(&path) {
            Ok(frame) => Some(Arc::new(frame)),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "preloaded frame unreadable");
                None
            }
        };
        if let Some(image) = image.as_ref() {
            let frame = Rect::new(0.0, 0.0, f64::from(image.width), f64::from(image.height));
            let recreate = self.last_rect != Some(frame);
            self.last_rect = Some(frame);
            self.host.prepare(frame, recreate)?;
        }
        let drew = self.host.draw(&mut |canvas| {
            if let Some(bg) = bg {
                canvas.clear(bg);
            }
            if let Some(image) = image.as_ref() {
                let dst = Rect::new(0.0, 0.0, f64::from(image.width), f64::from(image.height));
                canvas.draw_image(image, dst, &Paint::fill(Color::WHITE))?;
            }
            Ok(())
        })?;
        if drew {
            self.host.present()?;
        }
        let next = idx + 1;
        self.playing_preloaded = Some(if next == self.preloaded.len() { 0 } else { next });
        Ok(())
    }

    fn dispatch<R: Renderer + ?Sized>(&mut self, renderer: &mut R, events: Vec<InputEvent>) {
        for event in events {
            let cmd = match event {
                InputEvent::Key { key, action, mods } => {
                    if renderer.keylayer() != KeyLayer::Default {
                        renderer.on_key(key, action, mods)
                    } else {
                        self.shortcuts
                            .resolve(key, action, ModsInput::Bits(mods))
                            .and_then(|s| renderer.on_shortcut(s))
                    }
                }
                InputEvent::Char(c) => {
                    if renderer.keylayer() != KeyLayer::Default {
                        renderer.on_character(c)
                    } else {
                        None
                    }
                }
                InputEvent::MouseButton { pos, button, pressed } => {
                    let pos = self.content_point(pos);
                    renderer.on_mouse_button(pos, button, pressed)
                }
                InputEvent::MouseMove(pos) => {
                    let pos = self.content_point(pos);
                    renderer.on_mouse_move(pos)
                }
                InputEvent::Scroll { dy, .. } => {
                    self.scroll_y += dy;
                    None
                }
                InputEvent::Focus(focused) => {
                    self.focused = focused;
                    None
                }
                InputEvent::CloseRequested => Some(LoopCommand::Exit),
            };
            self.apply(cmd);
        }
    }

    /// Window position to content pixels with a bottom-left origin.
    fn content_point(&self, pos: Point) -> Point {
        let s = self.content_scale;
        let h = self.last_rect.map(|r| r.height()).unwrap_or(0.0);
        Point::new(pos.x * s, h - pos.y * s)
    }

    fn apply(&mut self, cmd: Option<LoopCommand>) {
        let Some(cmd) = cmd else {
            return;
        };
        tracing::debug!(?cmd, "loop command");
        match cmd {
            LoopCommand::PlayPreloaded(frames) => self.preload_frames(frames),
            LoopCommand::TogglePreloaded(frames) => self.toggle_play_preloaded(frames),
            LoopCommand::StopPreloaded => self.stop_playing_preloaded(),
            LoopCommand::AdjustOpacity(delta) => {
                let op = clamp_opacity(self.host.opacity() + delta);
                self.host.set_opacity(op);
            }
            LoopCommand::SetOpacity(op) => self.host.set_opacity(clamp_opacity(op)),
            LoopCommand::ResetScroll => self.reset(),
            LoopCommand::Exit => self.exit_requested = true,
        }
    }
}

/// Draw one preview into `rect` (window units, top-left origin).
///
/// Direct-draw failures become the preview's error placeholder here; pen and image failures are
/// returned to the caller. The canvas state is restored either way.
fn draw_preview(
    canvas: &mut dyn Canvas,
    preview: &mut Preview,
    rect: Rect,
    scale: f64,
    scroll_y: f64,
    transparent: bool,
) -> RunonResult<()> {
    canvas.save();
    let out = draw_preview_inner(canvas, preview, rect, scale, scroll_y, transparent);
    canvas.restore();
    out
}

fn draw_preview_inner(
    canvas: &mut dyn Canvas,
    preview: &mut Preview,
    rect: Rect,
    scale: f64,
    scroll_y: f64,
    transparent: bool,
) -> RunonResult<()> {
    if let PreviewContent::Image(path) = &preview.content {
        match load_image(path) {
            Ok(frame) => {
                let dst = Rect::new(
                    rect.x0,
                    rect.y0,
                    rect.x0 + f64::from(frame.width),
                    rect.y0 + f64::from(frame.height),
                );
                canvas.draw_image(&Arc::new(frame), dst, &Paint::fill(Color::WHITE))?;
            }
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "preview image unreadable"),
        }
        return Ok(());
    }

    let local = Rect::new(0.0, 0.0, rect.width(), rect.height());
    canvas.translate(0.0, scroll_y);
    canvas.translate(rect.x0, rect.y0);
    if !transparent {
        canvas.draw_path(&crate::pen::drawing::rect_path(local), &Paint::fill(preview.bg))?;
    }
    if preview.error.is_none() {
        canvas.scale(scale, scale);
    }
    if preview.clip {
        canvas.clip_rect(local);
    }

    let mut error_color = Color::WHITE;
    if preview.error.is_none() {
        match &mut preview.content {
            PreviewContent::Direct(draw) => {
                if let Err(e) = draw(canvas) {
                    tracing::warn!(error = %e, "direct preview draw failed");
                    preview.error = Some(e.short_message());
                    error_color = Color::BLACK;
                }
            }
            PreviewContent::Pen(pen) => {
                let style = preview.style.as_deref();
                if preview.composites {
                    let flat = pen.copy().ch(&precompose_fx(1.0), preview.rect)?;
                    composite_to_canvas(&flat, preview.rect, canvas, 1.0, style)?;
                } else {
                    composite_to_canvas(pen, preview.rect, canvas, 1.0, style)?;
                }
            }
            PreviewContent::Image(_) => {
                return Err(RunonError::render("image previews are drawn unscaled"));
            }
        }
    }

    if let Some(message) = &preview.error {
        draw_message(canvas, message, Point::new(30.0, 70.0), 50.0, error_color);
        draw_message(canvas, ERROR_TRACEBACK_HINT, Point::new(30.0, 120.0), 32.0, error_color);
    }
    Ok(())
}

/// Error text is best effort: a failure to typeset it is logged and the frame goes on.
fn draw_message(canvas: &mut dyn Canvas, text: &str, origin: Point, size: f64, color: Color) {
    if let Err(e) = canvas.draw_text(text, origin, size, color) {
        tracing::warn!(error = %e, "error text not drawn");
    }
}

#[cfg(test)]
#[path = "../../tests/unit/preview/mod.rs"]
mod tests;
