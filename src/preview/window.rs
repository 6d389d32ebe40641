//! On-screen [`WindowHost`] backed by a winit window and the GPU context.
//!
//! The event loop is pumped rather than run, so [`super::PreviewLoop`] stays in charge of
//! scheduling. Events received while pumping are buffered until the next poll.

use super::config::PreviewConfig;
use super::host::{InputEvent, WindowHost};
use super::keyboard::{Key, KeyAction, Modifiers};
use super::layout::{pin_window, window_size};
use crate::foundation::core::{Point, Rect};
use crate::foundation::error::{RunonError, RunonResult};
use crate::gpu::GpuContext;
use crate::render::canvas::Canvas;
use std::sync::Arc;
use std::time::{Duration, Instant};
use winit::application::ApplicationHandler;
use winit::dpi::{LogicalPosition, LogicalSize};
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::{KeyCode, ModifiersState, PhysicalKey};
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::{Window, WindowId, WindowLevel};

/// Preview window.
pub struct WinitHost {
    event_loop: EventLoop<()>,
    app: WindowApp,
    started: Instant,
}

impl std::fmt::Debug for WinitHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WinitHost")
            .field("window", &self.app.window.as_ref().map(|w| w.id()))
            .field("gpu", &self.app.gpu)
            .field("closed", &self.app.closed)
            .finish_non_exhaustive()
    }
}

struct WindowApp {
    config: PreviewConfig,
    window: Option<Arc<Window>>,
    work_area: Option<Rect>,
    gpu: Option<GpuContext>,
    events: Vec<InputEvent>,
    mods: Modifiers,
    cursor: Point,
    closed: bool,
    opacity: f64,
    failure: Option<RunonError>,
}

impl WinitHost {
    /// Event loop for a window configured by `config`. The window itself opens on the first pump.
    pub fn new(config: PreviewConfig) -> RunonResult<Self> {
        let event_loop =
            EventLoop::new().map_err(|e| RunonError::gpu(format!("event loop failed: {e}")))?;
        let opacity = config.opacity();
        Ok(Self {
            event_loop,
            app: WindowApp {
                config,
                window: None,
                work_area: None,
                gpu: None,
                events: Vec::new(),
                mods: Modifiers::empty(),
                cursor: Point::ZERO,
                closed: false,
                opacity,
                failure: None,
            },
            started: Instant::now(),
        })
    }

    fn pump(&mut self, timeout: Duration) {
        if let PumpStatus::Exit(code) = self.event_loop.pump_app_events(Some(timeout), &mut self.app) {
            tracing::debug!(code, "event loop exited");
            self.app.closed = true;
        }
    }

    fn window(&mut self) -> RunonResult<Arc<Window>> {
        if self.app.window.is_none() {
            self.pump(Duration::ZERO);
        }
        if let Some(e) = self.app.failure.take() {
            return Err(e);
        }
        self.app
            .window
            .clone()
            .ok_or_else(|| RunonError::gpu("preview window was not created"))
    }
}

impl WindowApp {
    fn create_window(&mut self, event_loop: &ActiveEventLoop) -> RunonResult<()> {
        let cfg = &self.config;
        let mut attrs = Window::default_attributes()
            .with_title("runon")
            .with_inner_size(LogicalSize::new(400.0, 400.0))
            .with_transparent(cfg.window_transparent)
            .with_active(!cfg.window_background);
        if cfg.window_float {
            attrs = attrs.with_window_level(WindowLevel::AlwaysOnTop);
        }
        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .map_err(|e| RunonError::gpu(format!("create_window failed: {e}")))?,
        );
        if cfg.window_passthrough {
            if let Err(e) = window.set_cursor_hittest(false) {
                tracing::warn!(error = %e, "window passthrough unsupported");
            }
        }

        let monitor = match cfg.monitor_name.as_deref() {
            Some("list") => {
                for m in event_loop.available_monitors() {
                    tracing::info!(name = m.name().as_deref().unwrap_or("?"), "monitor");
                }
                window.current_monitor()
            }
            Some(name) => event_loop
                .available_monitors()
                .find(|m| m.name().as_deref() == Some(name))
                .or_else(|| {
                    tracing::warn!(name, "monitor not found, using the current one");
                    window.current_monitor()
                }),
            None => window.current_monitor(),
        };
        self.work_area = monitor.map(|m| {
            let s = m.scale_factor();
            let pos: LogicalPosition<f64> = m.position().to_logical(s);
            let size: LogicalSize<f64> = m.size().to_logical(s);
            Rect::new(pos.x, pos.y, pos.x + size.width, pos.y + size.height)
        });
        tracing::debug!(id = ?window.id(), "preview window created");
        self.window = Some(window);
        Ok(())
    }

    fn place(&self, size: (u32, u32)) {
        let (Some(window), Some(pin), Some(area)) =
            (self.window.as_ref(), self.config.window_pin, self.work_area)
        else {
            return;
        };
        let p = pin_window(
            area,
            (f64::from(size.0), f64::from(size.1)),
            pin,
            self.config.window_pin_inset,
        );
        window.set_outer_position(LogicalPosition::new(p.x, p.y));
    }

    fn scale_factor(&self) -> f64 {
        self.window.as_ref().map(|w| w.scale_factor()).unwrap_or(1.0)
    }
}

impl ApplicationHandler for WindowApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.create_window(event_loop) {
            tracing::error!(error = %e, "failed to open preview window");
            self.failure = Some(e);
            self.closed = true;
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        if self.window.as_ref().map(|w| w.id()) != Some(window_id) {
            return;
        }
        match event {
            WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                self.events.push(InputEvent::CloseRequested);
                self.closed = true;
                event_loop.exit();
            }
            WindowEvent::ModifiersChanged(m) => self.mods = modifiers_from(m.state()),
            WindowEvent::KeyboardInput { event, .. } => {
                let action = match (event.state, event.repeat) {
                    (ElementState::Released, _) => KeyAction::Release,
                    (ElementState::Pressed, true) => KeyAction::Repeat,
                    (ElementState::Pressed, false) => KeyAction::Press,
                };
                if let PhysicalKey::Code(code) = event.physical_key {
                    if let Some(key) = key_from(code) {
                        self.events.push(InputEvent::Key {
                            key,
                            action,
                            mods: self.mods,
                        });
                    }
                }
                if action != KeyAction::Release {
                    if let Some(text) = event.text.as_ref() {
                        self.events
                            .extend(text.chars().filter(|c| !c.is_control()).map(InputEvent::Char));
                    }
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                let s = self.scale_factor();
                self.cursor = Point::new(position.x / s, position.y / s);
                self.events.push(InputEvent::MouseMove(self.cursor));
            }
            WindowEvent::MouseInput { state, button, .. } => {
                let button = match button {
                    MouseButton::Left => 0,
                    MouseButton::Right => 1,
                    MouseButton::Middle => 2,
                    MouseButton::Back => 3,
                    MouseButton::Forward => 4,
                    MouseButton::Other(n) => u8::try_from(n).unwrap_or(u8::MAX),
                };
                self.events.push(InputEvent::MouseButton {
                    pos: self.cursor,
                    button,
                    pressed: state == ElementState::Pressed,
                });
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let (dx, dy) = match delta {
                    MouseScrollDelta::LineDelta(x, y) => (f64::from(x), f64::from(y)),
                    MouseScrollDelta::PixelDelta(p) => {
                        let s = self.scale_factor();
                        (p.x / s, p.y / s)
                    }
                };
                self.events.push(InputEvent::Scroll { dx, dy });
            }
            WindowEvent::Focused(focused) => self.events.push(InputEvent::Focus(focused)),
            _ => {}
        }
    }
}

impl WindowHost for WinitHost {
    fn prepare(&mut self, frame: Rect, recreate: bool) -> RunonResult<()> {
        let window = self.window()?;
        let pw = frame.width().round().max(1.0) as u32;
        let ph = frame.height().round().max(1.0) as u32;
        match self.app.gpu.as_mut() {
            Some(gpu) if recreate => gpu.resize(pw, ph)?,
            Some(_) => return Ok(()),
            None => {
                let mut gpu = GpuContext::initialize(pw, ph, true)?;
                gpu.attach_window(window.clone())?;
                self.app.gpu = Some(gpu);
            }
        }
        let size = window_size(frame, self.content_scale());
        let _ = window.request_inner_size(LogicalSize::new(size.0, size.1));
        self.app.place(size);
        Ok(())
    }

    fn draw(
        &mut self,
        draw: &mut dyn FnMut(&mut dyn Canvas) -> RunonResult<()>,
    ) -> RunonResult<bool> {
        match self.app.gpu.as_mut().and_then(GpuContext::get_canvas) {
            Some(mut canvas) => draw(&mut canvas).map(|()| true),
            None => Ok(false),
        }
    }

    fn present(&mut self) -> RunonResult<()> {
        if let Some(gpu) = self.app.gpu.as_mut() {
            if !gpu.swap_buffers()? {
                tracing::trace!("frame not presented");
            }
        }
        Ok(())
    }

    fn poll_events(&mut self) -> Vec<InputEvent> {
        self.pump(Duration::ZERO);
        std::mem::take(&mut self.app.events)
    }

    fn wait_events(&mut self, timeout: f64) -> Vec<InputEvent> {
        self.pump(Duration::from_secs_f64(timeout.max(0.0)));
        std::mem::take(&mut self.app.events)
    }

    fn should_close(&self) -> bool {
        self.app.closed
    }

    fn now(&self) -> f64 {
        self.started.elapsed().as_secs_f64()
    }

    fn sleep(&mut self, secs: f64) {
        let deadline = Instant::now() + Duration::from_secs_f64(secs.max(0.0));
        loop {
            let now = Instant::now();
            if now >= deadline || self.app.closed {
                break;
            }
            self.pump(deadline - now);
        }
    }

    fn content_scale(&self) -> f64 {
        self.app
            .config
            .window_content_scale
            .unwrap_or_else(|| self.app.scale_factor())
    }

    fn opacity(&self) -> f64 {
        self.app.opacity
    }

    // winit has no portable per-window alpha; the value is kept for the loop's adjustments.
    fn set_opacity(&mut self, opacity: f64) {
        self.app.opacity = opacity;
    }
}

impl Drop for WinitHost {
    fn drop(&mut self) {
        if let Some(gpu) = self.app.gpu.as_mut() {
            gpu.terminate();
        }
    }
}

fn modifiers_from(state: ModifiersState) -> Modifiers {
    let mut m = Modifiers::empty();
    m.set(Modifiers::SUPER, state.super_key());
    m.set(Modifiers::ALT, state.alt_key());
    m.set(Modifiers::SHIFT, state.shift_key());
    m.set(Modifiers::CONTROL, state.control_key());
    m
}

fn key_from(code: KeyCode) -> Option<Key> {
    let key = match code {
        KeyCode::ArrowLeft => Key::Left,
        KeyCode::ArrowRight => Key::Right,
        KeyCode::ArrowUp => Key::Up,
        KeyCode::ArrowDown => Key::Down,
        KeyCode::Space => Key::Space,
        KeyCode::Enter | KeyCode::NumpadEnter => Key::Enter,
        KeyCode::Escape => Key::Escape,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Tab => Key::Tab,
        KeyCode::Home => Key::Home,
        KeyCode::End => Key::End,
        KeyCode::Minus => Key::Char('-'),
        KeyCode::Equal => Key::Char('='),
        KeyCode::Semicolon => Key::Char(';'),
        KeyCode::Comma => Key::Char(','),
        KeyCode::Period => Key::Char('.'),
        KeyCode::Slash => Key::Char('/'),
        KeyCode::Quote => Key::Char('\''),
        KeyCode::BracketLeft => Key::Char('['),
        KeyCode::BracketRight => Key::Char(']'),
        KeyCode::F1 => Key::F(1),
        KeyCode::F2 => Key::F(2),
        KeyCode::F3 => Key::F(3),
        KeyCode::F4 => Key::F(4),
        KeyCode::F5 => Key::F(5),
        KeyCode::F6 => Key::F(6),
        KeyCode::F7 => Key::F(7),
        KeyCode::F8 => Key::F(8),
        KeyCode::F9 => Key::F(9),
        KeyCode::F10 => Key::F(10),
        KeyCode::F11 => Key::F(11),
        KeyCode::F12 => Key::F(12),
        other => return letter_or_digit(other).map(Key::Char),
    };
    Some(key)
}

fn letter_or_digit(code: KeyCode) -> Option<char> {
    const LETTERS: [KeyCode; 26] = [
        KeyCode::KeyA,
        KeyCode::KeyB,
        KeyCode::KeyC,
        KeyCode::KeyD,
        KeyCode::KeyE,
        KeyCode::KeyF,
        KeyCode::KeyG,
        KeyCode::KeyH,
        KeyCode::KeyI,
        KeyCode::KeyJ,
        KeyCode::KeyK,
        KeyCode::KeyL,
        KeyCode::KeyM,
        KeyCode::KeyN,
        KeyCode::KeyO,
        KeyCode::KeyP,
        KeyCode::KeyQ,
        KeyCode::KeyR,
        KeyCode::KeyS,
        KeyCode::KeyT,
        KeyCode::KeyU,
        KeyCode::KeyV,
        KeyCode::KeyW,
        KeyCode::KeyX,
        KeyCode::KeyY,
        KeyCode::KeyZ,
    ];
    const DIGITS: [KeyCode; 10] = [
        KeyCode::Digit0,
        KeyCode::Digit1,
        KeyCode::Digit2,
        KeyCode::Digit3,
        KeyCode::Digit4,
        KeyCode::Digit5,
        KeyCode::Digit6,
        KeyCode::Digit7,
        KeyCode::Digit8,
        KeyCode::Digit9,
    ];
    if let Some(i) = LETTERS.iter().position(|k| *k == code) {
        return Some(char::from(b'a' + i as u8));
    }
    DIGITS
        .iter()
        .position(|k| *k == code)
        .map(|i| char::from(b'0' + i as u8))
}

#[cfg(test)]
#[path = "../../tests/unit/preview/window.rs"]
mod tests;
