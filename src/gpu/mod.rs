//! GPU context manager.
//!
//! A [`GpuContext`] owns one wgpu device, a vello renderer and a render target sized to the
//! preview window. Drawing goes through [`GpuCanvas`], which records into a `vello::Scene`;
//! [`GpuContext::flush_and_submit`] renders that scene into the target and
//! [`GpuContext::read_pixels`] copies it back to the CPU.
//!
//! With the `viewer` feature a native window can be attached; [`GpuContext::swap_buffers`] then
//! blits the target onto the window surface.

mod canvas;
#[cfg(feature = "viewer")]
mod blit;

pub use canvas::GpuCanvas;

use crate::foundation::color::Color;
use crate::foundation::core::{FrameRGBA, Rect};
use crate::foundation::error::{RunonError, RunonResult};
use crate::foundation::geometry::RectExt;
use crate::pen::Pen;
use crate::render::composite::{
    CompositeOpts, Destination, OutputFormat, composite, composite_to_canvas, precompose,
    surface_size,
};
use crate::render::image_io::save_png;
use std::path::Path;

/// Default surface width.
pub const DEFAULT_WIDTH: u32 = 1920;
/// Default surface height.
pub const DEFAULT_HEIGHT: u32 = 1080;

struct Target {
    width: u32,
    height: u32,
    texture: vello::wgpu::Texture,
    view: vello::wgpu::TextureView,
    readback: vello::wgpu::Buffer,
    readback_bytes_per_row: u32,
}

struct GpuState {
    // Kept for creating window surfaces.
    #[cfg_attr(not(feature = "viewer"), allow(dead_code))]
    instance: vello::wgpu::Instance,
    #[cfg_attr(not(feature = "viewer"), allow(dead_code))]
    adapter: vello::wgpu::Adapter,
    device: vello::wgpu::Device,
    queue: vello::wgpu::Queue,
    renderer: vello::Renderer,
    target: Target,
    #[cfg(feature = "viewer")]
    presenter: Option<blit::Presenter>,
}

/// Device, renderer and render target for accelerated drawing.
///
/// After [`GpuContext::terminate`] the context is inert: [`GpuContext::get_canvas`] returns
/// `None` and composites fall back to the CPU path.
pub struct GpuContext {
    state: Option<GpuState>,
    scene: vello::Scene,
    base_color: Color,
    visible: bool,
    surface_id: u64,
}

impl std::fmt::Debug for GpuContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GpuContext")
            .field("size", &self.size())
            .field("visible", &self.visible)
            .field("surface_id", &self.surface_id)
            .field("terminated", &self.state.is_none())
            .finish()
    }
}

impl GpuContext {
    /// Context at the default size, hidden.
    pub fn new() -> RunonResult<Self> {
        Self::initialize(DEFAULT_WIDTH, DEFAULT_HEIGHT, false)
    }

    /// Request an adapter and device and allocate a `width x height` render target.
    ///
    /// Fails with [`RunonError::Gpu`] when no adapter is available; callers fall back to the CPU
    /// path in that case.
    #[tracing::instrument]
    pub fn initialize(width: u32, height: u32, visible: bool) -> RunonResult<Self> {
        check_size(width, height)?;

        let instance = vello::wgpu::Instance::new(&vello::wgpu::InstanceDescriptor::default());
        let adapter = pollster::block_on(instance.request_adapter(
            &vello::wgpu::RequestAdapterOptions {
                power_preference: vello::wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            },
        ))
        .map_err(|e| match e {
            vello::wgpu::RequestAdapterError::NotFound { .. } => {
                RunonError::gpu("no gpu adapter available")
            }
            other => RunonError::gpu(format!("wgpu request_adapter failed: {other:?}")),
        })?;

        let (device, queue) =
            pollster::block_on(adapter.request_device(&vello::wgpu::DeviceDescriptor {
                label: Some("runon_device"),
                required_features: vello::wgpu::Features::empty(),
                required_limits: vello::wgpu::Limits::default(),
                experimental_features: vello::wgpu::ExperimentalFeatures::default(),
                memory_hints: vello::wgpu::MemoryHints::Performance,
                trace: vello::wgpu::Trace::Off,
            }))
            .map_err(|e| RunonError::gpu(format!("wgpu request_device failed: {e:?}")))?;

        let renderer = vello::Renderer::new(&device, vello::RendererOptions::default())
            .map_err(|e| RunonError::gpu(format!("vello renderer init failed: {e:?}")))?;

        let target = create_target(&device, width, height, "runon_surface")?;
        tracing::debug!(width, height, visible, "gpu context ready");

        Ok(Self {
            state: Some(GpuState {
                instance,
                adapter,
                device,
                queue,
                renderer,
                target,
                #[cfg(feature = "viewer")]
                presenter: None,
            }),
            scene: vello::Scene::new(),
            base_color: Color::TRANSPARENT,
            visible,
            surface_id: 1,
        })
    }

    /// Current surface size, `(0, 0)` once terminated.
    pub fn size(&self) -> (u32, u32) {
        self.state
            .as_ref()
            .map(|s| (s.target.width, s.target.height))
            .unwrap_or((0, 0))
    }

    /// Generation counter of the render target; bumped whenever it is recreated.
    pub fn surface_id(&self) -> u64 {
        self.surface_id
    }

    /// Whether [`GpuContext::terminate`] has run.
    pub fn is_terminated(&self) -> bool {
        self.state.is_none()
    }

    /// Whether the context presents to a window.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Show or hide presentation; hidden contexts never present.
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Recreate the render target at `width x height`; a no-op at the current size.
    #[tracing::instrument(skip(self), fields(surface_id = self.surface_id))]
    pub fn resize(&mut self, width: u32, height: u32) -> RunonResult<()> {
        check_size(width, height)?;
        let state = self.state.as_mut().ok_or_else(terminated)?;
        if state.target.width == width && state.target.height == height {
            return Ok(());
        }
        state.target = create_target(&state.device, width, height, "runon_surface")?;
        self.surface_id += 1;
        tracing::debug!(width, height, surface_id = self.surface_id, "surface recreated");
        Ok(())
    }

    /// Canvas recording into the current scene, or `None` once terminated.
    pub fn get_canvas(&mut self) -> Option<GpuCanvas<'_>> {
        let (w, h) = {
            let state = self.state.as_ref()?;
            (state.target.width, state.target.height)
        };
        Some(GpuCanvas::new(&mut self.scene, w, h))
    }

    /// Drop everything recorded and make `color` the background of the next flush.
    pub fn clear(&mut self, color: Color) {
        self.scene.reset();
        self.base_color = color;
    }

    /// Render the recorded scene into the target.
    pub fn flush_and_submit(&mut self) -> RunonResult<()> {
        let state = self.state.as_mut().ok_or_else(terminated)?;
        render_scene(state, &self.scene, self.base_color)
    }

    /// Flush, then copy the target back to the CPU.
    pub fn read_pixels(&mut self) -> RunonResult<FrameRGBA> {
        self.flush_and_submit()?;
        let state = self.state.as_ref().ok_or_else(terminated)?;
        read_target(&state.device, &state.queue, &state.target)
    }

    /// Present the target. Returns whether anything was presented: hidden contexts and contexts
    /// without a window return `Ok(false)`.
    pub fn swap_buffers(&mut self) -> RunonResult<bool> {
        if !self.visible || self.state.is_none() {
            return Ok(false);
        }
        #[cfg(feature = "viewer")]
        {
            if self.state.as_ref().is_some_and(|s| s.presenter.is_some()) {
                self.flush_and_submit()?;
                let state = self.state.as_mut().ok_or_else(terminated)?;
                if let Some(presenter) = state.presenter.as_mut() {
                    return presenter.present(&state.device, &state.queue, &state.target.view);
                }
            }
        }
        Ok(false)
    }

    /// Bind a native window; later [`GpuContext::swap_buffers`] calls present into it.
    #[cfg(feature = "viewer")]
    pub fn attach_window(&mut self, window: std::sync::Arc<winit::window::Window>) -> RunonResult<()> {
        let state = self.state.as_mut().ok_or_else(terminated)?;
        let presenter =
            blit::Presenter::new(&state.instance, &state.adapter, &state.device, window)?;
        state.presenter = Some(presenter);
        Ok(())
    }

    /// Release the surface, renderer and device. Safe to call more than once.
    #[tracing::instrument(skip(self))]
    pub fn terminate(&mut self) {
        match self.state.take() {
            Some(state) => {
                drop(state);
                self.scene.reset();
                tracing::info!("gpu context terminated");
            }
            None => tracing::debug!("gpu context already terminated"),
        }
    }

    /// Composite into this context's surface, optionally reading back to a PNG at `save_to`.
    ///
    /// SVG and PDF outputs, a terminated context, and GPU failures while saving all take the CPU
    /// file path instead.
    pub(crate) fn composite(
        &mut self,
        pen: &Pen,
        rect: Rect,
        save_to: Option<&Path>,
        opts: &CompositeOpts,
    ) -> RunonResult<()> {
        if let Some(path) = save_to
            && OutputFormat::from_path(path)? != OutputFormat::Png
        {
            return composite(pen, rect, Destination::File(path), opts);
        }
        if self.is_terminated() {
            return match save_to {
                Some(path) => {
                    tracing::warn!("gpu context terminated, compositing on the cpu");
                    composite(pen, rect, Destination::File(path), opts)
                }
                None => Err(terminated()),
            };
        }
        match self.composite_gpu(pen, rect, save_to, opts) {
            Ok(()) => Ok(()),
            Err(e) => match save_to {
                Some(path) => {
                    tracing::warn!(error = %e, "gpu composite failed, falling back to cpu");
                    composite(pen, rect, Destination::File(path), opts)
                }
                None => Err(e),
            },
        }
    }

    fn composite_gpu(
        &mut self,
        pen: &Pen,
        rect: Rect,
        save_to: Option<&Path>,
        opts: &CompositeOpts,
    ) -> RunonResult<()> {
        let (w, h) = surface_size(rect, opts.scale);
        self.resize(w, h)?;
        self.clear(opts.clear.unwrap_or(Color::TRANSPARENT));
        {
            let mut canvas = self.get_canvas().ok_or_else(terminated)?;
            composite_to_canvas(pen, rect, &mut canvas, opts.scale, opts.style.as_deref())?;
        }
        match save_to {
            Some(path) => save_png(&self.read_pixels()?, path),
            None => self.flush_and_submit(),
        }
    }

    /// Rasterize `pen` inside `rect` into an offscreen target and read it back.
    ///
    /// The window surface and its recorded scene are left untouched. Falls back to the CPU
    /// rasterizer when the context is terminated or the GPU path fails.
    #[tracing::instrument(skip(self, pen))]
    pub fn precompose(
        &mut self,
        pen: &Pen,
        rect: Rect,
        scale: f64,
        style: Option<&str>,
    ) -> RunonResult<FrameRGBA> {
        CompositeOpts::scaled(scale).validate()?;
        match self.precompose_gpu(pen, rect, scale, style) {
            Ok(frame) => Ok(frame),
            Err(e) => {
                tracing::warn!(error = %e, "gpu precompose failed, falling back to cpu");
                precompose(pen, rect, scale, style, None)
            }
        }
    }

    fn precompose_gpu(
        &mut self,
        pen: &Pen,
        rect: Rect,
        scale: f64,
        style: Option<&str>,
    ) -> RunonResult<FrameRGBA> {
        let state = self.state.as_mut().ok_or_else(terminated)?;
        let rect = rect.round_xywh();
        let (w, h) = surface_size(rect, scale);
        let mut scene = vello::Scene::new();
        {
            let mut canvas = GpuCanvas::new(&mut scene, w, h);
            composite_to_canvas(pen, rect, &mut canvas, scale, style)?;
        }
        let target = create_target(&state.device, w, h, "runon_precompose")?;
        render_to(state, &scene, &target, Color::TRANSPARENT)?;
        read_target(&state.device, &state.queue, &target)
    }
}

impl Drop for GpuContext {
    fn drop(&mut self) {
        self.terminate();
    }
}

fn terminated() -> RunonError {
    RunonError::gpu("gpu context is terminated")
}

fn check_size(width: u32, height: u32) -> RunonResult<()> {
    if width == 0 || height == 0 {
        return Err(RunonError::validation(format!(
            "gpu surface size must be non-zero, got {width}x{height}"
        )));
    }
    Ok(())
}

fn create_target(
    device: &vello::wgpu::Device,
    width: u32,
    height: u32,
    label: &'static str,
) -> RunonResult<Target> {
    check_size(width, height)?;
    let texture = device.create_texture(&vello::wgpu::TextureDescriptor {
        label: Some(label),
        size: vello::wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: vello::wgpu::TextureDimension::D2,
        format: vello::wgpu::TextureFormat::Rgba8Unorm,
        usage: vello::wgpu::TextureUsages::STORAGE_BINDING
            | vello::wgpu::TextureUsages::TEXTURE_BINDING
            | vello::wgpu::TextureUsages::RENDER_ATTACHMENT
            | vello::wgpu::TextureUsages::COPY_SRC
            | vello::wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    let view = texture.create_view(&vello::wgpu::TextureViewDescriptor::default());

    let bytes_per_row_unpadded = width
        .checked_mul(4)
        .ok_or_else(|| RunonError::gpu("render target width overflow"))?;
    let bytes_per_row = align_to(
        bytes_per_row_unpadded,
        vello::wgpu::COPY_BYTES_PER_ROW_ALIGNMENT,
    );
    let buffer_size = u64::from(bytes_per_row)
        .checked_mul(u64::from(height))
        .ok_or_else(|| RunonError::gpu("readback buffer size overflow"))?;
    let readback = device.create_buffer(&vello::wgpu::BufferDescriptor {
        label: Some("runon_readback"),
        size: buffer_size,
        usage: vello::wgpu::BufferUsages::MAP_READ | vello::wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });

    Ok(Target {
        width,
        height,
        texture,
        view,
        readback,
        readback_bytes_per_row: bytes_per_row,
    })
}

fn render_scene(state: &mut GpuState, scene: &vello::Scene, base: Color) -> RunonResult<()> {
    let GpuState {
        device,
        queue,
        renderer,
        target,
        ..
    } = state;
    render_with(renderer, device, queue, scene, target, base)
}

fn render_to(
    state: &mut GpuState,
    scene: &vello::Scene,
    target: &Target,
    base: Color,
) -> RunonResult<()> {
    let GpuState {
        device,
        queue,
        renderer,
        ..
    } = state;
    render_with(renderer, device, queue, scene, target, base)
}

fn render_with(
    renderer: &mut vello::Renderer,
    device: &vello::wgpu::Device,
    queue: &vello::wgpu::Queue,
    scene: &vello::Scene,
    target: &Target,
    base: Color,
) -> RunonResult<()> {
    renderer
        .render_to_texture(
            device,
            queue,
            scene,
            &target.view,
            &vello::RenderParams {
                base_color: canvas::peniko_color(base),
                width: target.width,
                height: target.height,
                antialiasing_method: vello::AaConfig::Area,
            },
        )
        .map_err(|e| RunonError::gpu(format!("vello render failed: {e:?}")))
}

fn read_target(
    device: &vello::wgpu::Device,
    queue: &vello::wgpu::Queue,
    target: &Target,
) -> RunonResult<FrameRGBA> {
    let mut encoder = device.create_command_encoder(&vello::wgpu::CommandEncoderDescriptor {
        label: Some("runon_readback_encoder"),
    });
    encoder.copy_texture_to_buffer(
        vello::wgpu::TexelCopyTextureInfo {
            texture: &target.texture,
            mip_level: 0,
            origin: vello::wgpu::Origin3d::ZERO,
            aspect: vello::wgpu::TextureAspect::All,
        },
        vello::wgpu::TexelCopyBufferInfo {
            buffer: &target.readback,
            layout: vello::wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(target.readback_bytes_per_row),
                rows_per_image: Some(target.height),
            },
        },
        vello::wgpu::Extent3d {
            width: target.width,
            height: target.height,
            depth_or_array_layers: 1,
        },
    );
    queue.submit(Some(encoder.finish()));

    let buffer_slice = target.readback.slice(..);
    let (tx, rx) = std::sync::mpsc::channel();
    buffer_slice.map_async(vello::wgpu::MapMode::Read, move |res| {
        let _ = tx.send(res);
    });
    device
        .poll(vello::wgpu::PollType::wait_indefinitely())
        .map_err(|e| RunonError::gpu(format!("wgpu poll failed: {e:?}")))?;
    rx.recv()
        .map_err(|_| RunonError::gpu("readback channel closed"))?
        .map_err(|e| RunonError::gpu(format!("readback map failed: {e:?}")))?;

    let mapped = buffer_slice.get_mapped_range();
    let row_bytes = (target.width as usize) * 4;
    let padded_row_bytes = target.readback_bytes_per_row as usize;
    let mut out = Vec::with_capacity(row_bytes * target.height as usize);
    for row in 0..target.height as usize {
        let start = row * padded_row_bytes;
        out.extend_from_slice(&mapped[start..start + row_bytes]);
    }
    drop(mapped);
    target.readback.unmap();

    FrameRGBA::from_premul(target.width, target.height, out)
}

fn align_to(value: u32, alignment: u32) -> u32 {
    let mask = alignment - 1;
    (value + mask) & !mask
}

#[cfg(test)]
#[path = "../../tests/unit/gpu/mod.rs"]
mod tests;
