//! Window presentation: a fullscreen-triangle blit of the render target onto a winit surface.

use crate::foundation::error::{RunonError, RunonResult};
use std::sync::Arc;

pub(crate) struct Presenter {
    window: Arc<winit::window::Window>,
    surface: vello::wgpu::Surface<'static>,
    config: vello::wgpu::SurfaceConfiguration,
    pipeline: vello::wgpu::RenderPipeline,
    bind_group_layout: vello::wgpu::BindGroupLayout,
    sampler: vello::wgpu::Sampler,
}

const BLIT_WGSL: &str = r#"
struct VsOut {
  @builtin(position) pos: vec4<f32>,
  @location(0) uv: vec2<f32>,
};

@vertex
fn vs(@builtin(vertex_index) vi: u32) -> VsOut {
  var p = array<vec2<f32>, 3>(
    vec2<f32>(-1.0, -1.0),
    vec2<f32>( 3.0, -1.0),
    vec2<f32>(-1.0,  3.0),
  );
  let pos = p[vi];
  var o: VsOut;
  o.pos = vec4<f32>(pos, 0.0, 1.0);
  o.uv = vec2<f32>((pos.x + 1.0) * 0.5, (1.0 - pos.y) * 0.5);
  return o;
}

@group(0) @binding(0) var t_src: texture_2d<f32>;
@group(0) @binding(1) var s_src: sampler;

@fragment
fn fs(in: VsOut) -> @location(0) vec4<f32> {
  return textureSample(t_src, s_src, in.uv);
}
"#;

fn choose_format(formats: &[vello::wgpu::TextureFormat]) -> Option<vello::wgpu::TextureFormat> {
    formats
        .iter()
        .copied()
        .find(|f| !f.is_srgb())
        .or_else(|| formats.first().copied())
}

impl Presenter {
    pub(crate) fn new(
        instance: &vello::wgpu::Instance,
        adapter: &vello::wgpu::Adapter,
        device: &vello::wgpu::Device,
        window: Arc<winit::window::Window>,
    ) -> RunonResult<Self> {
        let surface = instance
            .create_surface(window.clone())
            .map_err(|e| RunonError::gpu(format!("create_surface failed: {e}")))?;

        let caps = surface.get_capabilities(adapter);
        let format = choose_format(&caps.formats)
            .ok_or_else(|| RunonError::gpu("surface has no supported formats"))?;
        let alpha_mode = caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(vello::wgpu::CompositeAlphaMode::Auto);
        let size = window.inner_size();
        let config = vello::wgpu::SurfaceConfiguration {
            usage: vello::wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: vello::wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(device, &config);

        let sampler = device.create_sampler(&vello::wgpu::SamplerDescriptor {
            label: Some("runon_blit_sampler"),
            address_mode_u: vello::wgpu::AddressMode::ClampToEdge,
            address_mode_v: vello::wgpu::AddressMode::ClampToEdge,
            address_mode_w: vello::wgpu::AddressMode::ClampToEdge,
            mag_filter: vello::wgpu::FilterMode::Linear,
            min_filter: vello::wgpu::FilterMode::Linear,
            mipmap_filter: vello::wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let bind_group_layout =
            device.create_bind_group_layout(&vello::wgpu::BindGroupLayoutDescriptor {
                label: Some("runon_blit_bgl"),
                entries: &[
                    vello::wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: vello::wgpu::ShaderStages::FRAGMENT,
                        ty: vello::wgpu::BindingType::Texture {
                            multisampled: false,
                            view_dimension: vello::wgpu::TextureViewDimension::D2,
                            sample_type: vello::wgpu::TextureSampleType::Float { filterable: true },
                        },
                        count: None,
                    },
                    vello::wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: vello::wgpu::ShaderStages::FRAGMENT,
                        ty: vello::wgpu::BindingType::Sampler(
                            vello::wgpu::SamplerBindingType::Filtering,
                        ),
                        count: None,
                    },
                ],
            });

        let shader = device.create_shader_module(vello::wgpu::ShaderModuleDescriptor {
            label: Some("runon_blit_shader"),
            source: vello::wgpu::ShaderSource::Wgsl(BLIT_WGSL.into()),
        });

        let pipeline_layout =
            device.create_pipeline_layout(&vello::wgpu::PipelineLayoutDescriptor {
                label: Some("runon_blit_pl"),
                bind_group_layouts: &[&bind_group_layout],
                push_constant_ranges: &[],
            });

        let pipeline = device.create_render_pipeline(&vello::wgpu::RenderPipelineDescriptor {
            label: Some("runon_blit_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: vello::wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs"),
                compilation_options: vello::wgpu::PipelineCompilationOptions::default(),
                buffers: &[],
            },
            fragment: Some(vello::wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs"),
                compilation_options: vello::wgpu::PipelineCompilationOptions::default(),
                targets: &[Some(vello::wgpu::ColorTargetState {
                    format,
                    blend: Some(vello::wgpu::BlendState::PREMULTIPLIED_ALPHA_BLENDING),
                    write_mask: vello::wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: vello::wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: vello::wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        Ok(Self {
            window,
            surface,
            config,
            pipeline,
            bind_group_layout,
            sampler,
        })
    }

    /// Draw `source` over the whole window and present. Returns `Ok(false)` when the frame was
    /// skipped (surface reconfigured or timed out).
    pub(crate) fn present(
        &mut self,
        device: &vello::wgpu::Device,
        queue: &vello::wgpu::Queue,
        source: &vello::wgpu::TextureView,
    ) -> RunonResult<bool> {
        let size = self.window.inner_size();
        let (w, h) = (size.width.max(1), size.height.max(1));
        if w != self.config.width || h != self.config.height {
            self.config.width = w;
            self.config.height = h;
            self.surface.configure(device, &self.config);
        }

        let frame = match self.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(vello::wgpu::SurfaceError::Lost | vello::wgpu::SurfaceError::Outdated) => {
                self.surface.configure(device, &self.config);
                return Ok(false);
            }
            Err(vello::wgpu::SurfaceError::Timeout) => {
                tracing::warn!("surface timeout while acquiring frame");
                return Ok(false);
            }
            Err(e) => return Err(RunonError::gpu(format!("surface error: {e:?}"))),
        };
        let view = frame
            .texture
            .create_view(&vello::wgpu::TextureViewDescriptor::default());

        let bind_group = device.create_bind_group(&vello::wgpu::BindGroupDescriptor {
            label: Some("runon_blit_bg"),
            layout: &self.bind_group_layout,
            entries: &[
                vello::wgpu::BindGroupEntry {
                    binding: 0,
                    resource: vello::wgpu::BindingResource::TextureView(source),
                },
                vello::wgpu::BindGroupEntry {
                    binding: 1,
                    resource: vello::wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });

        let mut encoder = device.create_command_encoder(&vello::wgpu::CommandEncoderDescriptor {
            label: Some("runon_blit_encoder"),
        });
        {
            let mut rp = encoder.begin_render_pass(&vello::wgpu::RenderPassDescriptor {
                label: Some("runon_blit_rp"),
                color_attachments: &[Some(vello::wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    depth_slice: None,
                    ops: vello::wgpu::Operations {
                        load: vello::wgpu::LoadOp::Clear(vello::wgpu::Color::TRANSPARENT),
                        store: vello::wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            rp.set_pipeline(&self.pipeline);
            rp.set_bind_group(0, &bind_group, &[]);
            rp.draw(0..3, 0..1);
        }
        queue.submit(Some(encoder.finish()));
        self.window.pre_present_notify();
        frame.present();
        Ok(true)
    }
}
