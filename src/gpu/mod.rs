//! GPU presentation for the sphere effect.
//!
//! All simulation math happens on the CPU; this module only draws the
//! per-frame output. Rendering accumulates into a persistent offscreen
//! texture: each frame a translucent black quad fades the previous
//! contents (the trail effect), particles and connection lines draw on
//! top with alpha blending, and the result is blitted to the swapchain.

mod blit;
mod fade;
mod lines;
mod particles;

use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::error::GpuError;
use crate::scene::{FrameData, Viewport};
use crate::visuals::VisualConfig;

use blit::BlitPass;
use fade::FadePass;
use lines::LinePipeline;
use particles::ParticlePipeline;

/// Shared uniforms: the logical viewport size the vertex shaders use to
/// map logical pixels to clip space.
#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Uniforms {
    viewport: [f32; 2],
    _padding: [f32; 2],
}

pub struct GpuState {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    accum_view: wgpu::TextureView,
    fade: FadePass,
    sprites: ParticlePipeline,
    lines: LinePipeline,
    blit: BlitPass,
}

impl GpuState {
    pub async fn new(
        window: Arc<Window>,
        viewport: Viewport,
        particle_count: u32,
        visuals: &VisualConfig,
    ) -> Result<Self, GpuError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(GpuError::NoAdapter)?;

        log::debug!("using adapter: {}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        let (width, height) = viewport.physical_size();
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let uniforms = Uniforms {
            viewport: [viewport.width, viewport.height],
            _padding: [0.0; 2],
        };
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Viewport Uniform Buffer"),
            contents: bytemuck::bytes_of(&uniforms),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let uniform_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Viewport Bind Group Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Viewport Bind Group"),
            layout: &uniform_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let accum_view = create_accum_texture(&device, &config);

        let fade = FadePass::new(&device, config.format, visuals.fade_alpha);
        let sprites = ParticlePipeline::new(
            &device,
            config.format,
            &uniform_bind_group_layout,
            particle_count,
        );
        // Worst case every unordered pair connects.
        let pairs = particle_count as u64 * particle_count.saturating_sub(1) as u64 / 2;
        let max_segments = pairs.min(u32::MAX as u64) as u32;
        let lines = LinePipeline::new(
            &device,
            config.format,
            &uniform_bind_group_layout,
            visuals,
            max_segments.max(1),
        );
        let blit = BlitPass::new(&device, config.format, &accum_view);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            uniform_buffer,
            uniform_bind_group,
            accum_view,
            fade,
            sprites,
            lines,
            blit,
        })
    }

    /// Reconfigure the surface and restart the accumulation texture at the
    /// new size. Trails start over from black, matching a fresh canvas.
    pub fn resize(&mut self, viewport: Viewport) {
        let (width, height) = viewport.physical_size();
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);

        self.accum_view = create_accum_texture(&self.device, &self.config);
        self.blit.rebind(&self.device, &self.accum_view);

        let uniforms = Uniforms {
            viewport: [viewport.width, viewport.height],
            _padding: [0.0; 2],
        };
        self.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));

        log::debug!("surface resized to {}x{} physical", width, height);
    }

    /// Draw one frame: fade, particles, connections, then present.
    pub fn render(&mut self, frame: &FrameData) -> Result<(), wgpu::SurfaceError> {
        let sprite_count = self.sprites.upload(&self.queue, &frame.sprites);
        let segment_count = self.lines.upload(&self.queue, &frame.segments);

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Accumulation Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.accum_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            self.fade.record(&mut pass);
            self.sprites
                .record(&mut pass, &self.uniform_bind_group, sprite_count);
            self.lines
                .record(&mut pass, &self.uniform_bind_group, segment_count);
        }

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Present Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            self.blit.record(&mut pass);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}

fn create_accum_texture(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Accumulation Texture"),
        size: wgpu::Extent3d {
            width: config.width,
            height: config.height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: config.format,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}
