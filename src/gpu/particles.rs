//! Instanced particle rendering.
//!
//! Each visible particle becomes one instanced quad sized to cover its
//! glow halo. The fragment shader composites two soft discs per quad:
//! the colored body with its glow falloff and a smaller white core, so a
//! particle costs a single instance regardless of its layered look.

use bytemuck::{Pod, Zeroable};

use crate::particle::Sprite;

const SHADER: &str = r#"
struct Uniforms {
    viewport: vec2<f32>,
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

struct VertexInput {
    @location(0) position: vec2<f32>,
    @location(1) radius: f32,
    @location(2) glow: f32,
    @location(3) color: vec3<f32>,
    @location(4) alpha: f32,
    @location(5) core_radius: f32,
    @location(6) core_alpha: f32,
    @location(7) core_glow: f32,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) local: vec2<f32>,
    @location(1) color: vec3<f32>,
    @location(2) alpha: f32,
    @location(3) radius: f32,
    @location(4) glow: f32,
    @location(5) core_radius: f32,
    @location(6) core_alpha: f32,
    @location(7) core_glow: f32,
};

@vertex
fn vs_main(@builtin(vertex_index) vertex_index: u32, in: VertexInput) -> VertexOutput {
    var quad_vertices = array<vec2<f32>, 6>(
        vec2<f32>(-1.0, -1.0),
        vec2<f32>( 1.0, -1.0),
        vec2<f32>(-1.0,  1.0),
        vec2<f32>(-1.0,  1.0),
        vec2<f32>( 1.0, -1.0),
        vec2<f32>( 1.0,  1.0),
    );

    let extent = in.radius + in.glow;
    let local = quad_vertices[vertex_index] * extent;
    let pixel = in.position + local;
    let ndc = vec2<f32>(
        pixel.x / uniforms.viewport.x * 2.0 - 1.0,
        1.0 - pixel.y / uniforms.viewport.y * 2.0,
    );

    var out: VertexOutput;
    out.clip_position = vec4<f32>(ndc, 0.0, 1.0);
    out.local = local;
    out.color = in.color;
    out.alpha = in.alpha;
    out.radius = in.radius;
    out.glow = in.glow;
    out.core_radius = in.core_radius;
    out.core_alpha = in.core_alpha;
    out.core_glow = in.core_glow;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let dist = length(in.local);

    // Full alpha inside each disc, smooth falloff over the glow band.
    let body_fade = smoothstep(0.0, max(in.glow, 0.5), dist - in.radius);
    let body_a = in.alpha * (1.0 - body_fade);

    let core_fade = smoothstep(0.0, max(in.core_glow, 0.5), dist - in.core_radius);
    let core_a = in.core_alpha * (1.0 - core_fade);

    // White core over the colored body, source-over.
    let alpha = core_a + body_a * (1.0 - core_a);
    if alpha < 0.003 {
        discard;
    }
    let white = vec3<f32>(1.0, 1.0, 1.0);
    let color = (white * core_a + in.color * body_a * (1.0 - core_a)) / alpha;
    return vec4<f32>(color, alpha);
}
"#;

/// Per-sprite vertex attributes.
#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct SpriteInstance {
    position: [f32; 2],
    radius: f32,
    glow: f32,
    color: [f32; 3],
    alpha: f32,
    core_radius: f32,
    core_alpha: f32,
    core_glow: f32,
}

impl SpriteInstance {
    fn from_sprite(sprite: &Sprite) -> Self {
        Self {
            position: sprite.position.to_array(),
            radius: sprite.radius,
            glow: sprite.glow,
            color: sprite.color.to_array(),
            alpha: sprite.alpha,
            core_radius: sprite.core_radius,
            core_alpha: sprite.core_alpha,
            core_glow: sprite.core_glow,
        }
    }
}

pub struct ParticlePipeline {
    pipeline: wgpu::RenderPipeline,
    instances: wgpu::Buffer,
}

impl ParticlePipeline {
    pub fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        uniform_layout: &wgpu::BindGroupLayout,
        max_sprites: u32,
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Particle Shader"),
            source: wgpu::ShaderSource::Wgsl(SHADER.into()),
        });

        let instances = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Sprite Instance Buffer"),
            size: (max_sprites as usize * std::mem::size_of::<SpriteInstance>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Particle Pipeline Layout"),
            bind_group_layouts: &[uniform_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Particle Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<SpriteInstance>() as wgpu::BufferAddress,
                    step_mode: wgpu::VertexStepMode::Instance,
                    attributes: &[
                        wgpu::VertexAttribute {
                            offset: 0,
                            shader_location: 0,
                            format: wgpu::VertexFormat::Float32x2,
                        },
                        wgpu::VertexAttribute {
                            offset: 8,
                            shader_location: 1,
                            format: wgpu::VertexFormat::Float32,
                        },
                        wgpu::VertexAttribute {
                            offset: 12,
                            shader_location: 2,
                            format: wgpu::VertexFormat::Float32,
                        },
                        wgpu::VertexAttribute {
                            offset: 16,
                            shader_location: 3,
                            format: wgpu::VertexFormat::Float32x3,
                        },
                        wgpu::VertexAttribute {
                            offset: 28,
                            shader_location: 4,
                            format: wgpu::VertexFormat::Float32,
                        },
                        wgpu::VertexAttribute {
                            offset: 32,
                            shader_location: 5,
                            format: wgpu::VertexFormat::Float32,
                        },
                        wgpu::VertexAttribute {
                            offset: 36,
                            shader_location: 6,
                            format: wgpu::VertexFormat::Float32,
                        },
                        wgpu::VertexAttribute {
                            offset: 40,
                            shader_location: 7,
                            format: wgpu::VertexFormat::Float32,
                        },
                    ],
                }],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        Self {
            pipeline,
            instances,
        }
    }

    /// Copy this frame's sprites into the instance buffer; returns the
    /// instance count to draw.
    pub fn upload(&self, queue: &wgpu::Queue, sprites: &[Sprite]) -> u32 {
        let instances: Vec<SpriteInstance> =
            sprites.iter().map(SpriteInstance::from_sprite).collect();
        if !instances.is_empty() {
            queue.write_buffer(&self.instances, 0, bytemuck::cast_slice(&instances));
        }
        instances.len() as u32
    }

    pub fn record(
        &self,
        pass: &mut wgpu::RenderPass<'_>,
        uniform_bind_group: &wgpu::BindGroup,
        count: u32,
    ) {
        if count == 0 {
            return;
        }
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, uniform_bind_group, &[]);
        pass.set_vertex_buffer(0, self.instances.slice(..));
        pass.draw(0..6, 0..count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shader_parses() {
        let module = naga::front::wgsl::parse_str(SHADER).expect("particle shader must parse");
        naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::all(),
        )
        .validate(&module)
        .expect("particle shader must validate");
    }

    #[test]
    fn test_instance_layout_matches_attributes() {
        // Attribute offsets above are hand-written; keep them in sync
        // with the struct layout.
        assert_eq!(std::mem::size_of::<SpriteInstance>(), 44);
    }
}
