//! Instanced rendering of connection lines.
//!
//! Each segment becomes a quad expanded perpendicular to its direction.
//! Strokes thinner than a pixel rasterize at one pixel and keep their
//! apparent weight through alpha coverage, matching how a 2D canvas
//! antialiases hairlines.

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use crate::connections::Segment;
use crate::visuals::VisualConfig;

const SHADER: &str = r#"
struct Uniforms {
    viewport: vec2<f32>,
};

struct LineParams {
    color: vec3<f32>,
    width: f32,
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

@group(1) @binding(0)
var<uniform> params: LineParams;

struct VertexInput {
    @location(0) start: vec2<f32>,
    @location(1) end: vec2<f32>,
    @location(2) alpha: f32,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) alpha: f32,
};

@vertex
fn vs_main(@builtin(vertex_index) vertex_index: u32, in: VertexInput) -> VertexOutput {
    let width = max(params.width, 1.0);
    let coverage = params.width / width;

    let delta = in.end - in.start;
    var dir = vec2<f32>(1.0, 0.0);
    if length(delta) > 0.0001 {
        dir = normalize(delta);
    }
    let perp = vec2<f32>(-dir.y, dir.x) * width * 0.5;

    var pixel: vec2<f32>;
    switch vertex_index {
        case 0u: { pixel = in.start - perp; }
        case 1u: { pixel = in.start + perp; }
        case 2u: { pixel = in.end - perp; }
        case 3u: { pixel = in.start + perp; }
        case 4u: { pixel = in.end - perp; }
        default: { pixel = in.end + perp; }
    }

    let ndc = vec2<f32>(
        pixel.x / uniforms.viewport.x * 2.0 - 1.0,
        1.0 - pixel.y / uniforms.viewport.y * 2.0,
    );

    var out: VertexOutput;
    out.clip_position = vec4<f32>(ndc, 0.0, 1.0);
    out.alpha = in.alpha * coverage;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    return vec4<f32>(params.color, in.alpha);
}
"#;

/// Per-segment vertex attributes.
#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct SegmentInstance {
    start: [f32; 2],
    end: [f32; 2],
    alpha: f32,
}

/// Stroke parameters, fixed at setup.
#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct LineParams {
    color: [f32; 3],
    width: f32,
}

pub struct LinePipeline {
    pipeline: wgpu::RenderPipeline,
    instances: wgpu::Buffer,
    params_bind_group: wgpu::BindGroup,
    capacity: u32,
}

impl LinePipeline {
    pub fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        uniform_layout: &wgpu::BindGroupLayout,
        visuals: &VisualConfig,
        max_segments: u32,
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Line Shader"),
            source: wgpu::ShaderSource::Wgsl(SHADER.into()),
        });

        let instances = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Segment Instance Buffer"),
            size: (max_segments as usize * std::mem::size_of::<SegmentInstance>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let params = LineParams {
            color: visuals.connection_color.to_array(),
            width: visuals.connection_width,
        };
        let params_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Line Params Buffer"),
            contents: bytemuck::bytes_of(&params),
            usage: wgpu::BufferUsages::UNIFORM,
        });

        let params_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Line Params Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let params_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Line Params Bind Group"),
            layout: &params_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: params_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Line Pipeline Layout"),
            bind_group_layouts: &[uniform_layout, &params_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Line Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<SegmentInstance>() as wgpu::BufferAddress,
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
                            format: wgpu::VertexFormat::Float32x2,
                        },
                        wgpu::VertexAttribute {
                            offset: 16,
                            shader_location: 2,
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
            params_bind_group,
            capacity: max_segments,
        }
    }

    /// Copy this frame's segments into the instance buffer; returns the
    /// instance count to draw.
    pub fn upload(&self, queue: &wgpu::Queue, segments: &[Segment]) -> u32 {
        let count = segments.len().min(self.capacity as usize);
        let instances: Vec<SegmentInstance> = segments[..count]
            .iter()
            .map(|s| SegmentInstance {
                start: s.a.to_array(),
                end: s.b.to_array(),
                alpha: s.alpha,
            })
            .collect();
        if !instances.is_empty() {
            queue.write_buffer(&self.instances, 0, bytemuck::cast_slice(&instances));
        }
        count as u32
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
        pass.set_bind_group(1, &self.params_bind_group, &[]);
        pass.set_vertex_buffer(0, self.instances.slice(..));
        pass.draw(0..6, 0..count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shader_parses() {
        let module = naga::front::wgsl::parse_str(SHADER).expect("line shader must parse");
        naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::all(),
        )
        .validate(&module)
        .expect("line shader must validate");
    }

    #[test]
    fn test_instance_stride() {
        assert_eq!(std::mem::size_of::<SegmentInstance>(), 20);
    }
}
