//! Trail rendering as one line strip per particle.
//!
//! Every particle owns a fixed slot of `trail_capacity` vertices in a shared
//! vertex buffer. Each frame the faded trail is written to the front of its
//! slot and only that many vertices are drawn, so whatever a longer trail left
//! behind in the slot never shows up.

use crate::shader::TRAILS_SOURCE;
use crate::swirl::TrailStrip;
use crate::trail::TrailVertex;
use crate::visuals::BlendMode;

const TRAIL_ATTRIBUTES: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
    0 => Float32x3, // position
    1 => Float32,   // alpha
    2 => Float32x3, // color
];

const VERTEX_SIZE: wgpu::BufferAddress = std::mem::size_of::<TrailVertex>() as wgpu::BufferAddress;

pub struct TrailRenderer {
    pipeline: wgpu::RenderPipeline,
    buffer: wgpu::Buffer,
    trail_capacity: u32,
    /// Vertices to draw per particle this frame.
    draw_counts: Vec<u32>,
}

impl TrailRenderer {
    pub fn new(
        device: &wgpu::Device,
        uniform_layout: &wgpu::BindGroupLayout,
        surface_format: wgpu::TextureFormat,
        blend_mode: BlendMode,
        num_particles: usize,
        trail_capacity: usize,
    ) -> Self {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Trail Vertex Buffer"),
            size: (num_particles * trail_capacity) as wgpu::BufferAddress * VERTEX_SIZE,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Trail Shader"),
            source: wgpu::ShaderSource::Wgsl(TRAILS_SOURCE.into()),
        });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Trail Pipeline Layout"),
            bind_group_layouts: &[uniform_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Trail Render Pipeline"),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: VERTEX_SIZE,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &TRAIL_ATTRIBUTES,
                }],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(blend_mode.to_blend_state()),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::LineStrip,
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
            buffer,
            trail_capacity: trail_capacity as u32,
            draw_counts: vec![0; num_particles],
        }
    }

    /// Upload this frame's trails into their slots.
    pub fn upload(&mut self, queue: &wgpu::Queue, trails: &[TrailStrip]) {
        for (i, (strip, count)) in trails.iter().zip(self.draw_counts.iter_mut()).enumerate() {
            let len = strip.vertices.len().min(self.trail_capacity as usize);
            *count = len as u32;
            if len == 0 {
                continue;
            }
            let offset = i as wgpu::BufferAddress * self.trail_capacity as wgpu::BufferAddress * VERTEX_SIZE;
            queue.write_buffer(&self.buffer, offset, bytemuck::cast_slice(&strip.vertices[..len]));
        }
    }

    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>, uniform_bind_group: &wgpu::BindGroup) {
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, uniform_bind_group, &[]);
        pass.set_vertex_buffer(0, self.buffer.slice(..));
        for (i, &count) in self.draw_counts.iter().enumerate() {
            if count < 2 {
                continue;
            }
            let first = i as u32 * self.trail_capacity;
            pass.draw(first..first + count, 0..1);
        }
    }
}
