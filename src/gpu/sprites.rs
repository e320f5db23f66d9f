//! Glowing point sprites for particles and backdrop orbs.

use wgpu::util::DeviceExt;

use crate::particle::ParticleInstance;
use crate::shader::SPRITES_SOURCE;
use crate::visuals::BlendMode;

const INSTANCE_ATTRIBUTES: [wgpu::VertexAttribute; 4] = wgpu::vertex_attr_array![
    0 => Float32x3, // position
    1 => Float32,   // size
    2 => Float32x3, // color
    3 => Float32,   // opacity
];

/// A fixed-size batch of sprites drawn with one instanced call.
pub struct SpriteBatch {
    buffer: wgpu::Buffer,
    count: u32,
}

impl SpriteBatch {
    pub fn new(device: &wgpu::Device, label: &str, instances: &[ParticleInstance]) -> Self {
        // wgpu rejects zero-sized vertex buffers.
        let placeholder = [ParticleInstance {
            position: [0.0; 3],
            size: 0.0,
            color: [0.0; 3],
            opacity: 0.0,
        }];
        let contents = if instances.is_empty() { &placeholder[..] } else { instances };

        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(contents),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });
        Self {
            buffer,
            count: instances.len() as u32,
        }
    }

    /// Overwrite the instances. The count is fixed at creation.
    pub fn upload(&self, queue: &wgpu::Queue, instances: &[ParticleInstance]) {
        let len = instances.len().min(self.count as usize);
        if len > 0 {
            queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&instances[..len]));
        }
    }
}

pub struct SpriteRenderer {
    pipeline: wgpu::RenderPipeline,
}

impl SpriteRenderer {
    pub fn new(
        device: &wgpu::Device,
        uniform_layout: &wgpu::BindGroupLayout,
        surface_format: wgpu::TextureFormat,
        blend_mode: BlendMode,
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Sprite Shader"),
            source: wgpu::ShaderSource::Wgsl(SPRITES_SOURCE.into()),
        });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Sprite Pipeline Layout"),
            bind_group_layouts: &[uniform_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Sprite Render Pipeline"),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<ParticleInstance>() as wgpu::BufferAddress,
                    step_mode: wgpu::VertexStepMode::Instance,
                    attributes: &INSTANCE_ATTRIBUTES,
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

        Self { pipeline }
    }

    pub fn draw(
        &self,
        pass: &mut wgpu::RenderPass<'_>,
        uniform_bind_group: &wgpu::BindGroup,
        batch: &SpriteBatch,
    ) {
        if batch.count == 0 {
            return;
        }
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, uniform_bind_group, &[]);
        pass.set_vertex_buffer(0, batch.buffer.slice(..));
        pass.draw(0..6, 0..batch.count);
    }
}
