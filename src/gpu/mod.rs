//! GPU state and frame rendering.
//!
//! All simulation happens on the CPU in [`crate::Swirl`]. Each frame the
//! snapshot is uploaded and drawn in one pass: background gradient, backdrop
//! orbs, trails, then particle sprites. There is no depth buffer; draw order
//! decides what lands on top.

mod background;
mod camera;
mod sprites;
mod trails;

use std::sync::Arc;

use glam::Vec3;
use tracing::{debug, info};
use wgpu::util::DeviceExt;
use winit::window::Window;

pub use camera::Camera;

use crate::config::SwirlConfig;
use crate::error::{GpuError, Result};
use crate::shader::Uniforms;
use crate::swirl::FrameSnapshot;
use crate::visuals::{parse_hex, BlendMode};
use background::BackgroundRenderer;
use sprites::{SpriteBatch, SpriteRenderer};
use trails::TrailRenderer;

/// Everything the renderer needs from the config, parsed up front.
#[derive(Debug, Clone, Copy)]
pub struct RenderSettings {
    pub blend_mode: BlendMode,
    pub trail_opacity: f32,
    pub trail_capacity: usize,
    pub background_center: Vec3,
    pub background_edge: Vec3,
    pub camera: Camera,
}

impl RenderSettings {
    pub fn from_config(config: &SwirlConfig) -> Result<Self> {
        Ok(Self {
            blend_mode: config.blend_mode,
            trail_opacity: config.trail_opacity,
            trail_capacity: config.trail_length,
            background_center: parse_hex(&config.view.background_center)?,
            background_edge: parse_hex(&config.view.background_edge)?,
            camera: Camera::new(config.view.camera_distance, config.view.fov_degrees),
        })
    }
}

pub struct GpuState {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    background: BackgroundRenderer,
    sprites: SpriteRenderer,
    particle_batch: SpriteBatch,
    backdrop_batch: SpriteBatch,
    trails: TrailRenderer,
    settings: RenderSettings,
    pub camera: Camera,
}

impl GpuState {
    pub async fn new(
        window: Arc<Window>,
        settings: RenderSettings,
        initial: &FrameSnapshot,
    ) -> std::result::Result<Self, GpuError> {
        let size = window.inner_size();

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
            .await?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
                trace: Default::default(),
                experimental_features: Default::default(),
            })
            .await?;

        // Palette hex values are written straight to the framebuffer, so prefer
        // a linear (non-sRGB) format.
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| !f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or(GpuError::IncompatibleSurface)?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);
        info!(
            adapter = %adapter.get_info().name,
            format = ?surface_format,
            width = config.width,
            height = config.height,
            "GPU ready"
        );

        let camera = settings.camera;
        let uniforms = build_uniforms(&settings, &camera, &config, 0.0, 1.0);
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Uniform Buffer"),
            contents: bytemuck::bytes_of(&uniforms),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Uniform Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Uniform Bind Group"),
            layout: &uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let background = BackgroundRenderer::new(&device, &uniform_layout, surface_format);
        let sprites = SpriteRenderer::new(&device, &uniform_layout, surface_format, settings.blend_mode);
        let particle_batch = SpriteBatch::new(&device, "Particle Instance Buffer", &initial.particles);
        let backdrop_batch = SpriteBatch::new(&device, "Backdrop Instance Buffer", &initial.backdrop);
        let trails = TrailRenderer::new(
            &device,
            &uniform_layout,
            surface_format,
            settings.blend_mode,
            initial.particles.len(),
            settings.trail_capacity,
        );

        Ok(Self {
            surface,
            device,
            queue,
            config,
            uniform_buffer,
            uniform_bind_group,
            background,
            sprites,
            particle_batch,
            backdrop_batch,
            trails,
            settings,
            camera,
        })
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
            debug!(width = new_size.width, height = new_size.height, "surface resized");
        }
    }

    /// Reconfigure the surface at its current size.
    pub fn reconfigure(&mut self) {
        self.resize(winit::dpi::PhysicalSize {
            width: self.config.width,
            height: self.config.height,
        });
    }

    pub fn render(&mut self, snapshot: &FrameSnapshot, elapsed: f32) -> std::result::Result<(), wgpu::SurfaceError> {
        let uniforms = build_uniforms(
            &self.settings,
            &self.camera,
            &self.config,
            elapsed,
            snapshot.modulation.brightness,
        );
        self.queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));
        self.particle_batch.upload(&self.queue, &snapshot.particles);
        self.backdrop_batch.upload(&self.queue, &snapshot.backdrop);
        self.trails.upload(&self.queue, &snapshot.trails);

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    depth_slice: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            self.background.draw(&mut render_pass, &self.uniform_bind_group);
            self.sprites
                .draw(&mut render_pass, &self.uniform_bind_group, &self.backdrop_batch);
            self.trails.draw(&mut render_pass, &self.uniform_bind_group);
            self.sprites
                .draw(&mut render_pass, &self.uniform_bind_group, &self.particle_batch);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}

fn build_uniforms(
    settings: &RenderSettings,
    camera: &Camera,
    config: &wgpu::SurfaceConfiguration,
    elapsed: f32,
    brightness: f32,
) -> Uniforms {
    let aspect = config.width as f32 / config.height.max(1) as f32;
    Uniforms {
        view_proj: camera.view_proj(aspect).to_cols_array_2d(),
        center: settings.background_center.extend(1.0).to_array(),
        edge: settings.background_edge.extend(1.0).to_array(),
        params: [settings.trail_opacity, elapsed, brightness, aspect],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_from_default_config() {
        let settings = RenderSettings::from_config(&SwirlConfig::default()).unwrap();
        assert_eq!(settings.trail_capacity, crate::trail::MAX_TRAIL_LENGTH);
        assert!((settings.trail_opacity - 0.7).abs() < 1e-6);
        assert!((settings.camera.distance - 5.0).abs() < 1e-6);
        assert!((settings.background_center.x - 0x5C as f32 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn test_settings_reject_bad_background() {
        let mut config = SwirlConfig::default();
        config.view.background_edge = "navy".into();
        assert!(RenderSettings::from_config(&config).is_err());
    }
}
