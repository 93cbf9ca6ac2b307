pub mod instance;
pub mod pipeline;
pub mod text;

use std::sync::Arc;
use winit::window::Window;

use self::instance::SpriteInstance;
use self::pipeline::SpritePipeline;
use crate::assets::SpriteSet;
use crate::error::AppError;
use crate::present::{DrawCommand, Frame, SpriteId};

/// Everything needed to put the mascot window's pixels on screen.
pub struct GpuState {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub surface: wgpu::Surface<'static>,
    pub surface_config: wgpu::SurfaceConfiguration,
    pub sprite_pipeline: SpritePipeline,
}

/// One acquired swapchain image and the encoder recording into it.
pub struct FrameContext {
    pub output: wgpu::SurfaceTexture,
    pub view: wgpu::TextureView,
    pub encoder: wgpu::CommandEncoder,
}

#[cfg(windows)]
fn instance_descriptor() -> wgpu::InstanceDescriptor {
    // The mascot needs per-pixel alpha, which on Windows only DX12 through
    // DirectComposition provides.
    wgpu::InstanceDescriptor {
        backends: wgpu::Backends::DX12,
        backend_options: wgpu::BackendOptions {
            dx12: wgpu::Dx12BackendOptions {
                presentation_system: wgpu_types::Dx12SwapchainKind::DxgiFromVisual,
                ..Default::default()
            },
            ..Default::default()
        },
        ..Default::default()
    }
}

#[cfg(not(windows))]
fn instance_descriptor() -> wgpu::InstanceDescriptor {
    wgpu::InstanceDescriptor {
        backends: wgpu::Backends::PRIMARY,
        ..Default::default()
    }
}

/// Prefer an sRGB format so sprite colours are stored as authored.
fn pick_format(formats: &[wgpu::TextureFormat]) -> wgpu::TextureFormat {
    formats
        .iter()
        .find(|f| f.is_srgb())
        .or_else(|| formats.first())
        .copied()
        .unwrap_or(wgpu::TextureFormat::Bgra8UnormSrgb)
}

/// Premultiplied matches the sprite shader's output; postmultiplied still
/// composites. Anything else leaves the window opaque.
fn transparent_alpha_mode(modes: &[wgpu::CompositeAlphaMode]) -> wgpu::CompositeAlphaMode {
    [
        wgpu::CompositeAlphaMode::PreMultiplied,
        wgpu::CompositeAlphaMode::PostMultiplied,
    ]
    .into_iter()
    .find(|m| modes.contains(m))
    .unwrap_or(wgpu::CompositeAlphaMode::Auto)
}

impl GpuState {
    /// Open the surface for `window` and upload every sprite in `sprites`.
    pub fn new(window: Arc<Window>, sprites: &SpriteSet) -> Result<Self, AppError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&instance_descriptor());
        let surface = instance.create_surface(window)?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::LowPower,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))?;

        log::info!(
            "GPU adapter: {:?} ({:?})",
            adapter.get_info().name,
            adapter.get_info().backend
        );

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("edgepet_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_webgl2_defaults()
                    .using_resolution(adapter.limits()),
                ..Default::default()
            },
        ))?;

        let surface_caps = surface.get_capabilities(&adapter);
        if surface_caps.formats.is_empty() {
            return Err(AppError::SurfaceUnsupported);
        }

        let format = pick_format(&surface_caps.formats);
        let alpha_mode = transparent_alpha_mode(&surface_caps.alpha_modes);
        if alpha_mode == wgpu::CompositeAlphaMode::Auto {
            log::warn!(
                "No transparent alpha mode in {:?}; the mascot may sit on an opaque box",
                surface_caps.alpha_modes
            );
        }

        log::info!(
            "Surface: format={:?}, alpha_mode={:?}",
            format,
            alpha_mode,
        );

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);

        let sprite_pipeline = SpritePipeline::new(&device, &queue, format, sprites);
        sprite_pipeline.update_screen_size(
            &queue,
            surface_config.width as f32,
            surface_config.height as f32,
        );

        Ok(Self {
            device,
            queue,
            surface,
            surface_config,
            sprite_pipeline,
        })
    }

    /// Reconfigure after the window size changes. Zero sizes are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.surface_config.width = width;
        self.surface_config.height = height;
        self.surface.configure(&self.device, &self.surface_config);
        self.sprite_pipeline
            .update_screen_size(&self.queue, width as f32, height as f32);
    }

    /// Turn the frame's sprite commands into GPU instances, in draw order.
    pub fn update_sprites(&mut self, frame: &Frame) {
        let sprites: Vec<(SpriteId, SpriteInstance)> = frame
            .commands
            .iter()
            .filter_map(|command| match command {
                DrawCommand::Sprite { sprite, transform } => Some((
                    *sprite,
                    SpriteInstance::new(*transform, self.sprite_pipeline.sprite_size(*sprite)),
                )),
                DrawCommand::Text { .. } => None,
            })
            .collect();
        self.sprite_pipeline.update_instances(&self.queue, &sprites);
    }

    /// None means the surface had to be reconfigured or failed; the frame is
    /// dropped and the next redraw tries again.
    pub fn begin_frame(&self) -> Option<FrameContext> {
        let output = match self.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.surface_config);
                return None;
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("GPU out of memory");
                return None;
            }
            Err(e) => {
                log::warn!("Surface error: {e:?}");
                return None;
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame_encoder"),
            });

        Some(FrameContext {
            output,
            view,
            encoder,
        })
    }

    /// First pass: clear to fully transparent, then walker and bubble.
    pub fn draw_sprites(&self, encoder: &mut wgpu::CommandEncoder, view: &wgpu::TextureView) {
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("sprite_render_pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                depth_slice: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        let p = &self.sprite_pipeline;
        if p.batch.is_empty() {
            return;
        }
        render_pass.set_pipeline(&p.pipeline);
        render_pass.set_bind_group(0, &p.screen_bind_group, &[]);
        render_pass.set_vertex_buffer(0, p.vertex_buffer.slice(..));
        render_pass.set_vertex_buffer(1, p.instance_buffer.slice(..));
        render_pass.set_index_buffer(p.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
        for (i, id) in p.batch.iter().enumerate() {
            let Some(texture) = p.textures.get(id) else {
                continue;
            };
            let i = i as u32;
            render_pass.set_bind_group(1, &texture.bind_group, &[]);
            render_pass.draw_indexed(0..6, 0, i..i + 1);
        }
    }

    /// Second pass: bubble text drawn over the sprites, which are loaded
    /// rather than cleared. egui needs the pass to be `'static`.
    pub fn begin_text_pass(
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
    ) -> wgpu::RenderPass<'static> {
        let render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("text_render_pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                depth_slice: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        render_pass.forget_lifetime()
    }

    /// Submit the text upload buffers, then the frame, and present.
    pub fn finish_frame(
        &self,
        encoder: wgpu::CommandEncoder,
        output: wgpu::SurfaceTexture,
        extra_cmd_bufs: Vec<wgpu::CommandBuffer>,
    ) {
        self.queue.submit(
            extra_cmd_bufs
                .into_iter()
                .chain(std::iter::once(encoder.finish())),
        );
        output.present();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wgpu::{CompositeAlphaMode as Alpha, TextureFormat as Format};

    #[test]
    fn srgb_format_wins_over_the_first_listed() {
        assert_eq!(
            pick_format(&[Format::Bgra8Unorm, Format::Rgba8UnormSrgb]),
            Format::Rgba8UnormSrgb
        );
        assert_eq!(pick_format(&[Format::Rgba16Float]), Format::Rgba16Float);
    }

    #[test]
    fn premultiplied_alpha_is_preferred() {
        assert_eq!(
            transparent_alpha_mode(&[Alpha::Opaque, Alpha::PostMultiplied, Alpha::PreMultiplied]),
            Alpha::PreMultiplied
        );
        assert_eq!(
            transparent_alpha_mode(&[Alpha::Opaque, Alpha::PostMultiplied]),
            Alpha::PostMultiplied
        );
        assert_eq!(transparent_alpha_mode(&[Alpha::Opaque]), Alpha::Auto);
    }
}
