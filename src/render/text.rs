use std::sync::Arc;

use winit::window::Window;

use super::GpuState;
use crate::present::DrawCommand;

const BUBBLE_FONT: &str = "bubble";

/// Paint output for one frame of text.
pub struct TextFrame {
    pub primitives: Vec<egui::epaint::ClippedPrimitive>,
    pub textures_delta: egui::TexturesDelta,
    pub screen_descriptor: egui_wgpu::ScreenDescriptor,
}

/// Lays out and paints speech-bubble text with egui.
pub struct TextOverlay {
    egui_ctx: egui::Context,
    egui_state: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
}

impl TextOverlay {
    pub fn new(window: &Window, gpu: &GpuState, font: Option<&[u8]>) -> Self {
        let egui_ctx = egui::Context::default();

        if let Some(bytes) = font {
            let mut fonts = egui::FontDefinitions::default();
            fonts.font_data.insert(
                BUBBLE_FONT.to_owned(),
                Arc::new(egui::FontData::from_owned(bytes.to_vec())),
            );
            if let Some(family) = fonts.families.get_mut(&egui::FontFamily::Proportional) {
                family.insert(0, BUBBLE_FONT.to_owned());
            }
            egui_ctx.set_fonts(fonts);
        }

        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            window,
            Some(window.scale_factor() as f32),
            None,
            Some(gpu.device.limits().max_texture_dimension_2d as usize),
        );

        let egui_renderer = egui_wgpu::Renderer::new(
            &gpu.device,
            gpu.surface_config.format,
            egui_wgpu::RendererOptions {
                depth_stencil_format: None,
                msaa_samples: 1,
                dithering: true,
                predictable_texture_filtering: false,
            },
        );

        Self {
            egui_ctx,
            egui_state,
            egui_renderer,
        }
    }

    /// Lay out every text command of the frame. Positions are window pixels.
    pub fn run_frame(&mut self, window: &Window, commands: &[DrawCommand]) -> TextFrame {
        let raw_input = self.egui_state.take_egui_input(window);

        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            let ppp = ctx.pixels_per_point();
            let painter = ctx.layer_painter(egui::LayerId::background());
            for command in commands {
                let DrawCommand::Text {
                    text,
                    origin,
                    font_size,
                    wrap_width,
                } = command
                else {
                    continue;
                };
                let galley = painter.layout(
                    text.to_string(),
                    egui::FontId::proportional(font_size / ppp),
                    egui::Color32::BLACK,
                    wrap_width / ppp,
                );
                painter.galley(
                    egui::pos2(origin.x / ppp, origin.y / ppp),
                    galley,
                    egui::Color32::BLACK,
                );
            }
        });

        self.egui_state
            .handle_platform_output(window, full_output.platform_output);

        let pixels_per_point = full_output.pixels_per_point;
        let primitives = self.egui_ctx.tessellate(full_output.shapes, pixels_per_point);
        let size = window.inner_size();

        TextFrame {
            primitives,
            textures_delta: full_output.textures_delta,
            screen_descriptor: egui_wgpu::ScreenDescriptor {
                size_in_pixels: [size.width, size.height],
                pixels_per_point,
            },
        }
    }

    /// Upload glyph textures and buffers. Call before the text render pass.
    pub fn prepare(
        &mut self,
        gpu: &GpuState,
        encoder: &mut wgpu::CommandEncoder,
        frame: &TextFrame,
    ) -> Vec<wgpu::CommandBuffer> {
        for (id, image_delta) in &frame.textures_delta.set {
            self.egui_renderer
                .update_texture(&gpu.device, &gpu.queue, *id, image_delta);
        }

        self.egui_renderer.update_buffers(
            &gpu.device,
            &gpu.queue,
            encoder,
            &frame.primitives,
            &frame.screen_descriptor,
        )
    }

    pub fn render(&self, render_pass: &mut wgpu::RenderPass<'static>, frame: &TextFrame) {
        self.egui_renderer
            .render(render_pass, &frame.primitives, &frame.screen_descriptor);
    }

    /// Free textures after present.
    pub fn free_textures(&mut self, frame: &TextFrame) {
        for id in &frame.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }
    }
}
