use anyhow::Result;
use egui_winit::EventResponse;
use glutin::display::{GetGlDisplay, GlDisplay};
use std::sync::Arc;

/// Glue between winit input, the egui context and the glow painter.
pub struct EguiIntegration {
    pub ctx: egui::Context,
    winit_state: egui_winit::State,
    painter: egui_glow::Painter,
}

impl EguiIntegration {
    /// The OpenGL context must be current before calling this.
    pub fn new(
        window: &winit::window::Window,
        gl_context: &glutin::context::PossiblyCurrentContext,
    ) -> Result<Self> {
        let display = gl_context.display();

        let glow_context = unsafe {
            glow::Context::from_loader_function(|s| match std::ffi::CString::new(s) {
                Ok(name) => display.get_proc_address(name.as_c_str()),
                Err(_) => std::ptr::null(),
            })
        };

        let painter = egui_glow::Painter::new(
            Arc::new(glow_context),
            "",
            None,  // shader_version
            false, // dithering
        )?;

        let ctx = egui::Context::default();
        let winit_state = egui_winit::State::new(
            ctx.clone(),
            egui::ViewportId::ROOT,
            window,
            Some(window.scale_factor() as f32),
            None, // theme
            None, // max_texture_side
        );

        Ok(Self {
            ctx,
            winit_state,
            painter,
        })
    }

    /// Forward a window event to egui.
    pub fn handle_event(
        &mut self,
        window: &winit::window::Window,
        event: &winit::event::WindowEvent,
    ) -> EventResponse {
        self.winit_state.on_window_event(window, event)
    }

    /// Run one egui pass with `build_ui` and paint the result into the
    /// current framebuffer, on top of whatever is already there.
    pub fn run_frame(
        &mut self,
        window: &winit::window::Window,
        build_ui: impl FnMut(&egui::Context),
    ) {
        let raw_input = self.winit_state.take_egui_input(window);
        let output = self.ctx.run(raw_input, build_ui);

        self.winit_state
            .handle_platform_output(window, output.platform_output);

        let meshes = self.ctx.tessellate(output.shapes, output.pixels_per_point);
        let size = window.inner_size();
        self.painter.paint_and_update_textures(
            [size.width, size.height],
            output.pixels_per_point,
            &meshes,
            &output.textures_delta,
        );
    }
}

impl Drop for EguiIntegration {
    fn drop(&mut self) {
        self.painter.destroy();
    }
}
