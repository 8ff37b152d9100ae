use anyhow::{anyhow, Context as _, Result};
use std::ffi::CString;
use std::num::NonZeroU32;
use std::time::Instant;

use glutin::{
    config::{ConfigTemplateBuilder, GlConfig},
    context::{ContextApi, ContextAttributesBuilder, PossiblyCurrentContext},
    display::{GetGlDisplay, GlDisplay},
    prelude::{GlSurface, NotCurrentGlContext},
    surface::{Surface as GlutinSurface, SurfaceAttributesBuilder, WindowSurface},
};
use glutin_winit::DisplayBuilder;
use raw_window_handle::HasWindowHandle;
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::{ElementState, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{Key, NamedKey},
    window::Window,
};

use snowfall_loader::config::Config;
use snowfall_loader::egui_integration::EguiIntegration;
use snowfall_loader::ui::loading::LoadingOverlay;

struct Env {
    gl_surface: GlutinSurface<WindowSurface>,
    gl_context: PossiblyCurrentContext,
    window: Window,
}

// Field order matters: the overlay releases its texture and the egui painter
// tears down its GL objects while the context in `env` is still alive.
struct App {
    overlay: LoadingOverlay,
    egui: EguiIntegration,
    env: Env,
    config: Config,
    overlay_ready: bool,
    last_frame: Instant,
}

impl App {
    fn redraw(&mut self) {
        let size = self.env.window.inner_size();
        if size.width == 0 || size.height == 0 {
            return;
        }

        let now = Instant::now();
        let dt = self
            .config
            .frame_dt(now.duration_since(self.last_frame).as_secs_f32());
        self.last_frame = now;

        let [r, g, b] = self.config.clear_color;
        unsafe {
            gl::Viewport(0, 0, size.width as i32, size.height as i32);
            gl::ClearColor(r, g, b, 1.0);
            gl::Clear(gl::COLOR_BUFFER_BIT);
        }

        self.overlay.update(dt);

        let overlay = &mut self.overlay;
        let overlay_ready = &mut self.overlay_ready;
        self.egui.run_frame(&self.env.window, |ctx| {
            // The real screen size is only known once a pass has started.
            if !*overlay_ready {
                *overlay_ready = overlay.init(ctx);
            }
            overlay.render(ctx);
        });

        if let Err(e) = self.env.gl_surface.swap_buffers(&self.env.gl_context) {
            log::error!("Failed to swap buffers: {}", e);
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, _event_loop: &ActiveEventLoop) {}

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let _ = self.egui.handle_event(&self.env.window, &event);

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),

            WindowEvent::Resized(physical_size) => {
                if let (Some(w), Some(h)) = (
                    NonZeroU32::new(physical_size.width),
                    NonZeroU32::new(physical_size.height),
                ) {
                    self.env.gl_surface.resize(&self.env.gl_context, w, h);
                }
                self.env.window.request_redraw();
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if event.state != ElementState::Pressed {
                    return;
                }
                match &event.logical_key {
                    Key::Named(NamedKey::Escape) => event_loop.exit(),
                    Key::Character(c) if c.as_str() == "q" => event_loop.exit(),
                    _ => {}
                }
            }

            WindowEvent::RedrawRequested => self.redraw(),

            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        self.env.window.request_redraw();
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.overlay.cleanup();
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let config = Config::load();
    log::info!("Logo: {}", config.logo_path.display());

    let el = EventLoop::new()?;

    let window_attributes = Window::default_attributes()
        .with_inner_size(LogicalSize::new(config.window_width, config.window_height))
        .with_resizable(true)
        .with_title("snowfall-loader");

    let template = ConfigTemplateBuilder::new().with_alpha_size(8);

    let display_builder = DisplayBuilder::new().with_window_attributes(Some(window_attributes));
    let (window, gl_config) = display_builder
        .build(&el, template, |configs| {
            configs
                .reduce(|accum, config| {
                    if config.num_samples() > accum.num_samples() {
                        config
                    } else {
                        accum
                    }
                })
                .expect("no GL configs offered")
        })
        .map_err(|e| anyhow!("failed to build GL display: {e}"))?;
    let window = window.context("could not create window with OpenGL context")?;
    let raw_window_handle = window.window_handle()?.as_raw();

    let context_attributes = ContextAttributesBuilder::new().build(Some(raw_window_handle));
    let fallback_context_attributes = ContextAttributesBuilder::new()
        .with_context_api(ContextApi::Gles(None))
        .build(Some(raw_window_handle));

    let display = gl_config.display();
    let not_current_gl_context = unsafe {
        display
            .create_context(&gl_config, &context_attributes)
            .or_else(|_| display.create_context(&gl_config, &fallback_context_attributes))
            .context("failed to create GL context")?
    };

    let (width, height): (u32, u32) = window.inner_size().into();
    let attrs = SurfaceAttributesBuilder::<WindowSurface>::new().build(
        raw_window_handle,
        NonZeroU32::new(width.max(1)).context("zero window width")?,
        NonZeroU32::new(height.max(1)).context("zero window height")?,
    );

    let gl_surface = unsafe {
        display
            .create_window_surface(&gl_config, &attrs)
            .context("could not create GL window surface")?
    };

    let gl_context = not_current_gl_context
        .make_current(&gl_surface)
        .context("could not make GL context current")?;

    gl::load_with(|s| match CString::new(s) {
        Ok(name) => display.get_proc_address(name.as_c_str()),
        Err(_) => std::ptr::null(),
    });

    let egui = EguiIntegration::new(&window, &gl_context)?;

    let overlay = match config.seed {
        Some(seed) => LoadingOverlay::with_seed(seed),
        None => LoadingOverlay::new(),
    }
    .with_logo_path(config.logo_path.clone());

    let mut app = App {
        overlay,
        egui,
        env: Env {
            gl_surface,
            gl_context,
            window,
        },
        config,
        overlay_ready: false,
        last_frame: Instant::now(),
    };

    el.run_app(&mut app)?;

    Ok(())
}
