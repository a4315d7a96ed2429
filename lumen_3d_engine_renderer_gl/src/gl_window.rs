/// Window and OpenGL context bootstrap through glutin
///
/// Creates a winit window with a current 4.3 core context and a glow
/// function table loaded from it. The application keeps the
/// `GlWindowContext` alive for as long as the device is used.

use std::num::NonZeroU32;
use glutin::config::{Config, ConfigTemplateBuilder, GlConfig};
use glutin::context::{
    ContextApi, ContextAttributesBuilder, GlProfile, NotCurrentGlContext, PossiblyCurrentContext, Version,
};
use glutin::display::{GetGlDisplay, GlDisplay};
use glutin::surface::{GlSurface, Surface, SwapInterval, WindowSurface};
use glutin_winit::{DisplayBuilder, GlWindow};
use raw_window_handle::HasWindowHandle;
use winit::event_loop::ActiveEventLoop;
use winit::window::{Window, WindowAttributes};
use lumen_3d_engine::lumen3d::{Error, Result};
use lumen_3d_engine::{engine_debug, engine_warn};

const SOURCE: &str = "lumen3d::GlWindow";

fn init_error(what: &str, error: impl std::fmt::Display) -> Error {
    Error::InitializationFailed(format!("{}: {}", what, error))
}

/// Prefer the config with the most samples
fn pick_config(configs: Box<dyn Iterator<Item = Config> + '_>) -> Config {
    configs
        .reduce(|best, config| if config.num_samples() > best.num_samples() { config } else { best })
        // glutin reports BadConfig before calling the picker with no configs
        .expect("glutin offered no GL config")
}

/// Window with its GL surface and current context
///
/// Fields drop in declaration order: surface and context go before the window.
pub struct GlWindowContext {
    surface: Surface<WindowSurface>,
    context: PossiblyCurrentContext,
    window: Window,
}

impl GlWindowContext {
    /// Create the window, make a 4.3 core context current on it and load GL
    ///
    /// # Errors
    ///
    /// `Error::InitializationFailed` naming the step that failed.
    pub fn new(event_loop: &ActiveEventLoop, attributes: WindowAttributes) -> Result<(Self, glow::Context)> {
        let template = ConfigTemplateBuilder::new().with_alpha_size(8).with_depth_size(24);
        let (window, config) = DisplayBuilder::new()
            .with_window_attributes(Some(attributes))
            .build(event_loop, template, pick_config)
            .map_err(|e| init_error("GL display", e))?;
        let window = window.ok_or_else(|| Error::InitializationFailed("no window was created".to_string()))?;

        let raw_window_handle = window.window_handle().ok().map(|handle| handle.as_raw());
        let display = config.display();
        let context_attributes = ContextAttributesBuilder::new()
            .with_profile(GlProfile::Core)
            .with_context_api(ContextApi::OpenGl(Some(Version::new(4, 3))))
            .build(raw_window_handle);
        let context = unsafe { display.create_context(&config, &context_attributes) }
            .map_err(|e| init_error("GL context", e))?;

        let surface_attributes = window
            .build_surface_attributes(Default::default())
            .map_err(|e| init_error("window handle", e))?;
        let surface = unsafe { display.create_window_surface(&config, &surface_attributes) }
            .map_err(|e| init_error("GL surface", e))?;
        let context = context.make_current(&surface).map_err(|e| init_error("make current", e))?;

        if let Err(error) = surface.set_swap_interval(&context, SwapInterval::Wait(NonZeroU32::MIN)) {
            engine_warn!(SOURCE, "vsync unavailable: {}", error);
        }

        let gl = unsafe { glow::Context::from_loader_function_cstr(|name| display.get_proc_address(name)) };
        engine_debug!(SOURCE, "Context current, {} sample(s)", config.num_samples());
        Ok((Self { surface, context, window }, gl))
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    /// Resize the surface; zero sizes (minimized windows) are ignored
    pub fn resize(&self, width: u32, height: u32) {
        if let (Some(width), Some(height)) = (NonZeroU32::new(width), NonZeroU32::new(height)) {
            self.surface.resize(&self.context, width, height);
        }
    }

    /// Present the back buffer
    pub fn swap_buffers(&self) -> Result<()> {
        self.surface
            .swap_buffers(&self.context)
            .map_err(|e| Error::BackendError(format!("swap buffers: {}", e)))
    }
}
