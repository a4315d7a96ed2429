/*!
# Lumen 3D Engine - OpenGL Renderer Backend

OpenGL 4.3 core implementation of the lumen_3d_engine `GraphicsDevice` trait.

Calls go through `glow`; `glutin` and `winit` create the window and context.
Decoded images are BGRA with the bottom row first, which is the layout
`glTexImage2D` expects for `GL_BGRA` uploads, so pixels are passed through
untouched.

# Example

```no_run
use lumen_3d_engine::lumen3d::{Render, RenderConfig};
use lumen_3d_engine_renderer_gl::{GlGraphicsDevice, GlWindowContext};
# fn setup(event_loop: &winit::event_loop::ActiveEventLoop) -> lumen_3d_engine::lumen3d::Result<()> {
let attributes = winit::window::Window::default_attributes().with_title("Lumen3D");
let (window, gl) = GlWindowContext::new(event_loop, attributes)?;
let device = GlGraphicsDevice::new(gl)?.into_shared();
let render = Render::new(device, RenderConfig::default())?;
# Ok(())
# }
```
*/

mod gl_device;
mod gl_format;
mod gl_window;

pub use gl_device::GlGraphicsDevice;
pub use gl_window::GlWindowContext;
