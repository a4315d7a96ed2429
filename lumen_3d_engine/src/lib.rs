/*!
# Lumen 3D Engine

Core of a small real-time 3D rendering framework.

The crate manages GPU resources (shaders, textures, materials, primitives,
fonts), composes them into a scene graph with hierarchical transforms and
particle emitters, and renders each frame in two passes: the scene goes to
an offscreen target, then a composite shader puts it on screen.

## Architecture

- **GraphicsDevice**: trait over the GPU command API; every GPU object is
  created and destroyed through it
- **Resources**: name-addressable pools of shaders, textures, materials,
  primitives, primitive sets and fonts
- **SceneNode**: transform hierarchy owning its children and emitters
- **Pipeline**: offscreen pass, skybox and composite pass
- **Render**: façade owning all of the above, driven by `Unit`s

Nothing is global except the logger: the application creates one `Render`
and passes it to whatever builds scene content.
*/

pub mod camera;
pub mod config;
pub mod error;
pub mod graphics_device;
pub mod log;
pub mod render;
pub mod resource;
pub mod scene;
pub mod timer;

#[cfg(test)]
mod test_utils;

// Main lumen3d namespace module
pub mod lumen3d {
    // Error types
    pub use crate::error::{Error, Result};

    // Render façade and configuration
    pub use crate::config::{CameraConfig, RenderConfig, SkyboxFaces};
    pub use crate::render::Render;
    pub use crate::camera::Camera;
    pub use crate::timer::{FrameTime, Timer};

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{DefaultLogger, LogEntry, LogSeverity, Logger};
    }

    // Device sub-module
    pub mod device {
        pub use crate::graphics_device::*;
    }

    // Render sub-module
    pub mod render {
        pub use crate::render::*;
    }

    // Resource sub-module
    pub mod resource {
        pub use crate::resource::*;
    }

    // Scene sub-module
    pub mod scene {
        pub use crate::scene::*;
    }
}

// Re-export math library at crate root
pub use glam;
