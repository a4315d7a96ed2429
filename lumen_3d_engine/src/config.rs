/// Render configuration
///
/// Plain data handed to `Render::new`. Every field has a working default so
/// applications only override what they care about.

use std::path::PathBuf;

/// Camera projection parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraConfig {
    /// Near clip plane distance
    pub near: f32,
    /// Far clip plane distance
    pub far: f32,
    /// Size of the smaller side of the near-plane window
    pub projection_size: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            near: 0.1,
            far: 1000.0,
            projection_size: 0.1,
        }
    }
}

/// Six cube-map face images located in one directory
///
/// Faces are listed in the order +X, -X, +Y, -Y, +Z, -Z.
#[derive(Debug, Clone, PartialEq)]
pub struct SkyboxFaces {
    pub directory: PathBuf,
    pub faces: [String; 6],
}

impl SkyboxFaces {
    /// Faces named `XPOS.bmp`, `XNEG.bmp`, ... inside `directory`
    pub fn bmp_in<P: Into<PathBuf>>(directory: P) -> Self {
        Self {
            directory: directory.into(),
            faces: [
                "XPOS.bmp".to_string(),
                "XNEG.bmp".to_string(),
                "YPOS.bmp".to_string(),
                "YNEG.bmp".to_string(),
                "ZPOS.bmp".to_string(),
                "ZNEG.bmp".to_string(),
            ],
        }
    }

    /// Full paths of the six faces
    pub fn paths(&self) -> [PathBuf; 6] {
        std::array::from_fn(|i| self.directory.join(&self.faces[i]))
    }
}

/// Configuration for the render façade
#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    /// Initial frame width in pixels
    pub frame_width: u32,
    /// Initial frame height in pixels
    pub frame_height: u32,
    /// Clear color (RGBA)
    pub clear_color: [f32; 4],
    /// Camera projection parameters
    pub camera: CameraConfig,
    /// Wall-clock seconds between shader hot reloads (`None` disables reloading)
    pub shader_reload_interval: Option<f64>,
    /// Shader prefix of the full-screen composite pass
    pub composite_shader: String,
    /// Shader prefix of the skybox
    pub skybox_shader: String,
    /// Skybox faces loaded at pipeline init
    pub skybox_faces: Option<SkyboxFaces>,
    /// Index value that restarts a triangle strip
    pub primitive_restart_index: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            frame_width: 800,
            frame_height: 600,
            clear_color: [0.30, 0.47, 0.8, 1.0],
            camera: CameraConfig::default(),
            shader_reload_interval: Some(5.0),
            composite_shader: "shaders/screen/".to_string(),
            skybox_shader: "shaders/skybox/".to_string(),
            skybox_faces: None,
            primitive_restart_index: u32::MAX,
        }
    }
}

impl RenderConfig {
    pub fn with_frame_size(mut self, width: u32, height: u32) -> Self {
        self.frame_width = width;
        self.frame_height = height;
        self
    }

    pub fn with_clear_color(mut self, color: [f32; 4]) -> Self {
        self.clear_color = color;
        self
    }

    pub fn with_shader_reload_interval(mut self, seconds: Option<f64>) -> Self {
        self.shader_reload_interval = seconds;
        self
    }

    pub fn with_composite_shader<S: Into<String>>(mut self, prefix: S) -> Self {
        self.composite_shader = prefix.into();
        self
    }

    pub fn with_skybox_shader<S: Into<String>>(mut self, prefix: S) -> Self {
        self.skybox_shader = prefix.into();
        self
    }

    pub fn with_skybox_faces(mut self, faces: SkyboxFaces) -> Self {
        self.skybox_faces = Some(faces);
        self
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
