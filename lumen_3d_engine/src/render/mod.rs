//! Render module
//!
//! Draw context, skybox, two-pass frame pipeline and the `Render` façade
//! that owns them.

pub mod draw_context;
mod pipeline;
mod render;
mod skybox;

pub use draw_context::{uniforms, DrawContext};
pub use pipeline::{OffscreenTarget, Pipeline, PipelineState};
pub use render::Render;
pub use skybox::Skybox;
