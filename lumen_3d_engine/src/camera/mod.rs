//! Camera module - view/projection state shared by every draw.

mod camera;

pub use camera::{frustum, Camera};
