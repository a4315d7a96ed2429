/// Graphics device module - the GPU abstraction used by every other module

// Module declarations
pub mod graphics_device;
pub mod texture;
pub mod buffer;
pub mod shader;

// Re-export everything from graphics_device.rs
pub use graphics_device::*;

// Re-export from other modules
pub use texture::*;
pub use buffer::*;
pub use shader::*;

// Mock graphics device for tests (no GPU required)
#[cfg(test)]
pub mod mock_graphics_device;
