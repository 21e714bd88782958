//! wgpu renderer for the landing sequence.

pub mod camera;
pub mod depth;
pub mod font;
pub mod mesh;
pub mod pipeline;
pub mod renderer;
pub mod shader;
pub mod texture;
pub mod vertex;

pub use camera::*;
pub use depth::*;
pub use mesh::*;
pub use renderer::*;
pub use shader::*;
pub use texture::*;
pub use vertex::*;
