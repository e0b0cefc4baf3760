pub mod backend;
pub mod pass;
pub mod sampler;
pub mod uniforms;

pub use backend::{RenderBackend, SamplerHandle, TargetFormat, TextureHandle, UniformHandle};
pub use pass::{BlendMode, PassDesc, PassTarget, ResourceBinding};
pub use sampler::{SamplerCache, SamplerKind};
pub use uniforms::{FieldType, UniformBuffer, UniformLayout};
