use super::pass::PassDesc;
use super::sampler::SamplerKind;

/// Opaque GPU texture owned by the external renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u64);

/// Opaque GPU sampler owned by the external renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SamplerHandle(pub u64);

/// Opaque GPU uniform buffer owned by the external renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UniformHandle(pub u64);

/// Pixel format for offscreen pass targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetFormat {
    Rgba8Unorm,
    Rgba16Float,
}

/// The contract this core expects from the GPU rendering library.
///
/// The backend owns devices, textures, bind groups and the frame loop; this
/// crate only describes passes and pushes uniform bytes. Handles returned
/// here are opaque ids — the core never dereferences them, it only routes
/// them back into [`PassDesc`] resource lists.
pub trait RenderBackend {
    /// Allocate a uniform buffer sized for `float_len` f32 slots.
    fn create_uniform_buffer(&mut self, float_len: usize) -> UniformHandle;

    /// Commit CPU-side uniform contents to the GPU-visible copy.
    fn write_uniform_buffer(&mut self, handle: UniformHandle, bytes: &[u8]);

    /// Upload decoded RGBA8 pixels as a sampleable texture.
    fn upload_texture(&mut self, width: u32, height: u32, rgba: &[u8]) -> TextureHandle;

    /// Create a render-attachment texture for intermediate passes.
    fn create_target_texture(&mut self, width: u32, height: u32, format: TargetFormat)
    -> TextureHandle;

    fn create_sampler(&mut self, kind: SamplerKind) -> SamplerHandle;

    /// Register a named pass, or replace its definition if the name exists.
    /// Every resource in `pass.resources` is resolved; `ChainInput` never
    /// reaches the backend.
    fn upsert_pass(&mut self, pass: &PassDesc);

    fn remove_pass(&mut self, name: &str);

    /// Signal that a pass's resource list changed in place and its bind
    /// group must be regenerated before the next frame.
    fn invalidate_pass(&mut self, name: &str);
}
