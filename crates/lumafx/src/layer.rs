use std::hash::Hasher;
use std::sync::Arc;

use glam::Vec2;
use rustc_hash::FxHasher;

use crate::effect::Effect;
use crate::render::backend::{RenderBackend, SamplerHandle, TextureHandle};
use crate::render::pass::ResourceBinding;
use crate::render::uniforms::{FieldType, UniformBuffer, UniformLayout};

/// Hex content id for a layer's source bytes; stable across sessions so
/// pass names and material keys survive project round-trips.
pub fn content_hash(bytes: &[u8]) -> String {
    let mut hasher = FxHasher::default();
    hasher.write(bytes);
    format!("{:08x}", hasher.finish() as u32)
}

/// One user-loaded image plus its effect stack. The `effects` order is the
/// render order: effect `i` reads effect `i-1`'s output, effect 0 reads the
/// base pass.
pub struct ImageLayer {
    pub name: String,
    pub content_id: String,
    /// Material-store key of the source image.
    pub material: String,
    pub width: u32,
    pub height: u32,
    pub origin: Vec2,
    pub scale: Vec2,
    pub rotation: f32,
    transform: UniformBuffer,
    base_shader: Arc<str>,
    base_texture: TextureHandle,
    base_sampler: SamplerHandle,
    pub effects: Vec<Effect>,
}

impl ImageLayer {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        backend: &mut dyn RenderBackend,
        name: &str,
        content_id: &str,
        material: &str,
        width: u32,
        height: u32,
        base_shader: Arc<str>,
        base_texture: TextureHandle,
        base_sampler: SamplerHandle,
    ) -> Self {
        let layout = UniformLayout::builder()
            .field("origin", FieldType::Vec2)
            .field("scale", FieldType::Vec2)
            .field("rotation", FieldType::Float)
            .build();
        let mut transform = UniformBuffer::new(backend, layout);
        transform.set_field("origin", &[0.0, 0.0]);
        transform.set_field("scale", &[1.0, 1.0]);
        transform.set_scalar("rotation", 0.0);
        transform.apply(backend);

        Self {
            name: name.to_string(),
            content_id: content_id.to_string(),
            material: material.to_string(),
            width,
            height,
            origin: Vec2::ZERO,
            scale: Vec2::ONE,
            rotation: 0.0,
            transform,
            base_shader,
            base_texture,
            base_sampler,
            effects: Vec::new(),
        }
    }

    pub fn base_pass_name(&self) -> String {
        format!("{}__base", self.content_id)
    }

    pub(crate) fn base_shader(&self) -> Arc<str> {
        self.base_shader.clone()
    }

    pub(crate) fn base_resources(&self) -> Vec<ResourceBinding> {
        vec![
            ResourceBinding::Texture(self.base_texture),
            ResourceBinding::Sampler(self.base_sampler),
            ResourceBinding::Uniforms(self.transform.handle()),
        ]
    }

    /// Update base-image placement and commit the transform buffer.
    pub fn set_transform(
        &mut self,
        backend: &mut dyn RenderBackend,
        origin: Vec2,
        scale: Vec2,
        rotation: f32,
    ) {
        self.origin = origin;
        self.scale = scale;
        self.rotation = rotation;
        self.transform.set_field("origin", &origin.to_array());
        self.transform.set_field("scale", &scale.to_array());
        self.transform.set_scalar("rotation", rotation);
        self.transform.apply(backend);
    }

    /// Effects currently participating in rendering, in chain order.
    pub fn enabled_effects(&self) -> impl Iterator<Item = &Effect> {
        self.effects.iter().filter(|e| e.enable)
    }
}
