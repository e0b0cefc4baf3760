use std::sync::Arc;

use super::backend::{SamplerHandle, TargetFormat, TextureHandle, UniformHandle};

/// How a pass's output is composited against what is already on its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendMode {
    /// Alpha-composite over the existing contents (canvas-visible passes).
    Alpha,
    /// Overwrite; intermediate data transforms never blend.
    None,
}

/// One entry in a pass's ordered bind-group resource list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceBinding {
    Uniforms(UniformHandle),
    Texture(TextureHandle),
    Sampler(SamplerHandle),
    /// The output of another named pass, resolved by the backend each frame.
    PassOutput(String),
    /// Placeholder for "output of my predecessor in the effect chain".
    /// Resolved to a `PassOutput` during pass-list building; never emitted.
    ChainInput,
}

/// Offscreen render target for an intermediate pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassTarget {
    pub texture: TextureHandle,
    pub format: TargetFormat,
}

/// A fully-resolved render pass handed to the backend.
#[derive(Debug, Clone)]
pub struct PassDesc {
    pub name: String,
    pub shader: Arc<str>,
    pub resources: Vec<ResourceBinding>,
    /// `None` renders to the default (canvas-sized) target for this pass.
    pub output: Option<PassTarget>,
    pub blend_mode: BlendMode,
    pub render_to_canvas: bool,
}

impl PassDesc {
    /// True if any resource still awaits chain resolution.
    pub fn has_unresolved_input(&self) -> bool {
        self.resources
            .iter()
            .any(|r| matches!(r, ResourceBinding::ChainInput))
    }
}
