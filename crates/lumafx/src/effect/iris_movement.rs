use anyhow::Result;

use crate::material::MaterialKind;
use crate::params::UniformSlot;
use crate::render::pass::ResourceBinding;
use crate::render::sampler::SamplerKind;
use crate::render::uniforms::{FieldType, UniformBuffer, UniformLayout};

use super::{Effect, EffectContext, EffectKind, EffectPass, FrameBinding, FrameSource};

/// Pointer-following iris shift. No tunable properties yet; the shader is
/// driven entirely by pointer state.
pub(super) fn build(ctx: &mut EffectContext, name: &str) -> Result<Effect> {
    let shader = ctx.shaders.load("iris-movement/iris-movement")?;
    let mask = ctx
        .materials
        .builtin(ctx.backend, "defaultMask-FFFFFF", MaterialKind::AlphaMask);
    let sampler = ctx.samplers.get(ctx.backend, SamplerKind::Linear);

    let layout = UniformLayout::builder()
        .field("resolution", FieldType::Vec2)
        .field("pointer", FieldType::Vec2)
        .build();
    let mut uniforms = UniformBuffer::new(ctx.backend, layout);
    uniforms.set_field("resolution", &ctx.canvas.size());

    let resources = vec![
        ResourceBinding::ChainInput,
        ResourceBinding::Texture(mask),
        ResourceBinding::Sampler(sampler),
        ResourceBinding::Uniforms(uniforms.handle()),
    ];

    Ok(Effect::new(
        ctx.backend,
        name,
        EffectKind::IrisMovement,
        Vec::new(),
        vec![("main".into(), uniforms)],
        vec![EffectPass::new(name, shader, resources)],
        vec![FrameBinding::new(UniformSlot::field("pointer"), FrameSource::Pointer)],
    ))
}
