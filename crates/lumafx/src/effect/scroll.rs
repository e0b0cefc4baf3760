use anyhow::Result;

use crate::params::{PropertyControl, PropertyDef, UniformSlot};
use crate::render::pass::ResourceBinding;
use crate::render::sampler::SamplerKind;
use crate::render::uniforms::{FieldType, UniformBuffer, UniformLayout};

use super::{Effect, EffectContext, EffectKind, EffectPass, FrameBinding, FrameSource};

pub(super) fn build(ctx: &mut EffectContext, name: &str) -> Result<Effect> {
    let shader = ctx.shaders.load("scroll/scroll")?;
    let sampler = ctx.samplers.get(ctx.backend, SamplerKind::Linear);

    let layout = UniformLayout::builder()
        .field("canvas_res", FieldType::Vec2)
        .field("scroll_x", FieldType::Float)
        .field("scroll_y", FieldType::Float)
        .field("time", FieldType::Float)
        .field("scale", FieldType::Float)
        .build();
    let mut uniforms = UniformBuffer::new(ctx.backend, layout);
    uniforms.set_field("canvas_res", &ctx.canvas.size());

    let properties = vec![
        PropertyDef::new(
            "scroll_x",
            "Horizontal scroll",
            PropertyControl::Float { default: 0.0, range: [-1.0, 1.0], slot: UniformSlot::field("scroll_x") },
        ),
        PropertyDef::new(
            "scroll_y",
            "Vertical scroll",
            PropertyControl::Float { default: 0.0, range: [-1.0, 1.0], slot: UniformSlot::field("scroll_y") },
        ),
        PropertyDef::new(
            "scale",
            "Scale",
            PropertyControl::Float { default: 1.0, range: [0.1, 2.0], slot: UniformSlot::field("scale") },
        ),
    ];

    let resources = vec![
        ResourceBinding::ChainInput,
        ResourceBinding::Sampler(sampler),
        ResourceBinding::Uniforms(uniforms.handle()),
    ];

    Ok(Effect::new(
        ctx.backend,
        name,
        EffectKind::Scroll,
        properties,
        vec![("main".into(), uniforms)],
        vec![EffectPass::new(name, shader, resources)],
        vec![FrameBinding::new(UniformSlot::field("time"), FrameSource::Time)],
    ))
}
