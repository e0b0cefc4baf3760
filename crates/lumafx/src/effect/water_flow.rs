use anyhow::Result;

use crate::material::MaterialKind;
use crate::params::{PropertyControl, PropertyDef, TextureSlot, UniformSlot};
use crate::render::pass::ResourceBinding;
use crate::render::sampler::SamplerKind;
use crate::render::uniforms::{FieldType, UniformBuffer, UniformLayout};

use super::{Effect, EffectContext, EffectKind, EffectPass, FrameBinding, FrameSource};

pub(super) fn build(ctx: &mut EffectContext, name: &str) -> Result<Effect> {
    let shader = ctx.shaders.load("water-flow/water-flow")?;
    let phase = ctx.materials.texture_asset(
        ctx.backend,
        "effects/water-flow/waterflowphase.png",
        [127, 127, 127],
    );
    let flow_mask = ctx
        .materials
        .builtin(ctx.backend, "defaultMask-7F7F00", MaterialKind::FlowMask);
    let sampler = ctx.samplers.get(ctx.backend, SamplerKind::Linear);

    let layout = UniformLayout::builder()
        .field("time", FieldType::Float)
        .field("speed", FieldType::Float)
        .field("amp", FieldType::Float)
        .field("scale", FieldType::Float)
        .build();
    let uniforms = UniformBuffer::new(ctx.backend, layout);

    let properties = vec![
        // The flow mask steers direction per-pixel, so it is always live.
        PropertyDef::new(
            "flow_mask",
            "Flow mask",
            PropertyControl::FlowMask {
                default: "defaultMask-7F7F00".into(),
                slot: TextureSlot::new(name, 1),
            },
        ),
        PropertyDef::new(
            "speed",
            "Speed",
            PropertyControl::Float { default: 1.0, range: [0.01, 2.0], slot: UniformSlot::field("speed") },
        ),
        PropertyDef::new(
            "amp",
            "Amount",
            PropertyControl::Float { default: 1.0, range: [0.01, 1.0], slot: UniformSlot::field("amp") },
        ),
        PropertyDef::new(
            "scale",
            "Scale",
            PropertyControl::Float { default: 1.0, range: [0.01, 10.0], slot: UniformSlot::field("scale") },
        ),
    ];

    let resources = vec![
        ResourceBinding::ChainInput,
        ResourceBinding::Texture(flow_mask),
        ResourceBinding::Texture(phase),
        ResourceBinding::Sampler(sampler),
        ResourceBinding::Uniforms(uniforms.handle()),
    ];

    Ok(Effect::new(
        ctx.backend,
        name,
        EffectKind::WaterFlow,
        properties,
        vec![("main".into(), uniforms)],
        vec![EffectPass::new(name, shader, resources)],
        vec![FrameBinding::new(UniformSlot::field("time"), FrameSource::Time)],
    ))
}
