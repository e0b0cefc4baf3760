use anyhow::Result;

use crate::material::MaterialKind;
use crate::params::{Condition, PropertyControl, PropertyDef, TextureSlot, UniformSlot};
use crate::render::pass::ResourceBinding;
use crate::render::sampler::SamplerKind;
use crate::render::uniforms::{FieldType, UniformBuffer, UniformLayout};

use super::{Effect, EffectContext, EffectKind, EffectPass, FrameBinding, FrameSource};

pub(super) fn build(ctx: &mut EffectContext, name: &str) -> Result<Effect> {
    let shader = ctx.shaders.load("cloud-motion/cloud-motion")?;
    let noise =
        ctx.materials.texture_asset(ctx.backend, "textures/perlin_256.png", [127, 127, 127]);
    let mask = ctx
        .materials
        .builtin(ctx.backend, "defaultMask-000000", MaterialKind::AlphaMask);
    let sampler = ctx.samplers.get(ctx.backend, SamplerKind::Linear);

    let layout = UniformLayout::builder()
        .field("resolution", FieldType::Vec2)
        .field("time", FieldType::Float)
        .field("speed", FieldType::Float)
        .field("scale", FieldType::Float)
        .field("scale_x", FieldType::Float)
        .field("amount", FieldType::Float)
        .field("direction", FieldType::Float)
        .field("use_mask", FieldType::Float)
        .build();
    let mut uniforms = UniformBuffer::new(ctx.backend, layout);
    uniforms.set_field("resolution", &ctx.canvas.size());

    let properties = vec![
        // Clouds are usually painted in, so the mask starts enabled.
        PropertyDef::new(
            "use_mask",
            "Use opacity mask",
            PropertyControl::Checkbox { default: true, slot: UniformSlot::field("use_mask") },
        ),
        PropertyDef::new(
            "alpha_mask",
            "Opacity mask",
            PropertyControl::AlphaMask {
                default: "defaultMask-000000".into(),
                slot: TextureSlot::new(name, 1),
            },
        )
        .when(Condition::Checked("use_mask".into())),
        PropertyDef::new(
            "speed",
            "Drift speed",
            PropertyControl::Float { default: 0.1, range: [0.01, 1.0], slot: UniformSlot::field("speed") },
        ),
        PropertyDef::new(
            "scale",
            "Granularity",
            PropertyControl::Float { default: 2.0, range: [0.5, 4.0], slot: UniformSlot::field("scale") },
        ),
        PropertyDef::new(
            "scale_x",
            "Horizontal granularity",
            PropertyControl::Float { default: 0.5, range: [0.1, 1.0], slot: UniformSlot::field("scale_x") },
        ),
        PropertyDef::new(
            "amount",
            "Drift amount",
            PropertyControl::Float { default: 0.1, range: [0.0, 0.2], slot: UniformSlot::field("amount") },
        ),
        PropertyDef::new(
            "direction",
            "Drift direction",
            PropertyControl::Float {
                default: 90.0,
                range: [0.0, 360.0],
                slot: UniformSlot::field("direction"),
            },
        ),
    ];

    let resources = vec![
        ResourceBinding::ChainInput,
        ResourceBinding::Texture(mask),
        ResourceBinding::Texture(noise),
        ResourceBinding::Sampler(sampler),
        ResourceBinding::Uniforms(uniforms.handle()),
    ];

    Ok(Effect::new(
        ctx.backend,
        name,
        EffectKind::CloudMotion,
        properties,
        vec![("main".into(), uniforms)],
        vec![EffectPass::new(name, shader, resources)],
        vec![FrameBinding::new(UniformSlot::field("time"), FrameSource::Time)],
    ))
}
