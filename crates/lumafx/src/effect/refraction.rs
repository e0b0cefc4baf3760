use anyhow::Result;

use crate::material::MaterialKind;
use crate::params::{Condition, PropertyControl, PropertyDef, TextureSlot, UniformSlot};
use crate::render::pass::ResourceBinding;
use crate::render::sampler::SamplerKind;
use crate::render::uniforms::{FieldType, UniformBuffer, UniformLayout};

use super::{Effect, EffectContext, EffectKind, EffectPass};

pub(super) fn build(ctx: &mut EffectContext, name: &str) -> Result<Effect> {
    let shader = ctx.shaders.load("refraction/refraction")?;
    let normal = ctx.materials.texture_asset(
        ctx.backend,
        "textures/refractnormal.png",
        [127, 127, 255],
    );
    let mask = ctx
        .materials
        .builtin(ctx.backend, "defaultMask-000000", MaterialKind::AlphaMask);
    let sampler = ctx.samplers.get(ctx.backend, SamplerKind::Linear);

    let layout = UniformLayout::builder()
        .field("scale", FieldType::Vec2)
        .field("strength", FieldType::Float)
        .field("use_mask", FieldType::Float)
        .build();
    let uniforms = UniformBuffer::new(ctx.backend, layout);

    let properties = vec![
        PropertyDef::new(
            "scale",
            "Normal scale",
            PropertyControl::Vec2 { default: [1.0, 1.0], range: [0.1, 10.0], slot: UniformSlot::field("scale") },
        ),
        PropertyDef::new(
            "strength",
            "Refraction strength",
            PropertyControl::Float { default: 0.1, range: [-1.0, 1.0], slot: UniformSlot::field("strength") },
        ),
        PropertyDef::new(
            "use_mask",
            "Use opacity mask",
            PropertyControl::Checkbox { default: false, slot: UniformSlot::field("use_mask") },
        ),
        PropertyDef::new(
            "normal_map",
            "Normal map",
            PropertyControl::AlphaMask {
                default: "defaultNormalMap".into(),
                slot: TextureSlot::new(name, 1),
            },
        ),
        PropertyDef::new(
            "alpha_mask",
            "Opacity mask",
            PropertyControl::AlphaMask {
                default: "defaultMask-000000".into(),
                slot: TextureSlot::new(name, 2),
            },
        )
        .when(Condition::Checked("use_mask".into())),
    ];

    let resources = vec![
        ResourceBinding::ChainInput,
        ResourceBinding::Texture(normal),
        ResourceBinding::Texture(mask),
        ResourceBinding::Sampler(sampler),
        ResourceBinding::Uniforms(uniforms.handle()),
    ];

    Ok(Effect::new(
        ctx.backend,
        name,
        EffectKind::Refraction,
        properties,
        vec![("main".into(), uniforms)],
        vec![EffectPass::new(name, shader, resources)],
        Vec::new(),
    ))
}
