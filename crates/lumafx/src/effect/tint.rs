use anyhow::Result;

use crate::material::MaterialKind;
use crate::params::{Condition, PropertyControl, PropertyDef, TextureSlot, UniformSlot};
use crate::render::pass::ResourceBinding;
use crate::render::sampler::SamplerKind;
use crate::render::uniforms::{FieldType, UniformBuffer, UniformLayout};

use super::{Effect, EffectContext, EffectKind, EffectPass, blend_mode_options};

pub(super) fn build(ctx: &mut EffectContext, name: &str) -> Result<Effect> {
    let shader = ctx.shaders.load("tint/tint")?;
    let mask = ctx
        .materials
        .builtin(ctx.backend, "defaultMask-000000", MaterialKind::AlphaMask);
    let sampler = ctx.samplers.get(ctx.backend, SamplerKind::Linear);

    let layout = UniformLayout::builder()
        .field("canvas_res", FieldType::Vec2)
        .field("blend_mode", FieldType::Float)
        .field("use_mask", FieldType::Float)
        .field("blend_alpha", FieldType::Float)
        .field("tint_color", FieldType::Vec3)
        .build();
    let mut uniforms = UniformBuffer::new(ctx.backend, layout);
    uniforms.set_field("canvas_res", &ctx.canvas.size());

    let properties = vec![
        PropertyDef::new(
            "blend_mode",
            "Blend mode",
            PropertyControl::Select {
                default: 0,
                options: blend_mode_options(),
                slot: UniformSlot::field("blend_mode"),
            },
        ),
        PropertyDef::new(
            "use_mask",
            "Use opacity mask",
            PropertyControl::Checkbox { default: false, slot: UniformSlot::field("use_mask") },
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
            "blend_alpha",
            "Strength",
            PropertyControl::Float { default: 0.5, range: [0.0, 1.0], slot: UniformSlot::field("blend_alpha") },
        ),
        PropertyDef::new(
            "tint_color",
            "Tint",
            PropertyControl::Color { default: [1.0, 0.0, 0.0], slot: UniformSlot::field("tint_color") },
        ),
    ];

    let resources = vec![
        ResourceBinding::ChainInput,
        ResourceBinding::Texture(mask),
        ResourceBinding::Sampler(sampler),
        ResourceBinding::Uniforms(uniforms.handle()),
    ];

    Ok(Effect::new(
        ctx.backend,
        name,
        EffectKind::Tint,
        properties,
        vec![("main".into(), uniforms)],
        vec![EffectPass::new(name, shader, resources)],
        Vec::new(),
    ))
}
