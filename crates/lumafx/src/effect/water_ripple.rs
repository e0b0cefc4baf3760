use anyhow::Result;

use crate::material::MaterialKind;
use crate::params::{Condition, PropertyControl, PropertyDef, TextureSlot, UniformSlot};
use crate::render::pass::ResourceBinding;
use crate::render::sampler::SamplerKind;
use crate::render::uniforms::{FieldType, UniformBuffer, UniformLayout};

use super::{Effect, EffectContext, EffectKind, EffectPass, FrameBinding, FrameSource};

pub(super) fn build(ctx: &mut EffectContext, name: &str) -> Result<Effect> {
    let shader = ctx.shaders.load("water-ripple/water-ripple")?;
    let normal = ctx.materials.texture_asset(
        ctx.backend,
        "effects/water-ripple/normal_texture.png",
        [127, 127, 255],
    );
    let mask = ctx
        .materials
        .builtin(ctx.backend, "defaultMask-FFFFFF", MaterialKind::AlphaMask);
    let sampler = ctx.samplers.get(ctx.backend, SamplerKind::Linear);

    let layout = UniformLayout::builder()
        .field("resolution", FieldType::Vec2)
        .field("tex_resolution", FieldType::Vec2)
        .field("time", FieldType::Float)
        .field("speed", FieldType::Float)
        .field("scroll_speed", FieldType::Float)
        .field("angle", FieldType::Float)
        .field("ratio", FieldType::Float)
        .field("strength", FieldType::Float)
        .field("scale", FieldType::Float)
        .field("use_mask", FieldType::Float)
        .build();
    let mut uniforms = UniformBuffer::new(ctx.backend, layout);
    uniforms.set_field("resolution", &ctx.canvas.size());
    uniforms.set_field("tex_resolution", &ctx.canvas.size());

    let properties = vec![
        PropertyDef::new(
            "use_mask",
            "Use opacity mask",
            PropertyControl::Checkbox { default: false, slot: UniformSlot::field("use_mask") },
        ),
        PropertyDef::new(
            "alpha_mask",
            "Opacity mask",
            PropertyControl::AlphaMask {
                default: "defaultMask-FFFFFF".into(),
                slot: TextureSlot::new(name, 3),
            },
        )
        .when(Condition::Checked("use_mask".into())),
        PropertyDef::new(
            "speed",
            "Speed",
            PropertyControl::Float { default: 0.1, range: [0.0, 1.0], slot: UniformSlot::field("speed") },
        ),
        PropertyDef::new(
            "scroll_speed",
            "Scroll speed",
            PropertyControl::Float {
                default: 0.2,
                range: [0.0, 1.0],
                slot: UniformSlot::field("scroll_speed"),
            },
        ),
        PropertyDef::new(
            "angle",
            "Scroll angle",
            PropertyControl::Float { default: 1.0, range: [0.0, 6.28], slot: UniformSlot::field("angle") },
        ),
        PropertyDef::new(
            "ratio",
            "Ratio",
            PropertyControl::Float { default: 1.0, range: [0.5, 2.0], slot: UniformSlot::field("ratio") },
        ),
        PropertyDef::new(
            "strength",
            "Strength",
            PropertyControl::Float { default: 0.1, range: [0.0, 1.0], slot: UniformSlot::field("strength") },
        ),
        PropertyDef::new(
            "scale",
            "Scale",
            PropertyControl::Float { default: 2.0, range: [0.5, 5.0], slot: UniformSlot::field("scale") },
        ),
    ];

    let resources = vec![
        ResourceBinding::Uniforms(uniforms.handle()),
        ResourceBinding::Sampler(sampler),
        ResourceBinding::ChainInput,
        ResourceBinding::Texture(mask),
        ResourceBinding::Texture(normal),
    ];

    Ok(Effect::new(
        ctx.backend,
        name,
        EffectKind::WaterRipple,
        properties,
        vec![("main".into(), uniforms)],
        vec![EffectPass::new(name, shader, resources)],
        vec![FrameBinding::new(UniformSlot::field("time"), FrameSource::Time)],
    ))
}
