use anyhow::Result;

use crate::material::MaterialKind;
use crate::params::{Condition, PropertyControl, PropertyDef, TextureSlot, UniformSlot};
use crate::render::pass::ResourceBinding;
use crate::render::sampler::SamplerKind;
use crate::render::uniforms::{FieldType, UniformBuffer, UniformLayout};

use super::{Effect, EffectContext, EffectKind, EffectPass, FrameBinding, FrameSource};

pub(super) fn build(ctx: &mut EffectContext, name: &str) -> Result<Effect> {
    let shader = ctx.shaders.load("water-waves/water-waves")?;
    let mask = ctx
        .materials
        .builtin(ctx.backend, "defaultMask-000000", MaterialKind::AlphaMask);
    let sampler = ctx.samplers.get(ctx.backend, SamplerKind::Linear);

    let layout = UniformLayout::builder()
        .field("resolution", FieldType::Vec2)
        .field("time", FieldType::Float)
        .field("speed", FieldType::Float)
        .field("scale", FieldType::Float)
        .field("exponent", FieldType::Float)
        .field("strength", FieldType::Float)
        .field("direction", FieldType::Float)
        .field("speed2", FieldType::Float)
        .field("scale2", FieldType::Float)
        .field("offset2", FieldType::Float)
        .field("exponent2", FieldType::Float)
        .field("direction2", FieldType::Float)
        .field("use_dual_waves", FieldType::Float)
        .field("use_mask", FieldType::Float)
        .build();
    let mut uniforms = UniformBuffer::new(ctx.backend, layout);
    uniforms.set_field("resolution", &ctx.canvas.size());

    let dual = Condition::Checked("use_dual_waves".into());

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
                default: "defaultMask-000000".into(),
                slot: TextureSlot::new(name, 1),
            },
        )
        .when(Condition::Checked("use_mask".into())),
        PropertyDef::new(
            "use_dual_waves",
            "Dual waves",
            PropertyControl::Checkbox { default: false, slot: UniformSlot::field("use_dual_waves") },
        ),
        PropertyDef::new(
            "speed",
            "Wave speed",
            PropertyControl::Float { default: 5.0, range: [0.01, 50.0], slot: UniformSlot::field("speed") },
        ),
        PropertyDef::new(
            "scale",
            "Wave scale",
            PropertyControl::Float { default: 200.0, range: [0.01, 1000.0], slot: UniformSlot::field("scale") },
        ),
        PropertyDef::new(
            "exponent",
            "Wave exponent",
            PropertyControl::Float { default: 1.0, range: [0.51, 4.0], slot: UniformSlot::field("exponent") },
        ),
        PropertyDef::new(
            "strength",
            "Wave strength",
            PropertyControl::Float { default: 0.1, range: [0.01, 1.0], slot: UniformSlot::field("strength") },
        ),
        PropertyDef::new(
            "direction",
            "Wave direction",
            PropertyControl::Float {
                default: 180.0,
                range: [0.0, 360.0],
                slot: UniformSlot::field("direction"),
            },
        ),
        PropertyDef::new(
            "speed2",
            "Second wave speed",
            PropertyControl::Float { default: 3.0, range: [0.01, 50.0], slot: UniformSlot::field("speed2") },
        )
        .when(dual.clone()),
        PropertyDef::new(
            "scale2",
            "Second wave scale",
            PropertyControl::Float { default: 66.0, range: [0.01, 1000.0], slot: UniformSlot::field("scale2") },
        )
        .when(dual.clone()),
        PropertyDef::new(
            "offset2",
            "Second wave offset",
            PropertyControl::Float { default: 0.0, range: [-5.0, 5.0], slot: UniformSlot::field("offset2") },
        )
        .when(dual.clone()),
        PropertyDef::new(
            "exponent2",
            "Second wave exponent",
            PropertyControl::Float { default: 1.0, range: [0.51, 4.0], slot: UniformSlot::field("exponent2") },
        )
        .when(dual.clone()),
        PropertyDef::new(
            "direction2",
            "Second wave direction",
            PropertyControl::Float {
                default: 180.0,
                range: [0.0, 360.0],
                slot: UniformSlot::field("direction2"),
            },
        )
        .when(dual),
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
        EffectKind::WaterWaves,
        properties,
        vec![("main".into(), uniforms)],
        vec![EffectPass::new(name, shader, resources)],
        vec![FrameBinding::new(UniformSlot::field("time"), FrameSource::Time)],
    ))
}
