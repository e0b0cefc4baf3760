use anyhow::Result;

use crate::material::MaterialKind;
use crate::params::{
    Condition, PropertyControl, PropertyDef, SelectOption, TextureSlot, UniformSlot,
};
use crate::render::pass::ResourceBinding;
use crate::render::sampler::SamplerKind;
use crate::render::uniforms::{FieldType, UniformBuffer, UniformLayout};

use super::{Effect, EffectContext, EffectKind, EffectPass, FrameBinding, FrameSource};

pub(super) fn build(ctx: &mut EffectContext, name: &str) -> Result<Effect> {
    let shader = ctx.shaders.load("shake/shake")?;
    let flow_mask = ctx
        .materials
        .builtin(ctx.backend, "defaultMask-7F7F00", MaterialKind::FlowMask);
    let opacity_mask = ctx
        .materials
        .builtin(ctx.backend, "defaultMask-000000", MaterialKind::AlphaMask);
    let sampler = ctx.samplers.get(ctx.backend, SamplerKind::Linear);

    let layout = UniformLayout::builder()
        .field("time", FieldType::Float)
        .field("speed", FieldType::Float)
        .field("amp", FieldType::Float)
        .field("friction", FieldType::Vec2)
        .field("bounds_min", FieldType::Float)
        .field("bounds_max", FieldType::Float)
        .field("use_noise", FieldType::Float)
        .field("use_flow_mask", FieldType::Float)
        .field("use_opacity_mask", FieldType::Float)
        .field("direction", FieldType::Float)
        .build();
    let uniforms = UniformBuffer::new(ctx.backend, layout);

    let properties = vec![
        PropertyDef::new(
            "use_noise",
            "Noise mode",
            PropertyControl::Checkbox { default: false, slot: UniformSlot::field("use_noise") },
        ),
        PropertyDef::new(
            "use_flow_mask",
            "Use flow mask",
            PropertyControl::Checkbox { default: true, slot: UniformSlot::field("use_flow_mask") },
        ),
        PropertyDef::new(
            "flow_mask",
            "Flow mask",
            PropertyControl::FlowMask {
                default: "defaultMask-7F7F00".into(),
                slot: TextureSlot::new(name, 1),
            },
        )
        .when(Condition::Checked("use_flow_mask".into())),
        PropertyDef::new(
            "use_opacity_mask",
            "Use opacity mask",
            PropertyControl::Checkbox {
                default: false,
                slot: UniformSlot::field("use_opacity_mask"),
            },
        ),
        PropertyDef::new(
            "opacity_mask",
            "Opacity mask",
            PropertyControl::AlphaMask {
                default: "defaultMask-000000".into(),
                slot: TextureSlot::new(name, 2),
            },
        )
        .when(Condition::Checked("use_opacity_mask".into())),
        PropertyDef::new(
            "direction",
            "Shake direction",
            PropertyControl::Select {
                default: 0,
                options: vec![
                    SelectOption::new(0, "Center"),
                    SelectOption::new(1, "Left"),
                    SelectOption::new(2, "Right"),
                ],
                slot: UniformSlot::field("direction"),
            },
        ),
        PropertyDef::new(
            "speed",
            "Shake speed",
            PropertyControl::Float { default: 1.0, range: [0.0, 10.0], slot: UniformSlot::field("speed") },
        ),
        PropertyDef::new(
            "amp",
            "Shake strength",
            PropertyControl::Float { default: 0.1, range: [0.01, 0.5], slot: UniformSlot::field("amp") },
        ),
        PropertyDef::new(
            "friction",
            "Friction",
            PropertyControl::Vec2 { default: [1.0, 1.0], range: [0.01, 10.0], slot: UniformSlot::field("friction") },
        ),
        PropertyDef::new(
            "bounds_min",
            "Lower bound",
            PropertyControl::Float { default: 0.0, range: [0.0, 0.9], slot: UniformSlot::field("bounds_min") },
        ),
        PropertyDef::new(
            "bounds_max",
            "Upper bound",
            PropertyControl::Float { default: 1.0, range: [0.1, 1.0], slot: UniformSlot::field("bounds_max") },
        ),
    ];

    let resources = vec![
        ResourceBinding::ChainInput,
        ResourceBinding::Texture(flow_mask),
        ResourceBinding::Texture(opacity_mask),
        ResourceBinding::Sampler(sampler),
        ResourceBinding::Uniforms(uniforms.handle()),
    ];

    Ok(Effect::new(
        ctx.backend,
        name,
        EffectKind::Shake,
        properties,
        vec![("main".into(), uniforms)],
        vec![EffectPass::new(name, shader, resources)],
        vec![FrameBinding::new(UniformSlot::field("time"), FrameSource::Time)],
    ))
}
