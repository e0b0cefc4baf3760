use anyhow::Result;

use crate::material::MaterialKind;
use crate::params::{Condition, PropertyControl, PropertyDef, TextureSlot, UniformSlot};
use crate::render::pass::ResourceBinding;
use crate::render::sampler::SamplerKind;
use crate::render::uniforms::{FieldType, UniformBuffer, UniformLayout};

use super::{Effect, EffectContext, EffectKind, EffectPass, blend_mode_options};

pub(super) fn build(ctx: &mut EffectContext, name: &str) -> Result<Effect> {
    let shader = ctx.shaders.load("reflection/reflection")?;
    let mask = ctx
        .materials
        .builtin(ctx.backend, "defaultMask-000000", MaterialKind::AlphaMask);
    let sampler = ctx.samplers.get(ctx.backend, SamplerKind::Linear);

    let layout = UniformLayout::builder()
        .field("canvas_res", FieldType::Vec2)
        .field("perspective", FieldType::Float)
        .field("direction", FieldType::Float)
        .field("offset", FieldType::Float)
        .field("point0", FieldType::Vec2)
        .field("point1", FieldType::Vec2)
        .field("point2", FieldType::Vec2)
        .field("point3", FieldType::Vec2)
        .field("alpha", FieldType::Float)
        .field("blend_mode", FieldType::Float)
        .field("use_mask", FieldType::Float)
        .build();
    let mut uniforms = UniformBuffer::new(ctx.backend, layout);
    uniforms.set_field("canvas_res", &ctx.canvas.size());

    let planar = Condition::Equals("perspective".into(), 0.0);
    let perspective = Condition::Equals("perspective".into(), 1.0);

    let properties = vec![
        PropertyDef::new(
            "perspective",
            "Mode",
            PropertyControl::Select {
                default: 0,
                options: vec![
                    crate::params::SelectOption::new(0, "Planar"),
                    crate::params::SelectOption::new(1, "Perspective"),
                ],
                slot: UniformSlot::field("perspective"),
            },
        ),
        PropertyDef::new(
            "blend_mode",
            "Blend mode",
            PropertyControl::Select {
                default: 9,
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
            "alpha",
            "Reflection strength",
            PropertyControl::Float { default: 1.0, range: [0.0, 1.0], slot: UniformSlot::field("alpha") },
        ),
        // Planar mode
        PropertyDef::new(
            "direction",
            "Reflection direction",
            PropertyControl::Float {
                default: 180.0,
                range: [0.0, 360.0],
                slot: UniformSlot::field("direction"),
            },
        )
        .when(planar.clone()),
        PropertyDef::new(
            "offset",
            "Y offset",
            PropertyControl::Float { default: 0.0, range: [-1.0, 1.0], slot: UniformSlot::field("offset") },
        )
        .when(planar),
        // Perspective mode quad corners
        PropertyDef::new(
            "point0",
            "Top left",
            PropertyControl::Vec2 { default: [0.0, 0.0], range: [0.0, 1.0], slot: UniformSlot::field("point0") },
        )
        .when(perspective.clone()),
        PropertyDef::new(
            "point1",
            "Top right",
            PropertyControl::Vec2 { default: [1.0, 0.0], range: [0.0, 1.0], slot: UniformSlot::field("point1") },
        )
        .when(perspective.clone()),
        PropertyDef::new(
            "point2",
            "Bottom right",
            PropertyControl::Vec2 { default: [1.0, 1.0], range: [0.0, 1.0], slot: UniformSlot::field("point2") },
        )
        .when(perspective.clone()),
        PropertyDef::new(
            "point3",
            "Bottom left",
            PropertyControl::Vec2 { default: [0.0, 1.0], range: [0.0, 1.0], slot: UniformSlot::field("point3") },
        )
        .when(perspective),
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
        EffectKind::Reflection,
        properties,
        vec![("main".into(), uniforms)],
        vec![EffectPass::new(name, shader, resources)],
        Vec::new(),
    ))
}
