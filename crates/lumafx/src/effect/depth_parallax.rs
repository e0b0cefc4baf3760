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
    let shader = ctx.shaders.load("depth-parallax/depth-parallax")?;
    let depth = ctx
        .materials
        .builtin(ctx.backend, "defaultDepthMap", MaterialKind::AlphaMask);
    let mask = ctx
        .materials
        .builtin(ctx.backend, "defaultMask-000000", MaterialKind::AlphaMask);
    let sampler = ctx.samplers.get(ctx.backend, SamplerKind::Linear);

    let layout = UniformLayout::builder()
        .field("canvas_res", FieldType::Vec2)
        .field("pointer", FieldType::Vec2)
        .field("scale", FieldType::Vec2)
        .field("sensitivity", FieldType::Float)
        .field("center", FieldType::Float)
        .field("quality", FieldType::Float)
        .field("use_mask", FieldType::Float)
        .build();
    let mut uniforms = UniformBuffer::new(ctx.backend, layout);
    uniforms.set_field("canvas_res", &ctx.canvas.size());
    uniforms.set_field("pointer", &[0.5, 0.5]);

    let properties = vec![
        PropertyDef::new(
            "depth_map",
            "Depth map",
            PropertyControl::AlphaMask {
                default: "defaultDepthMap".into(),
                slot: TextureSlot::new(name, 1),
            },
        ),
        PropertyDef::new(
            "quality",
            "Quality",
            PropertyControl::Select {
                default: 1,
                options: vec![
                    SelectOption::new(0, "Basic"),
                    SelectOption::new(1, "Occlusion (fast)"),
                    SelectOption::new(2, "Occlusion (quality)"),
                ],
                slot: UniformSlot::field("quality"),
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
                slot: TextureSlot::new(name, 2),
            },
        )
        .when(Condition::Checked("use_mask".into())),
        PropertyDef::new(
            "scale",
            "Depth scale",
            PropertyControl::Vec2 { default: [1.0, 1.0], range: [0.01, 2.0], slot: UniformSlot::field("scale") },
        ),
        PropertyDef::new(
            "sensitivity",
            "Parallax sensitivity",
            PropertyControl::Float {
                default: 1.0,
                range: [-5.0, 5.0],
                slot: UniformSlot::field("sensitivity"),
            },
        ),
        PropertyDef::new(
            "center",
            "Focal center",
            PropertyControl::Float { default: 0.3, range: [0.0, 1.0], slot: UniformSlot::field("center") },
        ),
    ];

    let resources = vec![
        ResourceBinding::ChainInput,
        ResourceBinding::Texture(depth),
        ResourceBinding::Texture(mask),
        ResourceBinding::Sampler(sampler),
        ResourceBinding::Uniforms(uniforms.handle()),
    ];

    Ok(Effect::new(
        ctx.backend,
        name,
        EffectKind::DepthParallax,
        properties,
        vec![("main".into(), uniforms)],
        vec![EffectPass::new(name, shader, resources)],
        vec![FrameBinding::new(UniformSlot::field("pointer"), FrameSource::Pointer)],
    ))
}
