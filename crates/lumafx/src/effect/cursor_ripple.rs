use anyhow::Result;

use crate::material::MaterialKind;
use crate::params::{Condition, PropertyControl, PropertyDef, TextureSlot, UniformSlot};
use crate::render::backend::TargetFormat;
use crate::render::pass::{PassTarget, ResourceBinding};
use crate::render::sampler::SamplerKind;
use crate::render::uniforms::{FieldType, UniformBuffer, UniformLayout};

use super::{Effect, EffectContext, EffectKind, EffectPass, FrameBinding, FrameSource};

/// Three-pass cursor ripple: `force` injects energy from pointer movement,
/// `simulate` propagates it across a ping-pong texture pair, the terminal
/// pass combines the ripple field with the chain input.
pub(super) fn build(ctx: &mut EffectContext, name: &str) -> Result<Effect> {
    let force_shader = ctx.shaders.load("cursor-ripple/ripple-force")?;
    let simulate_shader = ctx.shaders.load("cursor-ripple/ripple-simulate")?;
    let combine_shader = ctx.shaders.load("cursor-ripple/ripple-combine")?;
    let mask = ctx
        .materials
        .builtin(ctx.backend, "defaultMask-FFFFFF", MaterialKind::AlphaMask);
    let sampler = ctx.samplers.get(ctx.backend, SamplerKind::Linear);

    let force_layout = UniformLayout::builder()
        .field("pointer", FieldType::Vec2)
        .field("pointer_last", FieldType::Vec2)
        .field("pointer_speed", FieldType::Float)
        .field("ripple_scale", FieldType::Float)
        .field("canvas_res", FieldType::Vec2)
        .field("frame_time", FieldType::Float)
        .build();
    let simulate_layout = UniformLayout::builder()
        .field("speed", FieldType::Float)
        .field("decay", FieldType::Float)
        .field("use_mask", FieldType::Float)
        .build();
    let combine_layout = UniformLayout::builder().field("strength", FieldType::Float).build();

    let mut force = UniformBuffer::new(ctx.backend, force_layout);
    force.set_field("canvas_res", &ctx.canvas.size());
    let simulate = UniformBuffer::new(ctx.backend, simulate_layout);
    let combine = UniformBuffer::new(ctx.backend, combine_layout);

    // Simulation state lives in a canvas-sized rgba16float ping-pong pair:
    // force writes B reading A, simulate writes A reading B.
    const FORMAT: TargetFormat = TargetFormat::Rgba16Float;
    let ripple_a =
        ctx.backend.create_target_texture(ctx.canvas.width, ctx.canvas.height, FORMAT);
    let ripple_b =
        ctx.backend.create_target_texture(ctx.canvas.width, ctx.canvas.height, FORMAT);

    let force_pass = format!("{name}__force");
    let simulate_pass = format!("{name}__simulate");

    let properties = vec![
        PropertyDef::new(
            "use_mask",
            "Use collision mask",
            PropertyControl::Checkbox {
                default: false,
                slot: UniformSlot::named("simulate", "use_mask"),
            },
        ),
        PropertyDef::new(
            "alpha_mask",
            "Collision mask",
            PropertyControl::AlphaMask {
                default: "defaultMask-FFFFFF".into(),
                slot: TextureSlot::new(&simulate_pass, 2),
            },
        )
        .when(Condition::Checked("use_mask".into())),
        PropertyDef::new(
            "ripple_scale",
            "Ripple size",
            PropertyControl::Float {
                default: 1.0,
                range: [0.0, 2.0],
                slot: UniformSlot::named("force", "ripple_scale"),
            },
        ),
        PropertyDef::new(
            "ripple_speed",
            "Ripple speed",
            PropertyControl::Float {
                default: 1.0,
                range: [0.0, 2.0],
                slot: UniformSlot::named("simulate", "speed"),
            },
        ),
        PropertyDef::new(
            "ripple_decay",
            "Ripple decay",
            PropertyControl::Float {
                default: 0.98,
                range: [0.0, 4.0],
                slot: UniformSlot::named("simulate", "decay"),
            },
        ),
        PropertyDef::new(
            "ripple_strength",
            "Ripple strength",
            PropertyControl::Float {
                default: 1.0,
                range: [0.0, 5.0],
                slot: UniformSlot::named("combine", "strength"),
            },
        ),
    ];

    let passes = vec![
        EffectPass::new(
            &force_pass,
            force_shader,
            vec![ResourceBinding::Uniforms(force.handle()), ResourceBinding::Texture(ripple_a)],
        )
        .with_output(PassTarget { texture: ripple_b, format: FORMAT }),
        EffectPass::new(
            &simulate_pass,
            simulate_shader,
            vec![
                ResourceBinding::Uniforms(simulate.handle()),
                ResourceBinding::Texture(ripple_b),
                ResourceBinding::Texture(mask),
            ],
        )
        .with_output(PassTarget { texture: ripple_a, format: FORMAT }),
        EffectPass::new(
            name,
            combine_shader,
            vec![
                ResourceBinding::Sampler(sampler),
                ResourceBinding::Uniforms(combine.handle()),
                ResourceBinding::ChainInput,
                ResourceBinding::Texture(ripple_a),
            ],
        ),
    ];

    let frame_bindings = vec![
        FrameBinding::new(UniformSlot::named("force", "pointer"), FrameSource::Pointer),
        FrameBinding::new(UniformSlot::named("force", "pointer_last"), FrameSource::PointerLast),
        FrameBinding::new(UniformSlot::named("force", "pointer_speed"), FrameSource::PointerSpeed),
        FrameBinding::new(UniformSlot::named("force", "frame_time"), FrameSource::Time),
    ];

    Ok(Effect::new(
        ctx.backend,
        name,
        EffectKind::CursorRipple,
        properties,
        vec![("force".into(), force), ("simulate".into(), simulate), ("combine".into(), combine)],
        passes,
        frame_bindings,
    ))
}
