//! Effect-chain orchestration: flattening layers into the ordered render
//! pass list the backend executes each frame.
//!
//! Chain topology is never stored as resource references. Each effect pass
//! marks where it reads its predecessor with `ResourceBinding::ChainInput`,
//! and this module re-derives every input binding from current chain order
//! on each rebuild. Insertion, removal and toggling therefore need no
//! re-link step: mutate the effect list and rebuild.

use crate::layer::ImageLayer;
use crate::render::pass::{BlendMode, PassDesc, ResourceBinding};

/// Flatten one layer into its ordered pass list.
///
/// The base pass comes first and is canvas-visible only when no enabled
/// effect follows. Exactly one pass per layer targets the canvas (the
/// terminal sub-pass of the last enabled effect), alpha-composited over
/// the layers beneath; every other pass is an offscreen data transform.
pub fn build_layer_passes(layer: &ImageLayer) -> Vec<PassDesc> {
    let chains: Vec<_> = layer
        .enabled_effects()
        .map(|effect| effect.active_passes())
        .filter(|passes| !passes.is_empty())
        .collect();

    let base_name = layer.base_pass_name();
    let mut out = vec![PassDesc {
        name: base_name.clone(),
        shader: layer.base_shader(),
        resources: layer.base_resources(),
        output: None,
        blend_mode: BlendMode::Alpha,
        render_to_canvas: chains.is_empty(),
    }];

    let mut upstream = base_name;
    let last_chain = chains.len().saturating_sub(1);
    for (i, passes) in chains.iter().enumerate() {
        for (j, pass) in passes.iter().enumerate() {
            let terminal = i == last_chain && j + 1 == passes.len();
            let resources = pass
                .resources
                .iter()
                .map(|binding| match binding {
                    ResourceBinding::ChainInput => ResourceBinding::PassOutput(upstream.clone()),
                    other => other.clone(),
                })
                .collect();
            out.push(PassDesc {
                name: pass.name.clone(),
                shader: pass.shader.clone(),
                resources,
                output: pass.output,
                blend_mode: if terminal { BlendMode::Alpha } else { BlendMode::None },
                render_to_canvas: terminal,
            });
        }
        if let Some(tail) = passes.last() {
            upstream = tail.name.clone();
        }
    }
    out
}

/// Flatten every layer, in layer order, into one frame's pass list.
/// Idempotent and total: always derivable from current state, which makes
/// it the consistency-recovery mechanism after any structural mutation.
pub fn build_frame_passes(layers: &[ImageLayer]) -> Vec<PassDesc> {
    layers.iter().flat_map(build_layer_passes).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effect::EffectKind;
    use crate::testing::test_session;

    fn input_of<'a>(passes: &'a [PassDesc], name: &str) -> Option<&'a str> {
        passes
            .iter()
            .find(|p| p.name == name)?
            .resources
            .iter()
            .find_map(|r| match r {
                ResourceBinding::PassOutput(upstream) => Some(upstream.as_str()),
                _ => None,
            })
    }

    fn canvas_passes(passes: &[PassDesc]) -> Vec<&str> {
        passes.iter().filter(|p| p.render_to_canvas).map(|p| p.name.as_str()).collect()
    }

    #[test]
    fn empty_chain_renders_base_to_canvas() {
        let (mut session, _) = test_session();
        let layer = session.add_layer_fixture("photo");
        let passes = build_layer_passes(&session.layers[layer]);
        assert_eq!(passes.len(), 1);
        assert!(passes[0].render_to_canvas);
        assert_eq!(passes[0].blend_mode, BlendMode::Alpha);
    }

    #[test]
    fn single_effect_takes_over_canvas_output() {
        let (mut session, _) = test_session();
        let layer = session.add_layer_fixture("photo");
        session.add_effect(layer, EffectKind::Tint).unwrap();

        let passes = build_layer_passes(&session.layers[layer]);
        assert_eq!(passes.len(), 2);
        assert!(!passes[0].render_to_canvas);
        assert!(passes[1].render_to_canvas);
        assert_eq!(passes[1].blend_mode, BlendMode::Alpha);
        // Effect 0 reads the base pass
        let base = session.layers[layer].base_pass_name();
        assert_eq!(input_of(&passes, &passes[1].name.clone()), Some(base.as_str()));
    }

    #[test]
    fn chain_links_each_effect_to_its_predecessor() {
        let (mut session, _) = test_session();
        let layer = session.add_layer_fixture("photo");
        session.add_effect(layer, EffectKind::Tint).unwrap();
        session.add_effect(layer, EffectKind::Scroll).unwrap();
        session.add_effect(layer, EffectKind::Reflection).unwrap();

        let passes = build_layer_passes(&session.layers[layer]);
        let names: Vec<&str> = passes.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(passes.len(), 4);
        for i in 2..4 {
            assert_eq!(input_of(&passes, names[i]), Some(names[i - 1]));
        }
        assert_eq!(canvas_passes(&passes), vec![names[3]]);
    }

    #[test]
    fn removal_relinks_successor_to_predecessor() {
        let (mut session, _) = test_session();
        let layer = session.add_layer_fixture("photo");
        session.add_effect(layer, EffectKind::Tint).unwrap();
        session.add_effect(layer, EffectKind::Scroll).unwrap();
        session.add_effect(layer, EffectKind::Reflection).unwrap();
        let tint = session.layers[layer].effects[0].name.clone();
        let reflection = session.layers[layer].effects[2].name.clone();

        session.remove_effect(layer, 1);

        let passes = build_layer_passes(&session.layers[layer]);
        let names: Vec<&str> = passes.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names.len(), 3);
        assert_eq!(input_of(&passes, &reflection), Some(tint.as_str()));
        assert_eq!(canvas_passes(&passes), vec![reflection.as_str()]);
    }

    #[test]
    fn disabled_effects_drop_out_of_the_chain() {
        let (mut session, _) = test_session();
        let layer = session.add_layer_fixture("photo");
        session.add_effect(layer, EffectKind::Tint).unwrap();
        session.add_effect(layer, EffectKind::Scroll).unwrap();
        session.add_effect(layer, EffectKind::Reflection).unwrap();
        let tint = session.layers[layer].effects[0].name.clone();
        let reflection = session.layers[layer].effects[2].name.clone();

        session.set_effect_enabled(layer, 1, false);
        let passes = build_layer_passes(&session.layers[layer]);
        assert_eq!(passes.len(), 3);
        assert_eq!(input_of(&passes, &reflection), Some(tint.as_str()));

        // Disabling every predecessor rewires the survivor to the base pass
        session.set_effect_enabled(layer, 0, false);
        let passes = build_layer_passes(&session.layers[layer]);
        let base = session.layers[layer].base_pass_name();
        assert_eq!(input_of(&passes, &reflection), Some(base.as_str()));
        assert_eq!(canvas_passes(&passes), vec![reflection.as_str()]);

        // Disabling everything hands the canvas back to the base pass
        session.set_effect_enabled(layer, 2, false);
        let passes = build_layer_passes(&session.layers[layer]);
        assert_eq!(canvas_passes(&passes), vec![base.as_str()]);
    }

    #[test]
    fn multi_pass_effect_keeps_intermediates_offscreen() {
        let (mut session, _) = test_session();
        let layer = session.add_layer_fixture("photo");
        session.add_effect(layer, EffectKind::CursorRipple).unwrap();
        let effect = session.layers[layer].effects[0].name.clone();

        let passes = build_layer_passes(&session.layers[layer]);
        assert_eq!(passes.len(), 4); // base + force + simulate + combine
        assert_eq!(canvas_passes(&passes), vec![effect.as_str()]);
        let force = &passes[1];
        let simulate = &passes[2];
        assert!(force.output.is_some());
        assert!(simulate.output.is_some());
        assert_eq!(force.blend_mode, BlendMode::None);
        assert_eq!(simulate.blend_mode, BlendMode::None);
        // Only the combine pass reads the chain input
        let base = session.layers[layer].base_pass_name();
        assert_eq!(input_of(&passes, &effect), Some(base.as_str()));
        assert!(input_of(&passes, &force.name.clone()).is_none());
    }

    #[test]
    fn each_layer_composites_exactly_once() {
        let (mut session, _) = test_session();
        let first = session.add_layer_fixture("背景");
        let second = session.add_layer_fixture("foreground");
        session.add_effect(first, EffectKind::Tint).unwrap();

        let passes = build_frame_passes(&session.layers);
        let canvas = canvas_passes(&passes);
        assert_eq!(canvas.len(), 2);
        assert_eq!(canvas[0], session.layers[first].effects[0].name);
        assert_eq!(canvas[1], session.layers[second].base_pass_name());
    }
}
