use glam::Vec2;
use rustc_hash::FxHashSet;

use crate::chain;
use crate::effect::{EffectContext, EffectKind, build_effect};
use crate::error::{FxError, FxResult};
use crate::layer::{ImageLayer, content_hash};
use crate::material::{MaterialKind, MaterialStore, is_builtin_name};
use crate::params::PropertyValue;
use crate::pointer::PointerState;
use crate::render::backend::RenderBackend;
use crate::render::sampler::{SamplerCache, SamplerKind};
use crate::settings::CanvasSettings;
use crate::shader::ShaderCatalog;

/// The editor's root context object: the renderer handle, canvas settings,
/// pointer state, caches and the layer stack, passed explicitly into every
/// operation instead of living in module-level globals.
///
/// Everything here is single-threaded and frame-driven: structural
/// mutations (add/remove/toggle) finish synchronously — including the
/// rebuild — before the next `advance_frame` can observe resource
/// bindings.
pub struct EditorSession {
    backend: Option<Box<dyn RenderBackend>>,
    pub canvas: CanvasSettings,
    pub pointer: PointerState,
    pub samplers: SamplerCache,
    pub shaders: ShaderCatalog,
    pub materials: MaterialStore,
    pub layers: Vec<ImageLayer>,
    pub selected_layer: Option<usize>,
    pub selected_effect: Option<usize>,
    live_passes: FxHashSet<String>,
    next_effect_serial: u64,
}

impl EditorSession {
    pub fn new(canvas: CanvasSettings, shaders: ShaderCatalog, materials: MaterialStore) -> Self {
        Self {
            backend: None,
            canvas,
            pointer: PointerState::default(),
            samplers: SamplerCache::new(),
            shaders,
            materials,
            layers: Vec::new(),
            selected_layer: None,
            selected_effect: None,
            live_passes: FxHashSet::default(),
            next_effect_serial: 0,
        }
    }

    /// Hand over the renderer. Until this happens every mutating operation
    /// silently declines — "not yet initialized" is not an error.
    pub fn attach_backend(&mut self, backend: Box<dyn RenderBackend>) {
        self.backend = Some(backend);
    }

    pub fn backend_attached(&self) -> bool {
        self.backend.is_some()
    }

    /// Decode an image, register it as a material and append a new layer
    /// with its base pass. Returns `None` when no renderer is attached.
    pub fn add_image_layer(&mut self, name: &str, bytes: &[u8]) -> FxResult<Option<usize>> {
        let Some(backend) = self.backend.as_deref_mut() else {
            log::debug!("add_image_layer skipped: no renderer attached");
            return Ok(None);
        };
        let content_id = content_hash(bytes);
        let base_shader = self.shaders.load("base-layer").map_err(FxError::Other)?;
        let material_name = format!("{content_id}__material");
        let (texture, width, height) = {
            let material = self
                .materials
                .insert_bytes(backend, &material_name, MaterialKind::Image, bytes.to_vec())
                .map_err(FxError::Other)?;
            (material.texture, material.width, material.height)
        };
        let sampler = self.samplers.get(backend, SamplerKind::Linear);
        let layer = ImageLayer::new(
            backend,
            name,
            &content_id,
            &material_name,
            width,
            height,
            base_shader,
            texture,
            sampler,
        );
        log::info!("added layer '{name}' ({width}x{height}, id {content_id})");
        self.layers.push(layer);
        self.rebuild();
        Ok(Some(self.layers.len() - 1))
    }

    /// Append an effect of the given kind to a layer's chain. The effect is
    /// fully constructed — shaders loaded, buffers allocated and committed —
    /// before it becomes visible to any rebuild.
    pub fn add_effect(&mut self, layer_index: usize, kind: EffectKind) -> FxResult<()> {
        self.add_effect_named(layer_index, kind, None)
    }

    pub(crate) fn add_effect_named(
        &mut self,
        layer_index: usize,
        kind: EffectKind,
        name: Option<&str>,
    ) -> FxResult<()> {
        self.next_effect_serial += 1;
        let serial = self.next_effect_serial;
        let canvas = self.canvas;
        let Some(backend) = self.backend.as_deref_mut() else {
            log::debug!("add_effect skipped: no renderer attached");
            return Ok(());
        };
        let Some(layer) = self.layers.get_mut(layer_index) else {
            log::warn!("add_effect: layer {layer_index} does not exist");
            return Ok(());
        };
        let name = match name {
            Some(name) => name.to_string(),
            None => format!("{}__{}-{serial}", layer.content_id, kind.id()),
        };
        let mut ctx = EffectContext {
            backend,
            shaders: &mut self.shaders,
            samplers: &mut self.samplers,
            materials: &mut self.materials,
            canvas,
        };
        let effect = build_effect(&mut ctx, kind, &name)?;
        log::info!("added effect '{}' to layer {layer_index}", effect.name);
        layer.effects.push(effect);
        self.rebuild();
        Ok(())
    }

    /// Remove an effect from a layer's chain. The successor's input binding
    /// is re-derived by the rebuild, so this is a plain splice.
    pub fn remove_effect(&mut self, layer_index: usize, effect_index: usize) {
        if self.backend.is_none() {
            log::debug!("remove_effect skipped: no renderer attached");
            return;
        }
        let Some(layer) = self.layers.get_mut(layer_index) else {
            log::warn!("remove_effect: layer {layer_index} does not exist");
            return;
        };
        if effect_index >= layer.effects.len() {
            log::warn!("remove_effect: effect {effect_index} does not exist");
            return;
        }
        let effect = layer.effects.remove(effect_index);
        log::info!("removed effect '{}'", effect.name);
        self.rebuild();
    }

    /// Toggle whether an effect's passes participate in rendering. For
    /// chain wiring this is equivalent to remove/re-insert; the rebuild
    /// re-derives every input binding either way.
    pub fn set_effect_enabled(&mut self, layer_index: usize, effect_index: usize, enable: bool) {
        if self.backend.is_none() {
            log::debug!("set_effect_enabled skipped: no renderer attached");
            return;
        }
        let Some(effect) = self
            .layers
            .get_mut(layer_index)
            .and_then(|l| l.effects.get_mut(effect_index))
        else {
            log::warn!("set_effect_enabled: no effect at {layer_index}/{effect_index}");
            return;
        };
        effect.enable = enable;
        self.rebuild();
    }

    /// Store a property value and push it into its uniform slot.
    pub fn set_property(
        &mut self,
        layer_index: usize,
        effect_index: usize,
        prop: &str,
        value: PropertyValue,
    ) {
        let Some(backend) = self.backend.as_deref_mut() else {
            log::debug!("set_property skipped: no renderer attached");
            return;
        };
        let Some(effect) = self
            .layers
            .get_mut(layer_index)
            .and_then(|l| l.effects.get_mut(effect_index))
        else {
            log::warn!("set_property: no effect at {layer_index}/{effect_index}");
            return;
        };
        effect.set_property(backend, prop, value);
    }

    /// Swap the texture behind a mask property and flag the affected pass
    /// for bind-group regeneration.
    pub fn assign_mask(
        &mut self,
        layer_index: usize,
        effect_index: usize,
        prop: &str,
        material_name: &str,
    ) {
        let Some(backend) = self.backend.as_deref_mut() else {
            log::debug!("assign_mask skipped: no renderer attached");
            return;
        };
        let texture = if is_builtin_name(material_name) {
            self.materials.builtin(backend, material_name, MaterialKind::AlphaMask)
        } else {
            match self.materials.get(material_name) {
                Some(material) => material.texture,
                None => {
                    log::warn!("assign_mask: material '{material_name}' does not exist");
                    return;
                }
            }
        };
        let Some(effect) = self
            .layers
            .get_mut(layer_index)
            .and_then(|l| l.effects.get_mut(effect_index))
        else {
            log::warn!("assign_mask: no effect at {layer_index}/{effect_index}");
            return;
        };
        if let Some(pass) = effect.assign_mask(prop, material_name, texture) {
            backend.invalidate_pass(&pass);
        }
    }

    /// Register an externally-sourced material (mask drawings, depth maps)
    /// so effects can reference it by name.
    pub fn import_material(
        &mut self,
        name: &str,
        kind: MaterialKind,
        bytes: Vec<u8>,
    ) -> FxResult<()> {
        let Some(backend) = self.backend.as_deref_mut() else {
            log::debug!("import_material skipped: no renderer attached");
            return Ok(());
        };
        self.materials
            .insert_bytes(backend, name, kind, bytes)
            .map_err(FxError::Other)?;
        Ok(())
    }

    pub fn set_layer_transform(
        &mut self,
        layer_index: usize,
        origin: Vec2,
        scale: Vec2,
        rotation: f32,
    ) {
        let Some(backend) = self.backend.as_deref_mut() else {
            return;
        };
        let Some(layer) = self.layers.get_mut(layer_index) else {
            log::warn!("set_layer_transform: layer {layer_index} does not exist");
            return;
        };
        layer.set_transform(backend, origin, scale, rotation);
    }

    pub fn select_layer(&mut self, layer_index: usize) {
        if self.selected_layer != Some(layer_index) {
            self.selected_layer = Some(layer_index);
            self.selected_effect = None;
        }
    }

    pub fn select_effect(&mut self, effect_index: usize) {
        self.selected_effect = Some(effect_index);
    }

    pub fn pointer_moved(&mut self, x: f32, y: f32) {
        self.pointer.move_to(Vec2::new(x, y));
    }

    /// Per-frame tick from the backend's render loop. Pure uniform writes
    /// (time, pointer) for every enabled effect; never touches topology.
    pub fn advance_frame(&mut self, elapsed: f32) {
        let Some(backend) = self.backend.as_deref_mut() else {
            return;
        };
        for layer in &mut self.layers {
            for effect in layer.effects.iter_mut().filter(|e| e.enable) {
                effect.apply_frame_bindings(backend, elapsed, &self.pointer);
            }
        }
    }

    /// Derive the full pass list from current state and sync it to the
    /// backend: upsert everything current, remove everything stale. Safe to
    /// call after any mutation; it never patches incrementally.
    pub fn rebuild(&mut self) {
        let Some(backend) = self.backend.as_deref_mut() else {
            log::debug!("rebuild skipped: no renderer attached");
            return;
        };
        let passes = chain::build_frame_passes(&self.layers);
        let names: FxHashSet<String> = passes.iter().map(|p| p.name.clone()).collect();
        for stale in self.live_passes.difference(&names) {
            backend.remove_pass(stale);
        }
        for pass in &passes {
            debug_assert!(!pass.has_unresolved_input(), "unresolved chain input in '{}'", pass.name);
            backend.upsert_pass(pass);
        }
        self.live_passes = names;
    }

    /// Drop every layer (and with the next rebuild, every pass).
    pub fn clear_layers(&mut self) {
        self.layers.clear();
        self.selected_layer = None;
        self.selected_effect = None;
        self.rebuild();
    }
}

#[cfg(test)]
impl EditorSession {
    /// Add a layer from a synthesized PNG; pixel data is derived from the
    /// name so distinct layers get distinct content ids. Tests only.
    pub(crate) fn add_layer_fixture(&mut self, name: &str) -> usize {
        let seed = name.bytes().fold(7u8, |acc, b| acc.wrapping_mul(31).wrapping_add(b));
        let bytes =
            crate::testing::png_bytes(8, 8, [seed, seed.wrapping_add(64), seed.wrapping_add(128)]);
        self.add_image_layer(name, &bytes).unwrap().unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::Condition;
    use crate::render::pass::ResourceBinding;
    use crate::testing::{shader_fixture, test_session};

    fn approx_eq(a: f32, b: f32, eps: f32) -> bool {
        (a - b).abs() < eps
    }

    #[test]
    fn mutations_decline_without_backend() {
        let mut session = EditorSession::new(
            CanvasSettings::default(),
            shader_fixture(),
            MaterialStore::new(None),
        );
        assert_eq!(session.add_image_layer("photo", &[1, 2, 3]).unwrap(), None);
        session.add_effect(0, EffectKind::Tint).unwrap();
        session.remove_effect(0, 0);
        session.rebuild();
        assert!(session.layers.is_empty());
    }

    #[test]
    fn rebuild_syncs_pass_set_to_backend() {
        let (mut session, state) = test_session();
        let layer = session.add_layer_fixture("photo");
        session.add_effect(layer, EffectKind::Tint).unwrap();
        session.add_effect(layer, EffectKind::Scroll).unwrap();
        let scroll = session.layers[layer].effects[1].name.clone();
        assert_eq!(state.borrow().passes.len(), 3);
        // Each rebuild re-registers in chain order, base pass first
        let base = session.layers[layer].base_pass_name();
        assert_eq!(state.borrow().upserts.first(), Some(&base));

        session.remove_effect(layer, 1);
        assert_eq!(state.borrow().passes.len(), 2);
        assert!(state.borrow().removed.contains(&scroll));
    }

    #[test]
    fn removing_a_multi_pass_effect_removes_its_sub_passes() {
        let (mut session, state) = test_session();
        let layer = session.add_layer_fixture("photo");
        session.add_effect(layer, EffectKind::CursorRipple).unwrap();
        assert_eq!(state.borrow().passes.len(), 4);
        // Simulation ping-pong pair allocated at canvas size
        assert_eq!(state.borrow().target_textures.len(), 2);
        session.remove_effect(layer, 0);
        assert_eq!(state.borrow().passes.len(), 1);
    }

    #[test]
    fn set_property_lands_in_uniform_slot() {
        let (mut session, state) = test_session();
        let layer = session.add_layer_fixture("photo");
        session.add_effect(layer, EffectKind::Tint).unwrap();
        session.set_property(layer, 0, "blend_alpha", PropertyValue::Float(0.9));
        session.set_property(layer, 0, "tint_color", PropertyValue::Color([0.1, 0.2, 0.3]));

        let pass_name = session.layers[layer].effects[0].name.clone();
        let state = state.borrow();
        let pass = &state.passes[&pass_name];
        let handle = pass
            .resources
            .iter()
            .find_map(|r| match r {
                ResourceBinding::Uniforms(h) => Some(*h),
                _ => None,
            })
            .unwrap();
        let floats = state.uniform_floats(handle);
        // layout: canvas_res(2), blend_mode, use_mask, blend_alpha, tint_color(3)
        assert!(approx_eq(floats[4], 0.9, 1e-6));
        assert!(approx_eq(floats[5], 0.1, 1e-6));
        assert!(approx_eq(floats[6], 0.2, 1e-6));
        assert!(approx_eq(floats[7], 0.3, 1e-6));
    }

    #[test]
    fn checkbox_writes_one_or_zero() {
        let (mut session, _) = test_session();
        let layer = session.add_layer_fixture("photo");
        session.add_effect(layer, EffectKind::Tint).unwrap();
        let effect = &session.layers[layer].effects[0];
        assert!(!effect.property_visible("alpha_mask"));

        session.set_property(layer, 0, "use_mask", PropertyValue::Bool(true));
        let effect = &session.layers[layer].effects[0];
        assert!(effect.property_visible("alpha_mask"));
    }

    #[test]
    fn visibility_tracks_uniform_state_for_select_deps() {
        let (mut session, _) = test_session();
        let layer = session.add_layer_fixture("photo");
        session.add_effect(layer, EffectKind::Reflection).unwrap();
        let effect = &session.layers[layer].effects[0];
        // Planar by default: direction visible, corner points hidden
        assert!(effect.property_visible("direction"));
        assert!(!effect.property_visible("point0"));

        session.set_property(layer, 0, "perspective", PropertyValue::Float(1.0));
        let effect = &session.layers[layer].effects[0];
        assert!(!effect.property_visible("direction"));
        assert!(effect.property_visible("point0"));
    }

    #[test]
    fn assign_mask_substitutes_resource_and_invalidates() {
        let (mut session, state) = test_session();
        let layer = session.add_layer_fixture("photo");
        session.add_effect(layer, EffectKind::Tint).unwrap();
        let pass_name = session.layers[layer].effects[0].name.clone();
        let before = state.borrow().passes[&pass_name].resources[1].clone();

        let mask_png = crate::testing::png_bytes(4, 4, [255, 255, 255]);
        session
            .import_material("hand-drawn__mask", MaterialKind::AlphaMask, mask_png)
            .unwrap();
        session.assign_mask(layer, 0, "alpha_mask", "hand-drawn__mask");
        session.rebuild();

        let state = state.borrow();
        assert!(state.invalidated.contains(&pass_name));
        let after = state.passes[&pass_name].resources[1].clone();
        assert_ne!(before, after);
        let expected = session.materials.get("hand-drawn__mask").unwrap().texture;
        assert_eq!(after, ResourceBinding::Texture(expected));
    }

    #[test]
    fn advance_frame_feeds_time_and_pointer() {
        let (mut session, state) = test_session();
        let layer = session.add_layer_fixture("photo");
        session.add_effect(layer, EffectKind::DepthParallax).unwrap();
        session.pointer_moved(0.25, 0.75);
        session.advance_frame(3.0);

        let pass_name = session.layers[layer].effects[0].name.clone();
        let state = state.borrow();
        let handle = state.passes[&pass_name]
            .resources
            .iter()
            .find_map(|r| match r {
                ResourceBinding::Uniforms(h) => Some(*h),
                _ => None,
            })
            .unwrap();
        let floats = state.uniform_floats(handle);
        // layout: canvas_res(2), pointer(2), ...
        assert!(approx_eq(floats[2], 0.25, 1e-6));
        assert!(approx_eq(floats[3], 0.75, 1e-6));
    }

    #[test]
    fn disabled_effects_skip_frame_updates() {
        let (mut session, state) = test_session();
        let layer = session.add_layer_fixture("photo");
        session.add_effect(layer, EffectKind::WaterRipple).unwrap();
        let pass_name = session.layers[layer].effects[0].name.clone();
        let handle = {
            let state = state.borrow();
            state.passes[&pass_name]
                .resources
                .iter()
                .find_map(|r| match r {
                    ResourceBinding::Uniforms(h) => Some(*h),
                    _ => None,
                })
                .unwrap()
        };
        session.set_effect_enabled(layer, 0, false);
        session.advance_frame(7.0);
        let floats = state.borrow().uniform_floats(handle);
        assert!(approx_eq(floats[4], 0.0, 1e-6)); // time slot untouched
    }

    #[test]
    fn every_factory_builds_and_validates() {
        let (mut session, _) = test_session();
        let layer = session.add_layer_fixture("photo");
        for kind in EffectKind::ALL {
            session.add_effect(layer, *kind).unwrap();
        }
        assert_eq!(session.layers[layer].effects.len(), EffectKind::ALL.len());
        for effect in &session.layers[layer].effects {
            effect.validate().unwrap();
            // Masked properties gate on their checkbox's uniform, via a
            // declared dependency rather than an ad-hoc closure
            for def in effect.bank.defs() {
                if let Condition::Checked(dep) | Condition::Equals(dep, _) = &def.condition {
                    assert!(effect.bank.def(dep).is_some(), "dangling dependency {dep}");
                }
            }
        }
    }

    #[test]
    fn missing_shader_aborts_construction() {
        let (mut session, _) = test_session();
        let layer = session.add_layer_fixture("photo");
        session.shaders = ShaderCatalog::preloaded(); // drop all sources
        let err = session.add_effect(layer, EffectKind::Tint);
        assert!(err.is_err());
        assert!(session.layers[layer].effects.is_empty());
    }
}
