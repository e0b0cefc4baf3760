pub mod kind;

mod cloud_motion;
mod cursor_ripple;
mod depth_parallax;
mod iris_movement;
mod reflection;
mod refraction;
mod scroll;
mod shake;
mod tint;
mod water_flow;
mod water_ripple;
mod water_waves;

use std::sync::Arc;

use anyhow::{Result, bail};

use crate::error::{FxError, FxResult};
use crate::material::MaterialStore;
use crate::params::{Condition, PropertyBank, PropertyDef, PropertyValue, TextureSlot, UniformSlot};
use crate::pointer::PointerState;
use crate::render::backend::{RenderBackend, TextureHandle};
use crate::render::pass::{PassTarget, ResourceBinding};
use crate::render::sampler::SamplerCache;
use crate::render::uniforms::UniformBuffer;
use crate::settings::CanvasSettings;
use crate::shader::ShaderCatalog;

pub use kind::EffectKind;

/// Everything a factory needs to assemble an effect; owned by the session
/// and lent per construction (no module-level singletons).
pub struct EffectContext<'a> {
    pub backend: &'a mut dyn RenderBackend,
    pub shaders: &'a mut ShaderCatalog,
    pub samplers: &'a mut SamplerCache,
    pub materials: &'a mut MaterialStore,
    pub canvas: CanvasSettings,
}

/// One render pass of an effect, before chain resolution.
///
/// `ChainInput` entries in `resources` mark where the predecessor's output
/// goes; the orchestrator resolves them at rebuild time. Intermediate
/// passes carry an offscreen `output`; the terminal pass (named exactly
/// like the effect) carries none.
pub struct EffectPass {
    pub name: String,
    pub shader: Arc<str>,
    pub resources: Vec<ResourceBinding>,
    pub output: Option<PassTarget>,
    pub condition: Condition,
}

impl EffectPass {
    pub fn new(name: &str, shader: Arc<str>, resources: Vec<ResourceBinding>) -> Self {
        Self {
            name: name.to_string(),
            shader,
            resources,
            output: None,
            condition: Condition::Always,
        }
    }

    pub fn with_output(mut self, output: PassTarget) -> Self {
        self.output = Some(output);
        self
    }
}

/// What feeds a uniform field once per animation frame. The declarative
/// replacement for per-frame closures: pure buffer writes, never topology.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameSource {
    /// Elapsed time in seconds.
    Time,
    Pointer,
    PointerLast,
    PointerSpeed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FrameBinding {
    pub slot: UniformSlot,
    pub source: FrameSource,
}

impl FrameBinding {
    pub fn new(slot: UniformSlot, source: FrameSource) -> Self {
        Self { slot, source }
    }
}

/// A named, parameterized visual transform backed by one or more passes.
///
/// Constructed only through [`build_effect`]; properties and uniform slots
/// are initialized from defaults at construction and mutated through
/// `set`/`apply_property` for the rest of the effect's life.
pub struct Effect {
    pub name: String,
    pub kind: EffectKind,
    pub label: String,
    pub enable: bool,
    pub bank: PropertyBank,
    buffers: Vec<(String, UniformBuffer)>,
    passes: Vec<EffectPass>,
    frame_bindings: Vec<FrameBinding>,
}

impl Effect {
    pub(crate) fn new(
        backend: &mut dyn RenderBackend,
        name: &str,
        kind: EffectKind,
        defs: Vec<PropertyDef>,
        buffers: Vec<(String, UniformBuffer)>,
        passes: Vec<EffectPass>,
        frame_bindings: Vec<FrameBinding>,
    ) -> Self {
        let mut effect = Self {
            name: name.to_string(),
            kind,
            label: kind.display_name().to_string(),
            enable: true,
            bank: PropertyBank::new(defs),
            buffers,
            passes,
            frame_bindings,
        };
        // Seed every numeric property's uniform slot from its default and
        // commit, so the first frame renders the advertised defaults.
        let names: Vec<String> =
            effect.bank.defs().iter().map(|d| d.name().to_string()).collect();
        for prop in &names {
            if effect.bank.def(prop).is_some_and(|d| !d.control.is_mask()) {
                effect.write_property_uniform(prop);
            }
        }
        effect.commit_buffers(backend);
        effect
    }

    pub fn is_multi_pass(&self) -> bool {
        self.passes.len() > 1
    }

    pub fn passes(&self) -> &[EffectPass] {
        &self.passes
    }

    pub fn frame_bindings(&self) -> &[FrameBinding] {
        &self.frame_bindings
    }

    fn buffer(&self, slot: &UniformSlot) -> Option<&UniformBuffer> {
        match &slot.buffer {
            None => self.buffers.first().map(|(_, b)| b),
            Some(name) => self.buffers.iter().find(|(n, _)| n == name).map(|(_, b)| b),
        }
    }

    /// Write a property's current value into its bound uniform slot without
    /// committing. Mask properties and unknown names are logged no-ops.
    fn write_property_uniform(&mut self, prop: &str) {
        let Some(def) = self.bank.def(prop) else {
            log::warn!("property '{prop}' not found on effect '{}'", self.name);
            return;
        };
        let Some(slot) = def.control.uniform_slot() else {
            log::warn!("property '{prop}' selects a texture; use assign_mask");
            return;
        };
        let Some(components) = self.bank.get(prop).and_then(PropertyValue::components) else {
            return;
        };
        let buffer = match &slot.buffer {
            None => self.buffers.first_mut().map(|(_, b)| b),
            Some(name) => {
                self.buffers.iter_mut().find(|(n, _)| n == name).map(|(_, b)| b)
            }
        };
        let Some(buffer) = buffer else {
            log::warn!(
                "uniform buffer '{}' not found on effect '{}'",
                slot.buffer.as_deref().unwrap_or("<primary>"),
                self.name
            );
            return;
        };
        buffer.set_field(&slot.field, &components);
    }

    /// Push a property's current value to the GPU: write the slot, then
    /// commit its buffer so the change is visible before the next frame.
    pub fn apply_property(&mut self, backend: &mut dyn RenderBackend, prop: &str) {
        self.write_property_uniform(prop);
        self.commit_buffers(backend);
    }

    /// Store and apply in one step.
    pub fn set_property(
        &mut self,
        backend: &mut dyn RenderBackend,
        prop: &str,
        value: PropertyValue,
    ) {
        self.bank.set(prop, value);
        self.apply_property(backend, prop);
    }

    fn commit_buffers(&mut self, backend: &mut dyn RenderBackend) {
        for (_, buffer) in &mut self.buffers {
            buffer.apply(backend);
        }
    }

    /// Passes participating in rendering right now, in declaration order.
    /// Pass conditions are re-evaluated on every call.
    pub fn active_passes(&self) -> Vec<&EffectPass> {
        self.passes.iter().filter(|p| self.condition_met(&p.condition)).collect()
    }

    /// Whether the property is currently editable/visible. Conditions read
    /// the dependency's post-apply uniform state, not its refs value.
    pub fn property_visible(&self, prop: &str) -> bool {
        match self.bank.def(prop) {
            Some(def) => self.condition_met(&def.condition),
            None => false,
        }
    }

    fn condition_met(&self, condition: &Condition) -> bool {
        let Some(dep) = condition.dependency() else {
            return true;
        };
        let Some(def) = self.bank.def(dep) else {
            log::warn!("condition depends on unknown property '{dep}'");
            return true;
        };
        if let Some(slot) = def.control.uniform_slot() {
            if let Some(components) = self.buffer(slot).and_then(|b| b.read_field(&slot.field)) {
                return condition.holds_for(components[0]);
            }
            log::warn!("condition dependency '{dep}' has no readable uniform slot");
            return true;
        }
        // Mask-kind dependency: no uniform slot to observe, use the refs value.
        let scalar = self
            .bank
            .get(dep)
            .and_then(PropertyValue::components)
            .map_or(0.0, |c| c[0]);
        condition.holds_for(scalar)
    }

    /// Substitute the texture behind a mask property. Returns the affected
    /// pass name so the caller can ask the backend to rebuild its bind
    /// group. A structural resource mutation, never a uniform write.
    pub fn assign_mask(
        &mut self,
        prop: &str,
        material: &str,
        texture: TextureHandle,
    ) -> Option<String> {
        let slot: TextureSlot = match self.bank.def(prop).and_then(|d| d.control.texture_slot()) {
            Some(slot) => slot.clone(),
            None => {
                log::warn!("property '{prop}' is not a mask on effect '{}'", self.name);
                return None;
            }
        };
        let Some(pass) = self.passes.iter_mut().find(|p| p.name == slot.pass) else {
            log::warn!("mask pass '{}' not found on effect '{}'", slot.pass, self.name);
            return None;
        };
        let Some(entry) = pass.resources.get_mut(slot.binding) else {
            log::warn!(
                "mask binding {} out of range for pass '{}'",
                slot.binding,
                slot.pass
            );
            return None;
        };
        *entry = ResourceBinding::Texture(texture);
        self.bank.set(prop, PropertyValue::Material(material.to_string()));
        Some(slot.pass)
    }

    /// Per-frame uniform feed: time advance and pointer state. Pure buffer
    /// writes followed by a commit; pass topology is never touched here.
    pub fn apply_frame_bindings(
        &mut self,
        backend: &mut dyn RenderBackend,
        elapsed: f32,
        pointer: &PointerState,
    ) {
        if self.frame_bindings.is_empty() {
            return;
        }
        let Self { frame_bindings, buffers, .. } = self;
        for binding in frame_bindings.iter() {
            let components: Vec<f32> = match binding.source {
                FrameSource::Time => vec![elapsed],
                FrameSource::Pointer => pointer.position.to_array().to_vec(),
                FrameSource::PointerLast => pointer.last.to_array().to_vec(),
                FrameSource::PointerSpeed => vec![pointer.speed()],
            };
            let buffer = match &binding.slot.buffer {
                None => buffers.first_mut().map(|(_, b)| b),
                Some(name) => buffers.iter_mut().find(|(n, _)| n == name).map(|(_, b)| b),
            };
            if let Some(buffer) = buffer {
                buffer.set_field(&binding.slot.field, &components);
            }
        }
        self.commit_buffers(backend);
    }

    /// Factory-consistency check: every numeric slot must address an
    /// existing field of matching arity, every mask slot an existing pass
    /// binding. Offsets come from layouts, so the classic silently-wrong
    /// hand-laid-out-offset failure reduces to a name mismatch caught here.
    pub fn validate(&self) -> Result<()> {
        for def in self.bank.defs() {
            let name = def.name();
            if let Some(slot) = def.control.uniform_slot() {
                let Some(buffer) = self.buffer(slot) else {
                    bail!("property '{name}': uniform buffer {:?} missing", slot.buffer);
                };
                let Some(field) = buffer.layout().field(&slot.field) else {
                    bail!("property '{name}': field '{}' missing from layout", slot.field);
                };
                let arity = def.control.float_count().unwrap_or(0);
                if field.ty.arity() != arity {
                    bail!(
                        "property '{name}': field '{}' holds {} floats, control writes {arity}",
                        slot.field,
                        field.ty.arity(),
                    );
                }
            }
            if let Some(slot) = def.control.texture_slot() {
                let Some(pass) = self.passes.iter().find(|p| p.name == slot.pass) else {
                    bail!("property '{name}': mask pass '{}' missing", slot.pass);
                };
                if slot.binding >= pass.resources.len() {
                    bail!(
                        "property '{name}': mask binding {} out of range for pass '{}'",
                        slot.binding,
                        slot.pass,
                    );
                }
            }
        }
        Ok(())
    }
}

/// Construct an effect of the given kind. The only way effects come to
/// exist; construction fully completes (shaders loaded, buffers allocated,
/// defaults committed) before the effect can reach any chain.
pub fn build_effect(ctx: &mut EffectContext, kind: EffectKind, name: &str) -> FxResult<Effect> {
    let effect = match kind {
        EffectKind::WaterRipple => water_ripple::build(ctx, name),
        EffectKind::CursorRipple => cursor_ripple::build(ctx, name),
        EffectKind::Reflection => reflection::build(ctx, name),
        EffectKind::Refraction => refraction::build(ctx, name),
        EffectKind::CloudMotion => cloud_motion::build(ctx, name),
        EffectKind::DepthParallax => depth_parallax::build(ctx, name),
        EffectKind::IrisMovement => iris_movement::build(ctx, name),
        EffectKind::Shake => shake::build(ctx, name),
        EffectKind::Tint => tint::build(ctx, name),
        EffectKind::Scroll => scroll::build(ctx, name),
        EffectKind::WaterWaves => water_waves::build(ctx, name),
        EffectKind::WaterFlow => water_flow::build(ctx, name),
    }
    .map_err(FxError::Other)?;
    effect.validate().map_err(FxError::Other)?;
    Ok(effect)
}

/// The ten shared foreground blend modes (tint, reflection).
pub(crate) fn blend_mode_options() -> Vec<crate::params::SelectOption> {
    use crate::params::SelectOption;
    vec![
        SelectOption::new(0, "Normal"),
        SelectOption::new(1, "Multiply"),
        SelectOption::new(2, "Screen"),
        SelectOption::new(3, "Overlay"),
        SelectOption::new(4, "Darken"),
        SelectOption::new(5, "Lighten"),
        SelectOption::new(6, "Color Dodge"),
        SelectOption::new(7, "Color Burn"),
        SelectOption::new(8, "Hard Light"),
        SelectOption::new(9, "Add"),
    ]
}
