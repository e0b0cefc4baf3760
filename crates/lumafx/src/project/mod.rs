pub mod archive;

use std::collections::HashMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::effect::{Effect, EffectKind};
use crate::error::{FxError, FxResult};
use crate::layer::ImageLayer;
use crate::material::is_builtin_name;
use crate::params::PropertyValue;
use crate::session::EditorSession;
use crate::settings::CanvasSettings;

pub const PROJECT_VERSION: &str = "1.0.0";

/// Persistable snapshot of a whole editor session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectData {
    pub version: String,
    pub name: String,
    pub canvas: CanvasSettings,
    pub layers: Vec<LayerData>,
    #[serde(default)]
    pub materials: HashMap<String, MaterialData>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SizeData {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransformData {
    pub origin: [f32; 2],
    pub scale: [f32; 2],
    pub rotation: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerData {
    pub name: String,
    /// Material key on save, archive filename inside a packed project.
    pub asset: String,
    pub content_id: String,
    pub size: SizeData,
    pub transform: TransformData,
    pub effects: Vec<EffectData>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectData {
    pub name: String,
    #[serde(rename = "id")]
    pub kind: EffectKind,
    pub enable: bool,
    pub properties: HashMap<String, PropertyValue>,
    /// Mask property name → material name, for non-default assignments.
    #[serde(default)]
    pub masks: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaterialData {
    pub asset: String,
    pub width: u32,
    pub height: u32,
    #[serde(rename = "type")]
    pub kind: crate::material::MaterialKind,
}

/// Major-version compatibility, matching how project files have always been
/// gated: same major loads, anything else refuses.
pub fn version_compatible(version: &str) -> bool {
    let major = |v: &str| v.split('.').next().map(str::to_string);
    major(version).is_some() && major(version) == major(PROJECT_VERSION)
}

/// Capture the session's full persistable state.
pub fn snapshot(session: &EditorSession, project_name: &str) -> ProjectData {
    ProjectData {
        version: PROJECT_VERSION.to_string(),
        name: project_name.to_string(),
        canvas: session.canvas,
        layers: session.layers.iter().map(serialize_layer).collect(),
        materials: session
            .materials
            .persistable()
            .map(|m| {
                (
                    m.name.clone(),
                    MaterialData {
                        asset: m.name.clone(),
                        width: m.width,
                        height: m.height,
                        kind: m.kind,
                    },
                )
            })
            .collect(),
    }
}

/// Encoded bytes for every asset a snapshot references, keyed by material
/// name (the same keys `LayerData::asset` / `MaterialData::asset` hold
/// before archiving rewrites them to filenames).
pub fn snapshot_assets(session: &EditorSession) -> HashMap<String, Vec<u8>> {
    session
        .materials
        .persistable()
        .map(|m| (m.name.clone(), m.bytes().to_vec()))
        .collect()
}

fn serialize_layer(layer: &ImageLayer) -> LayerData {
    LayerData {
        name: layer.name.clone(),
        asset: layer.material.clone(),
        content_id: layer.content_id.clone(),
        size: SizeData { width: layer.width, height: layer.height },
        transform: TransformData {
            origin: layer.origin.to_array(),
            scale: layer.scale.to_array(),
            rotation: layer.rotation,
        },
        effects: layer.effects.iter().map(serialize_effect).collect(),
    }
}

fn serialize_effect(effect: &Effect) -> EffectData {
    let properties: HashMap<String, PropertyValue> = effect.bank.snapshot().into_iter().collect();
    let masks = effect
        .bank
        .defs()
        .iter()
        .filter(|def| def.control.is_mask())
        .filter_map(|def| match effect.bank.get(def.name()) {
            Some(PropertyValue::Material(material)) if !is_builtin_name(material) => {
                Some((def.name().to_string(), material.clone()))
            }
            _ => None,
        })
        .collect();
    EffectData {
        name: effect.name.clone(),
        kind: effect.kind,
        enable: effect.enable,
        properties,
        masks,
    }
}

/// Rebuild a session's layers and effects from a snapshot.
///
/// Effects are reconstructed through their factories and the saved values
/// replayed through the normal property path, so uniform slots and mask
/// bindings end up exactly as if the user had configured them by hand.
/// Missing assets degrade to a logged skip, never a partial layer.
pub fn hydrate(
    session: &mut EditorSession,
    data: &ProjectData,
    assets: &HashMap<String, Vec<u8>>,
) -> FxResult<()> {
    if !version_compatible(&data.version) {
        return Err(FxError::IncompatibleVersion(data.version.clone()));
    }
    session.canvas = data.canvas;
    session.clear_layers();

    for (name, material) in &data.materials {
        let Some(bytes) = assets.get(&material.asset) else {
            log::warn!("material '{name}' asset '{}' missing from archive", material.asset);
            continue;
        };
        session.import_material(name, material.kind, bytes.clone())?;
    }

    for layer_data in &data.layers {
        let Some(bytes) = assets.get(&layer_data.asset) else {
            log::warn!(
                "layer '{}' asset '{}' missing from archive",
                layer_data.name,
                layer_data.asset
            );
            continue;
        };
        let Some(layer_index) = session.add_image_layer(&layer_data.name, bytes)? else {
            return Ok(()); // no renderer attached; nothing to restore into
        };
        session.set_layer_transform(
            layer_index,
            Vec2::from_array(layer_data.transform.origin),
            Vec2::from_array(layer_data.transform.scale),
            layer_data.transform.rotation,
        );
        for effect_data in &layer_data.effects {
            session.add_effect_named(layer_index, effect_data.kind, Some(&effect_data.name))?;
            let effect_index = session.layers[layer_index].effects.len() - 1;
            session.set_effect_enabled(layer_index, effect_index, effect_data.enable);
            for (prop, value) in &effect_data.properties {
                // Mask-typed values restore through assign_mask below
                if matches!(value, PropertyValue::Material(_)) {
                    continue;
                }
                session.set_property(layer_index, effect_index, prop, value.clone());
            }
            for (prop, material) in &effect_data.masks {
                session.assign_mask(layer_index, effect_index, prop, material);
            }
        }
    }
    session.rebuild();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{png_bytes, test_session};
    use crate::material::MaterialKind;

    fn approx_eq(a: f32, b: f32, eps: f32) -> bool {
        (a - b).abs() < eps
    }

    #[test]
    fn version_gate_is_major_only() {
        assert!(version_compatible("1.0.0"));
        assert!(version_compatible("1.4.2"));
        assert!(!version_compatible("2.0.0"));
        assert!(!version_compatible(""));
    }

    #[test]
    fn snapshot_captures_effect_state() {
        let (mut session, _) = test_session();
        let layer = session.add_layer_fixture("photo");
        session.add_effect(layer, EffectKind::Tint).unwrap();
        session.set_property(layer, 0, "blend_alpha", PropertyValue::Float(0.8));
        session.set_effect_enabled(layer, 0, false);

        let data = snapshot(&session, "demo");
        assert_eq!(data.version, PROJECT_VERSION);
        assert_eq!(data.layers.len(), 1);
        let effect = &data.layers[0].effects[0];
        assert_eq!(effect.kind, EffectKind::Tint);
        assert!(!effect.enable);
        assert_eq!(effect.properties["blend_alpha"], PropertyValue::Float(0.8));
        assert!(effect.masks.is_empty());
    }

    #[test]
    fn default_masks_are_not_persisted() {
        let (mut session, _) = test_session();
        let layer = session.add_layer_fixture("photo");
        session.add_effect(layer, EffectKind::Tint).unwrap();
        session
            .import_material("painted__mask", MaterialKind::AlphaMask, png_bytes(4, 4, [200, 0, 0]))
            .unwrap();
        session.assign_mask(layer, 0, "alpha_mask", "painted__mask");

        let data = snapshot(&session, "demo");
        let effect = &data.layers[0].effects[0];
        assert_eq!(effect.masks["alpha_mask"], "painted__mask");
        assert!(data.materials.contains_key("painted__mask"));
        assert!(!data.materials.keys().any(|k| k.starts_with("default")));
    }

    #[test]
    fn round_trip_restores_refs_and_masks() {
        let (mut session, _) = test_session();
        let layer = session.add_layer_fixture("photo");
        session.add_effect(layer, EffectKind::Reflection).unwrap();
        session.set_property(layer, 0, "perspective", PropertyValue::Float(1.0));
        session.set_property(layer, 0, "point2", PropertyValue::Vec2([0.9, 0.8]));
        session.set_property(layer, 0, "use_mask", PropertyValue::Bool(true));
        session
            .import_material("edge__mask", MaterialKind::AlphaMask, png_bytes(4, 4, [0, 0, 0]))
            .unwrap();
        session.assign_mask(layer, 0, "alpha_mask", "edge__mask");
        session.set_layer_transform(layer, Vec2::new(0.1, 0.2), Vec2::new(1.5, 1.5), 0.3);

        let data = snapshot(&session, "demo");
        let assets = snapshot_assets(&session);
        let json = serde_json::to_string_pretty(&data).unwrap();
        let parsed: ProjectData = serde_json::from_str(&json).unwrap();

        let (mut restored, _) = test_session();
        hydrate(&mut restored, &parsed, &assets).unwrap();

        assert_eq!(restored.layers.len(), 1);
        let original = &session.layers[layer].effects[0];
        let rebuilt = &restored.layers[0].effects[0];
        assert_eq!(rebuilt.name, original.name);
        for (name, value) in original.bank.snapshot() {
            assert_eq!(rebuilt.bank.get(&name), Some(&value), "property {name} drifted");
        }
        assert_eq!(
            rebuilt.bank.get("alpha_mask"),
            Some(&PropertyValue::Material("edge__mask".into()))
        );
        let restored_layer = &restored.layers[0];
        assert!(approx_eq(restored_layer.origin.x, 0.1, 1e-6));
        assert!(approx_eq(restored_layer.rotation, 0.3, 1e-6));
        // Hydration replays writes through apply, so dependent visibility
        // matches the original session too
        assert!(rebuilt.property_visible("point0"));
        assert!(!rebuilt.property_visible("direction"));
    }

    #[test]
    fn hydrate_rejects_other_majors() {
        let (mut session, _) = test_session();
        let data = ProjectData {
            version: "2.0.0".into(),
            name: "demo".into(),
            canvas: CanvasSettings::default(),
            layers: Vec::new(),
            materials: HashMap::new(),
        };
        let err = hydrate(&mut session, &data, &HashMap::new()).unwrap_err();
        assert!(matches!(err, FxError::IncompatibleVersion(_)));
    }

    #[test]
    fn hydrate_skips_layers_with_missing_assets() {
        let (mut session, _) = test_session();
        let data = ProjectData {
            version: PROJECT_VERSION.into(),
            name: "demo".into(),
            canvas: CanvasSettings::default(),
            layers: vec![LayerData {
                name: "ghost".into(),
                asset: "nowhere.dat".into(),
                content_id: "0".into(),
                size: SizeData { width: 1, height: 1 },
                transform: TransformData { origin: [0.0, 0.0], scale: [1.0, 1.0], rotation: 0.0 },
                effects: Vec::new(),
            }],
            materials: HashMap::new(),
        };
        hydrate(&mut session, &data, &HashMap::new()).unwrap();
        assert!(session.layers.is_empty());
    }
}
