use std::io::Cursor;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use anyhow::{Context, Result};
use rustc_hash::FxHashMap;

use crate::render::backend::{RenderBackend, TextureHandle};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaterialKind {
    Image,
    AlphaMask,
    FlowMask,
}

/// A named image uploaded to the GPU: layer sources, masks, normal maps.
pub struct Material {
    pub name: String,
    pub texture: TextureHandle,
    pub width: u32,
    pub height: u32,
    pub kind: MaterialKind,
    /// Encoded source bytes, kept so project archives can repack them.
    bytes: Vec<u8>,
}

impl Material {
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// Session-scoped material registry.
///
/// Built-in materials (`defaultMask-RRGGBB`, `defaultNormalMap`, the
/// flow-neutral `defaultMask-7F7F00`) are synthesized as tiny solid-color
/// textures the first time an effect asks for one; they are never archived.
pub struct MaterialStore {
    root: Option<PathBuf>,
    items: FxHashMap<String, Material>,
}

impl MaterialStore {
    pub fn new(root: Option<PathBuf>) -> Self {
        Self { root, items: FxHashMap::default() }
    }

    pub fn get(&self, name: &str) -> Option<&Material> {
        self.items.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.items.contains_key(name)
    }

    /// Materials worth persisting, i.e. everything except built-ins.
    pub fn persistable(&self) -> impl Iterator<Item = &Material> {
        self.items.values().filter(|m| !is_builtin_name(&m.name))
    }

    /// Decode and upload encoded image bytes under the given name.
    pub fn insert_bytes(
        &mut self,
        backend: &mut dyn RenderBackend,
        name: &str,
        kind: MaterialKind,
        bytes: Vec<u8>,
    ) -> Result<&Material> {
        let decoded = image::load_from_memory(&bytes)
            .with_context(|| format!("failed to decode material '{name}'"))?;
        let rgba = decoded.to_rgba8();
        let (width, height) = rgba.dimensions();
        let texture = backend.upload_texture(width, height, rgba.as_raw());
        self.items.insert(
            name.to_string(),
            Material { name: name.to_string(), texture, width, height, kind, bytes },
        );
        Ok(&self.items[name])
    }

    /// Resolve a built-in solid-color material, creating it on first use.
    pub fn builtin(
        &mut self,
        backend: &mut dyn RenderBackend,
        name: &str,
        kind: MaterialKind,
    ) -> TextureHandle {
        if let Some(material) = self.items.get(name) {
            return material.texture;
        }
        let [r, g, b] = builtin_color(name);
        let pixels: Vec<u8> = [r, g, b, 255].repeat(16);
        let texture = backend.upload_texture(4, 4, &pixels);
        let bytes = encode_solid_png(r, g, b).unwrap_or_else(|e| {
            log::warn!("failed to encode builtin material '{name}': {e}");
            Vec::new()
        });
        self.items.insert(
            name.to_string(),
            Material { name: name.to_string(), texture, width: 4, height: 4, kind, bytes },
        );
        self.items[name].texture
    }

    /// Load a packaged effect texture (normal maps, noise, phase tables)
    /// from the assets root. Without a root, or when the file is missing,
    /// degrades to a solid fallback color — wrong-looking output beats a
    /// dead render loop.
    pub fn texture_asset(
        &mut self,
        backend: &mut dyn RenderBackend,
        rel: &str,
        fallback: [u8; 3],
    ) -> TextureHandle {
        if let Some(material) = self.items.get(rel) {
            return material.texture;
        }
        if let Some(root) = self.root.clone() {
            let path = root.join(rel);
            match std::fs::read(&path) {
                Ok(bytes) => {
                    match self.insert_bytes(backend, rel, MaterialKind::Image, bytes) {
                        Ok(material) => return material.texture,
                        Err(e) => log::warn!("{e:#}"),
                    }
                }
                Err(e) => {
                    log::warn!("failed to read texture asset '{}': {e}", path.display());
                }
            }
        } else {
            log::debug!("no asset root; using fallback color for '{rel}'");
        }
        let [r, g, b] = fallback;
        let pixels: Vec<u8> = [r, g, b, 255].repeat(16);
        let texture = backend.upload_texture(4, 4, &pixels);
        self.items.insert(
            rel.to_string(),
            Material {
                name: rel.to_string(),
                texture,
                width: 4,
                height: 4,
                kind: MaterialKind::Image,
                bytes: Vec::new(),
            },
        );
        texture
    }
}

pub fn is_builtin_name(name: &str) -> bool {
    name.starts_with("default")
}

/// Solid fill for a built-in material name. `defaultMask-RRGGBB` carries
/// its color in the suffix; normal-map defaults fill with the flat normal.
fn builtin_color(name: &str) -> [u8; 3] {
    if let Some(hex) = name.rsplit('-').next().filter(|h| h.len() == 6) {
        if let Ok(value) = u32::from_str_radix(hex, 16) {
            return [(value >> 16) as u8, (value >> 8) as u8, value as u8];
        }
    }
    if name.contains("Normal") {
        return [127, 127, 255];
    }
    [0, 0, 0]
}

fn encode_solid_png(r: u8, g: u8, b: u8) -> Result<Vec<u8>> {
    let img = image::RgbaImage::from_pixel(4, 4, image::Rgba([r, g, b, 255]));
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)?;
    Ok(bytes)
}
