use rustc_hash::FxHashMap;

use super::types::{PropertyDef, PropertyValue};

/// Per-effect property state: the descriptor list plus the live value of
/// every property, seeded from defaults at construction.
pub struct PropertyBank {
    defs: Vec<PropertyDef>,
    values: FxHashMap<String, PropertyValue>,
}

impl PropertyBank {
    pub fn new(defs: Vec<PropertyDef>) -> Self {
        let values = defs
            .iter()
            .map(|def| (def.name().to_string(), def.default_value()))
            .collect();
        Self { defs, values }
    }

    pub fn defs(&self) -> &[PropertyDef] {
        &self.defs
    }

    pub fn def(&self, name: &str) -> Option<&PropertyDef> {
        self.defs.iter().find(|d| d.name() == name)
    }

    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.values.get(name)
    }

    /// Store a value, reshaped to the control's expected variant.
    /// Unknown names are a logged no-op.
    pub fn set(&mut self, name: &str, value: PropertyValue) {
        let Some(def) = self.def(name) else {
            log::warn!("property '{name}' not found; value dropped");
            return;
        };
        let coerced = def.coerce(value);
        self.values.insert(name.to_string(), coerced);
    }

    pub fn reset(&mut self, name: &str) {
        if let Some(def) = self.defs.iter().find(|d| d.name() == name) {
            self.values.insert(name.to_string(), def.default_value());
        }
    }

    pub fn reset_all(&mut self) {
        for def in &self.defs {
            self.values.insert(def.name().to_string(), def.default_value());
        }
    }

    /// `(name, value)` pairs in descriptor order, for serialization.
    pub fn snapshot(&self) -> Vec<(String, PropertyValue)> {
        self.defs
            .iter()
            .filter_map(|def| {
                self.values
                    .get(def.name())
                    .map(|v| (def.name().to_string(), v.clone()))
            })
            .collect()
    }
}
