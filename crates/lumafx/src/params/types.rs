use serde::{Deserialize, Serialize};

/// Current value of one effect property.
///
/// Serialized untagged so project files read as plain JSON values
/// (`0.5`, `[1.0, 0.0, 0.0]`, `true`, `"mask-name"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Bool(bool),
    Float(f32),
    Vec2([f32; 2]),
    Color([f32; 3]),
    Floats(Vec<f32>),
    /// Material name for mask-kind properties.
    Material(String),
}

impl PropertyValue {
    /// Component run written into a uniform slot, or `None` for materials.
    pub fn components(&self) -> Option<Vec<f32>> {
        match self {
            PropertyValue::Bool(b) => Some(vec![if *b { 1.0 } else { 0.0 }]),
            PropertyValue::Float(v) => Some(vec![*v]),
            PropertyValue::Vec2(v) => Some(v.to_vec()),
            PropertyValue::Color(c) => Some(c.to_vec()),
            PropertyValue::Floats(v) => Some(v.clone()),
            PropertyValue::Material(_) => None,
        }
    }
}

/// One choice of a `Select` control; `value` is what lands in the uniform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub value: u32,
    pub label: String,
}

impl SelectOption {
    pub fn new(value: u32, label: &str) -> Self {
        Self { value, label: label.to_string() }
    }
}

/// Where a numeric property lives: a named field of a named uniform buffer.
/// `buffer: None` selects the effect's sole (first) buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniformSlot {
    pub buffer: Option<String>,
    pub field: String,
}

impl UniformSlot {
    pub fn field(field: &str) -> Self {
        Self { buffer: None, field: field.to_string() }
    }

    pub fn named(buffer: &str, field: &str) -> Self {
        Self { buffer: Some(buffer.to_string()), field: field.to_string() }
    }
}

/// Where a mask property lives: a binding index in a named pass's resource
/// list. Assigning the mask substitutes that resource, never a uniform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureSlot {
    pub pass: String,
    pub binding: usize,
}

impl TextureSlot {
    pub fn new(pass: &str, binding: usize) -> Self {
        Self { pass: pass.to_string(), binding }
    }
}

/// Discriminated property kind: numeric controls carry a [`UniformSlot`],
/// mask controls carry a [`TextureSlot`].
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyControl {
    Float { default: f32, range: [f32; 2], slot: UniformSlot },
    Vec2 { default: [f32; 2], range: [f32; 2], slot: UniformSlot },
    Color { default: [f32; 3], slot: UniformSlot },
    Checkbox { default: bool, slot: UniformSlot },
    Select { default: u32, options: Vec<SelectOption>, slot: UniformSlot },
    Array { default: Vec<f32>, slot: UniformSlot },
    AlphaMask { default: String, slot: TextureSlot },
    FlowMask { default: String, slot: TextureSlot },
}

impl PropertyControl {
    pub fn default_value(&self) -> PropertyValue {
        match self {
            PropertyControl::Float { default, .. } => PropertyValue::Float(*default),
            PropertyControl::Vec2 { default, .. } => PropertyValue::Vec2(*default),
            PropertyControl::Color { default, .. } => PropertyValue::Color(*default),
            PropertyControl::Checkbox { default, .. } => PropertyValue::Bool(*default),
            PropertyControl::Select { default, .. } => PropertyValue::Float(*default as f32),
            PropertyControl::Array { default, .. } => PropertyValue::Floats(default.clone()),
            PropertyControl::AlphaMask { default, .. }
            | PropertyControl::FlowMask { default, .. } => {
                PropertyValue::Material(default.clone())
            }
        }
    }

    /// f32 slots this control occupies in its uniform buffer; `None` for
    /// mask kinds, which do not map to a uniform.
    pub fn float_count(&self) -> Option<usize> {
        match self {
            PropertyControl::Float { .. }
            | PropertyControl::Checkbox { .. }
            | PropertyControl::Select { .. } => Some(1),
            PropertyControl::Vec2 { .. } => Some(2),
            PropertyControl::Color { .. } => Some(3),
            PropertyControl::Array { default, .. } => Some(default.len()),
            PropertyControl::AlphaMask { .. } | PropertyControl::FlowMask { .. } => None,
        }
    }

    pub fn uniform_slot(&self) -> Option<&UniformSlot> {
        match self {
            PropertyControl::Float { slot, .. }
            | PropertyControl::Vec2 { slot, .. }
            | PropertyControl::Color { slot, .. }
            | PropertyControl::Checkbox { slot, .. }
            | PropertyControl::Select { slot, .. }
            | PropertyControl::Array { slot, .. } => Some(slot),
            _ => None,
        }
    }

    pub fn texture_slot(&self) -> Option<&TextureSlot> {
        match self {
            PropertyControl::AlphaMask { slot, .. } | PropertyControl::FlowMask { slot, .. } => {
                Some(slot)
            }
            _ => None,
        }
    }

    pub fn is_mask(&self) -> bool {
        self.texture_slot().is_some()
    }
}

/// Visibility condition: a declarative dependency on a sibling property
/// plus a pure predicate over its value. Evaluated against post-apply
/// uniform state on demand, never cached.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Always,
    /// Visible while the named checkbox-like property is truthy.
    Checked(String),
    /// Visible while the named property's scalar equals the given value.
    Equals(String, f32),
}

impl Condition {
    pub fn dependency(&self) -> Option<&str> {
        match self {
            Condition::Always => None,
            Condition::Checked(dep) | Condition::Equals(dep, _) => Some(dep),
        }
    }

    /// Apply the predicate to the dependency's current scalar.
    pub fn holds_for(&self, scalar: f32) -> bool {
        match self {
            Condition::Always => true,
            Condition::Checked(_) => scalar != 0.0,
            Condition::Equals(_, expected) => scalar == *expected,
        }
    }
}

/// One tunable parameter of an effect.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDef {
    pub name: String,
    pub label: String,
    pub control: PropertyControl,
    pub condition: Condition,
}

impl PropertyDef {
    pub fn new(name: &str, label: &str, control: PropertyControl) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            control,
            condition: Condition::Always,
        }
    }

    pub fn when(mut self, condition: Condition) -> Self {
        self.condition = condition;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn default_value(&self) -> PropertyValue {
        self.control.default_value()
    }

    /// Reshape a deserialized value to this control's expected variant.
    /// JSON round-trips can blur `Vec2`/`Color` into generic float lists;
    /// numbers arriving for a checkbox collapse to truthiness.
    pub fn coerce(&self, value: PropertyValue) -> PropertyValue {
        match (&self.control, value) {
            (PropertyControl::Vec2 { .. }, PropertyValue::Floats(v)) if v.len() == 2 => {
                PropertyValue::Vec2([v[0], v[1]])
            }
            (PropertyControl::Color { .. }, PropertyValue::Floats(v)) if v.len() == 3 => {
                PropertyValue::Color([v[0], v[1], v[2]])
            }
            (PropertyControl::Array { .. }, PropertyValue::Vec2(v)) => {
                PropertyValue::Floats(v.to_vec())
            }
            (PropertyControl::Array { .. }, PropertyValue::Color(v)) => {
                PropertyValue::Floats(v.to_vec())
            }
            (PropertyControl::Checkbox { .. }, PropertyValue::Float(v)) => {
                PropertyValue::Bool(v != 0.0)
            }
            (_, value) => value,
        }
    }
}
