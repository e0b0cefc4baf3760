pub mod store;
pub mod types;

pub use store::PropertyBank;
pub use types::{
    Condition, PropertyControl, PropertyDef, PropertyValue, SelectOption, TextureSlot, UniformSlot,
};
