//! Effect-graph execution core for a layered GPU photo-effects editor.
//!
//! Images load as [`layer::ImageLayer`]s; each layer stacks an ordered
//! chain of [`effect::Effect`]s (ripples, parallax, reflection, tint, …)
//! whose typed properties write into named uniform-buffer fields. The
//! [`chain`] module flattens every layer into the ordered render-pass list
//! an external GPU backend executes, re-deriving each effect's input
//! binding from chain order on every rebuild. [`project`] round-trips the
//! whole configured state through JSON and a zip container.
//!
//! The GPU itself stays behind [`render::RenderBackend`]: this crate owns
//! pass descriptions and uniform contents, never devices or bind groups.

pub mod chain;
pub mod effect;
pub mod error;
pub mod layer;
pub mod material;
pub mod params;
pub mod pointer;
pub mod project;
pub mod render;
pub mod session;
pub mod settings;
pub mod shader;

#[cfg(test)]
pub(crate) mod testing;

pub use effect::{Effect, EffectKind};
pub use error::{FxError, FxResult};
pub use layer::ImageLayer;
pub use material::{MaterialKind, MaterialStore};
pub use params::PropertyValue;
pub use render::RenderBackend;
pub use session::EditorSession;
pub use settings::CanvasSettings;
pub use shader::ShaderCatalog;
