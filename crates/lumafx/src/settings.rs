use serde::{Deserialize, Serialize};

/// Output canvas dimensions; every layer's base pass and offscreen
/// intermediate targets are sized to this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanvasSettings {
    pub width: u32,
    pub height: u32,
}

impl Default for CanvasSettings {
    fn default() -> Self {
        Self { width: 1280, height: 720 }
    }
}

impl CanvasSettings {
    pub fn size(&self) -> [f32; 2] {
        [self.width as f32, self.height as f32]
    }
}
