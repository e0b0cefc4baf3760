use serde::{Deserialize, Serialize};

/// Every effect kind this editor can stack on a layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EffectKind {
    WaterRipple,
    CursorRipple,
    Reflection,
    Refraction,
    CloudMotion,
    DepthParallax,
    IrisMovement,
    Shake,
    Tint,
    Scroll,
    WaterWaves,
    WaterFlow,
}

impl EffectKind {
    pub const ALL: &[EffectKind] = &[
        EffectKind::WaterRipple,
        EffectKind::CursorRipple,
        EffectKind::Reflection,
        EffectKind::Refraction,
        EffectKind::CloudMotion,
        EffectKind::DepthParallax,
        EffectKind::IrisMovement,
        EffectKind::Shake,
        EffectKind::Tint,
        EffectKind::Scroll,
        EffectKind::WaterWaves,
        EffectKind::WaterFlow,
    ];

    /// Stable id used in pass names, shader paths and project files.
    pub fn id(self) -> &'static str {
        match self {
            EffectKind::WaterRipple => "water-ripple",
            EffectKind::CursorRipple => "cursor-ripple",
            EffectKind::Reflection => "reflection",
            EffectKind::Refraction => "refraction",
            EffectKind::CloudMotion => "cloud-motion",
            EffectKind::DepthParallax => "depth-parallax",
            EffectKind::IrisMovement => "iris-movement",
            EffectKind::Shake => "shake",
            EffectKind::Tint => "tint",
            EffectKind::Scroll => "scroll",
            EffectKind::WaterWaves => "water-waves",
            EffectKind::WaterFlow => "water-flow",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            EffectKind::WaterRipple => "Water Ripple",
            EffectKind::CursorRipple => "Cursor Ripple",
            EffectKind::Reflection => "Reflection",
            EffectKind::Refraction => "Refraction",
            EffectKind::CloudMotion => "Cloud Motion",
            EffectKind::DepthParallax => "Depth Parallax",
            EffectKind::IrisMovement => "Iris Movement",
            EffectKind::Shake => "Shake",
            EffectKind::Tint => "Tint",
            EffectKind::Scroll => "Scroll",
            EffectKind::WaterWaves => "Water Waves",
            EffectKind::WaterFlow => "Water Flow",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.id() == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_round_trip() {
        for kind in EffectKind::ALL {
            assert_eq!(EffectKind::from_id(kind.id()), Some(*kind));
        }
    }

    #[test]
    fn serde_uses_kebab_ids() {
        let json = serde_json::to_string(&EffectKind::CursorRipple).unwrap();
        assert_eq!(json, "\"cursor-ripple\"");
        let back: EffectKind = serde_json::from_str("\"depth-parallax\"").unwrap();
        assert_eq!(back, EffectKind::DepthParallax);
    }
}
