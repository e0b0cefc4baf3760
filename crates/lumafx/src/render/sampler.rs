use rustc_hash::FxHashMap;

use super::backend::{RenderBackend, SamplerHandle};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SamplerKind {
    Linear,
    Nearest,
}

/// Session-scoped sampler cache: one GPU sampler per kind, created lazily.
#[derive(Default)]
pub struct SamplerCache {
    handles: FxHashMap<SamplerKind, SamplerHandle>,
}

impl SamplerCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&mut self, backend: &mut dyn RenderBackend, kind: SamplerKind) -> SamplerHandle {
        if let Some(handle) = self.handles.get(&kind) {
            return *handle;
        }
        let handle = backend.create_sampler(kind);
        self.handles.insert(kind, handle);
        handle
    }
}
