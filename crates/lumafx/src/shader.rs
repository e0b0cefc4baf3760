use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use rustc_hash::FxHashMap;

/// Loads and caches effect shader sources.
///
/// Shader names are assets-relative without extension, e.g.
/// `water-ripple/water-ripple` resolves to
/// `<assets>/effects/water-ripple/water-ripple.wgsl`. Sources are opaque to
/// this crate; a missing file is an irrecoverable setup failure for the
/// effect being built, surfaced to the factory caller.
pub struct ShaderCatalog {
    root: Option<PathBuf>,
    sources: FxHashMap<String, Arc<str>>,
}

impl ShaderCatalog {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: Some(root.into()), sources: FxHashMap::default() }
    }

    /// A catalog with no filesystem root; every source must be inserted
    /// up front. Used by tests and embedded deployments.
    pub fn preloaded() -> Self {
        Self { root: None, sources: FxHashMap::default() }
    }

    pub fn insert(&mut self, name: &str, source: &str) {
        self.sources.insert(name.to_string(), Arc::from(source));
    }

    pub fn load(&mut self, name: &str) -> Result<Arc<str>> {
        if let Some(source) = self.sources.get(name) {
            return Ok(source.clone());
        }
        let Some(root) = &self.root else {
            bail!("shader '{name}' is not preloaded and no shader root is configured");
        };
        let path = root.join("effects").join(format!("{name}.wgsl"));
        let source = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to load shader '{}'", path.display()))?;
        let source: Arc<str> = Arc::from(source.as_str());
        self.sources.insert(name.to_string(), source.clone());
        Ok(source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preloaded_sources_resolve() {
        let mut catalog = ShaderCatalog::preloaded();
        catalog.insert("tint/tint", "// tint shader");
        let src = catalog.load("tint/tint").unwrap();
        assert_eq!(&*src, "// tint shader");
    }

    #[test]
    fn missing_source_without_root_fails() {
        let mut catalog = ShaderCatalog::preloaded();
        let err = catalog.load("tint/tint").unwrap_err();
        assert!(err.to_string().contains("not preloaded"));
    }

    #[test]
    fn loads_and_caches_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let fx = dir.path().join("effects").join("scroll");
        std::fs::create_dir_all(&fx).unwrap();
        std::fs::write(fx.join("scroll.wgsl"), "// scroll shader").unwrap();

        let mut catalog = ShaderCatalog::new(dir.path());
        let first = catalog.load("scroll/scroll").unwrap();
        assert_eq!(&*first, "// scroll shader");

        // Cached: deleting the file does not invalidate the entry
        std::fs::remove_file(fx.join("scroll.wgsl")).unwrap();
        let second = catalog.load("scroll/scroll").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }
}
