//! Font file lookup.

use crate::error::AtlasError;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Loads font bytes by path.
///
/// Paths are either absolute, home-relative (`~/...`) or relative to one of
/// the loader's search roots (bundled resources).
pub trait ResourceLoader {
    /// Read the whole file.
    fn load(&self, path: &str) -> Result<Vec<u8>, AtlasError>;

    /// Whether `load` would find the file.
    fn exists(&self, path: &str) -> bool;
}

/// Reads from the local filesystem.
#[derive(Debug, Clone, Default)]
pub struct FsResourceLoader {
    home: Option<PathBuf>,
    search_roots: Vec<PathBuf>,
}

impl FsResourceLoader {
    /// A loader that expands `~` from `$HOME` and has no search roots.
    pub fn new() -> Self {
        Self {
            home: std::env::var_os("HOME").map(PathBuf::from),
            search_roots: Vec::new(),
        }
    }

    /// Add a directory that relative paths are resolved against.
    pub fn with_search_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.search_roots.push(root.into());
        self
    }

    /// Override the home directory used for `~/` expansion.
    pub fn with_home(mut self, home: impl Into<PathBuf>) -> Self {
        self.home = Some(home.into());
        self
    }

    /// Resolve `path` to an existing file, if any.
    pub fn resolve(&self, path: &str) -> Option<PathBuf> {
        if let Some(rest) = path.strip_prefix("~/") {
            let full = self.home.as_ref()?.join(rest);
            return full.is_file().then_some(full);
        }

        let direct = Path::new(path);
        if direct.is_absolute() {
            return direct.is_file().then(|| direct.to_path_buf());
        }

        self.search_roots
            .iter()
            .map(|root| root.join(path))
            .chain(std::iter::once(direct.to_path_buf()))
            .find(|candidate| candidate.is_file())
    }
}

impl ResourceLoader for FsResourceLoader {
    fn load(&self, path: &str) -> Result<Vec<u8>, AtlasError> {
        let resolved = self
            .resolve(path)
            .ok_or_else(|| AtlasError::ResourceNotFound(path.to_string()))?;
        debug!("Reading font file {}", resolved.display());
        Ok(std::fs::read(resolved)?)
    }

    fn exists(&self, path: &str) -> bool {
        self.resolve(path).is_some()
    }
}

/// Serves fonts from memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryResourceLoader {
    files: HashMap<String, Vec<u8>>,
}

impl MemoryResourceLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: impl Into<String>, data: Vec<u8>) -> Self {
        self.files.insert(path.into(), data);
        self
    }
}

impl ResourceLoader for MemoryResourceLoader {
    fn load(&self, path: &str) -> Result<Vec<u8>, AtlasError> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| AtlasError::ResourceNotFound(path.to_string()))
    }

    fn exists(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("arcglyph-loader-{}-{}", name, std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_home_expansion() {
        let home = scratch_dir("home");
        std::fs::create_dir_all(home.join("fonts")).unwrap();
        std::fs::write(home.join("fonts/a.ttf"), b"abc").unwrap();

        let loader = FsResourceLoader::new().with_home(&home);
        assert!(loader.exists("~/fonts/a.ttf"));
        assert_eq!(loader.load("~/fonts/a.ttf").unwrap(), b"abc");
        assert!(!loader.exists("~/fonts/missing.ttf"));
    }

    #[test]
    fn test_search_roots() {
        let root = scratch_dir("root");
        std::fs::write(root.join("bundled.ttf"), b"xyz").unwrap();

        let loader = FsResourceLoader::new().with_search_root(&root);
        assert_eq!(loader.load("bundled.ttf").unwrap(), b"xyz");
        assert!(matches!(
            loader.load("nope.ttf"),
            Err(AtlasError::ResourceNotFound(_))
        ));
    }

    #[test]
    fn test_memory_loader() {
        let loader = MemoryResourceLoader::new().with_file("a", vec![1, 2]);
        assert!(loader.exists("a"));
        assert_eq!(loader.load("a").unwrap(), vec![1, 2]);
        assert!(loader.load("b").is_err());
    }
}
