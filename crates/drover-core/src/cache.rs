//! Content-addressed code cache.
//!
//! Generated automation code is persisted one file per fingerprint under the
//! run's output directory, so repeated runs of the same scenario reuse
//! previously generated code instead of paying for a new model call. Entries
//! are shared across all steps with the same prompt wording. The cache is
//! not time-bound and is never invalidated automatically: staleness against
//! a changed page is an accepted risk surfaced to the operator through the
//! `onlycache`/`--nocache` controls.

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use crate::error::{DroverError, FsResultExt, Result};

/// Durable store mapping step fingerprints to generated code.
#[derive(Debug, Clone)]
pub struct CodeCache {
    dir: PathBuf,
}

impl CodeCache {
    /// Opens the cache rooted at `dir`, creating the directory if needed.
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).fs_context(&dir)?;
        Ok(Self { dir })
    }

    /// Path of the cache file for a fingerprint.
    pub fn path_for(&self, id: &str) -> PathBuf {
        self.dir.join(format!("step-{id}.js"))
    }

    /// Whether a cache entry exists for the fingerprint.
    pub fn has(&self, id: &str) -> bool {
        self.path_for(id).exists()
    }

    /// Reads the cached code for a fingerprint.
    ///
    /// # Errors
    ///
    /// Returns [`DroverError::CacheMiss`] when no entry exists; the caller
    /// decides whether that is recoverable (fall back to generation) or
    /// run-fatal (`onlycache`).
    pub fn get(&self, id: &str, prompt: &str) -> Result<String> {
        let path = self.path_for(id);
        if !path.exists() {
            return Err(DroverError::CacheMiss {
                fingerprint: id.to_string(),
                prompt: prompt.to_string(),
            });
        }
        debug!("cache hit for {id} at {}", path.display());
        fs::read_to_string(&path).fs_context(path)
    }

    /// Persists generated code under a fingerprint, replacing any previous
    /// entry.
    pub fn put(&self, id: &str, code: &str) -> Result<()> {
        let path = self.path_for(id);
        debug!("caching generated code for {id} at {}", path.display());
        fs::write(&path, code).fs_context(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn open_cache() -> (TempDir, CodeCache) {
        let dir = TempDir::new().expect("Failed to create temporary directory");
        let cache = CodeCache::new(dir.path().join("generated")).expect("Failed to open cache");
        (dir, cache)
    }

    #[test]
    fn round_trips_code_byte_identical() {
        let (_dir, cache) = open_cache();
        let code = "await page.waitForLoadState('networkidle');\nawait page.click('#login');";

        cache.put("abc123def456", code).expect("put failed");
        assert!(cache.has("abc123def456"));
        let read = cache.get("abc123def456", "click login").expect("get failed");
        assert_eq!(read, code);
    }

    #[test]
    fn missing_entry_is_a_cache_miss() {
        let (_dir, cache) = open_cache();

        assert!(!cache.has("0000aaaa1111"));
        let err = cache.get("0000aaaa1111", "click login").expect_err("must miss");
        assert!(err.is_cache_miss());
        assert!(err.to_string().contains("click login"));
    }

    #[test]
    fn entries_are_named_by_fingerprint() {
        let (_dir, cache) = open_cache();
        cache.put("feedbeef0123", "code").expect("put failed");
        assert!(cache.path_for("feedbeef0123").ends_with("step-feedbeef0123.js"));
        assert!(cache.path_for("feedbeef0123").exists());
    }

    #[test]
    fn put_overwrites_previous_entry() {
        let (_dir, cache) = open_cache();
        cache.put("cafe00112233", "old").expect("put failed");
        cache.put("cafe00112233", "new").expect("put failed");
        assert_eq!(cache.get("cafe00112233", "p").expect("get failed"), "new");
    }
}
