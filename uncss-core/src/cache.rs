//! Usage cache using SHA-256 content fingerprints for change detection.
//!
//! Performance characteristics:
//! - O(1) lookup per document, one small JSON file each
//! - Skips the whole match phase for unchanged pages
//!
//! Caches the used-selector list per document, keyed by the document's
//! name and content fingerprint. A stale fingerprint is a plain miss.
//!
//! # Cache Versioning
//!
//! Entries carry version metadata so the cache invalidates itself when:
//! - The uncss version changes (normalization rules may differ)
//! - The entry format changes

use crate::error::{IoResultExt, UncssResult};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

/// Maximum entry file size (10MB) - prevents unbounded cache growth
const MAX_ENTRY_SIZE_BYTES: usize = 10_000_000;

/// Current cache format version. Increment when the entry format changes.
const CACHE_VERSION: u32 = 1;

/// Crate version for cache compatibility checking.
const UNCSS_VERSION: &str = env!("CARGO_PKG_VERSION");

/// One cached analysis result for one document.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CacheEntry {
    /// Cache format version
    pub cache_version: u32,
    /// Crate version that created this entry
    pub uncss_version: String,
    /// Content fingerprint of the document the entry was computed from
    pub fingerprint: String,
    /// Timestamp when the entry was created
    #[serde(default)]
    pub created_at: u64,
    /// Used selectors, in candidate order
    pub selectors: Vec<String>,
}

impl CacheEntry {
    fn new(fingerprint: &str, selectors: Vec<String>) -> Self {
        let created_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Self {
            cache_version: CACHE_VERSION,
            uncss_version: UNCSS_VERSION.to_string(),
            fingerprint: fingerprint.to_string(),
            created_at,
            selectors,
        }
    }

    /// Check if this entry is usable by the current version.
    fn is_compatible(&self) -> bool {
        if self.cache_version != CACHE_VERSION {
            return false;
        }
        let current_major = UNCSS_VERSION.split('.').next().unwrap_or("0");
        let cached_major = self.uncss_version.split('.').next().unwrap_or("0");
        current_major == cached_major
    }
}

/// Compute the SHA-256 hex digest of arbitrary content.
#[inline]
pub fn fingerprint(bytes: &[u8]) -> String {
    let mut sha = Sha256::new();
    sha.update(bytes);
    format!("{:x}", sha.finalize())
}

/// On-disk cache of per-document used-selector lists.
#[derive(Debug, Clone)]
pub struct SelectorCache {
    dir: PathBuf,
}

impl SelectorCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn entry_path(&self, name: &str) -> PathBuf {
        // Names are paths or URLs; hash them into a flat filename.
        self.dir.join(format!("{}.json", fingerprint(name.as_bytes())))
    }

    /// Look up the used-selector list for a document.
    ///
    /// Returns `None` if the entry is missing, corrupted, written by an
    /// incompatible version, or computed from different content. Misses
    /// are silent; a cache is allowed to be cold.
    pub fn load(&self, name: &str, content_fingerprint: &str) -> Option<Vec<String>> {
        let path = self.entry_path(name);
        if !path.exists() {
            return None;
        }
        let text = fs::read_to_string(&path).ok()?;
        let entry: CacheEntry = serde_json::from_str(&text).ok()?;
        if !entry.is_compatible() {
            let _ = fs::remove_file(&path);
            return None;
        }
        if entry.fingerprint != content_fingerprint {
            return None;
        }
        Some(entry.selectors)
    }

    /// Store a document's used-selector list.
    ///
    /// Uses the temp-file-plus-rename pattern so a concurrent reader never
    /// sees a partial entry. Oversized entries are dropped rather than
    /// written.
    pub fn store(
        &self,
        name: &str,
        content_fingerprint: &str,
        selectors: &[String],
    ) -> UncssResult<()> {
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir).with_path(&self.dir)?;
        }

        let entry = CacheEntry::new(content_fingerprint, selectors.to_vec());
        let json = match serde_json::to_string_pretty(&entry) {
            Ok(json) => json,
            Err(e) => {
                eprintln!("[WARN] cache entry serialization failed: {}", e);
                return Ok(());
            }
        };
        if json.len() > MAX_ENTRY_SIZE_BYTES {
            eprintln!(
                "[WARN] cache entry exceeds {}MB limit, skipping",
                MAX_ENTRY_SIZE_BYTES / 1_000_000
            );
            return Ok(());
        }

        let path = self.entry_path(name);
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let temp_path = self
            .dir
            .join(format!("entry.{}.{}.tmp", std::process::id(), nanos));

        fs::write(&temp_path, &json).with_path(&temp_path)?;
        if let Err(e) = fs::rename(&temp_path, &path) {
            let _ = fs::remove_file(&temp_path);
            return Err(crate::error::UncssError::io(path, e));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir()
            .join("uncss_cache_test")
            .join(format!("{}_{}", name, std::process::id()));
        if dir.exists() {
            fs::remove_dir_all(&dir).ok();
        }
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn batch(selectors: &[&str]) -> Vec<String> {
        selectors.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_fingerprint_deterministic() {
        let a = fingerprint(b"<html></html>");
        let b = fingerprint(b"<html></html>");
        assert_eq!(a, b);
        // SHA-256 produces 64 hex characters
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_fingerprint_changes_on_content_change() {
        assert_ne!(fingerprint(b"<p>a</p>"), fingerprint(b"<p>b</p>"));
    }

    #[test]
    fn test_fingerprint_empty() {
        assert_eq!(
            fingerprint(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_store_load_round_trip() {
        let dir = create_temp_dir("round_trip");
        let cache = SelectorCache::new(&dir);
        let print = fingerprint(b"content");

        cache
            .store("page.html", &print, &batch(&[".a", ".b"]))
            .unwrap();
        let loaded = cache.load("page.html", &print).unwrap();
        assert_eq!(loaded, batch(&[".a", ".b"]));

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_load_misses_on_changed_fingerprint() {
        let dir = create_temp_dir("stale");
        let cache = SelectorCache::new(&dir);

        cache
            .store("page.html", &fingerprint(b"old"), &batch(&[".a"]))
            .unwrap();
        assert!(cache.load("page.html", &fingerprint(b"new")).is_none());

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_load_misses_on_missing_entry() {
        let dir = create_temp_dir("missing");
        let cache = SelectorCache::new(&dir);
        assert!(cache.load("nope.html", "abc").is_none());
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_load_misses_on_corrupted_entry() {
        let dir = create_temp_dir("corrupted");
        let cache = SelectorCache::new(&dir);
        let path = cache.entry_path("page.html");
        fs::write(&path, "{ not valid json ").unwrap();

        // Should miss, not panic
        assert!(cache.load("page.html", "abc").is_none());

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_documents_do_not_collide() {
        let dir = create_temp_dir("collide");
        let cache = SelectorCache::new(&dir);
        let print = fingerprint(b"same content");

        cache.store("a.html", &print, &batch(&[".a"])).unwrap();
        cache.store("b.html", &print, &batch(&[".b"])).unwrap();

        assert_eq!(cache.load("a.html", &print).unwrap(), batch(&[".a"]));
        assert_eq!(cache.load("b.html", &print).unwrap(), batch(&[".b"]));

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_no_temp_file_left() {
        let dir = create_temp_dir("no_temp");
        let cache = SelectorCache::new(&dir);
        cache
            .store("page.html", "abc", &batch(&[".a"]))
            .unwrap();

        for entry in fs::read_dir(&dir).unwrap() {
            let name = entry.unwrap().file_name().to_string_lossy().to_string();
            assert!(!name.ends_with(".tmp"), "Temp file left behind: {}", name);
        }

        fs::remove_dir_all(&dir).ok();
    }
}
