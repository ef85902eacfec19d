use crate::error::{Result, RewriteError};
use crate::globals::GlobalFragment;
use crate::options::flag_is_writable;
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::debug;

lazy_static::lazy_static! {
    static ref SHARED_CACHE: GlobalsCache = GlobalsCache::new();
}

/// Parsed globals files keyed by absolute path.
///
/// Entries are never invalidated. A path is read at most once per cache even
/// when several units ask for it at the same time.
#[derive(Default)]
pub struct GlobalsCache {
    entries: RwLock<HashMap<PathBuf, Arc<GlobalFragment>>>,
    reads: AtomicUsize,
}

impl GlobalsCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide cache used by `rewrite_source`.
    pub fn shared() -> &'static GlobalsCache {
        &SHARED_CACHE
    }

    pub fn load(&self, path: &Path) -> Result<Arc<GlobalFragment>> {
        {
            let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(fragment) = entries.get(path) {
                return Ok(Arc::clone(fragment));
            }
        }

        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        // Another unit may have populated the entry while we waited for the lock.
        if let Some(fragment) = entries.get(path) {
            return Ok(Arc::clone(fragment));
        }
        let fragment = Arc::new(self.read_file(path)?);
        entries.insert(path.to_path_buf(), Arc::clone(&fragment));
        Ok(fragment)
    }

    /// Reads the file again even if it was loaded before. The cached entry is left alone.
    pub fn load_uncached(&self, path: &Path) -> Result<GlobalFragment> {
        self.read_file(path)
    }

    /// Number of times this cache has gone to disk.
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(path)
    }

    fn read_file(&self, path: &Path) -> Result<GlobalFragment> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        debug!(path = %path.display(), "reading globals file");
        let data = fs::read_to_string(path).map_err(|source| RewriteError::GlobalsUnreadable {
            path: path.to_path_buf(),
            source,
        })?;
        parse_fragment(path, &data)
    }
}

/// Appends `.json` when missing and anchors relative paths at `cwd`.
pub fn resolve_globals_path(path: &Path, cwd: &Path) -> PathBuf {
    let path = if path.extension().map_or(false, |ext| ext == "json") {
        path.to_path_buf()
    } else {
        let mut with_ext = path.as_os_str().to_owned();
        with_ext.push(".json");
        PathBuf::from(with_ext)
    };
    if path.is_absolute() {
        path
    } else {
        cwd.join(path)
    }
}

fn parse_fragment(path: &Path, data: &str) -> Result<GlobalFragment> {
    let value: Value = serde_json::from_str(data).map_err(|source| RewriteError::GlobalsNotJson {
        path: path.to_path_buf(),
        source,
    })?;
    match value {
        Value::Object(map) => Ok(map
            .into_iter()
            .map(|(name, flag)| {
                let writable = flag_is_writable(&flag);
                (name, writable)
            })
            .collect()),
        _ => Err(RewriteError::GlobalsNotObject {
            path: path.to_path_buf(),
        }),
    }
}
