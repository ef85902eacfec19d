//! Batch rewriting of script files.
//!
//! Scans directories for scripts and rewrites independent units in parallel.
//! Units share only the environment table and the globals cache.

use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::WalkDir;

use crate::cache::GlobalsCache;
use crate::error::{Result, RewriteError};
use crate::options::RewriteOptions;
use crate::transform::{rewrite_source_with_cache, RewriteOutput};

const SCRIPT_EXTENSIONS: &[&str] = &["js", "mjs", "cjs"];

#[derive(Debug)]
pub struct FileRewrite {
    pub path: PathBuf,
    pub result: Result<RewriteOutput>,
}

impl FileRewrite {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Recursively find all script files under `dir`, sorted by path.
pub fn discover_sources(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for entry in WalkDir::new(dir).follow_links(true) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "skipping unreadable directory entry");
                continue;
            }
        };
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if let Some(ext) = path.extension().and_then(|ext| ext.to_str()) {
            if SCRIPT_EXTENSIONS.contains(&ext) {
                files.push(path.to_path_buf());
            }
        }
    }

    files.sort();
    files
}

/// Rewrites every file. Results keep the order of `paths`; one failing file
/// does not stop the others.
pub fn rewrite_files(paths: &[PathBuf], options: &RewriteOptions) -> Vec<FileRewrite> {
    rewrite_files_with_cache(paths, options, GlobalsCache::shared())
}

pub fn rewrite_files_with_cache(
    paths: &[PathBuf],
    options: &RewriteOptions,
    cache: &GlobalsCache,
) -> Vec<FileRewrite> {
    paths
        .par_iter()
        .map(|path| FileRewrite {
            path: path.clone(),
            result: rewrite_file(path, options, cache),
        })
        .collect()
}

fn rewrite_file(
    path: &Path,
    options: &RewriteOptions,
    cache: &GlobalsCache,
) -> Result<RewriteOutput> {
    let source = fs::read_to_string(path).map_err(|source| RewriteError::SourceUnreadable {
        path: path.to_path_buf(),
        source,
    })?;
    let file_name = path.to_string_lossy();
    let result = rewrite_source_with_cache(&source, &file_name, options, cache);
    if let Err(e) = &result {
        warn!(file = %file_name, code = e.code(), error = %e, "failed to rewrite");
    }
    result
}
