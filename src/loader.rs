//! Document loading from the local filesystem.
//!
//! Dispatches on file extension: `txt`/`md` are read directly, `pdf` and
//! `docx` go through [`crate::extract`]. [`scan_dir`] walks a directory with
//! include/exclude glob patterns and returns the matching files in a
//! deterministic order.

use anyhow::Result;
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::DirEntryConfig;
use crate::error::RagError;
use crate::extract;

/// Load a single document and return its plain text.
pub fn load_file(path: &Path) -> Result<String, RagError> {
    if !path.exists() {
        return Err(RagError::NotFound(path.display().to_string()));
    }

    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "txt" | "md" => read_text(path),
        "pdf" => {
            let bytes = read_bytes(path)?;
            extract::extract_pdf(&bytes)
        }
        "docx" => {
            let bytes = read_bytes(path)?;
            extract::extract_docx(&bytes)
        }
        other => Err(RagError::UnsupportedFormat(if other.is_empty() {
            path.display().to_string()
        } else {
            other.to_string()
        })),
    }
}

fn read_text(path: &Path) -> Result<String, RagError> {
    let bytes = read_bytes(path)?;
    // Non-UTF-8 files (latin-1 exports are common) are decoded lossily
    // rather than rejected.
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn read_bytes(path: &Path) -> Result<Vec<u8>, RagError> {
    std::fs::read(path).map_err(|e| RagError::Extract(format!("{}: {}", path.display(), e)))
}

/// Walk a directory and return files matching the configured globs,
/// sorted for deterministic ingestion order.
pub fn scan_dir(dir: &DirEntryConfig) -> Result<Vec<PathBuf>> {
    if !dir.root.exists() {
        anyhow::bail!("corpus directory does not exist: {}", dir.root.display());
    }

    let include_set = build_globset(&dir.include_globs)?;

    let mut default_excludes = vec![
        "**/.git/**".to_string(),
        "**/target/**".to_string(),
        "**/node_modules/**".to_string(),
    ];
    default_excludes.extend(dir.exclude_globs.clone());
    let exclude_set = build_globset(&default_excludes)?;

    let mut files = Vec::new();
    for entry in WalkDir::new(&dir.root) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let relative = path.strip_prefix(&dir.root).unwrap_or(path);
        let rel_str = relative.to_string_lossy().to_string();

        if exclude_set.is_match(&rel_str) {
            continue;
        }
        if !include_set.is_match(&rel_str) {
            continue;
        }
        files.push(path.to_path_buf());
    }

    files.sort();
    Ok(files)
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}
