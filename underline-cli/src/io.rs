//! File I/O for the native CLI

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use underline_core::{AnnotationSet, MemTree};

/// Load an XML/XHTML document into a tree, with a display title.
pub fn load_document(path: &str) -> Result<(MemTree, String)> {
    let path = Path::new(path);
    let canonical = path
        .canonicalize()
        .with_context(|| format!("Failed to resolve path: {}", path.display()))?;

    let content = fs::read_to_string(&canonical)
        .with_context(|| format!("Failed to read file: {}", canonical.display()))?;

    let tree = MemTree::from_xml(&content)
        .with_context(|| format!("Failed to parse document: {}", canonical.display()))?;

    let title = canonical
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "Untitled".to_string());

    Ok((tree, title))
}

/// Get the ~/.underline directory path, creating it if needed
pub fn underline_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not find home directory")?;
    let dir = home.join(".underline");

    if !dir.exists() {
        fs::create_dir_all(&dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    }

    Ok(dir)
}

/// Sidecar path for a document's annotations: ~/.underline/<stem>.json
pub fn sidecar_path(doc_title: &str) -> Result<PathBuf> {
    Ok(underline_dir()?.join(format!("{}.json", doc_title)))
}

/// Load the annotation sidecar; a missing file is an empty set.
pub fn load_annotations(path: &Path) -> Result<AnnotationSet> {
    if !path.exists() {
        return Ok(AnnotationSet::new());
    }
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&json).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Write the annotation sidecar.
pub fn save_annotations(path: &Path, set: &AnnotationSet) -> Result<()> {
    let json = serde_json::to_string_pretty(set).context("Failed to serialize annotations")?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
