//! Local catalog — the files this node answers searches for.
//!
//! The search protocol only ever asks two questions of it: does a name
//! exist, and what names are there. Writes happen elsewhere (an upload
//! UI, a user copying files into the share directory).

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use anyhow::{Context, Result};
use dashmap::DashSet;

/// Read-only view of locally hosted files.
pub trait LocalCatalog: Send + Sync {
    /// Is `filename` hosted here?
    fn exists(&self, filename: &str) -> bool;

    /// All hosted filenames.
    fn list(&self) -> Vec<String>;
}

// ── Directory-backed ──────────────────────────────────────────────────────────

/// Catalog backed by a flat share directory.
#[derive(Debug, Clone)]
pub struct DirCatalog {
    root: PathBuf,
}

impl DirCatalog {
    /// Open the share directory, creating it if missing.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)
            .with_context(|| format!("failed to create share dir {}", root.display()))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a remote-supplied name to a path inside the share directory.
    /// Only a single normal path component is accepted.
    fn resolve(&self, filename: &str) -> Option<PathBuf> {
        let mut components = Path::new(filename).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(name)), None) => Some(self.root.join(name)),
            _ => None,
        }
    }
}

impl LocalCatalog for DirCatalog {
    fn exists(&self, filename: &str) -> bool {
        if filename.contains('/') || filename.contains('\\') {
            return false;
        }
        self.resolve(filename)
            .map(|p| p.is_file())
            .unwrap_or(false)
    }

    /// Newest first.
    fn list(&self) -> Vec<String> {
        let entries = match std::fs::read_dir(&self.root) {
            Ok(e) => e,
            Err(e) => {
                tracing::warn!(dir = %self.root.display(), error = %e, "failed to list share dir");
                return Vec::new();
            }
        };

        let mut files: Vec<(SystemTime, String)> = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
            .filter_map(|entry| {
                let name = entry.file_name().into_string().ok()?;
                let modified = entry
                    .metadata()
                    .and_then(|m| m.modified())
                    .unwrap_or(SystemTime::UNIX_EPOCH);
                Some((modified, name))
            })
            .collect();

        files.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
        files.into_iter().map(|(_, name)| name).collect()
    }
}

// ── In-memory ─────────────────────────────────────────────────────────────────

/// Catalog held in memory. Handy when embedding a node or in tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    files: Arc<DashSet<String>>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_files<I, S>(files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let catalog = Self::new();
        for f in files {
            catalog.add(f);
        }
        catalog
    }

    pub fn add(&self, filename: impl Into<String>) {
        self.files.insert(filename.into());
    }
}

impl LocalCatalog for MemoryCatalog {
    fn exists(&self, filename: &str) -> bool {
        self.files.contains(filename)
    }

    /// Sorted by name; there is no modification time to order by.
    fn list(&self) -> Vec<String> {
        let mut files: Vec<String> = self.files.iter().map(|f| f.key().clone()).collect();
        files.sort();
        files
    }
}
