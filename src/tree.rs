//! # Namespace Tree Module
//!
//! Existence oracle for registry nodes and the discovery collaborator used
//! by the dumper.
//!
//! ## Overview
//!
//! A handler registry is a tree. Every node is addressed by its tokens below
//! the root (`["FooItem", "Edit"]`); the root itself is the empty slice. A
//! node may hold handler entries, named by their stem (`GetFooItemEdit`).
//!
//! Two implementations ship with the crate:
//!
//! - [`crate::catalog::Catalog`] - in-memory, nodes derived from registered ids
//! - [`FsTree`] - directories are nodes, files with a given extension are entries
//!
//! ## Layout on Disk
//!
//! ```text
//! http/
//! ├── Get.rs
//! ├── FooItem/
//! │   ├── GetFooItem.rs
//! │   ├── PostFooItem.rs
//! │   └── Edit/
//! │       └── GetFooItemEdit.rs
//! └── Admin/
//!     └── Empty/
//! ```

use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Registry node lookups.
pub trait NamespaceTree: Send + Sync {
    /// Does the node at `tokens` exist? The root (empty slice) always does.
    fn contains(&self, tokens: &[String]) -> bool;

    /// Stems of the handler entries held directly at `tokens`
    fn entries(&self, tokens: &[String]) -> Vec<String>;

    /// Every handler entry in the tree as `(node tokens, stem)`
    fn discover(&self) -> Vec<(Vec<String>, String)>;
}

/// Directory-backed tree: directories are nodes, files carrying the
/// configured extension are handler entries.
#[derive(Debug, Clone)]
pub struct FsTree {
    root: PathBuf,
    extension: String,
}

impl FsTree {
    /// Create a tree rooted at `root`, treating `*.{extension}` files as entries
    ///
    /// A leading dot on the extension is ignored (`".rs"` and `"rs"` are equal).
    pub fn new(root: impl Into<PathBuf>, extension: &str) -> Self {
        Self {
            root: root.into(),
            extension: extension.trim_start_matches('.').to_string(),
        }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn extension(&self) -> &str {
        &self.extension
    }

    fn node_path(&self, tokens: &[String]) -> PathBuf {
        tokens.iter().fold(self.root.clone(), |path, token| path.join(token))
    }

    fn entry_stem(&self, path: &Path) -> Option<String> {
        if path.extension()?.to_str()? != self.extension {
            return None;
        }
        path.file_stem()?.to_str().map(str::to_string)
    }
}

impl NamespaceTree for FsTree {
    fn contains(&self, tokens: &[String]) -> bool {
        self.node_path(tokens).is_dir()
    }

    fn entries(&self, tokens: &[String]) -> Vec<String> {
        let dir = self.node_path(tokens);
        let items = match std::fs::read_dir(&dir) {
            Ok(items) => items,
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "Failed to list registry node");
                return Vec::new();
            }
        };

        let mut stems: Vec<String> = items
            .filter_map(Result::ok)
            .filter(|item| item.path().is_file())
            .filter_map(|item| self.entry_stem(&item.path()))
            .collect();
        stems.sort();
        stems
    }

    fn discover(&self) -> Vec<(Vec<String>, String)> {
        let mut found = Vec::new();

        for entry in WalkDir::new(&self.root).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(root = %self.root.display(), error = %e, "Skipping unreadable registry entry");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let Some(stem) = self.entry_stem(entry.path()) else {
                continue;
            };
            let Ok(relative) = entry.path().strip_prefix(&self.root) else {
                continue;
            };
            let tokens: Vec<String> = relative
                .parent()
                .map(|parent| {
                    parent
                        .components()
                        .map(|c| c.as_os_str().to_string_lossy().into_owned())
                        .collect()
                })
                .unwrap_or_default();
            found.push((tokens, stem));
        }

        debug!(root = %self.root.display(), entries = found.len(), "Registry tree discovered");
        found
    }
}
