//! Manifest collaborator.
//!
//! The registry keeps the files and indices; whatever owns the package
//! document (inventory, spine order, cross-reference fixups) plugs in here.
//! All hooks are called synchronously on the thread doing the mutation, so
//! `resource_added` may run on several threads at once.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use uuid::Uuid;

use crate::domain::{Resource, ResourceId};

/// Package document component notified of registry changes.
pub trait Manifest: Send + Sync {
    /// The book's main identifier (dc:identifier)
    fn main_identifier(&self) -> String;

    /// A content file was added and should be indexed
    fn resource_added(&self, resource: &Arc<Resource>);

    /// A resource left the registry
    fn resource_removed(&self, resource: &Arc<Resource>);

    /// A resource's backing file moved; references to `old_full_path`
    /// should be rewritten
    fn resource_renamed(&self, resource: &Arc<Resource>, old_full_path: &Path);
}

/// A rename the manifest was told about
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameRecord {
    pub id: ResourceId,
    pub old_full_path: PathBuf,
    pub new_book_path: String,
}

/// In-memory manifest keeping the ordered inventory of resource ids.
#[derive(Debug)]
pub struct InventoryManifest {
    main_identifier: String,
    items: Mutex<Vec<ResourceId>>,
    renames: Mutex<Vec<RenameRecord>>,
}

impl InventoryManifest {
    /// Create a manifest with a fresh `urn:uuid:` identifier
    pub fn new() -> Self {
        Self::with_identifier(format!("urn:uuid:{}", Uuid::new_v4()))
    }

    pub fn with_identifier(main_identifier: impl Into<String>) -> Self {
        Self {
            main_identifier: main_identifier.into(),
            items: Mutex::new(Vec::new()),
            renames: Mutex::new(Vec::new()),
        }
    }

    /// Ids in the order they were added
    pub fn items(&self) -> Vec<ResourceId> {
        self.items.lock().clone()
    }

    pub fn contains(&self, id: &ResourceId) -> bool {
        self.items.lock().contains(id)
    }

    pub fn renames(&self) -> Vec<RenameRecord> {
        self.renames.lock().clone()
    }
}

impl Default for InventoryManifest {
    fn default() -> Self {
        Self::new()
    }
}

impl Manifest for InventoryManifest {
    fn main_identifier(&self) -> String {
        self.main_identifier.clone()
    }

    fn resource_added(&self, resource: &Arc<Resource>) {
        let mut items = self.items.lock();
        if !items.contains(resource.id()) {
            items.push(resource.id().clone());
        }
    }

    fn resource_removed(&self, resource: &Arc<Resource>) {
        self.items.lock().retain(|id| id != resource.id());
    }

    fn resource_renamed(&self, resource: &Arc<Resource>, old_full_path: &Path) {
        self.renames.lock().push(RenameRecord {
            id: resource.id().clone(),
            old_full_path: old_full_path.to_path_buf(),
            new_book_path: resource.book_path(),
        });
    }
}
