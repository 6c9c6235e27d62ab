//! A single content unit registered in the package tree.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::kind::ResourceKind;

/// Stable resource identifier (UUID v4, assigned at creation)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResourceId(String);

impl ResourceId {
    /// Generate a fresh identifier
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Get the raw string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ResourceId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::borrow::Borrow<str> for ResourceId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ResourceId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for ResourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A file inside the package working tree.
///
/// The identifier, kind and package root never change. The full path only
/// changes through [`Resource::rename_to`]; everything path-like (book path,
/// file name) is derived from it on demand.
#[derive(Debug)]
pub struct Resource {
    id: ResourceId,
    kind: ResourceKind,
    package_root: PathBuf,
    full_path: RwLock<PathBuf>,
    media_type: RwLock<String>,
    epub_version: RwLock<String>,
    lcp: RwLock<Option<String>>,
    main_id: RwLock<Option<String>>,
    disk_revision: AtomicU64,
    created_at: DateTime<Utc>,
}

impl Resource {
    /// Create a resource rooted at `package_root` and backed by `full_path`.
    pub fn new(
        package_root: impl Into<PathBuf>,
        full_path: impl Into<PathBuf>,
        kind: ResourceKind,
    ) -> Self {
        Self {
            id: ResourceId::new(),
            kind,
            package_root: package_root.into(),
            full_path: RwLock::new(full_path.into()),
            media_type: RwLock::new(String::new()),
            epub_version: RwLock::new(String::new()),
            lcp: RwLock::new(None),
            main_id: RwLock::new(None),
            disk_revision: AtomicU64::new(0),
            created_at: Utc::now(),
        }
    }

    pub fn id(&self) -> &ResourceId {
        &self.id
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn package_root(&self) -> &Path {
        &self.package_root
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Absolute path of the backing file
    pub fn full_path(&self) -> PathBuf {
        self.full_path.read().clone()
    }

    /// Path relative to the package root, always `/`-separated.
    pub fn book_path(&self) -> String {
        book_path_for(&self.package_root, &self.full_path.read())
    }

    /// File name component of the full path
    pub fn filename(&self) -> String {
        self.full_path
            .read()
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Display name used for short-name lookups.
    ///
    /// File names placed by the registry are unique (case-insensitively),
    /// so the file name identifies such a resource. Files staged under
    /// `META-INF` keep their names and are not made unique.
    pub fn short_path_name(&self) -> String {
        self.filename()
    }

    /// Whether another program may be used to edit this file
    pub fn is_watchable(&self) -> bool {
        self.kind.may_open_externally()
    }

    pub fn media_type(&self) -> String {
        self.media_type.read().clone()
    }

    pub fn set_media_type(&self, media_type: impl Into<String>) {
        *self.media_type.write() = media_type.into();
    }

    pub fn epub_version(&self) -> String {
        self.epub_version.read().clone()
    }

    pub fn set_epub_version(&self, version: impl Into<String>) {
        *self.epub_version.write() = version.into();
    }

    /// Longest common path prefix for this resource's folder role
    pub fn lcp(&self) -> Option<String> {
        self.lcp.read().clone()
    }

    pub fn set_lcp(&self, lcp: impl Into<String>) {
        *self.lcp.write() = Some(lcp.into());
    }

    /// Book identifier a navigation resource was seeded with
    pub fn main_id(&self) -> Option<String> {
        self.main_id.read().clone()
    }

    pub fn set_main_id(&self, main_id: impl Into<String>) {
        *self.main_id.write() = Some(main_id.into());
    }

    /// Number of external on-disk changes observed so far
    pub fn disk_revision(&self) -> u64 {
        self.disk_revision.load(Ordering::SeqCst)
    }

    /// Record that the backing file was changed by another process.
    pub fn file_changed_on_disk(&self) {
        let revision = self.disk_revision.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::debug!("{} changed on disk (revision {})", self.book_path(), revision);
    }

    /// Rename the backing file within its folder.
    ///
    /// Returns the previous full path; the registry needs it to re-key its
    /// book path index.
    pub fn rename_to(&self, new_filename: &str) -> std::io::Result<PathBuf> {
        let mut full_path = self.full_path.write();
        let old_path = full_path.clone();
        let new_path = old_path.with_file_name(new_filename);

        std::fs::rename(&old_path, &new_path)?;
        *full_path = new_path;

        Ok(old_path)
    }

    /// Remove the backing file. A file that is already gone is not an error.
    pub fn delete_file(&self) -> std::io::Result<()> {
        let path = self.full_path();
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}

/// Compute the `/`-separated path of `full_path` relative to `root`.
///
/// Paths outside `root` are returned unchanged (lossily converted).
pub fn book_path_for(root: &Path, full_path: &Path) -> String {
    match full_path.strip_prefix(root) {
        Ok(relative) => relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/"),
        Err(_) => full_path.to_string_lossy().into_owned(),
    }
}
