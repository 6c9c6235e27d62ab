//! Resource registry for a package working tree.
//!
//! Owns every live [`Resource`], indexed both by identifier and by book
//! path, and keeps the two indices identical: all index mutations happen
//! under one lock. Adding content is the only hot path:
//!
//! ```text
//! lock ─ allocate name ─ classify ─ place ─ insert in both indices ─ unlock
//!      └─ copy bytes ─ notify manifest ─ publish Added
//! ```
//!
//! Several threads may add files at once; the lock guarantees they never
//! receive the same file name while the byte copy itself runs unlocked.
//! The copy is not rolled back into the index on failure: a resource can
//! be registered without a backing file if the copy errors.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};

use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::Mutex;
use tempfile::TempDir;
use thiserror::Error;

use crate::domain::{
    book_path_for, FolderKey, RegistryEvent, Resource, ResourceChange, ResourceId, ResourceKind,
};
use crate::media::{classify, is_meta_inf, MediaClassifier, MediaTypes, META_INF};

use super::layout::PackageLayout;
use super::manifest::Manifest;
use super::naming::unique_filename;
use super::watcher::ResourceWatcher;

pub const OPF_MEDIA_TYPE: &str = "application/oebps-package+xml";
pub const NCX_MEDIA_TYPE: &str = "application/x-dtbncx+xml";

/// Errors that can occur with the registry
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Source file does not exist: {0}")]
    SourceFileMissing(PathBuf),

    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    #[error("Source path has no usable file name: {0}")]
    InvalidFileName(PathBuf),

    #[error("File name already in use: {0}")]
    FilenameInUse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Watch error: {0}")]
    Watch(#[from] notify::Error),

    #[error("Name pattern error: {0}")]
    Pattern(#[from] regex::Error),
}

/// Predicate deciding which resource kinds get external-change watching
pub type WatchFilter = Box<dyn Fn(ResourceKind) -> bool + Send + Sync>;

/// Explicit registry settings (see `ResolvedConfig::registry_config`)
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Package version the manifest is created with ("2.0" or "3.0")
    pub epub_version: String,

    /// Debounce window for raw file system events
    pub debounce: Duration,

    /// How long a changed file may stay missing before the event is dropped
    pub reappear_timeout: Duration,

    /// Sleep between existence checks while waiting for a file to reappear
    pub poll_interval: Duration,

    /// Extension → media type overrides
    pub media_types: HashMap<String, String>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            epub_version: "2.0".to_string(),
            debounce: Duration::from_millis(100),
            reappear_timeout: Duration::from_millis(1000),
            poll_interval: Duration::from_millis(50),
            media_types: HashMap::new(),
        }
    }
}

#[derive(Debug, Default)]
struct Indices {
    by_id: HashMap<ResourceId, Arc<Resource>>,
    by_book_path: HashMap<String, Arc<Resource>>,
    opf: Option<Arc<Resource>>,
    ncx: Option<Arc<Resource>>,
}

impl Indices {
    /// Index `resource`. Returns the resource previously stored at the
    /// same book path, which is no longer indexed under any key.
    fn insert(&mut self, resource: Arc<Resource>) -> Option<Arc<Resource>> {
        let book_path = resource.book_path();
        let displaced = self
            .by_book_path
            .insert(book_path, resource.clone())
            .filter(|previous| previous.id() != resource.id());

        if let Some(previous) = &displaced {
            tracing::warn!("Replacing {} at {}", previous.id(), previous.book_path());
            self.by_id.remove(previous.id());
            self.clear_slots(previous.id());
        }
        self.by_id.insert(resource.id().clone(), resource);
        displaced
    }

    fn remove(&mut self, id: &ResourceId) -> Option<Arc<Resource>> {
        let resource = self.by_id.remove(id)?;

        let book_path = resource.book_path();
        if self
            .by_book_path
            .get(&book_path)
            .is_some_and(|r| r.id() == resource.id())
        {
            self.by_book_path.remove(&book_path);
        } else {
            // a rename that has not been re-keyed yet
            self.by_book_path.retain(|_, r| r.id() != resource.id());
        }

        self.clear_slots(id);
        Some(resource)
    }

    fn clear_slots(&mut self, id: &ResourceId) {
        if self.opf.as_ref().is_some_and(|r| r.id() == id) {
            self.opf = None;
        }
        if self.ncx.as_ref().is_some_and(|r| r.id() == id) {
            self.ncx = None;
        }
    }

    /// Move `resource` from its book path at `old_full_path` to its current one.
    fn rekey(&mut self, root: &Path, resource: &Arc<Resource>, old_full_path: &Path) {
        let old_book_path = book_path_for(root, old_full_path);
        let entry = match self.by_book_path.remove(&old_book_path) {
            Some(entry) => entry,
            None => match self.by_id.get(resource.id()) {
                Some(entry) => entry.clone(),
                None => return,
            },
        };
        self.by_book_path.insert(resource.book_path(), entry);
    }

    fn filenames(&self) -> Vec<String> {
        self.by_id.values().map(|r| r.filename()).collect()
    }

    fn epub_version(&self, fallback: &str) -> String {
        self.opf
            .as_ref()
            .map(|opf| opf.epub_version())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| fallback.to_string())
    }
}

/// Builder for [`Registry`]
pub struct RegistryBuilder {
    config: RegistryConfig,
    manifest: Arc<dyn Manifest>,
    root: Option<PathBuf>,
    classifier: Option<Box<dyn MediaClassifier>>,
    watch_filter: Option<WatchFilter>,
}

impl RegistryBuilder {
    /// Use `root` as package root instead of a fresh temporary directory
    pub fn root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    /// Replace the built-in media table
    pub fn classifier(mut self, classifier: impl MediaClassifier + 'static) -> Self {
        self.classifier = Some(Box::new(classifier));
        self
    }

    /// Replace the "may open externally" predicate gating watch registration
    pub fn watch_filter(
        mut self,
        filter: impl Fn(ResourceKind) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.watch_filter = Some(Box::new(filter));
        self
    }

    /// Build the skeleton, bootstrap the manifest resource and start watching.
    pub fn open(self) -> Result<Arc<Registry>, RegistryError> {
        let (temp, root) = match self.root {
            Some(root) => {
                std::fs::create_dir_all(&root)?;
                (None, root)
            }
            None => {
                let temp = tempfile::Builder::new().prefix("epubkeep-").tempdir()?;
                let root = temp.path().to_path_buf();
                (Some(temp), root)
            }
        };
        // notify reports canonical paths; resources must compare equal to them
        let root = root.canonicalize()?;

        let layout = PackageLayout::create(&root)?;
        layout.write_container_xml()?;

        let (watcher, changes) = ResourceWatcher::new(self.config.debounce)?;

        let opf = Arc::new(Resource::new(layout.root(), layout.opf_path(), ResourceKind::Opf));
        opf.set_epub_version(self.config.epub_version.clone());
        opf.set_media_type(OPF_MEDIA_TYPE);
        opf.set_lcp(layout.longest_common_path(FolderKey::Opf));

        let mut indices = Indices::default();
        indices.insert(opf.clone());
        indices.opf = Some(opf);

        let classifier: Box<dyn MediaClassifier> = match self.classifier {
            Some(classifier) => classifier,
            None => Box::new(MediaTypes::builtin().with_overrides(&self.config.media_types)),
        };
        let watch_filter: WatchFilter = match self.watch_filter {
            Some(filter) => filter,
            None => Box::new(ResourceKind::may_open_externally),
        };

        let registry = Arc::new(Registry {
            indices: Mutex::new(indices),
            watcher,
            subscribers: Mutex::new(Vec::new()),
            classifier,
            manifest: self.manifest,
            watch_filter,
            config: self.config,
            layout,
            _temp: temp,
        });

        let weak = Arc::downgrade(&registry);
        std::thread::Builder::new()
            .name("epubkeep-watch".to_string())
            .spawn(move || dispatch_changes(weak, changes))?;

        tracing::info!("Opened package at {}", registry.layout.root().display());
        Ok(registry)
    }
}

/// Forward watcher notifications to the registry until either side goes away.
fn dispatch_changes(registry: Weak<Registry>, changes: Receiver<PathBuf>) {
    for path in changes.iter() {
        let Some(registry) = registry.upgrade() else {
            break;
        };
        registry.resource_file_changed(&path);
    }
}

/// The package resource registry.
pub struct Registry {
    indices: Mutex<Indices>,
    watcher: ResourceWatcher,
    subscribers: Mutex<Vec<Sender<RegistryEvent>>>,
    classifier: Box<dyn MediaClassifier>,
    manifest: Arc<dyn Manifest>,
    watch_filter: WatchFilter,
    config: RegistryConfig,
    layout: PackageLayout,
    // Declared last: the directory is removed after everything above is dropped.
    _temp: Option<TempDir>,
}

impl Registry {
    pub fn builder(config: RegistryConfig, manifest: Arc<dyn Manifest>) -> RegistryBuilder {
        RegistryBuilder {
            config,
            manifest,
            root: None,
            classifier: None,
            watch_filter: None,
        }
    }

    /// Open a registry over a fresh temporary package root
    pub fn open(
        config: RegistryConfig,
        manifest: Arc<dyn Manifest>,
    ) -> Result<Arc<Self>, RegistryError> {
        Self::builder(config, manifest).open()
    }

    /// Open a registry over an explicit package root
    pub fn open_in(
        root: impl Into<PathBuf>,
        config: RegistryConfig,
        manifest: Arc<dyn Manifest>,
    ) -> Result<Arc<Self>, RegistryError> {
        Self::builder(config, manifest).root(root).open()
    }

    // ------------------------------------------------------------------
    // Adding
    // ------------------------------------------------------------------

    /// Copy an external file into the package and register it.
    ///
    /// A leading dot is dropped from the file name, the name is made unique
    /// and the file is placed in the folder its media type belongs to.
    /// Files under a `META-INF` directory are staged at the same location
    /// under the package root instead, unclassified and unrenamed.
    ///
    /// Only when `update_manifest` is set are the manifest and subscribers
    /// told about the new resource. A resource displaced from the same book
    /// path (a `META-INF` file added twice) is always reported as removed.
    pub fn add_content_file(
        &self,
        source: impl AsRef<Path>,
        update_manifest: bool,
        media_type_hint: Option<&str>,
    ) -> Result<Arc<Resource>, RegistryError> {
        let source = source.as_ref();
        if !source.exists() {
            return Err(RegistryError::SourceFileMissing(source.to_path_buf()));
        }

        let original_name = source
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| RegistryError::InvalidFileName(source.to_path_buf()))?;
        let name = match original_name.strip_prefix('.') {
            Some(stripped) if !stripped.is_empty() => stripped,
            _ => original_name,
        };
        let normalised = source.with_file_name(name);

        let (resource, displaced) = {
            let mut indices = self.indices.lock();
            let classification = classify(self.classifier.as_ref(), &normalised, media_type_hint);

            let resource = match meta_inf_tail(source) {
                Some(tail) => {
                    let resource = Resource::new(
                        self.layout.root(),
                        self.layout.root().join(tail),
                        ResourceKind::Other,
                    );
                    resource.set_lcp(self.layout.longest_common_path(FolderKey::Other));
                    resource
                }
                None => {
                    let filename = unique_filename(name, &indices.filenames())?;
                    let destination = self.layout.folder(classification.folder()).join(&filename);
                    let resource =
                        Resource::new(self.layout.root(), destination, classification.kind);
                    resource.set_lcp(self.layout.longest_common_path(classification.lcp_key()));
                    resource
                }
            };
            resource.set_media_type(classification.media_type);
            resource.set_epub_version(indices.epub_version(&self.config.epub_version));

            let resource = Arc::new(resource);
            let displaced = indices.insert(resource.clone());
            (resource, displaced)
        };

        if let Some(displaced) = displaced {
            self.finish_removal(&displaced);
        }

        let destination = resource.full_path();
        if let Some(parent) = destination.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::copy(source, &destination)?;

        tracing::info!(
            "Added {} as {} ({})",
            source.display(),
            resource.book_path(),
            resource.kind()
        );

        if update_manifest {
            self.manifest.resource_added(&resource);
            self.publish(&resource, ResourceChange::Added);
        }

        Ok(resource)
    }

    /// Create the navigation resource at `OEBPS/toc.ncx` and register it.
    ///
    /// Only one may exist; if one is already registered it is returned
    /// unchanged.
    pub fn add_navigation_resource(&self, version: &str) -> Arc<Resource> {
        let main_id = self.manifest.main_identifier();
        let mut indices = self.indices.lock();
        if let Some(existing) = &indices.ncx {
            tracing::warn!("Navigation resource already registered");
            return existing.clone();
        }

        let ncx = Arc::new(Resource::new(
            self.layout.root(),
            self.layout.ncx_path(),
            ResourceKind::Ncx,
        ));
        ncx.set_main_id(main_id);
        ncx.set_epub_version(version);
        ncx.set_media_type(NCX_MEDIA_TYPE);
        ncx.set_lcp(self.layout.longest_common_path(FolderKey::Ncx));

        let displaced = indices.insert(ncx.clone());
        indices.ncx = Some(ncx.clone());
        drop(indices);

        if let Some(displaced) = displaced {
            self.finish_removal(&displaced);
        }

        tracing::info!("Added navigation resource {}", ncx.book_path());
        ncx
    }

    // ------------------------------------------------------------------
    // Removing and renaming
    // ------------------------------------------------------------------

    /// Drop the navigation resource, if any.
    pub fn remove_navigation_resource(&self) {
        let ncx = self.indices.lock().ncx.take();
        if let Some(ncx) = ncx {
            self.remove_resource(&ncx);
        }
    }

    /// Remove a resource from both indices and the watch set, then notify.
    ///
    /// Returns `false` (and notifies nobody) if it was not registered.
    pub fn remove_resource(&self, resource: &Resource) -> bool {
        let Some(removed) = self.indices.lock().remove(resource.id()) else {
            return false;
        };

        self.finish_removal(&removed);
        true
    }

    /// Unwatch and announce a resource that has already left the indices.
    fn finish_removal(&self, removed: &Arc<Resource>) {
        self.watcher.remove_path(&removed.full_path());

        tracing::info!("Removed {}", removed.book_path());
        self.manifest.resource_removed(removed);
        self.publish(removed, ResourceChange::Removed);
    }

    /// Delete a resource's backing file and remove it from the registry.
    pub fn delete_resource(&self, resource: &Resource) -> Result<(), RegistryError> {
        // unwatch first so the deletion is not reported as an external change
        self.watcher.remove_path(&resource.full_path());
        resource.delete_file()?;
        self.remove_resource(resource);
        Ok(())
    }

    /// Rename a resource's file in place and update the indices.
    ///
    /// `new_filename` must be a bare file name; the file never leaves its
    /// folder.
    pub fn rename_resource(
        &self,
        resource: &Arc<Resource>,
        new_filename: &str,
    ) -> Result<(), RegistryError> {
        if Path::new(new_filename).file_name() != Some(std::ffi::OsStr::new(new_filename)) {
            return Err(RegistryError::InvalidFileName(PathBuf::from(new_filename)));
        }

        let old_full_path = {
            let mut indices = self.indices.lock();
            if !indices.by_id.contains_key(resource.id()) {
                return Err(RegistryError::ResourceNotFound(resource.id().to_string()));
            }

            let current = resource.filename();
            let taken = indices.by_id.values().any(|r| {
                r.id() != resource.id() && r.filename().to_lowercase() == new_filename.to_lowercase()
            });
            if taken {
                return Err(RegistryError::FilenameInUse(new_filename.to_string()));
            }
            if current == new_filename {
                return Ok(());
            }

            let old_full_path = resource.rename_to(new_filename)?;
            indices.rekey(self.layout.root(), resource, &old_full_path);
            old_full_path
        };

        self.after_rename(resource, &old_full_path);
        Ok(())
    }

    /// Re-key a resource whose backing file has already moved away from
    /// `old_full_path`, and forward the rename to the manifest.
    pub fn resource_renamed(&self, resource: &Arc<Resource>, old_full_path: &Path) {
        self.indices
            .lock()
            .rekey(self.layout.root(), resource, old_full_path);
        self.after_rename(resource, old_full_path);
    }

    fn after_rename(&self, resource: &Arc<Resource>, old_full_path: &Path) {
        if self.watcher.remove_path(old_full_path) {
            if let Err(e) = self.watcher.add_path(&resource.full_path()) {
                tracing::warn!("Failed to watch {}: {}", resource.full_path().display(), e);
            }
        }

        tracing::info!(
            "Renamed {} to {}",
            book_path_for(self.layout.root(), old_full_path),
            resource.book_path()
        );
        self.manifest.resource_renamed(resource, old_full_path);
        self.publish(
            resource,
            ResourceChange::Renamed {
                old_full_path: old_full_path.to_path_buf(),
            },
        );
    }

    // ------------------------------------------------------------------
    // Lookups
    // ------------------------------------------------------------------

    /// Number of content documents minus one; the last spine position.
    pub fn get_highest_reading_order(&self) -> i64 {
        let count = self
            .indices
            .lock()
            .by_id
            .values()
            .filter(|r| r.kind() == ResourceKind::Html)
            .count();
        count as i64 - 1
    }

    pub fn get_resource_by_id(&self, id: &str) -> Option<Arc<Resource>> {
        self.indices.lock().by_id.get(id).cloned()
    }

    /// Resource whose file name is `name`.
    ///
    /// Files staged under `META-INF` keep their own names and may share one
    /// with each other; among such duplicates the match is unspecified.
    pub fn get_resource_by_short_name(&self, name: &str) -> Result<Arc<Resource>, RegistryError> {
        self.indices
            .lock()
            .by_id
            .values()
            .find(|r| r.short_path_name() == name)
            .cloned()
            .ok_or_else(|| RegistryError::ResourceNotFound(name.to_string()))
    }

    /// First book path ending with `suffix`, compared case-insensitively.
    ///
    /// Several resources may match; which one wins is unspecified. Returns
    /// an empty string when nothing matches.
    pub fn get_book_path_ending_with(&self, suffix: &str) -> String {
        let suffix = suffix.to_lowercase();
        self.indices
            .lock()
            .by_book_path
            .keys()
            .find(|path| path.to_lowercase().ends_with(&suffix))
            .cloned()
            .unwrap_or_default()
    }

    pub fn get_resource_by_book_path(&self, book_path: &str) -> Result<Arc<Resource>, RegistryError> {
        self.indices
            .lock()
            .by_book_path
            .get(book_path)
            .cloned()
            .ok_or_else(|| RegistryError::ResourceNotFound(book_path.to_string()))
    }

    /// The manifest resource (`OEBPS/content.opf`)
    pub fn opf(&self) -> Option<Arc<Resource>> {
        self.indices.lock().opf.clone()
    }

    /// The navigation resource; optional for version 3 packages
    pub fn ncx(&self) -> Option<Arc<Resource>> {
        self.indices.lock().ncx.clone()
    }

    /// All live resources, in no particular order
    pub fn resources(&self) -> Vec<Arc<Resource>> {
        self.indices.lock().by_id.values().cloned().collect()
    }

    pub fn resources_by_kind(&self, kind: ResourceKind) -> Vec<Arc<Resource>> {
        self.indices
            .lock()
            .by_id
            .values()
            .filter(|r| r.kind() == kind)
            .cloned()
            .collect()
    }

    pub fn all_filenames(&self) -> Vec<String> {
        self.indices.lock().filenames()
    }

    pub fn all_book_paths(&self) -> Vec<String> {
        self.indices.lock().by_id.values().map(|r| r.book_path()).collect()
    }

    /// Whether both indices hold exactly the same resources under their
    /// current identifiers and book paths.
    pub fn indices_consistent(&self) -> bool {
        let indices = self.indices.lock();
        indices.by_id.len() == indices.by_book_path.len()
            && indices.by_book_path.iter().all(|(path, r)| {
                r.book_path() == *path
                    && indices
                        .by_id
                        .get(r.id())
                        .is_some_and(|other| Arc::ptr_eq(other, r))
            })
    }

    pub fn len(&self) -> usize {
        self.indices.lock().by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.lock().by_id.is_empty()
    }

    // ------------------------------------------------------------------
    // Folders
    // ------------------------------------------------------------------

    pub fn layout(&self) -> &PackageLayout {
        &self.layout
    }

    pub fn main_folder(&self) -> &Path {
        self.layout.root()
    }

    pub fn oebps_folder(&self) -> &Path {
        self.layout.oebps()
    }

    pub fn text_folder(&self) -> PathBuf {
        self.layout.text()
    }

    pub fn styles_folder(&self) -> PathBuf {
        self.layout.styles()
    }

    pub fn image_folder(&self) -> PathBuf {
        self.layout.images()
    }

    pub fn fonts_folder(&self) -> PathBuf {
        self.layout.fonts()
    }

    pub fn audio_folder(&self) -> PathBuf {
        self.layout.audio()
    }

    pub fn video_folder(&self) -> PathBuf {
        self.layout.video()
    }

    pub fn misc_folder(&self) -> PathBuf {
        self.layout.misc()
    }

    pub fn longest_common_path(&self, key: FolderKey) -> &str {
        self.layout.longest_common_path(key)
    }

    // ------------------------------------------------------------------
    // Watching
    // ------------------------------------------------------------------

    /// Watch a resource's file for external edits if its kind allows it.
    /// Returns whether the file is now watched.
    pub fn watch_resource(&self, resource: &Resource) -> Result<bool, RegistryError> {
        if !(self.watch_filter)(resource.kind()) {
            return Ok(false);
        }
        self.watcher.add_path(&resource.full_path())?;
        Ok(true)
    }

    pub fn watched_paths(&self) -> Vec<PathBuf> {
        self.watcher.files()
    }

    pub fn suspended_paths(&self) -> Vec<PathBuf> {
        self.watcher.suspended()
    }

    /// Stop reacting to disk changes until [`Registry::resume_watching`].
    pub fn suspend_watching(&self) {
        self.watcher.suspend();
    }

    pub fn resume_watching(&self) {
        self.watcher.resume();
    }

    /// Run `f` with watching suspended, e.g. around a full save.
    pub fn without_watching<R>(&self, f: impl FnOnce() -> R) -> R {
        self.suspend_watching();
        let result = f();
        self.resume_watching();
        result
    }

    /// Handle a disk change notification for `path`.
    ///
    /// Editors may delete a file before writing its new version, so a
    /// missing file is polled for up to the configured timeout. A file that
    /// never reappears is ignored; removal and rename handle untracking.
    /// Returns whether a resource was notified.
    pub fn resource_file_changed(&self, path: &Path) -> bool {
        let deadline = Instant::now() + self.config.reappear_timeout;
        while !path.exists() && Instant::now() < deadline {
            std::thread::sleep(self.config.poll_interval);
        }

        if !path.exists() {
            tracing::debug!("Ignoring change for vanished file {}", path.display());
            return false;
        }

        let owner = self
            .indices
            .lock()
            .by_id
            .values()
            .find(|r| r.full_path() == path)
            .cloned();
        let Some(resource) = owner else {
            tracing::debug!("No resource owns {}", path.display());
            return false;
        };

        if let Err(e) = self.watcher.ensure_watched(path) {
            tracing::warn!("Failed to re-watch {}: {}", path.display(), e);
        }

        resource.file_changed_on_disk();
        tracing::info!("{} changed on disk", resource.book_path());
        self.publish(&resource, ResourceChange::ChangedOnDisk);
        true
    }

    // ------------------------------------------------------------------
    // Events
    // ------------------------------------------------------------------

    /// Receive every lifecycle event published from now on.
    pub fn subscribe(&self) -> Receiver<RegistryEvent> {
        let (tx, rx) = unbounded();
        self.subscribers.lock().push(tx);
        rx
    }

    fn publish(&self, resource: &Arc<Resource>, change: ResourceChange) {
        let event = RegistryEvent::new(resource.clone(), change);
        self.subscribers
            .lock()
            .retain(|tx| tx.send(event.clone()).is_ok());
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("root", &self.layout.root())
            .field("resources", &self.len())
            .field("watcher", &self.watcher)
            .finish()
    }
}

/// Path of `source` from its `META-INF` component onwards, if it has one.
fn meta_inf_tail(source: &Path) -> Option<PathBuf> {
    if !is_meta_inf(source) {
        return None;
    }
    let components: Vec<_> = source.components().collect();
    let start = components
        .iter()
        .rposition(|c| c.as_os_str() == META_INF)?;
    Some(components[start..].iter().collect())
}
