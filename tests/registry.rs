//! Registry Integration Tests
//!
//! Tests for adding, looking up, renaming and removing resources, and for
//! the folder layout a fresh registry creates.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use epubkeep::core::layout::CONTAINER_XML;
use epubkeep::{
    FolderKey, InventoryManifest, Registry, RegistryConfig, RegistryError, ResourceChange,
    ResourceKind,
};
use tempfile::TempDir;

fn open() -> (Arc<Registry>, Arc<InventoryManifest>) {
    let manifest = Arc::new(InventoryManifest::with_identifier("urn:uuid:book"));
    let registry = Registry::open(RegistryConfig::default(), manifest.clone()).unwrap();
    (registry, manifest)
}

/// Write a source file named `name` under `dir` and return its path
fn write_source(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_open_creates_skeleton() {
    let root = TempDir::new().unwrap();
    let registry = Registry::open_in(
        root.path(),
        RegistryConfig::default(),
        Arc::new(InventoryManifest::new()),
    )
    .unwrap();

    for folder in ["Text", "Styles", "Images", "Fonts", "Audio", "Video", "Misc"] {
        assert!(registry.oebps_folder().join(folder).is_dir(), "{folder}");
    }

    let container =
        std::fs::read_to_string(registry.main_folder().join("META-INF/container.xml")).unwrap();
    assert_eq!(container, CONTAINER_XML);
    assert_eq!(registry.text_folder(), registry.oebps_folder().join("Text"));
}

#[test]
fn test_reopening_same_root_is_idempotent() {
    let root = TempDir::new().unwrap();
    let manifest = Arc::new(InventoryManifest::new());

    let first = Registry::open_in(root.path(), RegistryConfig::default(), manifest.clone()).unwrap();
    let text = first.text_folder();
    drop(first);

    let second = Registry::open_in(root.path(), RegistryConfig::default(), manifest).unwrap();
    assert_eq!(second.text_folder(), text);
    assert_eq!(std::fs::read_dir(second.oebps_folder()).unwrap().count(), 7);
}

#[test]
fn test_longest_common_paths_are_separator_terminated() {
    let (registry, _) = open();

    for key in FolderKey::ALL {
        let lcp = registry.longest_common_path(key);
        assert!(lcp.ends_with(std::path::MAIN_SEPARATOR), "{key}: {lcp}");
    }

    let text = registry.text_folder();
    assert!(registry
        .longest_common_path(FolderKey::Text)
        .starts_with(text.to_str().unwrap()));
}

#[test]
fn test_content_lands_in_kind_folder() {
    let (registry, _) = open();
    let src = TempDir::new().unwrap();

    let cases = [
        ("chapter.xhtml", "OEBPS/Text/chapter.xhtml", ResourceKind::Html),
        ("main.css", "OEBPS/Styles/main.css", ResourceKind::Css),
        ("cover.jpg", "OEBPS/Images/cover.jpg", ResourceKind::Image),
        ("logo.svg", "OEBPS/Images/logo.svg", ResourceKind::Svg),
        ("serif.otf", "OEBPS/Fonts/serif.otf", ResourceKind::Font),
        ("intro.mp3", "OEBPS/Audio/intro.mp3", ResourceKind::Audio),
        ("clip.mp4", "OEBPS/Video/clip.mp4", ResourceKind::Video),
    ];

    for (name, book_path, kind) in cases {
        let resource = registry
            .add_content_file(write_source(src.path(), name, name), true, None)
            .unwrap();
        assert_eq!(resource.book_path(), book_path);
        assert_eq!(resource.kind(), kind);
        assert_eq!(std::fs::read_to_string(resource.full_path()).unwrap(), name);
    }

    assert!(registry.indices_consistent());
}

#[test]
fn test_unknown_extension_goes_to_misc() {
    let (registry, _) = open();
    let src = TempDir::new().unwrap();

    let resource = registry
        .add_content_file(write_source(src.path(), "notes.qqq", "?"), true, None)
        .unwrap();

    assert_eq!(resource.book_path(), "OEBPS/Misc/notes.qqq");
    assert_eq!(resource.kind(), ResourceKind::Other);
    assert_eq!(resource.media_type(), "application/octet-stream");
    assert_eq!(
        resource.lcp().as_deref(),
        Some(registry.longest_common_path(FolderKey::Misc))
    );
}

#[test]
fn test_media_type_hint_overrides_extension() {
    let (registry, _) = open();
    let src = TempDir::new().unwrap();

    let resource = registry
        .add_content_file(
            write_source(src.path(), "chapter.txt", "<html/>"),
            true,
            Some("application/xhtml+xml"),
        )
        .unwrap();

    assert_eq!(resource.kind(), ResourceKind::Html);
    assert_eq!(resource.book_path(), "OEBPS/Text/chapter.txt");
}

#[test]
fn test_colliding_names_are_renumbered() {
    let (registry, _) = open();
    let first = TempDir::new().unwrap();
    let second = TempDir::new().unwrap();

    let a = registry
        .add_content_file(write_source(first.path(), "Section0001.xhtml", "a"), true, None)
        .unwrap();
    let b = registry
        .add_content_file(write_source(second.path(), "section0001.XHTML", "b"), true, None)
        .unwrap();

    assert_eq!(a.filename(), "Section0001.xhtml");
    assert_eq!(b.filename(), "section0002.XHTML");
    assert_eq!(std::fs::read_to_string(b.full_path()).unwrap(), "b");
}

#[test]
fn test_highest_reading_order_counts_documents_only() {
    let (registry, _) = open();
    let src = TempDir::new().unwrap();
    assert_eq!(registry.get_highest_reading_order(), -1);

    for name in ["a.xhtml", "a.css", "b.xhtml", "a.png", "c.html"] {
        registry
            .add_content_file(write_source(src.path(), name, name), true, None)
            .unwrap();
    }

    assert_eq!(registry.get_highest_reading_order(), 2);
}

#[test]
fn test_remove_makes_resource_unreachable() {
    let (registry, manifest) = open();
    let events = registry.subscribe();
    let src = TempDir::new().unwrap();

    let resource = registry
        .add_content_file(write_source(src.path(), "a.xhtml", "a"), true, None)
        .unwrap();
    let id = resource.id().to_string();
    let book_path = resource.book_path();

    assert!(registry.remove_resource(&resource));
    assert!(!registry.remove_resource(&resource));

    assert!(registry.get_resource_by_id(&id).is_none());
    assert!(matches!(
        registry.get_resource_by_book_path(&book_path),
        Err(RegistryError::ResourceNotFound(_))
    ));
    assert!(registry.get_resource_by_short_name("a.xhtml").is_err());
    assert!(!manifest.contains(resource.id()));
    assert!(registry.indices_consistent());

    let changes: Vec<_> = events.try_iter().map(|e| e.change).collect();
    assert_eq!(changes, vec![ResourceChange::Added, ResourceChange::Removed]);

    // the name is free again
    let again = registry
        .add_content_file(write_source(src.path(), "a.xhtml", "a2"), true, None)
        .unwrap();
    assert_eq!(again.filename(), "a.xhtml");
    assert_ne!(again.id(), resource.id());
}

#[test]
fn test_delete_removes_backing_file() {
    let (registry, _) = open();
    let src = TempDir::new().unwrap();

    let resource = registry
        .add_content_file(write_source(src.path(), "old.css", ""), true, None)
        .unwrap();
    let path = resource.full_path();
    assert!(path.exists());

    registry.delete_resource(&resource).unwrap();

    assert!(!path.exists());
    assert_eq!(registry.len(), 1);
}

#[test]
fn test_rename_rekeys_book_path() {
    let (registry, manifest) = open();
    let events = registry.subscribe();
    let src = TempDir::new().unwrap();

    let resource = registry
        .add_content_file(write_source(src.path(), "a.css", "body {}"), false, None)
        .unwrap();
    let old_path = resource.full_path();

    registry.rename_resource(&resource, "main.css").unwrap();

    assert!(registry.get_resource_by_book_path("OEBPS/Styles/a.css").is_err());
    let found = registry
        .get_resource_by_book_path("OEBPS/Styles/main.css")
        .unwrap();
    assert!(Arc::ptr_eq(&found, &resource));
    assert!(!old_path.exists());
    assert_eq!(std::fs::read_to_string(resource.full_path()).unwrap(), "body {}");
    assert!(registry.indices_consistent());

    let renames = manifest.renames();
    assert_eq!(renames.len(), 1);
    assert_eq!(renames[0].old_full_path, old_path);
    assert_eq!(renames[0].new_book_path, "OEBPS/Styles/main.css");

    let event = events.try_recv().unwrap();
    assert_eq!(
        event.change,
        ResourceChange::Renamed {
            old_full_path: old_path
        }
    );
}

#[test]
fn test_external_rename_is_rekeyed() {
    let (registry, _) = open();
    let src = TempDir::new().unwrap();

    let resource = registry
        .add_content_file(write_source(src.path(), "a.xhtml", ""), false, None)
        .unwrap();

    let old = resource.rename_to("b.xhtml").unwrap();
    registry.resource_renamed(&resource, &old);

    assert!(registry.get_resource_by_book_path("OEBPS/Text/b.xhtml").is_ok());
    assert!(registry.get_resource_by_book_path("OEBPS/Text/a.xhtml").is_err());
    assert!(registry.indices_consistent());
}

#[test]
fn test_book_path_suffix_lookup() {
    let (registry, _) = open();
    let src = TempDir::new().unwrap();
    registry
        .add_content_file(write_source(src.path(), "Chapter1.xhtml", ""), false, None)
        .unwrap();

    assert_eq!(
        registry.get_book_path_ending_with("text/chapter1.XHTML"),
        "OEBPS/Text/Chapter1.xhtml"
    );
    assert_eq!(registry.get_book_path_ending_with("missing.xhtml"), "");
}

#[test]
fn test_navigation_resource_uses_manifest_identifier() {
    let (registry, _) = open();

    let ncx = registry.add_navigation_resource("2.0");

    assert_eq!(ncx.main_id().as_deref(), Some("urn:uuid:book"));
    assert_eq!(ncx.media_type(), "application/x-dtbncx+xml");
    assert!(registry.get_resource_by_book_path("OEBPS/toc.ncx").is_ok());
    assert_eq!(registry.resources_by_kind(ResourceKind::Ncx).len(), 1);
}

#[test]
fn test_temporary_root_is_removed_on_drop() {
    let (registry, _) = open();
    let root = registry.main_folder().to_path_buf();
    assert!(root.is_dir());

    drop(registry);

    assert!(!root.exists());
}

/// Write `META-INF/<tail>` under a fresh directory inside `dir`
fn write_meta_inf(dir: &Path, batch: &str, tail: &str, content: &str) -> PathBuf {
    let path = dir.join(batch).join("META-INF").join(tail);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_meta_inf_file_added_twice_replaces_the_first() {
    let (registry, manifest) = open();
    let events = registry.subscribe();
    let src = TempDir::new().unwrap();

    let first = registry
        .add_content_file(write_meta_inf(src.path(), "one", "display.xml", "1"), true, None)
        .unwrap();
    let second = registry
        .add_content_file(write_meta_inf(src.path(), "two", "display.xml", "2"), true, None)
        .unwrap();

    assert_eq!(first.book_path(), second.book_path());
    assert!(registry.get_resource_by_id(first.id().as_str()).is_none());
    assert!(!manifest.contains(first.id()));
    assert!(manifest.contains(second.id()));
    assert_eq!(registry.len(), 2);
    assert!(registry.indices_consistent());
    assert_eq!(std::fs::read_to_string(second.full_path()).unwrap(), "2");

    let seen: Vec<_> = events
        .try_iter()
        .map(|e| (e.change, e.resource.id().clone()))
        .collect();
    assert_eq!(
        seen,
        vec![
            (ResourceChange::Added, first.id().clone()),
            (ResourceChange::Removed, first.id().clone()),
            (ResourceChange::Added, second.id().clone()),
        ]
    );
}

#[test]
fn test_failed_copy_leaves_resource_registered() {
    let (registry, _) = open();
    let src = TempDir::new().unwrap();
    let dir = src.path().join("dir.css");
    std::fs::create_dir(&dir).unwrap();

    let err = registry.add_content_file(&dir, true, None).unwrap_err();
    assert!(matches!(err, RegistryError::Io(_)));

    // no rollback: indexed without a backing file
    let stranded = registry
        .get_resource_by_book_path("OEBPS/Styles/dir.css")
        .unwrap();
    assert!(!stranded.full_path().exists());
    assert_eq!(registry.len(), 2);
    assert!(registry.indices_consistent());
}

#[test]
fn test_meta_inf_names_may_repeat() {
    let (registry, _) = open();
    let src = TempDir::new().unwrap();

    let top = registry
        .add_content_file(write_meta_inf(src.path(), "one", "extra.xml", "a"), true, None)
        .unwrap();
    let nested = registry
        .add_content_file(write_meta_inf(src.path(), "two", "sub/extra.xml", "b"), true, None)
        .unwrap();

    assert_eq!(top.short_path_name(), nested.short_path_name());
    assert_eq!(top.book_path(), "META-INF/extra.xml");
    assert_eq!(nested.book_path(), "META-INF/sub/extra.xml");
    assert_eq!(registry.len(), 3);

    let found = registry.get_resource_by_short_name("extra.xml").unwrap();
    assert!(found.id() == top.id() || found.id() == nested.id());
}

#[test]
fn test_rename_rejects_paths() {
    let (registry, manifest) = open();
    let src = TempDir::new().unwrap();

    let resource = registry
        .add_content_file(write_source(src.path(), "a.css", ""), true, None)
        .unwrap();
    let before = resource.full_path();

    for bad in ["../a.css", "sub/b.css", "..", ""] {
        let err = registry.rename_resource(&resource, bad).unwrap_err();
        assert!(matches!(err, RegistryError::InvalidFileName(_)), "{bad}");
    }

    assert_eq!(resource.full_path(), before);
    assert!(before.exists());
    assert!(manifest.renames().is_empty());
}
