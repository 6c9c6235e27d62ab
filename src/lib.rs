//! epubkeep - EPUB package folder and resource registry
//!
//! Keeps the on-disk working tree of an EPUB package (`META-INF/` plus
//! `OEBPS/` and its per-media subfolders) in sync with an in-memory
//! registry of the resources that live there.
//!
//! # Architecture
//!
//! The registry is the single owner of every resource:
//! - Incoming files are classified by media type and copied into the
//!   folder their kind belongs to, under a collision-free name
//! - Resources are indexed by identifier and by book path; both indices
//!   always hold the same set
//! - Files that may be edited by another program are watched, and edits
//!   are reported per resource
//!
//! # Modules
//!
//! - `core`: Registry, folder layout, naming, watcher, manifest seam
//! - `domain`: Data structures (Resource, ResourceKind, RegistryEvent)
//! - `media`: Media type classification
//! - `config`: Configuration loading
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Create an empty package skeleton
//! epubkeep layout ./book
//!
//! # Stage files into a package
//! epubkeep stage 'src/*.xhtml' styles/main.css --out ./book --ncx
//!
//! # Report external edits to staged files
//! epubkeep watch 'src/*.xhtml' --out ./book
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod media;

// Re-export main types at crate root for convenience
pub use core::{
    unique_filename, InventoryManifest, Manifest, PackageLayout, Registry, RegistryConfig,
    RegistryError,
};
pub use domain::{FolderKey, RegistryEvent, Resource, ResourceChange, ResourceId, ResourceKind};
pub use media::{classify, Classification, MediaClassifier, MediaGroup, MediaTypes};
