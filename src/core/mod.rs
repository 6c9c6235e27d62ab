//! Core package management.
//!
//! This module contains:
//! - Layout: The fixed folder skeleton and LCP map
//! - Naming: Collision-free file name allocation
//! - Registry: The resource registry and its lifecycle
//! - Watcher: External change tracking with suspend/resume
//! - Manifest: The package document collaborator seam

pub mod layout;
pub mod manifest;
pub mod naming;
pub mod registry;
pub mod watcher;

// Re-export commonly used types
pub use layout::PackageLayout;
pub use manifest::{InventoryManifest, Manifest, RenameRecord};
pub use naming::unique_filename;
pub use registry::{Registry, RegistryBuilder, RegistryConfig, RegistryError, WatchFilter};
pub use watcher::ResourceWatcher;
