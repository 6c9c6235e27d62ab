//! Domain types for the package registry.
//!
//! This module contains the core data structures:
//! - Resource: A file registered in the package tree
//! - Kinds: Resource categories and folder roles
//! - Events: Lifecycle notifications fanned out by the registry

pub mod events;
pub mod kind;
pub mod resource;

// Re-export commonly used types
pub use events::{RegistryEvent, ResourceChange};
pub use kind::{FolderKey, ResourceKind};
pub use resource::{book_path_for, Resource, ResourceId};
