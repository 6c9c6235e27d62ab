//! Lifecycle events published by the registry.
//!
//! The registry performs every index change itself and then fans a typed
//! event out to all subscribers. Resources never announce their own removal.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::resource::Resource;

/// A single registry lifecycle event.
#[derive(Debug, Clone)]
pub struct RegistryEvent {
    /// When the change was applied
    pub timestamp: DateTime<Utc>,

    /// The resource the event is about
    pub resource: Arc<Resource>,

    /// What happened
    pub change: ResourceChange,
}

impl RegistryEvent {
    /// Create a new event with the current timestamp
    pub fn new(resource: Arc<Resource>, change: ResourceChange) -> Self {
        Self {
            timestamp: Utc::now(),
            resource,
            change,
        }
    }
}

/// Kinds of registry changes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceChange {
    /// Resource was registered and its file copied into the package
    Added,

    /// Resource left both indices
    Removed,

    /// Resource's backing file moved; carries the previous full path
    Renamed { old_full_path: PathBuf },

    /// Backing file was modified by another process
    ChangedOnDisk,
}

impl std::fmt::Display for ResourceChange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceChange::Added => write!(f, "added"),
            ResourceChange::Removed => write!(f, "removed"),
            ResourceChange::Renamed { old_full_path } => {
                write!(f, "renamed from {}", old_full_path.display())
            }
            ResourceChange::ChangedOnDisk => write!(f, "changed on disk"),
        }
    }
}
