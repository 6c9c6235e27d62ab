//! Media type classification.
//!
//! Resolves an incoming file to a media type, a semantic group and a
//! resource kind. The table itself sits behind [`MediaClassifier`] so the
//! registry never cares where the data comes from.
//!
//! Classification never fails: anything unrecognised degrades to
//! [`ResourceKind::Other`], stored under `Misc`.

pub mod table;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::{FolderKey, ResourceKind};

pub use table::MediaTypes;

/// Media type assigned when neither the hint nor the extension is known
pub const FALLBACK_MEDIA_TYPE: &str = "application/octet-stream";

/// Files under this directory bypass classification
pub const META_INF: &str = "META-INF";

/// Semantic group of a media type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaGroup {
    Text,
    Styles,
    Images,
    Fonts,
    Audio,
    Video,
    Misc,
    Other,
}

impl MediaGroup {
    /// LCP key for resources in this group
    pub fn folder_key(self) -> FolderKey {
        match self {
            MediaGroup::Text => FolderKey::Text,
            MediaGroup::Styles => FolderKey::Styles,
            MediaGroup::Images => FolderKey::Images,
            MediaGroup::Fonts => FolderKey::Fonts,
            MediaGroup::Audio => FolderKey::Audio,
            MediaGroup::Video => FolderKey::Video,
            MediaGroup::Misc => FolderKey::Misc,
            MediaGroup::Other => FolderKey::Other,
        }
    }
}

/// Source of media type knowledge.
pub trait MediaClassifier: Send + Sync {
    /// Media type for a (case-insensitive) file extension without the dot
    fn media_type_for_extension(&self, extension: &str) -> Option<String>;

    /// Semantic group a media type belongs to
    fn group_for_media_type(&self, media_type: &str) -> Option<MediaGroup>;

    /// Resource kind a media type should be represented as
    fn kind_for_media_type(&self, media_type: &str) -> Option<ResourceKind>;
}

/// Result of classifying one incoming file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub media_type: String,
    pub group: MediaGroup,
    pub kind: ResourceKind,
}

impl Classification {
    /// Folder the file is copied into
    pub fn folder(&self) -> FolderKey {
        self.kind.folder()
    }

    /// Key into the LCP map
    pub fn lcp_key(&self) -> FolderKey {
        if self.kind == ResourceKind::Other {
            FolderKey::Misc
        } else {
            self.group.folder_key()
        }
    }
}

/// Whether `path` has a `META-INF` component.
pub fn is_meta_inf(path: &Path) -> bool {
    path.components().any(|c| c.as_os_str() == META_INF)
}

/// Classify a file by explicit media type hint, falling back to its extension.
pub fn classify(
    classifier: &dyn MediaClassifier,
    path: &Path,
    media_type_hint: Option<&str>,
) -> Classification {
    let media_type = media_type_hint
        .filter(|hint| !hint.is_empty())
        .map(str::to_string)
        .or_else(|| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .and_then(|ext| classifier.media_type_for_extension(ext))
        });

    let Some(media_type) = media_type else {
        return Classification {
            media_type: FALLBACK_MEDIA_TYPE.to_string(),
            group: MediaGroup::Other,
            kind: ResourceKind::Other,
        };
    };

    let group = if is_meta_inf(path) {
        MediaGroup::Other
    } else {
        classifier
            .group_for_media_type(&media_type)
            .unwrap_or(MediaGroup::Other)
    };

    // The manifest and navigation file are registered by the registry itself;
    // a stray copy arriving as content is just an opaque file.
    let kind = match classifier.kind_for_media_type(&media_type) {
        Some(ResourceKind::Opf | ResourceKind::Ncx) | None => ResourceKind::Other,
        Some(kind) => kind,
    };

    Classification {
        media_type,
        group,
        kind,
    }
}
