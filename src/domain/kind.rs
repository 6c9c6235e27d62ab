//! Resource kinds and the package folder roles they are placed under.

use serde::{Deserialize, Serialize};

/// Semantic category of a registered resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// XHTML/HTML content document (part of the reading order)
    Html,

    /// Stylesheet
    Css,

    /// Raster image
    Image,

    /// Vector image
    Svg,

    /// Embedded font
    Font,

    /// Audio clip
    Audio,

    /// Video clip
    Video,

    /// Generic XML document
    Xml,

    /// Miscellaneous text (scripts, plain text)
    Misc,

    /// Package manifest and spine
    Opf,

    /// Navigation control file
    Ncx,

    /// Anything the media table could not place
    Other,
}

impl ResourceKind {
    /// Folder the resource is stored under when added as content.
    pub fn folder(self) -> FolderKey {
        match self {
            ResourceKind::Html => FolderKey::Text,
            ResourceKind::Css => FolderKey::Styles,
            ResourceKind::Image | ResourceKind::Svg => FolderKey::Images,
            ResourceKind::Font => FolderKey::Fonts,
            ResourceKind::Audio => FolderKey::Audio,
            ResourceKind::Video => FolderKey::Video,
            ResourceKind::Xml | ResourceKind::Misc | ResourceKind::Other => FolderKey::Misc,
            ResourceKind::Opf => FolderKey::Opf,
            ResourceKind::Ncx => FolderKey::Ncx,
        }
    }

    /// Whether files of this kind may be handed to an external editor,
    /// and therefore need watching for out-of-process changes.
    pub fn may_open_externally(self) -> bool {
        matches!(
            self,
            ResourceKind::Html
                | ResourceKind::Css
                | ResourceKind::Image
                | ResourceKind::Svg
                | ResourceKind::Xml
                | ResourceKind::Misc
        )
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ResourceKind::Html => "html",
            ResourceKind::Css => "css",
            ResourceKind::Image => "image",
            ResourceKind::Svg => "svg",
            ResourceKind::Font => "font",
            ResourceKind::Audio => "audio",
            ResourceKind::Video => "video",
            ResourceKind::Xml => "xml",
            ResourceKind::Misc => "misc",
            ResourceKind::Opf => "opf",
            ResourceKind::Ncx => "ncx",
            ResourceKind::Other => "other",
        };
        f.pad(name)
    }
}

impl std::str::FromStr for ResourceKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.to_lowercase().as_str() {
            "html" | "xhtml" | "text" => Ok(ResourceKind::Html),
            "css" | "style" => Ok(ResourceKind::Css),
            "image" => Ok(ResourceKind::Image),
            "svg" => Ok(ResourceKind::Svg),
            "font" => Ok(ResourceKind::Font),
            "audio" => Ok(ResourceKind::Audio),
            "video" => Ok(ResourceKind::Video),
            "xml" => Ok(ResourceKind::Xml),
            "misc" => Ok(ResourceKind::Misc),
            "opf" => Ok(ResourceKind::Opf),
            "ncx" => Ok(ResourceKind::Ncx),
            "other" => Ok(ResourceKind::Other),
            _ => anyhow::bail!("Unknown resource kind: {}", s),
        }
    }
}

/// Folder role inside the package tree.
///
/// Each role maps to a fixed "longest common path" prefix, which resources
/// use to compute their own relative paths when the package is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FolderKey {
    Text,
    Styles,
    Images,
    Fonts,
    Audio,
    Video,
    Misc,
    Ncx,
    Opf,
    Other,
}

impl FolderKey {
    /// Every folder role, in a stable order.
    pub const ALL: [FolderKey; 10] = [
        FolderKey::Text,
        FolderKey::Styles,
        FolderKey::Images,
        FolderKey::Fonts,
        FolderKey::Audio,
        FolderKey::Video,
        FolderKey::Misc,
        FolderKey::Ncx,
        FolderKey::Opf,
        FolderKey::Other,
    ];

    /// The string key used in the LCP map.
    pub fn as_str(self) -> &'static str {
        match self {
            FolderKey::Text => "text",
            FolderKey::Styles => "styles",
            FolderKey::Images => "images",
            FolderKey::Fonts => "fonts",
            FolderKey::Audio => "audio",
            FolderKey::Video => "video",
            FolderKey::Misc => "misc",
            FolderKey::Ncx => "ncx",
            FolderKey::Opf => "opf",
            FolderKey::Other => "other",
        }
    }

    /// Name of the content subfolder under `OEBPS/`, if this role has one.
    pub fn subfolder(self) -> Option<&'static str> {
        match self {
            FolderKey::Text => Some("Text"),
            FolderKey::Styles => Some("Styles"),
            FolderKey::Images => Some("Images"),
            FolderKey::Fonts => Some("Fonts"),
            FolderKey::Audio => Some("Audio"),
            FolderKey::Video => Some("Video"),
            FolderKey::Misc => Some("Misc"),
            FolderKey::Ncx | FolderKey::Opf | FolderKey::Other => None,
        }
    }
}

impl std::fmt::Display for FolderKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

impl std::str::FromStr for FolderKey {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        let lower = s.to_lowercase();
        FolderKey::ALL
            .into_iter()
            .find(|key| key.as_str() == lower)
            .ok_or_else(|| anyhow::anyhow!("Unknown folder key: {}", s))
    }
}
