//! Built-in media type table.

use std::collections::HashMap;

use crate::domain::ResourceKind;

use super::{MediaClassifier, MediaGroup};

/// (extension, media type)
const EXTENSIONS: &[(&str, &str)] = &[
    ("xhtml", "application/xhtml+xml"),
    ("html", "application/xhtml+xml"),
    ("htm", "application/xhtml+xml"),
    ("css", "text/css"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("png", "image/png"),
    ("gif", "image/gif"),
    ("bmp", "image/bmp"),
    ("webp", "image/webp"),
    ("tif", "image/tiff"),
    ("tiff", "image/tiff"),
    ("svg", "image/svg+xml"),
    ("ttf", "font/ttf"),
    ("otf", "font/otf"),
    ("ttc", "font/collection"),
    ("woff", "font/woff"),
    ("woff2", "font/woff2"),
    ("mp3", "audio/mpeg"),
    ("m4a", "audio/mp4"),
    ("aac", "audio/aac"),
    ("oga", "audio/ogg"),
    ("ogg", "audio/ogg"),
    ("opus", "audio/opus"),
    ("wav", "audio/wav"),
    ("mp4", "video/mp4"),
    ("m4v", "video/mp4"),
    ("webm", "video/webm"),
    ("ogv", "video/ogg"),
    ("xml", "application/xml"),
    ("xpgt", "application/adobe-page-template+xml"),
    ("smil", "application/smil+xml"),
    ("pls", "application/pls+xml"),
    ("js", "application/javascript"),
    ("txt", "text/plain"),
    ("ncx", "application/x-dtbncx+xml"),
    ("opf", "application/oebps-package+xml"),
    ("pdf", "application/pdf"),
];

/// (media type, group, kind)
const MEDIA_TYPES: &[(&str, MediaGroup, ResourceKind)] = &[
    ("application/xhtml+xml", MediaGroup::Text, ResourceKind::Html),
    ("text/html", MediaGroup::Text, ResourceKind::Html),
    ("text/css", MediaGroup::Styles, ResourceKind::Css),
    ("image/jpeg", MediaGroup::Images, ResourceKind::Image),
    ("image/png", MediaGroup::Images, ResourceKind::Image),
    ("image/gif", MediaGroup::Images, ResourceKind::Image),
    ("image/bmp", MediaGroup::Images, ResourceKind::Image),
    ("image/webp", MediaGroup::Images, ResourceKind::Image),
    ("image/tiff", MediaGroup::Images, ResourceKind::Image),
    ("image/svg+xml", MediaGroup::Images, ResourceKind::Svg),
    ("font/ttf", MediaGroup::Fonts, ResourceKind::Font),
    ("font/otf", MediaGroup::Fonts, ResourceKind::Font),
    ("font/collection", MediaGroup::Fonts, ResourceKind::Font),
    ("font/woff", MediaGroup::Fonts, ResourceKind::Font),
    ("font/woff2", MediaGroup::Fonts, ResourceKind::Font),
    ("application/x-font-ttf", MediaGroup::Fonts, ResourceKind::Font),
    ("application/vnd.ms-opentype", MediaGroup::Fonts, ResourceKind::Font),
    ("application/font-woff", MediaGroup::Fonts, ResourceKind::Font),
    ("audio/mpeg", MediaGroup::Audio, ResourceKind::Audio),
    ("audio/mp4", MediaGroup::Audio, ResourceKind::Audio),
    ("audio/aac", MediaGroup::Audio, ResourceKind::Audio),
    ("audio/ogg", MediaGroup::Audio, ResourceKind::Audio),
    ("audio/opus", MediaGroup::Audio, ResourceKind::Audio),
    ("audio/wav", MediaGroup::Audio, ResourceKind::Audio),
    ("video/mp4", MediaGroup::Video, ResourceKind::Video),
    ("video/webm", MediaGroup::Video, ResourceKind::Video),
    ("video/ogg", MediaGroup::Video, ResourceKind::Video),
    ("application/xml", MediaGroup::Misc, ResourceKind::Xml),
    ("application/adobe-page-template+xml", MediaGroup::Misc, ResourceKind::Xml),
    ("application/smil+xml", MediaGroup::Misc, ResourceKind::Xml),
    ("application/pls+xml", MediaGroup::Misc, ResourceKind::Xml),
    ("application/javascript", MediaGroup::Misc, ResourceKind::Misc),
    ("text/javascript", MediaGroup::Misc, ResourceKind::Misc),
    ("text/plain", MediaGroup::Misc, ResourceKind::Misc),
    ("application/x-dtbncx+xml", MediaGroup::Other, ResourceKind::Ncx),
    ("application/oebps-package+xml", MediaGroup::Other, ResourceKind::Opf),
    ("application/pdf", MediaGroup::Misc, ResourceKind::Other),
];

/// Extension and media type lookup tables.
#[derive(Debug, Clone)]
pub struct MediaTypes {
    by_extension: HashMap<String, String>,
    by_media_type: HashMap<String, (MediaGroup, ResourceKind)>,
}

impl MediaTypes {
    /// The built-in table
    pub fn builtin() -> Self {
        Self {
            by_extension: EXTENSIONS
                .iter()
                .map(|(ext, mt)| (ext.to_string(), mt.to_string()))
                .collect(),
            by_media_type: MEDIA_TYPES
                .iter()
                .map(|(mt, group, kind)| (mt.to_string(), (*group, *kind)))
                .collect(),
        }
    }

    /// Layer extension → media type overrides over this table.
    ///
    /// Extensions are matched case-insensitively, so keys are lowercased.
    pub fn with_overrides<'a>(
        mut self,
        overrides: impl IntoIterator<Item = (&'a String, &'a String)>,
    ) -> Self {
        for (ext, media_type) in overrides {
            self.by_extension
                .insert(ext.trim_start_matches('.').to_lowercase(), media_type.clone());
        }
        self
    }
}

impl Default for MediaTypes {
    fn default() -> Self {
        Self::builtin()
    }
}

impl MediaClassifier for MediaTypes {
    fn media_type_for_extension(&self, extension: &str) -> Option<String> {
        self.by_extension.get(&extension.to_lowercase()).cloned()
    }

    fn group_for_media_type(&self, media_type: &str) -> Option<MediaGroup> {
        self.by_media_type
            .get(&media_type.to_lowercase())
            .map(|(group, _)| *group)
    }

    fn kind_for_media_type(&self, media_type: &str) -> Option<ResourceKind> {
        self.by_media_type
            .get(&media_type.to_lowercase())
            .map(|(_, kind)| *kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_extension_has_a_known_media_type() {
        let table = MediaTypes::builtin();
        for (ext, _) in EXTENSIONS {
            let mt = table.media_type_for_extension(ext).unwrap();
            assert!(table.kind_for_media_type(&mt).is_some(), "{ext} -> {mt}");
        }
    }

    #[test]
    fn test_extension_lookup_ignores_case() {
        let table = MediaTypes::builtin();
        assert_eq!(
            table.media_type_for_extension("JPG").as_deref(),
            Some("image/jpeg")
        );
    }

    #[test]
    fn test_overrides_replace_builtin_entries() {
        let overrides: HashMap<String, String> =
            [(".TXT".to_string(), "application/xml".to_string())].into_iter().collect();
        let table = MediaTypes::builtin().with_overrides(&overrides);
        assert_eq!(
            table.media_type_for_extension("txt").as_deref(),
            Some("application/xml")
        );
    }
}
