//! Fixed directory skeleton of a package working tree.
//!
//! ```text
//! <root>/
//! ├── META-INF/
//! │   └── container.xml
//! └── OEBPS/
//!     ├── content.opf
//!     ├── toc.ncx          (only when a navigation file exists)
//!     ├── Audio/
//!     ├── Video/
//!     ├── Images/
//!     ├── Fonts/
//!     ├── Text/
//!     ├── Styles/
//!     └── Misc/
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf, MAIN_SEPARATOR};
use std::sync::OnceLock;

use crate::domain::FolderKey;

pub const META_INF_DIR: &str = "META-INF";
pub const OEBPS_DIR: &str = "OEBPS";
pub const OPF_FILE_NAME: &str = "content.opf";
pub const NCX_FILE_NAME: &str = "toc.ncx";
pub const CONTAINER_FILE_NAME: &str = "container.xml";

/// Bootstrap file pointing readers at the package document
pub const CONTAINER_XML: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
<container version=\"1.0\" xmlns=\"urn:oasis:names:tc:opendocument:xmlns:container\">\n    \
<rootfiles>\n        \
<rootfile full-path=\"OEBPS/content.opf\" media-type=\"application/oebps-package+xml\"/>\n   \
</rootfiles>\n\
</container>\n";

/// Owner of the package folder layout and the key → LCP map.
#[derive(Debug)]
pub struct PackageLayout {
    root: PathBuf,
    meta_inf: PathBuf,
    oebps: PathBuf,
    lcp: OnceLock<BTreeMap<FolderKey, String>>,
}

impl PackageLayout {
    /// Create (if absent) the skeleton under `root` and record its paths.
    ///
    /// Safe to call repeatedly on the same root.
    pub fn create(root: impl Into<PathBuf>) -> std::io::Result<Self> {
        let root = root.into();
        let meta_inf = root.join(META_INF_DIR);
        let oebps = root.join(OEBPS_DIR);

        std::fs::create_dir_all(&meta_inf)?;
        for key in FolderKey::ALL {
            if let Some(name) = key.subfolder() {
                std::fs::create_dir_all(oebps.join(name))?;
            }
        }

        tracing::debug!("Package skeleton ready at {}", root.display());

        let layout = Self {
            root,
            meta_inf,
            oebps,
            lcp: OnceLock::new(),
        };
        layout.lcp_map();
        Ok(layout)
    }

    /// Write `META-INF/container.xml`
    pub fn write_container_xml(&self) -> std::io::Result<PathBuf> {
        let path = self.meta_inf.join(CONTAINER_FILE_NAME);
        std::fs::write(&path, CONTAINER_XML)?;
        Ok(path)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn meta_inf(&self) -> &Path {
        &self.meta_inf
    }

    pub fn oebps(&self) -> &Path {
        &self.oebps
    }

    /// Absolute path of the folder a role stores files in.
    ///
    /// OPF and NCX live directly in `OEBPS/`; `Other` is the root.
    pub fn folder(&self, key: FolderKey) -> PathBuf {
        match key.subfolder() {
            Some(name) => self.oebps.join(name),
            None if key == FolderKey::Other => self.root.clone(),
            None => self.oebps.clone(),
        }
    }

    pub fn text(&self) -> PathBuf {
        self.folder(FolderKey::Text)
    }

    pub fn styles(&self) -> PathBuf {
        self.folder(FolderKey::Styles)
    }

    pub fn images(&self) -> PathBuf {
        self.folder(FolderKey::Images)
    }

    pub fn fonts(&self) -> PathBuf {
        self.folder(FolderKey::Fonts)
    }

    pub fn audio(&self) -> PathBuf {
        self.folder(FolderKey::Audio)
    }

    pub fn video(&self) -> PathBuf {
        self.folder(FolderKey::Video)
    }

    pub fn misc(&self) -> PathBuf {
        self.folder(FolderKey::Misc)
    }

    pub fn opf_path(&self) -> PathBuf {
        self.oebps.join(OPF_FILE_NAME)
    }

    pub fn ncx_path(&self) -> PathBuf {
        self.oebps.join(NCX_FILE_NAME)
    }

    /// The key → LCP map. Built on first access and never modified after.
    pub fn lcp_map(&self) -> &BTreeMap<FolderKey, String> {
        self.lcp.get_or_init(|| {
            FolderKey::ALL
                .into_iter()
                .map(|key| (key, with_trailing_separator(&self.folder(key))))
                .collect()
        })
    }

    /// Longest common path for a folder role; always separator-terminated.
    pub fn longest_common_path(&self, key: FolderKey) -> &str {
        self.lcp_map().get(&key).map(String::as_str).unwrap_or_default()
    }
}

fn with_trailing_separator(path: &Path) -> String {
    let mut s = path.to_string_lossy().into_owned();
    if !s.ends_with(MAIN_SEPARATOR) {
        s.push(MAIN_SEPARATOR);
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_skeleton_is_created() {
        let temp = TempDir::new().unwrap();
        let layout = PackageLayout::create(temp.path()).unwrap();

        assert!(layout.meta_inf().is_dir());
        for dir in ["Audio", "Video", "Images", "Fonts", "Text", "Styles", "Misc"] {
            assert!(temp.path().join("OEBPS").join(dir).is_dir(), "{dir}");
        }
        assert_eq!(layout.text(), temp.path().join("OEBPS/Text"));
    }

    #[test]
    fn test_create_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let marker = temp.path().join("OEBPS/Text/keep.xhtml");

        PackageLayout::create(temp.path()).unwrap();
        std::fs::write(&marker, b"<html/>").unwrap();
        let again = PackageLayout::create(temp.path()).unwrap();

        assert!(marker.exists());
        assert_eq!(again.lcp_map().len(), FolderKey::ALL.len());
    }

    #[test]
    fn test_lcp_values_end_with_separator() {
        let temp = TempDir::new().unwrap();
        let layout = PackageLayout::create(temp.path()).unwrap();

        for (key, prefix) in layout.lcp_map() {
            assert!(prefix.ends_with(MAIN_SEPARATOR), "{key}: {prefix}");
        }
        assert_eq!(
            layout.longest_common_path(FolderKey::Opf),
            layout.longest_common_path(FolderKey::Ncx)
        );
        assert!(layout
            .longest_common_path(FolderKey::Styles)
            .ends_with(&format!("Styles{}", MAIN_SEPARATOR)));
    }

    #[test]
    fn test_lcp_map_is_stable() {
        let temp = TempDir::new().unwrap();
        let layout = PackageLayout::create(temp.path()).unwrap();

        let first = layout.lcp_map() as *const _;
        let second = layout.lcp_map() as *const _;
        assert_eq!(first, second);
    }

    #[test]
    fn test_container_xml_written_verbatim() {
        let temp = TempDir::new().unwrap();
        let layout = PackageLayout::create(temp.path()).unwrap();
        let path = layout.write_container_xml().unwrap();

        let written = std::fs::read_to_string(path).unwrap();
        assert_eq!(written, CONTAINER_XML);
        assert!(written.contains("full-path=\"OEBPS/content.opf\""));
        assert!(written.ends_with("   </rootfiles>\n</container>\n"));
    }
}
