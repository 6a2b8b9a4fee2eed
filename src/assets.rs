//! Read-only access to the template, background, and font assets. Nothing
//! here mutates the filesystem; rendering only ever reads.

use crate::error::ContractError;
use crate::pdf::{Font, Image};
use std::path::{Path, PathBuf};

/// System locations tried when the assets directory bundles no fonts. All
/// listed faces carry Arabic coverage.
const SYSTEM_FONTS: &[(&str, &str)] = &[
    (
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    ),
    (
        "/usr/share/fonts/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/dejavu/DejaVuSans-Bold.ttf",
    ),
    (
        "/usr/share/fonts/TTF/DejaVuSans.ttf",
        "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
    ),
    (
        "/usr/share/fonts/truetype/freefont/FreeSans.ttf",
        "/usr/share/fonts/truetype/freefont/FreeSansBold.ttf",
    ),
    (
        "/usr/share/fonts/truetype/noto/NotoNaskhArabic-Regular.ttf",
        "/usr/share/fonts/truetype/noto/NotoNaskhArabic-Bold.ttf",
    ),
];

/// The asset store: template catalog and markup files under `templates/`,
/// background images under `backgrounds/`, optional bundled fonts under
/// `fonts/`. Fonts are read eagerly at open so a missing font surfaces
/// before any rendering starts.
pub struct AssetStore {
    root: PathBuf,
    regular: Vec<u8>,
    bold: Vec<u8>,
}

impl AssetStore {
    pub fn open(root: &Path) -> Result<AssetStore, ContractError> {
        if !root.is_dir() {
            return Err(ContractError::asset(root, "assets directory does not exist"));
        }
        let (regular, bold) = Self::find_fonts(root)?;
        Ok(AssetStore {
            root: root.to_path_buf(),
            regular,
            bold,
        })
    }

    /// Bundled fonts win over system fonts; a bundled or system bold face
    /// is optional and falls back to the regular face
    fn find_fonts(root: &Path) -> Result<(Vec<u8>, Vec<u8>), ContractError> {
        let fonts_dir = root.join("fonts");
        if fonts_dir.is_dir() {
            let mut regular: Option<PathBuf> = None;
            let mut bold: Option<PathBuf> = None;
            let mut entries: Vec<PathBuf> = std::fs::read_dir(&fonts_dir)
                .map_err(|e| ContractError::asset(&fonts_dir, e))?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|p| {
                    p.extension()
                        .map(|ext| ext.eq_ignore_ascii_case("ttf") || ext.eq_ignore_ascii_case("otf"))
                        .unwrap_or(false)
                })
                .collect();
            entries.sort();
            for path in entries {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_lowercase())
                    .unwrap_or_default();
                if name.contains("bold") {
                    bold.get_or_insert(path);
                } else {
                    regular.get_or_insert(path);
                }
            }
            if let Some(regular) = regular {
                let regular_bytes =
                    std::fs::read(&regular).map_err(|e| ContractError::asset(&regular, e))?;
                let bold_bytes = match bold {
                    Some(bold) => {
                        std::fs::read(&bold).map_err(|e| ContractError::asset(&bold, e))?
                    }
                    None => regular_bytes.clone(),
                };
                return Ok((regular_bytes, bold_bytes));
            }
        }

        for &(regular, bold) in SYSTEM_FONTS {
            let regular = Path::new(regular);
            if regular.is_file() {
                let regular_bytes =
                    std::fs::read(regular).map_err(|e| ContractError::asset(regular, e))?;
                let bold_bytes = std::fs::read(bold).unwrap_or_else(|_| regular_bytes.clone());
                return Ok((regular_bytes, bold_bytes));
            }
        }

        Err(ContractError::asset(
            fonts_dir,
            "no usable TTF/OTF font found in the assets directory or any known system location",
        ))
    }

    /// Path of the template catalog (`templates/config.json`)
    pub fn catalog_path(&self) -> PathBuf {
        self.root.join("templates").join("config.json")
    }

    /// Read a markup template by its catalog name
    pub fn template_source(&self, name: &str) -> Result<(String, PathBuf), ContractError> {
        let path = self.root.join("templates").join(name);
        let source = std::fs::read_to_string(&path)
            .map_err(|e| ContractError::asset(&path, format!("cannot read template: {e}")))?;
        Ok((source, path))
    }

    /// Load a background image by its catalog name; fails closed when the
    /// asset is missing, no blank-background fallback
    pub fn background(&self, name: &str) -> Result<Image, ContractError> {
        let path = self.root.join("backgrounds").join(name);
        if !path.is_file() {
            return Err(ContractError::asset(&path, "background image does not exist"));
        }
        Image::from_file(&path)
            .map_err(|e| ContractError::asset(&path, format!("cannot load background: {e}")))
    }

    /// Parse fresh font faces for one document. Faces own their bytes, so
    /// each document gets its own copies.
    pub fn fonts(&self) -> Result<(Font, Font), ContractError> {
        let regular = Font::load(self.regular.clone()).map_err(ContractError::Render)?;
        let bold = Font::load(self.bold.clone()).map_err(ContractError::Render)?;
        Ok((regular, bold))
    }
}
