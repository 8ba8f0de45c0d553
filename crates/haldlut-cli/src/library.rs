//! Hald LUT discovery and loading from a directory of PNGs.

use std::path::{Path, PathBuf};

use haldlut_core::{HaldLutImage, Image, LutError};

/// A directory of Hald LUT images, addressed by file name.
#[derive(Debug, Clone)]
pub struct LutLibrary {
    root: PathBuf,
}

impl LutLibrary {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File names of every `*.png` directly under the root, sorted.
    pub fn list(&self) -> Result<Vec<String>, LibraryError> {
        let mut names = Vec::new();
        for entry in std::fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
                tracing::debug!(path = %entry.path().display(), "skipping non-UTF-8 file name");
                continue;
            };
            if is_png(&name) {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }

    /// Load the LUT called `id`. The `.png` extension may be omitted.
    pub fn load(&self, id: &str) -> Result<HaldLutImage, LibraryError> {
        if id.is_empty() || id.contains(['/', '\\']) || id == "." || id == ".." {
            return Err(LibraryError::InvalidName(id.to_owned()));
        }
        let name = if is_png(id) {
            id.to_owned()
        } else {
            format!("{id}.png")
        };
        let path = self.root.join(&name);
        if !path.is_file() {
            return Err(LibraryError::NotFound {
                id: id.to_owned(),
                root: self.root.clone(),
            });
        }
        Ok(HaldLutImage::named(name, Image::open(&path)?))
    }
}

/// Load a Hald LUT from an explicit path, named by its file name.
pub fn load_lut(path: &Path) -> Result<HaldLutImage, LibraryError> {
    let image = Image::open(path)?;
    let lut = match path.file_name().and_then(|n| n.to_str()) {
        Some(name) => HaldLutImage::named(name, image),
        None => HaldLutImage::new(image),
    };
    Ok(lut)
}

fn is_png(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("png"))
}

/// Errors from LUT discovery and loading.
#[derive(Debug, thiserror::Error)]
pub enum LibraryError {
    #[error("no LUT named '{id}' in {}", root.display())]
    NotFound { id: String, root: PathBuf },
    #[error("invalid LUT name '{0}'")]
    InvalidName(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Lut(#[from] LutError),
}
