//! Subcommand implementations.

pub mod apply;
pub mod backends;
pub mod info;
pub mod list;

use std::path::Path;

use anyhow::{Context, Result};
use haldlut_core::HaldLutImage;

use crate::config::default_lut_dir;
use crate::library::{LutLibrary, load_lut};

/// `lut` names an existing file, or a LUT in `library` (default library
/// directory when `None`).
pub fn resolve_lut(lut: &str, library: Option<&Path>) -> Result<HaldLutImage> {
    let path = Path::new(lut);
    if path.is_file() {
        return load_lut(path).with_context(|| format!("failed to load LUT {}", path.display()));
    }
    let library = LutLibrary::new(library.map_or_else(default_lut_dir, Path::to_path_buf));
    library
        .load(lut)
        .with_context(|| format!("failed to resolve LUT '{lut}'"))
}
