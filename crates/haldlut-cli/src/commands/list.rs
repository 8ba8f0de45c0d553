//! List the LUTs in a library directory.

use anyhow::{Context, Result};

use crate::ListArgs;
use crate::config::default_lut_dir;
use crate::library::LutLibrary;

pub fn run(args: ListArgs) -> Result<()> {
    let library = LutLibrary::new(args.dir.unwrap_or_else(default_lut_dir));
    let names = library
        .list()
        .with_context(|| format!("failed to list {}", library.root().display()))?;

    if names.is_empty() {
        tracing::info!(dir = %library.root().display(), "no LUTs found");
    }
    for name in names {
        println!("{name}");
    }
    Ok(())
}
