//! Temporary directory management.
//!
//! Rasterized frames live in a scoped directory created through the tempfile
//! crate. The directory is removed when the returned `TempDir` is dropped,
//! which covers early returns and unwinding as well as normal completion.

use crate::error::CoreResult;
use std::path::Path;
use tempfile::{Builder as TempFileBuilder, TempDir};

/// Creates a temporary directory with prefix. Auto-cleaned when dropped.
///
/// Uses `base_dir` when given, otherwise the system temporary directory.
pub fn create_temp_dir(base_dir: Option<&Path>, prefix: &str) -> CoreResult<TempDir> {
    let dir = match base_dir {
        Some(base) => {
            std::fs::create_dir_all(base)?;
            TempFileBuilder::new().prefix(prefix).tempdir_in(base)?
        }
        None => TempFileBuilder::new().prefix(prefix).tempdir()?,
    };
    log::trace!("Created temporary directory {}", dir.path().display());
    Ok(dir)
}
