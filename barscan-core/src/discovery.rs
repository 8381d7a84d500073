//! File discovery module for finding video files to analyze.
//!
//! Searches the top level of a directory for files with a known video
//! container extension (case-insensitive). Subdirectories are not searched.

use crate::error::{CoreError, CoreResult};

use std::path::{Path, PathBuf};

/// Container extensions recognised as video files.
pub const VIDEO_EXTENSIONS: &[&str] = &[
    "mkv", "mp4", "m4v", "mov", "avi", "webm", "ts", "m2ts", "mpg", "mpeg", "wmv",
];

/// Checks whether the path carries a known video extension.
#[must_use]
pub fn has_video_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| VIDEO_EXTENSIONS.iter().any(|known| ext.eq_ignore_ascii_case(known)))
        .unwrap_or(false)
}

/// Finds video files in the specified directory, sorted by path.
///
/// # Returns
///
/// * `Ok(Vec<PathBuf>)` - The discovered video files
/// * `Err(CoreError::Io)` - If the directory cannot be read
/// * `Err(CoreError::NoFilesFound)` - If no video files are found
///
/// # Examples
///
/// ```rust,no_run
/// use barscan_core::find_video_files;
/// use std::path::Path;
///
/// let files = find_video_files(Path::new("/path/to/videos")).unwrap();
/// for file in files {
///     println!("{}", file.display());
/// }
/// ```
pub fn find_video_files(input_dir: &Path) -> CoreResult<Vec<PathBuf>> {
    let read_dir = std::fs::read_dir(input_dir)?;
    let mut files: Vec<PathBuf> = read_dir
        .filter_map(|entry| {
            let path = entry.ok()?.path();
            (path.is_file() && has_video_extension(&path)).then_some(path)
        })
        .collect();

    if files.is_empty() {
        return Err(CoreError::NoFilesFound);
    }

    files.sort();
    log::debug!("Found {} video file(s) in {}", files.len(), input_dir.display());
    Ok(files)
}
