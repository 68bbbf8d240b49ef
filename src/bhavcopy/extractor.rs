//! ZIP extraction

use crate::error::{AppError, Result};
use std::fs::File;
use std::path::{Path, PathBuf};
use zip::ZipArchive;

/// Unpack every entry of `archive` into `dest`, creating `dest` if needed.
///
/// Returns the paths of the extracted files. Runs on the blocking pool and
/// finishes before the caller continues.
pub async fn extract(archive: &Path, dest: &Path) -> Result<Vec<PathBuf>> {
    let archive = archive.to_path_buf();
    let dest = dest.to_path_buf();

    tokio::task::spawn_blocking(move || extract_blocking(&archive, &dest))
        .await
        .map_err(|e| AppError::Internal(format!("Extraction task failed: {}", e)))?
}

fn extract_blocking(archive: &Path, dest: &Path) -> Result<Vec<PathBuf>> {
    let file = File::open(archive).map_err(|e| {
        AppError::Filesystem(format!("Cannot open archive {:?}: {}", archive, e))
    })?;

    let mut zip = ZipArchive::new(file)?;
    let files: Vec<PathBuf> = zip
        .file_names()
        .filter(|name| !name.ends_with('/'))
        .map(|name| dest.join(name))
        .collect();

    std::fs::create_dir_all(dest)?;
    zip.extract(dest)?;

    tracing::info!("Extracted {} file(s) from {:?} into {:?}", files.len(), archive, dest);
    Ok(files)
}
