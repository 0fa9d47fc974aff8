use crate::error::{Result, SoilScanError};
use std::fs::{self, File};
use std::io;
use std::path::Path;
use tempfile::NamedTempFile;

/// Copy the bundled dataset to `dest` unless it is already there.
///
/// Returns `true` only for the call that put the file in place. The copy is
/// staged in a temporary sibling and linked into place without overwriting,
/// so concurrent callers never observe a partially written destination.
pub fn ensure_dataset(bundled: &Path, dest: &Path) -> Result<bool> {
    if dest.exists() {
        tracing::debug!(path = %dest.display(), "Crop dataset already present");
        return Ok(false);
    }

    if !bundled.is_file() {
        return Err(SoilScanError::DataSourceUnavailable(format!(
            "bundled dataset {} not found",
            bundled.display()
        )));
    }

    let parent = match dest.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;

    let mut staging = NamedTempFile::new_in(parent)?;
    io::copy(&mut File::open(bundled)?, staging.as_file_mut())?;
    staging.as_file().sync_all()?;

    match staging.persist_noclobber(dest) {
        Ok(_) => {
            tracing::info!(
                from = %bundled.display(),
                to = %dest.display(),
                "Copied bundled crop dataset"
            );
            Ok(true)
        }
        // Lost the race: keep the winner's file. The staging file is removed on drop.
        Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists || dest.exists() => {
            tracing::debug!(path = %dest.display(), "Crop dataset placed by another caller");
            Ok(false)
        }
        Err(e) => Err(e.error.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::Arc;
    use std::thread;
    use tempfile::TempDir;

    fn bundled_file(dir: &TempDir, contents: &[u8]) -> PathBuf {
        let path = dir.path().join("assets").join("cropDataset.db");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn copies_once_then_noops() {
        let dir = TempDir::new().unwrap();
        let bundled = bundled_file(&dir, b"crop rows");
        let dest = dir.path().join("SQLite").join("cropDataset.db");

        assert!(ensure_dataset(&bundled, &dest).unwrap());
        assert_eq!(fs::read(&dest).unwrap(), b"crop rows");

        fs::write(&bundled, b"changed").unwrap();
        assert!(!ensure_dataset(&bundled, &dest).unwrap());
        assert_eq!(fs::read(&dest).unwrap(), b"crop rows");
    }

    #[test]
    fn existing_destination_needs_no_bundle() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("cropDataset.db");
        fs::write(&dest, b"already here").unwrap();

        let missing = dir.path().join("nope.db");
        assert!(!ensure_dataset(&missing, &dest).unwrap());
    }

    #[test]
    fn missing_bundle_is_an_error() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("out").join("cropDataset.db");
        let err = ensure_dataset(&dir.path().join("nope.db"), &dest).unwrap_err();
        assert!(matches!(err, SoilScanError::DataSourceUnavailable(_)));
        assert!(!dest.exists());
    }

    #[test]
    fn concurrent_setup_leaves_one_complete_file() {
        let dir = TempDir::new().unwrap();
        let payload: Vec<u8> = (0..64 * 1024).map(|i| (i % 251) as u8).collect();
        let bundled = Arc::new(bundled_file(&dir, &payload));
        let dest = Arc::new(dir.path().join("SQLite").join("cropDataset.db"));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let bundled = Arc::clone(&bundled);
                let dest = Arc::clone(&dest);
                thread::spawn(move || ensure_dataset(&bundled, &dest).unwrap())
            })
            .collect();
        let copied = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|&placed| placed)
            .count();

        assert_eq!(copied, 1);
        assert_eq!(fs::read(dest.as_path()).unwrap(), payload);
        let entries: Vec<_> = fs::read_dir(dest.parent().unwrap())
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(entries, ["cropDataset.db"]);
    }
}
