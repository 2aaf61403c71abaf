// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Storage layout: the transient raw-capture file and the public pictures
// directory accepted scans are saved into.

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use docsnap_core::error::Result;
use docsnap_core::{OutputFormat, ScannerConfig};
use tracing::{debug, info, warn};

/// Prefix of every saved scan's file name.
pub const SCAN_FILE_PREFIX: &str = "scan_picture_";

/// Where captures live on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanStorage {
    transient_path: PathBuf,
    pictures_dir: PathBuf,
}

impl ScanStorage {
    pub fn new(transient_path: impl Into<PathBuf>, pictures_dir: impl Into<PathBuf>) -> Self {
        Self {
            transient_path: transient_path.into(),
            pictures_dir: pictures_dir.into(),
        }
    }

    /// Layout for `data_dir`, honouring the config's file name and pictures
    /// directory override.
    pub fn from_config(data_dir: &Path, config: &ScannerConfig) -> Self {
        let pictures_dir = config
            .pictures_dir
            .clone()
            .unwrap_or_else(default_pictures_dir);
        Self::new(data_dir.join(&config.transient_file_name), pictures_dir)
    }

    /// The single well-known path raw stills are written to.
    pub fn transient_path(&self) -> &Path {
        &self.transient_path
    }

    pub fn pictures_dir(&self) -> &Path {
        &self.pictures_dir
    }

    /// Create the transient file's directory and the pictures directory.
    pub fn ensure_dirs(&self) -> Result<()> {
        if let Some(parent) = self.transient_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::create_dir_all(&self.pictures_dir)?;
        Ok(())
    }

    /// Delete the transient file. Returns whether a file was removed; a file
    /// that is already gone is not an error.
    pub fn remove_transient(&self) -> Result<bool> {
        match std::fs::remove_file(&self.transient_path) {
            Ok(()) => {
                debug!(path = %self.transient_path.display(), "Transient capture removed");
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// A fresh path for a scan saved at `timestamp`. If a scan from the same
    /// second already exists a numeric suffix is appended.
    pub fn scan_path(&self, timestamp: NaiveDateTime, format: OutputFormat) -> PathBuf {
        let candidate = self.pictures_dir.join(scan_file_name(timestamp, format));
        if !candidate.exists() {
            return candidate;
        }
        let stem = format!(
            "{SCAN_FILE_PREFIX}{}",
            timestamp.format("%Y-%m-%d_%H-%M-%S")
        );
        (1u32..)
            .map(|n| {
                self.pictures_dir
                    .join(format!("{stem}_{n}.{}", format.extension()))
            })
            .find(|p| !p.exists())
            .unwrap_or(candidate)
    }

    /// Write `bytes` to `path` inside the pictures directory so that the
    /// final file either holds the complete contents or does not exist.
    /// An existing file at `path` is never replaced.
    pub fn write_atomic(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        let dir = path.parent().unwrap_or(self.pictures_dir.as_path());
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist_noclobber(path).map_err(|e| {
            warn!(path = %path.display(), error = %e.error, "Could not move scan into place");
            e.error
        })?;
        info!(path = %path.display(), bytes = bytes.len(), "Scan written");
        Ok(())
    }
}

/// `scan_picture_<YYYY-MM-DD_HH-mm-ss>.<ext>`
pub fn scan_file_name(timestamp: NaiveDateTime, format: OutputFormat) -> String {
    format!(
        "{SCAN_FILE_PREFIX}{}.{}",
        timestamp.format("%Y-%m-%d_%H-%M-%S"),
        format.extension()
    )
}

/// Application data directory.
///
/// On desktop this uses a conventional location. On mobile the platform
/// bridge should provide the app's private files directory instead.
pub fn default_data_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_DATA_HOME") {
        return PathBuf::from(xdg).join("docsnap");
    }
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home)
            .join(".local")
            .join("share")
            .join("docsnap");
    }
    PathBuf::from("/tmp").join("docsnap")
}

/// Public pictures directory accepted scans are saved into.
pub fn default_pictures_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_PICTURES_DIR") {
        return PathBuf::from(xdg);
    }
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join("Pictures");
    }
    PathBuf::from("/tmp")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 14)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn file_name_is_timestamped() {
        assert_eq!(
            scan_file_name(at(9, 5, 7), OutputFormat::Png),
            "scan_picture_2026-03-14_09-05-07.png"
        );
        assert_eq!(
            scan_file_name(at(23, 59, 59), OutputFormat::Jpeg),
            "scan_picture_2026-03-14_23-59-59.jpg"
        );
    }

    #[test]
    fn same_second_scans_get_a_suffix() {
        let dir = tempfile::tempdir().unwrap();
        let storage = ScanStorage::new(dir.path().join("photo.jpg"), dir.path());
        let first = storage.scan_path(at(10, 0, 0), OutputFormat::Png);
        std::fs::write(&first, b"x").unwrap();
        let second = storage.scan_path(at(10, 0, 0), OutputFormat::Png);
        assert_ne!(first, second);
        assert!(second.ends_with("scan_picture_2026-03-14_10-00-00_1.png"));
    }

    #[test]
    fn removing_missing_transient_is_fine() {
        let dir = tempfile::tempdir().unwrap();
        let storage = ScanStorage::new(dir.path().join("photo.jpg"), dir.path());
        assert!(!storage.remove_transient().unwrap());
        std::fs::write(storage.transient_path(), b"raw").unwrap();
        assert!(storage.remove_transient().unwrap());
        assert!(!storage.transient_path().exists());
    }

    #[test]
    fn atomic_write_leaves_only_the_final_file() {
        let dir = tempfile::tempdir().unwrap();
        let storage = ScanStorage::new(dir.path().join("photo.jpg"), dir.path());
        let path = storage.scan_path(at(12, 0, 0), OutputFormat::Png);
        storage.write_atomic(&path, b"png bytes").unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"png bytes");
        let entries = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[test]
    fn atomic_write_never_replaces_an_existing_scan() {
        let dir = tempfile::tempdir().unwrap();
        let storage = ScanStorage::new(dir.path().join("photo.jpg"), dir.path());
        let path = dir.path().join(scan_file_name(at(12, 0, 0), OutputFormat::Png));
        std::fs::write(&path, b"first").unwrap();

        assert!(storage.write_atomic(&path, b"second").is_err());
        assert_eq!(std::fs::read(&path).unwrap(), b"first");
        let entries = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[test]
    fn config_override_wins() {
        let cfg = ScannerConfig {
            pictures_dir: Some(PathBuf::from("/srv/scans")),
            ..Default::default()
        };
        let storage = ScanStorage::from_config(Path::new("/data"), &cfg);
        assert_eq!(storage.transient_path(), Path::new("/data/photo.jpg"));
        assert_eq!(storage.pictures_dir(), Path::new("/srv/scans"));
    }
}
