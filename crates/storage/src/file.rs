// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Durable backend: one append-only JSONL file per wavelet
//!
//! Files are named after the hex-encoded wavelet URI. Every line is a
//! checksummed [`DeltaEntry`]; appends are fsync'd before returning and
//! the version index is rebuilt from the file on open.
//!
//! A torn final line (crash mid-append) is truncated on open. Damage
//! followed by further valid entries is reported as corruption, since
//! dropping it would silently lose acknowledged history.

use crate::access::{DeltaStore, DeltasAccess, StoreError};
use crate::entry::DeltaEntry;
use crate::index::DeltaIndex;
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use wv_core::version::{hex_decode, hex_encode};
use wv_core::{DeltaRecord, HashedVersion, WaveletName};

/// File extension of wavelet delta logs
pub const DELTAS_EXTENSION: &str = "deltas";

/// Directory of wavelet delta logs
#[derive(Clone, Debug)]
pub struct FileDeltaStore {
    dir: PathBuf,
}

impl FileDeltaStore {
    /// Use `dir` as the store, creating it if needed
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the log for a wavelet
    pub fn path_for(&self, name: &WaveletName) -> PathBuf {
        self.dir
            .join(format!("{}.{}", hex_encode(name.to_uri().as_bytes()), DELTAS_EXTENSION))
    }

    fn name_from_path(path: &Path) -> Option<WaveletName> {
        if path.extension()? != DELTAS_EXTENSION {
            return None;
        }
        let bytes = hex_decode(path.file_stem()?.to_str()?)?;
        String::from_utf8(bytes).ok()?.parse().ok()
    }
}

impl DeltaStore for FileDeltaStore {
    fn open(&self, name: &WaveletName) -> Result<Box<dyn DeltasAccess>, StoreError> {
        let access = FileDeltasAccess::open(self.path_for(name), name.clone())?;
        Ok(Box::new(access))
    }

    fn delete(&self, name: &WaveletName) -> Result<(), StoreError> {
        match fs::remove_file(self.path_for(name)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn list_wavelets(&self) -> Result<Vec<WaveletName>, StoreError> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            match Self::name_from_path(&path) {
                Some(name) => names.push(name),
                None if path.extension().is_some_and(|e| e == DELTAS_EXTENSION) => {
                    tracing::warn!(path = %path.display(), "skipping delta log with unparsable name");
                }
                None => {}
            }
        }
        names.sort();
        Ok(names)
    }
}

/// Handle on one wavelet's delta log file
pub struct FileDeltasAccess {
    name: WaveletName,
    path: PathBuf,
    file: Option<File>,
    /// Length of the file up to the last durable entry
    len: u64,
    index: DeltaIndex,
}

impl FileDeltasAccess {
    /// Open or create the log at `path`, rebuilding the index from its entries
    ///
    /// Holds an exclusive lock on the file until closed or dropped.
    pub fn open(path: impl Into<PathBuf>, name: WaveletName) -> Result<Self, StoreError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        // One live handle per log; a second writer would index a stale tail
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        file.try_lock_exclusive().map_err(|e| {
            if e.kind() == fs2::lock_contended_error().kind() {
                StoreError::InUse(path.clone())
            } else {
                StoreError::Io(e)
            }
        })?;

        let (index, len) = Self::load(&path)?;
        if file.metadata()?.len() > len {
            tracing::warn!(
                path = %path.display(),
                valid_bytes = len,
                "truncating torn entry at end of delta log"
            );
            file.set_len(len)?;
            file.sync_all()?;
        }

        tracing::debug!(wavelet = %name, records = index.len(), "opened delta log");

        Ok(Self {
            name,
            path,
            file: Some(file),
            len,
            index,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every entry, returning the index and the byte length of the valid prefix
    fn load(path: &Path) -> Result<(DeltaIndex, u64), StoreError> {
        let mut reader = BufReader::new(File::open(path)?);
        let mut index = DeltaIndex::new();
        let mut valid_len = 0u64;
        let mut line_number = 0u64;
        // First bad line, if any; only fatal when a good entry follows it
        let mut damage: Option<(u64, String)> = None;

        loop {
            let mut raw = Vec::new();
            let bytes_read = reader.read_until(b'\n', &mut raw)?;
            if bytes_read == 0 {
                break;
            }
            line_number += 1;

            let line = match std::str::from_utf8(&raw) {
                Ok(line) => line,
                Err(e) => {
                    if damage.is_none() {
                        damage = Some((line_number, e.to_string()));
                    }
                    continue;
                }
            };
            let trimmed = line.trim();
            if trimmed.is_empty() {
                if damage.is_none() {
                    valid_len += bytes_read as u64;
                }
                continue;
            }

            let parsed = match DeltaEntry::from_line(trimmed) {
                Ok(_) if !line.ends_with('\n') => Err("entry missing line terminator".to_string()),
                Ok(entry) if !entry.verify() => Err("checksum mismatch".to_string()),
                Ok(entry) => Ok(entry),
                Err(e) => Err(e.to_string()),
            };

            match (parsed, &damage) {
                (Ok(_), Some((line, reason))) => {
                    return Err(StoreError::Corrupted {
                        path: path.to_path_buf(),
                        line: *line,
                        reason: reason.clone(),
                    });
                }
                (Ok(entry), None) => {
                    index
                        .extend(vec![entry.record])
                        .map_err(|e| StoreError::Corrupted {
                            path: path.to_path_buf(),
                            line: line_number,
                            reason: e.to_string(),
                        })?;
                    valid_len += bytes_read as u64;
                }
                (Err(reason), None) => damage = Some((line_number, reason)),
                (Err(_), Some(_)) => {}
            }
        }

        Ok((index, valid_len))
    }

    fn write_all(file: &mut File, buf: &[u8]) -> io::Result<()> {
        file.write_all(buf)?;
        file.sync_all()
    }
}

impl DeltasAccess for FileDeltasAccess {
    fn wavelet_name(&self) -> &WaveletName {
        &self.name
    }

    fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    fn end_version(&self) -> Option<HashedVersion> {
        self.index.end_version().cloned()
    }

    fn get_delta(&self, version: u64) -> Result<Option<Arc<DeltaRecord>>, StoreError> {
        Ok(self.index.by_start(version))
    }

    fn get_delta_by_end_version(
        &self,
        version: u64,
    ) -> Result<Option<Arc<DeltaRecord>>, StoreError> {
        Ok(self.index.by_end(version))
    }

    fn append(&mut self, records: Vec<DeltaRecord>) -> Result<(), StoreError> {
        let Some(file) = self.file.as_mut() else {
            return Err(StoreError::Closed(self.name.clone()));
        };
        self.index.check(&records)?;

        let mut buf = String::new();
        for record in &records {
            buf.push_str(&DeltaEntry::new(record.clone())?.to_line()?);
        }

        if let Err(e) = Self::write_all(file, buf.as_bytes()) {
            // Roll the file back so a later append does not follow a torn line
            if let Err(rollback) = file.set_len(self.len).and_then(|()| file.sync_all()) {
                tracing::error!(
                    path = %self.path.display(),
                    error = %rollback,
                    "failed to roll back delta log after append error"
                );
            }
            return Err(e.into());
        }

        self.len += buf.len() as u64;
        for record in records {
            self.index.push(record);
        }
        Ok(())
    }

    fn close(&mut self) -> Result<(), StoreError> {
        if let Some(file) = self.file.take() {
            file.sync_all()?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "file_tests.rs"]
mod tests;
