//! Directory-backed listing store.
//!
//! Every `*.json` file in the data directory is read on `load`. `save`
//! rewrites the single canonical file and removes the other files it
//! merged, so the directory converges to one file.

use crate::error::{Result, ScoutError};
use crate::models::{EntriesFile, ListingRecord};
use chrono::NaiveDate;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const CANONICAL_FILE_NAME: &str = "listings.json";

/// Listings in insertion order plus a url index for dedup.
#[derive(Debug)]
pub struct ListingStore {
    dir: PathBuf,
    entries: Vec<ListingRecord>,
    urls: HashSet<String>,
    /// Non-canonical files read by `load`, removed on the next `save`.
    merged_files: Vec<PathBuf>,
}

impl ListingStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            entries: Vec::new(),
            urls: HashSet::new(),
            merged_files: Vec::new(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn canonical_path(&self) -> PathBuf {
        self.dir.join(CANONICAL_FILE_NAME)
    }

    /// Read every store file in the directory, creating the directory if it
    /// is missing. Files are taken in path order. One bad file fails the
    /// whole load and leaves the store as it was.
    pub fn load(&mut self) -> Result<()> {
        fs::create_dir_all(&self.dir).map_err(|e| ScoutError::store_io(&self.dir, e))?;

        let files = self.store_files()?;
        let mut decoded = Vec::with_capacity(files.len());
        for path in &files {
            let raw = fs::read_to_string(path).map_err(|e| ScoutError::store_io(path, e))?;
            let file: EntriesFile = serde_json::from_str(&raw)
                .map_err(|source| ScoutError::MalformedStoreFile {
                    path: path.clone(),
                    source,
                })?;
            debug!("Read {} entries from {}", file.entries.len(), path.display());
            decoded.push(file);
        }

        for record in decoded.into_iter().flat_map(|file| file.entries) {
            if self.contains(&record.url) {
                debug!("Skipping {} already loaded from another file", record.url);
                continue;
            }
            self.insert(record);
        }

        let canonical = self.canonical_path();
        self.merged_files = files.into_iter().filter(|path| *path != canonical).collect();

        info!("Loaded {} listings from {}", self.len(), self.dir.display());
        Ok(())
    }

    fn store_files(&self) -> Result<Vec<PathBuf>> {
        let read_dir = fs::read_dir(&self.dir).map_err(|e| ScoutError::store_io(&self.dir, e))?;

        let mut files = Vec::new();
        for entry in read_dir {
            let path = entry.map_err(|e| ScoutError::store_io(&self.dir, e))?.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    pub fn contains(&self, url: &str) -> bool {
        self.urls.contains(url)
    }

    /// Add a record that is not stored yet. Callers check `contains` first.
    pub fn append(&mut self, record: ListingRecord) -> Result<()> {
        if self.contains(record.key()) {
            return Err(ScoutError::DuplicateKey { url: record.url });
        }
        self.insert(record);
        Ok(())
    }

    fn insert(&mut self, record: ListingRecord) {
        self.urls.insert(record.key().to_string());
        self.entries.push(record);
    }

    /// Write the whole store over the canonical file, then drop the other
    /// files the last `load` merged in.
    pub fn save(&mut self) -> Result<()> {
        fs::create_dir_all(&self.dir).map_err(|e| ScoutError::store_io(&self.dir, e))?;

        let path = self.canonical_path();
        let file = EntriesFileRef {
            entries: &self.entries,
        };
        let json = serde_json::to_string(&file).map_err(|source| ScoutError::MalformedStoreFile {
            path: path.clone(),
            source,
        })?;
        fs::write(&path, json).map_err(|e| ScoutError::store_io(&path, e))?;

        for merged in std::mem::take(&mut self.merged_files) {
            match fs::remove_file(&merged) {
                Ok(()) => debug!("Removed merged store file {}", merged.display()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(ScoutError::store_io(&merged, e)),
            }
        }

        debug!("Saved {} listings to {}", self.len(), path.display());
        Ok(())
    }

    /// Date of the most recently inserted record, which is not
    /// necessarily the latest date in the store.
    pub fn last_entry_date(&self) -> Result<NaiveDate> {
        self.entries
            .last()
            .map(|record| record.date_added)
            .ok_or(ScoutError::EmptyStore)
    }

    pub fn entries(&self) -> &[ListingRecord] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(serde::Serialize)]
struct EntriesFileRef<'a> {
    entries: &'a [ListingRecord],
}
