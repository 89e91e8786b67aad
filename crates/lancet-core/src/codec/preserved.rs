//! The preserved-part store: byte-exact pass-through of parts the domain
//! model does not own.
//!
//! This is the mechanism that makes surgical writes safe. Charts, pivot
//! caches, VBA projects, and every other unmodelled part flow from the
//! source archive to the output archive as raw compressed bytes; they are
//! never parsed, so they cannot be corrupted. Parsed-and-reserialized
//! chart XML is not a chart.

use std::collections::BTreeSet;
use std::fs::File;
use std::io::{Seek, Write};
use std::path::{Path, PathBuf};

use zip::{ZipArchive, ZipWriter};

use crate::error::{Error, Result};
use crate::source::ManifestEntry;

/// Factory for scoped read handles on the source archive.
pub struct PreservedPartStore {
    path: PathBuf,
}

impl PreservedPartStore {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Open the source archive read-only. The handle owns the file and
    /// releases it on drop, on every exit path.
    pub fn open(&self) -> Result<PreservedPartHandle> {
        let file = File::open(&self.path)?;
        let archive = ZipArchive::new(file).map_err(|e| Error::CorruptZip(e.to_string()))?;
        Ok(PreservedPartHandle { archive })
    }
}

/// A scoped handle over the opened source archive.
pub struct PreservedPartHandle {
    archive: ZipArchive<File>,
}

impl PreservedPartHandle {
    pub fn exists(&self, entry_name: &str) -> bool {
        self.archive.file_names().any(|n| n == entry_name)
    }

    pub fn list_all(&self) -> BTreeSet<String> {
        self.archive.file_names().map(|n| n.to_string()).collect()
    }

    /// Pipe the entry's compressed bytes into the output archive without
    /// decompressing, keeping the original method so local-header CRC and
    /// sizes stay valid. The entry is verified against the manifest first;
    /// a disagreement means the archive is not the one that was read.
    pub fn stream_to<W: Write + Seek>(
        &mut self,
        entry: &ManifestEntry,
        zip_out: &mut ZipWriter<W>,
    ) -> Result<()> {
        let index = self
            .archive
            .index_for_name(&entry.name)
            .ok_or_else(|| Error::MissingPart(entry.name.clone()))?;
        let file = self
            .archive
            .by_index_raw(index)
            .map_err(|e| Error::CorruptZip(e.to_string()))?;
        if file.size() != entry.uncompressed_size || file.crc32() != entry.crc32 {
            return Err(Error::SizeMismatch {
                entry: entry.name.clone(),
            });
        }
        log::debug!(
            "preserving {} ({} bytes, {:?})",
            entry.name,
            entry.uncompressed_size,
            entry.compression
        );
        zip_out
            .raw_copy_file(file)
            .map_err(|e| Error::CorruptZip(e.to_string()))
    }
}
