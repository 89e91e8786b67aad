//! Source bookkeeping for surgical writes: the part manifest, the
//! modification tracker, and the source fingerprint.
//!
//! A [`SourceContext`] is attached to every workbook read from disk. It
//! records what the reader saw (every ZIP entry, parsed or preserved),
//! what has changed since (the tracker), and the bytes it saw it in (the
//! fingerprint). The writer refuses a surgical write when the fingerprint
//! no longer matches the file -- the manifest would be describing a
//! different archive.

use std::collections::BTreeSet;
use std::io::Read;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use lancet_xml::content_types::ContentTypes;
use lancet_xml::relationships::Relationships;
use lancet_xml::shared_strings::StringItem;
use lancet_xml::styles::StyleSheetXml;
use lancet_xml::workbook::WorkbookXml;

use crate::error::{Error, Result};

/// ZIP compression method of a part. Preserved entries are re-emitted with
/// their original method so local-header CRC and sizes stay valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionKind {
    Stored,
    Deflated,
}

/// One ZIP entry as the reader observed it.
#[derive(Debug, Clone, PartialEq)]
pub struct ManifestEntry {
    pub name: String,
    pub uncompressed_size: u64,
    pub compressed_size: u64,
    pub crc32: u32,
    pub compression: CompressionKind,
    /// Parsed into the domain model (writer regenerates) or preserved
    /// (writer streams the original bytes).
    pub parsed: bool,
}

/// Every entry the reader saw, in archive order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartManifest {
    entries: Vec<ManifestEntry>,
}

impl PartManifest {
    pub fn push(&mut self, entry: ManifestEntry) {
        self.entries.push(entry);
    }

    pub fn get(&self, name: &str) -> Option<&ManifestEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ManifestEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn mark_parsed(&mut self, name: &str) {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.name == name) {
            entry.parsed = true;
        }
    }
}

/// Size and SHA-256 of the source file at read time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceFingerprint {
    pub len: u64,
    pub sha256: [u8; 32],
}

impl SourceFingerprint {
    /// Fingerprint a byte slice (used when reading from memory).
    pub fn of_bytes(bytes: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        Self {
            len: bytes.len() as u64,
            sha256: hasher.finalize().into(),
        }
    }

    /// Stream a file through SHA-256.
    pub fn of_file(path: &Path) -> Result<Self> {
        let mut file = std::fs::File::open(path)?;
        let mut hasher = Sha256::new();
        let mut len = 0u64;
        let mut buf = [0u8; 64 * 1024];
        loop {
            let n = file.read(&mut buf)?;
            if n == 0 {
                break;
            }
            hasher.update(&buf[..n]);
            len += n as u64;
        }
        Ok(Self {
            len,
            sha256: hasher.finalize().into(),
        })
    }
}

/// What has changed since read. Sheet indices refer to the ORIGINAL sheet
/// order recorded at read time, so they stay stable across removals and
/// reorders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModificationTracker {
    pub modified_sheets: BTreeSet<usize>,
    pub deleted_sheets: BTreeSet<usize>,
    pub reordered: bool,
    pub metadata: bool,
}

impl ModificationTracker {
    pub fn is_clean(&self) -> bool {
        self.modified_sheets.is_empty()
            && self.deleted_sheets.is_empty()
            && !self.reordered
            && !self.metadata
    }

    pub fn mark_sheet_modified(&mut self, original_index: usize) {
        self.modified_sheets.insert(original_index);
    }

    pub fn mark_sheet_deleted(&mut self, original_index: usize) {
        self.deleted_sheets.insert(original_index);
        self.modified_sheets.remove(&original_index);
    }

    pub fn mark_reordered(&mut self) {
        self.reordered = true;
    }

    pub fn mark_metadata(&mut self) {
        self.metadata = true;
    }
}

/// Everything the writer needs to reproduce the unchanged parts of the
/// source file.
#[derive(Debug, Clone)]
pub struct SourceContext {
    /// Where the source lives; the preserved-part store reopens this path
    /// at write time.
    pub path: PathBuf,
    pub fingerprint: SourceFingerprint,
    pub manifest: PartManifest,
    pub tracker: ModificationTracker,

    /// Original parsed package parts, kept so regeneration can patch
    /// rather than rebuild.
    pub(crate) content_types: ContentTypes,
    pub(crate) package_rels: Relationships,
    pub(crate) workbook_xml: WorkbookXml,
    pub(crate) workbook_rels: Relationships,
    pub(crate) stylesheet: StyleSheetXml,
    /// Original shared-string items in file order; the writer appends new
    /// strings after these so existing indices never move.
    pub(crate) shared_strings: Vec<StringItem>,
    /// Original sheet index -> worksheet part path.
    pub(crate) sheet_parts: Vec<String>,
    /// Original sheet index -> non-cell worksheet bits that a regenerated
    /// part must carry forward.
    pub(crate) scaffolds: Vec<SheetScaffold>,
    /// Current workbook sheet index -> original sheet index; `None` for
    /// sheets added after read.
    pub(crate) origin: Vec<Option<usize>>,
}

/// The pieces of a source worksheet the domain model does not carry but a
/// regenerated part must keep: relationship-id references into the
/// untouched sheet rels, and the original hyperlink/table elements.
#[derive(Debug, Clone, Default)]
pub(crate) struct SheetScaffold {
    /// The original `<sheet>` entry from `xl/workbook.xml`, kept so a
    /// regenerated workbook part reuses the exact sheetId and rId.
    pub workbook_entry: Option<lancet_xml::workbook::SheetEntry>,
    pub drawing_rid: Option<String>,
    pub legacy_drawing_rid: Option<String>,
    pub hyperlinks: Option<lancet_xml::worksheet::Hyperlinks>,
    pub table_parts: Option<lancet_xml::worksheet::TableParts>,
    pub sheet_format_pr: Option<lancet_xml::worksheet::SheetFormatPr>,
    /// ZIP path of the sheet's comments part, when it has one.
    pub comments_part: Option<String>,
}

impl SourceContext {
    /// Verify the source file still matches the fingerprint captured at
    /// read time. Mandatory before any surgical write: manifest offsets
    /// are only meaningful for the exact bytes that were read.
    pub fn verify_fingerprint(&self) -> Result<()> {
        let current = SourceFingerprint::of_file(&self.path)?;
        if current != self.fingerprint {
            return Err(Error::SourceMutated {
                path: self.path.display().to_string(),
            });
        }
        Ok(())
    }

    /// The original sheet index behind a current sheet index, if the sheet
    /// came from the source file.
    pub fn origin_of(&self, current_index: usize) -> Option<usize> {
        self.origin.get(current_index).copied().flatten()
    }

    /// The worksheet part path for an original sheet index.
    pub fn sheet_part(&self, original_index: usize) -> Option<&str> {
        self.sheet_parts.get(original_index).map(|s| s.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, parsed: bool) -> ManifestEntry {
        ManifestEntry {
            name: name.to_string(),
            uncompressed_size: 10,
            compressed_size: 8,
            crc32: 0,
            compression: CompressionKind::Deflated,
            parsed,
        }
    }

    #[test]
    fn test_manifest_lookup() {
        let mut manifest = PartManifest::default();
        manifest.push(entry("xl/workbook.xml", true));
        manifest.push(entry("xl/media/image1.png", false));
        assert!(manifest.contains("xl/workbook.xml"));
        assert!(!manifest.get("xl/media/image1.png").unwrap().parsed);
        assert_eq!(manifest.len(), 2);
    }

    #[test]
    fn test_manifest_mark_parsed() {
        let mut manifest = PartManifest::default();
        manifest.push(entry("xl/styles.xml", false));
        manifest.mark_parsed("xl/styles.xml");
        assert!(manifest.get("xl/styles.xml").unwrap().parsed);
    }

    #[test]
    fn test_tracker_clean_transitions() {
        let mut tracker = ModificationTracker::default();
        assert!(tracker.is_clean());
        tracker.mark_sheet_modified(0);
        assert!(!tracker.is_clean());

        let mut tracker = ModificationTracker::default();
        tracker.mark_metadata();
        assert!(!tracker.is_clean());

        let mut tracker = ModificationTracker::default();
        tracker.mark_reordered();
        assert!(!tracker.is_clean());
    }

    #[test]
    fn test_tracker_delete_supersedes_modify() {
        let mut tracker = ModificationTracker::default();
        tracker.mark_sheet_modified(1);
        tracker.mark_sheet_deleted(1);
        assert!(tracker.modified_sheets.is_empty());
        assert!(tracker.deleted_sheets.contains(&1));
    }

    #[test]
    fn test_fingerprint_of_bytes() {
        let a = SourceFingerprint::of_bytes(b"hello");
        let b = SourceFingerprint::of_bytes(b"hello");
        let c = SourceFingerprint::of_bytes(b"hellp");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len, 5);
    }

    #[test]
    fn test_fingerprint_of_file_matches_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.bin");
        std::fs::write(&path, b"some zip bytes").unwrap();
        let from_file = SourceFingerprint::of_file(&path).unwrap();
        let from_bytes = SourceFingerprint::of_bytes(b"some zip bytes");
        assert_eq!(from_file, from_bytes);
    }
}
