use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use zip::result::ZipError;
use zip::ZipArchive;

use crate::config::ReaderConfig;
use crate::error::{CapError, ChannelError, Result};

// ---------------------------------------------------------------------------
// CapArchive – read-only view of the zip container
// ---------------------------------------------------------------------------

/// An opened Capstone container. Entries are read lazily, one at a time.
pub struct CapArchive<R> {
    zip: ZipArchive<R>,
}

impl CapArchive<BufReader<File>> {
    /// Open an archive from disk, checking existence and extension first.
    pub fn open(path: &Path, config: &ReaderConfig) -> Result<Self> {
        if !path.is_file() || !has_extension(path, &config.extension) {
            return Err(CapError::ArchiveNotFound {
                path: path.to_path_buf(),
                extension: config.extension.clone(),
            });
        }
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }
}

impl<R: Read + Seek> CapArchive<R> {
    /// Wrap any seekable byte source holding a zip container.
    pub fn from_reader(reader: R) -> Result<Self> {
        let zip = ZipArchive::new(reader)?;
        Ok(Self { zip })
    }

    /// Names of all entries, in central-directory order.
    pub fn entry_names(&self) -> Vec<String> {
        self.zip.file_names().map(String::from).collect()
    }

    /// Read the manifest document as text.
    pub fn read_manifest(&mut self, entry: &str) -> Result<String> {
        let bytes = match self.read_entry(entry, u64::MAX) {
            Ok(bytes) => bytes,
            Err(ZipError::FileNotFound) => {
                return Err(CapError::ManifestMissing(entry.to_string()))
            }
            Err(ZipError::Io(e)) => return Err(CapError::Io(e)),
            Err(e) => {
                return Err(CapError::ManifestMalformed(format!("reading '{entry}': {e}")))
            }
        };
        decode_text(&bytes).map_err(CapError::ManifestMalformed)
    }

    /// Read a binary subfile referenced by the manifest.
    ///
    /// The manifest path is normalized to the archive's forward-slash form
    /// before lookup. At most `limit` bytes are read.
    pub fn read_subfile(
        &mut self,
        manifest_path: &str,
        limit: u64,
    ) -> std::result::Result<Vec<u8>, ChannelError> {
        let path = normalize_subfile_path(manifest_path);
        match self.read_entry(&path, limit) {
            Ok(bytes) => Ok(bytes),
            Err(ZipError::FileNotFound) => Err(ChannelError::SubfileMissing(path)),
            Err(e) => Err(ChannelError::SubfileUnreadable {
                path,
                reason: e.to_string(),
            }),
        }
    }

    fn read_entry(&mut self, name: &str, limit: u64) -> std::result::Result<Vec<u8>, ZipError> {
        let entry = self.zip.by_name(name)?;
        let capacity = usize::try_from(entry.size().min(limit)).unwrap_or(0);
        let mut bytes = Vec::with_capacity(capacity);
        entry.take(limit).read_to_end(&mut bytes)?;
        Ok(bytes)
    }
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(extension.trim_start_matches('.')))
}

/// Decode manifest bytes: UTF-8 (optionally BOM-prefixed) or BOM-marked UTF-16.
fn decode_text(bytes: &[u8]) -> std::result::Result<String, String> {
    match bytes {
        [0xEF, 0xBB, 0xBF, rest @ ..] => utf8(rest),
        [0xFF, 0xFE, rest @ ..] => utf16(rest, u16::from_le_bytes),
        [0xFE, 0xFF, rest @ ..] => utf16(rest, u16::from_be_bytes),
        _ => utf8(bytes),
    }
}

fn utf8(bytes: &[u8]) -> std::result::Result<String, String> {
    String::from_utf8(bytes.to_vec()).map_err(|e| format!("manifest is not valid UTF-8: {e}"))
}

fn utf16(bytes: &[u8], unit: fn([u8; 2]) -> u16) -> std::result::Result<String, String> {
    if bytes.len() % 2 != 0 {
        return Err("manifest has an odd number of UTF-16 bytes".into());
    }
    let units: Vec<u16> = bytes.chunks_exact(2).map(|c| unit([c[0], c[1]])).collect();
    String::from_utf16(&units).map_err(|e| format!("manifest is not valid UTF-16: {e}"))
}

// ---------------------------------------------------------------------------
// Path normalization
// ---------------------------------------------------------------------------

/// Convert a manifest path (often Windows-style) into a zip entry name.
///
/// Backslashes become `/`, repeated separators collapse, `.` segments vanish
/// and `..` removes the preceding segment.
pub fn normalize_subfile_path(raw: &str) -> String {
    let unified = raw.replace('\\', "/");
    let mut segments: Vec<&str> = Vec::new();
    for segment in unified.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}
