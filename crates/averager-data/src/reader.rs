//! Log file discovery, encoding detection and row splitting.
//!
//! Batch-tool logs do not declare their encoding, so every file is probed
//! against [`CANDIDATE_ENCODINGS`] in priority order and the first candidate
//! that decodes cleanly wins. The decoded text is then split into rows of
//! fields with a CSV reader.

use std::fmt;
use std::path::{Path, PathBuf};

use averager_core::error::{AveragerError, Result};
use tracing::{debug, warn};

/// File extensions picked up when a directory is given as input.
pub const LOG_EXTENSIONS: &[&str] = &["log", "txt"];

/// Encodings tried by [`decode_bytes`], highest priority first.
pub const CANDIDATE_ENCODINGS: &[TextEncoding] = &[
    TextEncoding::Utf8,
    TextEncoding::Utf8Bom,
    TextEncoding::Utf16,
    TextEncoding::Windows1251,
];

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

// ── Types ─────────────────────────────────────────────────────────────────────

/// A character encoding the decoder knows how to probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Utf8,
    Utf8Bom,
    Utf16,
    Windows1251,
}

impl TextEncoding {
    pub fn label(&self) -> &'static str {
        match self {
            TextEncoding::Utf8 => "utf-8",
            TextEncoding::Utf8Bom => "utf-8-sig",
            TextEncoding::Utf16 => "utf-16",
            TextEncoding::Windows1251 => "windows-1251",
        }
    }

    /// Decode `bytes` strictly, returning `None` when this encoding does not
    /// fit the input.
    pub fn decode(&self, bytes: &[u8]) -> Option<String> {
        match self {
            TextEncoding::Utf8 => {
                if bytes.starts_with(UTF8_BOM) {
                    return None;
                }
                decode_utf8(bytes)
            }
            TextEncoding::Utf8Bom => decode_utf8(bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes)),
            TextEncoding::Utf16 => decode_utf16(bytes).filter(|text| !text.contains('\0')),
            // Every byte maps, so NUL is the only thing that marks the input
            // as binary or wide text.
            TextEncoding::Windows1251 => {
                if bytes.contains(&0) {
                    return None;
                }
                Some(
                    encoding_rs::WINDOWS_1251
                        .decode_without_bom_handling_and_without_replacement(bytes)?
                        .into_owned(),
                )
            }
        }
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One delimited line of a decoded file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    /// 1-based line number where the row starts.
    pub line: u64,
    /// Fields as split by the CSV reader, quoting not yet interpreted.
    pub fields: Vec<String>,
}

/// The rows of one file and the encoding that produced them.
#[derive(Debug, Clone)]
pub struct DecodedFile {
    pub encoding: TextEncoding,
    pub rows: Vec<RawRow>,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Expand the user's inputs into an ordered list of files.
///
/// Plain paths pass through unchanged and in order, even when they do not
/// exist (reading them reports the failure later). Directories are replaced
/// by the `*.log` / `*.txt` files found beneath them, sorted by path.
pub fn expand_inputs(inputs: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let found = find_log_files(input);
            if found.is_empty() {
                warn!("No log files found in {}", input.display());
            }
            files.extend(found);
        } else {
            files.push(input.clone());
        }
    }
    files
}

/// Find all log files recursively under `dir`, sorted by path.
pub fn find_log_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry.file_type().is_file()
                && entry
                    .path()
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .map(|ext| LOG_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
                    .unwrap_or(false)
        })
        .map(|entry| entry.into_path())
        .collect();

    files.sort();
    files
}

/// Read `path`, detect its encoding and split it into rows.
pub fn read_log_file(path: &Path) -> Result<DecodedFile> {
    let bytes = std::fs::read(path).map_err(|source| AveragerError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;

    let (encoding, text) = decode_bytes(&bytes).ok_or_else(|| AveragerError::Decode {
        path: path.to_path_buf(),
        attempted: CANDIDATE_ENCODINGS
            .iter()
            .map(|e| e.label())
            .collect::<Vec<_>>()
            .join(", "),
    })?;

    let rows = split_rows(&text);
    debug!(
        "File {}: decoded as {}, {} rows",
        path.display(),
        encoding,
        rows.len()
    );

    Ok(DecodedFile { encoding, rows })
}

/// Try every candidate encoding in order and return the first that fits.
pub fn decode_bytes(bytes: &[u8]) -> Option<(TextEncoding, String)> {
    CANDIDATE_ENCODINGS
        .iter()
        .find_map(|encoding| encoding.decode(bytes).map(|text| (*encoding, text)))
}

/// Split decoded text into comma-separated rows.
///
/// Quoted fields are unquoted by the reader; rows the reader rejects are
/// dropped. Blank lines produce no row.
pub fn split_rows(text: &str) -> Vec<RawRow> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                debug!("Dropping unreadable row: {}", e);
                continue;
            }
        };
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        rows.push(RawRow {
            line,
            fields: record.iter().map(str::to_string).collect(),
        });
    }
    rows
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Strict UTF-8 decode that refuses byte streams shaped like UTF-16.
///
/// Stray NUL bytes (padding, a truncated write) are kept as text.
fn decode_utf8(bytes: &[u8]) -> Option<String> {
    if looks_like_utf16(bytes) {
        return None;
    }
    std::str::from_utf8(bytes).ok().map(str::to_string)
}

/// True when at least half of the even or of the odd byte positions hold
/// NUL, the shape of mostly-ASCII UTF-16 text.
fn looks_like_utf16(bytes: &[u8]) -> bool {
    let parity_looks_wide = |offset: usize| {
        let slots = bytes.iter().skip(offset).step_by(2);
        let total = slots.clone().count();
        let nuls = slots.filter(|b| **b == 0).count();
        nuls > 0 && nuls * 2 >= total
    };
    parity_looks_wide(0) || parity_looks_wide(1)
}

/// Strict UTF-16 decode with BOM sniffing.
///
/// Without a BOM the input is read as little-endian and must pass
/// [`looks_like_utf16`].
fn decode_utf16(bytes: &[u8]) -> Option<String> {
    let (body, big_endian) = match bytes {
        [0xFF, 0xFE, rest @ ..] => (rest, false),
        [0xFE, 0xFF, rest @ ..] => (rest, true),
        _ if looks_like_utf16(bytes) => (bytes, false),
        _ => return None,
    };

    if body.len() % 2 != 0 {
        return None;
    }

    let units: Vec<u16> = body
        .chunks_exact(2)
        .map(|c| {
            if big_endian {
                u16::from_be_bytes([c[0], c[1]])
            } else {
                u16::from_le_bytes([c[0], c[1]])
            }
        })
        .collect();

    String::from_utf16(&units).ok()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
