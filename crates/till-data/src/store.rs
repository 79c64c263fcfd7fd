//! Whole-file CSV access shared by every backing store.
//!
//! Every store follows the same model: read all rows into memory, mutate the
//! in-memory copy, write all rows back. A missing file reads as "no data
//! yet", unreadable rows are skipped without aborting the scan, and rewrites
//! go through a temp file and rename so a crash mid-write cannot truncate
//! the store.

use std::fs::OpenOptions;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim, WriterBuilder};
use till_core::error::{Result, TillError};
use tracing::debug;

// ── Reading ───────────────────────────────────────────────────────────────────

/// A whole CSV store in memory: the header row and every row after it, in
/// file order.
#[derive(Debug, Clone, Default)]
pub struct CsvContents {
    /// First row of the file; `None` only when the file is absent or empty.
    pub header: Option<StringRecord>,
    /// Data rows in file order, blank lines dropped.
    pub rows: Vec<StringRecord>,
}

impl CsvContents {
    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Read an entire store.
///
/// A missing file is not an error; the caller gets empty contents. Rows the
/// CSV layer cannot decode are skipped and the scan continues.
pub fn read_store(path: &Path) -> Result<CsvContents> {
    if !path.exists() {
        debug!("Store not present yet: {}", path.display());
        return Ok(CsvContents::default());
    }

    let file = std::fs::File::open(path).map_err(|source| TillError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(file);

    let mut contents = CsvContents::default();
    for result in reader.records() {
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                debug!("Skipping unreadable row in {}: {}", path.display(), e);
                continue;
            }
        };
        if is_blank(&record) {
            continue;
        }
        if contents.header.is_none() {
            contents.header = Some(record);
        } else {
            contents.rows.push(record);
        }
    }

    debug!(
        "Read {} rows from {}",
        contents.rows.len(),
        path.display()
    );
    Ok(contents)
}

// ── Writing ───────────────────────────────────────────────────────────────────

/// Rewrite an entire store: header first, then `rows` in order.
///
/// Writes to `<name>.tmp` in the same directory and renames over the target,
/// so readers never observe a truncated file.
pub fn write_store(path: &Path, header: &StringRecord, rows: &[StringRecord]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|source| TillError::FileWrite {
                path: path.to_path_buf(),
                source,
            })?;
        }
    }

    let tmp = path.with_extension("csv.tmp");
    {
        let mut writer = WriterBuilder::new().flexible(true).from_path(&tmp)?;
        writer.write_record(header)?;
        for row in rows {
            writer.write_record(row)?;
        }
        writer.flush().map_err(|source| TillError::FileWrite {
            path: tmp.clone(),
            source,
        })?;
    }
    std::fs::rename(&tmp, path).map_err(|source| TillError::FileWrite {
        path: path.to_path_buf(),
        source,
    })?;

    debug!("Wrote {} rows to {}", rows.len(), path.display());
    Ok(())
}

/// Append a single row, writing `header` first when the store does not exist
/// yet (or is empty).
pub fn append_row(path: &Path, header: &[&str], row: &StringRecord) -> Result<()> {
    let needs_header = match std::fs::metadata(path) {
        Ok(meta) => meta.len() == 0,
        Err(_) => true,
    };

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| TillError::FileWrite {
            path: path.to_path_buf(),
            source,
        })?;
    let mut writer = WriterBuilder::new().flexible(true).from_writer(file);
    if needs_header {
        writer.write_record(header)?;
    }
    writer.write_record(row)?;
    writer.flush().map_err(|source| TillError::FileWrite {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Field accessor that treats a missing index as an empty field.
pub fn field<'r>(record: &'r StringRecord, index: usize) -> &'r str {
    record.get(index).unwrap_or("")
}

/// A record that carries no text at all (a blank source line).
fn is_blank(record: &StringRecord) -> bool {
    record.iter().all(|f| f.trim().is_empty())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
