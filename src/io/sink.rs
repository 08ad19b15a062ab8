use std::{collections::HashMap, io::Write, path::{Path, PathBuf}};

use anyhow::{Context, Result, bail};
use polars::frame::DataFrame;
use tempfile::NamedTempFile;

use crate::io::csv::{write_csv_bytes, write_json_bytes};

/// Encoding of a stored table, chosen from the destination's extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Csv,
    Json,
}

impl TableFormat {
    /// `.json` selects JSON; everything else is CSV.
    pub fn from_destination(destination: &str) -> Self {
        match Path::new(destination).extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => TableFormat::Json,
            _ => TableFormat::Csv,
        }
    }

    pub fn encode(self, table: &DataFrame) -> Result<Vec<u8>> {
        match self {
            TableFormat::Csv => write_csv_bytes(table),
            TableFormat::Json => write_json_bytes(table),
        }
    }
}

/// Write access for finished tables, by destination name.
pub trait TableSink {
    fn store(&mut self, table: &DataFrame, destination: &str) -> Result<()>;
}

/// Write-then-rename guard: the target only appears after a complete write,
/// and the temp file is removed if the guard is dropped unfinished.
struct PendingWrite {
    target: PathBuf,
    tmp: NamedTempFile,
}

impl PendingWrite {
    fn open(target: &Path) -> Result<Self> {
        let parent = target.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create dir {}", parent.display()))?;
        let tmp = NamedTempFile::new_in(parent).context("create temp file")?;
        Ok(Self { target: target.to_path_buf(), tmp })
    }

    fn finalize(self) -> Result<()> {
        self.tmp.as_file().sync_all().ok(); // best-effort fsync
        self.tmp.persist(&self.target)
            .with_context(|| format!("rename to {}", self.target.display()))?;
        Ok(())
    }
}

impl Write for PendingWrite {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> { self.tmp.write(buf) }
    fn flush(&mut self) -> std::io::Result<()> { self.tmp.flush() }
}

/// Writes tables as files under a root directory.
#[derive(Debug, Clone)]
pub struct DiskSink {
    root: PathBuf,
}

impl DiskSink {
    pub fn new(root: impl Into<PathBuf>) -> Self { Self { root: root.into() } }

    /// Full path of a destination.
    pub fn path(&self, destination: &str) -> PathBuf { self.root.join(destination) }
}

impl TableSink for DiskSink {
    fn store(&mut self, table: &DataFrame, destination: &str) -> Result<()> {
        if destination.is_empty() {
            bail!("[io::sink] Empty destination name");
        }
        let bytes = TableFormat::from_destination(destination).encode(table)?;
        let path = self.path(destination);
        let mut pending = PendingWrite::open(&path)?;
        pending.write_all(&bytes)
            .with_context(|| format!("[io::sink] Failed to write {}", path.display()))?;
        pending.finalize()
    }
}

/// Keeps encoded tables in memory, keyed by destination.
#[derive(Debug, Default, Clone)]
pub struct MemSink {
    pub(crate) files: HashMap<String, Vec<u8>>,
    order: Vec<String>,
}

impl MemSink {
    pub fn new() -> Self { Self::default() }

    /// Encoded bytes stored under `destination`, if any.
    pub fn get(&self, destination: &str) -> Option<&[u8]> {
        self.files.get(destination).map(Vec::as_slice)
    }

    /// Destinations in the order they were stored.
    pub fn destinations(&self) -> &[String] { &self.order }
}

impl TableSink for MemSink {
    fn store(&mut self, table: &DataFrame, destination: &str) -> Result<()> {
        let bytes = TableFormat::from_destination(destination).encode(table)?;
        if self.files.insert(destination.to_string(), bytes).is_none() {
            self.order.push(destination.to_string());
        }
        Ok(())
    }
}
