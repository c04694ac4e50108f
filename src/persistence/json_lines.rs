//! Append-only JSON-lines result file
//!
//! One `RoundResult` per line. The file is read once on open; later writes
//! append a line and update the in-memory copy. Lines that fail to parse are
//! skipped with a warning rather than failing the whole store.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::path::{Path, PathBuf};

use super::{Clock, NewResult, ResultStore, RoundResult, SystemClock, best, rank};
use crate::config::Difficulty;
use crate::error::StoreError;

pub struct JsonLinesStore<C: Clock = SystemClock> {
    path: PathBuf,
    records: Vec<RoundResult>,
    next_id: u64,
    clock: C,
}

impl JsonLinesStore {
    /// Open (or create on first write) the store at `path`
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        Self::open_with_clock(path, SystemClock)
    }
}

impl<C: Clock> JsonLinesStore<C> {
    pub fn open_with_clock(path: impl AsRef<Path>, clock: C) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let records = read_records(&path)?;
        let next_id = records.iter().map(|r| r.id).max().unwrap_or(0) + 1;
        log::info!(
            "Opened result store {} ({} records)",
            path.display(),
            records.len()
        );
        Ok(Self {
            path,
            records,
            next_id,
            clock,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn read_records(path: &Path) -> Result<Vec<RoundResult>, StoreError> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut records = Vec::new();
    for (number, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<RoundResult>(&line) {
            Ok(record) => records.push(record),
            Err(e) => log::warn!("Skipping corrupt record at {}:{}: {}", path.display(), number + 1, e),
        }
    }
    Ok(records)
}

impl<C: Clock> ResultStore for JsonLinesStore<C> {
    fn add_result(&mut self, result: NewResult) -> Result<(), StoreError> {
        let record = RoundResult::new(self.next_id, self.clock.now_unix_ms(), result);
        let mut line = serde_json::to_string(&record)?;
        line.push('\n');

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(line.as_bytes())?;

        log::debug!("Stored result {} ({:.2})", record.id, record.rating);
        self.next_id += 1;
        self.records.push(record);
        Ok(())
    }

    fn top_results(
        &self,
        limit: usize,
        difficulty: Option<Difficulty>,
    ) -> Result<Vec<RoundResult>, StoreError> {
        Ok(rank(&self.records, limit, difficulty))
    }

    fn best_rating(&self, difficulty: Option<Difficulty>) -> Result<f64, StoreError> {
        Ok(best(&self.records, difficulty))
    }
}
