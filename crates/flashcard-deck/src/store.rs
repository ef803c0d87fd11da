use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use flashcard_types::HeadwordRecord;

/// Read/append access to stored headword records.
pub trait HeadwordStore {
    /// Every stored record, in storage order.
    fn load_all(&self) -> Result<Vec<HeadwordRecord>>;

    /// Persist new records after the existing ones.
    fn append(&self, records: &[HeadwordRecord]) -> Result<()>;
}

/// Store backed by a JSON Lines file, one [`HeadwordRecord`] per line.
#[derive(Clone, Debug)]
pub struct JsonLinesStore {
    path: PathBuf,
}

impl JsonLinesStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create an empty store file if none exists yet.
    pub fn ensure_exists(&self) -> Result<()> {
        if !self.path.exists() {
            File::create(&self.path)
                .with_context(|| format!("create {}", self.path.display()))?;
        }
        Ok(())
    }
}

impl HeadwordStore for JsonLinesStore {
    fn load_all(&self) -> Result<Vec<HeadwordRecord>> {
        let path = &self.path;
        if !path.exists() {
            anyhow::bail!("missing headword store: {}", path.display());
        }
        let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
        let mut records = Vec::new();
        for (lineno, line) in BufReader::new(file).lines().enumerate() {
            let line =
                line.with_context(|| format!("read {}:{}", path.display(), lineno + 1))?;
            if line.trim().is_empty() {
                continue;
            }
            let record: HeadwordRecord = serde_json::from_str(&line)
                .with_context(|| format!("{}:{} malformed record", path.display(), lineno + 1))?;
            records.push(record);
        }
        Ok(records)
    }

    fn append(&self, records: &[HeadwordRecord]) -> Result<()> {
        let path = &self.path;
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("open {} for append", path.display()))?;
        let mut writer = BufWriter::new(file);
        for record in records {
            serde_json::to_writer(&mut writer, record)
                .with_context(|| format!("serialize record for {}", record.word))?;
            writer.write_all(b"\n")?;
        }
        writer
            .flush()
            .with_context(|| format!("flush {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_then_loads_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonLinesStore::new(dir.path().join("db.jsonl"));
        store
            .append(&[
                HeadwordRecord::unfetched("και", 900),
                HeadwordRecord::unfetched("σκύλος", 40),
            ])
            .unwrap();
        store.append(&[HeadwordRecord::unfetched("γάτα", 35)]).unwrap();

        let records = store.load_all().unwrap();
        let words: Vec<_> = records.iter().map(|r| r.word.as_str()).collect();
        assert_eq!(words, vec!["και", "σκύλος", "γάτα"]);
        assert!(records.iter().all(|r| r.raw_entry.is_none()));
    }

    #[test]
    fn reports_bad_lines_with_position() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.jsonl");
        std::fs::write(&path, "{\"word\": \"και\", \"frequency\": 1}\n\nnot json\n").unwrap();
        let err = JsonLinesStore::new(&path).load_all().unwrap_err();
        assert!(format!("{err:#}").contains(":3 malformed record"));
    }

    #[test]
    fn missing_store_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(JsonLinesStore::new(dir.path().join("nope.jsonl")).load_all().is_err());
    }
}
