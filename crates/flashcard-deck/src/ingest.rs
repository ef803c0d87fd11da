//! Frequency-list ingestion from TenTen CSV exports.
//!
//! Exports carry two preamble rows, a `lemma_lc,Freq` header on the third
//! row, then one lemma per row with a thousands-separated frequency.

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

use anyhow::{Context, Result};
use flashcard_types::HeadwordRecord;
use tracing::info;

use crate::store::HeadwordStore;

const HEADER_ROW: usize = 2;
const HEADER: [&str; 2] = ["lemma_lc", "Freq"];

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Lemma {
    pub word: String,
    pub frequency: u64,
}

/// Parse one export.
pub fn read_frequency_list(reader: impl Read) -> Result<Vec<Lemma>> {
    let mut csv = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut lemmas = Vec::new();
    let mut saw_header = false;
    for (row, record) in csv.records().enumerate() {
        let record = record.with_context(|| format!("row {}", row + 1))?;
        if row < HEADER_ROW {
            continue;
        }
        if row == HEADER_ROW {
            let header: Vec<&str> = record.iter().map(str::trim).collect();
            if header != HEADER {
                anyhow::bail!("row {}: expected header {:?}, got {:?}", row + 1, HEADER, header);
            }
            saw_header = true;
            continue;
        }

        let (Some(word), Some(freq)) = (record.get(0), record.get(1)) else {
            anyhow::bail!("row {}: expected lemma and frequency", row + 1);
        };
        let frequency: u64 = freq
            .trim()
            .replace(',', "")
            .parse()
            .with_context(|| format!("row {}: frequency {freq:?}", row + 1))?;
        lemmas.push(Lemma {
            word: word.trim().to_string(),
            frequency,
        });
    }

    if !saw_header {
        anyhow::bail!("frequency list ended before the header row");
    }
    Ok(lemmas)
}

pub fn load_frequency_list(path: impl AsRef<Path>) -> Result<Vec<Lemma>> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
    read_frequency_list(file).with_context(|| format!("parse {}", path.display()))
}

/// Merge lemmas from several exports: most frequent first, ties broken by
/// word (descending), each word kept once at its first position.
pub fn merge_lemmas(lists: Vec<Vec<Lemma>>) -> Vec<Lemma> {
    let mut all: Vec<Lemma> = lists.into_iter().flatten().collect();
    all.sort_by(|a, b| {
        b.frequency
            .cmp(&a.frequency)
            .then_with(|| b.word.cmp(&a.word))
    });
    let mut seen = HashSet::new();
    all.retain(|lemma| seen.insert(lemma.word.clone()));
    all
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct IngestSummary {
    pub lemmas: usize,
    pub added: usize,
}

/// Append every lemma not yet in the store as an unfetched record. Existing
/// records are left untouched.
pub fn ingest<S: HeadwordStore>(store: &S, lemmas: &[Lemma]) -> Result<IngestSummary> {
    let existing: HashSet<String> = store.load_all()?.into_iter().map(|r| r.word).collect();
    let new_records: Vec<HeadwordRecord> = lemmas
        .iter()
        .filter(|lemma| !existing.contains(&lemma.word))
        .map(|lemma| HeadwordRecord::unfetched(lemma.word.clone(), lemma.frequency))
        .collect();
    store.append(&new_records)?;
    info!(
        "ingested {} lemmas, {} new headwords",
        lemmas.len(),
        new_records.len()
    );
    Ok(IngestSummary {
        lemmas: lemmas.len(),
        added: new_records.len(),
    })
}

/// Write the merged lemma list, one word per line.
pub fn write_word_list(path: impl AsRef<Path>, lemmas: &[Lemma]) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    for lemma in lemmas {
        writeln!(writer, "{}", lemma.word)?;
    }
    writer.flush()?;
    Ok(())
}
