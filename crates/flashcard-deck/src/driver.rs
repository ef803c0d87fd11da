use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use flashcard_normalize::{SchemaError, normalize};
use flashcard_types::{HeadwordRecord, NormalizedHeadword};
use thiserror::Error;
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, info, warn};

use crate::filter::{DropReason, DroppedReport, Verdict, verdict};
use crate::output::TsvOutput;
use crate::overrides::OverrideTable;
use crate::render::{Flashcard, RenameMode, render, render_override};
use crate::store::HeadwordStore;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("schema violation in entry for {word:?}: {source}")]
    Schema {
        word: String,
        #[source]
        source: SchemaError,
    },
    #[error("worker task failed: {0}")]
    Worker(#[from] JoinError),
}

#[derive(Clone, Copy, Debug)]
pub struct PipelineOptions {
    /// Upper bound on concurrent worker tasks.
    pub workers: usize,
    pub rename: RenameMode,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            workers: 1,
            rename: RenameMode::Keep,
        }
    }
}

/// What happened to a single record.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Outcome {
    Kept(Flashcard),
    Dropped(DropReason),
}

/// Result of one complete batch.
#[derive(Clone, Debug, Default)]
pub struct RunReport {
    /// Kept cards, most frequent first; ties keep store order.
    pub cards: Vec<Flashcard>,
    pub dropped: DroppedReport,
    pub skipped: usize,
}

#[derive(Debug)]
struct Ranked<T> {
    index: usize,
    frequency: u64,
    item: T,
}

#[derive(Debug, Default)]
struct ChunkOutput {
    kept: Vec<Ranked<Flashcard>>,
    dropped: Vec<Ranked<String>>,
}

/// Batch orchestration over explicit collaborators.
pub struct Pipeline<S> {
    store: S,
    overrides: Arc<OverrideTable>,
    skip: Arc<HashSet<String>>,
    options: PipelineOptions,
}

impl<S: HeadwordStore> Pipeline<S> {
    pub fn new(
        store: S,
        overrides: OverrideTable,
        skip: HashSet<String>,
        options: PipelineOptions,
    ) -> Self {
        Self {
            store,
            overrides: Arc::new(overrides),
            skip: Arc::new(skip),
            options,
        }
    }

    /// Load, process and write one batch. Nothing is written if any record
    /// violates the entry schema.
    pub async fn run(&self, output: &TsvOutput) -> anyhow::Result<RunReport> {
        let start = Instant::now();
        let records = self.store.load_all()?;
        info!("loaded {} headword records", records.len());

        let report = self.process(records).await?;
        output.write(&report.cards, report.dropped.words())?;
        info!(
            "wrote {} cards to {} and {} dropped words to {} in {} ms",
            report.cards.len(),
            output.cards_path().display(),
            report.dropped.len(),
            output.dropped_path().display(),
            start.elapsed().as_millis()
        );
        Ok(report)
    }

    /// Normalize, filter and render every record on a bounded pool of
    /// blocking tasks. The first schema violation cancels the remaining work.
    pub async fn process(&self, records: Vec<HeadwordRecord>) -> Result<RunReport, PipelineError> {
        let total = records.len();
        let records: Vec<(usize, HeadwordRecord)> = records
            .into_iter()
            .enumerate()
            .filter(|(_, record)| !self.skip.contains(&record.word))
            .collect();
        let skipped = total - records.len();
        if skipped > 0 {
            info!("skipping {skipped} listed words");
        }

        let workers = self.options.workers.max(1);
        let chunk_size = records.len().div_ceil(workers).max(1);
        let cancelled = Arc::new(AtomicBool::new(false));
        let mut tasks = JoinSet::new();

        let mut pending = records.into_iter().peekable();
        while pending.peek().is_some() {
            let chunk: Vec<_> = pending.by_ref().take(chunk_size).collect();
            let overrides = Arc::clone(&self.overrides);
            let cancelled = Arc::clone(&cancelled);
            let rename = self.options.rename;
            tasks.spawn_blocking(move || process_chunk(chunk, &overrides, rename, &cancelled));
        }
        debug!("spawned {} workers for {} records", tasks.len(), total - skipped);

        let mut kept = Vec::new();
        let mut dropped = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined? {
                Ok(chunk) => {
                    kept.extend(chunk.kept);
                    dropped.extend(chunk.dropped);
                }
                Err(err) => {
                    cancelled.store(true, Ordering::Relaxed);
                    tasks.abort_all();
                    warn!("aborting run: {err}");
                    return Err(err);
                }
            }
        }

        kept.sort_by(|a, b| b.frequency.cmp(&a.frequency).then(a.index.cmp(&b.index)));
        dropped.sort_by(|a, b| b.frequency.cmp(&a.frequency).then(a.index.cmp(&b.index)));

        info!("kept {} headwords, dropped {}", kept.len(), dropped.len());
        Ok(RunReport {
            cards: kept.into_iter().map(|r| r.item).collect(),
            dropped: DroppedReport::from(dropped.into_iter().map(|r| r.item).collect::<Vec<_>>()),
            skipped,
        })
    }
}

fn process_chunk(
    chunk: Vec<(usize, HeadwordRecord)>,
    overrides: &OverrideTable,
    rename: RenameMode,
    cancelled: &AtomicBool,
) -> Result<ChunkOutput, PipelineError> {
    let mut out = ChunkOutput::default();
    for (index, record) in chunk {
        if cancelled.load(Ordering::Relaxed) {
            break;
        }
        let frequency = record.frequency;
        match process_record(&record, overrides, rename) {
            Ok(Outcome::Kept(card)) => out.kept.push(Ranked {
                index,
                frequency,
                item: card,
            }),
            Ok(Outcome::Dropped(reason)) => {
                debug!("dropping {}: {reason}", record.word);
                out.dropped.push(Ranked {
                    index,
                    frequency,
                    item: record.word,
                });
            }
            Err(err) => {
                cancelled.store(true, Ordering::Relaxed);
                return Err(err);
            }
        }
    }
    Ok(out)
}

/// Process one record. Overridden words bypass normalization entirely.
pub fn process_record(
    record: &HeadwordRecord,
    overrides: &OverrideTable,
    rename: RenameMode,
) -> Result<Outcome, PipelineError> {
    if let Some(entry) = overrides.get(&record.word) {
        return Ok(Outcome::Kept(render_override(&record.word, entry, rename)));
    }

    let homonyms =
        normalize(record.raw_entry.as_ref()).map_err(|source| PipelineError::Schema {
            word: record.word.clone(),
            source,
        })?;
    let headword = NormalizedHeadword {
        word: record.word.clone(),
        frequency: record.frequency,
        homonyms,
    };

    Ok(match verdict(&headword, overrides) {
        Verdict::Keep => Outcome::Kept(render(&headword, overrides, rename)),
        Verdict::Drop(reason) => Outcome::Dropped(reason),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use flashcard_types::{Etymology, Override, RawDefinition, RawEntry};

    struct MemoryStore(Vec<HeadwordRecord>);

    impl HeadwordStore for MemoryStore {
        fn load_all(&self) -> anyhow::Result<Vec<HeadwordRecord>> {
            Ok(self.0.clone())
        }

        fn append(&self, _records: &[HeadwordRecord]) -> anyhow::Result<()> {
            anyhow::bail!("read-only")
        }
    }

    fn record(word: &str, frequency: u64, lines: Option<&[&str]>) -> HeadwordRecord {
        HeadwordRecord {
            word: word.to_string(),
            frequency,
            raw_entry: lines.map(|lines| RawEntry {
                etymologies: vec![Etymology {
                    definitions: vec![RawDefinition {
                        part_of_speech: "noun".to_string(),
                        text_lines: lines.iter().map(|l| l.to_string()).collect(),
                    }],
                }],
            }),
        }
    }

    fn pipeline(overrides: OverrideTable, workers: usize) -> Pipeline<MemoryStore> {
        Pipeline::new(
            MemoryStore(Vec::new()),
            overrides,
            HashSet::new(),
            PipelineOptions {
                workers,
                rename: RenameMode::Keep,
            },
        )
    }

    #[test]
    fn absent_entry_is_dropped() {
        let outcome = process_record(
            &record("του", 100, None),
            &OverrideTable::empty(),
            RenameMode::Keep,
        )
        .unwrap();
        assert_eq!(outcome, Outcome::Dropped(DropReason::NoEntry));
    }

    #[test]
    fn all_noise_entry_is_dropped() {
        let outcome = process_record(
            &record("σκύλοι", 5, Some(&["σκύλοι • (skíloi) m", "form of\u{a0}σκύλος"])),
            &OverrideTable::empty(),
            RenameMode::Keep,
        )
        .unwrap();
        assert_eq!(outcome, Outcome::Dropped(DropReason::NoDefinitions));
    }

    #[test]
    fn override_skips_broken_entry() {
        let mut overrides = OverrideTable::empty();
        overrides.insert("σκύλος", Override::new("curated"));
        let outcome = process_record(
            &record("σκύλος", 5, Some(&["no bullet here", "dog"])),
            &overrides,
            RenameMode::Keep,
        )
        .unwrap();
        assert_eq!(
            outcome,
            Outcome::Kept(Flashcard {
                word: "σκύλος".to_string(),
                text: "curated".to_string()
            })
        );
    }

    #[tokio::test]
    async fn sorts_by_frequency_with_stable_ties() {
        let records = vec![
            record("γάτα", 10, Some(&["γάτα • (gáta) f", "cat"])),
            record("σκύλος", 30, Some(&["σκύλος • (skílos) m", "dog"])),
            record("άλογο", 10, Some(&["άλογο • (álogo) n", "horse"])),
            record("του", 50, None),
            record("ψάρι", 10, Some(&["ψάρι • (psári) n", "fish"])),
        ];
        for workers in [1, 2, 8] {
            let report = pipeline(OverrideTable::empty(), workers)
                .process(records.clone())
                .await
                .unwrap();
            let words: Vec<_> = report.cards.iter().map(|c| c.word.as_str()).collect();
            assert_eq!(words, vec!["σκύλος", "γάτα", "άλογο", "ψάρι"]);
            assert_eq!(report.dropped.words(), &["του".to_string()]);
        }
    }

    #[tokio::test]
    async fn schema_error_fails_whole_batch() {
        let records = vec![
            record("σκύλος", 30, Some(&["σκύλος • (skílos) m", "dog"])),
            record("γάτα", 10, Some(&["γάτα (gáta) f", "cat"])),
        ];
        let err = pipeline(OverrideTable::empty(), 2)
            .process(records)
            .await
            .unwrap_err();
        match err {
            PipelineError::Schema { word, .. } => assert_eq!(word, "γάτα"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn skip_list_removes_words_entirely() {
        let pipeline = Pipeline::new(
            MemoryStore(Vec::new()),
            OverrideTable::empty(),
            HashSet::from(["του".to_string()]),
            PipelineOptions::default(),
        );
        let report = pipeline
            .process(vec![record("του", 50, None), record("της", 40, None)])
            .await
            .unwrap();
        assert_eq!(report.skipped, 1);
        assert_eq!(report.dropped.words(), &["της".to_string()]);
    }
}
