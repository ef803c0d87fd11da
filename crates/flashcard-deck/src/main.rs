use std::path::PathBuf;
use std::thread;
use std::time::Instant;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing::{Level, info};
use tracing_subscriber::EnvFilter;

use flashcard_deck::ingest::{load_frequency_list, merge_lemmas, write_word_list};
use flashcard_deck::{
    JsonLinesStore, OverrideTable, Pipeline, PipelineOptions, RenameMode, TsvOutput,
    load_skip_list,
};

const DEFAULT_DB: &str = "db.jsonl";
const DEFAULT_OVERRIDES: &str = "supplemental_definitions.tsv";
const DEFAULT_SKIP_LIST: &str = "words_to_skip.txt";
const DEFAULT_CARDS: &str = "anki.tsv";
const DEFAULT_DROPPED: &str = "dropped_words.txt";
const DEFAULT_WORD_LIST: &str = "words.txt";

#[derive(Parser)]
#[command(name = "flashcards")]
#[command(about = "Build Anki flashcards from scraped Wiktionary entries")]
struct Cli {
    /// Headword store (JSON Lines).
    #[arg(long, global = true, env = "FLASHCARD_DB", default_value = DEFAULT_DB)]
    db: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize, filter and render every stored headword.
    Build(BuildArgs),
    /// Add headwords from TenTen frequency-list CSV exports.
    Ingest(IngestArgs),
}

#[derive(Args, Debug)]
struct BuildArgs {
    #[arg(long, env = "OVERRIDES_PATH", default_value = DEFAULT_OVERRIDES)]
    overrides: PathBuf,
    #[arg(long, env = "SKIP_LIST_PATH", default_value = DEFAULT_SKIP_LIST)]
    skip_list: PathBuf,
    #[arg(long, env = "CARDS_PATH", default_value = DEFAULT_CARDS)]
    cards: PathBuf,
    #[arg(long, env = "DROPPED_PATH", default_value = DEFAULT_DROPPED)]
    dropped: PathBuf,
    /// Worker tasks; defaults to the available parallelism.
    #[arg(long, env = "WORKERS")]
    workers: Option<usize>,
    /// Show an override's replacement word instead of the original headword.
    #[arg(long, env = "RENAME_OVERRIDES", default_value_t = false)]
    rename_overrides: bool,
}

#[derive(Args, Debug)]
struct IngestArgs {
    /// CSV exports to read.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
    #[arg(long, env = "WORD_LIST_PATH", default_value = DEFAULT_WORD_LIST)]
    word_list: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let store = JsonLinesStore::new(&cli.db);

    match cli.command {
        Commands::Build(args) => build(store, args).await,
        Commands::Ingest(args) => ingest(store, args),
    }
}

async fn build(store: JsonLinesStore, args: BuildArgs) -> anyhow::Result<()> {
    let workers = args.workers.filter(|w| *w > 0).unwrap_or_else(default_workers);
    let rename = RenameMode::from_flag(args.rename_overrides);
    info!("using headword store at {}", store.path().display());
    info!("workers: {workers}, override rename: {rename:?}");

    let overrides = OverrideTable::load(&args.overrides)?;
    let skip = load_skip_list(&args.skip_list)?;
    let output = TsvOutput::new(args.cards, args.dropped);

    let pipeline = Pipeline::new(store, overrides, skip, PipelineOptions { workers, rename });
    pipeline.run(&output).await.context("flashcard build failed")?;
    Ok(())
}

fn ingest(store: JsonLinesStore, args: IngestArgs) -> anyhow::Result<()> {
    let start = Instant::now();
    let lists = args
        .inputs
        .iter()
        .map(load_frequency_list)
        .collect::<anyhow::Result<Vec<_>>>()?;
    let lemmas = merge_lemmas(lists);

    store.ensure_exists()?;
    let summary = flashcard_deck::ingest::ingest(&store, &lemmas)?;
    write_word_list(&args.word_list, &lemmas)?;
    info!(
        "added {} of {} lemmas to {} in {} ms; word list at {}",
        summary.added,
        summary.lemmas,
        store.path().display(),
        start.elapsed().as_millis(),
        args.word_list.display()
    );
    Ok(())
}

fn default_workers() -> usize {
    thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let max_level = env_filter
        .max_level_hint()
        .and_then(|hint| hint.into_level())
        .unwrap_or(Level::INFO);
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_level(true)
        .with_max_level(max_level)
        .init();
}
