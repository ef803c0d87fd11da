use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tempfile::NamedTempFile;

use crate::render::Flashcard;

/// Token that stands in for a newline inside a TSV field.
pub const LINE_BREAK_TOKEN: &str = "<br>";

/// Writes the kept-cards TSV and the dropped-words report as a pair.
#[derive(Clone, Debug)]
pub struct TsvOutput {
    cards_path: PathBuf,
    dropped_path: PathBuf,
}

impl TsvOutput {
    pub fn new(cards_path: impl Into<PathBuf>, dropped_path: impl Into<PathBuf>) -> Self {
        Self {
            cards_path: cards_path.into(),
            dropped_path: dropped_path.into(),
        }
    }

    pub fn cards_path(&self) -> &Path {
        &self.cards_path
    }

    pub fn dropped_path(&self) -> &Path {
        &self.dropped_path
    }

    /// Both files are staged next to their targets and only moved into place
    /// once both are fully written.
    pub fn write(&self, cards: &[Flashcard], dropped: &[String]) -> Result<()> {
        let mut staged_cards = staging_file(&self.cards_path)?;
        {
            let mut writer = BufWriter::new(staged_cards.as_file_mut());
            for card in cards {
                writeln!(writer, "{}", card_line(card))?;
            }
            writer.flush()?;
        }

        let mut staged_dropped = staging_file(&self.dropped_path)?;
        {
            let mut writer = BufWriter::new(staged_dropped.as_file_mut());
            for word in dropped {
                writeln!(writer, "{word}")?;
            }
            writer.flush()?;
        }

        staged_cards
            .persist(&self.cards_path)
            .with_context(|| format!("write {}", self.cards_path.display()))?;
        staged_dropped
            .persist(&self.dropped_path)
            .with_context(|| format!("write {}", self.dropped_path.display()))?;
        Ok(())
    }
}

/// `word<TAB>text`, with newlines in `text` replaced by [`LINE_BREAK_TOKEN`].
pub fn card_line(card: &Flashcard) -> String {
    let text = card.text.replace("\r\n", "\n").replace('\n', LINE_BREAK_TOKEN);
    format!("{}\t{}", card.word, text)
}

fn staging_file(target: &Path) -> Result<NamedTempFile> {
    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    NamedTempFile::new_in(&dir).with_context(|| format!("stage file in {}", dir.display()))
}
