use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result};
use flashcard_types::Override;
use tracing::{info, warn};

/// Curated replacements keyed by the original headword.
#[derive(Clone, Debug, Default)]
pub struct OverrideTable {
    entries: HashMap<String, Override>,
}

impl OverrideTable {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load overrides from a TSV file.
    ///
    /// Each line is `old_word<TAB>new_word<TAB>final_text` or
    /// `word<TAB>final_text`. An empty `new_word` means no rename. Blank lines
    /// and lines starting with `#` are ignored. A missing file yields an empty
    /// table.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            info!("no override file at {}, continuing without overrides", path.display());
            return Ok(Self::empty());
        }
        let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
        let table = Self::from_reader(BufReader::new(file))
            .with_context(|| format!("parse overrides in {}", path.display()))?;
        info!("loaded {} overrides from {}", table.len(), path.display());
        Ok(table)
    }

    pub fn from_reader(reader: impl BufRead) -> Result<Self> {
        let mut entries = HashMap::new();
        for (lineno, line) in reader.lines().enumerate() {
            let line = line.with_context(|| format!("read line {}", lineno + 1))?;
            let line = line.trim_end_matches(['\r', '\n']);
            if line.trim().is_empty() || line.starts_with('#') {
                continue;
            }
            let (word, entry) = parse_override_line(line)
                .with_context(|| format!("line {}: malformed override", lineno + 1))?;
            if entries.insert(word.clone(), entry).is_some() {
                warn!(
                    "duplicate override for {word} on line {}, keeping the later one",
                    lineno + 1
                );
            }
        }
        Ok(Self { entries })
    }

    pub fn insert(&mut self, word: impl Into<String>, entry: Override) {
        self.entries.insert(word.into(), entry);
    }

    pub fn get(&self, word: &str) -> Option<&Override> {
        self.entries.get(word)
    }

    pub fn contains(&self, word: &str) -> bool {
        self.entries.contains_key(word)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn parse_override_line(line: &str) -> Result<(String, Override)> {
    let fields: Vec<&str> = line.split('\t').collect();
    let (word, new_word, final_text) = match fields.as_slice() {
        [word, final_text] => (*word, "", *final_text),
        [word, new_word, final_text] => (*word, *new_word, *final_text),
        other => anyhow::bail!("expected 2 or 3 tab-separated fields, got {}", other.len()),
    };

    let word = word.trim();
    if word.is_empty() {
        anyhow::bail!("empty headword");
    }
    if final_text.trim().is_empty() {
        anyhow::bail!("empty final text for {word}");
    }

    let mut entry = Override::new(final_text);
    let new_word = new_word.trim();
    if !new_word.is_empty() {
        entry = entry.with_new_word(new_word);
    }
    Ok((word.to_string(), entry))
}

/// Load the list of words excluded from the run altogether. A missing file
/// yields an empty set.
pub fn load_skip_list(path: impl AsRef<Path>) -> Result<HashSet<String>> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(HashSet::new());
    }
    let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let mut words = HashSet::new();
    for (lineno, line) in BufReader::new(file).lines().enumerate() {
        let line =
            line.with_context(|| format!("read line {} in {}", lineno + 1, path.display()))?;
        let word = line.trim();
        if !word.is_empty() {
            words.insert(word.to_string());
        }
    }
    info!("loaded {} words to skip from {}", words.len(), path.display());
    Ok(words)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use tempfile::NamedTempFile;

    #[test]
    fn parses_two_and_three_column_lines() {
        let tsv = "# curated\nκαι\tκαι\tκαι conjunction<br>and\nνα\tνα particle<br>to\n\nείμαι\t\tείμαι verb<br>to be\n";
        let table = OverrideTable::from_reader(Cursor::new(tsv)).unwrap();
        assert_eq!(table.len(), 3);

        let kai = table.get("και").unwrap();
        assert_eq!(kai.final_text, "και conjunction<br>and");
        assert_eq!(kai.new_word.as_deref(), Some("και"));

        let na = table.get("να").unwrap();
        assert_eq!(na.new_word, None);
        assert_eq!(table.get("είμαι").unwrap().new_word, None);
        assert!(!table.contains("σκύλος"));
    }

    #[test]
    fn rejects_malformed_lines() {
        assert!(OverrideTable::from_reader(Cursor::new("only-one-field\n")).is_err());
        assert!(OverrideTable::from_reader(Cursor::new("a\tb\tc\td\n")).is_err());
        assert!(OverrideTable::from_reader(Cursor::new("a\t \n")).is_err());
    }

    #[test]
    fn later_duplicates_win() {
        let table = OverrideTable::from_reader(Cursor::new("x\tfirst\nx\tsecond\n")).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.get("x").unwrap().final_text, "second");
    }

    #[test]
    fn missing_files_are_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(OverrideTable::load(dir.path().join("none.tsv")).unwrap().is_empty());
        assert!(load_skip_list(dir.path().join("none.txt")).unwrap().is_empty());
    }

    #[test]
    fn loads_skip_list() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "του").unwrap();
        writeln!(file, "  ").unwrap();
        writeln!(file, "της  ").unwrap();
        let words = load_skip_list(file.path()).unwrap();
        assert_eq!(words.len(), 2);
        assert!(words.contains("της"));
    }
}
