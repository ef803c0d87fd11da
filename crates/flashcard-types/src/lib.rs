//! Shared types that mirror the Wiktionary entry shape and the records built
//! from it.
//!
//! Raw types ([`RawEntry`], [`Etymology`], [`RawDefinition`]) deserialize
//! directly from the scraper's JSON and are never mutated. Normalized types
//! ([`Homonym`], [`NormalizedHeadword`]) are recomputed on every run.
//! [`Override`] is the single shape for curated replacements.
//!
//! ```rust
//! use flashcard_types::{Gender, GenderMark, PartOfSpeech};
//!
//! let pos = PartOfSpeech::from_tag("noun");
//! assert!(pos.is_noun());
//! let gender = Gender::new(vec![GenderMark::Masculine, GenderMark::Feminine]);
//! assert_eq!(gender.to_string(), "m, f");
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// A fetched dictionary entry: one or more etymologies for a single headword.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawEntry {
    pub etymologies: Vec<Etymology>,
}

/// One origin grouping inside an entry.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Etymology {
    #[serde(default)]
    pub definitions: Vec<RawDefinition>,
}

/// A single part-of-speech section as scraped.
///
/// `text_lines[0]` is the compact annotation line (headword, pronunciation,
/// and for nouns gender and optional plural). The remaining lines are
/// candidate definitions.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct RawDefinition {
    #[serde(rename = "partOfSpeech")]
    pub part_of_speech: String,
    #[serde(rename = "text", default)]
    pub text_lines: Vec<String>,
}

/// Part-of-speech tag, with the handful the pipeline treats specially broken out.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum PartOfSpeech {
    Noun,
    Numeral,
    Letter,
    Other(String),
}

impl PartOfSpeech {
    /// Classify a scraped tag. Matching is case-insensitive.
    pub fn from_tag(tag: &str) -> Self {
        let tag = tag.trim();
        match tag.to_lowercase().as_str() {
            "noun" => PartOfSpeech::Noun,
            "numeral" => PartOfSpeech::Numeral,
            "letter" => PartOfSpeech::Letter,
            _ => PartOfSpeech::Other(tag.to_string()),
        }
    }

    pub fn is_noun(&self) -> bool {
        matches!(self, PartOfSpeech::Noun)
    }

    /// Numerals and letters never make useful flashcards.
    pub fn is_excluded(&self) -> bool {
        matches!(self, PartOfSpeech::Numeral | PartOfSpeech::Letter)
    }
}

impl fmt::Display for PartOfSpeech {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PartOfSpeech::Noun => "noun",
            PartOfSpeech::Numeral => "numeral",
            PartOfSpeech::Letter => "letter",
            PartOfSpeech::Other(tag) => tag,
        })
    }
}

/// One grammatical gender token from a noun annotation.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum GenderMark {
    Masculine,
    Feminine,
    Neuter,
}

impl GenderMark {
    /// Parse the single-letter token used in annotations (`m`, `f`, `n`).
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "m" => Some(GenderMark::Masculine),
            "f" => Some(GenderMark::Feminine),
            "n" => Some(GenderMark::Neuter),
            _ => None,
        }
    }

    pub fn to_char(self) -> char {
        match self {
            GenderMark::Masculine => 'm',
            GenderMark::Feminine => 'f',
            GenderMark::Neuter => 'n',
        }
    }
}

/// Ordered, non-empty combination of gender marks (`m`, `m, f`, ...).
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Gender {
    marks: Vec<GenderMark>,
}

impl Gender {
    pub fn new(marks: Vec<GenderMark>) -> Self {
        debug_assert!(!marks.is_empty(), "gender needs at least one mark");
        Self { marks }
    }

    pub fn marks(&self) -> &[GenderMark] {
        &self.marks
    }
}

impl From<GenderMark> for Gender {
    fn from(mark: GenderMark) -> Self {
        Self { marks: vec![mark] }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, mark) in self.marks.iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", mark.to_char())?;
        }
        Ok(())
    }
}

/// One part-of-speech sense after flattening etymologies and dropping noise.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Homonym {
    pub part_of_speech: PartOfSpeech,
    pub definition_lines: Vec<String>,
    /// Present only for nouns.
    pub gender: Option<Gender>,
    /// Present only for nouns whose annotation mentions a plural.
    pub plural_form: Option<String>,
}

/// A headword with its normalized senses.
///
/// `homonyms` is `None` exactly when no raw entry was available; `Some(vec![])`
/// means the entry existed but produced no senses.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NormalizedHeadword {
    pub word: String,
    pub frequency: u64,
    pub homonyms: Option<Vec<Homonym>>,
}

/// A stored headword as handed over by the storage collaborator.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct HeadwordRecord {
    pub word: String,
    pub frequency: u64,
    #[serde(default)]
    pub raw_entry: Option<RawEntry>,
}

impl HeadwordRecord {
    /// A freshly ingested record that has not been fetched yet.
    pub fn unfetched(word: impl Into<String>, frequency: u64) -> Self {
        Self {
            word: word.into(),
            frequency,
            raw_entry: None,
        }
    }
}

/// Manually curated replacement for a word's rendered text.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Override {
    pub final_text: String,
    /// Display word to use instead of the original, when renaming is enabled.
    pub new_word: Option<String>,
}

impl Override {
    pub fn new(final_text: impl Into<String>) -> Self {
        Self {
            final_text: final_text.into(),
            new_word: None,
        }
    }

    pub fn with_new_word(mut self, new_word: impl Into<String>) -> Self {
        self.new_word = Some(new_word.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_parts_of_speech() {
        assert_eq!(PartOfSpeech::from_tag("Noun"), PartOfSpeech::Noun);
        assert!(PartOfSpeech::from_tag("numeral").is_excluded());
        assert!(PartOfSpeech::from_tag("letter").is_excluded());
        let verb = PartOfSpeech::from_tag("verb");
        assert!(!verb.is_noun());
        assert!(!verb.is_excluded());
        assert_eq!(verb.to_string(), "verb");
    }

    #[test]
    fn gender_display_joins_marks() {
        assert_eq!(Gender::from(GenderMark::Neuter).to_string(), "n");
        let both = Gender::new(vec![GenderMark::Masculine, GenderMark::Feminine]);
        assert_eq!(both.to_string(), "m, f");
        assert_eq!(GenderMark::from_token("x"), None);
    }

    #[test]
    fn deserializes_scraper_shape() {
        let json = r#"{
            "word": "σκύλος",
            "frequency": 1200,
            "raw_entry": [
                {
                    "etymology": "From Ancient Greek",
                    "definitions": [
                        {"partOfSpeech": "noun", "text": ["σκύλος • (skílos) m", "dog"]}
                    ]
                }
            ]
        }"#;
        let record: HeadwordRecord = serde_json::from_str(json).unwrap();
        let entry = record.raw_entry.expect("entry present");
        assert_eq!(entry.etymologies.len(), 1);
        let def = &entry.etymologies[0].definitions[0];
        assert_eq!(def.part_of_speech, "noun");
        assert_eq!(def.text_lines, vec!["σκύλος • (skílos) m", "dog"]);
    }

    #[test]
    fn missing_raw_entry_is_none() {
        let record: HeadwordRecord =
            serde_json::from_str(r#"{"word": "και", "frequency": 9}"#).unwrap();
        assert_eq!(record.raw_entry, None);
        let record: HeadwordRecord =
            serde_json::from_str(r#"{"word": "και", "frequency": 9, "raw_entry": []}"#).unwrap();
        assert_eq!(record.raw_entry, Some(RawEntry::default()));
    }
}
