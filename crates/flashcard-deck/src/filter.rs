use std::fmt;

use flashcard_types::NormalizedHeadword;

use crate::overrides::OverrideTable;

/// Why a headword was sent to manual curation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DropReason {
    /// No raw entry was fetched.
    NoEntry,
    /// The entry had no usable part-of-speech sections.
    NoHomonyms,
    /// Every section lost all its lines to noise.
    NoDefinitions,
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DropReason::NoEntry => "no dictionary entry",
            DropReason::NoHomonyms => "no usable sections",
            DropReason::NoDefinitions => "no definition lines",
        })
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Verdict {
    Keep,
    Drop(DropReason),
}

impl Verdict {
    pub fn is_keep(self) -> bool {
        matches!(self, Verdict::Keep)
    }
}

/// Decide whether a headword is usable as it stands.
pub fn verdict(headword: &NormalizedHeadword, overrides: &OverrideTable) -> Verdict {
    if overrides.contains(&headword.word) {
        return Verdict::Keep;
    }
    match headword.homonyms.as_deref() {
        None => Verdict::Drop(DropReason::NoEntry),
        Some([]) => Verdict::Drop(DropReason::NoHomonyms),
        Some(homonyms) => {
            if homonyms.iter().any(|h| !h.definition_lines.is_empty()) {
                Verdict::Keep
            } else {
                Verdict::Drop(DropReason::NoDefinitions)
            }
        }
    }
}

pub fn is_good(headword: &NormalizedHeadword, overrides: &OverrideTable) -> bool {
    verdict(headword, overrides).is_keep()
}

/// Words that failed [`verdict`], in the order they were recorded.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct DroppedReport {
    words: Vec<String>,
}

impl DroppedReport {
    /// Run the filter and remember the word if it is dropped.
    pub fn check(&mut self, headword: &NormalizedHeadword, overrides: &OverrideTable) -> Verdict {
        let verdict = verdict(headword, overrides);
        if !verdict.is_keep() {
            self.words.push(headword.word.clone());
        }
        verdict
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl From<Vec<String>> for DroppedReport {
    fn from(words: Vec<String>) -> Self {
        Self { words }
    }
}
