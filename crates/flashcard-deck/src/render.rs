use std::fmt::Write;

use flashcard_types::{Homonym, NormalizedHeadword, Override};

use crate::overrides::OverrideTable;

const LINE_BREAK: &str = "\n";
const BLOCK_BREAK: &str = "\n\n";

/// Whether an override's replacement word is shown instead of the original.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum RenameMode {
    /// Always display the original headword.
    #[default]
    Keep,
    /// Display the override's `new_word` when it has one.
    Rename,
}

impl RenameMode {
    pub fn from_flag(rename: bool) -> Self {
        if rename {
            RenameMode::Rename
        } else {
            RenameMode::Keep
        }
    }
}

/// Final front/back pair for one headword. `text` uses `\n` line breaks.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Flashcard {
    pub word: String,
    pub text: String,
}

/// Render a kept headword. Overrides win over normalized content.
pub fn render(
    headword: &NormalizedHeadword,
    overrides: &OverrideTable,
    mode: RenameMode,
) -> Flashcard {
    if let Some(entry) = overrides.get(&headword.word) {
        return render_override(&headword.word, entry, mode);
    }

    let text = headword
        .homonyms
        .as_deref()
        .unwrap_or_default()
        .iter()
        .map(|homonym| render_homonym(&headword.word, homonym))
        .collect::<Vec<_>>()
        .join(BLOCK_BREAK);

    Flashcard {
        word: headword.word.clone(),
        text,
    }
}

pub fn render_override(word: &str, entry: &Override, mode: RenameMode) -> Flashcard {
    let word = match (mode, entry.new_word.as_deref()) {
        (RenameMode::Rename, Some(new_word)) => new_word,
        _ => word,
    };
    Flashcard {
        word: word.to_string(),
        text: entry.final_text.clone(),
    }
}

/// One block: a header line followed by the definition lines.
pub fn render_homonym(word: &str, homonym: &Homonym) -> String {
    let mut block = match (&homonym.gender, homonym.part_of_speech.is_noun()) {
        (Some(gender), true) => format!("{word} noun {gender}"),
        _ => format!("{word} {}", homonym.part_of_speech),
    };
    if let Some(plural) = &homonym.plural_form {
        let _ = write!(block, " (plural {plural})");
    }
    for line in &homonym.definition_lines {
        block.push_str(LINE_BREAK);
        block.push_str(line);
    }
    block
}
