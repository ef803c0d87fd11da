//! Tokenizer for the compact annotation line that opens every definition.
//!
//! Only nouns carry structured fields. The grammar accepted here is:
//!
//! ```text
//! annotation    := word WS* '•' WS* '(' pronunciation ')' WS* genders tail
//! genders       := mark ( (',' | WS)+ mark )*
//! mark          := 'm' | 'f' | 'n'
//! tail          := ( WS* '(' 'plural' WS+ plural-form ')' )? any*
//! ```
//!
//! The gender run ends at the first `(` or `plural` after the pronunciation.
//! Whenever the tail mentions `plural`, the `(plural ...)` group is mandatory.

use std::fmt;

use flashcard_types::{Gender, GenderMark};

use crate::{SchemaError, collapse_whitespace};

pub const BULLET: char = '•';
const PLURAL_KEYWORD: &str = "plural";
const PLURAL_OPEN: &str = "(plural";

/// Fields recovered from a noun's annotation line.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NounAnnotation {
    pub word: String,
    pub pronunciation: String,
    pub gender: Gender,
    pub plural_form: Option<String>,
}

/// The grammar element that failed to match.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AnnotationStep {
    Bullet,
    Headword,
    Pronunciation,
    Gender,
    Plural,
}

impl fmt::Display for AnnotationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AnnotationStep::Bullet => "bullet separator",
            AnnotationStep::Headword => "headword",
            AnnotationStep::Pronunciation => "pronunciation",
            AnnotationStep::Gender => "gender tokens",
            AnnotationStep::Plural => "plural form",
        })
    }
}

/// Parse a noun annotation such as `σκύλος • (skílos) m (plural σκύλοι)`.
pub fn parse_noun_annotation(line: &str) -> Result<NounAnnotation, SchemaError> {
    let fail = |step| SchemaError::Annotation {
        step,
        line: line.to_string(),
    };

    let (head, after_bullet) = line
        .split_once(BULLET)
        .ok_or_else(|| fail(AnnotationStep::Bullet))?;
    let word = head.trim();
    if word.is_empty() {
        return Err(fail(AnnotationStep::Headword));
    }

    let (pronunciation, rest) = after_bullet
        .trim_start()
        .strip_prefix('(')
        .and_then(|s| s.split_once(')'))
        .ok_or_else(|| fail(AnnotationStep::Pronunciation))?;
    let pronunciation = pronunciation.trim();
    if pronunciation.is_empty() {
        return Err(fail(AnnotationStep::Pronunciation));
    }

    let gender_end = [rest.find('('), rest.find(PLURAL_KEYWORD)]
        .into_iter()
        .flatten()
        .min()
        .unwrap_or(rest.len());
    let gender = parse_gender(&rest[..gender_end]).ok_or_else(|| fail(AnnotationStep::Gender))?;

    let plural_form = if rest.contains(PLURAL_KEYWORD) {
        let form = parse_plural(&rest[gender_end..]).ok_or_else(|| SchemaError::MissingPlural {
            line: line.to_string(),
        })?;
        Some(form)
    } else {
        None
    };

    Ok(NounAnnotation {
        word: word.to_string(),
        pronunciation: pronunciation.to_string(),
        gender,
        plural_form,
    })
}

/// Parse a run of gender marks separated by commas and/or whitespace.
pub fn parse_gender(tokens: &str) -> Option<Gender> {
    let marks = tokens
        .trim()
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
        .map(GenderMark::from_token)
        .collect::<Option<Vec<_>>>()?;
    if marks.is_empty() {
        return None;
    }
    Some(Gender::new(marks))
}

fn parse_plural(tail: &str) -> Option<String> {
    let start = tail.find(PLURAL_OPEN)?;
    let after = &tail[start + PLURAL_OPEN.len()..];
    if !after.starts_with(char::is_whitespace) {
        return None;
    }
    let (form, _) = after.split_once(')')?;
    let form = collapse_whitespace(form);
    if form.is_empty() { None } else { Some(form) }
}
