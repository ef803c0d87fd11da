//! Turn raw Wiktionary-shaped entries into ordered [`Homonym`] lists.
//!
//! Etymologies are flattened in order, numeral and letter sections are
//! skipped, noise lines are removed, and nouns get their gender and plural
//! pulled out of the annotation line (see [`annotation`]).
//!
//! The entry shape is assumed, not negotiated: anything that does not fit the
//! annotation grammar or the noise-marker convention is a [`SchemaError`] and
//! must stop the run.
//!
//! ```rust
//! use flashcard_normalize::normalize;
//! use flashcard_types::{Etymology, RawDefinition, RawEntry};
//!
//! let entry = RawEntry {
//!     etymologies: vec![Etymology {
//!         definitions: vec![RawDefinition {
//!             part_of_speech: "noun".into(),
//!             text_lines: vec!["σκύλος • (skílos) m".into(), "dog".into()],
//!         }],
//!     }],
//! };
//! let homonyms = normalize(Some(&entry)).unwrap().unwrap();
//! assert_eq!(homonyms[0].definition_lines, vec!["dog"]);
//! assert_eq!(normalize(None).unwrap(), None);
//! ```

pub mod annotation;

use flashcard_types::{Homonym, PartOfSpeech, RawDefinition, RawEntry};
use thiserror::Error;
use tracing::debug;

pub use annotation::{AnnotationStep, NounAnnotation, parse_gender, parse_noun_annotation};

/// Marks a definition line as a dated notice or a cross-reference.
pub const NOISE_MARKER: char = '\u{a0}';
const DATED: &str = "dated";
const FORM_OF: &str = "form of";

/// The entry does not match the shape the normalizer was written against.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum SchemaError {
    #[error("noun definition has no annotation line")]
    MissingAnnotation,
    #[error("annotation {step} did not parse: {line:?}")]
    Annotation { step: AnnotationStep, line: String },
    #[error("annotation mentions a plural without a `(plural ...)` group: {line:?}")]
    MissingPlural { line: String },
    #[error("noise-marked line is neither dated nor a form-of reference: {line:?}")]
    UnrecognizedNoise { line: String },
}

/// What a candidate definition line turned out to be.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LineKind {
    Definition,
    Dated,
    FormOf,
}

impl LineKind {
    pub fn is_noise(self) -> bool {
        !matches!(self, LineKind::Definition)
    }
}

/// Normalize one entry. `None` in, `None` out; an entry without usable
/// sections yields `Some(vec![])`.
pub fn normalize(entry: Option<&RawEntry>) -> Result<Option<Vec<Homonym>>, SchemaError> {
    let Some(entry) = entry else {
        return Ok(None);
    };

    entry
        .etymologies
        .iter()
        .flat_map(|etymology| etymology.definitions.iter())
        .filter(|definition| {
            let pos = PartOfSpeech::from_tag(&definition.part_of_speech);
            if pos.is_excluded() {
                debug!("skipping {pos} section");
                return false;
            }
            true
        })
        .map(parse_definition)
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}

/// Convert a single part-of-speech section into a [`Homonym`].
pub fn parse_definition(definition: &RawDefinition) -> Result<Homonym, SchemaError> {
    let part_of_speech = PartOfSpeech::from_tag(&definition.part_of_speech);
    let (annotation, candidates) = match definition.text_lines.split_first() {
        Some((first, rest)) => (Some(first.as_str()), rest),
        None => (None, &[][..]),
    };

    let mut definition_lines = Vec::with_capacity(candidates.len());
    for line in candidates {
        if classify_line(line)?.is_noise() {
            continue;
        }
        definition_lines.push(collapse_whitespace(line));
    }

    let (gender, plural_form) = if part_of_speech.is_noun() {
        let line = annotation.ok_or(SchemaError::MissingAnnotation)?;
        let parsed = parse_noun_annotation(line)?;
        (Some(parsed.gender), parsed.plural_form)
    } else {
        (None, None)
    };

    Ok(Homonym {
        part_of_speech,
        definition_lines,
        gender,
        plural_form,
    })
}

/// Classify a candidate definition line by the noise-marker convention.
///
/// Unmarked lines are definitions. Marked lines must be a dated notice or
/// start with `form of`.
pub fn classify_line(line: &str) -> Result<LineKind, SchemaError> {
    if !line.contains(NOISE_MARKER) {
        return Ok(LineKind::Definition);
    }
    if line.contains(DATED) {
        return Ok(LineKind::Dated);
    }
    if line
        .trim_start()
        .replace(NOISE_MARKER, " ")
        .starts_with(FORM_OF)
    {
        return Ok(LineKind::FormOf);
    }
    Err(SchemaError::UnrecognizedNoise {
        line: line.to_string(),
    })
}

/// Collapse every whitespace run (including the noise marker) to one space
/// and trim the ends.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
