//! Conversion planning.

use crate::error::{ConversionError, ConversionResult};
use crate::types::{FormatTag, RepresentationTag};

use super::matrix::CompatibilityMatrix;

/// A `(format, representation)` pair to attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConversionCandidate {
    pub format: FormatTag,
    pub representation: RepresentationTag,
}

impl ConversionCandidate {
    pub fn new(format: FormatTag, representation: RepresentationTag) -> Self {
        Self {
            format,
            representation,
        }
    }
}

/// Order the conversions to attempt.
///
/// Formats are visited in the given (probe) order and each format's representations in matrix
/// order; pairs are emitted once, in first-seen order. With `requested` set only matching pairs
/// are emitted, and [`ConversionError::UnsupportedRepresentation`] is returned when no format
/// advertises it.
pub fn plan(
    matrix: &CompatibilityMatrix,
    formats: &[FormatTag],
    requested: Option<RepresentationTag>,
) -> ConversionResult<Vec<ConversionCandidate>> {
    let mut candidates: Vec<ConversionCandidate> = Vec::new();
    let mut requested_seen = false;

    for &format in formats {
        for &representation in matrix.representations(format) {
            if let Some(want) = requested {
                if representation != want {
                    continue;
                }
                requested_seen = true;
            }
            let candidate = ConversionCandidate::new(format, representation);
            if !candidates.contains(&candidate) {
                candidates.push(candidate);
            }
        }
    }

    match requested {
        Some(representation) if !requested_seen => {
            Err(ConversionError::UnsupportedRepresentation { representation })
        }
        _ => Ok(candidates),
    }
}
