//! Conversion execution.

use tracing::debug;

use crate::decode::DecoderRegistry;
use crate::error::{ConversionError, ConversionResult, DecodeError};
use crate::resource::ResourceDescriptor;
use crate::types::Representation;

use super::planner::ConversionCandidate;

/// The first successful conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionOutcome {
    /// The candidate that decoded.
    pub candidate: ConversionCandidate,
    /// The decoded value, exactly as the decoder returned it.
    pub value: Representation,
    /// Number of candidates tried, including the successful one.
    pub attempts: usize,
}

/// Try `candidates` in order and return the first successful decode.
///
/// Decode failures are expected (probing is heuristic) and only move on to the next
/// candidate; a candidate without a registered decoder counts as failed. When every candidate
/// fails the result is [`ConversionError::NoViableConversion`].
pub fn execute(
    registry: &DecoderRegistry,
    resource: &mut ResourceDescriptor,
    candidates: &[ConversionCandidate],
) -> ConversionResult<ConversionOutcome> {
    for (idx0, &candidate) in candidates.iter().enumerate() {
        match attempt(registry, resource, candidate) {
            Ok(value) => {
                debug!(
                    location = resource.location(),
                    format = %candidate.format,
                    representation = %candidate.representation,
                    "conversion succeeded"
                );
                return Ok(ConversionOutcome {
                    candidate,
                    value,
                    attempts: idx0 + 1,
                });
            }
            Err(reason) => debug!(
                location = resource.location(),
                format = %candidate.format,
                representation = %candidate.representation,
                %reason,
                "conversion attempt failed"
            ),
        }
    }

    Err(ConversionError::NoViableConversion {
        location: resource.location().to_string(),
        attempted: candidates.len(),
    })
}

fn attempt(
    registry: &DecoderRegistry,
    resource: &mut ResourceDescriptor,
    candidate: ConversionCandidate,
) -> Result<Representation, DecodeError> {
    let decoder = registry
        .get(candidate.format, candidate.representation)
        .ok_or(DecodeError::MissingDecoder {
            format: candidate.format,
            representation: candidate.representation,
        })?;
    resource.rewind()?;
    decoder.decode(resource)
}
