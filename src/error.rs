use thiserror::Error;

use crate::types::RepresentationTag;

/// Convenience result type for conversion operations.
pub type ConversionResult<T> = Result<T, ConversionError>;

/// Convenience result type for probes and decoders.
pub type DecodeResult<T> = Result<T, DecodeError>;

/// Error type returned by the conversion entrypoints.
///
/// Decode failures never surface here individually: a failing probe only excludes a format and
/// a failing decode attempt only moves on to the next candidate.
#[derive(Debug, Error)]
pub enum ConversionError {
    /// The caller asked for a representation that no format in the matrix can produce.
    #[error("unsupported output type '{requested}'")]
    UnsupportedOutputType { requested: String },

    /// No format survived admissibility probing.
    #[error("unsupported format: no known format admits the resource at '{location}'")]
    UnsupportedFormat { location: String },

    /// The requested representation is not advertised by any candidate format.
    #[error("the resource cannot be converted into the requested representation {representation}")]
    UnsupportedRepresentation { representation: RepresentationTag },

    /// Every planned conversion failed to decode.
    #[error("no viable conversion for '{location}' ({attempted} candidate(s) attempted)")]
    NoViableConversion { location: String, attempted: usize },

    /// Fetching or opening the resource failed.
    #[error("failed to acquire '{location}': {reason}")]
    Acquisition { location: String, reason: String },

    /// A custom compatibility matrix violates its invariants.
    #[error("invalid compatibility matrix: {message}")]
    InvalidMatrix { message: String },
}

/// Why a probe rejected a format, or why a decoder could not produce a representation.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Underlying I/O error while reading or rewinding the resource stream.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parse error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Delimited text parse error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[cfg(feature = "excel")]
    /// Excel error (feature-gated behind `excel`).
    #[error("excel error: {0}")]
    Excel(#[from] calamine::Error),

    /// Markup is not well formed.
    #[error("markup error: {message}")]
    Markup { message: String },

    /// The content parsed but its shape does not fit the target representation.
    #[error("shape mismatch: {message}")]
    Shape { message: String },

    /// The resource has no textual content to decode.
    #[error("resource content is not text")]
    NotText,

    /// No decoder is registered for the requested conversion.
    #[error("no decoder registered for {format} -> {representation}")]
    MissingDecoder {
        format: crate::types::FormatTag,
        representation: RepresentationTag,
    },

    /// The format needs a cargo feature that is not enabled.
    #[error("{message}")]
    FeatureDisabled { message: String },
}

impl DecodeError {
    pub(crate) fn shape(message: impl Into<String>) -> Self {
        Self::Shape {
            message: message.into(),
        }
    }
}
