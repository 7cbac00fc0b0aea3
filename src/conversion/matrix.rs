//! Static table of which representations each format can produce.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use crate::error::{ConversionError, ConversionResult};
use crate::types::{FormatTag, RepresentationTag};

static BASELINE: LazyLock<CompatibilityMatrix> = LazyLock::new(|| CompatibilityMatrix {
    entries: BTreeMap::from([
        (
            FormatTag::Json,
            vec![
                RepresentationTag::Mapping,
                RepresentationTag::Sequence,
                RepresentationTag::Table,
            ],
        ),
        (FormatTag::Csv, vec![RepresentationTag::Sequence]),
        (FormatTag::Tsv, vec![RepresentationTag::Sequence]),
        (FormatTag::Xml, vec![RepresentationTag::Mapping]),
        (FormatTag::Spreadsheet, vec![RepresentationTag::Table]),
    ]),
});

/// Immutable mapping from each [`FormatTag`] to the ordered representations it can produce.
///
/// Invariants: every listed format has at least one representation, and no representation
/// appears twice for the same format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompatibilityMatrix {
    entries: BTreeMap<FormatTag, Vec<RepresentationTag>>,
}

impl CompatibilityMatrix {
    /// The built-in table, initialised once per process.
    ///
    /// | format      | representations          |
    /// |-------------|--------------------------|
    /// | json        | mapping, sequence, table |
    /// | csv         | sequence                 |
    /// | tsv         | sequence                 |
    /// | xml         | mapping                  |
    /// | spreadsheet | table                    |
    pub fn baseline() -> &'static CompatibilityMatrix {
        &BASELINE
    }

    /// Build a custom matrix, validating its invariants.
    ///
    /// Formats left out of `entries` can never be planned, even if they probe as admissible.
    pub fn new(
        entries: impl IntoIterator<Item = (FormatTag, Vec<RepresentationTag>)>,
    ) -> ConversionResult<Self> {
        let mut map = BTreeMap::new();
        for (format, reprs) in entries {
            if reprs.is_empty() {
                return Err(ConversionError::InvalidMatrix {
                    message: format!("format {format} has no representations"),
                });
            }
            for (i, r) in reprs.iter().enumerate() {
                if reprs[..i].contains(r) {
                    return Err(ConversionError::InvalidMatrix {
                        message: format!("format {format} lists {r} more than once"),
                    });
                }
            }
            if map.insert(format, reprs).is_some() {
                return Err(ConversionError::InvalidMatrix {
                    message: format!("format {format} listed more than once"),
                });
            }
        }
        Ok(Self { entries: map })
    }

    /// Representations for `format`, in declared order. Empty if the format is not listed.
    pub fn representations(&self, format: FormatTag) -> &[RepresentationTag] {
        self.entries.get(&format).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether any format in the matrix produces `representation`.
    pub fn supports_representation(&self, representation: RepresentationTag) -> bool {
        self.entries.values().any(|reprs| reprs.contains(&representation))
    }

    /// Iterate `(format, representations)` in format declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (FormatTag, &[RepresentationTag])> {
        self.entries.iter().map(|(f, r)| (*f, r.as_slice()))
    }
}

impl Default for CompatibilityMatrix {
    fn default() -> Self {
        Self::baseline().clone()
    }
}
