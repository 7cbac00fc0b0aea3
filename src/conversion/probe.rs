//! Format admissibility probing.
//!
//! Every known [`FormatTag`] gets one independent probe against the resource. A probe either
//! admits the format or rejects it with a reason; a rejection never stops the remaining probes.
//! Probes that read the shared stream rewind it before returning, so their order has no effect
//! on each other.

use tracing::debug;

use crate::decode::{SheetSelection, delimited, json, markup};
use crate::error::{ConversionError, ConversionResult, DecodeError, DecodeResult};
use crate::resource::ResourceDescriptor;
use crate::types::FormatTag;

/// The result of probing one format.
#[derive(Debug)]
pub struct ProbeOutcome {
    pub format: FormatTag,
    /// `Ok` when the format is admissible, otherwise the reason it was rejected.
    pub verdict: DecodeResult<()>,
}

impl ProbeOutcome {
    pub fn is_admissible(&self) -> bool {
        self.verdict.is_ok()
    }
}

/// Outcomes for every probed format, in declaration order.
#[derive(Debug)]
pub struct ProbeReport {
    pub outcomes: Vec<ProbeOutcome>,
}

impl ProbeReport {
    /// Admissible formats, in declaration order.
    pub fn admissible(&self) -> Vec<FormatTag> {
        self.outcomes
            .iter()
            .filter(|o| o.is_admissible())
            .map(|o| o.format)
            .collect()
    }

    /// The rejection reason for `format`, if it was probed and rejected.
    pub fn rejection(&self, format: FormatTag) -> Option<&DecodeError> {
        self.outcomes
            .iter()
            .find(|o| o.format == format)
            .and_then(|o| o.verdict.as_ref().err())
    }
}

/// Runs admissibility probes for every known format.
#[derive(Debug, Clone, Default)]
pub struct FormatProber {
    #[cfg_attr(not(feature = "excel"), allow(dead_code))]
    sheet_selection: SheetSelection,
}

impl FormatProber {
    /// Create a prober; `sheet_selection` is used by the spreadsheet probe.
    pub fn new(sheet_selection: SheetSelection) -> Self {
        Self { sheet_selection }
    }

    /// Probe every format in [`FormatTag::ALL`] order and report each outcome.
    pub fn probe(&self, resource: &mut ResourceDescriptor) -> ProbeReport {
        let outcomes = FormatTag::ALL
            .iter()
            .map(|&format| {
                let verdict = self.probe_one(resource, format);
                match &verdict {
                    Ok(()) => debug!(location = resource.location(), %format, "format admitted"),
                    Err(reason) => {
                        debug!(location = resource.location(), %format, %reason, "format rejected")
                    }
                }
                ProbeOutcome { format, verdict }
            })
            .collect();
        ProbeReport { outcomes }
    }

    /// Admissible formats in declaration order; fails with
    /// [`ConversionError::UnsupportedFormat`] when none survive.
    pub fn probe_formats(&self, resource: &mut ResourceDescriptor) -> ConversionResult<Vec<FormatTag>> {
        let formats = self.probe(resource).admissible();
        if formats.is_empty() {
            return Err(ConversionError::UnsupportedFormat {
                location: resource.location().to_string(),
            });
        }
        Ok(formats)
    }

    /// Run the probe for a single format.
    pub fn probe_one(&self, resource: &mut ResourceDescriptor, format: FormatTag) -> DecodeResult<()> {
        let verdict = match format {
            FormatTag::Json => json::probe_json(resource),
            FormatTag::Csv => delimited::probe_csv(resource),
            FormatTag::Tsv => delimited::probe_tsv(resource),
            FormatTag::Xml => markup::probe_xml(resource),
            FormatTag::Spreadsheet => self.probe_spreadsheet(resource),
        };
        // Leave the stream at the start whatever the probe did.
        resource.rewind()?;
        verdict
    }

    #[cfg(feature = "excel")]
    fn probe_spreadsheet(&self, resource: &mut ResourceDescriptor) -> DecodeResult<()> {
        crate::decode::excel::probe_spreadsheet(resource, &self.sheet_selection)
    }

    #[cfg(not(feature = "excel"))]
    fn probe_spreadsheet(&self, _resource: &mut ResourceDescriptor) -> DecodeResult<()> {
        Err(DecodeError::FeatureDisabled {
            message: "spreadsheet probing not enabled (enable cargo feature 'excel')".to_string(),
        })
    }
}

/// Probe with default settings; see [`FormatProber::probe_formats`].
pub fn probe_formats(resource: &mut ResourceDescriptor) -> ConversionResult<Vec<FormatTag>> {
    FormatProber::default().probe_formats(resource)
}
