//! Per-format probes and decoders.
//!
//! Each format module exposes an admissibility probe (`probe_*`) and one decoder per
//! representation the format supports (`decode_*`). Decoders are looked up through a
//! [`DecoderRegistry`] keyed by `(format, representation)`, so new conversions can be added
//! without touching the executor.
//!
//! - [`json`]: mapping, sequence and table
//! - [`delimited`]: CSV / TSV records
//! - [`markup`]: XML element-tree mapping
//! - `excel`: spreadsheet tables (requires the Cargo feature `excel`)

pub mod delimited;
#[cfg(feature = "excel")]
pub mod excel;
pub mod json;
pub mod markup;
mod table;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::DecodeResult;
use crate::resource::ResourceDescriptor;
use crate::types::{FormatTag, Representation, RepresentationTag};

/// How to choose sheet(s) when decoding a spreadsheet workbook.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SheetSelection {
    /// Decode the first sheet (default).
    #[default]
    First,
    /// Decode a single named sheet.
    Sheet(String),
    /// Decode all sheets and concatenate rows.
    AllSheets,
    /// Decode only the listed sheets (in order) and concatenate rows.
    Sheets(Vec<String>),
}

/// Converts a resource into one representation.
pub trait Decoder: Send + Sync {
    fn decode(&self, resource: &mut ResourceDescriptor) -> DecodeResult<Representation>;
}

impl<F> Decoder for F
where
    F: Fn(&mut ResourceDescriptor) -> DecodeResult<Representation> + Send + Sync,
{
    fn decode(&self, resource: &mut ResourceDescriptor) -> DecodeResult<Representation> {
        self(resource)
    }
}

/// Capability-indexed table of decoders.
#[derive(Clone, Default)]
pub struct DecoderRegistry {
    decoders: HashMap<(FormatTag, RepresentationTag), Arc<dyn Decoder>>,
}

impl fmt::Debug for DecoderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<_> = self.decoders.keys().copied().collect();
        keys.sort();
        f.debug_struct("DecoderRegistry")
            .field("conversions", &keys)
            .finish()
    }
}

impl DecoderRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in decoders for every conversion in the baseline compatibility matrix.
    ///
    /// `sheet_selection` controls which sheets the spreadsheet decoder reads.
    pub fn standard(sheet_selection: SheetSelection) -> Self {
        let mut registry = Self::new();
        registry
            .register(FormatTag::Json, RepresentationTag::Mapping, json::decode_json_mapping)
            .register(FormatTag::Json, RepresentationTag::Sequence, json::decode_json_sequence)
            .register(FormatTag::Json, RepresentationTag::Table, json::decode_json_table)
            .register(FormatTag::Csv, RepresentationTag::Sequence, delimited::decode_csv_sequence)
            .register(FormatTag::Tsv, RepresentationTag::Sequence, delimited::decode_tsv_sequence)
            .register(FormatTag::Xml, RepresentationTag::Mapping, markup::decode_xml_mapping);

        #[cfg(feature = "excel")]
        registry.register(
            FormatTag::Spreadsheet,
            RepresentationTag::Table,
            move |resource: &mut ResourceDescriptor| {
                excel::decode_spreadsheet_table(resource, &sheet_selection)
            },
        );
        #[cfg(not(feature = "excel"))]
        let _ = sheet_selection;

        registry
    }

    /// Register (or replace) the decoder for `(format, representation)`.
    pub fn register(
        &mut self,
        format: FormatTag,
        representation: RepresentationTag,
        decoder: impl Decoder + 'static,
    ) -> &mut Self {
        self.decoders.insert((format, representation), Arc::new(decoder));
        self
    }

    /// The decoder for `(format, representation)`, if registered.
    pub fn get(&self, format: FormatTag, representation: RepresentationTag) -> Option<&dyn Decoder> {
        self.decoders
            .get(&(format, representation))
            .map(|d| d.as_ref())
    }

    pub fn contains(&self, format: FormatTag, representation: RepresentationTag) -> bool {
        self.decoders.contains_key(&(format, representation))
    }
}
