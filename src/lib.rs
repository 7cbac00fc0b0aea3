//! `rust-data-objectify` converts a structured-data resource of unknown format into a
//! caller-selected in-memory representation, without the caller declaring the format.
//!
//! The primary entrypoint is [`conversion::convert_from_location`]: pass a local path or URL and
//! optionally the [`types::RepresentationTag`] you want back.
//!
//! ## What it recognises
//!
//! Formats are detected by probing the content, never by file extension. Probes run in this
//! order, which is also the priority when content fits more than one format:
//!
//! | format      | admissible when                                                   | representations          |
//! |-------------|-------------------------------------------------------------------|--------------------------|
//! | json        | the whole text parses as JSON                                     | mapping, sequence, table |
//! | csv         | every record has the same number (> 1) of comma-separated fields  | sequence                 |
//! | tsv         | every record has the same number (> 1) of tab-separated fields    | sequence                 |
//! | xml         | well-formed markup whose first non-space character is `<`         | mapping                  |
//! | spreadsheet | the workbook opens and reads (requires the Cargo feature `excel`) | table                    |
//!
//! Conversions are attempted in that order until one decodes; probing is a heuristic, so a
//! failed decode just moves on to the next candidate.
//!
//! ## Representations
//!
//! - [`types::Representation::Mapping`]: a JSON object (a top-level JSON array is wrapped as
//!   `{"data": [...]}`)
//! - [`types::Representation::Sequence`]: a list of records (a top-level JSON object is wrapped
//!   as `[{...}]`)
//! - [`types::Representation::Table`]: a typed [`types::DataSet`]; nested JSON objects flatten
//!   into dot-path columns such as `user.name`
//!
//! ## Quick example
//!
//! ```no_run
//! use rust_data_objectify::{convert_from_location, Representation, RepresentationTag};
//!
//! # fn main() -> Result<(), rust_data_objectify::ConversionError> {
//! let value = convert_from_location("./data/people.json", Some(RepresentationTag::Table))?;
//! if let Representation::Table(ds) = value {
//!     println!("columns={:?} rows={}", ds.schema.field_names().collect::<Vec<_>>(), ds.row_count());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`conversion`]: the entrypoint plus the prober, planner, executor and observers
//! - [`decode`]: per-format probes and decoders, and the decoder registry
//! - [`resource`]: locality classification and resource acquisition
//! - [`types`]: format/representation tags and the table data model
//! - [`error`]: error types

pub mod conversion;
pub mod decode;
pub mod error;
pub mod resource;
pub mod types;

pub use conversion::{ConversionOptions, Converter, convert_from_location, convert_from_location_as};
pub use error::{ConversionError, ConversionResult, DecodeError, DecodeResult};
pub use types::{FormatTag, Representation, RepresentationTag};
