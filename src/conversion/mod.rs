//! Format sniffing and conversion dispatch.
//!
//! Most callers should use [`convert_from_location`] (from [`unified`]), which:
//!
//! - classifies the location as local or remote and acquires the resource
//! - probes which formats the content could be ([`probe`])
//! - plans `(format, representation)` candidates from the [`CompatibilityMatrix`] ([`planner`])
//! - tries candidates in order until one decodes ([`executor`])
//! - optionally reports success/failure/alerts to a [`ConversionObserver`]
//!
//! The components are public so callers can run individual steps against a
//! [`crate::resource::ResourceDescriptor`] they built themselves.

pub mod executor;
pub mod matrix;
pub mod observability;
pub mod planner;
pub mod probe;
pub mod unified;

/// Default cap on remote response bodies (64 MiB).
pub const DEFAULT_MAX_REMOTE_BYTES: u64 = 64 * 1024 * 1024;

pub use executor::{ConversionOutcome, execute};
pub use matrix::CompatibilityMatrix;
pub use observability::{
    CompositeObserver, ConversionContext, ConversionEvent, ConversionObserver, ConversionSeverity,
    ConversionStats, FileObserver, StdErrObserver,
};
pub use planner::{ConversionCandidate, plan};
pub use probe::{FormatProber, ProbeOutcome, ProbeReport, probe_formats};
pub use unified::{ConversionOptions, ConversionRequest, Converter, convert_from_location, convert_from_location_as};
