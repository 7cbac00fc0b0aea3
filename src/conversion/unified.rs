//! Unified conversion entrypoint.
//!
//! Most callers should use [`convert_from_location`], which takes a location string (local path
//! or URL) and an optional [`RepresentationTag`] and returns the decoded [`Representation`].
//!
//! The sequence is: validate the requested representation → classify locality → acquire →
//! probe formats → plan conversions → execute → release the resource handle. The handle is
//! released on every exit path.

use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use crate::decode::{DecoderRegistry, SheetSelection};
use crate::error::{ConversionError, ConversionResult};
use crate::resource::{Acquirer, ResourceDescriptor, StdAcquirer, classify_locality};
use crate::types::{Representation, RepresentationTag};

use super::executor::{ConversionOutcome, execute};
use super::matrix::CompatibilityMatrix;
use super::observability::{ConversionContext, ConversionObserver, ConversionSeverity, ConversionStats};
use super::planner::plan;
use super::probe::FormatProber;
use super::DEFAULT_MAX_REMOTE_BYTES;

/// Options controlling conversion behavior.
///
/// Use [`Default`] for common cases.
#[derive(Clone)]
pub struct ConversionOptions {
    /// Preferred output representation. If `None`, the first viable conversion wins.
    pub representation: Option<RepresentationTag>,
    /// Which sheet(s) spreadsheet probing and decoding read.
    pub sheet_selection: SheetSelection,
    /// Upper bound on remote response bodies, in bytes.
    pub max_remote_bytes: u64,
    /// Optional observer for logging/alerts.
    pub observer: Option<Arc<dyn ConversionObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: ConversionSeverity,
}

impl fmt::Debug for ConversionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionOptions")
            .field("representation", &self.representation)
            .field("sheet_selection", &self.sheet_selection)
            .field("max_remote_bytes", &self.max_remote_bytes)
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            representation: None,
            sheet_selection: SheetSelection::default(),
            max_remote_bytes: DEFAULT_MAX_REMOTE_BYTES,
            observer: None,
            alert_at_or_above: ConversionSeverity::Critical,
        }
    }
}

/// Reusable conversion pipeline.
///
/// Holds the compatibility matrix, the decoder registry, the prober and the acquirer. Calls
/// share no mutable state, so one converter can serve many threads.
pub struct Converter {
    matrix: CompatibilityMatrix,
    registry: DecoderRegistry,
    prober: FormatProber,
    acquirer: Arc<dyn Acquirer>,
    options: ConversionOptions,
}

impl fmt::Debug for Converter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Converter")
            .field("matrix", &self.matrix)
            .field("registry", &self.registry)
            .field("options", &self.options)
            .finish()
    }
}

impl Default for Converter {
    fn default() -> Self {
        Self::new(ConversionOptions::default())
    }
}

impl Converter {
    /// Build a converter with the baseline matrix, the standard decoders and [`StdAcquirer`].
    pub fn new(options: ConversionOptions) -> Self {
        Self {
            matrix: CompatibilityMatrix::baseline().clone(),
            registry: DecoderRegistry::standard(options.sheet_selection.clone()),
            prober: FormatProber::new(options.sheet_selection.clone()),
            acquirer: Arc::new(StdAcquirer::new(options.max_remote_bytes)),
            options,
        }
    }

    /// Replace the compatibility matrix.
    pub fn with_matrix(mut self, matrix: CompatibilityMatrix) -> Self {
        self.matrix = matrix;
        self
    }

    /// Replace the decoder registry.
    pub fn with_registry(mut self, registry: DecoderRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Replace the acquirer (e.g. to add caching or authentication).
    pub fn with_acquirer(mut self, acquirer: Arc<dyn Acquirer>) -> Self {
        self.acquirer = acquirer;
        self
    }

    pub fn matrix(&self) -> &CompatibilityMatrix {
        &self.matrix
    }

    pub fn registry(&self) -> &DecoderRegistry {
        &self.registry
    }

    pub fn options(&self) -> &ConversionOptions {
        &self.options
    }

    /// Convert using the representation from [`ConversionOptions::representation`].
    pub fn convert(&self, location: &str) -> ConversionResult<Representation> {
        self.convert_as(location, self.options.representation)
    }

    /// Convert, overriding the configured representation with `requested`.
    pub fn convert_as(
        &self,
        location: &str,
        requested: Option<RepresentationTag>,
    ) -> ConversionResult<Representation> {
        self.convert_detailed(location, requested).map(|o| o.value)
    }

    /// Convert and report which candidate succeeded.
    ///
    /// When an observer is configured, this function reports:
    ///
    /// - `on_success` on success, with format/representation/attempt stats
    /// - `on_failure` on failure, with a computed severity
    /// - `on_alert` on failure when the computed severity is >= `options.alert_at_or_above`
    pub fn convert_detailed(
        &self,
        location: &str,
        requested: Option<RepresentationTag>,
    ) -> ConversionResult<ConversionOutcome> {
        let result = self.run(location, requested);

        if let Some(obs) = self.options.observer.as_ref() {
            let ctx = ConversionContext {
                location: location.to_string(),
                locality: classify_locality(location),
                requested,
            };
            match &result {
                Ok(outcome) => obs.on_success(
                    &ctx,
                    ConversionStats {
                        format: outcome.candidate.format,
                        representation: outcome.candidate.representation,
                        attempts: outcome.attempts,
                        records: outcome.value.len(),
                    },
                ),
                Err(e) => {
                    let sev = ConversionSeverity::for_error(e);
                    obs.on_failure(&ctx, sev, e);
                    if sev >= self.options.alert_at_or_above {
                        obs.on_alert(&ctx, sev, e);
                    }
                }
            }
        }

        result
    }

    fn run(
        &self,
        location: &str,
        requested: Option<RepresentationTag>,
    ) -> ConversionResult<ConversionOutcome> {
        // Reject unknown output shapes before any I/O.
        if let Some(representation) = requested {
            if !self.matrix.supports_representation(representation) {
                return Err(ConversionError::UnsupportedOutputType {
                    requested: representation.to_string(),
                });
            }
        }

        let locality = classify_locality(location);
        let mut resource = ReleaseOnDrop(self.acquirer.acquire(location, locality)?);

        let formats = self.prober.probe_formats(&mut resource)?;
        let candidates = plan(&self.matrix, &formats, requested)?;
        execute(&self.registry, &mut resource, &candidates)
    }
}

/// Releases the wrapped descriptor when dropped, whichever way the conversion exits.
struct ReleaseOnDrop(ResourceDescriptor);

impl Deref for ReleaseOnDrop {
    type Target = ResourceDescriptor;

    fn deref(&self) -> &ResourceDescriptor {
        &self.0
    }
}

impl DerefMut for ReleaseOnDrop {
    fn deref_mut(&mut self) -> &mut ResourceDescriptor {
        &mut self.0
    }
}

impl Drop for ReleaseOnDrop {
    fn drop(&mut self) {
        self.0.release();
    }
}

/// Convert the resource at `location` into a [`Representation`].
///
/// - `requested` selects the output shape; `None` takes the first viable conversion in
///   format declaration order.
/// - Locations starting with `file:///`, `/` or `.` are read from local storage; anything
///   else is fetched over HTTP.
///
/// # Examples
///
/// ```no_run
/// use rust_data_objectify::{convert_from_location, Representation, RepresentationTag};
///
/// # fn main() -> Result<(), rust_data_objectify::ConversionError> {
/// let records = convert_from_location("./people.csv", Some(RepresentationTag::Sequence))?;
/// if let Representation::Sequence(rows) = records {
///     println!("rows={}", rows.len());
/// }
/// # Ok(())
/// # }
/// ```
pub fn convert_from_location(
    location: &str,
    requested: Option<RepresentationTag>,
) -> ConversionResult<Representation> {
    Converter::default().convert_as(location, requested)
}

/// Like [`convert_from_location`], with the representation given as a selector string
/// (`"mapping"`, `"dict"`, `"sequence"`, `"list"`, `"table"`, `"dataframe"`, ...).
///
/// Unknown selectors fail with [`ConversionError::UnsupportedOutputType`] before any I/O.
///
/// ```no_run
/// use rust_data_objectify::convert_from_location_as;
///
/// # fn main() -> Result<(), rust_data_objectify::ConversionError> {
/// let table = convert_from_location_as("https://example.com/data.json", Some("dataframe"))?;
/// println!("rows={}", table.len());
/// # Ok(())
/// # }
/// ```
pub fn convert_from_location_as(
    location: &str,
    selector: Option<&str>,
) -> ConversionResult<Representation> {
    let requested = selector.map(str::parse::<RepresentationTag>).transpose()?;
    convert_from_location(location, requested)
}

/// Owned conversion request, e.g. for queueing work in a job system.
#[derive(Debug, Clone)]
pub struct ConversionRequest {
    /// Location of the resource.
    pub location: String,
    /// Options controlling conversion.
    pub options: ConversionOptions,
}

impl ConversionRequest {
    pub fn new(location: impl Into<String>, options: ConversionOptions) -> Self {
        Self {
            location: location.into(),
            options,
        }
    }

    /// Execute the request with a freshly built [`Converter`].
    pub fn run(&self) -> ConversionResult<Representation> {
        Converter::new(self.options.clone()).convert(&self.location)
    }
}
