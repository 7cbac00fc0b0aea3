//! Resource acquisition.
//!
//! An [`Acquirer`] turns a location string into a [`ResourceDescriptor`]: the location, its
//! [`Locality`], the content as text (when it is valid UTF-8) and a rewindable stream. The
//! default [`StdAcquirer`] opens local files with `std::fs` and fetches everything else with a
//! blocking HTTP GET.

use std::fmt;
use std::fs::File;
use std::io::{Cursor, Read, Seek, SeekFrom};

use tracing::{debug, info};

use crate::error::{ConversionError, ConversionResult, DecodeError, DecodeResult};

/// Where a resource lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Locality {
    /// A static file fetched over the network.
    RemoteStatic,
    /// A path on local storage.
    Local,
}

/// Classify a location string.
///
/// `file:///…`, absolute (`/…`) and relative (`.…`) paths are local; everything else is
/// treated as a remote static resource.
pub fn classify_locality(location: &str) -> Locality {
    let local = location.starts_with("file:///")
        || location.starts_with('/')
        || location.starts_with('.');
    if local {
        Locality::Local
    } else {
        Locality::RemoteStatic
    }
}

/// Strip a `file://` scheme so the remainder can be opened as a path.
pub fn local_path(location: &str) -> &str {
    location.strip_prefix("file://").unwrap_or(location)
}

/// A readable, rewindable content handle.
pub trait ResourceStream: Read + Seek {}

impl<T: Read + Seek> ResourceStream for T {}

/// A single acquired resource.
///
/// Constructed once per conversion. Apart from rewinding the stream, the only mutation is
/// [`ResourceDescriptor::release`], which drops the stream handle.
pub struct ResourceDescriptor {
    location: String,
    locality: Locality,
    text: Option<String>,
    stream: Option<Box<dyn ResourceStream>>,
}

impl fmt::Debug for ResourceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceDescriptor")
            .field("location", &self.location)
            .field("locality", &self.locality)
            .field("text_len", &self.text.as_ref().map(String::len))
            .field("stream_open", &self.stream.is_some())
            .finish()
    }
}

impl ResourceDescriptor {
    /// Build a descriptor. The stream, if any, must be positioned at the start.
    pub fn new(
        location: impl Into<String>,
        locality: Locality,
        text: Option<String>,
        stream: Option<Box<dyn ResourceStream>>,
    ) -> Self {
        Self {
            location: location.into(),
            locality,
            text,
            stream,
        }
    }

    /// Build a descriptor over in-memory text, with a cursor over the same bytes as stream.
    pub fn from_text(location: impl Into<String>, locality: Locality, text: impl Into<String>) -> Self {
        let text = text.into();
        let stream: Box<dyn ResourceStream> = Box::new(Cursor::new(text.clone().into_bytes()));
        Self::new(location, locality, Some(text), Some(stream))
    }

    /// Build a descriptor over raw bytes; `text` is filled in when the bytes are UTF-8.
    pub fn from_bytes(location: impl Into<String>, locality: Locality, bytes: Vec<u8>) -> Self {
        let text = std::str::from_utf8(&bytes).ok().map(str::to_owned);
        let stream: Box<dyn ResourceStream> = Box::new(Cursor::new(bytes));
        Self::new(location, locality, text, Some(stream))
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn locality(&self) -> Locality {
        self.locality
    }

    /// The content as text, if it decoded as UTF-8.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Returns `true` while the stream handle is held.
    pub fn has_stream(&self) -> bool {
        self.stream.is_some()
    }

    /// Seek the stream back to the start. No-op without a stream.
    pub fn rewind(&mut self) -> DecodeResult<()> {
        if let Some(stream) = self.stream.as_mut() {
            stream.seek(SeekFrom::Start(0))?;
        }
        Ok(())
    }

    /// Run `f` over the content from the start, then rewind.
    ///
    /// Reads the stream when one is held and falls back to the buffered text otherwise. The
    /// stream is rewound even when `f` fails.
    pub fn read_content<T>(
        &mut self,
        f: impl FnOnce(&mut dyn Read) -> DecodeResult<T>,
    ) -> DecodeResult<T> {
        match self.stream.as_mut() {
            Some(stream) => {
                stream.seek(SeekFrom::Start(0))?;
                let out = f(stream);
                stream.seek(SeekFrom::Start(0))?;
                out
            }
            None => match self.text.as_deref() {
                Some(text) => f(&mut text.as_bytes()),
                None => Err(DecodeError::NotText),
            },
        }
    }

    /// Read the full content as bytes from the start, then rewind.
    pub fn read_bytes(&mut self) -> DecodeResult<Vec<u8>> {
        self.read_content(|r| {
            let mut buf = Vec::new();
            r.read_to_end(&mut buf)?;
            Ok(buf)
        })
    }

    /// Drop the stream handle. Calling this more than once is a no-op.
    pub fn release(&mut self) {
        if self.stream.take().is_some() {
            debug!(location = %self.location, "released resource handle");
        }
    }
}

/// Fetches or opens resources.
pub trait Acquirer: Send + Sync {
    /// Acquire the resource at `location`, leaving its stream positioned at the start.
    fn acquire(&self, location: &str, locality: Locality) -> ConversionResult<ResourceDescriptor>;
}

/// Default acquirer: `std::fs` for local paths, blocking `ureq` GET for remote resources.
#[derive(Debug, Clone)]
pub struct StdAcquirer {
    max_remote_bytes: u64,
}

impl StdAcquirer {
    /// Create an acquirer that refuses remote bodies larger than `max_remote_bytes`.
    pub fn new(max_remote_bytes: u64) -> Self {
        Self { max_remote_bytes }
    }

    fn acquire_local(&self, location: &str) -> ConversionResult<ResourceDescriptor> {
        let path = local_path(location);
        let acquisition_error = |err: std::io::Error| ConversionError::Acquisition {
            location: location.to_string(),
            reason: err.to_string(),
        };

        let mut file = File::open(path).map_err(acquisition_error)?;
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes).map_err(acquisition_error)?;
        file.seek(SeekFrom::Start(0)).map_err(acquisition_error)?;

        info!(location, bytes = bytes.len(), "opened local resource");
        let text = String::from_utf8(bytes).ok();
        Ok(ResourceDescriptor::new(
            location,
            Locality::Local,
            text,
            Some(Box::new(file)),
        ))
    }

    fn acquire_remote(&self, location: &str) -> ConversionResult<ResourceDescriptor> {
        let response = ureq::get(location)
            .call()
            .map_err(|err| ConversionError::Acquisition {
                location: location.to_string(),
                reason: format!("request failed: {err}"),
            })?;

        let bytes = response
            .into_body()
            .with_config()
            .limit(self.max_remote_bytes)
            .read_to_vec()
            .map_err(|err| ConversionError::Acquisition {
                location: location.to_string(),
                reason: format!("failed reading response body: {err}"),
            })?;

        info!(location, bytes = bytes.len(), "fetched remote resource");
        Ok(ResourceDescriptor::from_bytes(
            location,
            Locality::RemoteStatic,
            bytes,
        ))
    }
}

impl Default for StdAcquirer {
    fn default() -> Self {
        Self::new(crate::conversion::DEFAULT_MAX_REMOTE_BYTES)
    }
}

impl Acquirer for StdAcquirer {
    fn acquire(&self, location: &str, locality: Locality) -> ConversionResult<ResourceDescriptor> {
        match locality {
            Locality::Local => self.acquire_local(location),
            Locality::RemoteStatic => self.acquire_remote(location),
        }
    }
}
