//! Resource providers: where the input byte stream comes from.
//!
//! The materializer only ever sees a [`Read`] handle. Whether the bytes live in a local file, in
//! the binary itself, or in memory is decided by the [`ResourceProvider`] implementation.

use std::borrow::Cow;
use std::fs::File;
use std::io::{self, Cursor, Read};
use std::path::{Path, PathBuf};

use crate::error::{IngestionError, IngestionResult};

/// Supplies a readable byte stream for an ingestion.
///
/// The returned stream is owned by the caller of [`ResourceProvider::open`] and is closed when it
/// is dropped.
pub trait ResourceProvider: Send + Sync {
    /// Human-readable resource name, used in errors and observer callbacks.
    fn name(&self) -> String;

    /// Open the resource for sequential reading.
    ///
    /// Fails with [`IngestionError::ResourceNotFound`] if the resource does not exist.
    fn open(&self) -> IngestionResult<Box<dyn Read + Send + '_>>;
}

/// A file on the local filesystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathResource {
    path: PathBuf,
}

impl PathResource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ResourceProvider for PathResource {
    fn name(&self) -> String {
        self.path.display().to_string()
    }

    fn open(&self) -> IngestionResult<Box<dyn Read + Send + '_>> {
        match File::open(&self.path) {
            Ok(file) => Ok(Box::new(file)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(IngestionError::ResourceNotFound {
                resource: self.name(),
            }),
            Err(e) => Err(IngestionError::Io(e)),
        }
    }
}

/// Bytes held in memory: a bundled asset (`include_bytes!`) or a buffer built at runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BytesResource {
    name: String,
    bytes: Cow<'static, [u8]>,
}

impl BytesResource {
    /// Wrap a static asset, typically produced by `include_bytes!`.
    pub fn bundled(name: impl Into<String>, bytes: &'static [u8]) -> Self {
        Self {
            name: name.into(),
            bytes: Cow::Borrowed(bytes),
        }
    }

    /// Wrap an owned buffer.
    pub fn owned(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: Cow::Owned(bytes.into()),
        }
    }
}

impl ResourceProvider for BytesResource {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn open(&self) -> IngestionResult<Box<dyn Read + Send + '_>> {
        Ok(Box::new(Cursor::new(self.bytes.as_ref())))
    }
}
