//! Common error types.

use std::fmt::Display;
use std::path::Path;
use std::time::Duration;

/// A shortcut type equivalent to `Result<T, kindred::Error>`.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error that occurs within the crate.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("libvips error: {0}")]
    Vips(String),
    #[error("cairo error: {0}")]
    Cairo(#[from] cairo::Error),
    #[error("cairo I/O error: {0}")]
    CairoIo(#[from] cairo::IoError),
    #[error("drawing surface is still borrowed: {0}")]
    SurfaceBorrow(#[from] cairo::BorrowError),
    #[error("failed to encode png: {0}")]
    PngEncode(#[from] png::EncodingError),
    #[error("drawing surface unavailable: {0}")]
    SurfaceUnavailable(String),
    #[error("failed to open asset {0}: {1}")]
    FailedOpenAsset(String, String),
    #[error("unsupported image reference: {0}")]
    UnsupportedRef(String),
    #[error("loading {0} timed out after {1:?}")]
    LoadTimeout(String, Duration),
    #[error("invalid date `{0}`: {1}")]
    InvalidDate(String, String),
    #[error("failed to open config file {0}: {1}")]
    ConfigOpen(String, String),
    #[error("invalid config file {0}: {1}")]
    ConfigDeser(String, String),
    #[error("missing environment variable: {0}")]
    MissingVariable(&'static str),
    #[error("failed to open card source {0}: {1}")]
    SourceOpen(String, String),
    #[error("failed to read card record: {0}")]
    RecordRead(String),
    #[error("card #{0} has no name")]
    BlankName(usize),
    #[error("card `{0}` is missing its {1} image")]
    PartialRender(String, &'static str),
    #[error("failed to write {0}: {1}")]
    Output(String, String),
    #[error("failed to lock {0}: {1}")]
    MutexLock(&'static str, String),
    #[error("failed to join worker thread #{0}")]
    ThreadJoin(usize),
    #[error("failed to spawn thread {0}: {1}")]
    ThreadSpawn(String, String),
}

impl Error {
    pub fn asset_open(what: impl Display, e: impl Display) -> Self {
        Self::FailedOpenAsset(what.to_string(), e.to_string())
    }

    pub fn surface(e: impl Display) -> Self {
        Self::SurfaceUnavailable(e.to_string())
    }

    pub fn invalid_date(s: &str, e: impl Display) -> Self {
        Self::InvalidDate(s.to_string(), e.to_string())
    }

    pub fn config_open(path: &Path, e: impl Display) -> Self {
        Self::ConfigOpen(path.display().to_string(), e.to_string())
    }

    pub fn config_deser(path: &Path, e: impl Display) -> Self {
        Self::ConfigDeser(path.display().to_string(), e.to_string())
    }

    pub fn no_env_variable(var: &'static str) -> Self {
        Self::MissingVariable(var)
    }

    pub fn source_open(path: &Path, e: impl Display) -> Self {
        Self::SourceOpen(path.display().to_string(), e.to_string())
    }

    pub fn record_read(e: impl Display) -> Self {
        Self::RecordRead(e.to_string())
    }

    pub fn output(path: &Path, e: impl Display) -> Self {
        Self::Output(path.display().to_string(), e.to_string())
    }

    pub fn mutex_lock(what: &'static str, e: impl Display) -> Self {
        Self::MutexLock(what, e.to_string())
    }

    pub fn thread_join(id: usize) -> Self {
        Self::ThreadJoin(id)
    }

    pub fn thread_spawn(name: &str, e: impl Display) -> Self {
        Self::ThreadSpawn(name.to_string(), e.to_string())
    }

    /// Whether this error means no drawing surface could be created at all.
    pub fn is_surface_unavailable(&self) -> bool {
        matches!(self, Self::SurfaceUnavailable(_))
    }
}
