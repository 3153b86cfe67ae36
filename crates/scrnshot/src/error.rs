//! Capture and loader errors.
//!
//! Every [`CaptureError`] carries a small positive exit code; [`error_text`]
//! turns a code back into the short message shown to the user.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CaptureError>;

#[derive(Debug, Error)]
pub enum CaptureError {
    /// Unrecognised argument or a mode descriptor missing a region the
    /// transcoder needs.
    #[error("invalid value: {0}")]
    InvalidArgument(String),

    #[error("out of mem: cannot allocate {0} byte row buffer")]
    OutOfMemory(usize),

    /// Short write or failed close on the output file.
    #[error("bad file descriptor: {0}")]
    BadOutputSink(String),

    #[error("access denied: cannot create {}", .path.display())]
    AccessDenied {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("file exists: {}", .0.display())]
    FileExists(PathBuf),

    /// Every candidate file name in the directory is taken.
    #[error("out of range: no free file name in {}", .0.display())]
    Range(PathBuf),

    #[error("not supported: video mode {0:#04x}")]
    NotSupported(u8),

    #[error("bad state: {0}")]
    BadState(String),

    /// Reserved; nothing in the capture times out.
    #[error("timeout error")]
    Timeout,
}

pub const EXIT_OK: u8 = 0;
pub const EXIT_INVALID_ARGUMENT: u8 = 1;
pub const EXIT_OUT_OF_MEMORY: u8 = 2;
pub const EXIT_BAD_OUTPUT_SINK: u8 = 3;
pub const EXIT_ACCESS_DENIED: u8 = 4;
pub const EXIT_FILE_EXISTS: u8 = 5;
pub const EXIT_RANGE: u8 = 6;
pub const EXIT_NOT_SUPPORTED: u8 = 7;
pub const EXIT_BAD_STATE: u8 = 8;
pub const EXIT_TIMEOUT: u8 = 9;

impl CaptureError {
    /// Process exit code.
    #[must_use]
    pub fn code(&self) -> u8 {
        match self {
            Self::InvalidArgument(_) => EXIT_INVALID_ARGUMENT,
            Self::OutOfMemory(_) => EXIT_OUT_OF_MEMORY,
            Self::BadOutputSink(_) => EXIT_BAD_OUTPUT_SINK,
            Self::AccessDenied { .. } => EXIT_ACCESS_DENIED,
            Self::FileExists(_) => EXIT_FILE_EXISTS,
            Self::Range(_) => EXIT_RANGE,
            Self::NotSupported(_) => EXIT_NOT_SUPPORTED,
            Self::BadState(_) => EXIT_BAD_STATE,
            Self::Timeout => EXIT_TIMEOUT,
        }
    }
}

/// Short message for an exit code.
#[must_use]
pub fn error_text(code: u8) -> &'static str {
    match code {
        EXIT_OK => "no error",
        EXIT_INVALID_ARGUMENT => "invalid value",
        EXIT_OUT_OF_MEMORY => "out of mem",
        EXIT_BAD_OUTPUT_SINK => "bad file descriptor",
        EXIT_ACCESS_DENIED => "access denied",
        EXIT_FILE_EXISTS => "file exists",
        EXIT_RANGE => "out of range",
        EXIT_NOT_SUPPORTED => "not supported",
        EXIT_BAD_STATE => "bad state",
        EXIT_TIMEOUT => "timeout error",
        _ => "unknown error",
    }
}

/// Failure to build a machine from a snapshot or state file.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("bad snapshot: {0}")]
    Snapshot(String),

    #[error("bad machine state: {0}")]
    State(String),

    #[error("bad machine state: {0}")]
    Json(#[from] serde_json::Error),
}

impl LoadError {
    /// Process exit code, sharing the capture's code space.
    #[must_use]
    pub fn code(&self) -> u8 {
        match self {
            Self::Io { .. } => EXIT_ACCESS_DENIED,
            Self::Snapshot(_) | Self::State(_) | Self::Json(_) => EXIT_INVALID_ARGUMENT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_distinct_and_positive() {
        let errors = [
            CaptureError::InvalidArgument(String::new()),
            CaptureError::OutOfMemory(0),
            CaptureError::BadOutputSink(String::new()),
            CaptureError::AccessDenied {
                path: PathBuf::new(),
                source: io::Error::other("denied"),
            },
            CaptureError::FileExists(PathBuf::new()),
            CaptureError::Range(PathBuf::new()),
            CaptureError::NotSupported(0x30),
            CaptureError::BadState(String::new()),
            CaptureError::Timeout,
        ];
        let mut codes: Vec<u8> = errors.iter().map(CaptureError::code).collect();
        assert!(codes.iter().all(|&c| c > 0));
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn every_code_has_text() {
        for code in 1..=EXIT_TIMEOUT {
            assert_ne!(error_text(code), "unknown error", "code {code}");
        }
        assert_eq!(error_text(EXIT_OK), "no error");
        assert_eq!(error_text(200), "unknown error");
    }

    #[test]
    fn display_starts_with_code_text() {
        let e = CaptureError::NotSupported(0x31);
        assert_eq!(e.to_string(), "not supported: video mode 0x31");
        assert!(e.to_string().starts_with(error_text(e.code())));
    }
}
