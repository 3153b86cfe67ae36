//! Layer 3 (tilemap) is not captured.

use crate::error::{CaptureError, Result};
use crate::modes::VideoMode;
use crate::session::CaptureSession;

/// Refuses without touching the output.
pub fn unsupported(_session: &mut CaptureSession<'_>, mode: &VideoMode) -> Result<()> {
    Err(CaptureError::NotSupported(mode.id.raw()))
}
