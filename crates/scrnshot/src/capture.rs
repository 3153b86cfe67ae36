//! The capture: pick the output path, run the transcoder, clean up on
//! failure.

use std::path::{Path, PathBuf};

use zxnext_hw::{CpuSpeedGuard, HardwarePort};

use crate::config::CaptureConfig;
use crate::error::{CaptureError, Result};
use crate::modes::{detect_mode, lookup};
use crate::session::CaptureSession;
use crate::sink::OutputFs;
use crate::transcode::{is_supported, transcode};

/// Mode id reported when the display query fails.
pub const UNKNOWN_MODE: u8 = 0xFF;

/// Highest generated file number, exclusive.
const MAX_FILE_INDEX: u32 = 0xFFFF;

/// Take a screenshot of whatever `port` is displaying.
///
/// Returns the path written. On failure nothing is left behind: a file that
/// was created is closed and removed. The CPU runs at 28 MHz for the
/// duration and is put back to its previous speed afterwards.
pub fn capture(
    port: &mut dyn HardwarePort,
    fs: &mut dyn OutputFs,
    config: &CaptureConfig,
) -> Result<PathBuf> {
    let mut port = CpuSpeedGuard::enter(port);

    let raw = detect_mode(&mut *port).unwrap_or(UNKNOWN_MODE);
    let mode = lookup(raw).ok_or(CaptureError::NotSupported(raw))?;
    if !is_supported(mode.id) {
        return Err(CaptureError::NotSupported(raw));
    }

    let path = resolve_path(fs, config)?;
    let file = fs
        .create(&path)
        .map_err(|source| CaptureError::AccessDenied {
            path: path.clone(),
            source,
        })?;
    log::debug!("writing mode {raw:#04x} to {}", path.display());

    let mut session = CaptureSession::new(&mut *port, file);
    let result = transcode(&mut session, mode).and_then(|()| session.out.check_complete());
    let file = session.into_file();

    let result = match result {
        Ok(()) => {
            if file.finish() {
                return Ok(path);
            }
            Err(CaptureError::BadOutputSink(format!(
                "closing {} failed",
                path.display()
            )))
        }
        Err(e) => {
            let _ = file.finish();
            Err(e)
        }
    };

    if let Err(e) = fs.remove(&path) {
        log::warn!("could not remove {}: {e}", path.display());
    }
    result
}

/// Turn the configured target into the path to create.
///
/// A directory gets the first free `<stem>-<N>.bmp` in it. An existing file
/// is removed when forcing, otherwise refused.
pub fn resolve_path(fs: &mut dyn OutputFs, config: &CaptureConfig) -> Result<PathBuf> {
    let target = match &config.target {
        Some(path) => path.clone(),
        None => fs
            .current_dir()
            .map_err(|source| CaptureError::AccessDenied {
                path: PathBuf::from("."),
                source,
            })?,
    };

    if fs.is_dir(&target) {
        return free_name(fs, &target, &config.file_stem);
    }

    if fs.exists(&target) {
        if !config.force {
            return Err(CaptureError::FileExists(target));
        }
        fs.remove(&target)
            .map_err(|source| CaptureError::AccessDenied {
                path: target.clone(),
                source,
            })?;
    }
    Ok(target)
}

fn free_name(fs: &dyn OutputFs, dir: &Path, stem: &str) -> Result<PathBuf> {
    for n in 0..MAX_FILE_INDEX {
        let candidate = dir.join(format!("{stem}-{n}.bmp"));
        if !fs.exists(&candidate) {
            log::debug!("picked {}", candidate.display());
            return Ok(candidate);
        }
    }
    Err(CaptureError::Range(dir.to_path_buf()))
}
