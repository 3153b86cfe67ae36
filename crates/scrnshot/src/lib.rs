//! Screenshots of the ZX Spectrum Next display as BMP files.
//!
//! [`capture`] asks the machine which video mode is showing, reads that
//! mode's pixel, attribute and palette data through a [`HardwarePort`], and
//! writes a Windows Bitmap through an [`OutputFs`]. Every layer 0-2 mode is
//! supported; Layer 3 (tilemap) reports [`CaptureError::NotSupported`].
//!
//! | Mode | Layout | Output |
//! |------|--------|--------|
//! | 0x00, 0x11 | ULA bitmap + 8x8 attributes | 4 bpp, 16 colours |
//! | 0x10 | LoRes 128x96, two half-screens | 8 bpp, 256 colours |
//! | 0x10 Radastan | 128x96 linear | 4 bpp, 16 colours |
//! | 0x12 | Timex 512x192, columns alternate screens | 1 bpp, 2 colours |
//! | 0x13 | Timex bitmap + 8x1 attributes | 4 bpp, 16 colours |
//! | 0x20, 0x22 | Layer 2 banked, linear | 8 bpp, 256 colours |
//! | 0x23 | Layer 2 banked, linear | 4 bpp, 16 colours |
//!
//! On a host, the machine is a [`NextMachine`](zxnext_hw::NextMachine)
//! filled from a SNA snapshot ([`load_sna`]) or a JSON state document
//! ([`load_state`]).
//!
//! [`HardwarePort`]: zxnext_hw::HardwarePort

mod capture;
mod config;
pub mod error;
pub mod modes;
pub mod palette;
mod session;
pub mod sink;
mod sna;
mod state;
pub mod transcode;

pub use capture::{UNKNOWN_MODE, capture, resolve_path};
pub use config::{CaptureConfig, DEFAULT_FILE_STEM};
pub use error::{CaptureError, LoadError, Result, error_text};
pub use modes::{MODES, MemRegion, ModeId, VideoMode, detect_mode, lookup};
pub use session::{CaptureSession, Output};
pub use sink::{HostFs, OutputFile, OutputFs};
pub use sna::{SnaKind, load_sna};
pub use state::{MachineState, MemoryImage, PaletteDump, load_state};

#[cfg(any(test, feature = "test-utils"))]
pub use sink::MemoryFs;
