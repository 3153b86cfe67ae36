//! ZX Spectrum Next hardware access.
//!
//! Everything the screenshot engine touches on the machine goes through the
//! [`HardwarePort`] capability: NextREG reads and writes, the Timex port,
//! the visible 64K address space and the interrupt flag. Code that mutates
//! shared hardware state (interrupt mask, MMU slot 2, CPU speed) does so
//! through the scoped guards in [`guard`], which restore the saved state when
//! they go out of scope.
//!
//! # Standalone
//!
//! This crate has no dependencies. [`NextMachine`] is an in-memory model of
//! the parts of the Next the capture reads (register file, MMU, palettes,
//! 2 MB of RAM) and stands in for the real machine on a host.
//!
//! # Screen memory layout
//!
//! ULA bitmap at $4000-$57FF, attributes at $5800-$5AFF.
//! Bitmap address: `010Y7 Y6Y2 Y1Y0 Y5Y4Y3 X4X3X2X1X0`
//! Attribute address: `0101 10Y7 Y6Y5 Y4Y3 X4X3X2X1X0`
//!
//! Timex screen 1 uses the same layout at $6000. Hi-colour keeps one
//! attribute byte per bitmap byte in screen 1; hi-res takes even byte columns
//! from screen 0 and odd ones from screen 1.

pub mod guard;
mod machine;
pub mod nextreg;
mod palette;
mod port;
pub mod screen;

pub use guard::{CpuSpeedGuard, InterruptGuard, PagingWindow};
pub use machine::NextMachine;
pub use palette::{BASE_PALETTE, Rgb9, rgb3_to_rgb8};
pub use port::{DisplayMode, HardwarePort, InterruptControl};
