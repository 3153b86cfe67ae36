//! NextREG numbers and bit fields used by the capture.

/// CPU speed. Bits 1-0: 0 = 3.5 MHz, 1 = 7 MHz, 2 = 14 MHz, 3 = 28 MHz.
pub const CPU_SPEED: u8 = 0x07;

/// Layer 2 active RAM bank, in 16K units.
pub const LAYER2_ACTIVE_BANK: u8 = 0x12;

/// Palette index for subsequent value reads/writes.
pub const PALETTE_INDEX: u8 = 0x40;

/// Palette value, 8-bit form: `RRRGGGBB`.
pub const PALETTE_VALUE_8: u8 = 0x41;

/// Palette control.
///
/// Bit 7: disable index auto-increment. Bits 6-4: palette selected for
/// reads/writes. Bit 3: sprites second palette active. Bit 2: Layer 2 second
/// palette active. Bit 1: ULA second palette active.
pub const PALETTE_CONTROL: u8 = 0x43;

/// Palette value, second byte of the 9-bit form. Bit 0 is the blue LSB.
pub const PALETTE_VALUE_9: u8 = 0x44;

/// MMU slot 0. Slot `n` lives at `MMU0 + n` and maps `n * $2000`.
pub const MMU0: u8 = 0x50;

/// MMU slot 2, mapping $4000-$5FFF.
pub const MMU2: u8 = 0x52;

/// LoRes control. Bit 5 selects Radastan (4 bpp) mode.
pub const LORES_CONTROL: u8 = 0x6A;

/// Radastan enable bit in [`LORES_CONTROL`].
pub const LORES_RADASTAN: u8 = 0x20;

/// 28 MHz setting for [`CPU_SPEED`].
pub const CPU_SPEED_28MHZ: u8 = 0x03;

/// Timex SCLD screen mode port. Bits 5-3 pick the hi-res ink/paper pair.
pub const TIMEX_PORT: u16 = 0x00FF;
