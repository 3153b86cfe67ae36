//! Next colour encodings.
//!
//! Palette entries are 9-bit `RRRGGGBBB`. The `0x41` register carries the top
//! eight bits; the low bit of blue sits in bit 0 of `0x44`.

/// Expand a 3-bit channel to 8 bits by bit replication.
///
/// `0 -> 0x00`, `7 -> 0xFF`, evenly spread in between.
#[must_use]
pub fn rgb3_to_rgb8(v: u8) -> u8 {
    let v = v & 0x07;
    (v << 5) | (v << 2) | (v >> 1)
}

/// A 9-bit palette colour, three bits per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb9 {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Rgb9 {
    /// Decode the `(0x41, 0x44)` register pair.
    #[must_use]
    pub fn from_registers(value8: u8, value9: u8) -> Self {
        Self::from_bits((u16::from(value8) << 1) | u16::from(value9 & 0x01))
    }

    /// Decode a packed 9-bit value.
    #[must_use]
    pub fn from_bits(v: u16) -> Self {
        Self {
            red: ((v >> 6) & 0x07) as u8,
            green: ((v >> 3) & 0x07) as u8,
            blue: (v & 0x07) as u8,
        }
    }

    /// Colour written as a single 8-bit `RRRGGGBB` value.
    ///
    /// The hardware fills in the missing blue bit as the OR of the two it
    /// was given.
    #[must_use]
    pub fn from_rgb332(v: u8) -> Self {
        let bb = u16::from(v & 0x03);
        let lsb = u16::from(bb != 0);
        Self::from_bits((u16::from(v) << 1) | lsb)
    }

    /// Packed 9-bit value.
    #[must_use]
    pub fn bits(self) -> u16 {
        (u16::from(self.red & 0x07) << 6)
            | (u16::from(self.green & 0x07) << 3)
            | u16::from(self.blue & 0x07)
    }

    /// The `0x41` register byte (top eight bits).
    #[must_use]
    pub fn value8(self) -> u8 {
        (self.bits() >> 1) as u8
    }

    /// The `0x44` register byte (blue LSB in bit 0).
    #[must_use]
    pub fn value9(self) -> u8 {
        (self.bits() & 0x01) as u8
    }

    /// 8-bit channels as `(red, green, blue)`.
    #[must_use]
    pub fn to_rgb8(self) -> (u8, u8, u8) {
        (
            rgb3_to_rgb8(self.red),
            rgb3_to_rgb8(self.green),
            rgb3_to_rgb8(self.blue),
        )
    }
}

/// ARGB32 base ULA colours: 16 entries (8 normal + 8 bright).
///
/// Index layout: `bright_bit << 3 | colour_3bit`. Normal intensity is `0xB6`,
/// the level a 9-bit channel value of 5 expands to.
pub const BASE_PALETTE: [u32; 16] = [
    0xFF00_0000, // black
    0xFF00_00B6, // blue
    0xFFB6_0000, // red
    0xFFB6_00B6, // magenta
    0xFF00_B600, // green
    0xFF00_B6B6, // cyan
    0xFFB6_B600, // yellow
    0xFFB6_B6B6, // white
    0xFF00_0000,
    0xFF00_00FF,
    0xFFFF_0000,
    0xFFFF_00FF,
    0xFF00_FF00,
    0xFF00_FFFF,
    0xFFFF_FF00,
    0xFFFF_FFFF,
];
