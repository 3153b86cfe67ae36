//! Screen memory address arithmetic.
//!
//! One canonical function per layout family. The ULA bitmap interleaves the
//! Y coordinate as `Y7Y6 Y2Y1Y0 Y5Y4Y3`: thirds of the display, then scanline
//! within a character row, then character row within a third.

/// ULA screen 0 bitmap.
pub const ULA_SCREEN0: u16 = 0x4000;

/// ULA screen 0 attributes.
pub const ULA_ATTRS0: u16 = 0x5800;

/// Timex screen 1 bitmap. Hi-colour attributes live here too.
pub const TIMEX_SCREEN1: u16 = 0x6000;

/// Offset of bitmap row `y` from the start of a ULA-layout screen.
#[must_use]
pub fn ula_pixel_offset(y: u8) -> u16 {
    let y = u16::from(y);
    ((y & 0x07) << 8) | ((y & 0x38) << 2) | ((y & 0xC0) << 5)
}

/// Offset of the attribute row covering bitmap row `y`.
#[must_use]
pub fn ula_attr_offset(y: u8) -> u16 {
    (u16::from(y) >> 3) << 5
}

/// Address of the byte holding pixel `(x, y)` in Timex hi-res mode.
///
/// Byte columns alternate between the two screens: even columns come from
/// screen 0, odd columns from screen 1.
#[must_use]
pub fn timex_hires_addr(x: u16, y: u8) -> u16 {
    let col = (x >> 3) & 0x3F;
    let screen = if col & 1 == 0 { ULA_SCREEN0 } else { TIMEX_SCREEN1 };
    screen + ula_pixel_offset(y) + (col >> 1)
}

/// Start of the hi-colour attribute row for bitmap row `y`.
#[must_use]
pub fn timex_hicolour_attr_addr(y: u8) -> u16 {
    TIMEX_SCREEN1 + ula_pixel_offset(y)
}

/// Map a hardware address to an address readable through
/// [`HardwarePort::peek`](crate::HardwarePort::peek).
///
/// Video RAM sits in the visible window, so this is the identity. Banked
/// modes page the right memory in first (see
/// [`PagingWindow`](crate::PagingWindow)).
#[inline]
#[must_use]
pub fn memmap(addr: u16) -> u16 {
    addr
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Address as assembled by the Z80N `PIXELAD` instruction.
    fn pixelad(x: u8, y: u8) -> u16 {
        let h = 0x40 | ((y >> 3) & 0x18) | (y & 0x07);
        let l = ((y << 2) & 0xE0) | (x >> 3);
        u16::from_be_bytes([h, l])
    }

    /// Per-bit-field assembly.
    fn bitfields(y: u8, char_col: u8) -> u16 {
        let y7y6 = (y >> 6) & 0x03;
        let y5y4y3 = (y >> 3) & 0x07;
        let y2y1y0 = y & 0x07;
        0x4000
            | (u16::from(y7y6) << 11)
            | (u16::from(y2y1y0) << 8)
            | (u16::from(y5y4y3) << 5)
            | u16::from(char_col)
    }

    #[test]
    fn pixel_offset_matches_pixelad() {
        for y in 0..192u8 {
            for x in 0..=255u8 {
                let canonical = ULA_SCREEN0 + ula_pixel_offset(y) + u16::from(x >> 3);
                assert_eq!(canonical, pixelad(x, y), "x={x} y={y}");
            }
        }
    }

    #[test]
    fn pixel_offset_matches_bitfields() {
        for y in 0..=255u8 {
            for col in 0..32u8 {
                let canonical = ULA_SCREEN0 + ula_pixel_offset(y) + u16::from(col);
                assert_eq!(canonical, bitfields(y, col), "col={col} y={y}");
            }
        }
    }

    #[test]
    fn pixel_offsets_cover_bitmap_once() {
        let mut seen = [false; 0x1800];
        for y in 0..192u8 {
            for col in 0..32u16 {
                let off = usize::from(ula_pixel_offset(y) + col);
                assert!(!seen[off], "offset {off:#06x} hit twice");
                seen[off] = true;
            }
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn attr_offset_is_linear_per_character_row() {
        assert_eq!(ula_attr_offset(0), 0);
        assert_eq!(ula_attr_offset(7), 0);
        assert_eq!(ula_attr_offset(8), 32);
        assert_eq!(ula_attr_offset(191), 23 * 32);
        for y in 0..192u8 {
            assert_eq!(ULA_ATTRS0 + ula_attr_offset(y), 0x5800 | (u16::from(y / 8) << 5));
        }
    }

    #[test]
    fn hires_alternates_screens_by_byte_column() {
        assert_eq!(timex_hires_addr(0, 0), 0x4000);
        assert_eq!(timex_hires_addr(7, 0), 0x4000);
        assert_eq!(timex_hires_addr(8, 0), 0x6000);
        assert_eq!(timex_hires_addr(16, 0), 0x4001);
        assert_eq!(timex_hires_addr(511, 0), 0x601F);
        assert_eq!(timex_hires_addr(0, 1), 0x4100);
    }

    #[test]
    fn hires_matches_pixelad_per_screen() {
        for y in 0..192u8 {
            for x in (0..512u16).step_by(8) {
                let col = x >> 3;
                // PIXELAD on the half-width coordinate, moved to screen 1 for odd columns.
                let mut expected = pixelad(((col >> 1) << 3) as u8, y);
                if col & 1 == 1 {
                    expected += 0x2000;
                }
                assert_eq!(timex_hires_addr(x, y), expected, "x={x} y={y}");
            }
        }
    }

    #[test]
    fn hicolour_attr_row_mirrors_bitmap_row() {
        for y in 0..192u8 {
            assert_eq!(
                timex_hicolour_attr_addr(y),
                ULA_SCREEN0 + ula_pixel_offset(y) + 0x2000
            );
        }
    }

    #[test]
    fn memmap_is_identity() {
        for addr in [0x0000, 0x4000, 0x5AFF, 0x6000, 0xFFFF] {
            assert_eq!(memmap(addr), addr);
        }
    }
}
