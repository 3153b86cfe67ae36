//! Per-mode transcoders.
//!
//! Each transcoder writes the whole image: header, palette, then pixel rows
//! bottom-up (source scanline `height - 1` first, as BMP stores them). The
//! first error aborts the scan.

mod cell;
mod hires;
mod layer2;
mod layer3;
mod lores;

use crate::error::{CaptureError, Result};
use crate::modes::{MemRegion, ModeId, VideoMode};
use crate::session::CaptureSession;

/// A transcoder for one mode.
pub type Transcoder = fn(&mut CaptureSession<'_>, &VideoMode) -> Result<()>;

/// The transcoder registered for a mode.
#[must_use]
pub fn transcoder_for(id: ModeId) -> Transcoder {
    match id {
        ModeId::Ula | ModeId::Layer1Ula => cell::ula,
        ModeId::LoRes => lores::lores,
        ModeId::TimexHiRes => hires::timex_hires,
        ModeId::TimexHiColour => cell::timex_hicolour,
        ModeId::Layer2Res256 | ModeId::Layer2Res320 => layer2::linear_8bpp,
        ModeId::Layer2Res640 => layer2::linear_4bpp,
        ModeId::Layer3Sub0 | ModeId::Layer3Sub1 | ModeId::Layer3Sub2 | ModeId::Layer3Sub3 => {
            layer3::unsupported
        }
    }
}

/// Can this mode be captured at all?
#[must_use]
pub fn is_supported(id: ModeId) -> bool {
    id.layer() != 3
}

/// Run the transcoder for `mode`.
pub fn transcode(session: &mut CaptureSession<'_>, mode: &VideoMode) -> Result<()> {
    transcoder_for(mode.id)(session, mode)
}

fn pixel_region(mode: &VideoMode) -> Result<MemRegion> {
    mode.pixels.ok_or_else(|| {
        CaptureError::InvalidArgument(format!("mode {:#04x} has no pixel region", mode.id.raw()))
    })
}

fn attr_region(mode: &VideoMode) -> Result<MemRegion> {
    mode.attrs.ok_or_else(|| {
        CaptureError::InvalidArgument(format!(
            "mode {:#04x} has no attribute region",
            mode.id.raw()
        ))
    })
}

/// Attribute bits.
const FLASH: u8 = 0x80;
const BRIGHT: u8 = 0x40;

/// Colour indices `(set, clear)` for pixels in a cell with attribute `attr`.
///
/// Flash swaps ink and paper for the whole cell; bright moves both into the
/// upper half of the 16-colour palette.
fn cell_colours(attr: u8) -> (u8, u8) {
    let ink = attr & 0x07;
    let paper = (attr >> 3) & 0x07;
    let bright = if attr & BRIGHT != 0 { 8 } else { 0 };
    if attr & FLASH != 0 {
        (paper + bright, ink + bright)
    } else {
        (ink + bright, paper + bright)
    }
}

/// Store a 4-bit pixel. Even `x` takes the high nibble.
fn put_nibble(row: &mut [u8], x: usize, value: u8) {
    let byte = &mut row[x >> 1];
    if x & 1 == 0 {
        *byte = (*byte & 0x0F) | (value << 4);
    } else {
        *byte = (*byte & 0xF0) | (value & 0x0F);
    }
}

/// Expand one 8-pixel cell byte into eight 4-bit pixels starting at `x`.
fn unpack_cell(row: &mut [u8], x: usize, pixels: u8, attr: u8) {
    let (set, clear) = cell_colours(attr);
    for bit in 0..8 {
        let on = pixels & (0x80 >> bit) != 0;
        put_nibble(row, x + bit, if on { set } else { clear });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attr(flash: bool, bright: bool, paper: u8, ink: u8) -> u8 {
        (u8::from(flash) << 7) | (u8::from(bright) << 6) | (paper << 3) | ink
    }

    fn nibble(row: &[u8], x: usize) -> u8 {
        if x & 1 == 0 { row[x >> 1] >> 4 } else { row[x >> 1] & 0x0F }
    }

    #[test]
    fn first_pixel_ink_second_paper() {
        let mut row = [0u8; 4];
        unpack_cell(&mut row, 0, 0b1000_0000, attr(false, false, 5, 2));
        assert_eq!(nibble(&row, 0), 2);
        assert_eq!(nibble(&row, 1), 5);
    }

    #[test]
    fn flash_swaps_roles() {
        let mut row = [0u8; 4];
        unpack_cell(&mut row, 0, 0b1000_0000, attr(true, false, 5, 2));
        assert_eq!(nibble(&row, 0), 5);
        assert_eq!(nibble(&row, 1), 2);
    }

    #[test]
    fn bright_adds_eight() {
        let mut row = [0u8; 4];
        unpack_cell(&mut row, 0, 0b0100_0000, attr(false, true, 1, 6));
        assert_eq!(nibble(&row, 0), 9);
        assert_eq!(nibble(&row, 1), 14);
    }

    #[test]
    fn cell_packs_two_pixels_per_byte() {
        let mut row = [0xFFu8; 8];
        unpack_cell(&mut row, 8, 0b1010_1010, attr(false, false, 0, 7));
        assert_eq!(&row[4..8], &[0x70, 0x70, 0x70, 0x70]);
        assert_eq!(&row[..4], &[0xFF; 4]);
    }

    #[test]
    fn put_nibble_keeps_neighbour() {
        let mut row = [0u8; 1];
        put_nibble(&mut row, 0, 0xA);
        put_nibble(&mut row, 1, 0x5);
        assert_eq!(row[0], 0xA5);
        put_nibble(&mut row, 0, 0x3);
        assert_eq!(row[0], 0x35);
    }

    #[test]
    fn only_layer3_is_unsupported() {
        for m in &crate::modes::MODES {
            assert_eq!(is_supported(m.id), m.id.layer() < 3);
        }
    }

    #[test]
    fn layer3_transcoders_refuse_without_writing() {
        use std::path::Path;

        use zxnext_hw::NextMachine;

        use crate::modes::lookup;
        use crate::sink::{MemoryFs, OutputFs};

        for raw in 0x30..=0x33 {
            let mode = lookup(raw).expect("layer 3 mode is registered");
            let mut machine = NextMachine::new();
            let mut fs = MemoryFs::new();
            let file = fs.create(Path::new("/l3.bmp")).expect("create should succeed");
            let mut session = CaptureSession::new(&mut machine, file);

            let err = transcode(&mut session, mode).expect_err("layer 3 should be refused");
            assert!(matches!(err, CaptureError::NotSupported(id) if id == raw));
            assert_eq!(fs.writes(), 0);
            assert_eq!(fs.file("/l3.bmp"), Some(Vec::new()));
        }
    }
}
