//! Attribute-cell modes: one bitmap byte and one attribute byte per
//! 8-pixel group, unpacked to 4 bpp.
//!
//! Standard ULA cells are 8x8 with the attribute plane laid out linearly.
//! Timex hi-colour cells are 8x1: the attribute plane in screen 1 mirrors the
//! interleaved bitmap layout byte for byte.

use format_bmp::ImageLayout;
use zxnext_hw::screen::{memmap, ula_attr_offset, ula_pixel_offset};

use super::{attr_region, pixel_region, unpack_cell};
use crate::error::Result;
use crate::modes::VideoMode;
use crate::palette::write_palette;
use crate::session::{CaptureSession, row_buffer};

/// Layer 0 and Layer 1,1.
pub fn ula(session: &mut CaptureSession<'_>, mode: &VideoMode) -> Result<()> {
    cells(session, mode, ula_attr_offset)
}

/// Layer 1,3.
pub fn timex_hicolour(session: &mut CaptureSession<'_>, mode: &VideoMode) -> Result<()> {
    cells(session, mode, ula_pixel_offset)
}

fn cells(
    session: &mut CaptureSession<'_>,
    mode: &VideoMode,
    attr_row_offset: fn(u8) -> u16,
) -> Result<()> {
    let pixels = pixel_region(mode)?;
    let attrs = attr_region(mode)?;

    let layout = ImageLayout {
        width: u32::from(mode.width),
        height: u32::from(mode.height),
        bits_per_pixel: 4,
        palette_entries: u32::from(mode.colours),
    };
    session.out.begin(&layout)?;
    write_palette(session, mode, mode.colours)?;

    let mut row = row_buffer(layout.row_stride() as usize)?;
    let columns = mode.width / 8;

    for y in (0..mode.height).rev() {
        let y = y as u8;
        let pixel_row = pixels.addr + ula_pixel_offset(y);
        let attr_row = attrs.addr + attr_row_offset(y);
        for col in 0..columns {
            let bitmap = session.port.peek(memmap(pixel_row + col));
            let attr = session.port.peek(memmap(attr_row + col));
            unpack_cell(&mut row, usize::from(col) * 8, bitmap, attr);
        }
        session.out.write_row(&row)?;
    }
    Ok(())
}
