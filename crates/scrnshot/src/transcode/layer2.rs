//! Layer 2: linear framebuffers in banked RAM.
//!
//! The framebuffer starts at the active Layer 2 bank (16K units) and runs
//! row-major, `width` bytes per row at 8 bpp or `width / 2` at 4 bpp. It is
//! larger than the CPU can see at once, so it is read through MMU slot 2 one
//! 8K page at a time, with interrupts masked while each row is paged and read.

use format_bmp::ImageLayout;
use zxnext_hw::{InterruptGuard, PagingWindow, nextreg};

use super::pixel_region;
use crate::error::Result;
use crate::modes::VideoMode;
use crate::palette::write_palette;
use crate::session::{CaptureSession, row_buffer};

/// 16K bank size.
const BANK_SIZE: u32 = 0x4000;

/// 256x192 and 320x256 at one byte per pixel.
pub fn linear_8bpp(session: &mut CaptureSession<'_>, mode: &VideoMode) -> Result<()> {
    linear(session, mode, 8)
}

/// 640x256 at two pixels per byte.
pub fn linear_4bpp(session: &mut CaptureSession<'_>, mode: &VideoMode) -> Result<()> {
    linear(session, mode, 4)
}

fn linear(session: &mut CaptureSession<'_>, mode: &VideoMode, bits_per_pixel: u16) -> Result<()> {
    pixel_region(mode)?;

    let bank = session.port.read_nextreg(nextreg::LAYER2_ACTIVE_BANK);
    let base = u32::from(bank) * BANK_SIZE;
    log::debug!("Layer 2 bank {bank}, framebuffer at {base:#07x}");

    let layout = ImageLayout {
        width: u32::from(mode.width),
        height: u32::from(mode.height),
        bits_per_pixel,
        palette_entries: u32::from(mode.colours),
    };
    session.out.begin(&layout)?;
    write_palette(session, mode, mode.colours)?;

    let mut row = row_buffer(layout.row_stride() as usize)?;
    let row_bytes = u32::from(mode.width) * u32::from(bits_per_pixel) / 8;

    let mut window = PagingWindow::open(&mut *session.port);
    for y in (0..u32::from(mode.height)).rev() {
        let start = base + y * row_bytes;
        {
            let mut masked = InterruptGuard::enter(&mut window);
            masked.read_span(start, &mut row[..row_bytes as usize]);
        }
        session.out.write_row(&row)?;
    }
    Ok(())
}
