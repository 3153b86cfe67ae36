//! Layer 1,0: LoRes.
//!
//! Standard LoRes is 128x96 at one byte per pixel, split across two
//! half-screens: the first 6K of pixels at $4000, the rest at $6000.
//! Radastan halves that to 4 bpp (two pixels per byte, 64 bytes per row) in
//! one linear block and reads a 16-entry palette.

use format_bmp::ImageLayout;
use zxnext_hw::screen::memmap;
use zxnext_hw::{InterruptGuard, nextreg};

use super::{attr_region, pixel_region};
use crate::error::Result;
use crate::modes::VideoMode;
use crate::palette::write_palette;
use crate::session::{CaptureSession, row_buffer};

const RADASTAN_COLOURS: u16 = 16;

pub fn lores(session: &mut CaptureSession<'_>, mode: &VideoMode) -> Result<()> {
    let radastan = session.port.read_nextreg(nextreg::LORES_CONTROL) & nextreg::LORES_RADASTAN != 0;
    log::debug!("LoRes, radastan={radastan}");
    if radastan {
        radastan_rows(session, mode)
    } else {
        standard_rows(session, mode)
    }
}

fn radastan_rows(session: &mut CaptureSession<'_>, mode: &VideoMode) -> Result<()> {
    let pixels = pixel_region(mode)?;

    let layout = ImageLayout {
        width: u32::from(mode.width),
        height: u32::from(mode.height),
        bits_per_pixel: 4,
        palette_entries: u32::from(RADASTAN_COLOURS),
    };
    session.out.begin(&layout)?;
    write_palette(session, mode, RADASTAN_COLOURS)?;

    let stride = layout.row_stride() as usize;
    let mut row = row_buffer(stride)?;

    for y in (0..mode.height).rev() {
        let base = pixels.addr + y * stride as u16;
        {
            let port = InterruptGuard::enter(&mut *session.port);
            for (i, byte) in row.iter_mut().enumerate() {
                *byte = port.peek(memmap(base + i as u16));
            }
        }
        session.out.write_row(&row)?;
    }
    Ok(())
}

fn standard_rows(session: &mut CaptureSession<'_>, mode: &VideoMode) -> Result<()> {
    let first = pixel_region(mode)?;
    let second = attr_region(mode)?;

    let layout = ImageLayout {
        width: u32::from(mode.width),
        height: u32::from(mode.height),
        bits_per_pixel: 8,
        palette_entries: u32::from(mode.colours),
    };
    session.out.begin(&layout)?;
    write_palette(session, mode, mode.colours)?;

    let mut row = row_buffer(layout.row_stride() as usize)?;
    let width = usize::from(mode.width);

    for y in (0..usize::from(mode.height)).rev() {
        {
            let port = InterruptGuard::enter(&mut *session.port);
            for (x, byte) in row.iter_mut().take(width).enumerate() {
                let offset = y * width + x;
                let addr = if offset < usize::from(first.size) {
                    first.addr + offset as u16
                } else {
                    second.addr + (offset - usize::from(first.size)) as u16
                };
                *byte = port.peek(memmap(addr));
            }
        }
        session.out.write_row(&row)?;
    }
    Ok(())
}
