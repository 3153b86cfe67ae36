//! Layer 1,2: Timex 512x192 monochrome.

use format_bmp::ImageLayout;
use zxnext_hw::screen::{memmap, timex_hires_addr};
use zxnext_hw::{InterruptGuard, nextreg};

use crate::error::Result;
use crate::modes::VideoMode;
use crate::palette::hires_palette;
use crate::session::{CaptureSession, row_buffer};

pub fn timex_hires(session: &mut CaptureSession<'_>, mode: &VideoMode) -> Result<()> {
    let timex = session.port.read_port(nextreg::TIMEX_PORT);
    let palette = hires_palette(timex);

    let layout = ImageLayout {
        width: u32::from(mode.width),
        height: u32::from(mode.height),
        bits_per_pixel: 1,
        palette_entries: palette.len() as u32,
    };
    session.out.begin(&layout)?;
    for entry in palette {
        session.out.write_palette_entry(entry)?;
    }

    let mut row = row_buffer(layout.row_stride() as usize)?;
    let groups = usize::from(mode.width / 8);

    for y in (0..mode.height).rev() {
        {
            let port = InterruptGuard::enter(&mut *session.port);
            for (col, byte) in row.iter_mut().take(groups).enumerate() {
                *byte = port.peek(memmap(timex_hires_addr(col as u16 * 8, y as u8)));
            }
        }
        session.out.write_row(&row)?;
    }
    Ok(())
}
