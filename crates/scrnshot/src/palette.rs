//! Reading the hardware palette into BMP palette entries.

use format_bmp::PaletteEntry;
use zxnext_hw::{BASE_PALETTE, HardwarePort, Rgb9, nextreg};

use crate::error::Result;
use crate::modes::VideoMode;
use crate::session::CaptureSession;

/// Palette control value that selects, for reading, the palette the mode is
/// displaying from.
///
/// ULA modes pick between the first and second ULA palette on bit 1 of the
/// current control value, Layer 2 on bit 2. Other layers leave it alone.
/// Bit 7 (auto-increment) and bits 3-0 are carried over.
#[must_use]
pub fn read_control(mode: &VideoMode, control: u8) -> u8 {
    let keep = control & 0x8F;
    match mode.id.layer() {
        0 | 1 => {
            let second = (control >> 1) & 0x01 != 0;
            keep | if second { 0x40 } else { 0x00 }
        }
        2 => {
            let second = (control >> 2) & 0x01 != 0;
            keep | if second { 0x50 } else { 0x10 }
        }
        _ => control,
    }
}

/// Palette registers opened for reading.
///
/// Saves the index and control registers on open and writes them back on
/// drop, whatever happens in between.
pub struct PaletteReader<'a, P: HardwarePort + ?Sized> {
    port: &'a mut P,
    saved_index: u8,
    saved_control: u8,
}

impl<'a, P: HardwarePort + ?Sized> PaletteReader<'a, P> {
    pub fn open(port: &'a mut P, mode: &VideoMode) -> Self {
        let saved_index = port.read_nextreg(nextreg::PALETTE_INDEX);
        let saved_control = port.read_nextreg(nextreg::PALETTE_CONTROL);
        port.write_nextreg(nextreg::PALETTE_CONTROL, read_control(mode, saved_control));
        Self {
            port,
            saved_index,
            saved_control,
        }
    }

    /// Colour at `index` in the selected palette.
    pub fn read(&mut self, index: u8) -> Rgb9 {
        self.port.write_nextreg(nextreg::PALETTE_INDEX, index);
        let value8 = self.port.read_nextreg(nextreg::PALETTE_VALUE_8);
        let value9 = self.port.read_nextreg(nextreg::PALETTE_VALUE_9);
        Rgb9::from_registers(value8, value9)
    }

    /// The same colour as a BMP palette entry.
    pub fn entry(&mut self, index: u8) -> PaletteEntry {
        to_entry(self.read(index))
    }
}

impl<P: HardwarePort + ?Sized> Drop for PaletteReader<'_, P> {
    fn drop(&mut self) {
        self.port
            .write_nextreg(nextreg::PALETTE_CONTROL, self.saved_control);
        self.port
            .write_nextreg(nextreg::PALETTE_INDEX, self.saved_index);
    }
}

fn to_entry(colour: Rgb9) -> PaletteEntry {
    let (red, green, blue) = colour.to_rgb8();
    PaletteEntry::rgb(red, green, blue)
}

/// Snapshot of the first `count` entries of the palette `mode` displays.
pub fn read_palette<P: HardwarePort + ?Sized>(
    port: &mut P,
    mode: &VideoMode,
    count: u16,
) -> Vec<PaletteEntry> {
    let mut reader = PaletteReader::open(port, mode);
    (0..count.min(256)).map(|i| reader.entry(i as u8)).collect()
}

/// Copy `count` palette entries from the hardware to the output.
///
/// Stops at the first short write; the registers are restored either way.
pub fn write_palette(session: &mut CaptureSession<'_>, mode: &VideoMode, count: u16) -> Result<()> {
    let mut reader = PaletteReader::open(&mut *session.port, mode);
    for i in 0..count.min(256) {
        session.out.write_palette_entry(reader.entry(i as u8))?;
    }
    Ok(())
}

/// Two-colour palette for Timex hi-res.
///
/// Bits 5-3 of the Timex port pick the ink; paper is its complement. Entry 0
/// (clear pixels) is the bright paper, entry 1 the bright ink.
#[must_use]
pub fn hires_palette(timex_port: u8) -> [PaletteEntry; 2] {
    let ink = usize::from((timex_port >> 3) & 0x07);
    [
        PaletteEntry::from_argb(BASE_PALETTE[15 - ink]),
        PaletteEntry::from_argb(BASE_PALETTE[8 + ink]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modes::{ModeId, lookup};
    use crate::session::CaptureSession;
    use crate::sink::{MemoryFs, OutputFs};
    use std::path::Path;
    use zxnext_hw::NextMachine;

    fn mode(id: ModeId) -> &'static VideoMode {
        lookup(id.raw()).expect("registered")
    }

    #[test]
    fn control_for_ula_modes() {
        let ula = mode(ModeId::Ula);
        assert_eq!(read_control(ula, 0x00), 0x00);
        assert_eq!(read_control(ula, 0x02), 0x42);
        // Bits 6-4 are replaced, auto-increment kept.
        assert_eq!(read_control(ula, 0xB0), 0x80);
    }

    #[test]
    fn control_for_layer2() {
        let l2 = mode(ModeId::Layer2Res256);
        assert_eq!(read_control(l2, 0x00), 0x10);
        assert_eq!(read_control(l2, 0x04), 0x54);
        assert_eq!(read_control(l2, 0x44), 0x54);
    }

    #[test]
    fn control_for_layer3_unchanged() {
        assert_eq!(read_control(mode(ModeId::Layer3Sub0), 0x6A), 0x6A);
    }

    #[test]
    fn reads_second_ula_palette_when_active() {
        let mut m = NextMachine::new();
        m.set_palette_entry(4, 1, Rgb9 { red: 1, green: 2, blue: 3 });
        m.set_nextreg(nextreg::PALETTE_CONTROL, 0x02);
        let entries = read_palette(&mut m, mode(ModeId::Ula), 16);
        assert_eq!(entries.len(), 16);
        assert_eq!(entries[1], PaletteEntry::rgb(0x24, 0x49, 0x6D));
    }

    #[test]
    fn reads_layer2_palette() {
        let mut m = NextMachine::new();
        let entries = read_palette(&mut m, mode(ModeId::Layer2Res256), 256);
        assert_eq!(entries.len(), 256);
        assert_eq!(entries[0xE0], PaletteEntry::rgb(0xFF, 0, 0));
        assert_eq!(entries[0x03], PaletteEntry::rgb(0, 0, 0xFF));
    }

    #[test]
    fn registers_restored_after_read() {
        let mut m = NextMachine::new();
        m.set_nextreg(nextreg::PALETTE_INDEX, 0x33);
        m.set_nextreg(nextreg::PALETTE_CONTROL, 0x86);
        let _ = read_palette(&mut m, mode(ModeId::Layer2Res256), 256);
        assert_eq!(m.read_nextreg(nextreg::PALETTE_INDEX), 0x33);
        assert_eq!(m.read_nextreg(nextreg::PALETTE_CONTROL), 0x86);
    }

    #[test]
    fn registers_restored_after_write_failure() {
        let mut m = NextMachine::new();
        m.set_nextreg(nextreg::PALETTE_INDEX, 0x21);
        m.set_nextreg(nextreg::PALETTE_CONTROL, 0x02);
        let mut fs = MemoryFs::new().fail_writes_after(10);
        let file = fs.create(Path::new("/p.bmp")).expect("create");
        let mut session = CaptureSession::new(&mut m, file);
        let result = write_palette(&mut session, mode(ModeId::Ula), 16);
        assert!(matches!(result, Err(crate::CaptureError::BadOutputSink(_))));
        drop(session);
        assert_eq!(m.read_nextreg(nextreg::PALETTE_INDEX), 0x21);
        assert_eq!(m.read_nextreg(nextreg::PALETTE_CONTROL), 0x02);
    }

    #[test]
    fn hires_palette_pairs() {
        // Ink 0 (black) on bright white paper.
        assert_eq!(
            hires_palette(0x00),
            [PaletteEntry::rgb(0xFF, 0xFF, 0xFF), PaletteEntry::rgb(0, 0, 0)]
        );
        // Ink 1 (blue) on bright yellow.
        assert_eq!(
            hires_palette(0x08),
            [PaletteEntry::rgb(0xFF, 0xFF, 0), PaletteEntry::rgb(0, 0, 0xFF)]
        );
        // Only bits 5-3 count.
        assert_eq!(hires_palette(0xC7), hires_palette(0x00));
    }
}
