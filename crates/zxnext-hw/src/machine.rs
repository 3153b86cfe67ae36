//! In-memory model of the Next hardware the capture reads.
//!
//! Covers the NextREG file, the eight MMU slots, the eight 256-entry palettes,
//! the Timex screen port, the interrupt flag and 2 MB of RAM in 8K pages.
//! Nothing is clocked: the model holds state, it does not run.

use crate::nextreg;
use crate::palette::Rgb9;
use crate::port::{DisplayMode, HardwarePort, InterruptControl};

/// 8K page size.
const PAGE_SIZE: usize = 0x2000;

/// Pages of RAM.
const PAGE_COUNT: usize = 256;

/// MMU value meaning "ROM" in slots 0 and 1.
const MMU_ROM: u8 = 0xFF;

/// MMU slots after reset.
const MMU_RESET: [u8; 8] = [MMU_ROM, MMU_ROM, 0x0A, 0x0B, 0x04, 0x05, 0x00, 0x01];

/// Palettes addressed by control bits 6-4: ULA, Layer 2, sprites, tilemap,
/// each first then second.
const PALETTE_COUNT: usize = 8;

/// Palette control bit 7: no auto-increment on value writes.
const PALETTE_NO_INCREMENT: u8 = 0x80;

pub struct NextMachine {
    ram: Vec<u8>,
    regs: [u8; 256],
    mmu: [u8; 8],
    palettes: Vec<[u16; 256]>,
    palette_index: u8,
    /// First byte of a two-write `0x44` sequence.
    palette_pending: Option<u8>,
    timex_port: u8,
    interrupts: bool,
    display: Option<DisplayMode>,
    nextreg_log: Vec<(u8, u8)>,
}

impl NextMachine {
    /// Power-on state: RAM cleared, default palettes, Layer 0, interrupts on.
    #[must_use]
    pub fn new() -> Self {
        let mut regs = [0u8; 256];
        regs[usize::from(nextreg::LAYER2_ACTIVE_BANK)] = 8;
        regs[0x13] = 11;

        let mut palettes = vec![[0u16; 256]; PALETTE_COUNT];
        for (select, palette) in palettes.iter_mut().enumerate() {
            for (i, entry) in palette.iter_mut().enumerate() {
                *entry = default_colour(select, i as u8).bits();
            }
        }

        Self {
            ram: vec![0; PAGE_SIZE * PAGE_COUNT],
            regs,
            mmu: MMU_RESET,
            palettes,
            palette_index: 0,
            palette_pending: None,
            timex_port: 0,
            interrupts: true,
            display: Some(DisplayMode {
                layer: 0,
                submode: 0,
            }),
            nextreg_log: Vec::new(),
        }
    }

    /// Copy `data` into RAM starting at the given 8K page. Data running past
    /// the end of RAM is dropped.
    pub fn load_page(&mut self, page: u8, data: &[u8]) {
        self.load_ram(usize::from(page) * PAGE_SIZE, data);
    }

    /// Copy `data` into RAM at a physical address.
    pub fn load_ram(&mut self, phys: usize, data: &[u8]) {
        if phys >= self.ram.len() {
            return;
        }
        let len = data.len().min(self.ram.len() - phys);
        self.ram[phys..phys + len].copy_from_slice(&data[..len]);
    }

    /// One 8K page of RAM.
    #[must_use]
    pub fn page(&self, page: u8) -> &[u8] {
        let start = usize::from(page) * PAGE_SIZE;
        &self.ram[start..start + PAGE_SIZE]
    }

    /// Set a palette entry directly. `select` is the control-register
    /// palette number (0-7).
    pub fn set_palette_entry(&mut self, select: u8, index: u8, colour: Rgb9) {
        self.palettes[usize::from(select & 0x07)][usize::from(index)] = colour.bits();
    }

    #[must_use]
    pub fn palette_entry(&self, select: u8, index: u8) -> Rgb9 {
        Rgb9::from_bits(self.palettes[usize::from(select & 0x07)][usize::from(index)])
    }

    pub fn set_display_mode(&mut self, mode: DisplayMode) {
        self.display = Some(mode);
    }

    /// Make the display mode query fail.
    pub fn clear_display_mode(&mut self) {
        self.display = None;
    }

    pub fn set_timex_port(&mut self, value: u8) {
        self.timex_port = value;
    }

    /// Set a register without recording the write. Goes through the same
    /// decoding as [`HardwarePort::write_nextreg`].
    pub fn set_nextreg(&mut self, reg: u8, value: u8) {
        self.store_nextreg(reg, value);
    }

    /// Every NextREG write made through [`HardwarePort::write_nextreg`], in order.
    #[must_use]
    pub fn nextreg_log(&self) -> &[(u8, u8)] {
        &self.nextreg_log
    }

    pub fn clear_nextreg_log(&mut self) {
        self.nextreg_log.clear();
    }

    fn selected_palette(&self) -> usize {
        usize::from((self.regs[usize::from(nextreg::PALETTE_CONTROL)] >> 4) & 0x07)
    }

    fn current_entry(&self) -> Rgb9 {
        Rgb9::from_bits(self.palettes[self.selected_palette()][usize::from(self.palette_index)])
    }

    fn store_entry(&mut self, colour: Rgb9) {
        let select = self.selected_palette();
        self.palettes[select][usize::from(self.palette_index)] = colour.bits();
        if self.regs[usize::from(nextreg::PALETTE_CONTROL)] & PALETTE_NO_INCREMENT == 0 {
            self.palette_index = self.palette_index.wrapping_add(1);
        }
    }

    fn store_nextreg(&mut self, reg: u8, value: u8) {
        match reg {
            nextreg::PALETTE_INDEX => {
                self.palette_index = value;
                self.palette_pending = None;
            }
            nextreg::PALETTE_VALUE_8 => {
                self.palette_pending = None;
                self.store_entry(Rgb9::from_rgb332(value));
            }
            nextreg::PALETTE_CONTROL => {
                self.regs[usize::from(reg)] = value;
                self.palette_pending = None;
            }
            nextreg::PALETTE_VALUE_9 => match self.palette_pending.take() {
                None => self.palette_pending = Some(value),
                Some(first) => self.store_entry(Rgb9::from_registers(first, value)),
            },
            0x50..=0x57 => self.mmu[usize::from(reg - nextreg::MMU0)] = value,
            _ => self.regs[usize::from(reg)] = value,
        }
    }
}

impl Default for NextMachine {
    fn default() -> Self {
        Self::new()
    }
}

/// Reset colour for a palette entry.
///
/// ULA palettes start with the Spectrum colours in 0-15; everything else is
/// the entry's index read as `RRRGGGBB`.
fn default_colour(select: usize, index: u8) -> Rgb9 {
    let ula = select == 0 || select == 4;
    if ula && index < 16 {
        let level = if index & 0x08 == 0 { 5 } else { 7 };
        let on = |bit: u8| if index & bit != 0 { level } else { 0 };
        Rgb9 {
            red: on(0x02),
            green: on(0x04),
            blue: on(0x01),
        }
    } else {
        Rgb9::from_rgb332(index)
    }
}

impl InterruptControl for NextMachine {
    fn interrupts_enabled(&self) -> bool {
        self.interrupts
    }

    fn disable_interrupts(&mut self) {
        self.interrupts = false;
    }

    fn enable_interrupts(&mut self) {
        self.interrupts = true;
    }
}

impl HardwarePort for NextMachine {
    fn read_nextreg(&mut self, reg: u8) -> u8 {
        match reg {
            nextreg::PALETTE_INDEX => self.palette_index,
            nextreg::PALETTE_VALUE_8 => self.current_entry().value8(),
            nextreg::PALETTE_VALUE_9 => self.current_entry().value9(),
            0x50..=0x57 => self.mmu[usize::from(reg - nextreg::MMU0)],
            _ => self.regs[usize::from(reg)],
        }
    }

    fn write_nextreg(&mut self, reg: u8, value: u8) {
        self.nextreg_log.push((reg, value));
        self.store_nextreg(reg, value);
    }

    fn read_port(&mut self, port: u16) -> u8 {
        if port & 0xFF == nextreg::TIMEX_PORT {
            self.timex_port
        } else {
            0xFF
        }
    }

    fn peek(&self, addr: u16) -> u8 {
        let page = self.mmu[usize::from(addr >> 13)];
        if page == MMU_ROM {
            return 0;
        }
        self.ram[usize::from(page) * PAGE_SIZE + usize::from(addr & 0x1FFF)]
    }

    fn display_mode(&mut self) -> Option<DisplayMode> {
        self.display
    }
}
