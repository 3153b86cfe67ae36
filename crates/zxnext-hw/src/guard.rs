//! Scoped save/restore of shared hardware state.
//!
//! Each guard captures the state it is about to change when constructed and
//! puts it back in `Drop`, so early returns through `?` cannot leave the
//! machine with interrupts masked, the wrong page in slot 2, or the CPU at
//! the wrong speed.

use std::ops::{Deref, DerefMut};

use crate::nextreg;
use crate::port::{HardwarePort, InterruptControl};

/// Interrupts masked for the lifetime of the guard.
///
/// Interrupts are re-enabled on drop only if they were enabled on entry, so
/// guards nest.
pub struct InterruptGuard<'a, T: InterruptControl + ?Sized> {
    inner: &'a mut T,
    was_enabled: bool,
}

impl<'a, T: InterruptControl + ?Sized> InterruptGuard<'a, T> {
    pub fn enter(inner: &'a mut T) -> Self {
        let was_enabled = inner.interrupts_enabled();
        inner.disable_interrupts();
        Self { inner, was_enabled }
    }
}

impl<T: InterruptControl + ?Sized> Deref for InterruptGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        self.inner
    }
}

impl<T: InterruptControl + ?Sized> DerefMut for InterruptGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        self.inner
    }
}

impl<T: InterruptControl + ?Sized> Drop for InterruptGuard<'_, T> {
    fn drop(&mut self) {
        if self.was_enabled {
            self.inner.enable_interrupts();
        }
    }
}

/// Physical memory seen through MMU slot 2 ($4000-$5FFF).
///
/// Reads take a physical address; the window pages in the 8K page holding it
/// only when it differs from the page already mapped, so a sequential scan
/// costs one register write per page boundary. The slot's original page is
/// written back on drop.
pub struct PagingWindow<'a, P: HardwarePort + ?Sized> {
    port: &'a mut P,
    saved: u8,
    current: Option<u8>,
}

impl<'a, P: HardwarePort + ?Sized> PagingWindow<'a, P> {
    /// CPU address of the window.
    pub const BASE: u16 = 0x4000;

    /// Page size in bytes.
    pub const PAGE_SIZE: u32 = 0x2000;

    pub fn open(port: &'a mut P) -> Self {
        let saved = port.read_nextreg(nextreg::MMU2);
        Self {
            port,
            saved,
            current: None,
        }
    }

    /// Read the byte at a physical RAM address, paging as needed.
    pub fn read(&mut self, phys: u32) -> u8 {
        let page = ((phys >> 13) & 0xFF) as u8;
        if self.current != Some(page) {
            self.port.write_nextreg(nextreg::MMU2, page);
            self.current = Some(page);
        }
        self.port.peek(Self::BASE + (phys & (Self::PAGE_SIZE - 1)) as u16)
    }

    /// Fill `buf` from physical RAM starting at `phys`.
    ///
    /// A span crossing a page boundary is read high page first, so a scan
    /// that moves down through memory a span at a time pages each page in
    /// once.
    pub fn read_span(&mut self, phys: u32, buf: &mut [u8]) {
        let Some(last) = (buf.len() as u32).checked_sub(1) else {
            return;
        };
        let split = ((phys + last) & !(Self::PAGE_SIZE - 1)).max(phys);
        let (low, high) = buf.split_at_mut((split - phys) as usize);
        for (addr, byte) in (split..).zip(high.iter_mut()) {
            *byte = self.read(addr);
        }
        for (addr, byte) in (phys..).zip(low.iter_mut()) {
            *byte = self.read(addr);
        }
    }
}

impl<P: HardwarePort + ?Sized> InterruptControl for PagingWindow<'_, P> {
    fn interrupts_enabled(&self) -> bool {
        self.port.interrupts_enabled()
    }

    fn disable_interrupts(&mut self) {
        self.port.disable_interrupts();
    }

    fn enable_interrupts(&mut self) {
        self.port.enable_interrupts();
    }
}

impl<P: HardwarePort + ?Sized> Drop for PagingWindow<'_, P> {
    fn drop(&mut self) {
        self.port.write_nextreg(nextreg::MMU2, self.saved);
    }
}

/// CPU switched to 28 MHz; the previous speed comes back on drop.
pub struct CpuSpeedGuard<'a, P: HardwarePort + ?Sized> {
    port: &'a mut P,
    saved: u8,
}

impl<'a, P: HardwarePort + ?Sized> CpuSpeedGuard<'a, P> {
    pub fn enter(port: &'a mut P) -> Self {
        let saved = port.read_nextreg(nextreg::CPU_SPEED) & 0x03;
        port.write_nextreg(nextreg::CPU_SPEED, nextreg::CPU_SPEED_28MHZ);
        Self { port, saved }
    }
}

impl<P: HardwarePort + ?Sized> Deref for CpuSpeedGuard<'_, P> {
    type Target = P;

    fn deref(&self) -> &P {
        self.port
    }
}

impl<P: HardwarePort + ?Sized> DerefMut for CpuSpeedGuard<'_, P> {
    fn deref_mut(&mut self) -> &mut P {
        self.port
    }
}

impl<P: HardwarePort + ?Sized> Drop for CpuSpeedGuard<'_, P> {
    fn drop(&mut self) {
        self.port.write_nextreg(nextreg::CPU_SPEED, self.saved);
    }
}
