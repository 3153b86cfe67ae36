//! The hardware capability handed to the screenshot engine.

/// Maskable interrupt control.
///
/// Split out from [`HardwarePort`] so that wrappers holding a port (such as
/// [`PagingWindow`](crate::PagingWindow)) can be masked with an
/// [`InterruptGuard`](crate::InterruptGuard) without handing the port back.
pub trait InterruptControl {
    /// Are maskable interrupts currently enabled?
    fn interrupts_enabled(&self) -> bool;

    /// `DI`.
    fn disable_interrupts(&mut self);

    /// `EI`.
    fn enable_interrupts(&mut self);
}

/// Active display layer and sub-mode as reported by the OS mode query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayMode {
    pub layer: u8,
    pub submode: u8,
}

/// Access to Next hardware state.
///
/// The register interface is global mutable state shared with the rest of
/// the machine: anything that writes a register must put it back.
pub trait HardwarePort: InterruptControl {
    /// Read a NextREG.
    fn read_nextreg(&mut self, reg: u8) -> u8;

    /// Write a NextREG.
    fn write_nextreg(&mut self, reg: u8, value: u8);

    /// `IN` from an I/O port.
    fn read_port(&mut self, port: u16) -> u8;

    /// Read a byte from the visible 64K address space as currently paged.
    fn peek(&self, addr: u16) -> u8;

    /// Current display layer and sub-mode, or `None` if the query failed.
    fn display_mode(&mut self) -> Option<DisplayMode>;
}
