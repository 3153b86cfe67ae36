//! Video mode registry and detection.
//!
//! A mode id packs the display layer into the high nibble and the sub-mode
//! into the low nibble: Layer 1 sub-mode 2 is `0x12`.

use zxnext_hw::HardwarePort;

/// Every mode the registry knows, keyed by its packed id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ModeId {
    /// Layer 0: standard ULA screen.
    Ula = 0x00,
    /// Layer 1,0: LoRes 128x96, or Radastan when enabled.
    LoRes = 0x10,
    /// Layer 1,1: standard ULA screen.
    Layer1Ula = 0x11,
    /// Layer 1,2: Timex 512x192 monochrome.
    TimexHiRes = 0x12,
    /// Layer 1,3: Timex 8x1 attribute cells.
    TimexHiColour = 0x13,
    /// Layer 2 at 256x192.
    Layer2Res256 = 0x20,
    /// Layer 2 at 320x256.
    Layer2Res320 = 0x22,
    /// Layer 2 at 640x256, 4 bpp.
    Layer2Res640 = 0x23,
    Layer3Sub0 = 0x30,
    Layer3Sub1 = 0x31,
    Layer3Sub2 = 0x32,
    Layer3Sub3 = 0x33,
}

impl ModeId {
    #[must_use]
    pub fn raw(self) -> u8 {
        self as u8
    }

    #[must_use]
    pub fn from_raw(raw: u8) -> Option<Self> {
        lookup(raw).map(|mode| mode.id)
    }

    /// Layer number (high nibble).
    #[must_use]
    pub fn layer(self) -> u8 {
        self.raw() >> 4
    }
}

/// A block of the 64K address space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemRegion {
    pub addr: u16,
    pub size: u16,
}

impl MemRegion {
    const fn new(addr: u16, size: u16) -> Self {
        Self { addr, size }
    }
}

/// Geometry of one video mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoMode {
    pub id: ModeId,
    pub width: u16,
    pub height: u16,
    /// Distinct colour values the mode can address.
    pub colours: u16,
    /// Attribute cell grid; all zero for per-pixel colour.
    pub cell_width: u8,
    pub cell_height: u8,
    pub colours_per_cell: u8,
    pub pixels: Option<MemRegion>,
    pub attrs: Option<MemRegion>,
}

const ULA_PIXELS: MemRegion = MemRegion::new(0x4000, 0x1800);
const ULA_ATTRS: MemRegion = MemRegion::new(0x5800, 0x0300);
const SCREEN1: MemRegion = MemRegion::new(0x6000, 0x1800);
const LAYER2_WINDOW: MemRegion = MemRegion::new(0x4000, 0x2000);

const fn mode(
    id: ModeId,
    (width, height, colours): (u16, u16, u16),
    (cell_width, cell_height, colours_per_cell): (u8, u8, u8),
    pixels: Option<MemRegion>,
    attrs: Option<MemRegion>,
) -> VideoMode {
    VideoMode {
        id,
        width,
        height,
        colours,
        cell_width,
        cell_height,
        colours_per_cell,
        pixels,
        attrs,
    }
}

/// The registry.
pub static MODES: [VideoMode; 12] = [
    mode(ModeId::Ula, (256, 192, 16), (32, 24, 2), Some(ULA_PIXELS), Some(ULA_ATTRS)),
    mode(ModeId::LoRes, (128, 96, 256), (0, 0, 0), Some(ULA_PIXELS), Some(SCREEN1)),
    mode(ModeId::Layer1Ula, (256, 192, 16), (32, 24, 2), Some(ULA_PIXELS), Some(ULA_ATTRS)),
    mode(ModeId::TimexHiRes, (512, 192, 2), (0, 0, 0), Some(ULA_PIXELS), Some(SCREEN1)),
    mode(ModeId::TimexHiColour, (256, 192, 16), (32, 192, 2), Some(ULA_PIXELS), Some(SCREEN1)),
    mode(ModeId::Layer2Res256, (256, 192, 256), (0, 0, 0), Some(LAYER2_WINDOW), None),
    mode(ModeId::Layer2Res320, (320, 256, 256), (0, 0, 0), Some(LAYER2_WINDOW), None),
    mode(ModeId::Layer2Res640, (640, 256, 16), (0, 0, 0), Some(LAYER2_WINDOW), None),
    mode(ModeId::Layer3Sub0, (320, 256, 256), (40, 32, 2), None, None),
    mode(ModeId::Layer3Sub1, (640, 256, 256), (80, 32, 2), None, None),
    mode(ModeId::Layer3Sub2, (320, 256, 256), (40, 32, 16), None, None),
    mode(ModeId::Layer3Sub3, (320, 256, 256), (80, 32, 16), None, None),
];

/// Find the descriptor for a packed mode id.
#[must_use]
pub fn lookup(raw: u8) -> Option<&'static VideoMode> {
    MODES.iter().find(|m| m.id as u8 == raw)
}

/// Pack layer and sub-mode into a mode id.
#[must_use]
pub fn pack(layer: u8, submode: u8) -> u8 {
    ((layer & 0x0F) << 4) | (submode & 0x0F)
}

/// Ask the machine which mode is showing. `None` if the query fails.
pub fn detect_mode(port: &mut dyn HardwarePort) -> Option<u8> {
    let mode = port.display_mode()?;
    let raw = pack(mode.layer, mode.submode);
    log::debug!(
        "display layer {} sub-mode {} -> mode {raw:#04x}",
        mode.layer,
        mode.submode
    );
    Some(raw)
}
