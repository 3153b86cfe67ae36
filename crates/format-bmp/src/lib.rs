//! Windows Bitmap (BMP) headers.
//!
//! A BMP file is a 14-byte file header, a 40-byte `BITMAPINFOHEADER`, an
//! optional palette of 4-byte `B, G, R, 0` entries, then pixel rows. Rows are
//! padded to a multiple of four bytes and stored bottom-up when the height is
//! positive. All multi-byte fields are little-endian.

use std::fmt;

/// `BM`, little-endian.
pub const SIGNATURE: u16 = 0x4D42;
pub const FILE_HEADER_SIZE: u32 = 14;
pub const INFO_HEADER_SIZE: u32 = 40;
pub const HEADERS_SIZE: u32 = FILE_HEADER_SIZE + INFO_HEADER_SIZE;
pub const PALETTE_ENTRY_SIZE: u32 = 4;

/// 72 DPI in pixels per metre.
pub const PIXELS_PER_METRE_72DPI: i32 = 2835;

/// `BI_RGB`: no compression.
pub const COMPRESSION_NONE: u32 = 0;

#[derive(Debug, PartialEq, Eq)]
pub enum BmpError {
    TooShort(usize),
    BadSignature(u16),
}

impl fmt::Display for BmpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooShort(len) => write!(
                f,
                "BMP headers need {HEADERS_SIZE} bytes, got {len}"
            ),
            Self::BadSignature(sig) => write!(f, "not a BMP file (signature {sig:#06x})"),
        }
    }
}

impl std::error::Error for BmpError {}

/// Geometry of the image to be written: what the headers describe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageLayout {
    pub width: u32,
    pub height: u32,
    /// 1, 4 or 8.
    pub bits_per_pixel: u16,
    /// 0 for modes without a palette.
    pub palette_entries: u32,
}

impl ImageLayout {
    /// Bytes per stored row, padded to a 4-byte boundary.
    #[must_use]
    pub fn row_stride(&self) -> u32 {
        (self.width * u32::from(self.bits_per_pixel)).div_ceil(32) * 4
    }

    #[must_use]
    pub fn palette_size(&self) -> u32 {
        self.palette_entries * PALETTE_ENTRY_SIZE
    }

    #[must_use]
    pub fn pixel_data_size(&self) -> u32 {
        self.row_stride() * self.height
    }

    #[must_use]
    pub fn file_size(&self) -> u32 {
        HEADERS_SIZE + self.palette_size() + self.pixel_data_size()
    }
}

/// `BITMAPFILEHEADER`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileHeader {
    pub signature: u16,
    pub size: u32,
    pub reserved1: u16,
    pub reserved2: u16,
    pub pixel_offset: u32,
}

/// `BITMAPINFOHEADER`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InfoHeader {
    pub header_size: u32,
    pub width: i32,
    /// Positive: rows stored bottom-up.
    pub height: i32,
    pub planes: u16,
    pub bits_per_pixel: u16,
    pub compression: u32,
    pub image_size: u32,
    pub x_pixels_per_metre: i32,
    pub y_pixels_per_metre: i32,
    pub colours_used: u32,
    pub colours_important: u32,
}

/// The file and info header pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BmpHeader {
    pub file: FileHeader,
    pub info: InfoHeader,
}

impl BmpHeader {
    /// Headers with every geometry-independent field filled in.
    ///
    /// Size and pixel offset start at the combined header size; [`apply`]
    /// adds the palette and pixel data on top.
    ///
    /// [`apply`]: Self::apply
    #[must_use]
    pub fn new() -> Self {
        Self {
            file: FileHeader {
                signature: SIGNATURE,
                size: HEADERS_SIZE,
                reserved1: 0,
                reserved2: 0,
                pixel_offset: HEADERS_SIZE,
            },
            info: InfoHeader {
                header_size: INFO_HEADER_SIZE,
                width: 0,
                height: 0,
                planes: 1,
                bits_per_pixel: 0,
                compression: COMPRESSION_NONE,
                image_size: 0,
                x_pixels_per_metre: PIXELS_PER_METRE_72DPI,
                y_pixels_per_metre: PIXELS_PER_METRE_72DPI,
                colours_used: 0,
                colours_important: 0,
            },
        }
    }

    /// Fill in geometry and accumulate palette and pixel sizes.
    pub fn apply(&mut self, layout: &ImageLayout) {
        let palette = layout.palette_size();
        let pixels = layout.pixel_data_size();

        self.file.size += palette + pixels;
        self.file.pixel_offset += palette;

        self.info.width = layout.width as i32;
        self.info.height = layout.height as i32;
        self.info.bits_per_pixel = layout.bits_per_pixel;
        self.info.image_size = pixels;
        self.info.colours_used = layout.palette_entries;
    }

    /// Serialise both headers.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; HEADERS_SIZE as usize] {
        let mut out = [0u8; HEADERS_SIZE as usize];
        let mut w = Writer { buf: &mut out, pos: 0 };

        w.u16(self.file.signature);
        w.u32(self.file.size);
        w.u16(self.file.reserved1);
        w.u16(self.file.reserved2);
        w.u32(self.file.pixel_offset);

        let i = &self.info;
        w.u32(i.header_size);
        w.i32(i.width);
        w.i32(i.height);
        w.u16(i.planes);
        w.u16(i.bits_per_pixel);
        w.u32(i.compression);
        w.u32(i.image_size);
        w.i32(i.x_pixels_per_metre);
        w.i32(i.y_pixels_per_metre);
        w.u32(i.colours_used);
        w.u32(i.colours_important);
        out
    }

    /// Parse the headers at the start of a BMP file.
    pub fn parse(data: &[u8]) -> Result<Self, BmpError> {
        if data.len() < HEADERS_SIZE as usize {
            return Err(BmpError::TooShort(data.len()));
        }
        let mut r = Reader { buf: data, pos: 0 };

        let signature = r.u16();
        if signature != SIGNATURE {
            return Err(BmpError::BadSignature(signature));
        }
        let file = FileHeader {
            signature,
            size: r.u32(),
            reserved1: r.u16(),
            reserved2: r.u16(),
            pixel_offset: r.u32(),
        };
        let info = InfoHeader {
            header_size: r.u32(),
            width: r.i32(),
            height: r.i32(),
            planes: r.u16(),
            bits_per_pixel: r.u16(),
            compression: r.u32(),
            image_size: r.u32(),
            x_pixels_per_metre: r.i32(),
            y_pixels_per_metre: r.i32(),
            colours_used: r.u32(),
            colours_important: r.u32(),
        };
        Ok(Self { file, info })
    }
}

impl Default for BmpHeader {
    fn default() -> Self {
        Self::new()
    }
}

/// One palette slot, stored blue first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PaletteEntry {
    pub blue: u8,
    pub green: u8,
    pub red: u8,
    pub reserved: u8,
}

impl PaletteEntry {
    #[must_use]
    pub fn rgb(red: u8, green: u8, blue: u8) -> Self {
        Self {
            blue,
            green,
            red,
            reserved: 0,
        }
    }

    /// From an ARGB32 value. Alpha is dropped.
    #[must_use]
    pub fn from_argb(argb: u32) -> Self {
        let [_, red, green, blue] = argb.to_be_bytes();
        Self::rgb(red, green, blue)
    }

    #[must_use]
    pub fn to_bytes(self) -> [u8; 4] {
        [self.blue, self.green, self.red, self.reserved]
    }
}

struct Writer<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl Writer<'_> {
    fn bytes(&mut self, b: &[u8]) {
        self.buf[self.pos..self.pos + b.len()].copy_from_slice(b);
        self.pos += b.len();
    }

    fn u16(&mut self, v: u16) {
        self.bytes(&v.to_le_bytes());
    }

    fn u32(&mut self, v: u32) {
        self.bytes(&v.to_le_bytes());
    }

    fn i32(&mut self, v: i32) {
        self.bytes(&v.to_le_bytes());
    }
}

struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl Reader<'_> {
    fn take<const N: usize>(&mut self) -> [u8; N] {
        let mut out = [0u8; N];
        out.copy_from_slice(&self.buf[self.pos..self.pos + N]);
        self.pos += N;
        out
    }

    fn u16(&mut self) -> u16 {
        u16::from_le_bytes(self.take())
    }

    fn u32(&mut self) -> u32 {
        u32::from_le_bytes(self.take())
    }

    fn i32(&mut self) -> i32 {
        i32::from_le_bytes(self.take())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ula_layout() -> ImageLayout {
        ImageLayout {
            width: 256,
            height: 192,
            bits_per_pixel: 4,
            palette_entries: 16,
        }
    }

    #[test]
    fn four_bit_256_wide_arithmetic() {
        let l = ula_layout();
        assert_eq!(l.row_stride(), 128);
        assert_eq!(l.palette_size(), 64);
        assert_eq!(l.file_size(), 54 + 64 + 128 * 192);
    }

    #[test]
    fn row_stride_pads_to_four_bytes() {
        let stride = |width, bpp| {
            ImageLayout {
                width,
                height: 1,
                bits_per_pixel: bpp,
                palette_entries: 0,
            }
            .row_stride()
        };
        assert_eq!(stride(512, 1), 64);
        assert_eq!(stride(1, 1), 4);
        assert_eq!(stride(33, 1), 8);
        assert_eq!(stride(3, 8), 4);
        assert_eq!(stride(5, 8), 8);
        assert_eq!(stride(640, 4), 320);
        assert_eq!(stride(9, 4), 8);
    }

    #[test]
    fn new_header_constants() {
        let h = BmpHeader::new();
        assert_eq!(h.file.signature, 0x4D42);
        assert_eq!(h.file.size, 54);
        assert_eq!(h.file.pixel_offset, 54);
        assert_eq!(h.info.header_size, 40);
        assert_eq!(h.info.planes, 1);
        assert_eq!(h.info.compression, 0);
        assert_eq!(h.info.x_pixels_per_metre, 2835);
        assert_eq!(h.info.y_pixels_per_metre, 2835);
        assert_eq!(h.info.colours_important, 0);
    }

    #[test]
    fn apply_accumulates_sizes() {
        let mut h = BmpHeader::new();
        h.apply(&ula_layout());
        assert_eq!(h.file.size, 54 + 64 + 128 * 192);
        assert_eq!(h.file.pixel_offset, 54 + 64);
        assert_eq!(h.info.width, 256);
        assert_eq!(h.info.height, 192);
        assert_eq!(h.info.bits_per_pixel, 4);
        assert_eq!(h.info.image_size, 128 * 192);
        assert_eq!(h.info.colours_used, 16);
    }

    #[test]
    fn serialised_layout() {
        let mut h = BmpHeader::new();
        h.apply(&ula_layout());
        let b = h.to_bytes();
        assert_eq!(&b[0..2], b"BM");
        assert_eq!(u32::from_le_bytes([b[2], b[3], b[4], b[5]]), 24_694);
        assert_eq!(u32::from_le_bytes([b[10], b[11], b[12], b[13]]), 118);
        assert_eq!(u32::from_le_bytes([b[14], b[15], b[16], b[17]]), 40);
        assert_eq!(u16::from_le_bytes([b[26], b[27]]), 1);
        assert_eq!(u16::from_le_bytes([b[28], b[29]]), 4);
        assert_eq!(u32::from_le_bytes([b[46], b[47], b[48], b[49]]), 16);
        assert_eq!(BmpHeader::parse(&b), Ok(h));
    }

    #[test]
    fn parse_rejects_short_input() {
        assert_eq!(BmpHeader::parse(&[0x42, 0x4D]), Err(BmpError::TooShort(2)));
    }

    #[test]
    fn parse_rejects_bad_signature() {
        let mut b = BmpHeader::new().to_bytes();
        b[0] = b'P';
        assert!(matches!(BmpHeader::parse(&b), Err(BmpError::BadSignature(_))));
    }

    #[test]
    fn palette_entry_is_blue_first() {
        let e = PaletteEntry::rgb(0x11, 0x22, 0x33);
        assert_eq!(e.to_bytes(), [0x33, 0x22, 0x11, 0x00]);
        assert_eq!(PaletteEntry::from_argb(0xFF11_2233), e);
    }
}
