//! Per-capture context.

use format_bmp::{BmpHeader, ImageLayout, PaletteEntry};
use zxnext_hw::HardwarePort;

use crate::error::{CaptureError, Result};
use crate::sink::OutputFile;

/// The open BMP being written, with its header bookkeeping.
pub struct Output {
    file: Box<dyn OutputFile>,
    header: BmpHeader,
    row_stride: usize,
    pixel_bytes: u64,
}

impl Output {
    #[must_use]
    pub fn new(file: Box<dyn OutputFile>) -> Self {
        Self {
            file,
            header: BmpHeader::new(),
            row_stride: 0,
            pixel_bytes: 0,
        }
    }

    /// Fold the image layout into the header and write it.
    pub fn begin(&mut self, layout: &ImageLayout) -> Result<()> {
        self.header.apply(layout);
        self.row_stride = layout.row_stride() as usize;
        log::debug!(
            "{}x{} at {} bpp, {} palette entries, {} byte rows",
            layout.width,
            layout.height,
            layout.bits_per_pixel,
            layout.palette_entries,
            self.row_stride
        );
        let bytes = self.header.to_bytes();
        self.write_all(&bytes, "header")
    }

    pub fn write_palette_entry(&mut self, entry: PaletteEntry) -> Result<()> {
        self.write_all(&entry.to_bytes(), "palette entry")
    }

    /// Write one stored row. It must be exactly one stride long.
    pub fn write_row(&mut self, row: &[u8]) -> Result<()> {
        if row.len() != self.row_stride {
            return Err(CaptureError::BadState(format!(
                "row of {} bytes, stride is {}",
                row.len(),
                self.row_stride
            )));
        }
        self.write_all(row, "pixel row")?;
        self.pixel_bytes += row.len() as u64;
        Ok(())
    }

    /// Pixel data written must match the image size in the header.
    pub fn check_complete(&self) -> Result<()> {
        let expected = u64::from(self.header.info.image_size);
        if self.pixel_bytes == expected {
            Ok(())
        } else {
            Err(CaptureError::BadState(format!(
                "wrote {} pixel bytes, header declares {expected}",
                self.pixel_bytes
            )))
        }
    }

    #[must_use]
    pub fn into_file(self) -> Box<dyn OutputFile> {
        self.file
    }

    fn write_all(&mut self, bytes: &[u8], what: &str) -> Result<()> {
        let n = self.file.write(bytes);
        if n == bytes.len() {
            Ok(())
        } else {
            Err(CaptureError::BadOutputSink(format!(
                "short write of {what}: {n} of {} bytes",
                bytes.len()
            )))
        }
    }
}

/// Everything one capture works with: the machine and the file being built.
///
/// Fields are public so a transcoder can borrow the port and the output at
/// the same time.
pub struct CaptureSession<'a> {
    pub port: &'a mut dyn HardwarePort,
    pub out: Output,
}

impl<'a> CaptureSession<'a> {
    pub fn new(port: &'a mut dyn HardwarePort, file: Box<dyn OutputFile>) -> Self {
        Self {
            port,
            out: Output::new(file),
        }
    }

    #[must_use]
    pub fn into_file(self) -> Box<dyn OutputFile> {
        self.out.into_file()
    }
}

/// A zeroed row buffer. Allocation failure is reported, not fatal.
pub fn row_buffer(len: usize) -> Result<Vec<u8>> {
    let mut row = Vec::new();
    row.try_reserve_exact(len)
        .map_err(|_| CaptureError::OutOfMemory(len))?;
    row.resize(len, 0);
    Ok(row)
}
