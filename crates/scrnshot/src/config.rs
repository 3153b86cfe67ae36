//! Capture configuration.

use std::path::PathBuf;

/// File stem used for names generated in a directory.
pub const DEFAULT_FILE_STEM: &str = "scrnshot";

/// Where and how to write the screenshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureConfig {
    /// File or directory. `None` means the current directory.
    pub target: Option<PathBuf>,
    /// Replace an existing file instead of failing.
    pub force: bool,
    /// Generated names are `<file_stem>-<N>.bmp`.
    pub file_stem: String,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            target: None,
            force: false,
            file_stem: DEFAULT_FILE_STEM.to_string(),
        }
    }
}
