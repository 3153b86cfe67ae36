//! Where the BMP goes.
//!
//! The capture only needs a handful of filesystem operations, so they sit
//! behind [`OutputFs`]. [`HostFs`] is the real filesystem; `MemoryFs` keeps
//! everything in memory and can be told to fail.

use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// An open output file.
pub trait OutputFile {
    /// Write `buf`, returning how many bytes made it. Anything short of
    /// `buf.len()` is a failure.
    fn write(&mut self, buf: &[u8]) -> usize;

    /// Flush and close. `false` if buffered data could not be written.
    fn finish(self: Box<Self>) -> bool;
}

/// Filesystem operations used by the capture.
pub trait OutputFs {
    fn current_dir(&self) -> io::Result<PathBuf>;

    fn is_dir(&self, path: &Path) -> bool;

    fn exists(&self, path: &Path) -> bool;

    /// Create or truncate a file for writing.
    fn create(&mut self, path: &Path) -> io::Result<Box<dyn OutputFile>>;

    fn remove(&mut self, path: &Path) -> io::Result<()>;
}

/// The host filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct HostFs;

struct HostFile {
    writer: BufWriter<fs::File>,
}

impl OutputFile for HostFile {
    fn write(&mut self, buf: &[u8]) -> usize {
        match self.writer.write_all(buf) {
            Ok(()) => buf.len(),
            Err(e) => {
                log::debug!("write failed: {e}");
                0
            }
        }
    }

    fn finish(mut self: Box<Self>) -> bool {
        match self.writer.flush() {
            Ok(()) => true,
            Err(e) => {
                log::debug!("flush failed: {e}");
                false
            }
        }
    }
}

impl OutputFs for HostFs {
    fn current_dir(&self) -> io::Result<PathBuf> {
        std::env::current_dir()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn create(&mut self, path: &Path) -> io::Result<Box<dyn OutputFile>> {
        let file = fs::File::create(path)?;
        Ok(Box::new(HostFile {
            writer: BufWriter::new(file),
        }))
    }

    fn remove(&mut self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }
}

#[cfg(any(test, feature = "test-utils"))]
pub use memory::MemoryFs;

#[cfg(any(test, feature = "test-utils"))]
mod memory {
    use std::cell::RefCell;
    use std::collections::{BTreeMap, BTreeSet};
    use std::io;
    use std::path::{Path, PathBuf};
    use std::rc::Rc;

    use super::{OutputFile, OutputFs};

    #[derive(Default)]
    struct State {
        cwd: PathBuf,
        dirs: BTreeSet<PathBuf>,
        files: BTreeMap<PathBuf, Vec<u8>>,
        /// Bytes a file may hold before writes come up short.
        fail_after: Option<usize>,
        fail_close: bool,
        deny_create: bool,
        calls: usize,
        writes: usize,
    }

    /// In-memory filesystem with failure injection.
    ///
    /// Files handed out by [`create`](OutputFs::create) write straight into
    /// the shared state, so contents are visible as soon as they are written.
    #[derive(Clone)]
    pub struct MemoryFs {
        state: Rc<RefCell<State>>,
    }

    impl MemoryFs {
        /// Empty filesystem with `/` as the working directory.
        #[must_use]
        pub fn new() -> Self {
            let mut state = State {
                cwd: PathBuf::from("/"),
                ..State::default()
            };
            state.dirs.insert(PathBuf::from("/"));
            Self {
                state: Rc::new(RefCell::new(state)),
            }
        }

        #[must_use]
        pub fn with_dir(self, path: impl Into<PathBuf>) -> Self {
            self.state.borrow_mut().dirs.insert(path.into());
            self
        }

        #[must_use]
        pub fn with_file(self, path: impl Into<PathBuf>, data: &[u8]) -> Self {
            self.state.borrow_mut().files.insert(path.into(), data.to_vec());
            self
        }

        /// Writes past `bytes` in any one file come up short.
        #[must_use]
        pub fn fail_writes_after(self, bytes: usize) -> Self {
            self.state.borrow_mut().fail_after = Some(bytes);
            self
        }

        /// Closing a file reports failure.
        #[must_use]
        pub fn fail_close(self) -> Self {
            self.state.borrow_mut().fail_close = true;
            self
        }

        /// `create` fails with permission denied.
        #[must_use]
        pub fn deny_create(self) -> Self {
            self.state.borrow_mut().deny_create = true;
            self
        }

        #[must_use]
        pub fn file(&self, path: impl AsRef<Path>) -> Option<Vec<u8>> {
            self.state.borrow().files.get(path.as_ref()).cloned()
        }

        #[must_use]
        pub fn file_names(&self) -> Vec<PathBuf> {
            self.state.borrow().files.keys().cloned().collect()
        }

        /// Calls made through [`OutputFs`] and [`OutputFile`].
        #[must_use]
        pub fn calls(&self) -> usize {
            self.state.borrow().calls
        }

        /// `write` calls on files.
        #[must_use]
        pub fn writes(&self) -> usize {
            self.state.borrow().writes
        }
    }

    impl Default for MemoryFs {
        fn default() -> Self {
            Self::new()
        }
    }

    struct MemoryFile {
        state: Rc<RefCell<State>>,
        path: PathBuf,
    }

    impl OutputFile for MemoryFile {
        fn write(&mut self, buf: &[u8]) -> usize {
            let mut state = self.state.borrow_mut();
            state.calls += 1;
            state.writes += 1;
            let limit = state.fail_after.unwrap_or(usize::MAX);
            let Some(data) = state.files.get_mut(&self.path) else {
                return 0;
            };
            let room = limit.saturating_sub(data.len());
            let n = buf.len().min(room);
            data.extend_from_slice(&buf[..n]);
            n
        }

        fn finish(self: Box<Self>) -> bool {
            let mut state = self.state.borrow_mut();
            state.calls += 1;
            !state.fail_close
        }
    }

    impl OutputFs for MemoryFs {
        fn current_dir(&self) -> io::Result<PathBuf> {
            let mut state = self.state.borrow_mut();
            state.calls += 1;
            Ok(state.cwd.clone())
        }

        fn is_dir(&self, path: &Path) -> bool {
            let mut state = self.state.borrow_mut();
            state.calls += 1;
            state.dirs.contains(path)
        }

        fn exists(&self, path: &Path) -> bool {
            let mut state = self.state.borrow_mut();
            state.calls += 1;
            state.dirs.contains(path) || state.files.contains_key(path)
        }

        fn create(&mut self, path: &Path) -> io::Result<Box<dyn OutputFile>> {
            let mut state = self.state.borrow_mut();
            state.calls += 1;
            if state.deny_create {
                return Err(io::Error::new(
                    io::ErrorKind::PermissionDenied,
                    "read-only filesystem",
                ));
            }
            state.files.insert(path.to_path_buf(), Vec::new());
            Ok(Box::new(MemoryFile {
                state: Rc::clone(&self.state),
                path: path.to_path_buf(),
            }))
        }

        fn remove(&mut self, path: &Path) -> io::Result<()> {
            let mut state = self.state.borrow_mut();
            state.calls += 1;
            state
                .files
                .remove(path)
                .map(|_| ())
                .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such file"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_fs_short_write_after_limit() {
        let mut fs = MemoryFs::new().fail_writes_after(6);
        let mut f = fs.create(Path::new("/a.bmp")).expect("create should succeed");
        assert_eq!(f.write(&[1, 2, 3, 4]), 4);
        assert_eq!(f.write(&[5, 6, 7, 8]), 2);
        assert_eq!(f.write(&[9]), 0);
        assert!(f.finish());
        assert_eq!(fs.file("/a.bmp"), Some(vec![1, 2, 3, 4, 5, 6]));
        assert_eq!(fs.writes(), 3);
    }

    #[test]
    fn memory_fs_create_truncates_and_remove_deletes() {
        let mut fs = MemoryFs::new().with_file("/a.bmp", b"old");
        let f = fs.create(Path::new("/a.bmp")).expect("create should succeed");
        drop(f);
        assert_eq!(fs.file("/a.bmp"), Some(Vec::new()));
        fs.remove(Path::new("/a.bmp")).expect("remove should succeed");
        assert!(!fs.exists(Path::new("/a.bmp")));
        assert!(fs.remove(Path::new("/a.bmp")).is_err());
    }

    #[test]
    fn memory_fs_dirs() {
        let fs = MemoryFs::new().with_dir("/shots");
        assert!(fs.is_dir(Path::new("/shots")));
        assert!(fs.is_dir(Path::new("/")));
        assert!(!fs.is_dir(Path::new("/nope")));
        assert_eq!(fs.current_dir().expect("cwd"), PathBuf::from("/"));
    }

    #[test]
    fn memory_fs_deny_create() {
        let mut fs = MemoryFs::new().deny_create();
        let err = fs.create(Path::new("/a.bmp")).err().expect("create should fail");
        assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);
    }

    #[test]
    fn host_fs_writes_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("out.bmp");
        let mut fs = HostFs;
        assert!(fs.is_dir(dir.path()));
        assert!(!fs.exists(&path));
        let mut f = fs.create(&path).expect("create should succeed");
        assert_eq!(f.write(b"BM"), 2);
        assert!(f.finish());
        assert_eq!(std::fs::read(&path).expect("read back"), b"BM");
        fs.remove(&path).expect("remove should succeed");
        assert!(!fs.exists(&path));
    }
}
