use std::fs::{File, OpenOptions};
use std::io;
use std::os::unix::fs::FileExt;
use std::path::Path;

use log::trace;

use crate::constants::{FILL_BYTE, PAGE_SIZE, SWAP_SIZE};

/// Read-only handle to the program image backing the text and data segments.
pub struct ProgramImage {
    file: File,
}

impl ProgramImage {
    /// Open an existing program image for reading.
    pub fn open<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let file = File::open(path.as_ref())?;
        Ok(ProgramImage { file })
    }

    /// Read one page's bytes at offset `page * PAGE_SIZE` into `buf`.
    ///
    /// The image may be shorter than the address range it backs; bytes past
    /// the end of the file leave `buf` untouched, so a freshly cleared frame
    /// keeps its filler there.
    pub fn read_page(&self, page: usize, buf: &mut [u8]) -> io::Result<()> {
        let mut offset = (page * PAGE_SIZE) as u64;
        let mut filled = 0;
        while filled < buf.len() {
            match self.file.read_at(&mut buf[filled..], offset) {
                Ok(0) => break,
                Ok(n) => {
                    filled += n;
                    offset += n as u64;
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        trace!("image: read page {page}, {filled} of {} bytes", buf.len());
        Ok(())
    }
}

/// Read-write handle to the swap area holding evicted pages.
pub struct SwapArea {
    file: File,
}

impl SwapArea {
    /// Create (or truncate) the swap area and prefill its whole capacity
    /// with the filler byte, so slots never written still read back
    /// deterministically.
    pub fn create<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path.as_ref())?;
        file.write_all_at(&[FILL_BYTE; SWAP_SIZE], 0)?;
        Ok(SwapArea { file })
    }

    /// Read the page stored in `slot` into `buf`.
    pub fn read_slot(&self, slot: usize, buf: &mut [u8]) -> io::Result<()> {
        self.file.read_exact_at(buf, (slot * PAGE_SIZE) as u64)
    }

    /// Write one page's bytes to `slot`.
    pub fn write_slot(&self, slot: usize, buf: &[u8]) -> io::Result<()> {
        self.file.write_all_at(buf, (slot * PAGE_SIZE) as u64)
    }
}
