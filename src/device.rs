//! Image Handle — the single open image file and its random-access
//! read/write primitives.
//!
//! Wraps a `std::fs::File` in a `spin::RwLock` so it can be shared behind
//! an `Arc`. This shell is single-threaded, but the lock is kept anyway:
//! it is the idiom for handing a `File` to multiple owners without a
//! `&mut` chain threaded through every call site.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use log::debug;
use spin::RwLock;

use crate::error::MfsError;

/// Positioned read/write over a single backing file.
pub struct ImageFile {
    file: RwLock<File>,
}

impl ImageFile {
    /// Opens `path` for reading and writing. Fails with
    /// [`MfsError::ImageNotFound`] if the file cannot be opened at all.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, MfsError> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path.as_ref())
            .map_err(|_| MfsError::ImageNotFound)?;
        debug!("opened image {}", path.as_ref().display());
        Ok(Self {
            file: RwLock::new(file),
        })
    }

    /// Reads exactly `buf.len()` bytes starting at byte offset `offset`.
    pub fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<(), MfsError> {
        let mut file = self.file.write();
        file.seek(SeekFrom::Start(offset))?;
        file.read_exact(buf)?;
        Ok(())
    }

    /// Writes `buf` at byte offset `offset`.
    pub fn write_at(&self, offset: u64, buf: &[u8]) -> Result<(), MfsError> {
        let mut file = self.file.write();
        file.seek(SeekFrom::Start(offset))?;
        file.write_all(buf)?;
        Ok(())
    }
}
