//! Test-only helpers for building a backing file out of raw bytes.

use std::fs::OpenOptions;
use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::device::ImageFile;

static COUNTER: AtomicU64 = AtomicU64::new(0);

/// Writes `bytes` to a fresh scratch file and opens it as an [`ImageFile`].
pub(crate) fn make_image(bytes: &[u8]) -> ImageFile {
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    let path = std::env::temp_dir().join(format!("mfs-test-{}-{}.img", std::process::id(), n));
    {
        let mut f = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&path)
            .unwrap();
        f.write_all(bytes).unwrap();
    }
    ImageFile::open(&path).unwrap()
}
