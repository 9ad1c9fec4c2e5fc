//! Directory Cache + Entry Mutator.
//!
//! Holds the 16 directory entries of the currently visited cluster and
//! backs `ls`, `stat`, `cd`, `del`, `undel`. A single fixed 16-entry
//! block rather than an LRU-backed multi-block cache — this shell never
//! follows a directory past its first cluster.

use log::{debug, warn};

use crate::bpb::Geometry;
use crate::device::ImageFile;
use crate::entry::{RawDirEntry, ATTR_ARCHIVE, ATTR_DIRECTORY, ATTR_READ_ONLY, DIR_ENTRY_SIZE};
use crate::error::MfsError;
use crate::name;
use crate::original_names::{OriginalNames, SLOT_COUNT};

#[derive(Debug, Clone)]
pub struct DirectoryCache {
    entries: [RawDirEntry; SLOT_COUNT],
    /// Byte offset this cache was loaded from. Used by the corrected
    /// write-back path ([`DirectoryCache::flush_to_origin`]); the
    /// shell-visible default write-back ignores it.
    origin_offset: u64,
}

impl DirectoryCache {
    /// Loads the 16 entries at `cluster` (0 meaning root, per
    /// [`Geometry::resolve_cluster`]) into a fresh cache.
    pub fn load(image: &ImageFile, geometry: &Geometry, cluster: u32) -> Result<Self, MfsError> {
        let cluster = geometry.resolve_cluster(cluster);
        let offset = geometry.lba_to_offset(cluster);
        let mut raw = [0u8; DIR_ENTRY_SIZE * SLOT_COUNT];
        image.read_at(offset, &mut raw)?;

        let mut entries = [RawDirEntry::decode(&[0u8; DIR_ENTRY_SIZE]); SLOT_COUNT];
        for (i, slot) in entries.iter_mut().enumerate() {
            let mut chunk = [0u8; DIR_ENTRY_SIZE];
            chunk.copy_from_slice(&raw[i * DIR_ENTRY_SIZE..(i + 1) * DIR_ENTRY_SIZE]);
            *slot = RawDirEntry::decode(&chunk);
        }
        debug!("loaded directory cache from cluster {} (offset {})", cluster, offset);
        Ok(Self {
            entries,
            origin_offset: offset,
        })
    }

    pub fn entries(&self) -> &[RawDirEntry; SLOT_COUNT] {
        &self.entries
    }

    pub fn origin_offset(&self) -> u64 {
        self.origin_offset
    }

    /// Finds the first entry whose on-disk name matches `name` via the
    /// Name Matcher.
    fn find(&self, query: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| name::matches(query, &e.name))
    }

    /// Lists entries whose attribute is a listable kind and whose first
    /// name byte is not a tombstone.
    pub fn ls(&self) -> Vec<[u8; 11]> {
        self.entries
            .iter()
            .filter(|e| e.is_listable_kind() && !e.is_tombstone())
            .map(|e| e.name)
            .collect()
    }

    /// Resolves `query` to its entry, or [`MfsError::NotFound`].
    pub fn stat(&self, query: &str) -> Result<RawDirEntry, MfsError> {
        self.find(query)
            .map(|i| self.entries[i])
            .ok_or(MfsError::NotFound)
    }

    /// Resolves `query` to the cluster a `cd` should load. Does not
    /// itself reload the cache — the caller loads a fresh
    /// [`DirectoryCache`] at the returned cluster.
    pub fn resolve_cd_target(&self, query: &str) -> Result<u32, MfsError> {
        let idx = self.find(query).ok_or(MfsError::NotFound)?;
        let entry = &self.entries[idx];
        if entry.attr != ATTR_DIRECTORY {
            return Err(MfsError::NotADirectory);
        }
        if entry.first_cluster_high != 0 {
            warn!(
                "entry {:?} has a non-zero firstClusterHigh ({:#06x}); only the low 16 bits are used",
                entry.name, entry.first_cluster_high
            );
        }
        Ok(entry.first_cluster_low as u32)
    }

    /// Tombstones the matched entry's first name byte in the cache. Does
    /// not flush; callers choose a write-back path.
    pub fn del(&mut self, query: &str) -> Result<(), MfsError> {
        let idx = self.find(query).ok_or(MfsError::NotFound)?;
        self.entries[idx].name[0] = crate::entry::TOMBSTONE_BYTE;
        Ok(())
    }

    /// Scans entries whose attribute is read-only/directory/archive,
    /// restoring the first name byte from [`OriginalNames`] for any whose
    /// *original* name matches `query`. Reports [`MfsError::NotFound`] if
    /// nothing was restored.
    pub fn undel(&mut self, query: &str, originals: &OriginalNames) -> Result<(), MfsError> {
        let mut restored = false;
        for (i, entry) in self.entries.iter_mut().enumerate() {
            if !matches!(entry.attr, ATTR_READ_ONLY | ATTR_DIRECTORY | ATTR_ARCHIVE) {
                continue;
            }
            let original = originals.get(i);
            if name::matches(query, original) {
                entry.name[0] = original[0];
                restored = true;
            }
        }
        if restored {
            Ok(())
        } else {
            Err(MfsError::NotFound)
        }
    }

    /// Default shell-visible write-back: rewrites all 16 cached entries
    /// to `lbaToOffset(BPB_RootClus)`, regardless of where the cache was
    /// actually loaded from. This is documented shell behavior and
    /// corrupts subdirectory mutations; kept as the default so `del`/
    /// `undel` match the documented shell.
    pub fn flush_to_root(&self, image: &ImageFile, geometry: &Geometry) -> Result<(), MfsError> {
        let offset = geometry.lba_to_offset(geometry.root_cluster);
        if offset != self.origin_offset {
            warn!(
                "flushing directory mutation to root offset {} instead of its own origin {}",
                offset, self.origin_offset
            );
        }
        self.write_at(image, offset)
    }

    /// Corrected write-back: writes to the offset the cache was actually
    /// loaded from. Not called by the dispatcher, exercised only by
    /// tests.
    pub fn flush_to_origin(&self, image: &ImageFile) -> Result<(), MfsError> {
        self.write_at(image, self.origin_offset)
    }

    fn write_at(&self, image: &ImageFile, offset: u64) -> Result<(), MfsError> {
        let mut raw = [0u8; DIR_ENTRY_SIZE * SLOT_COUNT];
        for (i, entry) in self.entries.iter().enumerate() {
            let mut chunk = [0u8; DIR_ENTRY_SIZE];
            entry.encode(&mut chunk);
            raw[i * DIR_ENTRY_SIZE..(i + 1) * DIR_ENTRY_SIZE].copy_from_slice(&chunk);
        }
        image.write_at(offset, &raw)
    }
}
