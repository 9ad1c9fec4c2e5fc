//! BIOS Parameter Block (BPB) and cluster/sector geometry.
//!
//! The BPB sits in the first sector of the volume (the "boot sector" or
//! "reserved sector"). It is the only structure this shell trusts on open;
//! no further volume validation is performed.
//!
//! Layout offsets are bit-exact and compatibility-critical: OEM name at
//! 3..8, bytes-per-sector (u16 LE) at 11..12, sectors-per-cluster (u8) at
//! 13, reserved-sector-count (u16 LE) at 14..15, number-of-FATs (u8) at
//! 16, root-entry-count (u16 LE, unused on FAT32) at 17..18, FAT size in
//! sectors (u32 LE) at 36..39, root cluster (u32 LE) at 44..47, volume
//! label (11 bytes) at 71..81.

use crate::device::ImageFile;
use crate::error::MfsError;

pub const BPB_OFFSET: u64 = 0;
pub const BPB_SIZE: usize = 90;

#[derive(Debug, Clone, Copy)]
pub struct Geometry {
    pub bytes_per_sector: u16,
    pub sectors_per_cluster: u8,
    pub reserved_sector_count: u16,
    pub num_fats: u8,
    pub root_entry_count: u16,
    pub fat_size32: u32,
    pub root_cluster: u32,
    pub volume_label: [u8; 11],
}

impl Geometry {
    /// Decodes a `Geometry` from the raw boot-sector bytes (at least
    /// [`BPB_SIZE`] bytes, read from [`BPB_OFFSET`] by the caller).
    pub fn decode(sector: &[u8]) -> Self {
        let bytes_per_sector = u16::from_le_bytes([sector[11], sector[12]]);
        let sectors_per_cluster = sector[13];
        let reserved_sector_count = u16::from_le_bytes([sector[14], sector[15]]);
        let num_fats = sector[16];
        let root_entry_count = u16::from_le_bytes([sector[17], sector[18]]);
        let fat_size32 = u32::from_le_bytes([sector[36], sector[37], sector[38], sector[39]]);
        let root_cluster = u32::from_le_bytes([sector[44], sector[45], sector[46], sector[47]]);
        let mut volume_label = [0u8; 11];
        volume_label.copy_from_slice(&sector[71..82]);

        Self {
            bytes_per_sector,
            sectors_per_cluster,
            reserved_sector_count,
            num_fats,
            root_entry_count,
            fat_size32,
            root_cluster,
            volume_label,
        }
    }

    /// Reads and decodes the BPB from an open image.
    pub fn read(image: &ImageFile) -> Result<Self, MfsError> {
        let mut buf = [0u8; BPB_SIZE];
        image.read_at(BPB_OFFSET, &mut buf)?;
        Ok(Self::decode(&buf))
    }

    /// Cluster 0 as a cluster argument means "root"; callers substitute
    /// [`Geometry::root_cluster`] before calling this.
    ///
    /// `offset(N) = (N - 2) * S + R * S + F * Z * S`, where S is
    /// `bytes_per_sector`, R is `reserved_sector_count`, F is `num_fats`
    /// and Z is `fat_size32`. Yields the first byte of the data region
    /// occupied by cluster N.
    pub fn lba_to_offset(&self, cluster: u32) -> u64 {
        let s = self.bytes_per_sector as u64;
        let r = self.reserved_sector_count as u64;
        let f = self.num_fats as u64;
        let z = self.fat_size32 as u64;
        (cluster as u64 - 2) * s + r * s + f * z * s
    }

    /// `fatAddr(N) = reservedSectorCount * bytesPerSector + N * 4`.
    pub fn fat_address(&self, cluster: u32) -> u64 {
        self.reserved_sector_count as u64 * self.bytes_per_sector as u64 + cluster as u64 * 4
    }

    /// Substitutes the root cluster for a cluster argument of 0.
    pub fn resolve_cluster(&self, cluster: u32) -> u32 {
        if cluster == 0 {
            self.root_cluster
        } else {
            cluster
        }
    }

    /// Renders the fields `info` reports, each as hex and decimal.
    pub fn info(&self) -> String {
        format!(
            "BPB_BytsPerSec: {:#06x} ({})\n\
             BPB_SecPerClus: {:#04x} ({})\n\
             BPB_RsvdSecCnt: {:#06x} ({})\n\
             BPB_NumFATS: {:#04x} ({})\n\
             BPB_FATSz32: {:#010x} ({})",
            self.bytes_per_sector,
            self.bytes_per_sector,
            self.sectors_per_cluster,
            self.sectors_per_cluster,
            self.reserved_sector_count,
            self.reserved_sector_count,
            self.num_fats,
            self.num_fats,
            self.fat_size32,
            self.fat_size32,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_sector() -> [u8; BPB_SIZE] {
        let mut s = [0u8; BPB_SIZE];
        s[11..13].copy_from_slice(&512u16.to_le_bytes());
        s[13] = 1; // sectors per cluster
        s[14..16].copy_from_slice(&32u16.to_le_bytes());
        s[16] = 2; // num fats
        s[36..40].copy_from_slice(&128u32.to_le_bytes());
        s[44..48].copy_from_slice(&2u32.to_le_bytes());
        s
    }

    #[test]
    fn decodes_fields_at_documented_offsets() {
        let geom = Geometry::decode(&sample_sector());
        assert_eq!(geom.bytes_per_sector, 512);
        assert_eq!(geom.sectors_per_cluster, 1);
        assert_eq!(geom.reserved_sector_count, 32);
        assert_eq!(geom.num_fats, 2);
        assert_eq!(geom.fat_size32, 128);
        assert_eq!(geom.root_cluster, 2);
    }

    #[test]
    fn lba_to_offset_matches_formula() {
        let geom = Geometry::decode(&sample_sector());
        let s = geom.bytes_per_sector as u64;
        let r = geom.reserved_sector_count as u64;
        let f = geom.num_fats as u64;
        let z = geom.fat_size32 as u64;
        for n in 2u32..10 {
            let expected = (n as u64 - 2) * s + r * s + f * z * s;
            assert_eq!(geom.lba_to_offset(n), expected);
        }
    }

    #[test]
    fn fat_address_matches_formula() {
        let geom = Geometry::decode(&sample_sector());
        assert_eq!(geom.fat_address(5), 32 * 512 + 5 * 4);
    }

    #[test]
    fn resolve_cluster_substitutes_root() {
        let geom = Geometry::decode(&sample_sector());
        assert_eq!(geom.resolve_cluster(0), geom.root_cluster);
        assert_eq!(geom.resolve_cluster(7), 7);
    }
}
