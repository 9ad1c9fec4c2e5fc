//! File Reader — whole-file extraction (`get`) and windowed reads
//! (`read`), following a cluster chain.
//!
//! Both operations step by *sector* while chaining by *cluster* via the
//! FAT Walker. This is only correct when sectors-per-cluster == 1;
//! preserved here as documented behavior rather than corrected.

use std::fs::File;
use std::io::Write;

use crate::bpb::Geometry;
use crate::device::ImageFile;
use crate::dir::DirectoryCache;
use crate::error::MfsError;
use crate::fat::{next_cluster, NextCluster};

fn cluster_value(step: NextCluster) -> u32 {
    match step {
        NextCluster::Cluster(c) => c,
        // No bounds check against end-of-chain in `get`/`read`: keep
        // stepping past the documented end with a sentinel cluster
        // number rather than erroring.
        NextCluster::EndOfChain => u32::MAX,
    }
}

/// Resolves `query`, creates/truncates a host file named identically to
/// `query`, and streams the whole file to it one sector per hop.
pub fn get(
    cache: &DirectoryCache,
    image: &ImageFile,
    geometry: &Geometry,
    query: &str,
) -> Result<(), MfsError> {
    let entry = cache.stat(query)?;
    let mut out = File::create(query)?;

    let sector_size = geometry.bytes_per_sector as u64;
    let mut remaining = entry.file_size as u64;
    let mut cluster = geometry.resolve_cluster(entry.first_cluster_low as u32);

    while remaining > sector_size {
        let mut buf = vec![0u8; sector_size as usize];
        image.read_at(geometry.lba_to_offset(cluster), &mut buf)?;
        out.write_all(&buf)?;
        remaining -= sector_size;
        cluster = cluster_value(next_cluster(image, geometry, cluster)?);
    }

    let mut buf = vec![0u8; remaining as usize];
    image.read_at(geometry.lba_to_offset(cluster), &mut buf)?;
    out.write_all(&buf)?;
    Ok(())
}

/// Resolves `query`, skips whole sectors to reach `offset`, then emits
/// exactly `length` bytes to `out`, crossing sector boundaries by
/// advancing the cluster chain. No bound check against `fileSize`.
/// Terminates with a newline.
pub fn read(
    cache: &DirectoryCache,
    image: &ImageFile,
    geometry: &Geometry,
    query: &str,
    offset: u64,
    length: u64,
    out: &mut impl Write,
) -> Result<(), MfsError> {
    let entry = cache.stat(query)?;
    let sector_size = geometry.bytes_per_sector as u64;

    let mut cluster = geometry.resolve_cluster(entry.first_cluster_low as u32);
    let mut offset = offset;
    while offset >= sector_size {
        offset -= sector_size;
        cluster = cluster_value(next_cluster(image, geometry, cluster)?);
    }

    let mut pos_in_sector = offset;
    for _ in 0..length {
        let addr = geometry.lba_to_offset(cluster) + pos_in_sector;
        let mut byte = [0u8; 1];
        image.read_at(addr, &mut byte)?;
        out.write_all(&byte)?;

        pos_in_sector += 1;
        if pos_in_sector == sector_size {
            cluster = cluster_value(next_cluster(image, geometry, cluster)?);
            pos_in_sector = 0;
        }
    }
    out.write_all(b"\n")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{RawDirEntry, ATTR_ARCHIVE, DIR_ENTRY_SIZE};
    use crate::test_support::make_image;

    fn geom() -> Geometry {
        Geometry {
            bytes_per_sector: 512,
            sectors_per_cluster: 1,
            reserved_sector_count: 1,
            num_fats: 1,
            root_entry_count: 0,
            fat_size32: 1,
            root_cluster: 2,
            volume_label: [0x20; 11],
        }
    }

    /// Builds a two-cluster file `FILE.BIN` (clusters 3 and 4) with
    /// distinguishable byte patterns per cluster, plus its root dir entry.
    fn two_cluster_image() -> (ImageFile, Geometry) {
        let geometry = geom();
        let sector = geometry.bytes_per_sector as usize;
        let root_offset = geometry.lba_to_offset(geometry.root_cluster) as usize;
        let cluster3_offset = geometry.lba_to_offset(3) as usize;
        let cluster4_offset = geometry.lba_to_offset(4) as usize;
        let fat_base = geometry.reserved_sector_count as usize * sector;

        let total_len = cluster4_offset + sector;
        let mut bytes = vec![0u8; total_len];

        // FAT: cluster 3 -> 4 -> end of chain (legacy 16-bit entries).
        bytes[fat_base + 3 * 4..fat_base + 3 * 4 + 2].copy_from_slice(&4u16.to_le_bytes());
        bytes[fat_base + 4 * 4..fat_base + 4 * 4 + 2].copy_from_slice(&0xFFF8u16.to_le_bytes());

        for b in bytes[cluster3_offset..cluster3_offset + sector].iter_mut() {
            *b = 0xAA;
        }
        for (i, b) in bytes[cluster4_offset..cluster4_offset + sector].iter_mut().enumerate() {
            *b = i as u8;
        }

        let entry = RawDirEntry {
            name: *b"FILE    BIN",
            attr: ATTR_ARCHIVE,
            first_cluster_high: 0,
            first_cluster_low: 3,
            file_size: (sector * 2) as u32,
        };
        let mut chunk = [0u8; DIR_ENTRY_SIZE];
        entry.encode(&mut chunk);
        bytes[root_offset..root_offset + DIR_ENTRY_SIZE].copy_from_slice(&chunk);

        (make_image(&bytes), geometry)
    }

    #[test]
    fn read_crosses_sector_boundary_into_second_cluster() {
        let (image, geometry) = two_cluster_image();
        let cache = DirectoryCache::load(&image, &geometry, 0).unwrap();

        let mut out = Vec::new();
        read(&cache, &image, &geometry, "FILE.BIN", 512, 4, &mut out).unwrap();
        assert_eq!(out, vec![0u8, 1, 2, 3, b'\n']);
    }

    #[test]
    fn get_writes_whole_file_to_host_path() {
        let (image, geometry) = two_cluster_image();
        let cache = DirectoryCache::load(&image, &geometry, 0).unwrap();

        let dir = std::env::temp_dir().join(format!("mfs-get-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let prev = std::env::current_dir().unwrap();
        std::env::set_current_dir(&dir).unwrap();

        get(&cache, &image, &geometry, "FILE.BIN").unwrap();
        let written = std::fs::read("FILE.BIN").unwrap();

        std::env::set_current_dir(prev).unwrap();

        assert_eq!(written.len(), 1024);
        assert!(written[0..512].iter().all(|&b| b == 0xAA));
        assert_eq!(written[512], 0);
        assert_eq!(written[513], 1);
    }

    #[test]
    fn get_on_zero_length_entry_does_not_underflow_root_cluster() {
        let geometry = geom();
        let root_offset = geometry.lba_to_offset(geometry.root_cluster) as usize;
        let sector = geometry.bytes_per_sector as usize;
        let mut bytes = vec![0u8; root_offset + sector];

        let entry = RawDirEntry {
            name: *b"EMPTY   BIN",
            attr: ATTR_ARCHIVE,
            first_cluster_high: 0,
            first_cluster_low: 0,
            file_size: 0,
        };
        let mut chunk = [0u8; DIR_ENTRY_SIZE];
        entry.encode(&mut chunk);
        bytes[root_offset..root_offset + DIR_ENTRY_SIZE].copy_from_slice(&chunk);

        let image = make_image(&bytes);
        let cache = DirectoryCache::load(&image, &geometry, 0).unwrap();

        let dir = std::env::temp_dir().join(format!("mfs-get-zero-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let prev = std::env::current_dir().unwrap();
        std::env::set_current_dir(&dir).unwrap();

        let result = get(&cache, &image, &geometry, "EMPTY.BIN");

        std::env::set_current_dir(prev).unwrap();

        assert!(result.is_ok());
    }
}
