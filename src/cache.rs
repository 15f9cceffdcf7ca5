//! On-disk cache of pruning tables.
//!
//! One file per puzzle family:
//!
//! ```text
//! magic "SCRT" | version u8 | family len u16 | family | fingerprint u32
//! | table count u16 | (len u32 | bytes)* | crc32c u32
//! ```
//!
//! The fingerprint is a CRC-32C over the family's move tables, so a file
//! written by a build with different move semantics is rejected as stale.

use crate::error::{CacheError, Result};
use crate::solver::PruningTable;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

const MAGIC: &[u8; 4] = b"SCRT";
const VERSION: u8 = 1;

/// Numbers temp files written by this process.
static WRITES: AtomicUsize = AtomicUsize::new(0);

#[derive(Debug, Clone)]
pub struct TableCache {
    dir: PathBuf,
}

#[inline]
fn read_u16_le(bytes: &[u8]) -> Option<u16> {
    Some(u16::from_le_bytes(bytes.get(..2)?.try_into().ok()?))
}

#[inline]
fn read_u32_le(bytes: &[u8]) -> Option<u32> {
    Some(u32::from_le_bytes(bytes.get(..4)?.try_into().ok()?))
}

pub fn encode(family: &str, fingerprint: u32, tables: &[&[u8]]) -> Vec<u8> {
    let payload: usize = tables.iter().map(|t| 4 + t.len()).sum();
    let mut buf = Vec::with_capacity(4 + 1 + 2 + family.len() + 4 + 2 + payload + 4);

    buf.extend_from_slice(MAGIC);
    buf.push(VERSION);
    buf.extend_from_slice(&(family.len() as u16).to_le_bytes());
    buf.extend_from_slice(family.as_bytes());
    buf.extend_from_slice(&fingerprint.to_le_bytes());
    buf.extend_from_slice(&(tables.len() as u16).to_le_bytes());
    for table in tables {
        buf.extend_from_slice(&(table.len() as u32).to_le_bytes());
        buf.extend_from_slice(table);
    }

    let checksum = crc32c::crc32c(&buf);
    buf.extend_from_slice(&checksum.to_le_bytes());
    buf
}

pub fn decode(bytes: &[u8], family: &str, fingerprint: u32) -> Result<Vec<Vec<u8>>, CacheError> {
    if bytes.len() < 4 + 1 + 2 + 4 + 2 + 4 {
        return Err(CacheError::Malformed);
    }

    // Checksum first so field reads never see torn data.
    let (content, trailer) = bytes.split_at(bytes.len() - 4);
    let file_crc = read_u32_le(trailer).ok_or(CacheError::Malformed)?;
    if file_crc != crc32c::crc32c(content) {
        return Err(CacheError::Checksum);
    }

    if &content[..4] != MAGIC || content[4] != VERSION {
        return Err(CacheError::MagicOrVersion);
    }

    let mut off = 5;
    let family_len = read_u16_le(&content[off..]).ok_or(CacheError::Malformed)? as usize;
    off += 2;
    let found_family = content
        .get(off..off + family_len)
        .ok_or(CacheError::Malformed)?;
    off += family_len;
    let found = read_u32_le(content.get(off..).ok_or(CacheError::Malformed)?)
        .ok_or(CacheError::Malformed)?;
    off += 4;
    if found_family != family.as_bytes() || found != fingerprint {
        return Err(CacheError::Stale {
            family: family.to_string(),
            found,
            expected: fingerprint,
        });
    }

    let count = read_u16_le(content.get(off..).ok_or(CacheError::Malformed)?)
        .ok_or(CacheError::Malformed)? as usize;
    off += 2;

    let mut tables = Vec::with_capacity(count);
    for _ in 0..count {
        let len = read_u32_le(content.get(off..).ok_or(CacheError::Malformed)?)
            .ok_or(CacheError::Malformed)? as usize;
        off += 4;
        let table = content.get(off..off + len).ok_or(CacheError::Malformed)?;
        tables.push(table.to_vec());
        off += len;
    }
    if off != content.len() {
        return Err(CacheError::Malformed);
    }
    Ok(tables)
}

impl TableCache {
    pub fn new(dir: impl Into<PathBuf>) -> TableCache {
        TableCache { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self, family: &str) -> PathBuf {
        self.dir.join(format!("{}.tables", family))
    }

    /// `Ok(None)` when nothing has been cached for `family` yet.
    pub fn load(&self, family: &str, fingerprint: u32) -> Result<Option<Vec<Vec<u8>>>, CacheError> {
        let path = self.path(family);
        if !path.exists() {
            return Ok(None);
        }
        let bytes = fs::read(&path)?;
        decode(&bytes, family, fingerprint).map(Some)
    }

    pub fn store(&self, family: &str, fingerprint: u32, tables: &[&[u8]]) -> Result<(), CacheError> {
        fs::create_dir_all(&self.dir)?;
        let tmp = self.temp_path(family);
        fs::write(&tmp, encode(family, fingerprint, tables))?;
        if let Err(e) = fs::rename(&tmp, self.path(family)) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        Ok(())
    }

    /// A name no other writer, in this process or another, is using.
    fn temp_path(&self, family: &str) -> PathBuf {
        let n = WRITES.fetch_add(1, Ordering::Relaxed);
        self.dir
            .join(format!("{}.tables.{}-{}.tmp", family, std::process::id(), n))
    }
}

/// Reads `family`'s pruning tables from `cache`, or builds them and writes
/// them back. Cache trouble is logged and never fatal.
pub(crate) fn load_or_build<const N: usize>(
    cache: Option<&TableCache>,
    family: &str,
    fingerprint: u32,
    shapes: [(&str, usize); N],
    build: impl FnOnce() -> crate::Result<[PruningTable; N]>,
) -> crate::Result<[PruningTable; N]> {
    let cache = match cache {
        Some(cache) => cache,
        None => return build(),
    };

    match cache.load(family, fingerprint) {
        Ok(Some(blobs)) => match from_blobs(blobs, shapes) {
            Ok(tables) => {
                log::info!("{}: loaded pruning tables from {:?}", family, cache.path(family));
                return Ok(tables);
            }
            Err(e) => log::warn!("{}: discarding cached tables: {}", family, e),
        },
        Ok(None) => log::info!("{}: no cached tables, building", family),
        Err(e) => log::warn!("{}: discarding cached tables: {}", family, e),
    }

    let tables = build()?;
    let bytes: Vec<&[u8]> = tables.iter().map(|t| t.as_bytes()).collect();
    match cache.store(family, fingerprint, &bytes) {
        Ok(()) => log::info!("{}: wrote pruning tables to {:?}", family, cache.path(family)),
        Err(e) => log::warn!("{}: could not write table cache: {}", family, e),
    }
    Ok(tables)
}

fn from_blobs<const N: usize>(
    blobs: Vec<Vec<u8>>,
    shapes: [(&str, usize); N],
) -> Result<[PruningTable; N], CacheError> {
    if blobs.len() != N {
        return Err(CacheError::Malformed);
    }
    let tables = blobs
        .into_iter()
        .zip(shapes)
        .map(|(bytes, (name, size))| PruningTable::from_bytes(name, size, bytes))
        .collect::<Result<Vec<_>, _>>()?;
    tables.try_into().map_err(|_| CacheError::Malformed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ring(coord: usize, out: &mut Vec<usize>) {
        out.push((coord + 1) % 6);
        out.push((coord + 5) % 6);
    }

    fn ring_tables() -> crate::Result<[PruningTable; 1]> {
        Ok([PruningTable::build("ring", 6, [0], ring)?])
    }

    #[test]
    fn encode_decode() {
        let bytes = encode("3x3x3", 7, &[&[1, 2, 3], &[]]);
        let tables = decode(&bytes, "3x3x3", 7).unwrap();
        assert_eq!(tables, vec![vec![1, 2, 3], vec![]]);
    }

    #[test]
    fn flipped_byte_fails_checksum() {
        let mut bytes = encode("3x3x3", 7, &[&[1, 2, 3]]);
        bytes[12] ^= 0x40;
        assert!(matches!(
            decode(&bytes, "3x3x3", 7),
            Err(CacheError::Checksum)
        ));
    }

    #[test]
    fn other_fingerprint_is_stale() {
        let bytes = encode("sq1", 1, &[&[0]]);
        assert!(matches!(
            decode(&bytes, "sq1", 2),
            Err(CacheError::Stale {
                found: 1,
                expected: 2,
                ..
            })
        ));
        assert!(matches!(
            decode(&bytes, "2x2x2", 1),
            Err(CacheError::Stale { .. })
        ));
    }

    #[test]
    fn truncated_is_malformed() {
        assert!(matches!(decode(b"SCRT", "sq1", 0), Err(CacheError::Malformed)));
    }

    #[test]
    fn store_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let cache = TableCache::new(dir.path());
        assert!(cache.load("ring", 3).unwrap().is_none());

        let built = load_or_build(Some(&cache), "ring", 3, [("ring", 6)], ring_tables).unwrap();
        assert!(cache.path("ring").exists());

        let loaded = load_or_build(Some(&cache), "ring", 3, [("ring", 6)], || {
            panic!("tables should come from the cache")
        })
        .unwrap();
        assert_eq!(loaded[0].as_bytes(), built[0].as_bytes());
    }

    #[test]
    fn writers_get_their_own_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let cache = TableCache::new(dir.path());
        assert_ne!(cache.temp_path("ring"), cache.temp_path("ring"));

        std::thread::scope(|s| {
            for i in 0..8u8 {
                let cache = &cache;
                s.spawn(move || cache.store("ring", 5, &[&[i; 64]]).unwrap());
            }
        });
        assert_eq!(cache.load("ring", 5).unwrap().map(|t| t.len()), Some(1));
        let leftovers = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension() == Some(std::ffi::OsStr::new("tmp")))
            .count();
        assert_eq!(leftovers, 0);
    }

    #[test]
    fn stale_file_is_rebuilt_and_rewritten() {
        let dir = tempfile::tempdir().unwrap();
        let cache = TableCache::new(dir.path());
        cache.store("ring", 1, &[&[9, 9]]).unwrap();

        let tables = load_or_build(Some(&cache), "ring", 2, [("ring", 6)], ring_tables).unwrap();
        assert_eq!(tables[0].distance(3), 3);
        assert!(cache.load("ring", 2).unwrap().is_some());
    }

    #[test]
    fn corrupt_file_is_rebuilt() {
        let dir = tempfile::tempdir().unwrap();
        let cache = TableCache::new(dir.path());
        fs::write(cache.path("ring"), b"garbage that is long enough").unwrap();

        let tables = load_or_build(Some(&cache), "ring", 2, [("ring", 6)], ring_tables).unwrap();
        assert_eq!(tables[0].distance(0), 0);
    }
}
