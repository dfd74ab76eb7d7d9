use crate::hash::Hash256;
use crate::sorted_map::SortedVec;
use crate::Error;
use log::info;
use std::convert::TryInto;
use std::fs;
use std::path::Path;

/// Optional gate over block hashes.
///
/// When empty every block passes and no height is known; when loaded only
/// listed blocks are dispatched and the height recorded next to each hash is
/// made available to the transform.
pub struct Whitelist {
    map: SortedVec<Hash256, u32>,
}

impl Whitelist {
    /// A whitelist passing every block
    pub fn empty() -> Self {
        Whitelist {
            map: SortedVec::new(),
        }
    }

    /// Loads a whitelist image: 36 byte records of `hash(32) | height(4 LE)`,
    /// already sorted by hash. Size or order violations abort.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let bytes = fs::read(path)?;
        assert_eq!(bytes.len() % 36, 0, "whitelist must be 36 byte records");

        let mut map = SortedVec::with_capacity(bytes.len() / 36);
        for record in bytes.chunks_exact(36) {
            let hash: Hash256 = record[..32].try_into().unwrap();
            let height = u32::from_le_bytes(record[32..36].try_into().unwrap());
            map.push(hash, height);
        }
        map.assert_sorted();
        assert!(!map.is_empty(), "whitelist is empty");

        info!("whitelisted {} hashes", map.len());
        Ok(Whitelist { map })
    }

    /// True when every block passes
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Number of whitelisted hashes
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// The height recorded for `hash`, if whitelisted
    pub fn height(&self, hash: &Hash256) -> Option<u32> {
        self.map.get(hash).copied()
    }
}

/// Loads a plain concatenation of 32 byte hashes (e.g. a best chain dump in
/// height order), mapping each hash to its record position.
pub fn load_hash_heights<P: AsRef<Path>>(path: P) -> Result<SortedVec<Hash256, u32>, Error> {
    let bytes = fs::read(path)?;
    let mut map = SortedVec::with_capacity(bytes.len() / 32);
    for (height, record) in bytes.chunks_exact(32).enumerate() {
        let hash: Hash256 = record.try_into().unwrap();
        map.push(hash, height as u32);
    }
    map.sort();
    Ok(map)
}
