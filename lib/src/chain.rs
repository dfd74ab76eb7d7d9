use crate::hash::{sha256d, to_hex_rev, Hash256};
use crate::sorted_map::SortedVec;
use crate::Error;
use log::info;
use std::convert::TryInto;
use std::io::{Read, Write};

/// One header in the selector's working set
#[derive(Debug, Clone)]
pub struct ChainNode {
    /// Hash of the previous block
    pub prev: Hash256,
    /// The compact difficulty target, used as the work contribution
    pub bits: u32,
    cached_work: u64,
}

/// An unordered set of block headers from which the heaviest chain is
/// selected.
///
/// Work is accumulated as the raw `bits` field, an approximation kept for
/// compatibility with the rest of the pipeline (it over-values low
/// difficulty blocks relative to the true expected-hashes metric).
pub struct HeaderSet {
    map: SortedVec<Hash256, ChainNode>,
}

impl HeaderSet {
    /// Reads 80 byte headers from `input` until EOF; a trailing partial
    /// record is discarded
    pub fn read_from<R: Read>(mut input: R) -> Result<Self, Error> {
        let mut map = SortedVec::new();
        let mut header = [0u8; 80];

        loop {
            if !read_exact_or_eof(&mut input, &mut header)? {
                break;
            }
            let hash = sha256d(&header);
            let prev: Hash256 = header[4..36].try_into().unwrap();
            let bits = u32::from_le_bytes(header[72..76].try_into().unwrap());
            map.push(
                hash,
                ChainNode {
                    prev,
                    bits,
                    cached_work: 0,
                },
            );
        }

        info!("read {} headers", map.len());
        map.sort();
        Ok(HeaderSet { map })
    }

    /// Number of headers in the set
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// True when no header was read
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Hashes of the blocks no other block names as previous
    pub fn tips(&self) -> Vec<Hash256> {
        let mut has_children = SortedVec::with_capacity(self.map.len());
        for (_, node) in self.map.iter() {
            // a parent outside the set does not make its child a non-tip
            if self.map.contains(&node.prev) {
                has_children.push(node.prev, ());
            }
        }
        has_children.sort();

        self.map
            .iter()
            .filter(|(hash, _)| !has_children.contains(hash))
            .map(|(hash, _)| *hash)
            .collect()
    }

    /// Total chain work from genesis through the block at `index`, walking
    /// `prev` links until a cached ancestor or a block outside the set
    fn determine_work(&self, index: usize) -> u64 {
        let mut total = u64::from(self.map.value(index).bits);
        let mut cursor = self.map.value(index).prev;

        while let Some(node) = self.map.get(&cursor) {
            if node.cached_work != 0 {
                total += node.cached_work;
                break;
            }
            total += u64::from(node.bits);
            cursor = node.prev;
        }

        total
    }

    /// Selects the chain with the greatest cumulative work and returns its
    /// hashes in genesis-to-tip order. Each visited block caches its total
    /// chain work, so the quadratic walk collapses to near linear.
    pub fn best_chain(&mut self) -> Vec<Hash256> {
        let mut best: Option<usize> = None;
        let mut best_work = 0u64;

        for index in 0..self.map.len() {
            let work = self.determine_work(index);
            self.map.value_mut(index).cached_work = work;

            // ties resolve to the last candidate in map order
            if work >= best_work {
                best = Some(index);
                best_work = work;
            }
        }

        let best = match best {
            Some(index) => index,
            None => return Vec::new(),
        };

        let mut chain = vec![*self.map.key(best)];
        let mut cursor = self.map.value(best).prev;
        while let Some(node) = self.map.get(&cursor) {
            chain.push(cursor);
            cursor = node.prev;
        }
        chain.reverse();

        info!("best chain height: {}", chain.len() - 1);
        info!("- genesis: {}", to_hex_rev(&chain[0]));
        info!("- tip: {}", to_hex_rev(chain.last().unwrap()));
        chain
    }

    /// Writes `hash(32) | height(4 LE)` per chain entry, sorted by hash
    pub fn write_chain<W: Write>(chain: &[Hash256], mut out: W) -> Result<(), Error> {
        let mut records = SortedVec::with_capacity(chain.len());
        for (height, hash) in chain.iter().enumerate() {
            records.push(*hash, height as u32);
        }
        records.sort();

        let mut buffer = [0u8; 36];
        for (hash, height) in records.iter() {
            buffer[..32].copy_from_slice(hash);
            buffer[32..].copy_from_slice(&height.to_le_bytes());
            out.write_all(&buffer)?;
        }
        Ok(())
    }
}

fn read_exact_or_eof<R: Read>(input: &mut R, buffer: &mut [u8]) -> std::io::Result<bool> {
    let mut filled = 0;
    while filled < buffer.len() {
        match input.read(&mut buffer[filled..]) {
            Ok(0) => return Ok(false),
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(true)
}

#[cfg(test)]
mod test {
    use super::*;
    use test_log::test;

    /// Builds a header with the given previous hash, unique per `salt`
    fn header(prev: &Hash256, salt: u8) -> [u8; 80] {
        let mut header = [0u8; 80];
        header[..4].copy_from_slice(&1i32.to_le_bytes());
        header[4..36].copy_from_slice(prev);
        header[36] = salt;
        header[72..76].copy_from_slice(&0x1d00ffffu32.to_le_bytes());
        header
    }

    /// The fork fixture: G -> A -> B and G -> A -> C -> D, equal bits
    fn fork_headers() -> (Vec<u8>, Vec<Hash256>) {
        let genesis = header(&[0u8; 32], 0);
        let a = header(&sha256d(&genesis), 1);
        let b = header(&sha256d(&a), 2);
        let c = header(&sha256d(&a), 3);
        let d = header(&sha256d(&c), 4);

        let mut stream = Vec::new();
        // deliberately unordered
        for h in [&d, &b, &genesis, &c, &a] {
            stream.extend_from_slice(&h[..]);
        }
        let expected = vec![
            sha256d(&genesis),
            sha256d(&a),
            sha256d(&c),
            sha256d(&d),
        ];
        (stream, expected)
    }

    #[test]
    fn test_fork_selection() {
        let (stream, expected) = fork_headers();
        let mut headers = HeaderSet::read_from(&stream[..]).unwrap();
        assert_eq!(headers.len(), 5);
        assert_eq!(headers.tips().len(), 2);

        let chain = headers.best_chain();
        assert_eq!(chain, expected);
    }

    #[test]
    fn test_chain_is_a_path() {
        let (stream, _) = fork_headers();
        let mut headers = HeaderSet::read_from(&stream[..]).unwrap();
        let chain = headers.best_chain();

        for pair in chain.windows(2) {
            let node = headers.map.get(&pair[1]).unwrap();
            assert_eq!(node.prev, pair[0]);
        }
        // the root's parent is absent from the input
        let root = headers.map.get(&chain[0]).unwrap();
        assert!(headers.map.get(&root.prev).is_none());
    }

    #[test]
    fn test_cached_work_is_total() {
        let (stream, expected) = fork_headers();
        let mut headers = HeaderSet::read_from(&stream[..]).unwrap();
        headers.best_chain();

        let bits = u64::from(0x1d00ffffu32);
        // the tip of the long chain accumulated four blocks of work
        let tip = headers.map.get(&expected[3]).unwrap();
        assert_eq!(tip.cached_work, 4 * bits);
        // and the shared ancestor exactly two
        let a = headers.map.get(&expected[1]).unwrap();
        assert_eq!(a.cached_work, 2 * bits);
    }

    #[test]
    fn test_write_chain_sorted_by_hash() {
        let (stream, _) = fork_headers();
        let mut headers = HeaderSet::read_from(&stream[..]).unwrap();
        let chain = headers.best_chain();

        let mut out = Vec::new();
        HeaderSet::write_chain(&chain, &mut out).unwrap();
        assert_eq!(out.len(), 4 * 36);

        let records: Vec<&[u8]> = out.chunks_exact(36).collect();
        for pair in records.windows(2) {
            assert!(pair[0][..32] <= pair[1][..32]);
        }

        // every chain member appears with its height
        for (height, hash) in chain.iter().enumerate() {
            let found = records
                .iter()
                .find(|record| &record[..32] == &hash[..])
                .unwrap();
            assert_eq!(
                u32::from_le_bytes(found[32..].try_into().unwrap()),
                height as u32
            );
        }
    }

    #[test]
    fn test_partial_trailing_header_discarded() {
        let (mut stream, _) = fork_headers();
        stream.extend_from_slice(&[0u8; 40]);
        let headers = HeaderSet::read_from(&stream[..]).unwrap();
        assert_eq!(headers.len(), 5);
    }

    #[test]
    fn test_empty_input() {
        let mut headers = HeaderSet::read_from(&[][..]).unwrap();
        assert!(headers.is_empty());
        assert!(headers.best_chain().is_empty());
        assert!(headers.tips().is_empty());
    }
}
