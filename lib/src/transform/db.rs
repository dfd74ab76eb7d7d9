use crate::block::Block;
use crate::bytes::put_u32_be;
use crate::hash::{sha256, Hash256};
use crate::transform::{BlockTag, Transform};
use crate::Error;
use log::info;
use rocksdb::{Options, WriteBatch, DB};
use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};

fn reversed(hash: &[u8]) -> Hash256 {
    let mut out = [0u8; 32];
    for (i, byte) in hash.iter().rev().enumerate() {
        out[i] = *byte;
    }
    out
}

/// Writes the five key-value index shapes in a single batch per block.
///
/// Key layouts (`|` concatenates, `\` separates key from value, hashes are
/// byte-reversed to big-endian so they sort as displayed):
///
/// - `0x00 \ blockHashBE(32)` — the running tip
/// - `0x01 | sha256(script)(32) | heightBE(4) | txHashBE(32) | vout(4) \ ∅`
/// - `0x02 | prevTxHashBE(32) | prevVout(4) \ txHashBE(32) | vin(4)`
/// - `0x03 | txHashBE(32) \ height(4)`
/// - `0x04 | txHashBE(32) | vout(4) \ value(8)`
///
/// The height inside script keys is big-endian so entries of one script sort
/// by height.
pub struct Indexd {
    db: DB,
    max_height: AtomicU32,
}

impl Indexd {
    /// Opens (or creates) the database at `path`
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let mut options = Options::default();
        options.create_if_missing(true);
        let db = DB::open(&options, path.as_ref())?;

        info!("opened index db at {:?}", path.as_ref());
        Ok(Indexd {
            db,
            max_height: AtomicU32::new(0),
        })
    }

    /// Raw lookup, exposed for inspection
    pub fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, Error> {
        Ok(self.db.get(key)?)
    }
}

impl Transform for Indexd {
    fn consume(&self, block: &Block<'_>, tag: &BlockTag) {
        let height = tag.height.expect("indexd requires whitelist heights");
        let mut batch = WriteBatch::default();

        if height >= self.max_height.fetch_max(height, Ordering::SeqCst) {
            batch.put([0x00], reversed(&tag.hash));
        }

        for tx in block.transactions() {
            let tx_hash_be = reversed(&tx.hash());

            let mut tx_key = [0u8; 33];
            tx_key[0] = 0x03;
            tx_key[1..].copy_from_slice(&tx_hash_be);
            batch.put(tx_key, height.to_le_bytes());

            for (vin, input) in tx.inputs.iter().enumerate() {
                let mut spent_key = [0u8; 37];
                spent_key[0] = 0x02;
                spent_key[1..33].copy_from_slice(&reversed(input.prev_hash));
                spent_key[33..].copy_from_slice(&input.vout.to_le_bytes());

                let mut spent_value = [0u8; 36];
                spent_value[..32].copy_from_slice(&tx_hash_be);
                spent_value[32..].copy_from_slice(&(vin as u32).to_le_bytes());
                batch.put(spent_key, spent_value);
            }

            for (vout, output) in tx.outputs.iter().enumerate() {
                let vout = vout as u32;

                let mut script_key = [0u8; 73];
                script_key[0] = 0x01;
                script_key[1..33].copy_from_slice(&sha256(output.script));
                put_u32_be(&mut script_key[33..37], height);
                script_key[37..69].copy_from_slice(&tx_hash_be);
                script_key[69..].copy_from_slice(&vout.to_le_bytes());
                batch.put(script_key, [0u8; 0]);

                let mut txo_key = [0u8; 37];
                txo_key[0] = 0x04;
                txo_key[1..33].copy_from_slice(&tx_hash_be);
                txo_key[33..].copy_from_slice(&vout.to_le_bytes());
                batch.put(txo_key, output.value.to_le_bytes());
            }
        }

        self.db.write(batch).expect("index db write failed");
    }

    fn finalize(&self) {
        info!(
            "index db written up to height {}",
            self.max_height.load(Ordering::SeqCst)
        );
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::fixtures::{genesis_block, GENESIS_TXID};
    use test_log::test;

    #[test]
    fn test_genesis_batch() {
        let dir = tempfile::TempDir::new().unwrap();
        let indexd = Indexd::new(dir.path()).unwrap();

        let block = genesis_block();
        let tag = BlockTag {
            hash: block.hash(),
            height: Some(0),
        };
        indexd.consume(&block, &tag);

        // tip
        let tip = indexd.get(&[0x00]).unwrap().unwrap();
        assert_eq!(tip, reversed(&block.hash()));

        // tx entry
        let mut tx_key = vec![0x03];
        tx_key.extend_from_slice(&reversed(&GENESIS_TXID));
        let height = indexd.get(&tx_key).unwrap().unwrap();
        assert_eq!(height, 0u32.to_le_bytes());

        // txo entry
        let mut txo_key = vec![0x04];
        txo_key.extend_from_slice(&reversed(&GENESIS_TXID));
        txo_key.extend_from_slice(&0u32.to_le_bytes());
        let value = indexd.get(&txo_key).unwrap().unwrap();
        assert_eq!(value, 5_000_000_000u64.to_le_bytes());

        // spend entry of the coinbase input
        let mut spent_key = vec![0x02];
        spent_key.extend_from_slice(&[0u8; 32]);
        spent_key.extend_from_slice(&0xffff_ffffu32.to_le_bytes());
        let spend = indexd.get(&spent_key).unwrap().unwrap();
        assert_eq!(&spend[..32], &reversed(&GENESIS_TXID));
    }
}
