use crate::block::Block;
use crate::hash::{sha1, Hash160};
use crate::sorted_map::SortedVec;
use crate::transform::{BlockTag, Transform};
use crate::Error;
use log::info;
use std::convert::TryInto;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

/// Loads a previous-output map: sorted 40 byte records of
/// `sha1(prev tx hash | vout)(20) | sha1(prev output script)(20)`
pub fn load_txo_map<P: AsRef<Path>>(path: P) -> Result<SortedVec<Hash160, Hash160>, Error> {
    let bytes = fs::read(path)?;
    assert_eq!(bytes.len() % 40, 0, "txo map must be 40 byte records");

    let mut map = SortedVec::with_capacity(bytes.len() / 40);
    for record in bytes.chunks_exact(40) {
        let key: Hash160 = record[..20].try_into().unwrap();
        let value: Hash160 = record[20..].try_into().unwrap();
        map.push(key, value);
    }
    map.assert_sorted();

    info!("read {} txo map entries", map.len());
    Ok(map)
}

fn outpoint_sha1(tx_hash: &[u8], vout: u32) -> Hash160 {
    let mut buffer = [0u8; 36];
    buffer[..32].copy_from_slice(tx_hash);
    buffer[32..].copy_from_slice(&vout.to_le_bytes());
    sha1(&buffer)
}

/// Emits `sha1(tx hash | vout)(20) | sha1(output script)(20)` per output,
/// producing (once sorted) the map consumed by [`ScriptIndex`]
pub struct DumpTxoMap<W> {
    out: Mutex<W>,
}

impl<W: Write> DumpTxoMap<W> {
    /// Creates the transform writing to `out`
    pub fn new(out: W) -> Self {
        DumpTxoMap { out: Mutex::new(out) }
    }
}

impl<W: Write + Send> Transform for DumpTxoMap<W> {
    fn consume(&self, block: &Block<'_>, _tag: &BlockTag) {
        let mut record = [0u8; 40];

        for tx in block.transactions() {
            let tx_hash = tx.hash();

            for (vout, output) in tx.outputs.iter().enumerate() {
                record[..20].copy_from_slice(&outpoint_sha1(&tx_hash, vout as u32));
                record[20..].copy_from_slice(&sha1(output.script));
                self.out
                    .lock()
                    .unwrap()
                    .write_all(&record)
                    .expect("txo map write failed");
            }
        }
    }
}

/// Emits `block hash(32) | tx hash(32) | sha1(script)(20)` for every output
/// and, when a previous-output map is loaded, for every input with the spent
/// output's script hash (the coinbase input uses its own script)
pub struct ScriptIndex<W> {
    out: Mutex<W>,
    txo_map: SortedVec<Hash160, Hash160>,
}

impl<W: Write> ScriptIndex<W> {
    /// Creates the transform writing to `out`, resolving input scripts
    /// through `txo_map` (inputs are skipped when the map is empty)
    pub fn new(out: W, txo_map: SortedVec<Hash160, Hash160>) -> Self {
        ScriptIndex {
            out: Mutex::new(out),
            txo_map,
        }
    }

    fn write_record(&self, record: &[u8; 84]) {
        self.out
            .lock()
            .unwrap()
            .write_all(record)
            .expect("script index write failed");
    }
}

impl<W: Write + Send> Transform for ScriptIndex<W> {
    fn consume(&self, block: &Block<'_>, tag: &BlockTag) {
        let mut record = [0u8; 84];
        record[..32].copy_from_slice(&tag.hash);

        for tx in block.transactions() {
            record[32..64].copy_from_slice(&tx.hash());

            if !self.txo_map.is_empty() {
                for input in &tx.inputs {
                    if input.is_coinbase() {
                        record[64..].copy_from_slice(&sha1(input.script));
                        self.write_record(&record);
                        continue;
                    }

                    let key = outpoint_sha1(input.prev_hash, input.vout);
                    let script_hash = self
                        .txo_map
                        .get(&key)
                        .expect("previous output missing from txo map");
                    record[64..].copy_from_slice(script_hash);
                    self.write_record(&record);
                }
            }

            for output in &tx.outputs {
                record[64..].copy_from_slice(&sha1(output.script));
                self.write_record(&record);
            }
        }
    }
}

/// Emits `prev tx hash(32) | prev vout(4) | tx hash(32) | vin(4)` per input
pub struct SpentIndex<W> {
    out: Mutex<W>,
}

impl<W: Write> SpentIndex<W> {
    /// Creates the transform writing to `out`
    pub fn new(out: W) -> Self {
        SpentIndex { out: Mutex::new(out) }
    }
}

impl<W: Write + Send> Transform for SpentIndex<W> {
    fn consume(&self, block: &Block<'_>, _tag: &BlockTag) {
        let mut record = [0u8; 72];

        for tx in block.transactions() {
            record[36..68].copy_from_slice(&tx.hash());

            for (vin, input) in tx.inputs.iter().enumerate() {
                record[..32].copy_from_slice(input.prev_hash);
                record[32..36].copy_from_slice(&input.vout.to_le_bytes());
                record[68..].copy_from_slice(&(vin as u32).to_le_bytes());
                self.out
                    .lock()
                    .unwrap()
                    .write_all(&record)
                    .expect("spent index write failed");
            }
        }
    }
}

/// Emits `tx hash(32) | height(4)` per transaction, requires whitelist heights
pub struct TxIndex<W> {
    out: Mutex<W>,
}

impl<W: Write> TxIndex<W> {
    /// Creates the transform writing to `out`
    pub fn new(out: W) -> Self {
        TxIndex { out: Mutex::new(out) }
    }
}

impl<W: Write + Send> Transform for TxIndex<W> {
    fn consume(&self, block: &Block<'_>, tag: &BlockTag) {
        let height = tag.height.expect("tx index requires whitelist heights");
        let mut record = [0u8; 36];
        record[32..].copy_from_slice(&height.to_le_bytes());

        for tx in block.transactions() {
            record[..32].copy_from_slice(&tx.hash());
            self.out
                .lock()
                .unwrap()
                .write_all(&record)
                .expect("tx index write failed");
        }
    }
}

/// Emits `tx hash(32) | vout(4) | value(8)` per output
pub struct TxoIndex<W> {
    out: Mutex<W>,
}

impl<W: Write> TxoIndex<W> {
    /// Creates the transform writing to `out`
    pub fn new(out: W) -> Self {
        TxoIndex { out: Mutex::new(out) }
    }
}

impl<W: Write + Send> Transform for TxoIndex<W> {
    fn consume(&self, block: &Block<'_>, _tag: &BlockTag) {
        let mut record = [0u8; 44];

        for tx in block.transactions() {
            record[..32].copy_from_slice(&tx.hash());

            for (vout, output) in tx.outputs.iter().enumerate() {
                record[32..36].copy_from_slice(&(vout as u32).to_le_bytes());
                record[36..].copy_from_slice(&output.value.to_le_bytes());
                self.out
                    .lock()
                    .unwrap()
                    .write_all(&record)
                    .expect("txo index write failed");
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::fixtures::{genesis_block, GENESIS_TXID};
    use crate::transform::SharedBuffer;

    fn tag(height: Option<u32>) -> BlockTag {
        BlockTag {
            hash: genesis_block().hash(),
            height,
        }
    }

    #[test]
    fn test_txo_map_and_script_index_agree() {
        let block = genesis_block();

        let out = SharedBuffer::default();
        DumpTxoMap::new(out.clone()).consume(&block, &tag(None));
        let map_record = out.take();
        assert_eq!(map_record.len(), 40);

        // loading the single record back resolves an input spending (txid, 0)
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, &map_record).unwrap();
        let map = load_txo_map(file.path()).unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(
            map.get(&outpoint_sha1(&GENESIS_TXID, 0)),
            Some(&sha1(block.transactions().next().unwrap().outputs[0].script))
        );
    }

    #[test]
    fn test_script_index_outputs() {
        let block = genesis_block();
        let out = SharedBuffer::default();
        ScriptIndex::new(out.clone(), Default::default()).consume(&block, &tag(None));

        let record = out.take();
        assert_eq!(record.len(), 84);
        assert_eq!(&record[..32], &block.hash());
        assert_eq!(&record[32..64], &GENESIS_TXID);
        let output_script = block.transactions().next().unwrap().outputs[0].script;
        assert_eq!(&record[64..], &sha1(output_script));
    }

    #[test]
    fn test_script_index_coinbase_input() {
        let block = genesis_block();
        let out = SharedBuffer::default();

        // any non-empty map enables input records
        let mut map = SortedVec::new();
        map.push([0u8; 20], [0u8; 20]);
        map.sort();
        ScriptIndex::new(out.clone(), map).consume(&block, &tag(None));

        let records = out.take();
        assert_eq!(records.len(), 2 * 84);
        let input_script = block.transactions().next().unwrap().inputs[0].script;
        assert_eq!(&records[64..84], &sha1(input_script));
    }

    #[test]
    fn test_spent_index() {
        let block = genesis_block();
        let out = SharedBuffer::default();
        SpentIndex::new(out.clone()).consume(&block, &tag(None));

        let record = out.take();
        assert_eq!(record.len(), 72);
        assert_eq!(&record[..32], &[0u8; 32]);
        assert_eq!(&record[32..36], &0xffff_ffffu32.to_le_bytes());
        assert_eq!(&record[36..68], &GENESIS_TXID);
        assert_eq!(&record[68..], &0u32.to_le_bytes());
    }

    #[test]
    fn test_tx_index() {
        let block = genesis_block();
        let out = SharedBuffer::default();
        TxIndex::new(out.clone()).consume(&block, &tag(Some(0)));

        let record = out.take();
        assert_eq!(record.len(), 36);
        assert_eq!(&record[..32], &GENESIS_TXID);
        assert_eq!(&record[32..], &[0u8; 4]);
    }

    #[test]
    fn test_txo_index() {
        let block = genesis_block();
        let out = SharedBuffer::default();
        TxoIndex::new(out.clone()).consume(&block, &tag(None));

        let record = out.take();
        assert_eq!(record.len(), 44);
        assert_eq!(&record[..32], &GENESIS_TXID);
        assert_eq!(&record[32..36], &0u32.to_le_bytes());
        assert_eq!(&record[36..], &5_000_000_000u64.to_le_bytes());
    }
}
