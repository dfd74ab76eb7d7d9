use crate::block::Block;
use crate::hash::Hash256;
use crate::sorted_map::SortedVec;
use crate::transform::{BlockTag, Transform};
use std::convert::TryInto;
use std::io::Write;
use std::sync::Mutex;

type Outpoint = (Hash256, u32);
type TxoDetail = (Vec<u8>, u64);

/// Maintains the set of outputs never yet named by an input.
///
/// Every consumed block first inserts its outputs, then removes the outputs
/// its inputs spend; the whole batch runs under one lock so blocks apply
/// atomically. After each block the current set size is printed. Inputs
/// spending outputs outside the processed range (or coinbases) simply find
/// nothing to remove.
pub struct Unspents<W> {
    out: Mutex<W>,
    set: Mutex<SortedVec<Outpoint, TxoDetail>>,
}

impl<W: Write> Unspents<W> {
    /// Creates the transform writing the running size to `out`
    pub fn new(out: W) -> Self {
        Unspents {
            out: Mutex::new(out),
            set: Mutex::new(SortedVec::new()),
        }
    }

    /// Number of unspent outputs currently in the set
    pub fn len(&self) -> usize {
        self.set.lock().unwrap().len()
    }

    /// True when no unspent output is tracked
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Script and value of `outpoint`, if currently unspent
    pub fn get(&self, outpoint: &Outpoint) -> Option<TxoDetail> {
        self.set.lock().unwrap().get(outpoint).cloned()
    }
}

impl<W: Write + Send> Transform for Unspents<W> {
    fn consume(&self, block: &Block<'_>, _tag: &BlockTag) {
        let mut spends: Vec<Outpoint> = Vec::new();
        let mut created: Vec<(Outpoint, TxoDetail)> = Vec::new();

        for tx in block.transactions() {
            let tx_hash = tx.hash();

            for input in &tx.inputs {
                let prev_hash: Hash256 = input.prev_hash.try_into().unwrap();
                spends.push((prev_hash, input.vout));
            }

            for (vout, output) in tx.outputs.iter().enumerate() {
                created.push((
                    (tx_hash, vout as u32),
                    (output.script.to_vec(), output.value),
                ));
            }
        }

        let size = {
            let mut set = self.set.lock().unwrap();
            for (outpoint, detail) in created {
                set.insort(outpoint, detail);
            }
            for outpoint in spends {
                if let Some(index) = set.find(&outpoint) {
                    set.remove(index);
                }
            }
            set.len()
        };

        writeln!(self.out.lock().unwrap(), "{}", size).expect("unspents write failed");
    }
}
