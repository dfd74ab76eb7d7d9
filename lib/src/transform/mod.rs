//! Pluggable per-block consumers. Each transform receives every dispatched
//! block, possibly on several worker threads at once, and writes its records
//! to the output it was created over.

use crate::block::Block;
use crate::config::Config;
use crate::hash::Hash256;
use crate::Error;
use std::io::Write;

mod index;
mod raw;
mod statistics;
mod unspents;

#[cfg(feature = "db")]
mod db;

pub use index::{DumpTxoMap, ScriptIndex, SpentIndex, TxIndex, TxoIndex};
pub use raw::{DumpAsm, DumpHeaders, DumpScripts};
pub use statistics::{DumpValues, Statistics, StatisticsSnapshot};
pub use unspents::Unspents;

#[cfg(feature = "db")]
pub use db::Indexd;

/// Identity of a dispatched block: its hash and, when the whitelist supplied
/// one, its height
#[derive(Debug, Clone)]
pub struct BlockTag {
    /// Double SHA-256 of the block header
    pub hash: Hash256,
    /// Height from the whitelist record, `None` when no whitelist is loaded
    pub height: Option<u32>,
}

/// A per-block consumer. `consume` may be called concurrently from several
/// workers, implementations guard their state with atomics or a mutex.
pub trait Transform {
    /// Consumes one block
    fn consume(&self, block: &Block<'_>, tag: &BlockTag);

    /// Called once after the input is exhausted and the pool has drained
    fn finalize(&self) {}
}

/// The transform selected by the `-t` index, dispatching statically
pub enum AnyTransform<W> {
    /// Raw block headers
    Headers(DumpHeaders<W>),
    /// Length-prefixed input and output scripts
    Scripts(DumpScripts<W>),
    /// Input script disassembly
    Asm(DumpAsm<W>),
    /// Aggregate counters printed at shutdown
    Statistics(Statistics<W>),
    /// Output values by height
    Values(DumpValues<W>),
    /// The running unspent output set
    Unspents(Unspents<W>),
    /// Previous-output script map records
    TxoMap(DumpTxoMap<W>),
    /// Script usage index
    ScriptIndex(ScriptIndex<W>),
    /// Spent-output index
    SpentIndex(SpentIndex<W>),
    /// Transaction height index
    TxIndex(TxIndex<W>),
    /// Transaction output index
    TxoIndex(TxoIndex<W>),
    #[cfg(feature = "db")]
    /// All five key-value index shapes in one batch per block
    Indexd(Indexd),
}

impl<W: Write + Send> AnyTransform<W> {
    /// Builds the transform named by `config.transform` writing to `out`.
    /// `has_heights` tells whether a whitelist with heights is loaded, which
    /// some transforms require.
    pub fn new(config: &Config, out: W, has_heights: bool) -> Result<Self, Error> {
        Ok(match config.transform {
            0 => AnyTransform::Headers(DumpHeaders::new(out)),
            1 => AnyTransform::Scripts(DumpScripts::new(out)),
            2 => AnyTransform::Asm(DumpAsm::new(out)),
            3 => AnyTransform::Statistics(Statistics::new(out)),
            4 => {
                if !has_heights {
                    return Err(Error::WhitelistRequired);
                }
                AnyTransform::Values(DumpValues::new(out))
            }
            5 => AnyTransform::Unspents(Unspents::new(out)),
            6 => AnyTransform::TxoMap(DumpTxoMap::new(out)),
            7 => {
                let txo_map = match &config.txo_map {
                    Some(path) => index::load_txo_map(path)?,
                    None => Default::default(),
                };
                AnyTransform::ScriptIndex(ScriptIndex::new(out, txo_map))
            }
            8 => AnyTransform::SpentIndex(SpentIndex::new(out)),
            9 => {
                if !has_heights {
                    return Err(Error::WhitelistRequired);
                }
                AnyTransform::TxIndex(TxIndex::new(out))
            }
            10 => AnyTransform::TxoIndex(TxoIndex::new(out)),
            #[cfg(feature = "db")]
            11 => {
                if !has_heights {
                    return Err(Error::WhitelistRequired);
                }
                let path = config.db.as_ref().ok_or(Error::DbRequired)?;
                AnyTransform::Indexd(Indexd::new(path)?)
            }
            other => return Err(Error::UnknownTransform(other)),
        })
    }
}

impl<W: Write + Send> Transform for AnyTransform<W> {
    fn consume(&self, block: &Block<'_>, tag: &BlockTag) {
        match self {
            AnyTransform::Headers(t) => t.consume(block, tag),
            AnyTransform::Scripts(t) => t.consume(block, tag),
            AnyTransform::Asm(t) => t.consume(block, tag),
            AnyTransform::Statistics(t) => t.consume(block, tag),
            AnyTransform::Values(t) => t.consume(block, tag),
            AnyTransform::Unspents(t) => t.consume(block, tag),
            AnyTransform::TxoMap(t) => t.consume(block, tag),
            AnyTransform::ScriptIndex(t) => t.consume(block, tag),
            AnyTransform::SpentIndex(t) => t.consume(block, tag),
            AnyTransform::TxIndex(t) => t.consume(block, tag),
            AnyTransform::TxoIndex(t) => t.consume(block, tag),
            #[cfg(feature = "db")]
            AnyTransform::Indexd(t) => t.consume(block, tag),
        }
    }

    fn finalize(&self) {
        match self {
            AnyTransform::Headers(t) => t.finalize(),
            AnyTransform::Scripts(t) => t.finalize(),
            AnyTransform::Asm(t) => t.finalize(),
            AnyTransform::Statistics(t) => t.finalize(),
            AnyTransform::Values(t) => t.finalize(),
            AnyTransform::Unspents(t) => t.finalize(),
            AnyTransform::TxoMap(t) => t.finalize(),
            AnyTransform::ScriptIndex(t) => t.finalize(),
            AnyTransform::SpentIndex(t) => t.finalize(),
            AnyTransform::TxIndex(t) => t.finalize(),
            AnyTransform::TxoIndex(t) => t.finalize(),
            #[cfg(feature = "db")]
            AnyTransform::Indexd(t) => t.finalize(),
        }
    }
}

#[cfg(test)]
pub(crate) use test_support::SharedBuffer;

#[cfg(test)]
mod test_support {
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    /// A cloneable in-memory sink collecting what a transform writes
    #[derive(Debug, Default, Clone)]
    pub(crate) struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl SharedBuffer {
        pub(crate) fn take(&self) -> Vec<u8> {
            std::mem::take(&mut *self.0.lock().unwrap())
        }
    }

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::fixtures::genesis_block;

    #[test]
    fn test_unknown_transform() {
        let mut config = Config::new();
        config.transform = 99;
        match AnyTransform::new(&config, SharedBuffer::default(), false) {
            Err(Error::UnknownTransform(99)) => {}
            _ => panic!("expected unknown transform"),
        }
    }

    #[test]
    fn test_height_requiring_transforms() {
        for index in [4u8, 9] {
            let mut config = Config::new();
            config.transform = index;
            match AnyTransform::new(&config, SharedBuffer::default(), false) {
                Err(Error::WhitelistRequired) => {}
                _ => panic!("transform {} must require heights", index),
            }
        }
    }

    #[test]
    fn test_dispatch() {
        let out = SharedBuffer::default();
        let transform = AnyTransform::new(&Config::new(), out.clone(), false).unwrap();
        let block = genesis_block();
        let tag = BlockTag {
            hash: block.hash(),
            height: None,
        };
        transform.consume(&block, &tag);
        transform.finalize();
        assert_eq!(out.take().len(), 80);
    }
}
