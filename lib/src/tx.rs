use crate::bytes::Bytes;
use crate::hash::{sha256d, Hash256};
use crate::varint::read_compact_size;

/// Spend kind recognized from the witness stack of an input whose script is
/// empty: one element is a P2WPKH spend, more than one a P2WSH spend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WitnessKind {
    /// Not a recognized witness spend (or no witness data at all)
    None,
    /// Pay-to-witness-public-key-hash
    P2wpkh,
    /// Pay-to-witness-script-hash
    P2wsh,
    /// Empty-script input with an unrecognizable witness stack
    Error,
}

/// View over one transaction input, borrowing the block body
#[derive(Debug, Clone)]
pub struct Input<'a> {
    /// Hash of the transaction the spent output belongs to
    pub prev_hash: &'a [u8],
    /// Index of the spent output in that transaction
    pub vout: u32,
    /// The input script
    pub script: &'a [u8],
    /// The sequence number
    pub sequence: u32,
    /// Recognized witness spend kind, see [`WitnessKind`]
    pub witness: WitnessKind,
}

impl Input<'_> {
    /// True for the coinbase input, which has no previous output
    pub fn is_coinbase(&self) -> bool {
        self.vout == 0xffff_ffff && self.prev_hash.iter().all(|byte| *byte == 0)
    }
}

/// View over one transaction output, borrowing the block body
#[derive(Debug, Clone)]
pub struct Output<'a> {
    /// The output script
    pub script: &'a [u8],
    /// Amount in satoshi
    pub value: u64,
}

/// Witness stack of one input
#[derive(Debug, Clone)]
pub struct Witness<'a> {
    /// The stack elements in push order
    pub stack: Vec<&'a [u8]>,
}

/// View over one transaction. Field slices borrow the backing block body, the
/// transaction owns nothing.
#[derive(Debug, Clone)]
pub struct Transaction<'a> {
    /// The exact byte extent of this transaction, including the segwit
    /// marker and flag bytes when present
    pub data: &'a [u8],
    /// The transaction version
    pub version: i32,
    /// The inputs
    pub inputs: Vec<Input<'a>>,
    /// The outputs
    pub outputs: Vec<Output<'a>>,
    /// Per-input witness stacks, empty unless the segwit marker was present
    pub witnesses: Vec<Witness<'a>>,
    /// The locktime
    pub locktime: u32,
}

impl Transaction<'_> {
    /// Double SHA-256 of the exact serialized extent.
    ///
    /// For transactions carrying witnesses this includes the marker, flag and
    /// witness bytes, so it differs from the txid (which is defined over the
    /// legacy serialization). Downstream consumers of the index records rely
    /// on this exact preimage.
    pub fn hash(&self) -> Hash256 {
        sha256d(self.data)
    }
}

pub(crate) fn read_transaction<'a>(data: &mut Bytes<'a>) -> Transaction<'a> {
    let start = *data;
    let version = data.read_i32();

    // segwit marker and flag sit between version and input count
    let has_witnesses = data.peek_u8() == 0x00 && data.peek_u8_at(1) == 0x01;
    if has_witnesses {
        data.advance(2);
    }

    let input_count = read_compact_size(data) as usize;
    let mut inputs = Vec::with_capacity(input_count);
    for _ in 0..input_count {
        let prev_hash = data.read_slice(32);
        let vout = data.read_u32();
        let script_len = read_compact_size(data) as usize;
        let script = data.read_slice(script_len);
        let sequence = data.read_u32();
        inputs.push(Input {
            prev_hash,
            vout,
            script,
            sequence,
            witness: WitnessKind::None,
        });
    }

    let output_count = read_compact_size(data) as usize;
    let mut outputs = Vec::with_capacity(output_count);
    for _ in 0..output_count {
        let value = data.read_u64();
        let script_len = read_compact_size(data) as usize;
        let script = data.read_slice(script_len);
        outputs.push(Output { script, value });
    }

    let mut witnesses = Vec::new();
    if has_witnesses {
        witnesses.reserve(input_count);
        for input in inputs.iter_mut() {
            let element_count = read_compact_size(data) as usize;
            let mut stack = Vec::with_capacity(element_count);
            for _ in 0..element_count {
                let element_len = read_compact_size(data) as usize;
                stack.push(data.read_slice(element_len));
            }
            if input.script.is_empty() {
                input.witness = match stack.len() {
                    0 => WitnessKind::Error,
                    1 => WitnessKind::P2wpkh,
                    _ => WitnessKind::P2wsh,
                };
            }
            witnesses.push(Witness { stack });
        }
    }

    let locktime = data.read_u32();
    let consumed = start.len() - data.len();

    Transaction {
        data: start.take(consumed).as_slice(),
        version,
        inputs,
        outputs,
        witnesses,
        locktime,
    }
}

/// Lazy cursor over the transactions of a block body.
///
/// Each call to [`Iterator::next`] decodes exactly one transaction; the
/// yielded views borrow the backing buffer, not the iterator, so they can be
/// held across iterations without materializing the whole block.
pub struct Transactions<'a> {
    count: u64,
    data: Bytes<'a>,
}

impl<'a> Transactions<'a> {
    pub(crate) fn new(count: u64, data: Bytes<'a>) -> Self {
        Transactions { count, data }
    }

    /// Transactions not yet decoded
    pub fn remaining(&self) -> u64 {
        self.count
    }
}

impl<'a> Iterator for Transactions<'a> {
    type Item = Transaction<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.count == 0 {
            return None;
        }
        self.count -= 1;
        Some(read_transaction(&mut self.data))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.count as usize, Some(self.count as usize))
    }
}
