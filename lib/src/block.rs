use crate::bytes::Bytes;
use crate::hash::{sha256d, Hash256};
use crate::tx::Transactions;
use crate::varint::read_compact_size;

/// View over one block frame: an 80 byte header and the transaction body.
/// Both slices borrow the parse buffer and are valid for one batch.
#[derive(Debug, Clone, Copy)]
pub struct Block<'a> {
    header: &'a [u8],
    body: &'a [u8],
}

impl<'a> Block<'a> {
    /// Creates a view over `header` (exactly 80 bytes) and `body`
    pub fn new(header: &'a [u8], body: &'a [u8]) -> Self {
        assert_eq!(header.len(), 80, "block header must be 80 bytes");
        Block { header, body }
    }

    /// The raw 80 header bytes
    pub fn header(&self) -> &'a [u8] {
        self.header
    }

    /// The raw body bytes (transaction count followed by transactions)
    pub fn body(&self) -> &'a [u8] {
        self.body
    }

    /// Double SHA-256 of the header, identifying the block
    pub fn hash(&self) -> Hash256 {
        sha256d(self.header)
    }

    /// The header version field
    pub fn version(&self) -> i32 {
        Bytes::new(self.header).peek_i32()
    }

    /// Hash of the previous block, header bytes 4..36
    pub fn prev_hash(&self) -> &'a [u8] {
        &self.header[4..36]
    }

    /// The merkle root, header bytes 36..68
    pub fn merkle_root(&self) -> &'a [u8] {
        &self.header[36..68]
    }

    /// The header timestamp
    pub fn timestamp(&self) -> u32 {
        Bytes::new(self.header).peek_u32_at(68)
    }

    /// The compact difficulty target
    pub fn bits(&self) -> u32 {
        Bytes::new(self.header).peek_u32_at(72)
    }

    /// The header nonce
    pub fn nonce(&self) -> u32 {
        Bytes::new(self.header).peek_u32_at(76)
    }

    /// Lazy cursor over the transactions in the body
    pub fn transactions(&self) -> Transactions<'a> {
        let mut data = Bytes::new(self.body);
        let count = read_compact_size(&mut data);
        Transactions::new(count, data)
    }

    /// True if the header hash, interpreted big-endian, does not exceed the
    /// target encoded in `bits`. Used both to discard garbage between frames
    /// and to validate candidates.
    pub fn verify(&self) -> bool {
        let mut hash = self.hash();
        hash.reverse();
        hash <= target(self.bits())
    }
}

/// Expands a compact 32-bit `bits` field into the 32 byte big-endian target.
///
/// The exponent places the big-endian mantissa bytes at index `31 - e`; an
/// out-of-range placement (exponent below 3 or above 31) yields the all-zero
/// target, which no header can satisfy.
pub fn target(bits: u32) -> [u8; 32] {
    let exponent = (bits >> 24) as usize;
    let mantissa = bits & 0x007f_ffff;

    let mut target = [0u8; 32];
    let index = 31usize.wrapping_sub(exponent);
    if index > 28 {
        return target;
    }
    target[index..index + 4].copy_from_slice(&mantissa.to_be_bytes());
    target
}
