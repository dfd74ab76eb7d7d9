use ripemd::Ripemd160;
use sha1::Sha1;
use sha2::{Digest, Sha256};

/// A 256-bit hash in the byte order produced by the digest (little-endian on
/// the wire for block and transaction hashes)
pub type Hash256 = [u8; 32];

/// A 160-bit hash
pub type Hash160 = [u8; 20];

/// SHA-256 of `data`
pub fn sha256(data: &[u8]) -> Hash256 {
    Sha256::digest(data).into()
}

/// SHA-256 of SHA-256 of `data`, the hash identifying blocks and transactions
pub fn sha256d(data: &[u8]) -> Hash256 {
    sha256(&sha256(data))
}

/// SHA-1 of `data`
pub fn sha1(data: &[u8]) -> Hash160 {
    Sha1::digest(data).into()
}

/// RIPEMD-160 of `data`
pub fn ripemd160(data: &[u8]) -> Hash160 {
    Ripemd160::digest(data).into()
}

/// RIPEMD-160 of SHA-256 of `data`
pub fn hash160(data: &[u8]) -> Hash160 {
    ripemd160(&sha256(data))
}

/// Renders a hash as lowercase hex, byte-reversed as hashes are displayed
pub fn to_hex_rev(hash: &[u8]) -> String {
    let mut out = String::with_capacity(hash.len() * 2);
    for byte in hash.iter().rev() {
        out.push_str(&format!("{:02x}", byte));
    }
    out
}

#[cfg(test)]
mod test {
    use super::*;
    use hex_lit::hex;

    #[test]
    fn test_sha256d() {
        // sha256d of the empty string
        assert_eq!(
            sha256d(b""),
            hex!("5df6e0e2761359d30a8275058e299fcc0381534545f55cf43e41983f5d4c9456")
        );
    }

    #[test]
    fn test_sha256() {
        assert_eq!(
            sha256(b"abc"),
            hex!("ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad")
        );
    }

    #[test]
    fn test_sha1() {
        assert_eq!(sha1(b"abc"), hex!("a9993e364706816aba3e25717850c26c9cd0d89d"));
    }

    #[test]
    fn test_ripemd160() {
        assert_eq!(
            ripemd160(b"abc"),
            hex!("8eb208f7e05d987a9b044a8e98c6b087f15a0bfc")
        );
    }

    #[test]
    fn test_hash160() {
        // hash160 of the compressed generator point
        assert_eq!(
            hash160(&hex!(
                "0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798"
            )),
            hex!("751e76e8199196d454941c45d1b3a323f1433bd6")
        );
    }

    #[test]
    fn test_to_hex_rev() {
        let mut hash = [0u8; 32];
        hash[0] = 0xab;
        let hex = to_hex_rev(&hash);
        assert_eq!(hex.len(), 64);
        assert!(hex.ends_with("ab"));
        assert!(hex.starts_with("00"));
    }
}
