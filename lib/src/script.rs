use crate::bytes::Bytes;
use crate::varint::{read_push_len, OP_PUSHDATA1, OP_PUSHDATA2, OP_PUSHDATA4};

const HEX: &[u8; 16] = b"0123456789abcdef";

/// Renders `script` in ASM form: pushed data as hex, everything else by
/// opcode name, space separated. A push reaching past the end of the script
/// renders as `<ERROR>` and stops.
pub fn render_asm(script: &[u8]) -> String {
    let mut out = String::with_capacity(script.len() * 2);
    let mut data = Bytes::new(script);

    while !data.is_empty() {
        let opcode = data.read_u8();

        if opcode > 0x00 && opcode <= OP_PUSHDATA4 {
            let length_width = match opcode {
                OP_PUSHDATA1 => 1,
                OP_PUSHDATA2 => 2,
                OP_PUSHDATA4 => 4,
                _ => 0,
            };
            if data.len() < length_width {
                out.push_str("<ERROR>");
                return out;
            }
            let push_len = read_push_len(opcode, &mut data) as usize;
            if push_len > data.len() {
                out.push_str("<ERROR>");
                return out;
            }
            for byte in data.read_slice(push_len) {
                out.push(HEX[usize::from(byte >> 4)] as char);
                out.push(HEX[usize::from(byte & 0x0f)] as char);
            }
            out.push(' ');
        } else {
            out.push_str(op_name(opcode));
            out.push(' ');
        }
    }

    out
}

/// Canonical name of a non-push opcode
pub fn op_name(opcode: u8) -> &'static str {
    match opcode {
        0x00 => "OP_0",
        0x4f => "OP_1NEGATE",
        0x50 => "OP_RESERVED",
        0x51 => "OP_1",
        0x52 => "OP_2",
        0x53 => "OP_3",
        0x54 => "OP_4",
        0x55 => "OP_5",
        0x56 => "OP_6",
        0x57 => "OP_7",
        0x58 => "OP_8",
        0x59 => "OP_9",
        0x5a => "OP_10",
        0x5b => "OP_11",
        0x5c => "OP_12",
        0x5d => "OP_13",
        0x5e => "OP_14",
        0x5f => "OP_15",
        0x60 => "OP_16",
        0x61 => "OP_NOP",
        0x62 => "OP_VER",
        0x63 => "OP_IF",
        0x64 => "OP_NOTIF",
        0x65 => "OP_VERIF",
        0x66 => "OP_VERNOTIF",
        0x67 => "OP_ELSE",
        0x68 => "OP_ENDIF",
        0x69 => "OP_VERIFY",
        0x6a => "OP_RETURN",
        0x6b => "OP_TOALTSTACK",
        0x6c => "OP_FROMALTSTACK",
        0x6d => "OP_2DROP",
        0x6e => "OP_2DUP",
        0x6f => "OP_3DUP",
        0x70 => "OP_2OVER",
        0x71 => "OP_2ROT",
        0x72 => "OP_2SWAP",
        0x73 => "OP_IFDUP",
        0x74 => "OP_DEPTH",
        0x75 => "OP_DROP",
        0x76 => "OP_DUP",
        0x77 => "OP_NIP",
        0x78 => "OP_OVER",
        0x79 => "OP_PICK",
        0x7a => "OP_ROLL",
        0x7b => "OP_ROT",
        0x7c => "OP_SWAP",
        0x7d => "OP_TUCK",
        0x7e => "OP_CAT",
        0x7f => "OP_SUBSTR",
        0x80 => "OP_LEFT",
        0x81 => "OP_RIGHT",
        0x82 => "OP_SIZE",
        0x83 => "OP_INVERT",
        0x84 => "OP_AND",
        0x85 => "OP_OR",
        0x86 => "OP_XOR",
        0x87 => "OP_EQUAL",
        0x88 => "OP_EQUALVERIFY",
        0x89 => "OP_RESERVED1",
        0x8a => "OP_RESERVED2",
        0x8b => "OP_1ADD",
        0x8c => "OP_1SUB",
        0x8d => "OP_2MUL",
        0x8e => "OP_2DIV",
        0x8f => "OP_NEGATE",
        0x90 => "OP_ABS",
        0x91 => "OP_NOT",
        0x92 => "OP_0NOTEQUAL",
        0x93 => "OP_ADD",
        0x94 => "OP_SUB",
        0x95 => "OP_MUL",
        0x96 => "OP_DIV",
        0x97 => "OP_MOD",
        0x98 => "OP_LSHIFT",
        0x99 => "OP_RSHIFT",
        0x9a => "OP_BOOLAND",
        0x9b => "OP_BOOLOR",
        0x9c => "OP_NUMEQUAL",
        0x9d => "OP_NUMEQUALVERIFY",
        0x9e => "OP_NUMNOTEQUAL",
        0x9f => "OP_LESSTHAN",
        0xa0 => "OP_GREATERTHAN",
        0xa1 => "OP_LESSTHANOREQUAL",
        0xa2 => "OP_GREATERTHANOREQUAL",
        0xa3 => "OP_MIN",
        0xa4 => "OP_MAX",
        0xa5 => "OP_WITHIN",
        0xa6 => "OP_RIPEMD160",
        0xa7 => "OP_SHA1",
        0xa8 => "OP_SHA256",
        0xa9 => "OP_HASH160",
        0xaa => "OP_HASH256",
        0xab => "OP_CODESEPARATOR",
        0xac => "OP_CHECKSIG",
        0xad => "OP_CHECKSIGVERIFY",
        0xae => "OP_CHECKMULTISIG",
        0xaf => "OP_CHECKMULTISIGVERIFY",
        0xb0 => "OP_NOP1",
        0xb1 => "OP_CHECKLOCKTIMEVERIFY",
        0xb2 => "OP_CHECKSEQUENCEVERIFY",
        0xb3 => "OP_NOP4",
        0xb4 => "OP_NOP5",
        0xb5 => "OP_NOP6",
        0xb6 => "OP_NOP7",
        0xb7 => "OP_NOP8",
        0xb8 => "OP_NOP9",
        0xb9 => "OP_NOP10",
        0xba => "OP_CHECKSIGADD",
        _ => "OP_UNKNOWN",
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use hex_lit::hex;

    #[test]
    fn test_p2pkh() {
        // OP_DUP OP_HASH160 <20 bytes> OP_EQUALVERIFY OP_CHECKSIG
        let script = hex!("76a914751e76e8199196d454941c45d1b3a323f1433bd688ac");
        assert_eq!(
            render_asm(&script),
            "OP_DUP OP_HASH160 751e76e8199196d454941c45d1b3a323f1433bd6 OP_EQUALVERIFY OP_CHECKSIG "
        );
    }

    #[test]
    fn test_pushdata1() {
        let mut script = vec![OP_PUSHDATA1, 3, 0xaa, 0xbb, 0xcc];
        script.push(0xac);
        assert_eq!(render_asm(&script), "aabbcc OP_CHECKSIG ");
    }

    #[test]
    fn test_small_ints() {
        assert_eq!(render_asm(&[0x00, 0x51, 0x60]), "OP_0 OP_1 OP_16 ");
    }

    #[test]
    fn test_truncated_push() {
        // declares a 5 byte push with 2 bytes left
        assert_eq!(render_asm(&[0x05, 0xaa, 0xbb]), "<ERROR>");
        // pushdata2 missing its length bytes
        assert_eq!(render_asm(&[OP_PUSHDATA2, 0x01]), "<ERROR>");
    }

    #[test]
    fn test_unknown() {
        assert_eq!(render_asm(&[0xfe]), "OP_UNKNOWN ");
    }
}
