use crate::bytes::Bytes;

/// Pushes up to 75 bytes are encoded in the opcode itself, beyond that one of
/// the three explicit push opcodes carries the length.
pub const OP_PUSHDATA1: u8 = 0x4c;
/// Push with a following little-endian u16 length
pub const OP_PUSHDATA2: u8 = 0x4d;
/// Push with a following little-endian u32 length
pub const OP_PUSHDATA4: u8 = 0x4e;

/// Reads a Bitcoin compact-size integer, advancing `data` by 1, 3, 5 or 9
/// bytes depending on the leading byte.
pub fn read_compact_size(data: &mut Bytes) -> u64 {
    let first = data.read_u8();
    match first {
        0xfd => u64::from(data.read_u16()),
        0xfe => u64::from(data.read_u32()),
        0xff => data.read_u64(),
        _ => u64::from(first),
    }
}

/// Encodes `value` as a compact-size integer, appending to `out`
pub fn write_compact_size(out: &mut Vec<u8>, value: u64) {
    if value < 0xfd {
        out.push(value as u8);
    } else if value <= 0xffff {
        out.push(0xfd);
        out.extend_from_slice(&(value as u16).to_le_bytes());
    } else if value <= 0xffff_ffff {
        out.push(0xfe);
        out.extend_from_slice(&(value as u32).to_le_bytes());
    } else {
        out.push(0xff);
        out.extend_from_slice(&value.to_le_bytes());
    }
}

/// Reads the data length following a push opcode, advancing `data` past the
/// explicit length bytes if the opcode carries any. Used for script
/// disassembly only.
pub fn read_push_len(opcode: u8, data: &mut Bytes) -> u32 {
    if opcode < OP_PUSHDATA1 {
        u32::from(opcode)
    } else if opcode == OP_PUSHDATA1 {
        u32::from(data.read_u8())
    } else if opcode == OP_PUSHDATA2 {
        u32::from(data.read_u16())
    } else {
        assert_eq!(opcode, OP_PUSHDATA4);
        data.read_u32()
    }
}
