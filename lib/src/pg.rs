use std::io::{self, Write};

/// PostgreSQL COPY BINARY stream header: the 11 byte signature, a zero flags
/// field and a zero header-extension length
pub const COPY_HEADER: [u8; 19] = [
    0x50, 0x47, 0x43, 0x4f, 0x50, 0x59, 0x0a, 0xff, 0x0d, 0x0a, 0x00, // "PGCOPY\n\xff\r\n\0"
    0x00, 0x00, 0x00, 0x00, // flags
    0x00, 0x00, 0x00, 0x00, // header extension length
];

/// COPY BINARY stream trailer: a tuple field count of -1
pub const COPY_TRAILER: [u8; 2] = [0xff, 0xff];

/// Starts a tuple of `fields` fields
pub fn write_tuple_header<W: Write>(out: &mut W, fields: i16) -> io::Result<()> {
    out.write_all(&fields.to_be_bytes())
}

/// Writes one length-prefixed field
pub fn write_field<W: Write>(out: &mut W, data: &[u8]) -> io::Result<()> {
    out.write_all(&(data.len() as i32).to_be_bytes())?;
    out.write_all(data)
}

/// Writes one int4 field (big-endian per the COPY format)
pub fn write_field_u32<W: Write>(out: &mut W, value: u32) -> io::Result<()> {
    write_field(out, &value.to_be_bytes())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_header_signature() {
        assert_eq!(&COPY_HEADER[..11], b"PGCOPY\n\xff\r\n\0");
        assert_eq!(&COPY_HEADER[11..], &[0u8; 8]);
    }

    #[test]
    fn test_tuple() {
        let mut out = Vec::new();
        write_tuple_header(&mut out, 2).unwrap();
        write_field(&mut out, &[0xaa, 0xbb]).unwrap();
        write_field_u32(&mut out, 7).unwrap();

        assert_eq!(
            out,
            vec![
                0x00, 0x02, // field count
                0x00, 0x00, 0x00, 0x02, 0xaa, 0xbb, // bytea field
                0x00, 0x00, 0x00, 0x04, 0x00, 0x00, 0x00, 0x07, // int4 field
            ]
        );
    }
}
