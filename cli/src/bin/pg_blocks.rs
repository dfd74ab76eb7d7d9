use dat_parser::pg;
use env_logger::Env;
use std::error::Error;
use std::io::{self, Read, Write};

/// Turns a best-chain hash dump (32 byte hashes in height order) into a
/// PostgreSQL COPY BINARY stream of (id, height) tuples.
fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let mut stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    writeln!(out, "COPY blocks (id, height) FROM STDIN BINARY")?;
    out.write_all(&pg::COPY_HEADER)?;

    let mut height = 0u32;
    let mut hash = [0u8; 32];
    loop {
        match stdin.read_exact(&mut hash) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => break,
            Err(e) => return Err(e.into()),
        }

        hash.reverse(); // BLOCK_HASH -> BLOCK_ID

        pg::write_tuple_header(&mut out, 2)?;
        pg::write_field(&mut out, &hash)?;
        pg::write_field_u32(&mut out, height)?;

        height += 1;
    }

    out.write_all(&pg::COPY_TRAILER)?;
    Ok(())
}
