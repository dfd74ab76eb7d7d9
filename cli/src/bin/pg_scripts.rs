use clap::Parser;
use dat_parser::{load_hash_heights, pg};
use env_logger::Env;
use log::info;
use std::error::Error;
use std::io::{self, Read, Write};
use std::path::PathBuf;

/// Turns script-index records into a PostgreSQL COPY BINARY stream of
/// (id, txid, height) tuples, joining block hashes to heights through a
/// best-chain hash dump.
#[derive(Parser, Debug)]
struct Args {
    /// Best-chain hashes (32 byte records in height order)
    headers: PathBuf,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let heights = load_hash_heights(&args.headers)?;
    assert!(!heights.is_empty(), "empty chain file");
    info!("read {} chain entries", heights.len());

    let mut stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    writeln!(out, "COPY scripts (id, txid, height) FROM STDIN BINARY")?;
    out.write_all(&pg::COPY_HEADER)?;

    // BLOCK_HASH(32) | TX_HASH(32) | SCRIPT_ID(20)
    let mut record = [0u8; 84];
    loop {
        match stdin.read_exact(&mut record) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => break,
            Err(e) => return Err(e.into()),
        }

        let mut block_hash = [0u8; 32];
        block_hash.copy_from_slice(&record[..32]);
        let height = match heights.get(&block_hash) {
            Some(height) => *height,
            None => continue, // not on the best chain
        };

        let mut txid = [0u8; 32];
        txid.copy_from_slice(&record[32..64]);
        txid.reverse(); // TX_HASH -> TX_ID

        pg::write_tuple_header(&mut out, 3)?;
        pg::write_field(&mut out, &record[64..])?;
        pg::write_field(&mut out, &txid)?;
        pg::write_field_u32(&mut out, height)?;
    }

    out.write_all(&pg::COPY_TRAILER)?;
    Ok(())
}
