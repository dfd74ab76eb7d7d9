use clap::Parser;
use env_logger::Env;
use log::info;
use rayon::prelude::*;
use std::error::Error;
use std::io::{self, Read, Write};

/// Sorts fixed-size records from stdin by their leading bytes
#[derive(Parser, Debug)]
struct Args {
    /// Bytes compared at the front of each record
    compare_bytes: usize,

    /// Trailing payload bytes carried along with each record
    #[arg(default_value = "0")]
    data_bytes: usize,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let record_len = args.compare_bytes + args.data_bytes;
    assert!(record_len > 0, "record length must be positive");

    let mut input = Vec::new();
    io::stdin().read_to_end(&mut input)?;
    let whole = input.len() - input.len() % record_len;

    let mut records: Vec<&[u8]> = input[..whole].chunks_exact(record_len).collect();
    info!("sorting {} records of {} bytes", records.len(), record_len);

    let compare = args.compare_bytes;
    records.par_sort_unstable_by(|a, b| a[..compare].cmp(&b[..compare]));

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for record in records {
        out.write_all(record)?;
    }
    Ok(())
}
