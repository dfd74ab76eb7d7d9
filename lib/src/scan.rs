use crate::block::Block;
use crate::hash::sha256d;
use crate::pool::WorkerPool;
use crate::transform::{BlockTag, Transform};
use crate::whitelist::Whitelist;
use crate::Error;
use log::info;
use std::convert::TryInto;
use std::io::Read;
use std::mem;
use std::sync::Arc;
use std::time::Duration;

/// The network magic preceding every frame, little-endian on the wire
pub const MAGIC: u32 = 0xd9b4_bef9;

/// Counters accumulated over a whole scan
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ScanStats {
    /// Frames recognized and dispatched to the pool
    pub blocks: u64,
    /// Frames dropped by the whitelist gate
    pub skipped: u64,
    /// Bytes stepped over while resynchronizing on the magic
    pub invalid_bytes: u64,
    /// Total bytes read from the input
    pub read_bytes: u64,
}

/// Recognizes block frames in `input` and feeds each to `transform` through
/// `pool`, overlapping reads with parsing via two half-`memory` buffers.
///
/// While a batch is parsed, workers hold clones of the parse buffer `Arc`;
/// the `wait`-then-swap at every batch boundary guarantees the I/O buffer is
/// exclusively owned again before it is overwritten (asserted through
/// [`Arc::get_mut`]). Frames failing the magic or proof-of-work check are
/// stepped over one byte at a time, which also skips the zero pre-allocations
/// bitcoind pads block files with.
pub fn scan<R, T>(
    mut input: R,
    pool: &WorkerPool,
    transform: &Arc<T>,
    whitelist: &Whitelist,
    memory: usize,
) -> Result<ScanStats, Error>
where
    R: Read,
    T: Transform + Send + Sync + 'static,
{
    let half = memory / 2;
    assert!(half >= 88, "buffer budget too small for a single header");

    let mut io_buffer = Arc::new(vec![0u8; half]);
    let mut parse_buffer = Arc::new(vec![0u8; half]);
    let mut remainder = 0usize;
    let mut stats = ScanStats::default();
    let mut bench = crate::PeriodCounter::new(Duration::from_secs(10));

    loop {
        let read = {
            let buffer = Arc::get_mut(&mut io_buffer).expect("a worker outlived its batch");
            read_full(&mut input, &mut buffer[remainder..])?
        };
        let eof = remainder + read < half;
        stats.read_bytes += read as u64;

        // no worker may reference the previous parse buffer once it becomes
        // the I/O buffer again
        pool.wait();
        mem::swap(&mut io_buffer, &mut parse_buffer);

        let len = remainder + read;
        let mut pos = 0usize;
        let batch_start_blocks = stats.blocks;

        while len - pos >= 88 {
            let data = &parse_buffer[pos..len];

            if u32::from_le_bytes(data[..4].try_into().unwrap()) != MAGIC {
                pos += 1;
                stats.invalid_bytes += 1;
                continue;
            }

            // the magic may be a coincidence, the header must also carry a
            // valid proof of work
            let header = &data[8..88];
            if !Block::new(header, &header[80..]).verify() {
                pos += 1;
                stats.invalid_bytes += 1;
                continue;
            }

            let length = u32::from_le_bytes(data[4..8].try_into().unwrap()) as usize;
            if length < 80 {
                pos += 1;
                stats.invalid_bytes += 1;
                continue;
            }
            if 8 + length > len - pos {
                break; // need more bytes
            }

            let hash = sha256d(header);
            let height = if whitelist.is_empty() {
                None
            } else {
                match whitelist.height(&hash) {
                    Some(height) => Some(height),
                    None => {
                        stats.skipped += 1;
                        pos += 8 + length;
                        continue;
                    }
                }
            };

            let buffer = Arc::clone(&parse_buffer);
            let transform = Arc::clone(transform);
            let start = pos + 8;
            let end = start + length;
            let tag = BlockTag { hash, height };
            pool.push(Box::new(move || {
                let frame = &buffer[start..end];
                let block = Block::new(&frame[..80], &frame[80..]);
                transform.consume(&block, &tag);
            }));

            stats.blocks += 1;
            pos += 8 + length;
        }

        bench.count(stats.blocks - batch_start_blocks, read as u64);
        if let Some(period_stats) = bench.period_elapsed() {
            info!("{}", period_stats);
        }

        if eof {
            break;
        }

        remainder = len - pos;
        assert!(
            remainder < half,
            "a frame is larger than half the buffer budget, raise -m"
        );
        let buffer = Arc::get_mut(&mut io_buffer).expect("a worker outlived its batch");
        buffer[..remainder].copy_from_slice(&parse_buffer[pos..len]);
    }

    pool.wait();
    info!(
        "scanned {} blocks ({} MiB read, {} skipped, {} KiB invalid)",
        stats.blocks,
        stats.read_bytes / 1024 / 1024,
        stats.skipped,
        stats.invalid_bytes / 1024
    );
    Ok(stats)
}

fn read_full<R: Read>(input: &mut R, mut buffer: &mut [u8]) -> std::io::Result<usize> {
    let mut total = 0;
    while !buffer.is_empty() {
        match input.read(buffer) {
            Ok(0) => break,
            Ok(n) => {
                total += n;
                buffer = &mut buffer[n..];
            }
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(total)
}
