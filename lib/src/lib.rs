#![doc = include_str!("../README.md")]
// Coding conventions
#![forbid(unsafe_code)]
#![deny(non_upper_case_globals)]
#![deny(non_camel_case_types)]
#![deny(non_snake_case)]
#![deny(unused_mut)]
#![deny(dead_code)]
#![deny(unused_imports)]
#![deny(missing_docs)]
#![deny(unused_must_use)]

mod block;
mod bytes;
mod chain;
mod config;
mod error;
mod hash;
mod period;
mod pool;
mod scan;
mod script;
mod sorted_map;
mod tx;
mod varint;
mod whitelist;

/// PostgreSQL COPY BINARY framing, used by the side-tool importers
pub mod pg;
pub mod transform;

// re-exporting deps
pub use log;

pub use block::{target, Block};
pub use bytes::{put_u32_be, Bytes};
pub use chain::{ChainNode, HeaderSet};
pub use config::Config;
pub use error::Error;
pub use hash::{hash160, ripemd160, sha1, sha256, sha256d, to_hex_rev, Hash160, Hash256};
pub use period::{PeriodCounter, Stats};
pub use pool::{Job, WorkerPool};
pub use scan::{scan, ScanStats, MAGIC};
pub use script::{op_name, render_asm};
pub use sorted_map::SortedVec;
pub use tx::{Input, Output, Transaction, Transactions, Witness, WitnessKind};
pub use varint::{read_compact_size, read_push_len, write_compact_size};
pub use whitelist::{load_hash_heights, Whitelist};
