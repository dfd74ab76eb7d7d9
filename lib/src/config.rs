#[cfg(feature = "clap")]
use clap::Parser;
use std::path::PathBuf;

/// Configuration parameters of the stream parser
#[cfg_attr(feature = "clap", derive(Parser))]
#[derive(Debug, Clone)]
pub struct Config {
    /// Transform applied to every block: 0 headers, 1 scripts, 2 asm,
    /// 3 statistics, 4 values, 5 unspents, 6 txo-map, 7 script-index,
    /// 8 spent-index, 9 tx-index, 10 txo-index, 11 indexd (needs feature db)
    #[cfg_attr(feature = "clap", arg(short, long, default_value = "0"))]
    pub transform: u8,

    /// Number of worker threads consuming blocks
    #[cfg_attr(feature = "clap", arg(short = 'j', long, default_value = "1"))]
    pub threads: usize,

    /// Total buffer budget in bytes, half for I/O and half for parsing.
    /// Must comfortably exceed the largest block frame
    #[cfg_attr(feature = "clap", arg(short, long, default_value = "209715200"))]
    pub memory: usize,

    /// Whitelist file: sorted 36 byte records of block hash and height.
    /// When given, only listed blocks are processed and their height is
    /// available to the transform
    #[cfg_attr(feature = "clap", arg(short, long))]
    pub whitelist: Option<PathBuf>,

    /// Previous-output map file for the script-index transform: sorted 40
    /// byte records of sha1(prev tx hash | vout) and sha1(prev output script)
    #[cfg_attr(feature = "clap", arg(short = 'i', long))]
    pub txo_map: Option<PathBuf>,

    #[cfg(feature = "db")]
    /// Directory where the indexd transform creates its rocksdb database
    #[cfg_attr(feature = "clap", arg(short = 'l', long))]
    pub db: Option<PathBuf>,
}

impl Config {
    /// Creates a config with default parameters
    pub fn new() -> Self {
        Self {
            transform: 0,
            threads: 1,
            memory: 200 * 1024 * 1024,
            whitelist: None,
            txo_map: None,
            #[cfg(feature = "db")]
            db: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::new()
    }
}
