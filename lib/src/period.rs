use std::fmt;
use std::fmt::Formatter;
use std::time::Duration;
use std::time::Instant;

/// Contains counters and instants to provide per period stats over blocks and
/// bytes processed
#[derive(Debug)]
pub struct PeriodCounter {
    start: Instant,
    last: Instant,
    stats: Stats,
    period: Duration,
}

/// Stats of the current period and of the whole run
#[derive(Debug, Default, Clone)]
pub struct Stats {
    current: BlocksBytes,
    total: BlocksBytes,
}

#[derive(Debug, Default, Clone)]
struct BlocksBytes {
    blocks: u64,
    bytes: u64,
    period: Duration,
}

impl BlocksBytes {
    fn blocks(&self) -> u64 {
        self.blocks
    }
    fn blocks_per_sec(&self) -> u64 {
        ((self.blocks as u128 * 1000u128) / self.period.as_millis().max(1)) as u64
    }
    fn kb_per_sec(&self) -> u64 {
        ((self.bytes as u128 * 1000u128) / 1024u128 / self.period.as_millis().max(1)) as u64
    }
}

impl PeriodCounter {
    /// Create a [`PeriodCounter`] with given `period`
    pub fn new(period: Duration) -> Self {
        PeriodCounter {
            start: Instant::now(),
            last: Instant::now(),
            stats: Default::default(),
            period,
        }
    }

    /// Count `blocks` and `bytes` processed since the last call
    pub fn count(&mut self, blocks: u64, bytes: u64) {
        self.stats.current.blocks += blocks;
        self.stats.current.bytes += bytes;

        self.stats.total.blocks += blocks;
        self.stats.total.bytes += bytes;
    }

    /// If `self.period` has passed since last invocation return stats
    pub fn period_elapsed(&mut self) -> Option<Stats> {
        if self.last.elapsed() >= self.period {
            self.stats.total.period = self.start.elapsed();
            self.stats.current.period = self.last.elapsed();
            let return_value = self.stats.clone();
            self.stats.current = BlocksBytes::default();
            self.last = Instant::now();
            Some(return_value)
        } else {
            None
        }
    }
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Current {}: {:>5} blk/s; {:>6} KiB/s; Total: {:>5} blk/s; {:>6} KiB/s;",
            self.total.blocks(),
            self.current.blocks_per_sec(),
            self.current.kb_per_sec(),
            self.total.blocks_per_sec(),
            self.total.kb_per_sec()
        )
    }
}
