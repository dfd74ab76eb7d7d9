use crate::block::Block;
use crate::transform::{BlockTag, Transform};
use std::fmt;
use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

fn perc(a: u64, ab: u64) -> f64 {
    a as f64 / (ab as f64).max(1.0)
}

/// Aggregate counters over every consumed block, printed at shutdown
pub struct Statistics<W> {
    out: Mutex<W>,
    transactions: AtomicU64,
    inputs: AtomicU64,
    outputs: AtomicU64,
    version1: AtomicU64,
    version2: AtomicU64,
    version_other: AtomicU64,
    locktimes_gt0: AtomicU64,
    non_final_sequences: AtomicU64,
}

/// Point-in-time copy of the [`Statistics`] counters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatisticsSnapshot {
    /// Transactions seen
    pub transactions: u64,
    /// Inputs seen
    pub inputs: u64,
    /// Outputs seen
    pub outputs: u64,
    /// Transactions with version 1
    pub version1: u64,
    /// Transactions with version 2
    pub version2: u64,
    /// Transactions with any other version
    pub version_other: u64,
    /// Transactions with a locktime greater than zero
    pub locktimes_gt0: u64,
    /// Inputs with a sequence different from final
    pub non_final_sequences: u64,
}

impl<W: Write> Statistics<W> {
    /// Creates the transform writing its summary to `out`
    pub fn new(out: W) -> Self {
        Statistics {
            out: Mutex::new(out),
            transactions: AtomicU64::new(0),
            inputs: AtomicU64::new(0),
            outputs: AtomicU64::new(0),
            version1: AtomicU64::new(0),
            version2: AtomicU64::new(0),
            version_other: AtomicU64::new(0),
            locktimes_gt0: AtomicU64::new(0),
            non_final_sequences: AtomicU64::new(0),
        }
    }

    /// Copies the current counter values
    pub fn snapshot(&self) -> StatisticsSnapshot {
        StatisticsSnapshot {
            transactions: self.transactions.load(Ordering::Relaxed),
            inputs: self.inputs.load(Ordering::Relaxed),
            outputs: self.outputs.load(Ordering::Relaxed),
            version1: self.version1.load(Ordering::Relaxed),
            version2: self.version2.load(Ordering::Relaxed),
            version_other: self.version_other.load(Ordering::Relaxed),
            locktimes_gt0: self.locktimes_gt0.load(Ordering::Relaxed),
            non_final_sequences: self.non_final_sequences.load(Ordering::Relaxed),
        }
    }
}

impl<W: Write + Send> Transform for Statistics<W> {
    fn consume(&self, block: &Block<'_>, _tag: &BlockTag) {
        let transactions = block.transactions();
        self.transactions
            .fetch_add(transactions.remaining(), Ordering::Relaxed);

        for tx in transactions {
            self.inputs.fetch_add(tx.inputs.len() as u64, Ordering::Relaxed);
            self.outputs
                .fetch_add(tx.outputs.len() as u64, Ordering::Relaxed);

            let non_final = tx
                .inputs
                .iter()
                .filter(|input| input.sequence != 0xffff_ffff)
                .count();
            self.non_final_sequences
                .fetch_add(non_final as u64, Ordering::Relaxed);

            let version_counter = match tx.version {
                1 => &self.version1,
                2 => &self.version2,
                _ => &self.version_other,
            };
            version_counter.fetch_add(1, Ordering::Relaxed);

            if tx.locktime > 0 {
                self.locktimes_gt0.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    fn finalize(&self) {
        let snapshot = self.snapshot();
        write!(self.out.lock().unwrap(), "{}", snapshot).expect("statistics write failed");
    }
}

impl fmt::Display for StatisticsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Transactions:\t{}", self.transactions)?;
        writeln!(
            f,
            "-- Inputs:\t{} (ratio {:.2})",
            self.inputs,
            perc(self.inputs, self.transactions)
        )?;
        writeln!(
            f,
            "-- Outputs:\t{} (ratio {:.2})",
            self.outputs,
            perc(self.outputs, self.transactions)
        )?;
        writeln!(
            f,
            "-- Version1:\t{} ({:.2}%)",
            self.version1,
            perc(self.version1, self.transactions) * 100.0
        )?;
        writeln!(
            f,
            "-- Version2:\t{} ({:.2}%)",
            self.version2,
            perc(self.version2, self.transactions) * 100.0
        )?;
        writeln!(
            f,
            "-- VersionOther:\t{} ({:.2}%)",
            self.version_other,
            perc(self.version_other, self.transactions) * 100.0
        )?;
        writeln!(
            f,
            "-- Locktimes (>0):\t{} ({:.2}%)",
            self.locktimes_gt0,
            perc(self.locktimes_gt0, self.transactions) * 100.0
        )?;
        writeln!(
            f,
            "-- Sequences (!= FINAL):\t{} ({:.2}%)",
            self.non_final_sequences,
            perc(self.non_final_sequences, self.inputs) * 100.0
        )
    }
}

/// Emits `height(4) | value(8)` for every output, requires whitelist heights
pub struct DumpValues<W> {
    out: Mutex<W>,
}

impl<W: Write> DumpValues<W> {
    /// Creates the transform writing to `out`
    pub fn new(out: W) -> Self {
        DumpValues { out: Mutex::new(out) }
    }
}

impl<W: Write + Send> Transform for DumpValues<W> {
    fn consume(&self, block: &Block<'_>, tag: &BlockTag) {
        let height = tag.height.expect("values transform requires whitelist heights");

        let mut record = [0u8; 12];
        record[..4].copy_from_slice(&height.to_le_bytes());

        for tx in block.transactions() {
            for output in &tx.outputs {
                record[4..].copy_from_slice(&output.value.to_le_bytes());
                self.out
                    .lock()
                    .unwrap()
                    .write_all(&record)
                    .expect("value write failed");
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::fixtures::genesis_block;
    use crate::transform::SharedBuffer;

    #[test]
    fn test_genesis_statistics() {
        let out = SharedBuffer::default();
        let statistics = Statistics::new(out.clone());
        let block = genesis_block();
        let tag = BlockTag {
            hash: block.hash(),
            height: None,
        };
        statistics.consume(&block, &tag);

        let snapshot = statistics.snapshot();
        assert_eq!(
            snapshot,
            StatisticsSnapshot {
                transactions: 1,
                inputs: 1,
                outputs: 1,
                version1: 1,
                version2: 0,
                version_other: 0,
                locktimes_gt0: 0,
                non_final_sequences: 0,
            }
        );

        statistics.finalize();
        let report = String::from_utf8(out.take()).unwrap();
        assert!(report.starts_with("Transactions:\t1"));
        assert!(report.contains("-- Sequences (!= FINAL):\t0"));
    }

    #[test]
    fn test_values() {
        let out = SharedBuffer::default();
        let transform = DumpValues::new(out.clone());
        let block = genesis_block();
        let tag = BlockTag {
            hash: block.hash(),
            height: Some(0),
        };
        transform.consume(&block, &tag);

        let output = out.take();
        assert_eq!(output.len(), 12);
        assert_eq!(&output[..4], &[0u8; 4]);
        assert_eq!(&output[4..], &5_000_000_000u64.to_le_bytes());
    }
}
