#[derive(Debug, thiserror::Error)]
/// Errors surfaced while setting up or running a scan
pub enum Error {
    /// Reading the input stream or an auxiliary file failed
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[cfg(feature = "db")]
    /// Opening or writing the key-value index failed
    #[error(transparent)]
    Rocksdb(#[from] rocksdb::Error),

    /// The `-t` index does not name a transform
    #[error("unknown transform index {0}")]
    UnknownTransform(u8),

    /// The selected transform needs block heights, pass a whitelist with `-w`
    #[error("transform requires a whitelist with heights (-w)")]
    WhitelistRequired,

    /// The selected transform needs a database directory, pass it with `-l`
    #[error("transform requires a database directory (-l)")]
    DbRequired,
}
