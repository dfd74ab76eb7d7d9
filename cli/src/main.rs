use clap::Parser;
use dat_parser::transform::{AnyTransform, Transform};
use dat_parser::{scan, Config, Whitelist, WorkerPool};
use env_logger::Env;
use log::info;
use std::error::Error;
use std::io;
use std::sync::Arc;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    info!("start");

    let config = Config::parse();

    let whitelist = match &config.whitelist {
        Some(path) => Whitelist::load(path)?,
        None => Whitelist::empty(),
    };

    let pool = WorkerPool::new(config.threads);
    info!("initialized {} worker threads", pool.threads());

    let transform = Arc::new(AnyTransform::new(
        &config,
        io::stdout(),
        !whitelist.is_empty(),
    )?);

    let stats = scan(io::stdin(), &pool, &transform, &whitelist, config.memory)?;
    transform.finalize();

    info!(
        "end blocks:{} skipped:{} invalid_bytes:{}",
        stats.blocks, stats.skipped, stats.invalid_bytes
    );
    Ok(())
}
