use dat_parser::HeaderSet;
use env_logger::Env;
use log::info;
use std::error::Error;
use std::io;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let mut headers = HeaderSet::read_from(io::stdin())?;
    info!("found {} chain tips", headers.tips().len());

    let chain = headers.best_chain();
    HeaderSet::write_chain(&chain, io::stdout())?;
    Ok(())
}
