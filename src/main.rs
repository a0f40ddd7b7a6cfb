use std::{
    fs::File,
    io::{self, BufReader, BufWriter, Read},
};

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;
use transit_map::requests;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let input: Box<dyn Read> = match std::env::args().nth(1) {
        Some(path) => {
            info!(path = %path, "Reading requests from file");
            Box::new(File::open(&path).with_context(|| format!("Failed to open {path}"))?)
        }
        None => {
            info!("Reading requests from stdin");
            Box::new(io::stdin().lock())
        }
    };

    let stdout = io::stdout();
    requests::process(BufReader::new(input), BufWriter::new(stdout.lock()))
        .context("Failed to process requests")?;

    Ok(())
}
