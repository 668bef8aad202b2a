//! Splits a single-end SAM file into unique, duplicate and unknown-umi reads.

use anyhow::Result;
use env_logger::Env;

mod app;
pub mod cigar;
pub mod dedup;
pub mod io;
pub mod metrics;
pub mod record;

use app::App;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let mut app = App::new().await?;
    app.run().await?;

    Ok(())
}
