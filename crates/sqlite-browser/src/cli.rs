use std::{net::SocketAddr, path::PathBuf};

use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(name = "sqlite-browser")]
pub struct Args {
    /// Default database file (created and seeded on first start).
    #[arg(long, default_value = "demo.sqlite")]
    pub db: PathBuf,

    /// Directory holding uploaded and converted database files.
    #[arg(long, default_value = "uploads")]
    pub uploads_dir: PathBuf,

    /// Address the HTTP API listens on.
    #[arg(long, default_value = "127.0.0.1:3000")]
    pub listen: SocketAddr,

    /// Logging level (stderr). Also supports RUST_LOG.
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Skip demo-data seeding of the default database.
    #[arg(long)]
    pub no_seed: bool,
}
