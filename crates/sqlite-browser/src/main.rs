use clap::Parser;

use sqlite_browser::{
    adapters,
    cli::Args,
    error::{AppError, AppResult},
    logging,
};

fn main() -> AppResult<()> {
    let args = Args::parse();
    logging::init(&args.log_level);

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| AppError::Internal(e.to_string()))?;
    rt.block_on(adapters::http::run(args))
}
