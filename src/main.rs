use anyhow::Result;

use valuation_prep::config::{self, Config};
use valuation_prep::{logging, pipeline, report};

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    if config::wants_help(&args) {
        print!("{}", config::USAGE);
        return Ok(());
    }

    logging::init_logging();
    let config = Config::from_env_and_args(&args);
    let summary = pipeline::run(&config)?;
    report::print_summary(&summary);

    Ok(())
}
