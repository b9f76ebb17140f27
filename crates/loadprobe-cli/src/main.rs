use clap::Parser;
use tracing::error;

mod cli;
pub mod exit_codes;
mod logging;

use cli::args::Cli;
use cli::run::run;

#[tokio::main(flavor = "multi_thread")]
async fn main() {
    let cli = Cli::parse();
    let stamp = logging::run_stamp();
    if let Err(e) = logging::init(&cli.log_dir, &stamp) {
        eprintln!("fatal: {e:?}");
        std::process::exit(exit_codes::RUN_FAILED);
    }

    let code = match run(cli, &stamp).await {
        Ok(code) => code,
        Err(e) => {
            error!("fatal: {e:#}");
            exit_codes::RUN_FAILED
        }
    };
    std::process::exit(code);
}
