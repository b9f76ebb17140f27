use anyhow::Context;
use tracing::{error, info};

use loadprobe_core::{run_suite, CsvRunSink, RunConfig, SuiteOptions, TestDefinition};
use loadprobe_dataapi::DataApiConnector;

use super::args::Cli;
use crate::exit_codes;

/// Validate inputs, then run every declared test.
///
/// Invalid configuration or test queries end the run before anything is
/// submitted and return [`exit_codes::CONFIG_ERROR`].
pub async fn run(cli: Cli, stamp: &str) -> anyhow::Result<i32> {
    info!("Check arguments");
    info!("- Argument 1 - {}", cli.target);
    info!("- Argument 2 - {}", cli.queries_file.display());

    let cfg = match RunConfig::load(&cli.config, &cli.target) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("- {}", e);
            return Ok(exit_codes::CONFIG_ERROR);
        }
    };

    let tests = match TestDefinition::load(cli.queries_path()) {
        Ok(tests) => tests,
        Err(e) => {
            error!("- {}", e);
            return Ok(exit_codes::CONFIG_ERROR);
        }
    };

    let details_path = cli.output_dir.join(format!("{}.csv", stamp));
    let mut sink = CsvRunSink::create(&details_path)
        .with_context(|| format!("failed to open run details {}", details_path.display()))?;

    let connector = DataApiConnector::from_env();
    let opts = SuiteOptions {
        show_recs: cli.show_recs,
    };
    let outcomes = run_suite(&cfg, &tests, &connector, &mut sink, &opts).await?;

    info!(
        tests = outcomes.len(),
        details = %sink.path().display(),
        "Run complete"
    );
    Ok(exit_codes::SUCCESS)
}
