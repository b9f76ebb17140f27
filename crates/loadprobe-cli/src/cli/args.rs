use clap::Parser;
use std::path::PathBuf;

use loadprobe_core::SHOW_RECS;

#[derive(Parser, Debug)]
#[command(
    name = "loadprobe",
    version,
    about = "Submit SQL batches to the Redshift Data API repeatedly and report timings"
)]
pub struct Cli {
    /// Configuration target in the config file
    pub target: String,

    /// File name in the test queries directory
    pub queries_file: PathBuf,

    #[arg(long, default_value = "config.yml")]
    pub config: PathBuf,

    #[arg(long, default_value = "test_queries")]
    pub queries_dir: PathBuf,

    /// Directory for run log files
    #[arg(long, default_value = "logs")]
    pub log_dir: PathBuf,

    /// Directory for run details CSV files
    #[arg(long, default_value = "run_details")]
    pub output_dir: PathBuf,

    /// Rows shown per sample
    #[arg(long, default_value_t = SHOW_RECS)]
    pub show_recs: usize,
}

impl Cli {
    pub fn queries_path(&self) -> PathBuf {
        self.queries_dir.join(&self.queries_file)
    }
}
