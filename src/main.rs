use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use phi_info::{ExtractConfig, RunOptions};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "phi-info")]
#[command(about = "Extracts song, collection, avatar and tip data from a Phigros package", version)]
struct Args {
    /// Path to the game package (.apk)
    package: PathBuf,

    /// Directory the JSON files are written to
    #[arg(short, long, env = "PHI_INFO_OUTPUT", default_value = "output")]
    output: PathBuf,

    /// Key of the localized strings read for the collection
    #[arg(long, env = "PHI_INFO_LANGUAGE", default_value = "chinese")]
    language: String,

    /// Language id of the tips block to copy
    #[arg(long, env = "PHI_INFO_TIPS_LANGUAGE_ID", default_value_t = 40)]
    tips_language_id: i64,
}

const DEFAULT_LOG_FILTER: &str = "phi_info=info";

fn main() -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let args = Args::parse();

    phi_info::run(&RunOptions {
        package: args.package,
        output: args.output,
        config: ExtractConfig {
            language: args.language,
            tips_language_id: args.tips_language_id,
        },
    })
}
