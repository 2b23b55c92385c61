use std::path::PathBuf;

use anyhow::Result;
use typetree_generator_api::GeneratorBackend;

pub use rabex;

pub mod assets;
pub mod config;
pub mod env;
pub mod error;
pub mod extract;
pub mod handle;
pub mod node;
pub mod output;
pub mod package;
pub mod records;
pub mod resolver;
pub mod scratch;
pub mod unity;

mod typetree_generator_cache;

pub use assets::GameAssets;
pub use config::ExtractConfig;
pub use env::Environment;
pub use error::{ExtractError, FieldError};
pub use extract::{Container, Extractor, ScriptObjectSource};
pub use package::{PackageFiles, PackagePayloads};
pub use records::Extracted;
pub use resolver::EnvResolver;

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub package: PathBuf,
    pub output: PathBuf,
    pub config: ExtractConfig,
}

/// Reads the package, extracts all four collections and writes them to
/// [`RunOptions::output`]. Nothing is written unless extraction succeeds.
pub fn run(options: &RunOptions) -> Result<()> {
    let payloads = PackagePayloads::read(&options.package)?;
    let assets = GameAssets::load(payloads, GeneratorBackend::AssetsTools)?;

    let extracted = Extractor::new(&assets, &options.config).extract_all()?;
    drop(assets);

    extracted.write_to(&options.output)
}
