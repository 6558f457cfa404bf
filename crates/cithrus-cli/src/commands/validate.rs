//! Config validation command.

use std::path::PathBuf;

use anyhow::Context;
use cithrus_components::ComponentRegistry;
use cithrus_config::PipelineConfig;
use clap::Args;

#[derive(Args)]
pub struct ValidateArgs {
    /// Pipeline config file (TOML)
    #[arg(value_name = "CONFIG")]
    config: PathBuf,
}

pub fn run(args: ValidateArgs) -> anyhow::Result<()> {
    let config = PipelineConfig::load(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;
    let registry = ComponentRegistry::new();

    match config.validate(&registry) {
        Ok(()) => {
            println!("{}: OK", args.config.display());
            for (i, stage) in config.stages.iter().enumerate() {
                println!("  {i}: {}", stage.kind);
            }
            Ok(())
        }
        Err(err) => {
            let errors = err.into_vec();
            println!("{}: {} problem(s)", args.config.display(), errors.len());
            for e in &errors {
                println!("  - {e}");
            }
            anyhow::bail!("{} is not a valid pipeline", args.config.display())
        }
    }
}
