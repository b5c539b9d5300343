//! Ops command - list the operations of a model graph.

use std::path::{Path, PathBuf};

use clap::Args;

use sinrun_core::{AutoLoader, InferenceHarness};

use super::config::load_config;

/// Arguments for the ops command.
#[derive(Args)]
pub struct OpsArgs {
    /// Model bundle directory
    #[arg(short, long)]
    model_dir: Option<PathBuf>,

    /// Meta graph tag to load
    #[arg(short, long)]
    tag: Option<String>,
}

pub fn run(args: OpsArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let mut config = load_config(config_path)?;
    if let Some(dir) = args.model_dir {
        config.model.export_dir = dir;
    }
    if let Some(tag) = args.tag {
        config.model.tag = tag;
    }

    let harness = InferenceHarness::new(AutoLoader::new(), config)?;
    let operations = harness.list_operations()?;

    println!("=== All Operations in the Graph ===");
    for name in &operations {
        println!("Operation found: {}", name);
    }
    println!("=== End ===");

    Ok(())
}
