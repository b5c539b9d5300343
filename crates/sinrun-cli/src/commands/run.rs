//! Run command - one forward pass through the model.

use std::path::{Path, PathBuf};

use clap::Args;
use tracing::info;

use sinrun_core::{AutoLoader, HarnessConfig, InferenceHarness, InputConfig};

use super::config::load_config;

/// Arguments for the run command.
#[derive(Args, Default)]
pub struct RunArgs {
    /// Model bundle directory
    #[arg(short, long)]
    model_dir: Option<PathBuf>,

    /// Meta graph tag to load
    #[arg(short, long)]
    tag: Option<String>,

    /// Name of the input operation
    #[arg(long)]
    input_op: Option<String>,

    /// Name of the output operation
    #[arg(long)]
    output_op: Option<String>,

    /// Comma-separated input values, fed as an [n, 1] column
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    values: Option<Vec<f32>>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Fail when any output differs from sin(x) by more than this
    #[arg(long)]
    tolerance: Option<f64>,

    /// Do not list the graph's operations
    #[arg(long)]
    no_list_operations: bool,
}

#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Plain text, as printed by the original demo
    #[default]
    Text,
    /// JSON report
    Json,
}

impl RunArgs {
    fn apply(self, config: &mut HarnessConfig) {
        if let Some(dir) = self.model_dir {
            config.model.export_dir = dir;
        }
        if let Some(tag) = self.tag {
            config.model.tag = tag;
        }
        if let Some(input) = self.input_op {
            config.operations.input = input;
        }
        if let Some(output) = self.output_op {
            config.operations.output = output;
        }
        if let Some(values) = self.values {
            config.input = InputConfig::column(values);
        }
        if self.tolerance.is_some() {
            config.report.tolerance = self.tolerance;
        }
        if self.no_list_operations {
            config.report.list_operations = false;
        }
    }
}

pub fn run(args: RunArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let mut config = load_config(config_path)?;
    let format = args.format;
    args.apply(&mut config);

    info!(
        "Running {} -> {} on {}",
        config.operations.input,
        config.operations.output,
        config.model.export_dir.display()
    );

    let harness = InferenceHarness::new(AutoLoader::new(), config)?;
    let report = harness.execute()?;

    match format {
        OutputFormat::Text => print!("{}", report),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    if let Some(tolerance) = harness.config().report.tolerance {
        report.check_tolerance(tolerance)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_config() {
        let args = RunArgs {
            model_dir: Some(PathBuf::from("/models/sine")),
            values: Some(vec![1.0, 2.0, 3.0]),
            tolerance: Some(0.01),
            no_list_operations: true,
            ..RunArgs::default()
        };

        let mut config = HarnessConfig::default();
        args.apply(&mut config);

        assert_eq!(config.model.export_dir, PathBuf::from("/models/sine"));
        assert_eq!(config.model.tag, "serve");
        assert_eq!(config.input.shape, vec![3, 1]);
        assert_eq!(config.report.tolerance, Some(0.01));
        assert!(!config.report.list_operations);
    }

    #[test]
    fn test_defaults_leave_config_untouched() {
        let mut config = HarnessConfig::default();
        RunArgs::default().apply(&mut config);
        assert_eq!(config, HarnessConfig::default());
    }
}
