use crate::config::AnalyzerConfig;
use color_eyre::eyre::{Context, Result};
use log::info;
use std::fs::File;
use std::path::Path;

/// Load and validate analyzer configuration from a YAML file
pub fn load_config(config_path: &Path) -> Result<AnalyzerConfig> {
    info!("Loading configuration from: {:?}", config_path);

    let file = File::open(config_path)
        .with_context(|| format!("Failed to open config file: {}", config_path.display()))?;

    let config: AnalyzerConfig = serde_yaml::from_reader(file)
        .with_context(|| format!("Failed to parse config file: {}", config_path.display()))?;

    config.validate()?;

    Ok(config)
}

/// CLI arguments that override YAML settings
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub time_resolution: Option<f64>,
    pub output_dir: Option<String>,
}

/// Apply CLI overrides to a loaded configuration
pub fn apply_overrides(config: &mut AnalyzerConfig, overrides: &CliOverrides) -> Result<()> {
    if let Some(resolution) = overrides.time_resolution {
        info!("Time resolution overridden from command line: {}s", resolution);
        config.time_resolution = resolution;
    }

    if let Some(ref output_dir) = overrides.output_dir {
        config.output_dir = output_dir.clone();
    }

    // Re-validate after applying overrides
    config.validate()?;

    Ok(())
}
