use anyhow::Result;
use clap::Parser;
use crack_calculator::{run_pipeline, PipelineSettings};
use log::info;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "crack_pipeline")]
#[command(about = "Normalize CL/RB/HO settlements to USD/bbl and compute crack spreads")]
struct Args {
    /// Configuration document
    #[arg(long, default_value = crack_calculator::config::DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Directory holding the settlement CSVs
    #[arg(long, default_value = crack_calculator::pipeline::DEFAULT_DATA_DIR)]
    data_dir: PathBuf,

    /// Directory receiving cracks_by_month.csv
    #[arg(long, default_value = crack_calculator::pipeline::DEFAULT_OUT_DIR)]
    out_dir: PathBuf,
}

impl Args {
    fn into_settings(self) -> PipelineSettings {
        PipelineSettings {
            config_path: self.config,
            data_dir: self.data_dir,
            out_dir: self.out_dir,
            ..PipelineSettings::default()
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let settings = Args::parse().into_settings();

    info!("Starting crack spread pipeline");
    let output = run_pipeline(&settings)?;

    println!("Saved: {}", output.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_arguments_is_default_layout() {
        let settings = Args::parse_from(["crack_pipeline"]).into_settings();
        assert_eq!(settings, PipelineSettings::default());
    }

    #[test]
    fn test_directory_overrides() {
        let settings =
            Args::parse_from(["crack_pipeline", "--data-dir", "/tmp/in", "--out-dir", "/tmp/out"])
                .into_settings();
        assert_eq!(settings.data_dir, PathBuf::from("/tmp/in"));
        assert_eq!(settings.output_path(), PathBuf::from("/tmp/out/cracks_by_month.csv"));
        assert_eq!(settings.legs.len(), 3);
    }
}
