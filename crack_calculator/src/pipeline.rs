use crate::calculator::compute_cracks;
use crate::config::{Configuration, DEFAULT_CONFIG_PATH};
use crate::data_loader::{read_price_table, write_crack_table};
use crate::error::{Error, Result};
use crate::models::{CRUDE_LEG, DISTILLATE_LEG, GASOLINE_LEG};
use crate::normalizer::normalize_leg;
use log::info;
use std::path::PathBuf;

pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_OUT_DIR: &str = "out";
pub const DEFAULT_OUTPUT_FILE: &str = "cracks_by_month.csv";

/// One input table and the leg name it feeds.
#[derive(Debug, Clone, PartialEq)]
pub struct LegSource {
    pub name: String,
    pub file: String,
}

impl LegSource {
    pub fn new(name: &str, file: &str) -> Self {
        Self {
            name: name.to_string(),
            file: file.to_string(),
        }
    }
}

/// Locations for a pipeline run. `Default` is the fixed working-directory layout.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineSettings {
    pub config_path: PathBuf,
    pub data_dir: PathBuf,
    pub out_dir: PathBuf,
    pub output_file: String,
    pub legs: Vec<LegSource>,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            out_dir: PathBuf::from(DEFAULT_OUT_DIR),
            output_file: DEFAULT_OUTPUT_FILE.to_string(),
            legs: vec![
                LegSource::new(CRUDE_LEG, "CL_settlements.csv"),
                LegSource::new(GASOLINE_LEG, "RB_settlements.csv"),
                LegSource::new(DISTILLATE_LEG, "HO_settlements.csv"),
            ],
        }
    }
}

impl PipelineSettings {
    pub fn output_path(&self) -> PathBuf {
        self.out_dir.join(&self.output_file)
    }
}

/// Run the whole pipeline and return the path of the table written.
///
/// The first error aborts the run; the output file is only created once every
/// leg has been read, normalized and aligned.
pub fn run_pipeline(settings: &PipelineSettings) -> Result<PathBuf> {
    std::fs::create_dir_all(&settings.out_dir).map_err(|source| Error::OutputDir {
        path: settings.out_dir.clone(),
        source,
    })?;

    let config = Configuration::load(&settings.config_path)?;
    info!("Loaded config from {}", settings.config_path.display());

    let mut legs = Vec::with_capacity(settings.legs.len());
    for source in &settings.legs {
        let path = settings.data_dir.join(&source.file);
        let table = read_price_table(&path)?;
        info!("{}: {} rows from {}", source.name, table.len(), path.display());
        legs.push(normalize_leg(&source.name, &table, &config)?);
    }

    let cracks = compute_cracks(&legs)?;

    let output_path = settings.output_path();
    write_crack_table(&output_path, &cracks)?;
    info!("Wrote {} rows to {}", cracks.rows.len(), output_path.display());

    Ok(output_path)
}
