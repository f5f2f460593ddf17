pub mod calculator;
pub mod config;
pub mod data_loader;
pub mod error;
pub mod fields;
pub mod models;
pub mod normalizer;
pub mod pipeline;

pub use calculator::{align_legs, compute_cracks, AlignedTable};
pub use config::{Configuration, MassFactorLookup};
pub use data_loader::{read_price_table, write_crack_table};
pub use error::{Error, Result};
pub use models::{CrackRow, CrackTable, LegPoint, LegSeries, NormalizedObservation, PriceObservation, PriceUnit};
pub use normalizer::{normalize_leg, normalize_prices};
pub use pipeline::{run_pipeline, LegSource, PipelineSettings};
