//! Configuration document loading.
//!
//! The document is kept as a raw nested mapping; callers pull the few values
//! they need through the accessors below.

use std::path::Path;

use crate::error::{Error, Result};

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Position in `universe.products` whose factor converts every mass-priced row.
pub const DEFAULT_MASS_FACTOR_INDEX: usize = 2;

/// How the barrels-per-metric-ton factor is chosen for a mass-priced row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MassFactorLookup {
    /// One global factor from a fixed list position, ignoring the row's symbol.
    ProductIndex(usize),
    /// The factor of the product whose `symbol` equals the row's symbol.
    BySymbol,
}

impl Default for MassFactorLookup {
    fn default() -> Self {
        MassFactorLookup::ProductIndex(DEFAULT_MASS_FACTOR_INDEX)
    }
}

#[derive(Debug, Clone)]
pub struct Configuration {
    document: toml::Table,
}

impl Configuration {
    /// Read the document at `path` and parse it with [`Configuration::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text).map_err(|source| Error::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml_str(text: &str) -> std::result::Result<Self, toml::de::Error> {
        Ok(Self {
            document: text.parse::<toml::Table>()?,
        })
    }

    pub fn products(&self) -> Result<&[toml::Value]> {
        self.document
            .get("universe")
            .and_then(|u| u.get("products"))
            .and_then(|p| p.as_array())
            .map(|p| p.as_slice())
            .ok_or_else(|| Error::config_key("universe.products"))
    }

    pub fn bbl_per_metric_ton_at(&self, index: usize) -> Result<f64> {
        let key = format!("universe.products[{}].bbl_per_metric_ton", index);
        self.products()?
            .get(index)
            .and_then(|product| product.get("bbl_per_metric_ton"))
            .and_then(as_number)
            .ok_or_else(|| Error::config_key(key))
    }

    pub fn bbl_per_metric_ton_for_symbol(&self, symbol: &str) -> Result<f64> {
        self.products()?
            .iter()
            .find(|product| product.get("symbol").and_then(|s| s.as_str()) == Some(symbol))
            .and_then(|product| product.get("bbl_per_metric_ton"))
            .and_then(as_number)
            .ok_or_else(|| {
                Error::config_key(format!(
                    "universe.products[symbol = {:?}].bbl_per_metric_ton",
                    symbol
                ))
            })
    }

    /// Reads `normalization.mass_factor_lookup` ("index" or "symbol") and
    /// `normalization.mass_factor_index`. Both are optional.
    pub fn mass_factor_lookup(&self) -> Result<MassFactorLookup> {
        let section = match self.document.get("normalization") {
            Some(section) => section,
            None => return Ok(MassFactorLookup::default()),
        };

        let mode = match section.get("mass_factor_lookup") {
            None => "index",
            Some(value) => value
                .as_str()
                .ok_or_else(|| Error::config_key("normalization.mass_factor_lookup"))?,
        };

        match mode {
            "index" => {
                let index = match section.get("mass_factor_index") {
                    None => DEFAULT_MASS_FACTOR_INDEX,
                    Some(value) => value
                        .as_integer()
                        .and_then(|i| usize::try_from(i).ok())
                        .ok_or_else(|| Error::config_key("normalization.mass_factor_index"))?,
                };
                Ok(MassFactorLookup::ProductIndex(index))
            }
            "symbol" => Ok(MassFactorLookup::BySymbol),
            other => Err(Error::config_key(format!(
                "normalization.mass_factor_lookup = {:?}",
                other
            ))),
        }
    }
}

fn as_number(value: &toml::Value) -> Option<f64> {
    match value {
        toml::Value::Float(f) => Some(*f),
        toml::Value::Integer(i) => Some(*i as f64),
        _ => None,
    }
}
