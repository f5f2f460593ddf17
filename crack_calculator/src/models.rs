use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::fields::{flexible_date, optional_price};

pub const GALLONS_PER_BARREL: f64 = 42.0;

pub const CRUDE_LEG: &str = "Crude";
pub const GASOLINE_LEG: &str = "RBOB";
pub const DISTILLATE_LEG: &str = "Distillate";

/// One settlement row as it appears in an input table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceObservation {
    #[serde(with = "flexible_date")]
    pub date: NaiveDate,
    pub symbol: String,
    pub delivery_month: String,
    // Empty, NA-style and NaN cells are missing, and drop out at alignment
    #[serde(with = "optional_price")]
    pub price: Option<f64>,
    pub units: String,
    // Read but never converted; inputs are assumed to be USD
    pub currency: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceUnit {
    UsdPerBarrel,
    UsdPerGallon,
    UsdPerMetricTon,
}

impl PriceUnit {
    /// Match a unit string case-insensitively. Surrounding whitespace is not stripped.
    pub fn parse(units: &str) -> Option<Self> {
        match units.to_lowercase().as_str() {
            "usd/bbl" | "usd per bbl" | "usd per barrel" => Some(PriceUnit::UsdPerBarrel),
            "usd/gal" | "usd per gallon" => Some(PriceUnit::UsdPerGallon),
            "usd/mt" | "usd/ton" | "usd/tonne" => Some(PriceUnit::UsdPerMetricTon),
            _ => None,
        }
    }
}

/// An input row plus its price in USD per barrel.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedObservation {
    pub observation: PriceObservation,
    pub price_usd_per_bbl: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegPoint {
    pub date: NaiveDate,
    pub delivery_month: String,
    pub price: Option<f64>,
}

/// A named price series feeding one slot of the spread formulas.
#[derive(Debug, Clone, PartialEq)]
pub struct LegSeries {
    pub name: String,
    pub points: Vec<LegPoint>,
}

impl LegSeries {
    pub fn new(name: impl Into<String>, points: Vec<LegPoint>) -> Self {
        Self {
            name: name.into(),
            points,
        }
    }

    /// Project normalized rows down to the join key and canonical price.
    pub fn from_normalized(name: impl Into<String>, rows: &[NormalizedObservation]) -> Self {
        let points = rows
            .iter()
            .map(|row| LegPoint {
                date: row.observation.date,
                delivery_month: row.observation.delivery_month.clone(),
                price: row.price_usd_per_bbl,
            })
            .collect();
        Self::new(name, points)
    }
}

/// A joined row; `prices` follows the leg order of the join.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedRow {
    pub date: NaiveDate,
    pub delivery_month: String,
    pub prices: Vec<Option<f64>>,
}

impl AlignedRow {
    pub fn is_complete(&self) -> bool {
        self.prices.iter().all(|p| p.is_some())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CrackRow {
    pub date: NaiveDate,
    pub delivery_month: String,
    pub prices: Vec<f64>,
    pub crack_1_1_gasoline: f64,
    pub crack_1_1_distillate: f64,
    pub crack_3_2_1: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CrackTable {
    pub leg_names: Vec<String>,
    pub rows: Vec<CrackRow>,
}

impl CrackTable {
    /// Price of the named leg in a given row, if that leg was part of the join.
    pub fn price(&self, row: &CrackRow, leg: &str) -> Option<f64> {
        self.leg_names
            .iter()
            .position(|name| name == leg)
            .and_then(|idx| row.prices.get(idx).copied())
    }

    pub fn header(&self) -> Vec<String> {
        let mut header = vec!["date".to_string(), "delivery_month".to_string()];
        header.extend(self.leg_names.iter().cloned());
        header.extend(
            ["crack_1_1_gasoline", "crack_1_1_distillate", "crack_3_2_1"]
                .iter()
                .map(|s| s.to_string()),
        );
        header
    }
}
