use log::debug;

use crate::config::{Configuration, MassFactorLookup};
use crate::error::{Error, Result};
use crate::models::{
    LegSeries, NormalizedObservation, PriceObservation, PriceUnit, GALLONS_PER_BARREL,
};

/// Express every row's price in USD per barrel.
///
/// Mass-priced rows divide by a barrels-per-metric-ton factor. Under the
/// default lookup that factor is `universe.products[2]`, whichever symbol the
/// row carries. Any unrecognized unit string aborts the whole table.
pub fn normalize_prices(
    table: &[PriceObservation],
    config: &Configuration,
) -> Result<Vec<NormalizedObservation>> {
    let mut factors = MassFactors::new(config);

    table
        .iter()
        .map(|row| {
            let unit = PriceUnit::parse(&row.units).ok_or_else(|| Error::UnrecognizedUnit {
                units: row.units.clone(),
            })?;

            // NaN counts as missing so the row drops at alignment
            let price = row.price.filter(|p| !p.is_nan());
            let price_usd_per_bbl = match unit {
                PriceUnit::UsdPerBarrel => price,
                PriceUnit::UsdPerGallon => price.map(|p| p * GALLONS_PER_BARREL),
                PriceUnit::UsdPerMetricTon => {
                    let factor = factors.resolve(&row.symbol)?;
                    price.map(|p| p / factor)
                }
            };

            // FX is an identity step: currency is assumed to already be USD
            Ok(NormalizedObservation {
                observation: row.clone(),
                price_usd_per_bbl,
            })
        })
        .collect()
}

/// Normalize a table and project it to a named leg.
pub fn normalize_leg(
    name: &str,
    table: &[PriceObservation],
    config: &Configuration,
) -> Result<LegSeries> {
    let normalized = normalize_prices(table, config)?;
    debug!("Normalized {} rows for leg {}", normalized.len(), name);
    Ok(LegSeries::from_normalized(name, &normalized))
}

/// Resolves mass conversion factors on first use, so a config without one only
/// fails when a mass-priced row is actually present.
struct MassFactors<'a> {
    config: &'a Configuration,
    lookup: Option<MassFactorLookup>,
    global: Option<f64>,
}

impl<'a> MassFactors<'a> {
    fn new(config: &'a Configuration) -> Self {
        Self {
            config,
            lookup: None,
            global: None,
        }
    }

    fn resolve(&mut self, symbol: &str) -> Result<f64> {
        let lookup = match &self.lookup {
            Some(lookup) => lookup.clone(),
            None => {
                let lookup = self.config.mass_factor_lookup()?;
                self.lookup = Some(lookup.clone());
                lookup
            }
        };

        match lookup {
            MassFactorLookup::BySymbol => self.config.bbl_per_metric_ton_for_symbol(symbol),
            MassFactorLookup::ProductIndex(index) => {
                if let Some(factor) = self.global {
                    return Ok(factor);
                }
                let factor = self.config.bbl_per_metric_ton_at(index)?;
                debug!("Using bbl_per_metric_ton {} from products[{}]", factor, index);
                self.global = Some(factor);
                Ok(factor)
            }
        }
    }
}
