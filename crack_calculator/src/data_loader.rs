use crate::error::{Error, Result};
use crate::models::{CrackTable, PriceObservation};
use log::debug;
use std::path::Path;

/// Load one settlement table. Columns are matched by header name; extras are ignored.
pub fn read_price_table(path: impl AsRef<Path>) -> Result<Vec<PriceObservation>> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).map_err(|source| Error::InputRead {
        path: path.to_path_buf(),
        source,
    })?;

    let mut reader = csv::ReaderBuilder::new().has_headers(true).from_reader(file);
    let rows = reader
        .deserialize::<PriceObservation>()
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|source| Error::InputFormat {
            path: path.to_path_buf(),
            source,
        })?;

    debug!("Read {} rows from {}", rows.len(), path.display());
    Ok(rows)
}

/// Write the crack table with a header row and no index column.
pub fn write_crack_table(path: impl AsRef<Path>, table: &CrackTable) -> Result<()> {
    let path = path.as_ref();
    let wrap = |source: csv::Error| Error::OutputWrite {
        path: path.to_path_buf(),
        source,
    };

    let mut writer = csv::Writer::from_path(path).map_err(wrap)?;
    writer.write_record(table.header()).map_err(wrap)?;

    for row in &table.rows {
        let mut record = Vec::with_capacity(row.prices.len() + 5);
        record.push(row.date.format("%Y-%m-%d").to_string());
        record.push(row.delivery_month.clone());
        record.extend(row.prices.iter().map(|p| format_price(*p)));
        record.push(format_price(row.crack_1_1_gasoline));
        record.push(format_price(row.crack_1_1_distillate));
        record.push(format_price(row.crack_3_2_1));
        writer.write_record(&record).map_err(wrap)?;
    }

    writer.flush().map_err(|e| wrap(e.into()))?;
    Ok(())
}

/// Shortest round-trip form, always with a decimal point (75 -> "75.0").
fn format_price(value: f64) -> String {
    format!("{:?}", value)
}
