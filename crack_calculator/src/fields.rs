//! Field-level serde helpers for settlement rows.

use chrono::{NaiveDate, NaiveDateTime};

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Cells read as a missing price rather than a parse failure.
const MISSING_PRICE_TOKENS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Parse a settlement date.
///
/// Settlements are daily, so a time component is dropped: two intraday rows
/// for the same contract share one `(date, delivery_month)` key and fan out
/// at alignment instead of staying separate.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
                .map(|dt| dt.date())
        })
}

/// Parse a price cell. Missing-value markers and NaN come back as `Ok(None)`.
pub fn parse_price(value: &str) -> Result<Option<f64>, std::num::ParseFloatError> {
    if MISSING_PRICE_TOKENS.contains(&value) || MISSING_PRICE_TOKENS.contains(&value.trim()) {
        return Ok(None);
    }
    let price: f64 = value.trim().parse()?;
    Ok(if price.is_nan() { None } else { Some(price) })
}

pub(crate) mod flexible_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&date.format("%Y-%m-%d"))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_date(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid date: {:?}", raw)))
    }
}

pub(crate) mod optional_price {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(price: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error> {
        match price {
            Some(p) => serializer.serialize_f64(*p),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<f64>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_price(&raw)
            .map_err(|e| serde::de::Error::custom(format!("invalid price {:?}: {}", raw, e)))
    }
}
