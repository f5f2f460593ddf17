use crate::error::{Error, Result};
use crate::models::{
    AlignedRow, CrackRow, CrackTable, LegSeries, CRUDE_LEG, DISTILLATE_LEG, GASOLINE_LEG,
};
use chrono::NaiveDate;
use log::{debug, info, warn};
use std::collections::BTreeMap;

/// Outer-joined legs before the completeness filter.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedTable {
    pub leg_names: Vec<String>,
    pub rows: Vec<AlignedRow>,
}

type JoinKey = (NaiveDate, String);

/// Full outer join of every leg on `(date, delivery_month)`, sorted ascending by key.
///
/// `legs` behaves like an insertion-ordered mapping: a repeated name replaces
/// the earlier series but keeps its first column position. A key repeated
/// within a leg fans out into one row per combination, as a relational join would.
pub fn align_legs(legs: &[LegSeries]) -> AlignedTable {
    let mut columns: Vec<&LegSeries> = Vec::with_capacity(legs.len());
    for leg in legs {
        match columns.iter().position(|c| c.name == leg.name) {
            Some(idx) => columns[idx] = leg,
            None => columns.push(leg),
        }
    }

    let width = columns.len();
    let mut joined: BTreeMap<JoinKey, Vec<Vec<Option<f64>>>> = BTreeMap::new();
    for (col, leg) in columns.iter().enumerate() {
        for point in &leg.points {
            let key = (point.date, point.delivery_month.clone());
            joined.entry(key).or_insert_with(|| vec![Vec::new(); width])[col].push(point.price);
        }
    }

    let mut rows = Vec::with_capacity(joined.len());
    for ((date, delivery_month), per_leg) in joined {
        for prices in combinations(&per_leg) {
            rows.push(AlignedRow {
                date,
                delivery_month: delivery_month.clone(),
                prices,
            });
        }
    }

    AlignedTable {
        leg_names: columns.iter().map(|c| c.name.clone()).collect(),
        rows,
    }
}

/// Cartesian product across legs; a leg with no value for the key contributes one gap.
fn combinations(per_leg: &[Vec<Option<f64>>]) -> Vec<Vec<Option<f64>>> {
    let mut combos: Vec<Vec<Option<f64>>> = vec![Vec::with_capacity(per_leg.len())];
    for values in per_leg {
        let choices: &[Option<f64>] = if values.is_empty() { &[None] } else { values.as_slice() };
        combos = combos
            .into_iter()
            .flat_map(|prefix| {
                choices.iter().map(move |value| {
                    let mut row = prefix.clone();
                    row.push(*value);
                    row
                })
            })
            .collect();
    }
    combos
}

/// Align the legs, keep only keys every leg prices, and derive the crack spreads.
///
/// The formulas reference the "Crude", "RBOB" and "Distillate" legs by name;
/// if any of them is absent the call fails even when no rows would survive.
pub fn compute_cracks(legs: &[LegSeries]) -> Result<CrackTable> {
    let aligned = align_legs(legs);
    let joined_rows = aligned.rows.len();

    let complete: Vec<AlignedRow> = aligned
        .rows
        .into_iter()
        .filter(AlignedRow::is_complete)
        .collect();

    let dropped = joined_rows - complete.len();
    if dropped > 0 {
        warn!(
            "Dropped {} of {} aligned rows with at least one missing leg",
            dropped, joined_rows
        );
    }

    let leg_names = aligned.leg_names;
    let column = |name: &str| {
        leg_names
            .iter()
            .position(|n| n == name)
            .ok_or_else(|| Error::MissingLeg(name.to_string()))
    };
    let crude = column(CRUDE_LEG)?;
    let gasoline = column(GASOLINE_LEG)?;
    let distillate = column(DISTILLATE_LEG)?;

    let rows: Vec<CrackRow> = complete
        .into_iter()
        .map(|row| {
            let prices: Vec<f64> = row.prices.into_iter().flatten().collect();
            let (c, g, d) = (prices[crude], prices[gasoline], prices[distillate]);
            CrackRow {
                date: row.date,
                delivery_month: row.delivery_month,
                crack_1_1_gasoline: g - c,
                crack_1_1_distillate: d - c,
                crack_3_2_1: (2.0 * g + d - 3.0 * c) / 3.0,
                prices,
            }
        })
        .collect();

    debug!("Legs in join: {:?}", leg_names);
    info!("Computed crack spreads for {} rows", rows.len());

    Ok(CrackTable { leg_names, rows })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LegPoint;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn leg(name: &str, points: &[(u32, &str, f64)]) -> LegSeries {
        LegSeries::new(
            name,
            points
                .iter()
                .map(|(d, month, price)| LegPoint {
                    date: day(*d),
                    delivery_month: month.to_string(),
                    price: Some(*price),
                })
                .collect(),
        )
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_three_leg_scenario() {
        let legs = vec![
            leg("Crude", &[(1, "2024-02", 75.0)]),
            leg("RBOB", &[(1, "2024-02", 2.40 * 42.0)]),
            leg("Distillate", &[(1, "2024-02", 2.60 * 42.0)]),
        ];
        let table = compute_cracks(&legs).unwrap();
        assert_eq!(table.leg_names, vec!["Crude", "RBOB", "Distillate"]);
        assert_eq!(table.rows.len(), 1);

        let row = &table.rows[0];
        assert!(close(row.crack_1_1_gasoline, 25.8));
        assert!(close(row.crack_1_1_distillate, 34.2));
        assert!(close(row.crack_3_2_1, 28.6));
    }

    #[test]
    fn test_partial_key_is_dropped() {
        let legs = vec![
            leg("Crude", &[(1, "2024-02", 75.0), (2, "2024-02", 76.0)]),
            leg("RBOB", &[(1, "2024-02", 100.0), (2, "2024-02", 101.0)]),
            leg("Distillate", &[(1, "2024-02", 110.0)]),
        ];
        let aligned = align_legs(&legs);
        assert_eq!(aligned.rows.len(), 2);
        assert_eq!(aligned.rows[1].prices, vec![Some(76.0), Some(101.0), None]);

        let table = compute_cracks(&legs).unwrap();
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0].date, day(1));
    }

    #[test]
    fn test_missing_canonical_price_is_dropped() {
        let mut rbob = leg("RBOB", &[(1, "2024-02", 100.0)]);
        rbob.points[0].price = None;
        let legs = vec![
            leg("Crude", &[(1, "2024-02", 75.0)]),
            rbob,
            leg("Distillate", &[(1, "2024-02", 110.0)]),
        ];
        assert!(compute_cracks(&legs).unwrap().rows.is_empty());
    }

    #[test]
    fn test_rows_sorted_by_date_then_month() {
        let points = [
            (3, "2024-03", 1.0),
            (1, "2024-03", 2.0),
            (1, "2024-02", 3.0),
            (2, "2024-02", 4.0),
        ];
        let legs = vec![
            leg("Crude", &points),
            leg("RBOB", &points),
            leg("Distillate", &points),
        ];
        let table = compute_cracks(&legs).unwrap();
        let keys: Vec<(NaiveDate, &str)> = table
            .rows
            .iter()
            .map(|r| (r.date, r.delivery_month.as_str()))
            .collect();
        assert_eq!(
            keys,
            vec![
                (day(1), "2024-02"),
                (day(1), "2024-03"),
                (day(2), "2024-02"),
                (day(3), "2024-03"),
            ]
        );
    }

    #[test]
    fn test_leg_order_is_commutative() {
        let crude = leg("Crude", &[(1, "2024-02", 75.0), (2, "2024-02", 74.0), (2, "2024-03", 73.0)]);
        let rbob = leg("RBOB", &[(1, "2024-02", 100.8), (2, "2024-02", 99.0)]);
        let dist = leg("Distillate", &[(1, "2024-02", 109.2), (2, "2024-02", 108.0), (2, "2024-03", 107.0)]);

        let forward = compute_cracks(&[crude.clone(), rbob.clone(), dist.clone()]).unwrap();
        let reversed = compute_cracks(&[dist, rbob, crude]).unwrap();

        assert_eq!(forward.rows.len(), reversed.rows.len());
        for (a, b) in forward.rows.iter().zip(&reversed.rows) {
            assert_eq!((a.date, &a.delivery_month), (b.date, &b.delivery_month));
            for name in ["Crude", "RBOB", "Distillate"] {
                assert_eq!(forward.price(a, name), reversed.price(b, name));
            }
            assert!(close(a.crack_1_1_gasoline, b.crack_1_1_gasoline));
            assert!(close(a.crack_1_1_distillate, b.crack_1_1_distillate));
            assert!(close(a.crack_3_2_1, b.crack_3_2_1));
        }
    }

    #[test]
    fn test_missing_leg_errors_even_without_rows() {
        let legs = vec![leg("Crude", &[(1, "2024-02", 75.0)]), leg("RBOB", &[])];
        match compute_cracks(&legs) {
            Err(Error::MissingLeg(name)) => assert_eq!(name, "Distillate"),
            other => panic!("expected missing leg, got {:?}", other),
        }
        assert!(matches!(compute_cracks(&[]), Err(Error::MissingLeg(_))));
    }

    #[test]
    fn test_duplicate_keys_fan_out() {
        let legs = vec![
            leg("Crude", &[(1, "2024-02", 75.0), (1, "2024-02", 76.0)]),
            leg("RBOB", &[(1, "2024-02", 100.0)]),
            leg("Distillate", &[(1, "2024-02", 110.0), (1, "2024-02", 111.0)]),
        ];
        let table = compute_cracks(&legs).unwrap();
        assert_eq!(table.rows.len(), 4);
    }

    #[test]
    fn test_repeated_leg_name_replaces_in_place() {
        let legs = vec![
            leg("Crude", &[(1, "2024-02", 1.0)]),
            leg("RBOB", &[(1, "2024-02", 100.0)]),
            leg("Distillate", &[(1, "2024-02", 110.0)]),
            leg("Crude", &[(1, "2024-02", 75.0)]),
        ];
        let table = compute_cracks(&legs).unwrap();
        assert_eq!(table.leg_names, vec!["Crude", "RBOB", "Distillate"]);
        assert_eq!(table.rows[0].prices, vec![75.0, 100.0, 110.0]);
    }

    #[test]
    fn test_extra_leg_joins_and_filters() {
        let legs = vec![
            leg("Crude", &[(1, "2024-02", 75.0), (2, "2024-02", 75.0)]),
            leg("RBOB", &[(1, "2024-02", 100.0), (2, "2024-02", 100.0)]),
            leg("Distillate", &[(1, "2024-02", 110.0), (2, "2024-02", 110.0)]),
            leg("Brent", &[(2, "2024-02", 80.0)]),
        ];
        let table = compute_cracks(&legs).unwrap();
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.price(&table.rows[0], "Brent"), Some(80.0));
        assert_eq!(table.header().len(), 9);
    }
}
