use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;

use super::{align_by_position, date_parser::parse_period_date, NormalizedTable, RawTable};
use crate::error::{Result, ScrapeError};

/// Accounting notation for a negative amount: the whole value in parentheses.
static ACCOUNTING_NEGATIVE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\((?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+)\)$")
        .expect("accounting negative regex should be valid")
});

/// Parses a currency cell such as `"$1,234.56"` or `"($1,234.56)"`.
pub fn parse_accounting_value(text: &str) -> Result<f64> {
    let stripped: String = text.chars().filter(|c| !matches!(c, '$' | ',')).collect();
    let stripped = stripped.trim();
    let negative = ACCOUNTING_NEGATIVE.is_match(stripped);

    let digits: String = stripped.chars().filter(|c| !matches!(c, '(' | ')')).collect();
    let value: f64 = digits
        .trim()
        .parse()
        .map_err(|_| ScrapeError::number(text))?;
    // f64::from_str also takes "inf"/"NaN"
    if !value.is_finite() {
        return Err(ScrapeError::number(text));
    }

    Ok(if negative { -value } else { value })
}

/// Parses every column label and every cell of `raw`.
///
/// All labels become periods, even ones no row has a value for. The first
/// unparsable label or cell fails the whole table, as do two labels naming
/// the same date.
pub fn normalize(raw: &RawTable) -> Result<NormalizedTable> {
    let mut seen: BTreeMap<NaiveDate, &str> = BTreeMap::new();
    let mut periods = Vec::with_capacity(raw.columns.len());
    for label in &raw.columns {
        let period = parse_period_date(label)?;
        if let Some(first) = seen.insert(period, label) {
            return Err(ScrapeError::Shape(format!(
                "column labels {first:?} and {label:?} both name period {period}"
            )));
        }
        periods.push(period);
    }

    let mut table = NormalizedTable::default();
    for period in &periods {
        table.period_mut(*period);
    }

    for row in &raw.rows {
        for (period, cell) in align_by_position(&periods, &row.cells) {
            let value = parse_accounting_value(cell)?;
            table.period_mut(*period).insert(&row.label, value);
        }
    }

    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParseKind;
    use crate::table::RawRow;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn currency_values() {
        assert_eq!(parse_accounting_value("$1,234.56").unwrap(), 1234.56);
        assert_eq!(parse_accounting_value(" $12 ").unwrap(), 12.0);
        assert_eq!(parse_accounting_value("$0").unwrap(), 0.0);
        assert_eq!(parse_accounting_value("$1,000,000").unwrap(), 1_000_000.0);
    }

    #[test]
    fn accounting_negatives() {
        assert_eq!(parse_accounting_value("($1,234.56)").unwrap(), -1234.56);
        assert_eq!(parse_accounting_value("($50)").unwrap(), -50.0);
        assert_eq!(parse_accounting_value("$(7,000)").unwrap(), -7000.0);
        assert_eq!(parse_accounting_value("(50.)").unwrap(), -50.0);
        assert_eq!(parse_accounting_value("$(.5)").unwrap(), -0.5);
        assert_eq!(parse_accounting_value("$.5").unwrap(), 0.5);
    }

    #[test]
    fn non_numeric_cells_fail() {
        for bad in ["$", "$n/a", "$--", "", "$1.2.3", "$inf", "$NaN"] {
            match parse_accounting_value(bad) {
                Err(ScrapeError::Parse { kind, text }) => {
                    assert_eq!(kind, ParseKind::Number);
                    assert_eq!(text, bad);
                }
                other => panic!("expected number parse error for {bad:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn full_grid_has_every_row_in_every_period() {
        let columns: Vec<String> = ["3/31/2020", "12/31/2019", "9/30/2019"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let labels = ["Total Revenue", "Cost of Revenue", "Gross Profit", "Net Income"];
        let raw = RawTable {
            columns: columns.clone(),
            rows: labels
                .iter()
                .enumerate()
                .map(|(i, label)| RawRow {
                    label: label.to_string(),
                    cells: (0..columns.len())
                        .map(|j| format!("${},{:03}", i + 1, j))
                        .collect(),
                })
                .collect(),
        };

        let table = normalize(&raw).unwrap();
        assert_eq!(table.len(), columns.len());
        for (_, values) in table.iter() {
            assert_eq!(values.len(), labels.len());
            assert_eq!(values.labels().collect::<Vec<_>>(), labels);
        }
        assert_eq!(table.value(&ymd(2019, 12, 31), "Gross Profit"), Some(3001.0));
    }

    #[test]
    fn periods_come_out_strictly_ascending() {
        let raw = RawTable {
            columns: vec!["6/30/2019".into(), "12/31/2019".into(), "3/31/2019".into()],
            rows: vec![],
        };
        let table = normalize(&raw).unwrap();
        let periods: Vec<_> = table.periods().copied().collect();
        assert!(periods.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(periods.len(), 3);
        assert!(table.iter().all(|(_, values)| values.is_empty()));
    }

    #[test]
    fn short_row_leaves_trailing_periods_without_value() {
        let raw = RawTable {
            columns: vec!["3/31/2020".into(), "12/31/2019".into()],
            rows: vec![RawRow {
                label: "Net Income".into(),
                cells: vec!["$10".into()],
            }],
        };
        let table = normalize(&raw).unwrap();
        assert_eq!(table.value(&ymd(2020, 3, 31), "Net Income"), Some(10.0));
        assert_eq!(table.value(&ymd(2019, 12, 31), "Net Income"), None);
    }

    #[test]
    fn bad_period_label_fails() {
        let raw = RawTable {
            columns: vec!["3/31/2020".into(), "Trailing".into()],
            rows: vec![],
        };
        assert!(matches!(
            normalize(&raw),
            Err(ScrapeError::Parse {
                kind: ParseKind::Date,
                ..
            })
        ));
    }

    #[test]
    fn labels_naming_the_same_date_fail() {
        let raw = RawTable {
            columns: vec!["3/31/2020".into(), "03/31/2020".into()],
            rows: vec![RawRow {
                label: "Total Revenue".into(),
                cells: vec!["$1".into(), "$2".into()],
            }],
        };
        match normalize(&raw) {
            Err(ScrapeError::Shape(msg)) => {
                assert!(msg.contains("\"3/31/2020\""));
                assert!(msg.contains("\"03/31/2020\""));
            }
            other => panic!("expected shape error, got {other:?}"),
        }
    }
}
