// src/table/mod.rs
//! Turns a semi-structured financial table (text cells pulled out of HTML)
//! into a date-indexed numeric table.
//!
//! The pipeline is three pure steps:
//! 1. [`extract_columns`] finds the period-end labels in the header rows,
//! 2. [`extract_rows`] keeps the currency cells of every body row, aligned
//!    by position to those labels,
//! 3. [`normalize`] parses labels into dates and cells into signed floats.
//!
//! [`normalize_table`] runs all three under an [`EmptyTablePolicy`].

use chrono::NaiveDate;
use serde::{ser::SerializeMap, Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use tracing::{debug, trace};

use crate::error::{Result, ScrapeError};

pub mod columns;
pub mod date_parser;
pub mod normalize;
pub mod rows;

pub use columns::extract_columns;
pub use normalize::{normalize, parse_accounting_value};
pub use rows::{align_by_position, extract_rows};

/// The text cells of one `<thead>` row.
pub type HeaderRow = Vec<String>;

/// One `<tbody>` row: its `th` label cells and `td` data cells, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BodyRow {
    pub labels: Vec<String>,
    pub cells: Vec<String>,
}

impl BodyRow {
    pub fn new<L, C>(labels: L, cells: C) -> Self
    where
        L: IntoIterator,
        L::Item: Into<String>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        Self {
            labels: labels.into_iter().map(Into::into).collect(),
            cells: cells.into_iter().map(Into::into).collect(),
        }
    }
}

/// A labelled row whose `cells[i]` belongs to `RawTable::columns[i]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    pub label: String,
    pub cells: Vec<String>,
}

/// Column labels plus the rows aligned to them; still all text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    pub columns: Vec<String>,
    pub rows: Vec<RawRow>,
}

/// Row label → value for a single period, in row appearance order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PeriodValues(Vec<(String, f64)>);

impl PeriodValues {
    /// Sets `label`, keeping its original position if it was already present.
    pub fn insert(&mut self, label: &str, value: f64) {
        match self.0.iter_mut().find(|(l, _)| l == label) {
            Some(slot) => slot.1 = value,
            None => self.0.push((label.to_string(), value)),
        }
    }

    pub fn get(&self, label: &str) -> Option<f64> {
        self.0.iter().find(|(l, _)| l == label).map(|(_, v)| *v)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(l, v)| (l.as_str(), *v))
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(l, _)| l.as_str())
    }
}

impl Serialize for PeriodValues {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (label, value) in &self.0 {
            map.serialize_entry(label, value)?;
        }
        map.end()
    }
}

/// Period end date → row values; iteration is ascending by date.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct NormalizedTable {
    columns: BTreeMap<NaiveDate, PeriodValues>,
}

impl NormalizedTable {
    pub fn get(&self, period: &NaiveDate) -> Option<&PeriodValues> {
        self.columns.get(period)
    }

    pub fn value(&self, period: &NaiveDate, label: &str) -> Option<f64> {
        self.columns.get(period).and_then(|values| values.get(label))
    }

    pub fn periods(&self) -> impl Iterator<Item = &NaiveDate> {
        self.columns.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NaiveDate, &PeriodValues)> {
        self.columns.iter()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub(crate) fn period_mut(&mut self, period: NaiveDate) -> &mut PeriodValues {
        self.columns.entry(period).or_default()
    }
}

/// What to do when no header row carries the "ending" marker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmptyTablePolicy {
    /// Fail with [`ScrapeError::Shape`].
    Strict,
    /// Treat the table as having no periods and return it empty.
    #[default]
    Lenient,
}

impl std::str::FromStr for EmptyTablePolicy {
    type Err = ScrapeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "lenient" => Ok(Self::Lenient),
            other => Err(ScrapeError::InvalidArgument(format!(
                "empty table policy should be either \"strict\" or \"lenient\", got {other:?}"
            ))),
        }
    }
}

/// Runs column extraction, row extraction and normalization in one go.
pub fn normalize_table(
    header_rows: &[HeaderRow],
    body_rows: &[BodyRow],
    policy: EmptyTablePolicy,
) -> Result<NormalizedTable> {
    let columns = extract_columns(header_rows);
    if columns.is_empty() {
        return match policy {
            EmptyTablePolicy::Strict => Err(ScrapeError::Shape(format!(
                "no header row containing \"ending\" among {} header rows",
                header_rows.len()
            ))),
            EmptyTablePolicy::Lenient => {
                debug!(header_rows = header_rows.len(), "no period header; empty table");
                Ok(NormalizedTable::default())
            }
        };
    }
    trace!(?columns, "period columns");

    let raw = extract_rows(body_rows, &columns);
    debug!(
        columns = raw.columns.len(),
        rows = raw.rows.len(),
        "extracted raw table"
    );
    normalize(&raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn headers() -> Vec<HeaderRow> {
        vec![
            vec!["Trend".into()],
            vec![
                "Period Ending:".into(),
                "".into(),
                "3/31/2020".into(),
                "12/31/2019".into(),
            ],
        ]
    }

    #[test]
    fn worked_example() {
        let body = vec![BodyRow::new(["Total Revenue"], ["", "$100", "($50)"])];
        let table = normalize_table(&headers(), &body, EmptyTablePolicy::Strict).unwrap();

        let periods: Vec<_> = table.periods().copied().collect();
        assert_eq!(periods, vec![ymd(2019, 12, 31), ymd(2020, 3, 31)]);
        assert_eq!(table.value(&ymd(2020, 3, 31), "Total Revenue"), Some(100.0));
        assert_eq!(table.value(&ymd(2019, 12, 31), "Total Revenue"), Some(-50.0));
    }

    #[test]
    fn missing_marker_follows_policy() {
        let headers = vec![vec!["Quarter".to_string(), "".into(), "3/31/2020".into()]];
        let body = vec![BodyRow::new(["Total Revenue"], ["", "$100"])];

        let lenient = normalize_table(&headers, &body, EmptyTablePolicy::Lenient).unwrap();
        assert!(lenient.is_empty());

        let strict = normalize_table(&headers, &body, EmptyTablePolicy::Strict);
        assert!(matches!(strict, Err(ScrapeError::Shape(_))));
    }

    #[test]
    fn bad_cell_fails_whole_table() {
        let body = vec![
            BodyRow::new(["Total Revenue"], ["", "$100", "$90"]),
            BodyRow::new(["Net Income"], ["", "$n/a", "$5"]),
        ];
        let err = normalize_table(&headers(), &body, EmptyTablePolicy::Lenient).unwrap_err();
        assert!(matches!(err, ScrapeError::Parse { .. }));
    }

    #[test]
    fn serializes_in_date_then_row_order() {
        let body = vec![
            BodyRow::new(["Total Revenue"], ["", "$100", "$90"]),
            BodyRow::new(["Cost of Revenue"], ["", "$60", "$55"]),
        ];
        let table = normalize_table(&headers(), &body, EmptyTablePolicy::Lenient).unwrap();
        let json = serde_json::to_string(&table).unwrap();
        assert_eq!(
            json,
            r#"{"2019-12-31":{"Total Revenue":90.0,"Cost of Revenue":55.0},"2020-03-31":{"Total Revenue":100.0,"Cost of Revenue":60.0}}"#
        );
    }

    #[test]
    fn policy_from_str() {
        assert_eq!("Strict".parse::<EmptyTablePolicy>().unwrap(), EmptyTablePolicy::Strict);
        assert_eq!(" lenient ".parse::<EmptyTablePolicy>().unwrap(), EmptyTablePolicy::Lenient);
        assert!("maybe".parse::<EmptyTablePolicy>().is_err());
    }
}
