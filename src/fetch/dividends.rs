// src/fetch/dividends.rs
//! Dividend history from the Nasdaq dividend-history page.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use reqwest::Client;
use scraper::{Html, Selector};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{info, instrument, trace};

use super::{base_url, get_text, join};
use crate::error::{Result, ScrapeError};
use crate::html::cell_text;
use crate::table::{
    date_parser::{parse_period_date, parse_us_date},
    parse_accounting_value,
};

static GRID: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("#quotes_content_left_dividendhistoryGrid")
        .expect("dividend grid selector should be valid")
});
static ROWS: Lazy<Selector> =
    Lazy::new(|| Selector::parse("tbody > tr").expect("row selector should be valid"));
static FIELDS: Lazy<Selector> =
    Lazy::new(|| Selector::parse("span").expect("span selector should be valid"));

/// ex-date, amount, declaration, record, payment
const FIELDS_PER_ROW: usize = 5;

/// One dividend payment, keyed elsewhere by its ex-dividend date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dividend {
    pub amount: f64,
    pub declaration_date: Option<NaiveDate>,
    pub record_date: Option<NaiveDate>,
    pub payment_date: Option<NaiveDate>,
}

pub type DividendHistory = BTreeMap<NaiveDate, Dividend>;

#[instrument(level = "info", skip(client, nasdaq_base_url))]
pub async fn fetch_dividends(
    client: &Client,
    nasdaq_base_url: &str,
    symbol: &str,
) -> Result<DividendHistory> {
    let base = base_url(nasdaq_base_url)?;
    let url = join(
        &base,
        &format!("symbol/{}/dividend-history", symbol.to_lowercase()),
    )?;
    let body = get_text(client, &url).await?;
    let history = parse_dividend_history(&body)?;
    info!(count = history.len(), "dividends parsed");
    Ok(history)
}

/// Parses the dividend grid. Ex-date and amount must be valid; the other
/// dates fall back to `None` when they are not `MM/DD/YYYY`.
pub fn parse_dividend_history(markup: &str) -> Result<DividendHistory> {
    let doc = Html::parse_document(markup);
    let grid = doc
        .select(&GRID)
        .next()
        .ok_or_else(|| ScrapeError::Shape("dividend history grid not found in page".into()))?;

    let mut history = DividendHistory::new();
    for (idx, tr) in grid.select(&ROWS).enumerate() {
        let fields: Vec<String> = tr.select(&FIELDS).map(cell_text).collect();
        let [ex_date, amount, declared, record, paid] = <[String; FIELDS_PER_ROW]>::try_from(fields)
            .map_err(|fields| {
                ScrapeError::Shape(format!(
                    "dividend row {idx} has {} fields, expected {FIELDS_PER_ROW}",
                    fields.len()
                ))
            })?;

        let ex_date = parse_period_date(&ex_date)?;
        let dividend = Dividend {
            amount: parse_accounting_value(&amount)?,
            declaration_date: parse_us_date(&declared),
            record_date: parse_us_date(&record),
            payment_date: parse_us_date(&paid),
        };
        trace!(%ex_date, ?dividend, "dividend row");
        history.insert(ex_date, dividend);
    }
    Ok(history)
}
