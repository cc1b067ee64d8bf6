// src/chart/mod.rs
//! Plot description of a price history with dividend markers, written as
//! JSON for whatever front-end draws it.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Serialize;
use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};
use tracing::info;

use crate::fetch::{dividends::DividendHistory, prices::PriceSeries};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    /// OHLC average, the plotted y value.
    pub y: f64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DividendMarker {
    pub date: NaiveDate,
    pub y: f64,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub legend: Vec<String>,
    pub price: Vec<PricePoint>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dividends: Vec<DividendMarker>,
}

impl PriceChart {
    /// Line of daily OHLC averages; with `with_dividends`, a marker sits on
    /// the line at each trading day that is also an ex-dividend date.
    pub fn build(
        symbol: &str,
        prices: &PriceSeries,
        dividends: Option<&DividendHistory>,
        with_dividends: bool,
    ) -> Self {
        let price: Vec<PricePoint> = prices
            .iter()
            .map(|(date, p)| PricePoint {
                date: *date,
                y: p.ohlc_avg(),
                open: p.open,
                high: p.high,
                low: p.low,
                close: p.close,
            })
            .collect();

        let markers: Vec<DividendMarker> = match dividends {
            Some(history) if with_dividends => price
                .iter()
                .filter_map(|pt| {
                    history.get(&pt.date).map(|d| DividendMarker {
                        date: pt.date,
                        y: pt.y,
                        amount: d.amount,
                    })
                })
                .collect(),
            _ => Vec::new(),
        };

        let mut legend = vec!["OHLC AVG".to_string()];
        if !markers.is_empty() {
            legend.push("Dividend".into());
        }

        let title = if symbol.is_empty() {
            "Price".to_string()
        } else {
            format!("{} Price", symbol.to_uppercase())
        };

        Self {
            title,
            x_label: "Date".into(),
            y_label: "Price".into(),
            legend,
            price,
            dividends: markers,
        }
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        let file = File::create(path).with_context(|| format!("creating chart file {:?}", path))?;
        let mut w = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut w, self)
            .with_context(|| format!("writing chart to {:?}", path))?;
        w.flush()?;
        info!(path = %path.display(), points = self.price.len(), markers = self.dividends.len(), "chart written");
        Ok(())
    }
}
