// src/fetch/prices.rs
//! Daily OHLCV series from the Alpha Vantage `TIME_SERIES_DAILY` endpoint.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::{collections::BTreeMap, fmt, str::FromStr};
use tracing::{debug, info, instrument, warn};

use super::{base_url, get_text, join, redacted};
use crate::config::Config;
use crate::error::{Result, ScrapeError};

const SERIES_KEY: &str = "Time Series (Daily)";

/// Alpha Vantage numbers its fields: "1. open", "2. high", ...
static FIELD_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[1-5]\. ").expect("field prefix regex should be valid"));

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputSize {
    /// Latest 100 sessions.
    #[default]
    Compact,
    /// Full history.
    Full,
}

impl OutputSize {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Compact => "compact",
            Self::Full => "full",
        }
    }
}

impl fmt::Display for OutputSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputSize {
    type Err = ScrapeError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "compact" => Ok(Self::Compact),
            "full" => Ok(Self::Full),
            other => Err(ScrapeError::InvalidArgument(format!(
                "output size should be either \"compact\" or \"full\", got {other:?}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DailyPrice {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

impl DailyPrice {
    pub fn ohlc_avg(&self) -> f64 {
        (self.open + self.high + self.low + self.close) / 4.0
    }

    pub fn hlc_avg(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }
}

/// Trading day → prices, ascending.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PriceSeries(pub BTreeMap<NaiveDate, DailyPrice>);

impl PriceSeries {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, day: &NaiveDate) -> Option<&DailyPrice> {
        self.0.get(day)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NaiveDate, &DailyPrice)> {
        self.0.iter()
    }
}

#[instrument(level = "info", skip(client, config))]
pub async fn fetch_daily_prices(
    client: &Client,
    config: &Config,
    symbol: &str,
    output_size: OutputSize,
) -> Result<PriceSeries> {
    let api_key = config.alphavantage_api_key.as_deref().ok_or_else(|| {
        ScrapeError::InvalidArgument("ALPHAVANTAGE_API_KEY is not configured".into())
    })?;

    let mut url = join(&base_url(&config.alphavantage_base_url)?, "query")?;
    url.query_pairs_mut()
        .append_pair("function", "TIME_SERIES_DAILY")
        .append_pair("symbol", symbol)
        .append_pair("outputsize", output_size.as_str())
        .append_pair("apikey", api_key);

    let body = get_text(client, &url).await?;
    let series = parse_daily_prices(&body).map_err(|e| match e {
        ScrapeError::UpstreamFetch { reason, .. } => ScrapeError::UpstreamFetch {
            url: redacted(&url),
            reason,
        },
        other => other,
    })?;
    info!(days = series.len(), "daily prices parsed");
    Ok(series)
}

/// Parses a `TIME_SERIES_DAILY` JSON document.
pub fn parse_daily_prices(body: &str) -> Result<PriceSeries> {
    let doc: Value = serde_json::from_str(body)?;
    let Some(days) = doc.get(SERIES_KEY).and_then(Value::as_object) else {
        let reason = ["Error Message", "Note", "Information"]
            .iter()
            .find_map(|k| doc.get(*k).and_then(Value::as_str))
            .map(|msg| format!("no {SERIES_KEY:?} in response: {msg}"))
            .unwrap_or_else(|| format!("no {SERIES_KEY:?} in response"));
        warn!(%reason, "unexpected price payload");
        return Err(ScrapeError::UpstreamFetch {
            url: String::new(),
            reason,
        });
    };

    let mut series = BTreeMap::new();
    for (day, fields) in days {
        let date = NaiveDate::parse_from_str(day, "%Y-%m-%d").map_err(|_| ScrapeError::date(day))?;
        let fields = fields
            .as_object()
            .ok_or_else(|| ScrapeError::Shape(format!("price entry for {day} is not an object")))?;

        let named: BTreeMap<String, &str> = fields
            .iter()
            .filter_map(|(k, v)| Some((FIELD_PREFIX.replace(k, "").into_owned(), v.as_str()?)))
            .collect();
        let price = DailyPrice {
            open: parse_f64(field(&named, day, "open")?)?,
            high: parse_f64(field(&named, day, "high")?)?,
            low: parse_f64(field(&named, day, "low")?)?,
            close: parse_f64(field(&named, day, "close")?)?,
            volume: parse_volume(field(&named, day, "volume")?)?,
        };
        series.insert(date, price);
    }
    debug!(days = series.len(), "price series built");
    Ok(PriceSeries(series))
}

fn field<'a>(named: &BTreeMap<String, &'a str>, day: &str, name: &str) -> Result<&'a str> {
    named
        .get(name)
        .copied()
        .ok_or_else(|| ScrapeError::Shape(format!("price entry for {day} has no {name:?}")))
}

fn parse_f64(text: &str) -> Result<f64> {
    match text.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(ScrapeError::number(text)),
    }
}

// volumes occasionally arrive as "1234.0"
fn parse_volume(text: &str) -> Result<i64> {
    let t = text.trim();
    if let Ok(v) = t.parse::<i64>() {
        return Ok(v);
    }
    match t.parse::<f64>() {
        Ok(v) if v.is_finite()
            && v.fract() == 0.0
            && v >= i64::MIN as f64
            && v < i64::MAX as f64 =>
        {
            Ok(v as i64)
        }
        _ => Err(ScrapeError::number(text)),
    }
}
