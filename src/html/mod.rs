// src/html/mod.rs
//! Pulls header and body rows out of an HTML table as plain text cells.

use scraper::{ElementRef, Html, Selector};
use tracing::{debug, trace};

use crate::error::{Result, ScrapeError};
use crate::table::{BodyRow, HeaderRow};

/// CSS selectors locating a table and its cells.
///
/// Row selectors are evaluated relative to `container`; cell selectors
/// relative to each row.
#[derive(Debug, Clone)]
pub struct TableSelectors {
    pub container: String,
    pub header_rows: String,
    pub header_cells: String,
    pub body_rows: String,
    pub label_cells: String,
    pub data_cells: String,
}

impl TableSelectors {
    /// Layout of the Nasdaq financial statement pages.
    pub fn nasdaq_financials() -> Self {
        Self {
            container: ".genTable".into(),
            header_rows: "table > thead > tr".into(),
            header_cells: "th".into(),
            body_rows: "table > tbody > tr".into(),
            label_cells: "th".into(),
            data_cells: "td".into(),
        }
    }
}

/// [`TableSelectors`] parsed once so they can be reused across pages.
#[derive(Debug, Clone)]
pub struct CompiledSelectors {
    container: Selector,
    header_rows: Selector,
    header_cells: Selector,
    body_rows: Selector,
    label_cells: Selector,
    data_cells: Selector,
}

impl CompiledSelectors {
    pub fn compile(selectors: &TableSelectors) -> Result<Self> {
        Ok(Self {
            container: parse_selector(&selectors.container)?,
            header_rows: parse_selector(&selectors.header_rows)?,
            header_cells: parse_selector(&selectors.header_cells)?,
            body_rows: parse_selector(&selectors.body_rows)?,
            label_cells: parse_selector(&selectors.label_cells)?,
            data_cells: parse_selector(&selectors.data_cells)?,
        })
    }
}

pub(crate) fn parse_selector(css: &str) -> Result<Selector> {
    Selector::parse(css)
        .map_err(|e| ScrapeError::InvalidArgument(format!("bad CSS selector {css:?}: {e:?}")))
}

/// Concatenated, trimmed text of an element.
pub(crate) fn cell_text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

/// Extracts header and body rows from the first element matching the
/// container selector.
pub fn extract_table(
    markup: &str,
    selectors: &TableSelectors,
) -> Result<(Vec<HeaderRow>, Vec<BodyRow>)> {
    let compiled = CompiledSelectors::compile(selectors)?;
    extract_compiled(markup, &compiled)
}

pub(crate) fn extract_compiled(
    markup: &str,
    sel: &CompiledSelectors,
) -> Result<(Vec<HeaderRow>, Vec<BodyRow>)> {
    let doc = Html::parse_document(markup);
    let container = doc
        .select(&sel.container)
        .next()
        .ok_or_else(|| ScrapeError::Shape("table container not found in page".into()))?;

    let headers: Vec<HeaderRow> = container
        .select(&sel.header_rows)
        .map(|tr| tr.select(&sel.header_cells).map(cell_text).collect())
        .collect();

    let body: Vec<BodyRow> = container
        .select(&sel.body_rows)
        .map(|tr| BodyRow {
            labels: tr.select(&sel.label_cells).map(cell_text).collect(),
            cells: tr.select(&sel.data_cells).map(cell_text).collect(),
        })
        .collect();

    debug!(header_rows = headers.len(), body_rows = body.len(), "extracted table");
    trace!(?headers, "header rows");
    Ok((headers, body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{normalize_table, EmptyTablePolicy};
    use chrono::NaiveDate;
    use tracing_subscriber::{EnvFilter, FmtSubscriber};

    fn init_test_logging() {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new("info,stockscraper=debug")),
            )
            .with_test_writer()
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    }

    const STATEMENT_PAGE: &str = r#"
<html><body>
<div class="genTable">
  <table>
    <thead>
      <tr><th>Annual Income Statement (values in 000's)</th></tr>
      <tr><th>Period Ending:</th><th></th><th>12/31/2019</th><th>12/31/2018</th><th>12/31/2017</th></tr>
    </thead>
    <tbody>
      <tr><th>Operating Revenue</th><td></td><td></td><td></td><td></td></tr>
      <tr><th>Total Revenue</th><td></td><td>$260,174,000</td><td>$265,595,000</td><td>$229,234,000</td></tr>
      <tr><th>Net Income</th><td></td><td>$55,256,000</td><td>--</td><td>$48,351,000</td></tr>
      <tr><th>Other Income</th><td></td><td>($1,807,000)</td><td>$2,005,000</td><td>($2,745,000)</td></tr>
      <tr><td colspan="5">&nbsp;</td></tr>
    </tbody>
  </table>
</div>
</body></html>
"#;

    #[test]
    fn extracts_header_and_body_text() {
        let (headers, body) =
            extract_table(STATEMENT_PAGE, &TableSelectors::nasdaq_financials()).unwrap();
        assert_eq!(headers.len(), 2);
        assert_eq!(
            headers[1],
            vec!["Period Ending:", "", "12/31/2019", "12/31/2018", "12/31/2017"]
        );
        assert_eq!(body.len(), 5);
        assert_eq!(body[1].labels, vec!["Total Revenue"]);
        assert_eq!(body[1].cells[1], "$260,174,000");
        assert!(body[4].labels.is_empty());
    }

    #[test]
    fn page_feeds_normalizer() {
        init_test_logging();
        let (headers, body) =
            extract_table(STATEMENT_PAGE, &TableSelectors::nasdaq_financials()).unwrap();
        let table = normalize_table(&headers, &body, EmptyTablePolicy::Strict).unwrap();

        let d = |y| NaiveDate::from_ymd_opt(y, 12, 31).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.value(&d(2019), "Total Revenue"), Some(260_174_000.0));
        assert_eq!(table.value(&d(2017), "Other Income"), Some(-2_745_000.0));
        // "--" is filtered, so the 2017 value shifts left onto 2018
        assert_eq!(table.value(&d(2018), "Net Income"), Some(48_351_000.0));
        assert_eq!(table.value(&d(2017), "Net Income"), None);
        assert_eq!(table.value(&d(2019), "Operating Revenue"), None);
    }

    #[test]
    fn missing_container_is_shape_error() {
        let err = extract_table(
            "<html><p>Symbol not found</p></html>",
            &TableSelectors::nasdaq_financials(),
        )
        .unwrap_err();
        assert!(matches!(err, ScrapeError::Shape(_)));
    }

    #[test]
    fn bad_selector_is_rejected() {
        let mut selectors = TableSelectors::nasdaq_financials();
        selectors.body_rows = "tr[".into();
        assert!(matches!(
            extract_table(STATEMENT_PAGE, &selectors),
            Err(ScrapeError::InvalidArgument(_))
        ));
    }
}
