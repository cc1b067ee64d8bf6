// src/fetch/pages.rs
//! Accumulates the rows of a paginated table (e.g. driven by a browser
//! session) into one set of header and body rows.

use std::collections::VecDeque;
use tracing::{debug, info};

use crate::error::Result;
use crate::html::{extract_compiled, CompiledSelectors, TableSelectors};
use crate::table::{BodyRow, HeaderRow};

/// Something that yields the markup of successive pages of one table.
///
/// Implementations own whatever session they need and release it on drop.
#[allow(async_fn_in_trait)]
pub trait PageSource {
    /// The next page, or `None` once the table is exhausted.
    async fn next_page(&mut self) -> Result<Option<String>>;
}

/// Pages already held in memory.
#[derive(Debug, Default, Clone)]
pub struct PreloadedPages(VecDeque<String>);

impl PreloadedPages {
    pub fn new<I: IntoIterator<Item = String>>(pages: I) -> Self {
        Self(pages.into_iter().collect())
    }
}

impl PageSource for PreloadedPages {
    async fn next_page(&mut self) -> Result<Option<String>> {
        Ok(self.0.pop_front())
    }
}

/// Drains `source`, keeping the header rows of the first page and the body
/// rows of every page in order.
///
/// `source` is consumed so it is dropped, and its session released, however
/// this returns.
pub async fn accumulate_rows<S: PageSource>(
    mut source: S,
    selectors: &TableSelectors,
) -> Result<(Vec<HeaderRow>, Vec<BodyRow>)> {
    let compiled = CompiledSelectors::compile(selectors)?;
    let mut headers: Option<Vec<HeaderRow>> = None;
    let mut body = Vec::new();
    let mut pages = 0usize;

    while let Some(markup) = source.next_page().await? {
        let (page_headers, page_body) = extract_compiled(&markup, &compiled)?;
        pages += 1;
        debug!(page = pages, rows = page_body.len(), "page extracted");
        headers.get_or_insert(page_headers);
        body.extend(page_body);
    }

    info!(pages, rows = body.len(), "pages accumulated");
    Ok((headers.unwrap_or_default(), body))
}
