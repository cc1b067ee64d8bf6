// src/fetch/statements.rs
//! Quarterly / annual financial statements from the Nasdaq financials pages.

use reqwest::Client;
use std::{fmt, str::FromStr};
use tracing::{info, instrument};
use url::Url;

use super::{base_url, get_text, join};
use crate::config::Config;
use crate::error::{Result, ScrapeError};
use crate::html::{extract_table, TableSelectors};
use crate::table::{normalize_table, EmptyTablePolicy, NormalizedTable};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementType {
    IncomeStatement,
    BalanceSheet,
    CashFlow,
}

impl StatementType {
    /// Value of the `query` parameter on the financials page.
    pub fn slug(self) -> &'static str {
        match self {
            Self::IncomeStatement => "income-statement",
            Self::BalanceSheet => "balance-sheet",
            Self::CashFlow => "cash-flow",
        }
    }
}

impl fmt::Display for StatementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for StatementType {
    type Err = ScrapeError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "income-statement" => Ok(Self::IncomeStatement),
            "balance-sheet" => Ok(Self::BalanceSheet),
            "cash-flow" => Ok(Self::CashFlow),
            other => Err(ScrapeError::InvalidArgument(format!(
                "statement type should be one of \"income-statement\", \"balance-sheet\" or \"cash-flow\", got {other:?}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PeriodType {
    #[default]
    Quarterly,
    Annual,
}

impl PeriodType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Quarterly => "quarterly",
            Self::Annual => "annual",
        }
    }
}

impl fmt::Display for PeriodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PeriodType {
    type Err = ScrapeError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "quarterly" => Ok(Self::Quarterly),
            "annual" => Ok(Self::Annual),
            _ => Err(ScrapeError::InvalidArgument(
                "period type should be either \"quarterly\" or \"annual\"".into(),
            )),
        }
    }
}

/// The three statements of one company, for one period type.
#[derive(Debug, Clone)]
pub struct FinancialStatement {
    client: Client,
    base: Url,
    policy: EmptyTablePolicy,
    symbol: String,
    period_type: PeriodType,
}

impl FinancialStatement {
    pub fn new(client: Client, config: &Config, symbol: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client,
            base: base_url(&config.nasdaq_base_url)?,
            policy: config.empty_table_policy,
            symbol: symbol.into(),
            period_type: PeriodType::default(),
        })
    }

    pub fn with_period_type(mut self, period_type: PeriodType) -> Self {
        self.period_type = period_type;
        self
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn period_type(&self) -> PeriodType {
        self.period_type
    }

    /// Switches between `"quarterly"` and `"annual"`; anything else is rejected
    /// and leaves the current period type in place.
    pub fn set_period_type(&mut self, period: &str) -> Result<()> {
        self.period_type = period.parse()?;
        Ok(())
    }

    pub async fn income_statement(&self) -> Result<NormalizedTable> {
        self.fetch(StatementType::IncomeStatement).await
    }

    pub async fn balance_sheet(&self) -> Result<NormalizedTable> {
        self.fetch(StatementType::BalanceSheet).await
    }

    pub async fn cashflow_statement(&self) -> Result<NormalizedTable> {
        self.fetch(StatementType::CashFlow).await
    }

    pub fn url(&self, statement: StatementType) -> Result<Url> {
        let mut url = join(
            &self.base,
            &format!("symbol/{}/financials", self.symbol.to_lowercase()),
        )?;
        url.query_pairs_mut()
            .append_pair("query", statement.slug())
            .append_pair("data", self.period_type.as_str());
        Ok(url)
    }

    #[instrument(level = "info", skip(self), fields(symbol = %self.symbol, period = %self.period_type))]
    pub async fn fetch(&self, statement: StatementType) -> Result<NormalizedTable> {
        let url = self.url(statement)?;
        let body = get_text(&self.client, &url).await?;
        let table = parse_statement_page(&body, self.policy)?;
        info!(periods = table.len(), "statement normalized");
        Ok(table)
    }
}

/// Extracts and normalizes the statement table of a financials page.
pub fn parse_statement_page(markup: &str, policy: EmptyTablePolicy) -> Result<NormalizedTable> {
    let (headers, body) = extract_table(markup, &TableSelectors::nasdaq_financials())?;
    normalize_table(&headers, &body, policy)
}
