use anyhow::{bail, Context, Result};
use std::{env, path::PathBuf};
use stockscraper::{
    chart::PriceChart,
    config::Config,
    fetch::{
        dividends::fetch_dividends,
        prices::{fetch_daily_prices, OutputSize},
        statements::{FinancialStatement, PeriodType, StatementType},
    },
};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

const USAGE: &str = "\
usage:
  stockscraper statement <symbol> <income-statement|balance-sheet|cash-flow> [quarterly|annual]
  stockscraper dividends <symbol>
  stockscraper prices <symbol> [compact|full]
  stockscraper chart <symbol> <out.json> [compact|full]

config: STOCKSCRAPER_CONFIG=<file.yaml>, ALPHAVANTAGE_API_KEY, NASDAQ_BASE_URL, ...";

#[derive(Debug, PartialEq)]
enum Command {
    Statement {
        symbol: String,
        statement: StatementType,
        period: PeriodType,
    },
    Dividends {
        symbol: String,
    },
    Prices {
        symbol: String,
        size: OutputSize,
    },
    Chart {
        symbol: String,
        out: PathBuf,
        size: OutputSize,
    },
}

impl Command {
    fn parse(args: &[&str]) -> Result<Self> {
        Ok(match args {
            ["statement", symbol, statement, rest @ ..] if rest.len() <= 1 => Self::Statement {
                symbol: symbol.to_string(),
                statement: statement.parse()?,
                period: rest.first().copied().unwrap_or("quarterly").parse()?,
            },
            ["dividends", symbol] => Self::Dividends {
                symbol: symbol.to_string(),
            },
            ["prices", symbol, rest @ ..] if rest.len() <= 1 => Self::Prices {
                symbol: symbol.to_string(),
                size: rest.first().copied().unwrap_or("compact").parse()?,
            },
            ["chart", symbol, out, rest @ ..] if rest.len() <= 1 => Self::Chart {
                symbol: symbol.to_string(),
                out: PathBuf::from(out),
                size: rest.first().copied().unwrap_or("compact").parse()?,
            },
            _ => bail!("{USAGE}"),
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,stockscraper=info"));
    fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    // ─── 2) arguments ────────────────────────────────────────────────
    let args: Vec<String> = env::args().skip(1).collect();
    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    let command = Command::parse(&args)?;

    // ─── 3) config + client ──────────────────────────────────────────
    let config_path = env::var("STOCKSCRAPER_CONFIG").ok().map(PathBuf::from);
    let config = Config::load(config_path.as_deref())?;
    let client = config.http_client()?;

    // ─── 4) dispatch ─────────────────────────────────────────────────
    match command {
        Command::Statement {
            symbol,
            statement,
            period,
        } => {
            let table = FinancialStatement::new(client, &config, symbol.as_str())?
                .with_period_type(period)
                .fetch(statement)
                .await
                .with_context(|| format!("fetching {statement} for {symbol}"))?;
            print_json(&table)?;
        }
        Command::Dividends { symbol } => {
            let history = fetch_dividends(&client, &config.nasdaq_base_url, &symbol)
                .await
                .with_context(|| format!("fetching dividends for {symbol}"))?;
            print_json(&history)?;
        }
        Command::Prices { symbol, size } => {
            let series = fetch_daily_prices(&client, &config, &symbol, size)
                .await
                .with_context(|| format!("fetching prices for {symbol}"))?;
            print_json(&series)?;
        }
        Command::Chart { symbol, out, size } => {
            let series = fetch_daily_prices(&client, &config, &symbol, size)
                .await
                .with_context(|| format!("fetching prices for {symbol}"))?;
            // dividend markers are optional
            let dividends = match fetch_dividends(&client, &config.nasdaq_base_url, &symbol).await {
                Ok(d) => Some(d),
                Err(e) => {
                    error!(%symbol, error = %e, "dividends unavailable; charting prices only");
                    None
                }
            };
            PriceChart::build(&symbol, &series, dividends.as_ref(), true).write_json(&out)?;
        }
    }

    info!("done");
    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("serializing output")?;
    println!("{json}");
    Ok(())
}
