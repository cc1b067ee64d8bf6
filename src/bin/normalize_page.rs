use anyhow::{Context, Result};
use std::env;
use std::fs;
use stockscraper::{
    html::{extract_table, TableSelectors},
    table::{normalize_table, EmptyTablePolicy},
};

fn main() -> Result<()> {
    // Expect a saved statement page and an optional policy
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 || args.len() > 3 {
        eprintln!("Usage: {} <statement_page.html> [strict|lenient]", args[0]);
        std::process::exit(1);
    }
    let path = &args[1];
    let policy: EmptyTablePolicy = match args.get(2) {
        Some(p) => p.parse()?,
        None => EmptyTablePolicy::Lenient,
    };

    let markup = fs::read_to_string(path).with_context(|| format!("reading {}", path))?;
    let (headers, body) = extract_table(&markup, &TableSelectors::nasdaq_financials())?;
    let table = normalize_table(&headers, &body, policy)?;

    println!("{}", serde_json::to_string_pretty(&table)?);
    Ok(())
}
