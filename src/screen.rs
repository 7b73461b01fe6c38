//! CLI entry point for the `screen` subcommand.

use std::path::Path;

use anyhow::{Context, Result};

use crate::screener::{FilterSpec, HttpOptionsProvider, OptionsProvider, ProviderConfig, compile};

pub fn run(path: &Path, execute: bool) -> Result<()> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let spec: FilterSpec =
        serde_json::from_str(&contents).context("parsing FilterSpec JSON")?;

    let config = ProviderConfig::from_env();
    let request = compile(&spec, &config.page_name, &config.user_id)
        .map_err(|e| anyhow::anyhow!("invalid filter spec: {e}"))?;

    if !execute {
        println!("{}", serde_json::to_string_pretty(&request)?);
        return Ok(());
    }

    let rt = tokio::runtime::Runtime::new().context("creating tokio runtime")?;
    rt.block_on(async {
        let provider = HttpOptionsProvider::new(config);
        let response = provider
            .query(&request)
            .await
            .map_err(|e| anyhow::anyhow!("{e}"))?;

        let total = response.count;
        let stocks = crate::screener::group_by_symbol(response.options);

        println!("{total} contract(s) matched, {} symbol(s):", stocks.len());
        for s in &stocks {
            println!(
                "  {:<6} {:>4} contract(s)  price {:>10.2}  {}",
                s.symbol, s.contract_count, s.stock_price, s.sector
            );
        }
        Ok(())
    })
}
