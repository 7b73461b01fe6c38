use serde::Serialize;

use super::contract::OptionContract;

/// All contracts for one underlying symbol, plus stock-level fields copied
/// from the first contract encountered for that symbol. Derived by the
/// aggregation engine, never persisted.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockSummary {
    pub symbol: String,
    pub contract_count: usize,
    pub stock_price: f64,
    pub market_cap: f64,
    pub sector: String,
    pub industry: String,
    pub rating: f64,
    /// Contracts in their original encounter order.
    pub options: Vec<OptionContract>,
}

impl StockSummary {
    /// Seed a summary from the first contract seen for a symbol.
    pub fn seed(contract: OptionContract) -> Self {
        StockSummary {
            symbol: contract.symbol.clone(),
            contract_count: 1,
            stock_price: contract.stock_price,
            market_cap: contract.market_cap,
            sector: contract.sector.clone(),
            industry: contract.industry.clone(),
            rating: contract.rating,
            options: vec![contract],
        }
    }

    /// Fold a later contract for the same symbol into the summary.
    /// Stock-level fields are not refreshed; first-seen wins.
    pub fn push(&mut self, contract: OptionContract) {
        self.contract_count += 1;
        self.options.push(contract);
    }
}
