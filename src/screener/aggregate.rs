use std::collections::HashMap;

use crate::model::{OptionContract, StockSummary};

/// Group contracts by underlying symbol, preserving encounter order, then
/// rank the groups by contract count (largest first).
///
/// Insertion order is tracked explicitly with a parallel vec + index map
/// rather than relying on any map's iteration order. The final sort is
/// stable (std `sort_by`), so symbols with equal counts keep their
/// first-encounter order.
///
/// Every input contract lands in exactly one summary, in its original
/// relative position, so the summary counts always sum to the input length.
pub fn group_by_symbol(contracts: Vec<OptionContract>) -> Vec<StockSummary> {
    let mut summaries: Vec<StockSummary> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for contract in contracts {
        match index.get(&contract.symbol) {
            Some(&i) => summaries[i].push(contract),
            None => {
                index.insert(contract.symbol.clone(), summaries.len());
                summaries.push(StockSummary::seed(contract));
            }
        }
    }

    summaries.sort_by(|a, b| b.contract_count.cmp(&a.contract_count));
    summaries
}
