pub mod options;
pub mod screener;
pub mod sweep;
pub mod trades;
