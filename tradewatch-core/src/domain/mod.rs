//! Domain types for the disclosure watch pipeline

pub mod trade;

pub use trade::TradeRecord;
