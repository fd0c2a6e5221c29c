pub mod registry;
pub mod symbols;
pub mod traits;

// Provider implementations
pub mod google_finance;
pub mod yahoo_finance;
