pub mod holding;
pub mod portfolio;
pub mod quote;
