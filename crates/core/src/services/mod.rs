pub mod holdings_service;
pub mod portfolio_service;
pub mod quote_service;
