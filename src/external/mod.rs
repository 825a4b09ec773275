pub mod market_provider;
pub mod rate_limit;
pub mod yahoo;
