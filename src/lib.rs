pub mod errors;
pub mod external;
pub mod logging;
pub mod models;
pub mod services;

pub use errors::EngineError;
pub use models::{
    AnalystRecommendation, CrossSignal, Fundamentals, Holding, HoldingValuation, IndicatorSet,
    MarketSnapshot, PortfolioReport, PricePoint, ScoreResult, ScreeningOutcome, Tier,
};
pub use services::portfolio::Portfolio;
