use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One daily close. A price series is a `Vec<PricePoint>` ascending by date;
/// a series shorter than an indicator's window is valid partial input.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}
