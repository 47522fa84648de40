use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Bucket key for records that carry no region.
pub const UNKNOWN_REGION: &str = "unknown";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sale {
    pub date: NaiveDate,
    pub product: String,
    pub quantity: u64,
    pub unit_price: Decimal,
    pub region: Option<String>,
}

impl Sale {
    pub fn revenue(&self) -> Decimal {
        Decimal::from(self.quantity) * self.unit_price
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SalesSummary {
    pub total_revenue: Decimal,
    pub total_quantity: u64,
    pub record_count: u64,
    pub by_product: HashMap<String, Decimal>,
    pub by_region: HashMap<String, Decimal>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiSubmissionResult {
    pub success: bool,
    pub status_code: Option<u16>,
    pub attempts: u32,
    pub last_error: Option<String>,
}
