pub mod aggregator;
pub mod analytics;
pub mod engine;
pub mod enrichment;
pub mod filter;
pub mod parser;
pub mod submitter;

pub use crate::domain::model::{ApiSubmissionResult, Sale, SalesSummary};
pub use crate::utils::error::Result;
