pub mod config;
pub mod core;
pub mod domain;
pub mod report;
pub mod utils;

pub use crate::config::{toml_config::AppConfig, CliConfig};
pub use crate::core::engine::{AnalyticsEngine, RunReport};
pub use crate::core::enrichment::ProductCatalog;
pub use crate::core::parser::{parse_ledger, ParserOptions};
pub use crate::core::submitter::{ApiSubmitter, SubmitterConfig};
pub use crate::domain::model::{ApiSubmissionResult, Sale, SalesSummary};
pub use crate::utils::error::{AnalyticsError, Result};
