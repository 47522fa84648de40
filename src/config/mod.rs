pub mod toml_config;

use clap::Parser;
use rust_decimal::Decimal;

#[derive(Debug, Clone, Parser)]
#[command(name = "sales-analytics")]
#[command(about = "Sales ledger analytics and submission pipeline")]
pub struct CliConfig {
    /// Path to the pipeline TOML configuration
    #[arg(long, default_value = "config/pipeline.toml")]
    pub config: String,

    /// Ledger file to process, overriding the configured input path
    #[arg(long)]
    pub input: Option<String>,

    /// Only aggregate records from this region
    #[arg(long)]
    pub region: Option<String>,

    /// Drop records whose amount is below this value
    #[arg(long)]
    pub min_amount: Option<Decimal>,

    /// Drop records whose amount is above this value
    #[arg(long)]
    pub max_amount: Option<Decimal>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}
