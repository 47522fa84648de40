use crate::core::aggregator;
use crate::core::enrichment::{build_mapping, enrich_sales, EnrichedSale, ProductCatalog};
use crate::core::filter::{FilterSummary, SaleFilter};
use crate::core::parser::{parse_ledger, LineError, ParserOptions};
use crate::core::submitter::ApiSubmitter;
use crate::domain::model::{ApiSubmissionResult, Sale, SalesSummary};

/// Everything one pipeline run produced, for the caller to report on and to
/// derive an exit status from.
#[derive(Debug)]
pub struct RunReport {
    pub parse_errors: Vec<LineError>,
    pub filter_summary: FilterSummary,
    pub sales: Vec<Sale>,
    pub summary: SalesSummary,
    pub enriched: Vec<EnrichedSale>,
    pub submission: ApiSubmissionResult,
}

impl RunReport {
    pub fn valid_records(&self) -> usize {
        self.sales.len()
    }
}

/// 順序執行整條管線：解析 → 過濾 → 彙總 → 補充 → 提交
pub struct AnalyticsEngine {
    parser_options: ParserOptions,
    filter: SaleFilter,
    submitter: ApiSubmitter,
    catalog: Option<ProductCatalog>,
}

impl AnalyticsEngine {
    pub fn new(parser_options: ParserOptions, filter: SaleFilter, submitter: ApiSubmitter) -> Self {
        Self {
            parser_options,
            filter,
            submitter,
            catalog: None,
        }
    }

    pub fn with_catalog(mut self, catalog: ProductCatalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Runs the full pipeline over the raw ledger text. Parse and filter
    /// problems never abort the run; only the submission outcome can mark
    /// the run as failed, and the caller decides that from the report.
    pub async fn run(&self, input: &str) -> RunReport {
        // 解析
        tracing::info!("Parsing sales ledger...");
        let report = parse_ledger(input, &self.parser_options);
        let (sales, parse_errors) = report.into_parts();
        tracing::info!(
            "Parsed {} records ({} rejected lines)",
            sales.len(),
            parse_errors.len()
        );
        for error in &parse_errors {
            tracing::warn!("⚠️ {}", error);
        }

        // 過濾
        let (sales, filter_summary) = self.filter.apply(sales);
        if !self.filter.is_empty() {
            tracing::info!(
                "Filtered {} -> {} records (region: -{}, amount: -{})",
                filter_summary.total_input,
                filter_summary.final_count,
                filter_summary.filtered_by_region,
                filter_summary.filtered_by_amount
            );
        }

        // 彙總
        let summary = aggregator::summarize(&sales);
        tracing::info!(
            "💰 Total revenue: {} across {} records",
            summary.total_revenue.round_dp(2),
            summary.record_count
        );

        // 補充產品資料（可選，失敗不中斷）
        let enriched = match &self.catalog {
            Some(catalog) => match catalog.fetch_products().await {
                Ok(products) => {
                    let mapping = build_mapping(products);
                    enrich_sales(&sales, &mapping)
                }
                Err(e) => {
                    tracing::warn!(
                        "⚠️ Product catalog unavailable: {}. Continuing without enrichment",
                        e
                    );
                    Vec::new()
                }
            },
            None => Vec::new(),
        };

        // 提交
        tracing::info!("Submitting summary to remote endpoint...");
        let submission = self.submitter.submit(&summary).await;
        if submission.success {
            tracing::info!(
                "✅ Summary submitted (status {:?}, attempts {})",
                submission.status_code,
                submission.attempts
            );
        } else {
            tracing::error!(
                "❌ Submission failed after {} attempt(s): {}",
                submission.attempts,
                submission.last_error.as_deref().unwrap_or("unknown error")
            );
        }

        RunReport {
            parse_errors,
            filter_summary,
            sales,
            summary,
            enriched,
            submission,
        }
    }
}
