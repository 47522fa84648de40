use crate::core::analytics::{
    daily_sales_trend, low_performing_products, peak_sales_day, region_breakdown,
    top_selling_products,
};
use crate::core::engine::RunReport;
use crate::core::enrichment::EnrichedSale;
use crate::utils::error::{AnalyticsError, Result};
use std::fs;
use std::path::Path;

const TOP_PRODUCTS: usize = 5;
const LOW_PERFORMER_THRESHOLD: u64 = 10;

/// Renders the run as a plain-text report. Pure formatting; the numbers all
/// come from the aggregation and analytics stages.
pub fn render_report(run: &RunReport) -> String {
    let mut lines = vec![
        "========================================".to_string(),
        "SALES ANALYTICS REPORT".to_string(),
        "========================================".to_string(),
        String::new(),
        "--- Summary ---".to_string(),
        format!("Records processed: {}", run.summary.record_count),
        format!("Rejected lines:    {}", run.parse_errors.len()),
        format!("Total quantity:    {}", run.summary.total_quantity),
        format!("Total revenue:     {}", run.summary.total_revenue.round_dp(2)),
    ];

    if !run.parse_errors.is_empty() {
        lines.push(String::new());
        lines.push("--- Rejected Lines ---".to_string());
        for error in &run.parse_errors {
            lines.push(format!("  {}", error));
        }
    }

    let breakdown = region_breakdown(&run.sales);
    if !breakdown.is_empty() {
        lines.push(String::new());
        lines.push("--- Sales by Region ---".to_string());
        for (region, stats) in &breakdown {
            lines.push(format!(
                "  {}: {} ({} transactions, {}%)",
                region, stats.total_sales, stats.transaction_count, stats.percentage
            ));
        }
    }

    let top = top_selling_products(&run.sales, TOP_PRODUCTS);
    if !top.is_empty() {
        lines.push(String::new());
        lines.push(format!("--- Top {} Products by Quantity ---", TOP_PRODUCTS));
        for product in &top {
            lines.push(format!(
                "  {}: {} units, revenue {}",
                product.product, product.total_quantity, product.total_revenue
            ));
        }
    }

    let low = low_performing_products(&run.sales, LOW_PERFORMER_THRESHOLD);
    if !low.is_empty() {
        lines.push(String::new());
        lines.push(format!(
            "--- Low Performers (under {} units) ---",
            LOW_PERFORMER_THRESHOLD
        ));
        for product in &low {
            lines.push(format!(
                "  {}: {} units, revenue {}",
                product.product, product.total_quantity, product.total_revenue
            ));
        }
    }

    let trend = daily_sales_trend(&run.sales);
    if !trend.is_empty() {
        lines.push(String::new());
        lines.push("--- Daily Sales Trend ---".to_string());
        for (date, stats) in &trend {
            lines.push(format!(
                "  {}: revenue {} ({} transactions)",
                date,
                stats.revenue.round_dp(2),
                stats.transaction_count
            ));
        }
    }

    if let Some((date, stats)) = peak_sales_day(&run.sales) {
        lines.push(String::new());
        lines.push(format!(
            "Peak sales day: {} with revenue {}",
            date,
            stats.revenue.round_dp(2)
        ));
    }

    if !run.enriched.is_empty() {
        let matched = run.enriched.iter().filter(|e| e.matched).count();
        lines.push(String::new());
        lines.push("--- Catalog Enrichment ---".to_string());
        lines.push(format!(
            "Matched {}/{} records against the product catalog",
            matched,
            run.enriched.len()
        ));
    }

    lines.push(String::new());
    lines.push("--- Submission ---".to_string());
    if run.submission.success {
        lines.push(format!(
            "Submitted successfully (status {}, {} attempt(s))",
            run.submission
                .status_code
                .map(|c| c.to_string())
                .unwrap_or_else(|| "n/a".to_string()),
            run.submission.attempts
        ));
    } else {
        lines.push(format!(
            "Submission FAILED after {} attempt(s): {}",
            run.submission.attempts,
            run.submission
                .last_error
                .as_deref()
                .unwrap_or("unknown error")
        ));
    }

    lines.push(String::new());
    lines.join("\n")
}

pub fn write_report(path: &str, content: &str) -> Result<()> {
    write_with_parents(path, content.as_bytes())
}

/// Writes the enriched dataset as a pipe-delimited file with a header row.
pub fn write_enriched(path: &str, enriched: &[EnrichedSale]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'|')
        .from_writer(Vec::new());

    writer.write_record([
        "date",
        "product",
        "quantity",
        "unit_price",
        "region",
        "category",
        "brand",
        "rating",
        "matched",
    ])?;

    for entry in enriched {
        writer.write_record([
            entry.sale.date.to_string(),
            entry.sale.product.clone(),
            entry.sale.quantity.to_string(),
            entry.sale.unit_price.to_string(),
            entry.sale.region.clone().unwrap_or_default(),
            entry.category.clone().unwrap_or_default(),
            entry.brand.clone().unwrap_or_default(),
            entry
                .rating
                .map(|r| r.to_string())
                .unwrap_or_default(),
            entry.matched.to_string(),
        ])?;
    }

    let data = writer
        .into_inner()
        .map_err(|e| AnalyticsError::ProcessingError {
            message: format!("failed to flush enriched output: {}", e),
        })?;
    write_with_parents(path, &data)
}

fn write_with_parents(path: &str, data: &[u8]) -> Result<()> {
    let full_path = Path::new(path);
    if let Some(parent) = full_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(full_path, data)?;
    Ok(())
}
