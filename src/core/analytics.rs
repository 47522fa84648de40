use crate::domain::model::{Sale, UNKNOWN_REGION};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductPerformance {
    pub product: String,
    pub total_quantity: u64,
    pub total_revenue: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionStats {
    pub total_sales: Decimal,
    pub transaction_count: u64,
    pub percentage: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DailyStats {
    pub revenue: Decimal,
    pub transaction_count: u64,
}

fn product_totals(sales: &[Sale]) -> HashMap<String, (u64, Decimal)> {
    let mut totals: HashMap<String, (u64, Decimal)> = HashMap::new();
    for sale in sales {
        let entry = totals.entry(sale.product.clone()).or_default();
        entry.0 += sale.quantity;
        entry.1 += sale.revenue();
    }
    totals
}

fn into_performance(totals: HashMap<String, (u64, Decimal)>) -> Vec<ProductPerformance> {
    totals
        .into_iter()
        .map(|(product, (total_quantity, total_revenue))| ProductPerformance {
            product,
            total_quantity,
            total_revenue: total_revenue.round_dp(2),
        })
        .collect()
}

/// Top `n` products by total quantity sold, highest first. Ties break on
/// product name so repeated runs order identically.
pub fn top_selling_products(sales: &[Sale], n: usize) -> Vec<ProductPerformance> {
    let mut products = into_performance(product_totals(sales));
    products.sort_by(|a, b| {
        b.total_quantity
            .cmp(&a.total_quantity)
            .then_with(|| a.product.cmp(&b.product))
    });
    products.truncate(n);
    products
}

/// Products whose total quantity stayed below `threshold`, lowest first.
pub fn low_performing_products(sales: &[Sale], threshold: u64) -> Vec<ProductPerformance> {
    let mut products = into_performance(product_totals(sales));
    products.retain(|p| p.total_quantity < threshold);
    products.sort_by(|a, b| {
        a.total_quantity
            .cmp(&b.total_quantity)
            .then_with(|| a.product.cmp(&b.product))
    });
    products
}

/// Per-region sales with each region's share of total revenue, sorted by
/// sales descending. Records without a region count under `unknown`.
pub fn region_breakdown(sales: &[Sale]) -> Vec<(String, RegionStats)> {
    let mut totals: HashMap<String, (Decimal, u64)> = HashMap::new();
    let mut total_revenue = Decimal::ZERO;

    for sale in sales {
        let revenue = sale.revenue();
        total_revenue += revenue;
        let region = sale.region.as_deref().unwrap_or(UNKNOWN_REGION);
        let entry = totals.entry(region.to_string()).or_default();
        entry.0 += revenue;
        entry.1 += 1;
    }

    let mut breakdown: Vec<(String, RegionStats)> = totals
        .into_iter()
        .map(|(region, (total_sales, transaction_count))| {
            let percentage = if total_revenue > Decimal::ZERO {
                (total_sales / total_revenue * Decimal::from(100)).round_dp(2)
            } else {
                Decimal::ZERO
            };
            (
                region,
                RegionStats {
                    total_sales: total_sales.round_dp(2),
                    transaction_count,
                    percentage,
                },
            )
        })
        .collect();

    breakdown.sort_by(|a, b| {
        b.1.total_sales
            .cmp(&a.1.total_sales)
            .then_with(|| a.0.cmp(&b.0))
    });
    breakdown
}

/// Daily revenue and transaction counts in chronological order.
pub fn daily_sales_trend(sales: &[Sale]) -> BTreeMap<NaiveDate, DailyStats> {
    let mut trend: BTreeMap<NaiveDate, DailyStats> = BTreeMap::new();
    for sale in sales {
        let entry = trend.entry(sale.date).or_default();
        entry.revenue += sale.revenue();
        entry.transaction_count += 1;
    }
    trend
}

/// The date with the highest revenue, or `None` for an empty input.
pub fn peak_sales_day(sales: &[Sale]) -> Option<(NaiveDate, DailyStats)> {
    daily_sales_trend(sales)
        .into_iter()
        .max_by(|a, b| a.1.revenue.cmp(&b.1.revenue))
}
