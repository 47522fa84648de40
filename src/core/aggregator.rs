use crate::domain::model::{Sale, SalesSummary, UNKNOWN_REGION};
use rust_decimal::Decimal;

/// Folds a set of validated sales into one summary. Always succeeds; an
/// empty input yields zero totals and empty mappings.
pub fn summarize(sales: &[Sale]) -> SalesSummary {
    let mut summary = SalesSummary::default();

    for sale in sales {
        let revenue = sale.revenue();

        summary.total_revenue += revenue;
        summary.total_quantity += sale.quantity;
        summary.record_count += 1;

        *summary
            .by_product
            .entry(sale.product.clone())
            .or_insert(Decimal::ZERO) += revenue;

        let region = sale.region.as_deref().unwrap_or(UNKNOWN_REGION);
        *summary
            .by_region
            .entry(region.to_string())
            .or_insert(Decimal::ZERO) += revenue;
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sale(product: &str, quantity: u64, unit_price: &str, region: Option<&str>) -> Sale {
        Sale {
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            product: product.to_string(),
            quantity,
            unit_price: unit_price.parse().unwrap(),
            region: region.map(str::to_string),
        }
    }

    fn dec(value: &str) -> Decimal {
        value.parse().unwrap()
    }

    #[test]
    fn test_empty_input_yields_zero_summary() {
        let summary = summarize(&[]);

        assert_eq!(summary.total_revenue, Decimal::ZERO);
        assert_eq!(summary.total_quantity, 0);
        assert_eq!(summary.record_count, 0);
        assert!(summary.by_product.is_empty());
        assert!(summary.by_region.is_empty());
    }

    #[test]
    fn test_single_record_contributes_to_both_breakdowns() {
        let summary = summarize(&[sale("Widget", 3, "10.00", Some("East"))]);

        assert_eq!(summary.total_revenue, dec("30.00"));
        assert_eq!(summary.total_quantity, 3);
        assert_eq!(summary.record_count, 1);
        assert_eq!(summary.by_product["Widget"], dec("30.00"));
        assert_eq!(summary.by_region["East"], dec("30.00"));
    }

    #[test]
    fn test_breakdowns_sum_to_total_revenue() {
        let sales = vec![
            sale("Widget", 3, "10.00", Some("East")),
            sale("Widget", 1, "10.00", Some("West")),
            sale("Gadget", 5, "2.50", Some("East")),
            sale("Cable", 10, "0.10", None),
        ];
        let summary = summarize(&sales);

        let product_total: Decimal = summary.by_product.values().sum();
        let region_total: Decimal = summary.by_region.values().sum();
        assert_eq!(product_total, summary.total_revenue);
        assert_eq!(region_total, summary.total_revenue);
        assert_eq!(summary.total_revenue, dec("53.50"));
        assert_eq!(summary.total_quantity, 19);
    }

    #[test]
    fn test_missing_region_lands_in_unknown_bucket() {
        let summary = summarize(&[
            sale("Widget", 2, "5.00", None),
            sale("Gadget", 1, "1.00", None),
        ]);

        assert_eq!(summary.by_region.len(), 1);
        assert_eq!(summary.by_region[UNKNOWN_REGION], dec("11.00"));
    }

    #[test]
    fn test_decimal_accumulation_has_no_float_drift() {
        let sales: Vec<Sale> = (0..1000)
            .map(|_| sale("Penny", 1, "0.01", Some("East")))
            .collect();
        let summary = summarize(&sales);

        assert_eq!(summary.total_revenue, dec("10.00"));
    }

    #[test]
    fn test_summarize_is_idempotent() {
        let sales = vec![
            sale("Widget", 3, "10.00", Some("East")),
            sale("Gadget", 7, "3.15", None),
        ];

        assert_eq!(summarize(&sales), summarize(&sales));
    }
}
