use crate::domain::model::Sale;
use rust_decimal::Decimal;

/// Optional post-parse narrowing of the record set before aggregation.
#[derive(Debug, Clone, Default)]
pub struct SaleFilter {
    pub region: Option<String>,
    pub min_amount: Option<Decimal>,
    pub max_amount: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterSummary {
    pub total_input: usize,
    pub filtered_by_region: usize,
    pub filtered_by_amount: usize,
    pub final_count: usize,
}

impl SaleFilter {
    pub fn is_empty(&self) -> bool {
        self.region.is_none() && self.min_amount.is_none() && self.max_amount.is_none()
    }

    pub fn apply(&self, sales: Vec<Sale>) -> (Vec<Sale>, FilterSummary) {
        let mut summary = FilterSummary {
            total_input: sales.len(),
            ..Default::default()
        };
        let mut kept = sales;

        if let Some(region) = &self.region {
            let before = kept.len();
            kept.retain(|sale| {
                sale.region
                    .as_deref()
                    .map(|r| r.eq_ignore_ascii_case(region))
                    .unwrap_or(false)
            });
            summary.filtered_by_region = before - kept.len();
        }

        if self.min_amount.is_some() || self.max_amount.is_some() {
            let before = kept.len();
            kept.retain(|sale| {
                let amount = sale.revenue();
                self.min_amount.map_or(true, |min| amount >= min)
                    && self.max_amount.map_or(true, |max| amount <= max)
            });
            summary.filtered_by_amount = before - kept.len();
        }

        summary.final_count = kept.len();
        (kept, summary)
    }
}
