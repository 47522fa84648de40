use crate::domain::model::Sale;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

/// Fixed field order: date, product, quantity, unit_price, region.
pub const EXPECTED_FIELDS: usize = 5;

#[derive(Debug, Clone)]
pub struct ParserOptions {
    pub delimiter: char,
    pub date_format: String,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            delimiter: ',',
            date_format: "%Y-%m-%d".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    #[error("expected 5 fields, found {found}")]
    MalformedFieldCount { found: usize },

    #[error("invalid number '{value}' in field '{field}'")]
    InvalidNumber { field: &'static str, value: String },

    #[error("invalid date '{value}'")]
    InvalidDate { value: String },

    #[error("negative value '{value}' in field '{field}'")]
    NegativeValue { field: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {kind}: {raw}")]
pub struct LineError {
    pub line: usize,
    pub raw: String,
    pub kind: ParseErrorKind,
}

pub type LineOutcome = std::result::Result<Sale, LineError>;

/// Per-line parse outcomes in input order, rejected lines included.
#[derive(Debug, Clone, Default)]
pub struct ParseReport {
    pub outcomes: Vec<LineOutcome>,
}

impl ParseReport {
    pub fn sales(&self) -> impl Iterator<Item = &Sale> {
        self.outcomes.iter().filter_map(|o| o.as_ref().ok())
    }

    pub fn errors(&self) -> impl Iterator<Item = &LineError> {
        self.outcomes.iter().filter_map(|o| o.as_ref().err())
    }

    pub fn record_count(&self) -> usize {
        self.sales().count()
    }

    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    pub fn into_parts(self) -> (Vec<Sale>, Vec<LineError>) {
        let mut sales = Vec::new();
        let mut errors = Vec::new();
        for outcome in self.outcomes {
            match outcome {
                Ok(sale) => sales.push(sale),
                Err(error) => errors.push(error),
            }
        }
        (sales, errors)
    }
}

/// Parses the raw ledger text line by line. Blank lines are skipped, and a
/// single leading header row (first field `date`, any case) is skipped too.
/// A rejected line never aborts the lines after it.
pub fn parse_ledger(input: &str, options: &ParserOptions) -> ParseReport {
    let mut outcomes = Vec::new();
    let mut first_content_line = true;

    for (index, raw) in input.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        if first_content_line {
            first_content_line = false;
            let first_field = line.split(options.delimiter).next().unwrap_or("").trim();
            if first_field.eq_ignore_ascii_case("date") {
                continue;
            }
        }

        outcomes.push(parse_line(index + 1, line, options));
    }

    ParseReport { outcomes }
}

fn parse_line(line: usize, raw: &str, options: &ParserOptions) -> LineOutcome {
    let reject = |kind: ParseErrorKind| LineError {
        line,
        raw: raw.to_string(),
        kind,
    };

    let fields: Vec<&str> = raw.split(options.delimiter).map(str::trim).collect();
    if fields.len() != EXPECTED_FIELDS {
        return Err(reject(ParseErrorKind::MalformedFieldCount {
            found: fields.len(),
        }));
    }

    let date = NaiveDate::parse_from_str(fields[0], &options.date_format).map_err(|_| {
        reject(ParseErrorKind::InvalidDate {
            value: fields[0].to_string(),
        })
    })?;

    let quantity: i64 = fields[2].parse().map_err(|_| {
        reject(ParseErrorKind::InvalidNumber {
            field: "quantity",
            value: fields[2].to_string(),
        })
    })?;
    if quantity < 0 {
        return Err(reject(ParseErrorKind::NegativeValue {
            field: "quantity",
            value: fields[2].to_string(),
        }));
    }

    let unit_price: Decimal = fields[3].parse().map_err(|_| {
        reject(ParseErrorKind::InvalidNumber {
            field: "unit_price",
            value: fields[3].to_string(),
        })
    })?;
    if unit_price < Decimal::ZERO {
        return Err(reject(ParseErrorKind::NegativeValue {
            field: "unit_price",
            value: fields[3].to_string(),
        }));
    }

    let region = if fields[4].is_empty() {
        None
    } else {
        Some(fields[4].to_string())
    };

    Ok(Sale {
        date,
        product: fields[1].to_string(),
        quantity: quantity as u64,
        unit_price,
        region,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> ParseReport {
        parse_ledger(input, &ParserOptions::default())
    }

    #[test]
    fn test_parse_valid_line() {
        let report = parse("2024-01-01,Widget,3,10.00,East");

        assert_eq!(report.record_count(), 1);
        assert_eq!(report.error_count(), 0);

        let sale = report.sales().next().unwrap();
        assert_eq!(sale.date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(sale.product, "Widget");
        assert_eq!(sale.quantity, 3);
        assert_eq!(sale.unit_price, "10.00".parse().unwrap());
        assert_eq!(sale.region.as_deref(), Some("East"));
    }

    #[test]
    fn test_header_and_blank_lines_are_skipped() {
        let input = "date,product,quantity,unit_price,region\n\n2024-01-01,Widget,3,10.00,East\n\n";
        let report = parse(input);

        assert_eq!(report.outcomes.len(), 1);
        assert_eq!(report.record_count(), 1);
    }

    #[test]
    fn test_header_is_only_skipped_on_first_content_line() {
        let input = "2024-01-01,Widget,3,10.00,East\ndate,product,quantity,unit_price,region";
        let report = parse(input);

        assert_eq!(report.record_count(), 1);
        assert_eq!(report.error_count(), 1);
    }

    #[test]
    fn test_malformed_field_count_does_not_halt_parsing() {
        let input = "2024-01-01,Widget,3,10.00\n2024-01-02,Gadget,2,5.00,West";
        let report = parse(input);

        assert_eq!(report.record_count(), 1);
        let error = report.errors().next().unwrap();
        assert_eq!(error.line, 1);
        assert_eq!(error.kind, ParseErrorKind::MalformedFieldCount { found: 4 });

        let sale = report.sales().next().unwrap();
        assert_eq!(sale.product, "Gadget");
    }

    #[test]
    fn test_invalid_quantity_is_rejected() {
        let report = parse("2024-01-01,Widget,three,10.00,East");

        let error = report.errors().next().unwrap();
        assert_eq!(
            error.kind,
            ParseErrorKind::InvalidNumber {
                field: "quantity",
                value: "three".to_string()
            }
        );
    }

    #[test]
    fn test_invalid_unit_price_is_rejected() {
        let report = parse("2024-01-01,Widget,3,ten,East");

        let error = report.errors().next().unwrap();
        assert_eq!(
            error.kind,
            ParseErrorKind::InvalidNumber {
                field: "unit_price",
                value: "ten".to_string()
            }
        );
    }

    #[test]
    fn test_invalid_date_is_rejected() {
        let report = parse("01/05/2024,Widget,3,10.00,East");

        let error = report.errors().next().unwrap();
        assert_eq!(
            error.kind,
            ParseErrorKind::InvalidDate {
                value: "01/05/2024".to_string()
            }
        );
    }

    #[test]
    fn test_negative_values_never_yield_a_sale() {
        let report = parse("2024-01-01,Widget,-3,10.00,East\n2024-01-01,Widget,3,-10.00,East");

        assert_eq!(report.record_count(), 0);
        let kinds: Vec<_> = report.errors().map(|e| e.kind.clone()).collect();
        assert_eq!(
            kinds,
            vec![
                ParseErrorKind::NegativeValue {
                    field: "quantity",
                    value: "-3".to_string()
                },
                ParseErrorKind::NegativeValue {
                    field: "unit_price",
                    value: "-10.00".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_empty_region_becomes_none() {
        let report = parse("2024-01-01,Widget,3,10.00,");

        let sale = report.sales().next().unwrap();
        assert_eq!(sale.region, None);
    }

    #[test]
    fn test_line_numbers_refer_to_the_original_input() {
        let input = "date,product,quantity,unit_price,region\n\n2024-01-01,Widget,bad,10.00,East";
        let report = parse(input);

        let error = report.errors().next().unwrap();
        assert_eq!(error.line, 3);
        assert_eq!(error.raw, "2024-01-01,Widget,bad,10.00,East");
    }

    #[test]
    fn test_custom_delimiter_and_date_format() {
        let options = ParserOptions {
            delimiter: '|',
            date_format: "%d/%m/%Y".to_string(),
        };
        let report = parse_ledger("01/12/2024|Laptop|2|45000|North", &options);

        let sale = report.sales().next().unwrap();
        assert_eq!(sale.date, NaiveDate::from_ymd_opt(2024, 12, 1).unwrap());
        assert_eq!(sale.quantity, 2);
    }

    #[test]
    fn test_parsing_is_deterministic() {
        let input = "2024-01-01,Widget,3,10.00,East\nbad line\n2024-01-02,Gadget,x,5.00,";
        assert_eq!(parse(input).outcomes, parse(input).outcomes);
    }
}
