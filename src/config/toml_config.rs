use crate::core::enrichment::CatalogConfig;
use crate::core::filter::SaleFilter;
use crate::core::parser::ParserOptions;
use crate::core::submitter::SubmitterConfig;
use crate::utils::error::{AnalyticsError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_positive_number, validate_url, Validate,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub input: InputConfig,
    pub filter: Option<FilterConfig>,
    pub api: SubmitterConfig,
    pub catalog: Option<CatalogConfig>,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InputConfig {
    pub path: String,
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
    #[serde(default = "default_date_format")]
    pub date_format: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilterConfig {
    pub region: Option<String>,
    pub min_amount: Option<Decimal>,
    pub max_amount: Option<Decimal>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_report_path")]
    pub report_path: String,
    pub enriched_path: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            report_path: default_report_path(),
            enriched_path: None,
        }
    }
}

fn default_delimiter() -> char {
    ','
}

fn default_date_format() -> String {
    "%Y-%m-%d".to_string()
}

fn default_report_path() -> String {
    "output/sales_report.txt".to_string()
}

impl AppConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(AnalyticsError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| AnalyticsError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${API_TOKEN})
    fn substitute_env_vars(content: &str) -> String {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").unwrap();

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .to_string()
    }

    pub fn parser_options(&self) -> ParserOptions {
        ParserOptions {
            delimiter: self.input.delimiter,
            date_format: self.input.date_format.clone(),
        }
    }

    pub fn sale_filter(&self) -> SaleFilter {
        match &self.filter {
            Some(filter) => SaleFilter {
                region: filter.region.clone(),
                min_amount: filter.min_amount,
                max_amount: filter.max_amount,
            },
            None => SaleFilter::default(),
        }
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        validate_path("input.path", &self.input.path)?;
        validate_non_empty_string("input.date_format", &self.input.date_format)?;

        validate_url("api.endpoint_url", &self.api.endpoint_url)?;
        validate_positive_number("api.timeout_seconds", self.api.timeout_seconds, 1)?;

        if let Some(catalog) = &self.catalog {
            validate_url("catalog.endpoint_url", &catalog.endpoint_url)?;
            validate_positive_number("catalog.timeout_seconds", catalog.timeout_seconds, 1)?;
        }

        validate_path("output.report_path", &self.output.report_path)?;
        if let Some(enriched_path) = &self.output.enriched_path {
            validate_path("output.enriched_path", enriched_path)?;
        }

        Ok(())
    }
}
