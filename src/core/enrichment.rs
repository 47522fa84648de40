use crate::core::submitter::{
    default_backoff_seconds, default_max_retries, default_timeout_seconds,
};
use crate::domain::model::Sale;
use crate::utils::error::{AnalyticsError, Result};
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    pub endpoint_url: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_backoff_seconds")]
    pub backoff_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProductInfo {
    pub title: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub price: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct CatalogResponse {
    products: Vec<ProductInfo>,
}

/// A sale joined with whatever the product catalog knows about it.
#[derive(Debug, Clone)]
pub struct EnrichedSale {
    pub sale: Sale,
    pub category: Option<String>,
    pub brand: Option<String>,
    pub rating: Option<f64>,
    pub matched: bool,
}

pub struct ProductCatalog {
    config: CatalogConfig,
    client: Client,
}

impl ProductCatalog {
    pub fn new(config: CatalogConfig) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }

    /// Fetches the product list, retrying transient failures with the same
    /// policy the submitter uses.
    pub async fn fetch_products(&self) -> Result<Vec<ProductInfo>> {
        let max_attempts = self.config.max_retries + 1;
        let mut last_error: Option<AnalyticsError> = None;

        for attempt in 1..=max_attempts {
            let request = self
                .client
                .get(&self.config.endpoint_url)
                .timeout(Duration::from_secs(self.config.timeout_seconds));

            tracing::debug!(
                "📡 Fetching product catalog from {} (attempt {}/{})",
                self.config.endpoint_url,
                attempt,
                max_attempts
            );

            match request.send().await {
                Ok(response) if response.status().is_success() => {
                    let body: CatalogResponse = response.json().await?;
                    tracing::info!("Fetched {} catalog products", body.products.len());
                    return Ok(body.products);
                }
                Ok(response) if response.status().is_server_error() => {
                    last_error = Some(AnalyticsError::ProcessingError {
                        message: format!(
                            "catalog request failed with status {}",
                            response.status()
                        ),
                    });
                }
                Ok(response) => {
                    return Err(AnalyticsError::ProcessingError {
                        message: format!(
                            "catalog request rejected with status {}",
                            response.status()
                        ),
                    });
                }
                Err(e) => {
                    last_error = Some(e.into());
                }
            }

            if attempt < max_attempts {
                let delay = self.config.backoff_seconds * u64::from(attempt);
                tokio::time::sleep(Duration::from_secs(delay)).await;
            }
        }

        Err(last_error.unwrap_or_else(|| AnalyticsError::ProcessingError {
            message: "catalog fetch failed".to_string(),
        }))
    }
}

/// Maps lowercase product titles to catalog entries. Untitled products are
/// skipped.
pub fn build_mapping(products: Vec<ProductInfo>) -> HashMap<String, ProductInfo> {
    let mut mapping = HashMap::new();
    for product in products {
        let key = product.title.trim().to_lowercase();
        if !key.is_empty() {
            mapping.insert(key, product);
        }
    }
    mapping
}

/// Joins each sale against the catalog: exact lowercase-title match first,
/// then a substring match in either direction. Unmatched sales are kept with
/// empty catalog fields.
pub fn enrich_sales(sales: &[Sale], mapping: &HashMap<String, ProductInfo>) -> Vec<EnrichedSale> {
    let mut enriched = Vec::with_capacity(sales.len());
    let mut matched_count = 0usize;

    for sale in sales {
        let name = sale.product.trim().to_lowercase();

        let info = mapping.get(&name).or_else(|| {
            mapping
                .iter()
                .find(|(title, _)| title.contains(&name) || name.contains(title.as_str()))
                .map(|(_, info)| info)
        });

        match info {
            Some(info) => {
                matched_count += 1;
                enriched.push(EnrichedSale {
                    sale: sale.clone(),
                    category: info.category.clone(),
                    brand: info.brand.clone(),
                    rating: info.rating,
                    matched: true,
                });
            }
            None => enriched.push(EnrichedSale {
                sale: sale.clone(),
                category: None,
                brand: None,
                rating: None,
                matched: false,
            }),
        }
    }

    tracing::info!(
        "Enriched {}/{} sales with catalog data",
        matched_count,
        sales.len()
    );
    enriched
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use httpmock::prelude::*;

    fn sale(product: &str) -> Sale {
        Sale {
            date: NaiveDate::from_ymd_opt(2024, 12, 1).unwrap(),
            product: product.to_string(),
            quantity: 1,
            unit_price: "10.00".parse().unwrap(),
            region: None,
        }
    }

    fn product(title: &str, category: &str) -> ProductInfo {
        ProductInfo {
            title: title.to_string(),
            category: Some(category.to_string()),
            brand: Some("Acme".to_string()),
            rating: Some(4.5),
            price: Some(10.0),
        }
    }

    #[test]
    fn test_build_mapping_keys_by_lowercase_title() {
        let mapping = build_mapping(vec![product("Laptop Pro", "laptops"), product("  ", "x")]);

        assert_eq!(mapping.len(), 1);
        assert!(mapping.contains_key("laptop pro"));
    }

    #[test]
    fn test_enrich_exact_and_substring_matches() {
        let mapping = build_mapping(vec![product("Laptop Pro", "laptops")]);
        let sales = vec![sale("laptop pro"), sale("Laptop"), sale("Toaster")];

        let enriched = enrich_sales(&sales, &mapping);

        assert!(enriched[0].matched);
        assert_eq!(enriched[0].category.as_deref(), Some("laptops"));
        // "laptop" is a substring of the catalog title
        assert!(enriched[1].matched);
        assert!(!enriched[2].matched);
        assert_eq!(enriched[2].category, None);
        assert_eq!(enriched.len(), 3);
    }

    #[tokio::test]
    async fn test_fetch_products_parses_catalog_body() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/products");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({
                    "products": [
                        {"title": "Laptop", "category": "laptops", "brand": "Acme", "rating": 4.7, "price": 999.0},
                        {"title": "Mouse"}
                    ]
                }));
        });

        let catalog = ProductCatalog::new(CatalogConfig {
            endpoint_url: server.url("/products"),
            timeout_seconds: 5,
            max_retries: 0,
            backoff_seconds: 0,
        });

        let products = catalog.fetch_products().await.unwrap();

        mock.assert();
        assert_eq!(products.len(), 2);
        assert_eq!(products[0].title, "Laptop");
        assert_eq!(products[1].category, None);
    }

    #[tokio::test]
    async fn test_fetch_products_client_error_is_not_retried() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/products");
            then.status(404);
        });

        let catalog = ProductCatalog::new(CatalogConfig {
            endpoint_url: server.url("/products"),
            timeout_seconds: 5,
            max_retries: 2,
            backoff_seconds: 0,
        });

        let result = catalog.fetch_products().await;

        mock.assert_hits(1);
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_fetch_products_retries_server_errors() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/products");
            then.status(500);
        });

        let catalog = ProductCatalog::new(CatalogConfig {
            endpoint_url: server.url("/products"),
            timeout_seconds: 5,
            max_retries: 2,
            backoff_seconds: 0,
        });

        let result = catalog.fetch_products().await;

        mock.assert_hits(3);
        assert!(result.is_err());
    }
}
