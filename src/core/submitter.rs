use crate::domain::model::{ApiSubmissionResult, SalesSummary};
use reqwest::{Client, StatusCode};
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitterConfig {
    pub endpoint_url: String,
    pub auth_token: Option<String>,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_backoff_seconds")]
    pub backoff_seconds: u64,
}

pub(crate) fn default_timeout_seconds() -> u64 {
    10
}

pub(crate) fn default_max_retries() -> u32 {
    3
}

pub(crate) fn default_backoff_seconds() -> u64 {
    1
}

/// Wire shape of the summary: plain JSON numbers, mappings as nested
/// key-to-number objects.
#[derive(Debug, Serialize)]
struct SummaryPayload {
    total_revenue: f64,
    total_quantity: u64,
    record_count: u64,
    by_product: HashMap<String, f64>,
    by_region: HashMap<String, f64>,
}

impl From<&SalesSummary> for SummaryPayload {
    fn from(summary: &SalesSummary) -> Self {
        let to_number = |map: &HashMap<String, rust_decimal::Decimal>| {
            map.iter()
                .map(|(key, value)| (key.clone(), value.to_f64().unwrap_or_default()))
                .collect()
        };

        Self {
            total_revenue: summary.total_revenue.to_f64().unwrap_or_default(),
            total_quantity: summary.total_quantity,
            record_count: summary.record_count,
            by_product: to_number(&summary.by_product),
            by_region: to_number(&summary.by_region),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Disposition {
    Success,
    Transient,
    Fatal,
}

/// 2xx 成功；5xx 視為暫時性錯誤可重試；其餘一律不重試
pub(crate) fn classify_status(status: StatusCode) -> Disposition {
    if status.is_success() {
        Disposition::Success
    } else if status.is_server_error() {
        Disposition::Transient
    } else {
        Disposition::Fatal
    }
}

pub struct ApiSubmitter {
    config: SubmitterConfig,
    client: Client,
}

impl ApiSubmitter {
    pub fn new(config: SubmitterConfig) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }

    /// Posts the summary to the configured endpoint. Transient failures
    /// (connection error, timeout, 5xx) are retried up to `max_retries`
    /// times with a linearly growing backoff; a non-5xx error status fails
    /// immediately. Every outcome, including exhaustion, is reported in the
    /// returned value rather than raised.
    pub async fn submit(&self, summary: &SalesSummary) -> ApiSubmissionResult {
        if let Err(e) = Url::parse(&self.config.endpoint_url) {
            return ApiSubmissionResult {
                success: false,
                status_code: None,
                attempts: 0,
                last_error: Some(format!(
                    "invalid endpoint URL '{}': {}",
                    self.config.endpoint_url, e
                )),
            };
        }

        let payload = SummaryPayload::from(summary);
        let max_attempts = self.config.max_retries + 1;
        let mut last_status = None;
        let mut last_error = None;

        for attempt in 1..=max_attempts {
            // 構建請求
            let mut request = self
                .client
                .post(&self.config.endpoint_url)
                .timeout(Duration::from_secs(self.config.timeout_seconds))
                .json(&payload);

            if let Some(token) = &self.config.auth_token {
                request = request.bearer_auth(token);
            }

            tracing::debug!(
                "📡 Submitting summary to {} (attempt {}/{})",
                self.config.endpoint_url,
                attempt,
                max_attempts
            );

            // 執行請求
            match request.send().await {
                Ok(response) => {
                    let status = response.status();
                    last_status = Some(status.as_u16());

                    match classify_status(status) {
                        Disposition::Success => {
                            return ApiSubmissionResult {
                                success: true,
                                status_code: last_status,
                                attempts: attempt,
                                last_error: None,
                            };
                        }
                        Disposition::Fatal => {
                            return ApiSubmissionResult {
                                success: false,
                                status_code: last_status,
                                attempts: attempt,
                                last_error: Some(format!(
                                    "endpoint rejected submission with status {}",
                                    status
                                )),
                            };
                        }
                        Disposition::Transient => {
                            last_error = Some(format!("server error status {}", status));
                        }
                    }
                }
                Err(e) => {
                    last_error = Some(e.to_string());
                }
            }

            if attempt < max_attempts {
                let delay = self.config.backoff_seconds * u64::from(attempt);
                tracing::warn!(
                    "📡 Submission attempt {}/{} failed, retrying in {}s",
                    attempt,
                    max_attempts,
                    delay
                );
                tokio::time::sleep(Duration::from_secs(delay)).await;
            }
        }

        ApiSubmissionResult {
            success: false,
            status_code: last_status,
            attempts: max_attempts,
            last_error,
        }
    }
}
