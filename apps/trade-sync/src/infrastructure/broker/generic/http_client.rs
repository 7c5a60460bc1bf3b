//! HTTP client wrapper with retry logic.

use std::collections::BTreeMap;

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use reqwest::{Client, Method};
use serde_json::Value;

use super::api_types::parse_error_body;
use super::config::GenericAdapterConfig;
use super::error::GenericHttpError;
use crate::broker::{ErrorCategory, LinearBackoff, RetryPolicy, categorize_status};
use crate::observability::record_broker_retry;

/// JSON-over-HTTP client for one broker.
///
/// Every request carries `Content-Type: application/json`, the configured
/// `User-Agent` and the broker's static headers. Static headers win on
/// conflict.
#[derive(Debug, Clone)]
pub struct BrokerHttpClient {
    client: Client,
    broker: String,
    retry: RetryPolicy,
}

impl BrokerHttpClient {
    /// Create a new HTTP client for `broker`.
    pub fn new(
        broker: &str,
        static_headers: &BTreeMap<String, String>,
        config: &GenericAdapterConfig,
    ) -> Result<Self, GenericHttpError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent).map_err(|_| {
                GenericHttpError::InvalidHeader {
                    name: USER_AGENT.to_string(),
                }
            })?,
        );
        for (name, value) in static_headers {
            let invalid = || GenericHttpError::InvalidHeader { name: name.clone() };
            let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| invalid())?;
            let header_value = HeaderValue::from_str(value).map_err(|_| invalid())?;
            headers.insert(header_name, header_value);
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| GenericHttpError::Client(e.to_string()))?;

        Ok(Self {
            client,
            broker: broker.to_string(),
            retry: config.retry.clone(),
        })
    }

    /// GET `url` with a bearer credential.
    pub async fn get(&self, url: &str, bearer: &str) -> Result<Value, GenericHttpError> {
        self.request(Method::GET, url, Some(bearer), None).await
    }

    /// POST a JSON body to `url`.
    pub async fn post(&self, url: &str, body: &Value) -> Result<Value, GenericHttpError> {
        self.request(Method::POST, url, None, Some(body)).await
    }

    /// Internal request implementation with retry logic.
    ///
    /// Transport failures and 5xx responses are retried with linear backoff;
    /// everything else returns immediately.
    async fn request(
        &self,
        method: Method,
        url: &str,
        bearer: Option<&str>,
        body: Option<&Value>,
    ) -> Result<Value, GenericHttpError> {
        let mut backoff = LinearBackoff::new(&self.retry);

        loop {
            let attempt = backoff.current_attempt();
            let mut request = self.client.request(method.clone(), url);
            if let Some(token) = bearer {
                request = request.bearer_auth(token);
            }
            if let Some(b) = body {
                request = request.json(b);
            }

            tracing::debug!(broker = %self.broker, %method, url, attempt, "Broker request");

            let response = match request.send().await {
                Ok(resp) => resp,
                Err(e) => {
                    if let Some(delay) = backoff.next_backoff() {
                        tracing::warn!(
                            broker = %self.broker,
                            error = %e,
                            delay_ms = delay.as_millis(),
                            attempt,
                            "Network error, retrying"
                        );
                        record_broker_retry(&self.broker);
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                    return Err(GenericHttpError::Network(format!(
                        "No response received from broker API: {e}"
                    )));
                }
            };

            let status = response.status();
            tracing::debug!(
                broker = %self.broker,
                %method,
                url,
                status = status.as_u16(),
                "Broker response"
            );

            if status.is_success() {
                let text = response
                    .text()
                    .await
                    .map_err(|e| GenericHttpError::Network(e.to_string()))?;
                if text.trim().is_empty() {
                    return Ok(Value::Null);
                }
                return serde_json::from_str(&text)
                    .map_err(|e| GenericHttpError::JsonParse(e.to_string()));
            }

            let error_body = response.text().await.unwrap_or_default();
            let (code, message) = parse_error_body(status.as_u16(), &error_body);

            if categorize_status(status.as_u16()) == ErrorCategory::Retryable {
                if let Some(delay) = backoff.next_backoff() {
                    tracing::warn!(
                        broker = %self.broker,
                        code = %code,
                        message = %message,
                        delay_ms = delay.as_millis(),
                        attempt,
                        "Retryable error, retrying"
                    );
                    record_broker_retry(&self.broker);
                    tokio::time::sleep(delay).await;
                    continue;
                }
            }

            return Err(GenericHttpError::Api {
                status: status.as_u16(),
                code,
                message,
            });
        }
    }
}
