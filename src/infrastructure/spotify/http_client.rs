use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::DomainError;

/// Trait for HTTP client operations (for mocking)
///
/// Query and form pairs are passed unencoded; the transport encodes them once.
#[async_trait]
pub trait HttpClientTrait: Send + Sync + std::fmt::Debug {
    async fn post_form(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
        form: &[(&str, &str)],
    ) -> Result<serde_json::Value, DomainError>;

    async fn get_json(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
        query: &[(&str, &str)],
    ) -> Result<serde_json::Value, DomainError>;
}

#[async_trait]
impl<T: HttpClientTrait + ?Sized> HttpClientTrait for Arc<T> {
    async fn post_form(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
        form: &[(&str, &str)],
    ) -> Result<serde_json::Value, DomainError> {
        (**self).post_form(url, headers, form).await
    }

    async fn get_json(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
        query: &[(&str, &str)],
    ) -> Result<serde_json::Value, DomainError> {
        (**self).get_json(url, headers, query).await
    }
}

/// Real HTTP client using reqwest
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, DomainError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DomainError::configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<serde_json::Value, DomainError> {
        let response = request
            .send()
            .await
            .map_err(|e| DomainError::provider("http", format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response.text().await.unwrap_or_default();
            return Err(DomainError::provider(
                "http",
                format!("HTTP {}: {}", status, error_body),
            ));
        }

        response
            .json()
            .await
            .map_err(|e| DomainError::provider("http", format!("Failed to parse response: {}", e)))
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClientTrait for HttpClient {
    async fn post_form(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
        form: &[(&str, &str)],
    ) -> Result<serde_json::Value, DomainError> {
        let mut request = self.client.post(url);

        for (key, value) in headers {
            request = request.header(key, value);
        }

        self.send(request.form(form)).await
    }

    async fn get_json(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
        query: &[(&str, &str)],
    ) -> Result<serde_json::Value, DomainError> {
        let mut request = self.client.get(url);

        for (key, value) in headers {
            request = request.header(key, value);
        }

        self.send(request.query(query)).await
    }
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::RwLock;

    /// A request seen by the mock: headers and form/query pairs
    #[derive(Debug, Clone, Default)]
    pub struct RecordedRequest {
        pub headers: Vec<(String, String)>,
        pub params: Vec<(String, String)>,
    }

    impl RecordedRequest {
        pub fn header(&self, name: &str) -> Option<&str> {
            self.headers
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v.as_str())
        }

        pub fn param(&self, name: &str) -> Option<&str> {
            self.params
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.as_str())
        }
    }

    /// Per-URL canned responses; every request is recorded
    #[derive(Debug, Default)]
    pub struct MockHttpClient {
        responses: RwLock<HashMap<String, serde_json::Value>>,
        errors: RwLock<HashMap<String, String>>,
        requests: RwLock<HashMap<String, Vec<RecordedRequest>>>,
        delay: RwLock<Option<Duration>>,
    }

    impl MockHttpClient {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_response(self, url: impl Into<String>, response: serde_json::Value) -> Self {
            self.set_response(url, response);
            self
        }

        pub fn with_error(self, url: impl Into<String>, error: impl Into<String>) -> Self {
            self.set_error(url, error);
            self
        }

        /// Every request sleeps for `delay` before answering
        pub fn with_delay(self, delay: Duration) -> Self {
            *self.delay.write().unwrap() = Some(delay);
            self
        }

        pub fn set_response(&self, url: impl Into<String>, response: serde_json::Value) {
            self.responses.write().unwrap().insert(url.into(), response);
        }

        pub fn set_error(&self, url: impl Into<String>, error: impl Into<String>) {
            self.errors.write().unwrap().insert(url.into(), error.into());
        }

        pub fn clear_error(&self, url: &str) {
            self.errors.write().unwrap().remove(url);
        }

        pub fn call_count(&self, url: &str) -> usize {
            self.requests
                .read()
                .unwrap()
                .get(url)
                .map(Vec::len)
                .unwrap_or(0)
        }

        pub fn requests(&self, url: &str) -> Vec<RecordedRequest> {
            self.requests
                .read()
                .unwrap()
                .get(url)
                .cloned()
                .unwrap_or_default()
        }

        async fn respond(
            &self,
            url: &str,
            headers: Vec<(&str, &str)>,
            params: &[(&str, &str)],
        ) -> Result<serde_json::Value, DomainError> {
            self.requests
                .write()
                .unwrap()
                .entry(url.to_string())
                .or_default()
                .push(RecordedRequest {
                    headers: headers
                        .into_iter()
                        .map(|(k, v)| (k.to_string(), v.to_string()))
                        .collect(),
                    params: params
                        .iter()
                        .map(|(k, v)| (k.to_string(), v.to_string()))
                        .collect(),
                });

            let delay = *self.delay.read().unwrap();
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }

            if let Some(error) = self.errors.read().unwrap().get(url) {
                return Err(DomainError::provider("mock", error));
            }

            self.responses
                .read()
                .unwrap()
                .get(url)
                .cloned()
                .ok_or_else(|| DomainError::provider("mock", format!("No mock response for {}", url)))
        }
    }

    #[async_trait]
    impl HttpClientTrait for MockHttpClient {
        async fn post_form(
            &self,
            url: &str,
            headers: Vec<(&str, &str)>,
            form: &[(&str, &str)],
        ) -> Result<serde_json::Value, DomainError> {
            self.respond(url, headers, form).await
        }

        async fn get_json(
            &self,
            url: &str,
            headers: Vec<(&str, &str)>,
            query: &[(&str, &str)],
        ) -> Result<serde_json::Value, DomainError> {
            self.respond(url, headers, query).await
        }
    }
}
