use crate::backend::traits::{AnalysisBackend, ForwardRequest};
use crate::model::{BackendError, BackendReply};

use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;
use tracing::debug;

pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> Result<Self, BackendError> {
        let mut builder = Client::builder().user_agent(concat!("chart-sniper/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| BackendError::Client(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn analyze_url(&self) -> String {
        format!("{}/analyze", self.base_url)
    }
}

#[async_trait::async_trait]
impl AnalysisBackend for HttpBackend {
    async fn analyze(&self, req: ForwardRequest) -> Result<BackendReply, BackendError> {
        let url = self.analyze_url();
        debug!("Forwarding {} bytes to {}", req.body.len(), url);

        let mut request = self.client.post(&url).body(req.body);
        if let Some(content_type) = req.content_type {
            request = request.header(CONTENT_TYPE, content_type);
        }

        let response = request
            .send()
            .await
            .map_err(|e| BackendError::Unreachable(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| BackendError::Unreachable(e.to_string()))?;

        Ok(BackendReply {
            status,
            body: body.to_vec(),
        })
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_analyze_url_without_double_slash() {
        let backend = HttpBackend::new("http://localhost:8000/", None).unwrap();
        assert_eq!(backend.analyze_url(), "http://localhost:8000/analyze");
        assert_eq!(backend.base_url(), "http://localhost:8000");
    }
}
