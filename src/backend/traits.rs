use crate::model::{BackendError, BackendReply};

/// An upload as it arrived at the proxy: content type (boundary included) and raw body.
#[derive(Debug, Clone)]
pub struct ForwardRequest {
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

#[async_trait::async_trait]
pub trait AnalysisBackend: Send + Sync {
    /// Sends the upload to the backend's analyze route and returns whatever it answered.
    async fn analyze(&self, req: ForwardRequest) -> Result<BackendReply, BackendError>;

    /// Base URL, for logging and health output.
    fn base_url(&self) -> &str;
}
