use crate::model::{AnalysisResult, UploadError};
use crate::store::SharedStore;
use crate::utils::{image_mime, is_accepted_image};

use reqwest::Client;
use reqwest::multipart::{Form, Part};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Local preview of the selected image, independent of the analysis round-trip.
#[derive(Debug, Clone, PartialEq)]
pub struct ImagePreview {
    pub file_name: String,
    pub size: u64,
    pub mime: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub enum UploadOutcome {
    /// Not an accepted image; nothing was touched.
    Skipped,
    Analyzed,
    Failed(String),
}

/// Client side of the analyze round-trip. Drives the store through one request.
pub struct Uploader {
    client: Client,
    endpoint: String,
    store: SharedStore,
    preview: Arc<Mutex<Option<ImagePreview>>>,
    preview_task: Mutex<Option<JoinHandle<()>>>,
}

impl Uploader {
    pub fn new(proxy_url: &str, store: SharedStore) -> Result<Self, UploadError> {
        let client = Client::builder()
            .build()
            .map_err(|e| UploadError::Http(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: format!("{}/api/analyze", proxy_url.trim_end_matches('/')),
            store,
            preview: Arc::new(Mutex::new(None)),
            preview_task: Mutex::new(None),
        })
    }

    pub async fn preview(&self) -> Option<ImagePreview> {
        self.preview.lock().await.clone()
    }

    /// Uploads one image and leaves the store holding either a result or an error.
    pub async fn upload(&self, path: &Path) -> UploadOutcome {
        if !is_accepted_image(path) {
            info!("Ignoring unsupported file: {}", path.display());
            return UploadOutcome::Skipped;
        }

        self.spawn_preview(path.to_path_buf()).await;

        {
            let mut store = self.store.lock().await;
            store.set_analyzing(true);
            store.clear_error();
        }

        info!("Uploading {} to {}", path.display(), self.endpoint);
        let outcome = match self.request(path).await {
            Ok(result) => {
                self.store.lock().await.set_result(result);
                UploadOutcome::Analyzed
            }
            Err(e) => {
                warn!("Analysis failed: {:?}", e);
                let message = e.to_string();
                self.store.lock().await.set_error(message.clone());
                UploadOutcome::Failed(message)
            }
        };

        self.store.lock().await.set_analyzing(false);
        outcome
    }

    /// Drops the current image and returns the store to idle.
    pub async fn discard(&self) {
        self.cancel_preview().await;
        *self.preview.lock().await = None;
        self.store.lock().await.reset();
    }

    /// Stops a preview read that has not finished yet.
    async fn cancel_preview(&self) {
        if let Some(task) = self.preview_task.lock().await.take() {
            task.abort();
        }
    }

    /// Replaces any pending preview read with one for `path`.
    async fn spawn_preview(&self, path: PathBuf) {
        self.cancel_preview().await;
        let slot = self.preview.clone();
        let task = tokio::spawn(async move {
            match tokio::fs::metadata(&path).await {
                Ok(meta) => {
                    let preview = ImagePreview {
                        file_name: display_name(&path),
                        size: meta.len(),
                        mime: image_mime(&path).unwrap_or("application/octet-stream"),
                    };
                    *slot.lock().await = Some(preview);
                }
                Err(e) => warn!("Preview unavailable for {}: {}", path.display(), e),
            }
        });
        *self.preview_task.lock().await = Some(task);
    }

    async fn request(&self, path: &Path) -> Result<AnalysisResult, UploadError> {
        let bytes = tokio::fs::read(path).await?;
        let mime = image_mime(path).unwrap_or("application/octet-stream");

        let part = Part::bytes(bytes)
            .file_name(display_name(path))
            .mime_str(mime)
            .map_err(|e| UploadError::Http(e.to_string()))?;
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| UploadError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(UploadError::Rejected(status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| UploadError::Http(e.to_string()))?;
        serde_json::from_slice(&body).map_err(|e| UploadError::Decode(e.to_string()))
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string())
}
